use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, point};
use anyhow::Context;
use at_core::error::CoreError;
use at_core::frame::{GLYPH_SIZE, GlyphBitmap};
use at_core::traits::GlyphRasterizer;

/// Built-in 5×7 bitmap font covering printable ASCII.
///
/// Each font pixel becomes a 3×2 block, so a glyph fills 15×14 cells of the
/// 16×16 grid (one blank row above and below). Characters outside ' '..='~'
/// rasterize to an empty bitmap.
///
/// # Example
/// ```
/// use at_ascii::glyph::BuiltinGlyphs;
/// use at_core::traits::GlyphRasterizer;
///
/// let glyphs = BuiltinGlyphs;
/// assert_eq!(glyphs.rasterize(' ').unwrap().count_on(), 0);
/// assert!(glyphs.rasterize('@').unwrap().count_on() > glyphs.rasterize('.').unwrap().count_on());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinGlyphs;

const FONT_COLS: usize = 5;
const FONT_ROWS: usize = 7;
const CELL_W: usize = 3;
const CELL_H: usize = 2;
const TOP: usize = (GLYPH_SIZE - FONT_ROWS * CELL_H) / 2;
const LEFT: usize = (GLYPH_SIZE - FONT_COLS * CELL_W) / 2;

// Rows top to bottom, bit 4 = leftmost column. Index = code - 32.
const FONT_5X7: [[u8; FONT_ROWS]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x04, 0x04, 0x04, 0x04, 0x00, 0x00, 0x04], // !
    [0x0A, 0x0A, 0x0A, 0x00, 0x00, 0x00, 0x00], // "
    [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A], // #
    [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04], // $
    [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03], // %
    [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D], // &
    [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00], // '
    [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02], // (
    [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08], // )
    [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00], // *
    [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00], // +
    [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08], // ,
    [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00], // -
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C], // .
    [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00], // /
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // 0
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // 1
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // 2
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // 3
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // 4
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // 5
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // 6
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // 7
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // 8
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // 9
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00], // :
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x04, 0x08], // ;
    [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02], // <
    [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00], // =
    [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08], // >
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04], // ?
    [0x0E, 0x11, 0x01, 0x0D, 0x15, 0x15, 0x0E], // @
    [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // M
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
    [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E], // [
    [0x00, 0x10, 0x08, 0x04, 0x02, 0x01, 0x00], // \
    [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E], // ]
    [0x04, 0x0A, 0x11, 0x00, 0x00, 0x00, 0x00], // ^
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F], // _
    [0x08, 0x04, 0x02, 0x00, 0x00, 0x00, 0x00], // `
    [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F], // a
    [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x1E], // b
    [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E], // c
    [0x01, 0x01, 0x0D, 0x13, 0x11, 0x11, 0x0F], // d
    [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E], // e
    [0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08], // f
    [0x00, 0x0F, 0x11, 0x11, 0x0F, 0x01, 0x0E], // g
    [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x11], // h
    [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E], // i
    [0x02, 0x00, 0x06, 0x02, 0x02, 0x12, 0x0C], // j
    [0x10, 0x10, 0x12, 0x14, 0x18, 0x14, 0x12], // k
    [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // l
    [0x00, 0x00, 0x1A, 0x15, 0x15, 0x11, 0x11], // m
    [0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11], // n
    [0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E], // o
    [0x00, 0x00, 0x1E, 0x11, 0x1E, 0x10, 0x10], // p
    [0x00, 0x00, 0x0D, 0x13, 0x0F, 0x01, 0x01], // q
    [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10], // r
    [0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E], // s
    [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06], // t
    [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0D], // u
    [0x00, 0x00, 0x11, 0x11, 0x11, 0x0A, 0x04], // v
    [0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0A], // w
    [0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11], // x
    [0x00, 0x00, 0x11, 0x11, 0x0F, 0x01, 0x0E], // y
    [0x00, 0x00, 0x1F, 0x02, 0x04, 0x08, 0x1F], // z
    [0x02, 0x04, 0x04, 0x08, 0x04, 0x04, 0x02], // {
    [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // |
    [0x08, 0x04, 0x04, 0x02, 0x04, 0x04, 0x08], // }
    [0x00, 0x00, 0x00, 0x0D, 0x12, 0x00, 0x00], // ~
];

impl GlyphRasterizer for BuiltinGlyphs {
    fn rasterize(&self, ch: char) -> Result<GlyphBitmap, CoreError> {
        let mut bitmap = GlyphBitmap::empty();
        let Some(rows) = (ch as usize)
            .checked_sub(' ' as usize)
            .and_then(|idx| FONT_5X7.get(idx))
        else {
            return Ok(bitmap);
        };
        for (fy, bits) in rows.iter().enumerate() {
            for fx in 0..FONT_COLS {
                if bits & (1 << (FONT_COLS - 1 - fx)) == 0 {
                    continue;
                }
                for dy in 0..CELL_H {
                    for dx in 0..CELL_W {
                        bitmap.set(TOP + fy * CELL_H + dy, LEFT + fx * CELL_W + dx, true);
                    }
                }
            }
        }
        Ok(bitmap)
    }

    fn name(&self) -> &'static str {
        "builtin-5x7"
    }
}

/// Outline-font rasterizer (TTF/OTF) via `ab_glyph`.
///
/// The glyph is drawn at a 16 px em height, centred horizontally on its
/// advance; a cell is "on" when coverage reaches one half.
pub struct FontGlyphs {
    font: FontVec,
}

impl FontGlyphs {
    /// Parse font bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if the bytes are not a usable font.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, CoreError> {
        let font = FontVec::try_from_vec(data)
            .map_err(|e| CoreError::Config(format!("invalid font: {e}")))?;
        Ok(Self { font })
    }

    /// Read and parse a font file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let data =
            std::fs::read(path).with_context(|| format!("Cannot read font {}", path.display()))?;
        let glyphs = Self::from_bytes(data).with_context(|| format!("In {}", path.display()))?;
        log::info!("Font loaded from {}", path.display());
        Ok(glyphs)
    }
}

impl GlyphRasterizer for FontGlyphs {
    fn rasterize(&self, ch: char) -> Result<GlyphBitmap, CoreError> {
        let font = &self.font;
        let gid = font.glyph_id(ch);
        // glyph_id 0 = .notdef
        if gid.0 == 0 {
            return Err(CoreError::GlyphUnavailable(ch));
        }

        let size = GLYPH_SIZE as f32;
        let scale = PxScale::from(size);
        let ascent_px = font.ascent_unscaled() * scale.y / font.height_unscaled();
        let advance_px = font.h_advance_unscaled(gid) * scale.x / font.height_unscaled();
        let left = ((size - advance_px) / 2.0).max(0.0);
        let glyph = gid.with_scale_and_position(scale, point(left, ascent_px));

        let mut bitmap = GlyphBitmap::empty();
        if let Some(outline) = font.outline_glyph(glyph) {
            let bounds = outline.px_bounds();
            outline.draw(|x, y, coverage| {
                if coverage < 0.5 {
                    return;
                }
                let px = x as i32 + bounds.min.x as i32;
                let py = y as i32 + bounds.min.y as i32;
                if px >= 0 && py >= 0 {
                    bitmap.set(py as usize, px as usize, true);
                }
            });
        }
        Ok(bitmap)
    }

    fn name(&self) -> &'static str {
        "font"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_block_geometry() {
        // '|' is a single centre column: 7 font pixels of 3×2 cells.
        let bar = BuiltinGlyphs.rasterize('|').unwrap();
        assert_eq!(bar.count_on(), 7 * CELL_W * CELL_H);
        assert!(bar.get(TOP, LEFT + 2 * CELL_W));
        assert!(!bar.get(0, LEFT + 2 * CELL_W));
        assert!(!bar.get(TOP, LEFT));
    }

    #[test]
    fn builtin_unknown_char_is_blank() {
        assert_eq!(BuiltinGlyphs.rasterize('é').unwrap().count_on(), 0);
        assert_eq!(BuiltinGlyphs.rasterize('\n').unwrap().count_on(), 0);
    }

    #[test]
    fn builtin_digits_are_not_all_equal() {
        let counts: Vec<usize> = ('0'..='9')
            .map(|c| BuiltinGlyphs.rasterize(c).unwrap().count_on())
            .collect();
        assert!(counts.iter().any(|&c| c != counts[0]));
        // '1' is the lightest digit in this font.
        assert_eq!(counts.iter().min(), Some(&counts[1]));
    }

    #[test]
    fn builtin_covers_all_printable() {
        for ch in at_core::charset::printable().skip(1) {
            assert!(BuiltinGlyphs.rasterize(ch).unwrap().count_on() > 0, "{ch:?}");
        }
    }

    fn mono() -> FontGlyphs {
        let font_data = include_bytes!("../assets/DejaVuSansMono.ttf");
        FontGlyphs::from_bytes(font_data.to_vec()).unwrap()
    }

    #[test]
    fn font_ink_follows_glyph_weight() {
        let font = mono();
        let at = font.rasterize('@').unwrap().count_on();
        let dot = font.rasterize('.').unwrap().count_on();
        assert!(dot > 0);
        assert!(at > dot, "@={at} .={dot}");
    }

    #[test]
    fn font_space_is_blank() {
        assert_eq!(mono().rasterize(' ').unwrap().count_on(), 0);
    }

    #[test]
    fn font_dot_sits_low_and_centred() {
        let dot = mono().rasterize('.').unwrap();
        for row in 0..GLYPH_SIZE {
            for col in 0..GLYPH_SIZE {
                if dot.get(row, col) {
                    assert!(row >= GLYPH_SIZE / 2, "row {row}");
                    assert!((4..12).contains(&col), "col {col}");
                }
            }
        }
    }

    #[test]
    fn font_unmapped_char_is_unavailable() {
        assert_eq!(
            mono().rasterize('\u{10FFFD}'),
            Err(CoreError::GlyphUnavailable('\u{10FFFD}'))
        );
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        assert!(matches!(
            FontGlyphs::from_bytes(vec![0, 1, 2, 3]),
            Err(CoreError::Config(_))
        ));
    }
}
