use crate::error::CoreError;
use crate::frame::{CharGrid, GlyphBitmap, Rgb};

/// Grille 2D de pixels RGB en lecture seule.
///
/// Implémenté par : `PixelBuffer`, `Tile`.
///
/// `Sync` so tiles can be sampled from worker threads.
///
/// # Example
/// ```
/// use at_core::traits::PixelSource;
///
/// struct Checker;
/// impl PixelSource for Checker {
///     fn width(&self) -> u32 { 2 }
///     fn height(&self) -> u32 { 2 }
///     fn pixel(&self, row: u32, col: u32) -> (u8, u8, u8) {
///         if (row + col) % 2 == 0 { (0, 0, 0) } else { (255, 255, 255) }
///     }
/// }
/// assert_eq!(Checker.pixel(0, 1), (255, 255, 255));
/// ```
pub trait PixelSource: Sync {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Pixel at (row, col). Callers stay within `height × width`.
    fn pixel(&self, row: u32, col: u32) -> Rgb;
}

/// Renders a character into a fixed 16×16 monochrome bitmap.
///
/// Only used to measure how much ink a character carries, never for display.
///
/// # Example
/// ```
/// use at_core::error::CoreError;
/// use at_core::frame::GlyphBitmap;
/// use at_core::traits::GlyphRasterizer;
///
/// struct Blank;
/// impl GlyphRasterizer for Blank {
///     fn rasterize(&self, _ch: char) -> Result<GlyphBitmap, CoreError> {
///         Ok(GlyphBitmap::empty())
///     }
///     fn name(&self) -> &'static str { "blank" }
/// }
/// assert_eq!(Blank.rasterize('x').unwrap().count_on(), 0);
/// ```
pub trait GlyphRasterizer: Send + Sync {
    /// Bitmap of `ch`.
    ///
    /// # Errors
    /// Returns [`CoreError::GlyphUnavailable`] if the rasterizer cannot draw `ch`.
    fn rasterize(&self, ch: char) -> Result<GlyphBitmap, CoreError>;

    /// Nom lisible pour les logs.
    fn name(&self) -> &'static str;
}

/// Consumes a finished character grid (console, HTML file, ...).
pub trait GridWriter {
    /// Write the whole grid.
    ///
    /// # Errors
    /// Returns an error if the underlying sink fails.
    fn write_grid(&mut self, grid: &CharGrid) -> anyhow::Result<()>;
}
