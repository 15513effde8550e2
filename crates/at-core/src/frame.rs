use crate::error::CoreError;
use crate::traits::PixelSource;

/// An RGB triple, each channel in [0, 255].
pub type Rgb = (u8, u8, u8);

/// White, used as the padding colour.
pub const WHITE: Rgb = (255, 255, 255);

/// Side length of the monochrome glyph bitmaps used to measure characters.
pub const GLYPH_SIZE: usize = 16;

/// Owned pixel grid. Immutable once handed to the pipeline.
///
/// Stocke les pixels en RGB row-major, 3 bytes par pixel.
///
/// # Example
/// ```
/// use at_core::frame::PixelBuffer;
/// let fb = PixelBuffer::new(10, 4);
/// assert_eq!(fb.data.len(), 10 * 4 * 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Pixels RGB, row-major, 3 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelBuffer {
    /// Black buffer of the given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, (0, 0, 0))
    }

    /// Buffer where every pixel is `rgb`.
    ///
    /// # Example
    /// ```
    /// use at_core::frame::PixelBuffer;
    /// let fb = PixelBuffer::filled(2, 2, (255, 255, 255));
    /// assert_eq!(fb.pixel(1, 1), (255, 255, 255));
    /// ```
    #[must_use]
    pub fn filled(width: u32, height: u32, rgb: Rgb) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * 3);
        for _ in 0..count {
            data.extend_from_slice(&[rgb.0, rgb.1, rgb.2]);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Wrap raw RGB bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if a dimension is zero or
    /// `data` does not hold exactly `width * height * 3` bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize * 3 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Copy any pixel source into an owned buffer.
    #[must_use]
    pub fn from_source<P: PixelSource + ?Sized>(source: &P) -> Self {
        let (width, height) = (source.width(), source.height());
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for row in 0..height {
            for col in 0..width {
                let (r, g, b) = source.pixel(row, col);
                data.extend_from_slice(&[r, g, b]);
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    #[inline(always)]
    fn offset(&self, row: u32, col: u32) -> usize {
        debug_assert!(row < self.height && col < self.width, "pixel out of bounds");
        (row as usize * self.width as usize + col as usize) * 3
    }

    /// Pixel at (row, col).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, row: u32, col: u32) -> Rgb {
        let idx = self.offset(row, col);
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    /// Overwrite the pixel at (row, col).
    #[inline(always)]
    pub fn set_pixel(&mut self, row: u32, col: u32, rgb: Rgb) {
        let idx = self.offset(row, col);
        self.data[idx] = rgb.0;
        self.data[idx + 1] = rgb.1;
        self.data[idx + 2] = rgb.2;
    }
}

impl PixelSource for PixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, row: u32, col: u32) -> Rgb {
        PixelBuffer::pixel(self, row, col)
    }
}

/// 16×16 monochrome rendering of one character.
///
/// # Example
/// ```
/// use at_core::frame::GlyphBitmap;
/// let mut glyph = GlyphBitmap::empty();
/// glyph.set(0, 0, true);
/// assert_eq!(glyph.count_on(), 1);
/// assert_eq!(glyph.raw_brightness(), 1.0 / 256.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphBitmap {
    cells: [[bool; GLYPH_SIZE]; GLYPH_SIZE],
}

impl GlyphBitmap {
    /// All cells off.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            cells: [[false; GLYPH_SIZE]; GLYPH_SIZE],
        }
    }

    /// All cells on.
    #[must_use]
    pub fn full() -> Self {
        Self {
            cells: [[true; GLYPH_SIZE]; GLYPH_SIZE],
        }
    }

    /// Cell state; out-of-range coordinates read as off.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < GLYPH_SIZE && col < GLYPH_SIZE && self.cells[row][col]
    }

    /// Set a cell. Out-of-range coordinates are ignored.
    pub fn set(&mut self, row: usize, col: usize, on: bool) {
        if row < GLYPH_SIZE && col < GLYPH_SIZE {
            self.cells[row][col] = on;
        }
    }

    /// Number of "on" cells.
    #[must_use]
    pub fn count_on(&self) -> usize {
        self.cells.iter().flatten().filter(|&&on| on).count()
    }

    /// Fraction of "on" cells, in [0, 1].
    #[must_use]
    pub fn raw_brightness(&self) -> f64 {
        self.count_on() as f64 / (GLYPH_SIZE * GLYPH_SIZE) as f64
    }
}

/// Grille de sortie : `rows × cols` caractères, row-major.
///
/// Handed to a [`GridWriter`](crate::traits::GridWriter) as a plain value.
///
/// # Example
/// ```
/// use at_core::frame::CharGrid;
/// let mut grid = CharGrid::new(3, 2);
/// grid.set(1, 2, '@');
/// assert_eq!(grid.get(1, 2), '@');
/// assert_eq!(grid.lines(), vec!["   ".to_string(), "  @".to_string()]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharGrid {
    /// Flat array of cells, row-major.
    pub cells: Vec<char>,
    /// Width in characters.
    pub cols: u32,
    /// Height in characters.
    pub rows: u32,
}

impl CharGrid {
    /// Grid filled with spaces.
    #[must_use]
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cells: vec![' '; cols as usize * rows as usize],
            cols,
            rows,
        }
    }

    /// Wrap a row-major cell vector.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if `cells.len() != cols * rows`.
    pub fn from_cells(cols: u32, rows: u32, cells: Vec<char>) -> Result<Self, CoreError> {
        if cells.len() != cols as usize * rows as usize {
            return Err(CoreError::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        Ok(Self { cells, cols, rows })
    }

    #[inline(always)]
    fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    /// Set the character at (row, col).
    #[inline(always)]
    pub fn set(&mut self, row: u32, col: u32, ch: char) {
        let idx = self.index(row, col);
        self.cells[idx] = ch;
    }

    /// Character at (row, col).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, row: u32, col: u32) -> char {
        self.cells[self.index(row, col)]
    }

    /// Iterate rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.chunks(self.cols.max(1) as usize)
    }

    /// One `String` per row.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.rows().map(|row| row.iter().collect()).collect()
    }
}
