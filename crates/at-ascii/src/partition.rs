use std::borrow::Cow;

use at_core::error::CoreError;
use at_core::frame::{PixelBuffer, Rgb, WHITE};
use at_core::traits::PixelSource;

/// Smallest power of two ≥ `n` (1 for 0).
#[inline]
#[must_use]
pub fn next_power_of_two(n: u32) -> u32 {
    n.max(1).next_power_of_two()
}

/// Dimensions after padding: smallest powers of two ≥ the originals.
#[must_use]
pub fn padded_dimensions(width: u32, height: u32) -> (u32, u32) {
    (next_power_of_two(width), next_power_of_two(height))
}

/// Centre the image on a white canvas whose sides are powers of two.
///
/// Images already power-of-two in both axes are returned as-is.
///
/// # Example
/// ```
/// use at_ascii::partition::pad;
/// use at_core::frame::PixelBuffer;
///
/// let img = PixelBuffer::new(3, 5);
/// let padded = pad(&img);
/// assert_eq!((padded.width, padded.height), (4, 8));
/// assert_eq!(padded.pixel(0, 0), (255, 255, 255));
/// assert_eq!(padded.pixel(1, 0), (0, 0, 0));
/// ```
#[must_use]
pub fn pad(image: &PixelBuffer) -> Cow<'_, PixelBuffer> {
    let (width, height) = padded_dimensions(image.width, image.height);
    if width == image.width && height == image.height {
        return Cow::Borrowed(image);
    }

    let mut canvas = PixelBuffer::filled(width, height, WHITE);
    let left = (width - image.width) / 2;
    let top = (height - image.height) / 2;
    for row in 0..image.height {
        for col in 0..image.width {
            canvas.set_pixel(row + top, col + left, image.pixel(row, col));
        }
    }
    Cow::Owned(canvas)
}

/// Side length of the square tiles for `resolution` tiles per row.
///
/// # Errors
/// Returns [`CoreError::InvalidResolution`] if `resolution` is zero, does not
/// divide `width`, or the resulting tile size does not divide `height`.
///
/// # Example
/// ```
/// use at_ascii::partition::tile_size;
/// assert_eq!(tile_size(128, 64, 4).unwrap(), 32);
/// assert!(tile_size(128, 64, 3).is_err());
/// ```
pub fn tile_size(width: u32, height: u32, resolution: u32) -> Result<u32, CoreError> {
    if resolution == 0 {
        return Err(CoreError::resolution(resolution, "must be positive"));
    }
    if width % resolution != 0 {
        return Err(CoreError::resolution(
            resolution,
            format!("does not divide the image width {width}"),
        ));
    }
    let size = width / resolution;
    if height % size != 0 {
        return Err(CoreError::resolution(
            resolution,
            format!("tile size {size} does not divide the image height {height}"),
        ));
    }
    Ok(size)
}

/// Square window onto a pixel source. Borrowed, never copied.
pub struct Tile<'a, P: PixelSource + ?Sized> {
    source: &'a P,
    top: u32,
    left: u32,
    size: u32,
}

impl<P: PixelSource + ?Sized> Tile<'_, P> {
    /// (top, left) corner in the source.
    #[must_use]
    pub fn origin(&self) -> (u32, u32) {
        (self.top, self.left)
    }
}

impl<P: PixelSource + ?Sized> PixelSource for Tile<'_, P> {
    fn width(&self) -> u32 {
        self.size
    }

    fn height(&self) -> u32 {
        self.size
    }

    #[inline(always)]
    fn pixel(&self, row: u32, col: u32) -> Rgb {
        self.source.pixel(self.top + row, self.left + col)
    }
}

/// `rows × cols` tiles in row-major order.
pub struct TileGrid<'a, P: PixelSource + ?Sized> {
    /// Tile rows.
    pub rows: u32,
    /// Tiles per row (the resolution).
    pub cols: u32,
    /// Side length of every tile.
    pub tile_size: u32,
    tiles: Vec<Tile<'a, P>>,
}

impl<'a, P: PixelSource + ?Sized> TileGrid<'a, P> {
    /// All tiles, index `row * cols + col`.
    #[must_use]
    pub fn tiles(&self) -> &[Tile<'a, P>] {
        &self.tiles
    }

    /// Tile at (row, col).
    #[must_use]
    pub fn get(&self, row: u32, col: u32) -> Option<&Tile<'a, P>> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.tiles.get(row as usize * self.cols as usize + col as usize)
    }

    /// Number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True when the grid holds no tile.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Cut `image` into square tiles, `resolution` per row.
///
/// Tile (i, j) covers rows `[i·s, (i+1)·s)` and columns `[j·s, (j+1)·s)`.
///
/// # Errors
/// Same as [`tile_size`].
///
/// # Example
/// ```
/// use at_ascii::partition::split;
/// use at_core::frame::PixelBuffer;
///
/// let img = PixelBuffer::new(8, 4);
/// let grid = split(&img, 2).unwrap();
/// assert_eq!((grid.rows, grid.cols, grid.tile_size), (1, 2, 4));
/// ```
pub fn split<P: PixelSource + ?Sized>(
    image: &P,
    resolution: u32,
) -> Result<TileGrid<'_, P>, CoreError> {
    let size = tile_size(image.width(), image.height(), resolution)?;
    let rows = image.height() / size;
    let mut tiles = Vec::with_capacity(rows as usize * resolution as usize);
    for i in 0..rows {
        for j in 0..resolution {
            tiles.push(Tile {
                source: image,
                top: i * size,
                left: j * size,
                size,
            });
        }
    }
    Ok(TileGrid {
        rows,
        cols: resolution,
        tile_size: size,
        tiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut img = PixelBuffer::new(width, height);
        for row in 0..height {
            for col in 0..width {
                img.set_pixel(row, col, (row as u8, col as u8, 7));
            }
        }
        img
    }

    #[test]
    fn padded_dimensions_are_powers_of_two() {
        for (w, h) in [(1, 1), (3, 5), (100, 50), (64, 33), (257, 2)] {
            let (pw, ph) = padded_dimensions(w, h);
            assert!(pw.is_power_of_two() && ph.is_power_of_two());
            assert!(pw >= w && ph >= h);
            assert!(pw / 2 < w.max(1) && ph / 2 < h.max(1));
        }
    }

    #[test]
    fn pad_is_noop_for_power_of_two() {
        let img = gradient(8, 4);
        let padded = pad(&img);
        assert!(matches!(padded, Cow::Borrowed(_)));
        assert_eq!(*padded, img);
    }

    #[test]
    fn pad_centres_with_floor_offsets() {
        // 5×3 → 8×4: left = 1, top = 0.
        let img = gradient(5, 3);
        let padded = pad(&img);
        assert_eq!((padded.width, padded.height), (8, 4));
        for row in 0..3 {
            for col in 0..5 {
                assert_eq!(padded.pixel(row, col + 1), img.pixel(row, col));
            }
        }
        assert_eq!(padded.pixel(0, 0), WHITE);
        assert_eq!(padded.pixel(3, 3), WHITE);
        assert_eq!(padded.pixel(0, 6), WHITE);
        assert_eq!(padded.pixel(0, 7), WHITE);
    }

    #[test]
    fn pad_only_one_axis() {
        let img = gradient(4, 6);
        let padded = pad(&img);
        assert_eq!((padded.width, padded.height), (4, 8));
        assert_eq!(padded.pixel(1, 0), img.pixel(0, 0));
    }

    #[test]
    fn split_tiles_cover_their_squares() {
        let img = gradient(8, 8);
        let grid = split(&img, 4).unwrap();
        assert_eq!((grid.rows, grid.cols, grid.tile_size), (4, 4, 2));
        assert_eq!(grid.len(), 16);

        let tile = grid.get(2, 3).unwrap();
        assert_eq!(tile.origin(), (4, 6));
        assert_eq!(tile.pixel(1, 1), img.pixel(5, 7));
        assert_eq!((tile.width(), tile.height()), (2, 2));
        assert!(grid.get(4, 0).is_none());
    }

    #[test]
    fn split_is_row_major() {
        let img = gradient(4, 2);
        let grid = split(&img, 2).unwrap();
        let origins: Vec<_> = grid.tiles().iter().map(Tile::origin).collect();
        assert_eq!(origins, vec![(0, 0), (0, 2)]);
    }

    #[test]
    fn split_rejects_bad_resolutions() {
        let img = gradient(8, 4);
        assert!(matches!(
            split(&img, 0),
            Err(CoreError::InvalidResolution { resolution: 0, .. })
        ));
        assert!(split(&img, 3).is_err());
        // tile size 8 does not fit a height of 4
        assert!(split(&img, 1).is_err());
    }
}
