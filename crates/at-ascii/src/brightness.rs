use at_core::frame::Rgb;
use at_core::traits::PixelSource;

/// Rec. 709 luma weights.
pub const RED: f64 = 0.2126;
/// Rec. 709 luma weights.
pub const GREEN: f64 = 0.7152;
/// Rec. 709 luma weights.
pub const BLUE: f64 = 0.0722;
const MAX_RGB: f64 = 255.0;

/// Luminance perceptuelle BT.709, non normalisée ([0, 255]).
#[inline(always)]
#[must_use]
pub fn luma((r, g, b): Rgb) -> f64 {
    f64::from(r) * RED + f64::from(g) * GREEN + f64::from(b) * BLUE
}

/// Mean luma of a region, normalized to [0, 1].
///
/// Pixels are summed row by row, then divided once by `width · height · 255`.
/// An empty region is black.
///
/// # Example
/// ```
/// use at_ascii::brightness::average_brightness;
/// use at_core::frame::PixelBuffer;
///
/// let black = PixelBuffer::new(4, 4);
/// assert_eq!(average_brightness(&black), 0.0);
/// let white = PixelBuffer::filled(4, 4, (255, 255, 255));
/// assert!((average_brightness(&white) - 1.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn average_brightness<P: PixelSource + ?Sized>(region: &P) -> f64 {
    let (width, height) = (region.width(), region.height());
    if width == 0 || height == 0 {
        return 0.0;
    }
    let mut total = 0.0;
    for row in 0..height {
        for col in 0..width {
            total += luma(region.pixel(row, col));
        }
    }
    total / (f64::from(width) * f64::from(height) * MAX_RGB)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::split;
    use at_core::frame::PixelBuffer;

    #[test]
    fn single_pixel_matches_formula_exactly() {
        let img = PixelBuffer::filled(1, 1, (10, 20, 30));
        let expected: f64 = (10.0 * 0.2126 + 20.0 * 0.7152 + 30.0 * 0.0722) / (1.0 * 1.0 * 255.0);
        assert_eq!(average_brightness(&img).to_bits(), expected.to_bits());
    }

    #[test]
    fn summation_order_is_row_major() {
        let mut img = PixelBuffer::new(2, 2);
        img.set_pixel(0, 0, (255, 0, 0));
        img.set_pixel(0, 1, (0, 255, 0));
        img.set_pixel(1, 0, (0, 0, 255));
        img.set_pixel(1, 1, (13, 77, 200));
        let mut total = 0.0;
        total += 255.0 * RED;
        total += 255.0 * GREEN;
        total += 255.0 * BLUE;
        total += 13.0 * RED + 77.0 * GREEN + 200.0 * BLUE;
        let expected = total / (2.0 * 2.0 * 255.0);
        assert_eq!(average_brightness(&img).to_bits(), expected.to_bits());
    }

    #[test]
    fn solid_colours_hit_the_extremes() {
        let black = PixelBuffer::new(3, 3);
        let white = PixelBuffer::filled(3, 3, (255, 255, 255));
        assert!(average_brightness(&black).abs() < 1e-9);
        assert!((average_brightness(&white) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn green_dominates_luma() {
        let red = PixelBuffer::filled(1, 1, (255, 0, 0));
        let green = PixelBuffer::filled(1, 1, (0, 255, 0));
        assert!(average_brightness(&green) > average_brightness(&red));
    }

    #[test]
    fn tile_brightness_only_sees_its_pixels() {
        let mut img = PixelBuffer::new(4, 2);
        for row in 0..2 {
            for col in 2..4 {
                img.set_pixel(row, col, (255, 255, 255));
            }
        }
        let grid = split(&img, 2).unwrap();
        assert!(average_brightness(&grid.tiles()[0]).abs() < 1e-9);
        assert!((average_brightness(&grid.tiles()[1]) - 1.0).abs() < 1e-9);
    }
}
