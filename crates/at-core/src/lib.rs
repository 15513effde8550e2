/// Shared types, traits and configuration for asciitile.
///
/// Everything the brightness-matching core and its collaborators (image
/// loader, glyph rasterizers, grid writers) exchange lives here.

pub mod charset;
pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use config::{AppConfig, OutputTarget, RoundingMode};
pub use error::CoreError;
pub use frame::{CharGrid, GLYPH_SIZE, GlyphBitmap, PixelBuffer, Rgb};
pub use traits::{GlyphRasterizer, GridWriter, PixelSource};
