/// Brightness-matching engine for asciitile.
///
/// Pads and tiles an image, measures each tile, and picks the character
/// whose normalized ink coverage is closest to the tile's brightness.
pub mod brightness;
pub mod glyph;
pub mod matcher;
pub mod partition;
pub mod pipeline;
pub mod state;

pub use matcher::CharBrightnessTable;
pub use pipeline::RenderPipeline;
pub use state::{ConfigState, ResolutionBounds, ResolutionStep};
