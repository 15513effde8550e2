use thiserror::Error;

/// Errors originating from the core pipeline.
///
/// Every variant is raised before any state is touched: a failing operation
/// leaves the table, the pipeline and the session exactly as they were.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Resolution is zero, does not divide the padded image, or is out of bounds.
    #[error("Invalid resolution {resolution}: {reason}")]
    InvalidResolution {
        /// Requested number of tiles per row.
        resolution: u32,
        /// Human readable cause.
        reason: String,
    },

    /// The operation would leave the character table empty.
    #[error("Character set cannot be empty")]
    EmptyCharacterSet,

    /// Invalid width/height dimensions.
    #[error("Invalid dimensions: {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Invalid configuration value or structure.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The glyph rasterizer has no glyph for this character.
    #[error("No glyph available for {0:?}")]
    GlyphUnavailable(char),
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidResolution`].
    #[must_use]
    pub fn resolution(resolution: u32, reason: impl Into<String>) -> Self {
        Self::InvalidResolution {
            resolution,
            reason: reason.into(),
        }
    }
}
