use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use at_core::frame::PixelBuffer;

/// Source d'image statique, partagée sans copie entre sessions.
///
/// # Example
/// ```no_run
/// use at_source::image::ImageSource;
/// use std::path::Path;
/// let source = ImageSource::open(Path::new("board.png")).unwrap();
/// assert!(source.frame().width > 0);
/// ```
pub struct ImageSource {
    path: PathBuf,
    frame: Arc<PixelBuffer>,
}

impl ImageSource {
    /// Load an image from disk.
    ///
    /// # Errors
    /// Returns an error if the image cannot be loaded.
    pub fn open(path: &Path) -> Result<Self> {
        let frame = load_image(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            frame: Arc::new(frame),
        })
    }

    /// Shared handle on the decoded pixels.
    #[must_use]
    pub fn frame(&self) -> Arc<PixelBuffer> {
        Arc::clone(&self.frame)
    }

    /// Path the image was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Decode an image file into RGB pixels. Alpha is dropped.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
///
/// # Example
/// ```no_run
/// use at_source::image::load_image;
/// let frame = load_image("board.png").unwrap();
/// ```
pub fn load_image(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let img = image::open(path).with_context(|| format!("Cannot load {}", path.display()))?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    log::info!("Loaded {} ({width}×{height})", path.display());
    PixelBuffer::from_raw(width, height, rgb.into_raw())
        .with_context(|| format!("Empty image {}", path.display()))
}
