use std::borrow::Cow;
use std::sync::Arc;

use at_core::config::RoundingMode;
use at_core::error::CoreError;
use at_core::frame::{CharGrid, PixelBuffer};
use rayon::prelude::*;

use crate::brightness::average_brightness;
use crate::matcher::CharBrightnessTable;
use crate::partition::{pad, split};

/// Image → character grid for one (image, resolution, table) binding.
///
/// Tile brightness is memoized by linear tile index for the lifetime of the
/// instance. A different image or resolution needs a new pipeline; the
/// rounding mode may change in place since the cache holds brightness, not
/// characters.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use at_ascii::matcher::CharBrightnessTable;
/// use at_ascii::pipeline::RenderPipeline;
/// use at_core::frame::PixelBuffer;
///
/// let image = Arc::new(PixelBuffer::filled(4, 4, (255, 255, 255)));
/// let table = CharBrightnessTable::from_brightness([(' ', 0.0), ('#', 0.5)]).unwrap();
/// let mut pipeline = RenderPipeline::new(image, 2, table);
/// let grid = pipeline.run().unwrap();
/// assert_eq!(grid.lines(), vec!["##".to_string(), "##".to_string()]);
/// ```
pub struct RenderPipeline {
    image: Arc<PixelBuffer>,
    resolution: u32,
    table: CharBrightnessTable,
    padded: Option<Arc<PixelBuffer>>,
    cache: Vec<Option<f64>>,
}

impl RenderPipeline {
    /// Bind the triple. Nothing is padded or sampled until [`run`](Self::run).
    #[must_use]
    pub fn new(image: Arc<PixelBuffer>, resolution: u32, table: CharBrightnessTable) -> Self {
        Self {
            image,
            resolution,
            table,
            padded: None,
            cache: Vec::new(),
        }
    }

    /// Render the grid, `rows × resolution`, row-major.
    ///
    /// Tiles are sampled in parallel; results are joined by tile index.
    ///
    /// # Errors
    /// [`CoreError::InvalidResolution`] if the resolution does not tile the
    /// padded image. Nothing is cached in that case.
    pub fn run(&mut self) -> Result<CharGrid, CoreError> {
        let padded = self.padded_image();
        let tiles = split(padded.as_ref(), self.resolution)?;
        if self.cache.len() != tiles.len() {
            self.cache = vec![None; tiles.len()];
        }

        if log::log_enabled!(log::Level::Trace) {
            let hits = self.cache.iter().filter(|slot| slot.is_some()).count();
            log::trace!("Tile cache: {hits}/{} hits", tiles.len());
        }

        let table = &self.table;
        let cells: Vec<char> = self
            .cache
            .par_iter_mut()
            .zip(tiles.tiles().par_iter())
            .map(|(slot, tile)| {
                let brightness = *slot.get_or_insert_with(|| average_brightness(tile));
                table.lookup(brightness)
            })
            .collect();

        CharGrid::from_cells(tiles.cols, tiles.rows, cells)
    }

    fn padded_image(&mut self) -> Arc<PixelBuffer> {
        let image = &self.image;
        let padded = self.padded.get_or_insert_with(|| match pad(image) {
            Cow::Borrowed(_) => Arc::clone(image),
            Cow::Owned(canvas) => {
                log::debug!(
                    "Padded {}×{} to {}×{}",
                    image.width,
                    image.height,
                    canvas.width,
                    canvas.height
                );
                Arc::new(canvas)
            }
        });
        Arc::clone(padded)
    }

    /// Tiles per row.
    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// The bound table.
    #[must_use]
    pub fn table(&self) -> &CharBrightnessTable {
        &self.table
    }

    /// Forwarded to the table; the brightness cache stays valid.
    pub fn set_rounding_mode(&mut self, mode: RoundingMode) {
        self.table.set_rounding_mode(mode);
    }

    /// Number of tiles whose brightness is cached.
    #[must_use]
    pub fn cached_tiles(&self) -> usize {
        self.cache.iter().filter(|slot| slot.is_some()).count()
    }

    /// Give the table back, dropping the image binding and the cache.
    #[must_use]
    pub fn into_table(self) -> CharBrightnessTable {
        self.table
    }
}
