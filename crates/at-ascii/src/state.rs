use std::collections::BTreeSet;
use std::sync::Arc;

use at_core::config::{AppConfig, RoundingMode};
use at_core::error::CoreError;
use at_core::frame::{CharGrid, PixelBuffer};
use at_core::traits::GlyphRasterizer;

use crate::matcher::CharBrightnessTable;
use crate::partition::{padded_dimensions, tile_size};
use crate::pipeline::RenderPipeline;

/// Allowed tiles-per-row range, from the *unpadded* image.
///
/// # Example
/// ```
/// use at_ascii::state::ResolutionBounds;
/// let bounds = ResolutionBounds::for_image(100, 50);
/// assert_eq!((bounds.min, bounds.max), (2, 100));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolutionBounds {
    /// `max(1, width / height)`.
    pub min: u32,
    /// `width`.
    pub max: u32,
}

impl ResolutionBounds {
    /// Bounds for a `width × height` image.
    #[must_use]
    pub fn for_image(width: u32, height: u32) -> Self {
        Self {
            min: (width / height.max(1)).max(1),
            max: width,
        }
    }

    /// Whether `resolution` lies in `[min, max]`.
    #[must_use]
    pub fn contains(&self, resolution: u32) -> bool {
        (self.min..=self.max).contains(&resolution)
    }
}

/// Direction of a resolution change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionStep {
    /// Double.
    Up,
    /// Halve.
    Down,
}

/// Session state between commands: what to render, and what must be rebuilt.
///
/// Membership edits only mark the table dirty; a resolution or image change
/// only marks the pipeline dirty. Nothing is rebuilt before [`render`](Self::render).
pub struct ConfigState {
    image: Arc<PixelBuffer>,
    glyphs: Arc<dyn GlyphRasterizer>,
    charset: BTreeSet<char>,
    resolution: u32,
    bounds: ResolutionBounds,
    rounding: RoundingMode,
    /// Live table while no pipeline owns it.
    table: Option<CharBrightnessTable>,
    pipeline: Option<RenderPipeline>,
    table_dirty: bool,
    pipeline_dirty: bool,
}

impl ConfigState {
    /// Start a session on `image` from `config`.
    ///
    /// The configured resolution is kept when it tiles the image; otherwise
    /// the smallest power of two that does is used.
    ///
    /// # Errors
    /// [`CoreError::EmptyCharacterSet`] for an empty charset,
    /// [`CoreError::InvalidResolution`] if no resolution can tile the image,
    /// or a rasterizer error.
    pub fn new(
        image: Arc<PixelBuffer>,
        config: &AppConfig,
        glyphs: Arc<dyn GlyphRasterizer>,
    ) -> Result<Self, CoreError> {
        let charset: BTreeSet<char> = config.charset.chars().collect();
        let mut table = CharBrightnessTable::new(charset.iter().copied(), glyphs.as_ref())?;
        table.set_rounding_mode(config.rounding);

        let bounds = ResolutionBounds::for_image(image.width, image.height);
        let resolution = initial_resolution(&image, bounds, config.resolution)?;

        Ok(Self {
            image,
            glyphs,
            charset,
            resolution,
            bounds,
            rounding: config.rounding,
            table: Some(table),
            pipeline: None,
            table_dirty: false,
            pipeline_dirty: true,
        })
    }

    /// Replace the image; bounds are recomputed and the resolution reset to
    /// `default_resolution` (or its nearest usable power of two).
    ///
    /// # Errors
    /// [`CoreError::InvalidResolution`] if no resolution can tile the new
    /// image; the session keeps the old one.
    pub fn set_image(
        &mut self,
        image: Arc<PixelBuffer>,
        default_resolution: u32,
    ) -> Result<(), CoreError> {
        let bounds = ResolutionBounds::for_image(image.width, image.height);
        let resolution = initial_resolution(&image, bounds, default_resolution)?;
        self.image = image;
        self.bounds = bounds;
        self.resolution = resolution;
        self.pipeline_dirty = true;
        Ok(())
    }

    /// Add characters, all or nothing. Returns how many were new.
    ///
    /// Every new character is rasterized before the set changes.
    ///
    /// # Errors
    /// The rasterizer's error for the first character it cannot draw.
    pub fn add_chars<I: IntoIterator<Item = char>>(&mut self, chars: I) -> Result<usize, CoreError> {
        let fresh: BTreeSet<char> = chars
            .into_iter()
            .filter(|c| !self.charset.contains(c))
            .collect();
        for &ch in &fresh {
            self.glyphs.rasterize(ch)?;
        }
        if !fresh.is_empty() {
            self.charset.extend(&fresh);
            self.table_dirty = true;
        }
        Ok(fresh.len())
    }

    /// Remove characters, all or nothing. Returns how many were present.
    ///
    /// # Errors
    /// [`CoreError::EmptyCharacterSet`] if the set would become empty.
    pub fn remove_chars<I: IntoIterator<Item = char>>(&mut self, chars: I) -> Result<usize, CoreError> {
        let doomed: BTreeSet<char> = chars
            .into_iter()
            .filter(|c| self.charset.contains(c))
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }
        if doomed.len() == self.charset.len() {
            return Err(CoreError::EmptyCharacterSet);
        }
        self.charset.retain(|c| !doomed.contains(c));
        self.table_dirty = true;
        Ok(doomed.len())
    }

    /// Double or halve the resolution.
    ///
    /// # Errors
    /// [`CoreError::InvalidResolution`] if the result leaves the bounds.
    pub fn set_resolution(&mut self, step: ResolutionStep) -> Result<u32, CoreError> {
        let next = match step {
            ResolutionStep::Up => self.resolution.saturating_mul(2),
            ResolutionStep::Down => self.resolution / 2,
        };
        self.set_resolution_to(next)
    }

    /// Set an explicit resolution. Tiling is checked at render time.
    ///
    /// # Errors
    /// [`CoreError::InvalidResolution`] if `resolution` leaves the bounds.
    pub fn set_resolution_to(&mut self, resolution: u32) -> Result<u32, CoreError> {
        if !self.bounds.contains(resolution) {
            return Err(CoreError::resolution(
                resolution,
                format!("outside [{}, {}]", self.bounds.min, self.bounds.max),
            ));
        }
        if resolution != self.resolution {
            self.resolution = resolution;
            self.pipeline_dirty = true;
        }
        Ok(resolution)
    }

    /// Change the rounding policy of the live table. No rebuild.
    pub fn set_rounding_mode(&mut self, mode: RoundingMode) {
        self.rounding = mode;
        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.set_rounding_mode(mode);
        }
        if let Some(table) = self.table.as_mut() {
            table.set_rounding_mode(mode);
        }
    }

    /// Rebuild what is dirty, then run the pipeline.
    ///
    /// # Errors
    /// A rasterizer error while rebuilding the table, or
    /// [`CoreError::InvalidResolution`] if the resolution does not tile the
    /// padded image. Dirty flags stay set on failure.
    pub fn render(&mut self) -> Result<CharGrid, CoreError> {
        if self.table_dirty {
            let mut table =
                CharBrightnessTable::new(self.charset.iter().copied(), self.glyphs.as_ref())?;
            table.set_rounding_mode(self.rounding);
            log::debug!("Table rebuilt ({} chars)", table.len());
            self.table = Some(table);
            self.pipeline = None;
            self.table_dirty = false;
            self.pipeline_dirty = true;
        }

        if !self.pipeline_dirty
            && let Some(pipeline) = self.pipeline.as_mut()
        {
            return pipeline.run();
        }

        let table = self.take_table()?;
        log::debug!("Pipeline rebuilt at resolution {}", self.resolution);
        self.pipeline_dirty = false;
        self.pipeline
            .insert(RenderPipeline::new(
                Arc::clone(&self.image),
                self.resolution,
                table,
            ))
            .run()
    }

    fn take_table(&mut self) -> Result<CharBrightnessTable, CoreError> {
        if let Some(table) = self.table.take() {
            return Ok(table);
        }
        if let Some(pipeline) = self.pipeline.take() {
            return Ok(pipeline.into_table());
        }
        let mut table = CharBrightnessTable::new(self.charset.iter().copied(), self.glyphs.as_ref())?;
        table.set_rounding_mode(self.rounding);
        Ok(table)
    }

    /// Active characters, ascending.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.charset.iter().copied()
    }

    /// Tiles per row.
    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Resolution bounds of the current image.
    #[must_use]
    pub fn bounds(&self) -> ResolutionBounds {
        self.bounds
    }

    /// Current rounding policy.
    #[must_use]
    pub fn rounding_mode(&self) -> RoundingMode {
        self.rounding
    }

    /// The live table, unless a rebuild is pending.
    #[must_use]
    pub fn table(&self) -> Option<&CharBrightnessTable> {
        if self.table_dirty {
            return None;
        }
        self.table
            .as_ref()
            .or_else(|| self.pipeline.as_ref().map(RenderPipeline::table))
    }

    /// Membership changed since the last table build.
    #[must_use]
    pub fn is_table_dirty(&self) -> bool {
        self.table_dirty
    }

    /// Geometry or table changed since the last pipeline build.
    #[must_use]
    pub fn is_pipeline_dirty(&self) -> bool {
        self.pipeline_dirty
    }
}

/// `requested` if it tiles the padded image within bounds, else the smallest
/// power of two that does.
fn initial_resolution(
    image: &PixelBuffer,
    bounds: ResolutionBounds,
    requested: u32,
) -> Result<u32, CoreError> {
    let (width, height) = padded_dimensions(image.width, image.height);
    let usable = |r: u32| bounds.contains(r) && tile_size(width, height, r).is_ok();
    if usable(requested) {
        return Ok(requested);
    }
    let fallback = (0..u32::BITS)
        .map(|shift| 1u32 << shift)
        .take_while(|&r| r <= bounds.max)
        .find(|&r| usable(r))
        .ok_or_else(|| {
            CoreError::resolution(
                requested,
                format!("no resolution tiles a {}×{} image", image.width, image.height),
            )
        })?;
    log::warn!("Resolution {requested} unusable for this image, using {fallback}");
    Ok(fallback)
}
