//! Character brightness table: raw glyph coverage, renormalized per set.
use at_core::config::RoundingMode;
use at_core::error::CoreError;
use at_core::traits::GlyphRasterizer;

/// One character of the table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharEntry {
    /// The character.
    pub ch: char,
    /// Fraction of "on" cells in its 16×16 glyph.
    pub raw: f64,
    /// `raw` rescaled to [0, 1] against the current set.
    pub normalized: f64,
}

/// Set of characters sorted by brightness, with nearest-match lookup.
///
/// Entries are kept ascending by normalized brightness, ties by ascending
/// code point. The table is never empty.
///
/// # Example
/// ```
/// use at_ascii::matcher::CharBrightnessTable;
///
/// let table = CharBrightnessTable::from_brightness([('.', 0.05), ('#', 0.6), ('@', 0.4)]).unwrap();
/// assert_eq!(table.lookup(0.0), '.');
/// assert_eq!(table.lookup(1.0), '#');
/// assert_eq!(table.lookup(0.5), '@');
/// ```
#[derive(Clone, Debug)]
pub struct CharBrightnessTable {
    entries: Vec<CharEntry>,
    /// For each entry, index of the first entry sharing its brightness.
    group_start: Vec<usize>,
    rounding: RoundingMode,
    min_brightness: f64,
    max_brightness: f64,
}

impl CharBrightnessTable {
    /// Measure every character with `glyphs` and build the table.
    ///
    /// Duplicate characters are kept once.
    ///
    /// # Errors
    /// [`CoreError::EmptyCharacterSet`] if `chars` is empty, or the
    /// rasterizer's error for a character it cannot draw.
    pub fn new<I>(chars: I, glyphs: &dyn GlyphRasterizer) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = char>,
    {
        let mut measured = Vec::new();
        for ch in chars {
            measured.push((ch, glyphs.rasterize(ch)?.raw_brightness()));
        }
        let table = Self::from_brightness(measured)?;
        log::debug!(
            "Table built: {} chars via {} rasterizer",
            table.len(),
            glyphs.name()
        );
        Ok(table)
    }

    /// Build from precomputed raw brightness values. First occurrence of a
    /// character wins.
    ///
    /// # Errors
    /// [`CoreError::EmptyCharacterSet`] if `entries` is empty.
    pub fn from_brightness<I>(entries: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (char, f64)>,
    {
        let mut table = Self {
            entries: Vec::new(),
            group_start: Vec::new(),
            rounding: RoundingMode::default(),
            min_brightness: 0.0,
            max_brightness: 0.0,
        };
        for (ch, raw) in entries {
            if !table.contains(ch) {
                table.entries.push(CharEntry {
                    ch,
                    raw,
                    normalized: 0.0,
                });
            }
        }
        if table.entries.is_empty() {
            return Err(CoreError::EmptyCharacterSet);
        }
        table.rebuild();
        Ok(table)
    }

    /// Insert `ch`. Returns `false` if it was already present.
    ///
    /// # Errors
    /// The rasterizer's error; the table is left untouched.
    pub fn add_char(&mut self, ch: char, glyphs: &dyn GlyphRasterizer) -> Result<bool, CoreError> {
        if self.contains(ch) {
            return Ok(false);
        }
        let raw = glyphs.rasterize(ch)?.raw_brightness();
        self.entries.push(CharEntry {
            ch,
            raw,
            normalized: 0.0,
        });
        self.rebuild();
        Ok(true)
    }

    /// Remove `ch`. Returns `false` if it was absent.
    ///
    /// # Errors
    /// [`CoreError::EmptyCharacterSet`] if `ch` is the last character; the
    /// table is left untouched.
    pub fn remove_char(&mut self, ch: char) -> Result<bool, CoreError> {
        let Some(pos) = self.entries.iter().position(|e| e.ch == ch) else {
            return Ok(false);
        };
        if self.entries.len() == 1 {
            return Err(CoreError::EmptyCharacterSet);
        }
        self.entries.remove(pos);
        self.rebuild();
        Ok(true)
    }

    /// Rounding policy used by [`lookup`](Self::lookup).
    #[must_use]
    pub fn rounding_mode(&self) -> RoundingMode {
        self.rounding
    }

    /// Change the rounding policy. Takes effect on the next lookup.
    pub fn set_rounding_mode(&mut self, mode: RoundingMode) {
        self.rounding = mode;
    }

    /// Character whose brightness best matches `brightness` ∈ [0, 1].
    ///
    /// Input is clamped to the table's brightness range, scaled to a
    /// fractional index, rounded per the current mode, then clamped into the
    /// table. Landing anywhere inside a group of equally bright characters
    /// yields the group's lowest code point.
    #[must_use]
    pub fn lookup(&self, brightness: f64) -> char {
        let last = self.entries.len() - 1;
        let span = self.max_brightness - self.min_brightness;
        if last == 0 || span <= 0.0 {
            return self.entries[0].ch;
        }
        let clamped = if brightness.is_nan() {
            self.min_brightness
        } else {
            brightness.clamp(self.min_brightness, self.max_brightness)
        };
        let scaled = (clamped - self.min_brightness) / span * last as f64;
        let idx = self.rounding.apply(scaled).clamp(0, last as i64) as usize;
        self.entries[self.group_start[idx]].ch
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `ch` is in the table.
    #[must_use]
    pub fn contains(&self, ch: char) -> bool {
        self.entries.iter().any(|e| e.ch == ch)
    }

    /// Entries in lookup order.
    #[must_use]
    pub fn entries(&self) -> &[CharEntry] {
        &self.entries
    }

    /// Normalized brightness of `ch`, if present.
    #[must_use]
    pub fn normalized(&self, ch: char) -> Option<f64> {
        self.entries.iter().find(|e| e.ch == ch).map(|e| e.normalized)
    }

    /// Renormalize against the current raw range, then re-sort.
    ///
    /// A set whose raw values are all equal normalizes to 0.0 everywhere.
    fn rebuild(&mut self) {
        let (r_min, r_max) = self
            .entries
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
                (lo.min(e.raw), hi.max(e.raw))
            });
        let span = r_max - r_min;
        for entry in &mut self.entries {
            entry.normalized = if span > 0.0 {
                (entry.raw - r_min) / span
            } else {
                0.0
            };
        }
        self.entries.sort_by(|a, b| {
            a.normalized
                .total_cmp(&b.normalized)
                .then_with(|| a.ch.cmp(&b.ch))
        });

        self.group_start.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            let start = match i {
                0 => 0,
                _ if self.entries[i - 1].normalized == entry.normalized => self.group_start[i - 1],
                _ => i,
            };
            self.group_start.push(start);
        }

        self.min_brightness = self.entries.first().map_or(0.0, |e| e.normalized);
        self.max_brightness = self.entries.last().map_or(0.0, |e| e.normalized);
    }
}
