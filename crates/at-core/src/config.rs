use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset;
use crate::error::CoreError;

/// Configuration de session, chargée depuis TOML.
///
/// Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use at_core::config::{AppConfig, RoundingMode};
/// let config = AppConfig::default();
/// assert_eq!(config.resolution, 2);
/// assert_eq!(config.rounding, RoundingMode::Nearest);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    // === Rendu ===
    /// Initial character set, one entry per char (duplicates are ignored).
    pub charset: String,
    /// Initial tiles per row.
    pub resolution: u32,
    /// Initial rounding policy.
    pub rounding: RoundingMode,
    /// TTF/OTF used to measure glyphs. `None` = built-in bitmap font.
    pub font: Option<PathBuf>,

    // === Sortie ===
    /// Where `asciiArt` writes its grid.
    pub output: OutputTarget,
    /// Destination file of the HTML writer.
    pub html_path: PathBuf,
    /// CSS font family of the HTML writer.
    pub html_font: String,
}

/// Policy turning a fractional table index into an integer one.
///
/// # Example
/// ```
/// use at_core::config::RoundingMode;
/// assert_eq!(RoundingMode::Up.apply(2.1), 3);
/// assert_eq!(RoundingMode::Down.apply(2.9), 2);
/// assert_eq!(RoundingMode::Nearest.apply(2.5), 3);
/// assert_eq!(RoundingMode::Nearest.apply(2.49), 2);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum RoundingMode {
    /// Ceiling.
    Up,
    /// Floor.
    Down,
    /// Round half up.
    #[default]
    Nearest,
}

impl RoundingMode {
    /// Apply the policy to a fractional index.
    #[inline]
    #[must_use]
    pub fn apply(self, value: f64) -> i64 {
        match self {
            Self::Up => value.ceil() as i64,
            Self::Down => value.floor() as i64,
            Self::Nearest => (value + 0.5).floor() as i64,
        }
    }

    /// Short lowercase label for messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Nearest => "nearest",
        }
    }
}

/// Output sink selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum OutputTarget {
    /// One line per grid row on stdout.
    #[default]
    Console,
    /// Standalone HTML document.
    Html,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            charset: charset::CHARSET_DIGITS.to_string(),
            resolution: 2,
            rounding: RoundingMode::Nearest,
            font: None,
            output: OutputTarget::Console,
            html_path: PathBuf::from("output.html"),
            html_font: "Courier New".to_string(),
        }
    }
}

impl AppConfig {
    /// Reject values no session could start from.
    ///
    /// Resolution bounds depend on the image and are checked when the
    /// session is created.
    ///
    /// # Errors
    /// [`CoreError::EmptyCharacterSet`] for an empty charset,
    /// [`CoreError::InvalidResolution`] for a zero resolution.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.charset.is_empty() {
            return Err(CoreError::EmptyCharacterSet);
        }
        if self.resolution == 0 {
            return Err(CoreError::resolution(0, "must be positive"));
        }
        Ok(())
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    render: Option<RenderSection>,
    output: Option<OutputSection>,
}

/// Render section, all fields optional for partial override.
#[derive(Deserialize)]
struct RenderSection {
    charset: Option<String>,
    preset: Option<String>,
    resolution: Option<u32>,
    rounding: Option<RoundingMode>,
    font: Option<PathBuf>,
}

/// Output section, all fields optional.
#[derive(Deserialize)]
struct OutputSection {
    target: Option<OutputTarget>,
    html_path: Option<PathBuf>,
    html_font: Option<String>,
}

/// Parse TOML text and merge it over the defaults.
///
/// `preset` wins over `charset` when both are present.
///
/// # Errors
/// Returns an error on malformed TOML, an unknown preset, or a config that
/// fails [`AppConfig::validate`].
///
/// # Example
/// ```
/// use at_core::config::{parse_config, OutputTarget};
/// let config = parse_config("[output]\ntarget = \"Html\"\n").unwrap();
/// assert_eq!(config.output, OutputTarget::Html);
/// assert_eq!(config.resolution, 2);
/// ```
pub fn parse_config(content: &str) -> Result<AppConfig> {
    let file: ConfigFile = toml::from_str(content).context("TOML parse error")?;
    let mut config = AppConfig::default();

    if let Some(r) = file.render {
        if let Some(v) = r.charset {
            config.charset = v;
        }
        if let Some(name) = r.preset {
            let chars = charset::preset(&name)
                .ok_or_else(|| CoreError::Config(format!("unknown preset '{name}'")))?;
            config.charset = chars.to_string();
        }
        if let Some(v) = r.resolution {
            config.resolution = v;
        }
        if let Some(v) = r.rounding {
            config.rounding = v;
        }
        if r.font.is_some() {
            config.font = r.font;
        }
    }

    if let Some(o) = file.output {
        if let Some(v) = o.target {
            config.output = v;
        }
        if let Some(v) = o.html_path {
            config.html_path = v;
        }
        if let Some(v) = o.html_font {
            config.html_font = v;
        }
    }

    config.validate()?;
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use at_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let config = parse_config(&content).with_context(|| format!("In {}", path.display()))?;
    log::info!("Config loaded from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rounding_negative_and_exact_values() {
        assert_eq!(RoundingMode::Up.apply(3.0), 3);
        assert_eq!(RoundingMode::Down.apply(3.0), 3);
        assert_eq!(RoundingMode::Nearest.apply(0.0), 0);
        assert_eq!(RoundingMode::Down.apply(-0.5), -1);
        assert_eq!(RoundingMode::Nearest.apply(-0.5), 0);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(parse_config("").unwrap(), AppConfig::default());
    }

    #[test]
    fn shipped_default_toml_matches_defaults() {
        let shipped = include_str!("../../../config/default.toml");
        assert_eq!(parse_config(shipped).unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_render_section_overrides() {
        let config = parse_config(
            r#"
            [render]
            resolution = 64
            rounding = "Down"
            font = "fonts/mono.ttf"
            "#,
        )
        .unwrap();
        assert_eq!(config.resolution, 64);
        assert_eq!(config.rounding, RoundingMode::Down);
        assert_eq!(config.font, Some(PathBuf::from("fonts/mono.ttf")));
        assert_eq!(config.charset, charset::CHARSET_DIGITS);
    }

    #[test]
    fn preset_beats_charset() {
        let config = parse_config(
            r#"
            [render]
            charset = "ab"
            preset = "compact"
            "#,
        )
        .unwrap();
        assert_eq!(config.charset, charset::CHARSET_COMPACT);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert!(parse_config("[render]\npreset = \"bogus\"\n").is_err());
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let err = parse_config("[render]\nresolution = 0\n").unwrap_err();
        let core = err.downcast_ref::<CoreError>().unwrap();
        assert!(matches!(core, CoreError::InvalidResolution { resolution: 0, .. }));
    }

    #[test]
    fn empty_charset_is_rejected() {
        let err = parse_config("[render]\ncharset = \"\"\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<CoreError>(),
            Some(&CoreError::EmptyCharacterSet)
        );
    }

    #[test]
    fn bad_enum_value_fails_to_parse() {
        assert!(parse_config("[render]\nrounding = \"Sideways\"\n").is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\ntarget = \"Html\"\nhtml_font = \"Menlo\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.output, OutputTarget::Html);
        assert_eq!(config.html_font, "Menlo");
        assert_eq!(config.html_path, PathBuf::from("output.html"));
    }

    #[test]
    fn load_config_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }
}
