use std::path::PathBuf;

use clap::Parser;

/// asciitile: brightness-matched ASCII art from a raster image.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image source (PNG, JPEG, BMP, GIF).
    pub image: PathBuf,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// TTF/OTF used to measure glyph ink. Overrides `[render] font`.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Named charset preset: digits, compact, standard. Overrides `[render]`.
    #[arg(long)]
    pub preset: Option<String>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Render once to the configured output and exit.
    #[arg(long, default_value_t = false)]
    pub once: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["asciitile", "cat.png"]).unwrap();
        assert_eq!(cli.image, PathBuf::from("cat.png"));
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
        assert_eq!(cli.log_level, "warn");
        assert!(!cli.once);
        assert!(cli.font.is_none());
    }

    #[test]
    fn image_is_required() {
        assert!(Cli::try_parse_from(["asciitile"]).is_err());
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "asciitile",
            "cat.png",
            "--once",
            "--preset",
            "compact",
            "-c",
            "my.toml",
        ])
        .unwrap();
        assert!(cli.once);
        assert_eq!(cli.preset.as_deref(), Some("compact"));
        assert_eq!(cli.config, PathBuf::from("my.toml"));
    }
}
