use std::sync::Arc;

use anyhow::Result;
use at_ascii::ConfigState;
use at_ascii::glyph::{BuiltinGlyphs, FontGlyphs};
use at_core::config::AppConfig;
use at_core::traits::GlyphRasterizer;
use at_source::ImageSource;
use clap::Parser;

pub mod cli;
pub mod output;
pub mod shell;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config
    let config = resolve_config(&cli)?;

    // 4. Glyphes et image
    let glyphs = resolve_glyphs(&config)?;
    log::info!("Glyph rasterizer: {}", glyphs.name());
    let source = ImageSource::open(&cli.image)?;

    // 5. Session
    let state = ConfigState::new(source.frame(), &config, glyphs)?;
    log::info!(
        "Session ready: {} chars, resolution {}",
        state.chars().count(),
        state.resolution()
    );

    let stdout = std::io::stdout();
    let mut shell = shell::Shell::new(state, &config, stdout.lock());
    if cli.once {
        shell.render()?;
    } else {
        shell.run(std::io::stdin().lock())?;
    }
    Ok(())
}

fn resolve_config(cli: &cli::Cli) -> Result<AppConfig> {
    let mut config = if cli.config.exists() {
        at_core::config::load_config(&cli.config)?
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        AppConfig::default()
    };

    if let Some(ref name) = cli.preset {
        let Some(chars) = at_core::charset::preset(name) else {
            anyhow::bail!("Preset inconnu : {name}. Presets : digits, compact, standard");
        };
        config.charset = chars.to_string();
    }
    if let Some(ref font) = cli.font {
        config.font = Some(font.clone());
    }
    Ok(config)
}

fn resolve_glyphs(config: &AppConfig) -> Result<Arc<dyn GlyphRasterizer>> {
    match config.font {
        Some(ref path) => Ok(Arc::new(FontGlyphs::open(path)?)),
        None => Ok(Arc::new(BuiltinGlyphs)),
    }
}
