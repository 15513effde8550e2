use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use at_ascii::{ConfigState, ResolutionStep};
use at_core::charset;
use at_core::config::{AppConfig, OutputTarget, RoundingMode};
use at_core::error::CoreError;
use at_core::traits::GridWriter;
use thiserror::Error;

use crate::output::{ConsoleWriter, HtmlWriter};

const PROMPT: &str = ">>> ";

/// One parsed shell line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Leave the shell.
    Exit,
    /// Print the active characters.
    Chars,
    /// Add characters.
    Add(Vec<char>),
    /// Remove characters.
    Remove(Vec<char>),
    /// Print the resolution, or double/halve it.
    Res(Option<ResolutionStep>),
    /// Change the rounding policy.
    Round(RoundingMode),
    /// Change the output sink.
    Output(OutputTarget),
    /// Render and write the grid.
    AsciiArt,
}

/// A refused command. The session is untouched.
#[derive(Error, Debug)]
pub enum ShellError {
    /// First word is not a command.
    #[error("Did not execute due to incorrect command.")]
    UnknownCommand,
    /// `add` without a valid `c`, `a-b`, `all` or `space`.
    #[error("Did not add due to incorrect format.")]
    AddFormat,
    /// The rasterizer cannot draw one of the new characters.
    #[error("Did not add. {0}")]
    AddGlyph(CoreError),
    /// `remove` without a valid argument.
    #[error("Did not remove due to incorrect format.")]
    RemoveFormat,
    /// The removal would empty the set.
    #[error("Did not remove. Character set cannot be empty.")]
    EmptyCharset,
    /// `res` with something other than `up` or `down`.
    #[error("Did not change resolution due to incorrect format.")]
    ResFormat,
    /// Doubling or halving leaves `[min, max]`.
    #[error("Did not change resolution due to exceeding boundaries.")]
    ResBounds,
    /// `round` with something other than `up`, `down` or `abs`.
    #[error("Did not change rounding method due to incorrect format.")]
    RoundFormat,
    /// `output` with something other than `html` or `console`.
    #[error("Did not change output method due to incorrect format.")]
    OutputFormat,
    /// Rebuild or render failed.
    #[error("Did not execute. {0}")]
    Render(CoreError),
    /// The output sink failed.
    #[error("Did not execute. {0:#}")]
    Write(anyhow::Error),
}

/// Parse one input line.
///
/// # Errors
/// The [`ShellError`] naming the malformed command.
pub fn parse_command(line: &str) -> Result<Command, ShellError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Err(ShellError::UnknownCommand);
    };
    let arg = words.next();
    let extra = words.next().is_some();

    match name {
        "exit" => Ok(Command::Exit),
        "chars" => Ok(Command::Chars),
        "asciiArt" => Ok(Command::AsciiArt),
        "add" => arg
            .filter(|_| !extra)
            .and_then(parse_chars)
            .map(Command::Add)
            .ok_or(ShellError::AddFormat),
        "remove" => arg
            .filter(|_| !extra)
            .and_then(parse_chars)
            .map(Command::Remove)
            .ok_or(ShellError::RemoveFormat),
        "res" => match (arg, extra) {
            (None, _) => Ok(Command::Res(None)),
            (Some("up"), false) => Ok(Command::Res(Some(ResolutionStep::Up))),
            (Some("down"), false) => Ok(Command::Res(Some(ResolutionStep::Down))),
            _ => Err(ShellError::ResFormat),
        },
        "round" => match (arg, extra) {
            (Some("up"), false) => Ok(Command::Round(RoundingMode::Up)),
            (Some("down"), false) => Ok(Command::Round(RoundingMode::Down)),
            (Some("abs"), false) => Ok(Command::Round(RoundingMode::Nearest)),
            _ => Err(ShellError::RoundFormat),
        },
        "output" => match (arg, extra) {
            (Some("console"), false) => Ok(Command::Output(OutputTarget::Console)),
            (Some("html"), false) => Ok(Command::Output(OutputTarget::Html)),
            _ => Err(ShellError::OutputFormat),
        },
        _ => Err(ShellError::UnknownCommand),
    }
}

/// `c`, `a-b` (either order), `all` or `space`. Printable ASCII only.
fn parse_chars(arg: &str) -> Option<Vec<char>> {
    match arg {
        "all" => return Some(charset::printable().collect()),
        "space" => return Some(vec![' ']),
        _ => {}
    }
    let chars: Vec<char> = arg.chars().collect();
    match chars[..] {
        [c] if charset::is_printable(c) => Some(vec![c]),
        [a, '-', b] if charset::is_printable(a) && charset::is_printable(b) => {
            Some((a.min(b)..=a.max(b)).collect())
        }
        _ => None,
    }
}

/// Whether the loop goes on after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// `exit` was entered.
    Exit,
}

/// Interactive session over one image.
pub struct Shell<W: Write> {
    state: ConfigState,
    output: OutputTarget,
    html_path: PathBuf,
    html_font: String,
    out: W,
}

impl<W: Write> Shell<W> {
    /// Output settings come from `config`; messages and console grids go to `out`.
    pub fn new(state: ConfigState, config: &AppConfig, out: W) -> Self {
        Self {
            state,
            output: config.output,
            html_path: config.html_path.clone(),
            html_font: config.html_font.clone(),
            out,
        }
    }

    /// Read commands until `exit` or end of input.
    ///
    /// # Errors
    /// Only I/O errors on `input` or `out`; refused commands are printed.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();
        loop {
            write!(self.out, "{PROMPT}")?;
            self.out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(self.out)?;
                break;
            };
            let line = line?;
            log::debug!("Command: {line:?}");
            match parse_command(&line).and_then(|cmd| self.execute(cmd)) {
                Ok(Flow::Exit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => {
                    log::debug!("Refused: {e:?}");
                    writeln!(self.out, "{e}")?;
                }
            }
        }
        Ok(())
    }

    /// Apply one command.
    ///
    /// # Errors
    /// The [`ShellError`] explaining why nothing changed.
    pub fn execute(&mut self, cmd: Command) -> Result<Flow, ShellError> {
        match cmd {
            Command::Exit => return Ok(Flow::Exit),
            Command::Chars => {
                let list: Vec<String> = self.state.chars().map(String::from).collect();
                self.say(&list.join(" "))?;
            }
            Command::Add(chars) => {
                self.state.add_chars(chars).map_err(ShellError::AddGlyph)?;
            }
            Command::Remove(chars) => match self.state.remove_chars(chars) {
                Ok(_) => {}
                Err(CoreError::EmptyCharacterSet) => return Err(ShellError::EmptyCharset),
                Err(e) => return Err(ShellError::Render(e)),
            },
            Command::Res(step) => {
                if let Some(step) = step {
                    self.state
                        .set_resolution(step)
                        .map_err(|_| ShellError::ResBounds)?;
                }
                let message = format!("Resolution set to {}.", self.state.resolution());
                self.say(&message)?;
            }
            Command::Round(mode) => self.state.set_rounding_mode(mode),
            Command::Output(target) => self.output = target,
            Command::AsciiArt => self.render()?,
        }
        Ok(Flow::Continue)
    }

    /// Render once to the current output.
    ///
    /// # Errors
    /// [`ShellError::Render`] or [`ShellError::Write`].
    pub fn render(&mut self) -> Result<(), ShellError> {
        let grid = self.state.render().map_err(ShellError::Render)?;
        let written = match self.output {
            OutputTarget::Console => ConsoleWriter::new(&mut self.out).write_grid(&grid),
            OutputTarget::Html => {
                HtmlWriter::new(&self.html_path, &self.html_font).write_grid(&grid)
            }
        };
        written.map_err(ShellError::Write)
    }

    fn say(&mut self, message: &str) -> Result<(), ShellError> {
        writeln!(self.out, "{message}").map_err(|e| ShellError::Write(e.into()))
    }

    /// Session state.
    pub fn state(&self) -> &ConfigState {
        &self.state
    }

    /// Current output sink.
    pub fn output(&self) -> OutputTarget {
        self.output
    }

    /// Recover the message sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use at_ascii::glyph::BuiltinGlyphs;
    use at_core::frame::PixelBuffer;
    use at_core::traits::GlyphRasterizer;

    use super::*;

    fn shell(width: u32, height: u32) -> Shell<Vec<u8>> {
        let config = AppConfig::default();
        let image = Arc::new(PixelBuffer::new(width, height));
        let state = ConfigState::new(image, &config, Arc::new(BuiltinGlyphs)).unwrap();
        Shell::new(state, &config, Vec::new())
    }

    fn transcript(mut shell: Shell<Vec<u8>>, script: &str) -> String {
        shell.run(Cursor::new(script)).unwrap();
        String::from_utf8(shell.into_inner()).unwrap()
    }

    #[test]
    fn parses_char_arguments() {
        assert_eq!(parse_command("add x").unwrap(), Command::Add(vec!['x']));
        assert_eq!(parse_command("add space").unwrap(), Command::Add(vec![' ']));
        assert_eq!(
            parse_command("remove c-a").unwrap(),
            Command::Remove(vec!['a', 'b', 'c'])
        );
        assert_eq!(parse_command("add -").unwrap(), Command::Add(vec!['-']));
        match parse_command("add all").unwrap() {
            Command::Add(chars) => assert_eq!(chars.len(), 95),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_char_arguments() {
        assert!(matches!(parse_command("add"), Err(ShellError::AddFormat)));
        assert!(matches!(parse_command("add ab"), Err(ShellError::AddFormat)));
        assert!(matches!(parse_command("add é"), Err(ShellError::AddFormat)));
        assert!(matches!(parse_command("add a b"), Err(ShellError::AddFormat)));
        assert!(matches!(parse_command("remove a+c"), Err(ShellError::RemoveFormat)));
    }

    #[test]
    fn parses_settings() {
        assert_eq!(parse_command("res").unwrap(), Command::Res(None));
        assert_eq!(
            parse_command("  res   down ").unwrap(),
            Command::Res(Some(ResolutionStep::Down))
        );
        assert_eq!(
            parse_command("round abs").unwrap(),
            Command::Round(RoundingMode::Nearest)
        );
        assert_eq!(
            parse_command("output html").unwrap(),
            Command::Output(OutputTarget::Html)
        );
        assert!(matches!(parse_command("res sideways"), Err(ShellError::ResFormat)));
        assert!(matches!(parse_command("round"), Err(ShellError::RoundFormat)));
        assert!(matches!(parse_command("output pdf"), Err(ShellError::OutputFormat)));
        assert!(matches!(parse_command("paint"), Err(ShellError::UnknownCommand)));
        assert!(matches!(parse_command(""), Err(ShellError::UnknownCommand)));
    }

    #[test]
    fn chars_lists_ascending() {
        let out = transcript(shell(8, 8), "add a\nchars\nexit\n");
        assert!(out.contains("0 1 2 3 4 5 6 7 8 9 a\n"));
    }

    #[test]
    fn res_reports_and_respects_bounds() {
        let out = transcript(shell(100, 50), "res\nres down\nres up\nexit\n");
        assert!(out.contains("Resolution set to 2.\n"));
        assert!(out.contains("Did not change resolution due to exceeding boundaries.\n"));
        assert!(out.contains("Resolution set to 4.\n"));
    }

    #[test]
    fn undrawable_add_prints_refusal_and_art_still_renders() {
        struct DigitsOnly;
        impl GlyphRasterizer for DigitsOnly {
            fn rasterize(&self, ch: char) -> Result<at_core::GlyphBitmap, CoreError> {
                if ch.is_ascii_digit() {
                    BuiltinGlyphs.rasterize(ch)
                } else {
                    Err(CoreError::GlyphUnavailable(ch))
                }
            }
            fn name(&self) -> &'static str {
                "digits-only"
            }
        }

        let config = AppConfig::default();
        let image = Arc::new(PixelBuffer::new(8, 8));
        let state = ConfigState::new(image, &config, Arc::new(DigitsOnly)).unwrap();
        let out = transcript(
            Shell::new(state, &config, Vec::new()),
            "add all\nchars\nasciiArt\nexit\n",
        );
        assert!(out.contains("Did not add. No glyph available for ' '\n"));
        assert!(out.contains("0 1 2 3 4 5 6 7 8 9\n"));
        assert!(out.contains("11\n11\n"));
    }

    #[test]
    fn failed_remove_keeps_charset() {
        let mut sh = shell(8, 8);
        assert!(matches!(
            sh.execute(Command::Remove(charset::printable().collect())),
            Err(ShellError::EmptyCharset)
        ));
        assert_eq!(sh.state().chars().count(), 10);
    }

    #[test]
    fn ascii_art_to_console() {
        // 8×8 black at 2 tiles per row: a 2×2 grid of the inkless-most digit.
        let out = transcript(shell(8, 8), "asciiArt\nexit\n");
        assert!(out.contains("11\n11\n"));
    }

    #[test]
    fn ascii_art_to_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.html");
        let config = AppConfig {
            output: OutputTarget::Html,
            html_path: path.clone(),
            ..AppConfig::default()
        };
        let image = Arc::new(PixelBuffer::new(8, 8));
        let state = ConfigState::new(image, &config, Arc::new(BuiltinGlyphs)).unwrap();
        let mut sh = Shell::new(state, &config, Vec::new());
        sh.execute(Command::AsciiArt).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("11\n11\n</pre>"));
    }

    #[test]
    fn output_switch_is_remembered() {
        let mut sh = shell(8, 8);
        sh.execute(Command::Output(OutputTarget::Html)).unwrap();
        assert_eq!(sh.output(), OutputTarget::Html);
    }

    #[test]
    fn unknown_command_prints_one_message_and_continues() {
        let out = transcript(shell(8, 8), "bogus\nexit\n");
        assert_eq!(
            out,
            ">>> Did not execute due to incorrect command.\n>>> "
        );
    }

    #[test]
    fn end_of_input_leaves_the_loop() {
        let out = transcript(shell(8, 8), "");
        assert_eq!(out, ">>> \n");
    }
}
