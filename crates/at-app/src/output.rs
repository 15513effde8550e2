use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use at_core::frame::CharGrid;
use at_core::traits::GridWriter;

/// One line per grid row.
pub struct ConsoleWriter<W: Write> {
    out: W,
}

impl<W: Write> ConsoleWriter<W> {
    /// Wrap a sink (usually `stdout().lock()`).
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> GridWriter for ConsoleWriter<W> {
    fn write_grid(&mut self, grid: &CharGrid) -> Result<()> {
        let mut line = String::with_capacity(grid.cols as usize + 1);
        for row in grid.rows() {
            line.clear();
            line.extend(row.iter());
            line.push('\n');
            self.out.write_all(line.as_bytes())?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Standalone HTML document, written to a file on each call.
pub struct HtmlWriter {
    path: PathBuf,
    font: String,
}

impl HtmlWriter {
    /// Target file and CSS font family.
    pub fn new(path: impl Into<PathBuf>, font: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            font: font.into(),
        }
    }

    /// Destination file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GridWriter for HtmlWriter {
    fn write_grid(&mut self, grid: &CharGrid) -> Result<()> {
        let html = render_html(grid, &self.font);
        std::fs::write(&self.path, html)
            .with_context(|| format!("Cannot write {}", self.path.display()))?;
        log::info!("HTML written to {}", self.path.display());
        Ok(())
    }
}

/// Grid as a monospace `<pre>` block. Cell text and font name are escaped.
#[must_use]
pub fn render_html(grid: &CharGrid, font: &str) -> String {
    let mut html = String::with_capacity(grid.cells.len() * 2 + 512);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>asciitile</title>\n</head>\n<body style=\"margin:0\">\n");
    html.push_str(&format!(
        "<pre style=\"font-family:'{}',monospace;font-size:8px;line-height:8px;letter-spacing:1px\">\n",
        escape(&font.replace('\'', ""))
    ));
    for row in grid.rows() {
        for &ch in row {
            push_escaped(&mut html, ch);
        }
        html.push('\n');
    }
    html.push_str("</pre>\n</body>\n</html>\n");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        push_escaped(&mut out, ch);
    }
    out
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        _ => out.push(ch),
    }
}
