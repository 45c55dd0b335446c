//! Console writer used for section banners.
use std::io::{self, Write};

pub const DEFAULT_BANNER_WIDTH: usize = 80;

/// Terminal-writer capability of the host runner.
pub trait Console {
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Write a full-width separator line with `title` centered in it.
    fn sep(&mut self, fill: char, title: &str) -> io::Result<()>;
}

/// [`Console`] over any writer.
#[derive(Debug)]
pub struct TerminalConsole<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> TerminalConsole<W> {
    pub fn new(out: W, width: usize) -> Self {
        Self { out, width }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalConsole<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), DEFAULT_BANNER_WIDTH)
    }
}

impl<W: Write> Console for TerminalConsole<W> {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn sep(&mut self, fill: char, title: &str) -> io::Result<()> {
        let line = separator_line(fill, title, self.width);
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }
}

pub fn separator_line(fill: char, title: &str, width: usize) -> String {
    if title.is_empty() {
        return fill.to_string().repeat(width);
    }
    let title = format!(" {title} ");
    let remaining = width.saturating_sub(title.chars().count());
    let left = (remaining / 2).max(1);
    let right = (remaining - remaining / 2).max(1);
    format!(
        "{}{}{}",
        fill.to_string().repeat(left),
        title,
        fill.to_string().repeat(right)
    )
}
