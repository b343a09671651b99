//! # Terminal Output
//!
//! Plain-text writer for command results. Results go to stdout; logs go to
//! stderr through `tracing`, so output can be piped.

use std::fmt::Display;
use std::io::{self, Write};

use crate::error::AppResult;

/// Width of the label column in [`Terminal::field`].
const LABEL_WIDTH: usize = 14;

/// Line-oriented writer over any `io::Write`.
pub struct Terminal<W: Write> {
    out: W,
}

impl Terminal<io::Stdout> {
    pub fn stdout() -> Self {
        Terminal::new(io::stdout())
    }
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W) -> Self {
        Terminal { out }
    }

    /// One line of text.
    pub fn line(&mut self, text: impl Display) -> AppResult<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    pub fn blank(&mut self) -> AppResult<()> {
        writeln!(self.out)?;
        Ok(())
    }

    /// Title underlined to its own width.
    pub fn heading(&mut self, title: &str) -> AppResult<()> {
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "{}", "─".repeat(title.chars().count()))?;
        Ok(())
    }

    /// `  label        value`, skipped entirely when `value` is `None`.
    pub fn field(&mut self, label: &str, value: Option<impl Display>) -> AppResult<()> {
        if let Some(value) = value {
            writeln!(self.out, "  {label:<LABEL_WIDTH$} {value}")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> AppResult<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(term: Terminal<Vec<u8>>) -> String {
        String::from_utf8(term.into_inner()).unwrap()
    }

    #[test]
    fn test_heading_underline_matches_width() {
        let mut term = Terminal::new(Vec::new());
        term.heading("Épicerie").unwrap();
        assert_eq!(output(term), "Épicerie\n────────\n");
    }

    #[test]
    fn test_fields_align_and_skip_missing() {
        let mut term = Terminal::new(Vec::new());
        term.field("Téléphone", Some("622 00 00 00")).unwrap();
        term.field("Adresse", None::<&str>).unwrap();
        term.line("fin").unwrap();

        assert_eq!(output(term), "  Téléphone      622 00 00 00\nfin\n");
    }
}
