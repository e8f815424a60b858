//! Line-oriented output sink with a configurable indent unit and line end.

use std::io::{self, Write};

/// Wraps an [`io::Write`] sink, prefixing the first text of every line with
/// the current indentation.
///
/// Text passed to [`write_str`](Self::write_str) is written verbatim, so
/// line breaks inside a literal never pick up indentation. Only
/// [`eol`](Self::eol) ends a line.
#[derive(Debug)]
pub struct IndentingWriter<W: Write> {
    inner: W,
    indent_unit: String,
    line_end: String,
    level: usize,
    at_line_start: bool,
}

impl<W: Write> IndentingWriter<W> {
    /// Creates a writer at indentation level zero.
    pub fn new(inner: W, indent_unit: impl Into<String>, line_end: impl Into<String>) -> Self {
        Self {
            inner,
            indent_unit: indent_unit.into(),
            line_end: line_end.into(),
            level: 0,
            at_line_start: true,
        }
    }

    /// Writes `s`, indenting first if nothing has been written on this line.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying sink.
    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        if s.is_empty() {
            return Ok(());
        }
        if self.at_line_start {
            for _ in 0..self.level {
                self.inner.write_all(self.indent_unit.as_bytes())?;
            }
            self.at_line_start = false;
        }
        self.inner.write_all(s.as_bytes())
    }

    /// Ends the current line.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying sink.
    pub fn eol(&mut self) -> io::Result<()> {
        self.inner.write_all(self.line_end.as_bytes())?;
        self.at_line_start = true;
        Ok(())
    }

    /// Writes `s` and ends the line.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying sink.
    pub fn write_line(&mut self, s: &str) -> io::Result<()> {
        self.write_str(s)?;
        self.eol()
    }

    /// Increases the indentation by one unit.
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Decreases the indentation by one unit.
    pub fn outdent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// The current indentation level.
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Returns true if nothing has been written since the last line end.
    #[must_use]
    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    /// Flushes the underlying sink.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    /// Returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_only_at_line_start() {
        let mut out = IndentingWriter::new(Vec::new(), "  ", "\r\n");
        out.write_line("a").expect("write");
        out.indent();
        out.write_str("b").expect("write");
        out.write_str("c\nd").expect("write");
        out.eol().expect("write");
        out.outdent();
        out.outdent();
        out.write_line("e").expect("write");
        assert_eq!(out.into_inner(), b"a\r\n  bc\nd\r\ne\r\n".to_vec());
    }
}
