//! Output sink for everything the operator sees.

use std::io::Write;

/// Semantic style of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Normal,
    Success,
    Error,
    Highlight,
}

impl Style {
    fn ansi(self) -> Option<&'static str> {
        match self {
            Style::Normal => None,
            Style::Success => Some("\x1b[32m"),
            Style::Error => Some("\x1b[31m"),
            Style::Highlight => Some("\x1b[1;36m"),
        }
    }
}

/// Where rendered lines go.
pub trait RenderSink {
    /// Emit one logical line (it may itself contain newlines).
    fn render(&mut self, text: &str, style: Style);
}

/// Line-oriented terminal output, with or without ANSI colors.
pub struct TerminalSink<W: Write> {
    out: W,
    color: bool,
}

impl TerminalSink<std::io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(std::io::stdout(), color)
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn render(&mut self, text: &str, style: Style) {
        let _ = match style.ansi().filter(|_| self.color) {
            Some(code) => writeln!(self.out, "{code}{text}\x1b[0m"),
            None => writeln!(self.out, "{text}"),
        };
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(color: bool, lines: &[(&str, Style)]) -> String {
        let mut sink = TerminalSink::new(Vec::new(), color);
        for (text, style) in lines {
            sink.render(text, *style);
        }
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn test_plain_output_has_no_escape_codes() {
        let out = rendered(
            false,
            &[("hello", Style::Success), ("oops", Style::Error)],
        );
        assert_eq!(out, "hello\noops\n");
    }

    #[test]
    fn test_colored_output() {
        let out = rendered(true, &[("bad", Style::Error), ("plain", Style::Normal)]);
        assert_eq!(out, "\x1b[31mbad\x1b[0m\nplain\n");
    }
}
