//! Colored console output
//!
//! Handlers that print take a `Painter` explicitly. Library code that resolves
//! commands never prints.

use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use serde::{Deserialize, Serialize};

const ERROR: Style = Style::new()
    .fg_color(Some(anstyle::Color::Ansi(AnsiColor::BrightRed)))
    .effects(Effects::BOLD);
const WARN: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::BrightYellow)));
const SUCCESS: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::BrightGreen)));
const INFO: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::BrightCyan)));
const ACCENT: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::BrightMagenta)));
const DIM: Style = Style::new().effects(Effects::DIMMED);
const BOLD: Style = Style::new().effects(Effects::BOLD);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Color when stderr is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

/// Wraps text in ANSI styles when color is enabled.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    #[must_use]
    pub fn new(choice: ColorChoice) -> Self {
        let color = match choice {
            ColorChoice::Auto => std::io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        Self { color }
    }

    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    #[must_use]
    pub fn paint(&self, style: Style, s: &str) -> String {
        if self.color {
            format!("{style}{s}{style:#}")
        } else {
            s.to_string()
        }
    }

    #[must_use]
    pub fn error(&self, s: &str) -> String {
        self.paint(ERROR, s)
    }

    #[must_use]
    pub fn warn(&self, s: &str) -> String {
        self.paint(WARN, s)
    }

    #[must_use]
    pub fn success(&self, s: &str) -> String {
        self.paint(SUCCESS, s)
    }

    #[must_use]
    pub fn info(&self, s: &str) -> String {
        self.paint(INFO, s)
    }

    #[must_use]
    pub fn accent(&self, s: &str) -> String {
        self.paint(ACCENT, s)
    }

    #[must_use]
    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    #[must_use]
    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_painter_passes_text_through() {
        let painter = Painter::new(ColorChoice::Never);
        assert_eq!(painter.error("boom"), "boom");
        assert_eq!(painter.dim("quiet"), "quiet");
    }

    #[test]
    fn test_colored_painter_wraps_and_resets() {
        let painter = Painter::new(ColorChoice::Always);
        let painted = painter.success("ok");
        assert!(painted.starts_with("\x1b["));
        assert!(painted.contains("ok"));
        assert!(painted.ends_with("\x1b[0m"));
    }
}
