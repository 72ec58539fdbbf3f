//! Text styling for rendered traces

use colored::{Color, Colorize};
use std::io::IsTerminal;

/// Foreground color plus attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bold: bool,
    pub dimmed: bool,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bold: false,
            dimmed: false,
        }
    }

    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn dimmed(mut self) -> Self {
        self.dimmed = true;
        self
    }
}

/// Applies styles, or passes text through untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Painter {
    Ansi,
    Plain,
}

impl Painter {
    /// ANSI when stderr is a terminal and `NO_COLOR` is unset
    pub fn detect() -> Self {
        if std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal() {
            Self::Ansi
        } else {
            Self::Plain
        }
    }

    pub fn paint(&self, text: &str, style: Option<&Style>) -> String {
        let (Self::Ansi, Some(style)) = (self, style) else {
            return text.to_string();
        };

        let mut styled = text.normal();
        if let Some(color) = style.fg {
            styled = styled.color(color);
        }
        if style.bold {
            styled = styled.bold();
        }
        if style.dimmed {
            styled = styled.dimmed();
        }
        styled.to_string()
    }
}
