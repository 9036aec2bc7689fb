//! Colour palettes for terminal output.
//!
//! A theme is a plain value handed to whatever renders output; nothing reads
//! a "current theme" from global state.

use colored::{Color, Colorize};

use crate::error::{LintrendError, Result};

pub const DEFAULT_THEME: &str = "default";

/// Foreground colour plus weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub color: Option<Color>,
    pub bold: bool,
}

impl Style {
    const PLAIN: Style = Style {
        color: None,
        bold: false,
    };

    const fn fg(color: Color) -> Self {
        Style {
            color: Some(color),
            bold: false,
        }
    }

    const fn bold(color: Color) -> Self {
        Style {
            color: Some(color),
            bold: true,
        }
    }

    /// Render `text` in this style. A plain style returns the text as-is.
    #[must_use]
    pub fn paint(&self, text: &str) -> String {
        if *self == Self::PLAIN {
            return text.to_string();
        }
        let mut styled = text.normal();
        if let Some(color) = self.color {
            styled = styled.color(color);
        }
        if self.bold {
            styled = styled.bold();
        }
        styled.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub title: Style,
    pub error: Style,
    pub warning: Style,
    pub success: Style,
    pub info: Style,
    pub highlight: Style,
    pub option: Style,
    pub dim: Style,
}

pub const THEMES: [Theme; 5] = [
    Theme {
        id: "default",
        name: "Default (Blue)",
        description: "Classic blue theme with high contrast",
        title: Style::bold(Color::Blue),
        error: Style::fg(Color::Red),
        warning: Style::fg(Color::Yellow),
        success: Style::fg(Color::Green),
        info: Style::fg(Color::Cyan),
        highlight: Style::fg(Color::Magenta),
        option: Style::fg(Color::White),
        dim: Style::fg(Color::BrightBlack),
    },
    Theme {
        id: "ocean",
        name: "Ocean",
        description: "Calming cyan and blue tones",
        title: Style::bold(Color::Cyan),
        error: Style::fg(Color::Red),
        warning: Style::fg(Color::Yellow),
        success: Style::fg(Color::BrightGreen),
        info: Style::fg(Color::Blue),
        highlight: Style::fg(Color::BrightMagenta),
        option: Style::fg(Color::BrightWhite),
        dim: Style::fg(Color::BrightBlack),
    },
    Theme {
        id: "forest",
        name: "Forest",
        description: "Nature-inspired green theme",
        title: Style::bold(Color::Green),
        error: Style::fg(Color::BrightRed),
        warning: Style::fg(Color::BrightYellow),
        success: Style::fg(Color::BrightGreen),
        info: Style::fg(Color::Cyan),
        highlight: Style::fg(Color::Magenta),
        option: Style::fg(Color::White),
        dim: Style::fg(Color::BrightBlack),
    },
    Theme {
        id: "sunset",
        name: "Sunset",
        description: "Warm magenta and orange tones",
        title: Style::bold(Color::Magenta),
        error: Style::fg(Color::BrightRed),
        warning: Style::fg(Color::Yellow),
        success: Style::fg(Color::Green),
        info: Style::fg(Color::BrightBlue),
        highlight: Style::fg(Color::BrightMagenta),
        option: Style::fg(Color::BrightWhite),
        dim: Style::fg(Color::BrightBlack),
    },
    Theme {
        id: "monochrome",
        name: "Monochrome",
        description: "Clean black and white aesthetic",
        title: Style::bold(Color::White),
        error: Style::bold(Color::BrightBlack),
        warning: Style::fg(Color::White),
        success: Style::bold(Color::White),
        info: Style::fg(Color::BrightBlack),
        highlight: Style::bold(Color::White),
        option: Style::fg(Color::White),
        dim: Style::fg(Color::BrightBlack),
    },
];

impl Theme {
    /// A theme that applies no styling at all, for `--no-color` and tests.
    #[must_use]
    pub const fn plain() -> Theme {
        Theme {
            id: "plain",
            name: "Plain",
            description: "No colours",
            title: Style::PLAIN,
            error: Style::PLAIN,
            warning: Style::PLAIN,
            success: Style::PLAIN,
            info: Style::PLAIN,
            highlight: Style::PLAIN,
            option: Style::PLAIN,
            dim: Style::PLAIN,
        }
    }

    /// Look up a built-in theme by id.
    pub fn by_name(name: &str) -> Result<Theme> {
        THEMES
            .iter()
            .find(|t| t.id == name)
            .copied()
            .ok_or_else(|| LintrendError::UnknownTheme(name.to_string()))
    }

    /// Sample lines showing every style of the theme.
    #[must_use]
    pub fn preview(&self) -> String {
        let samples = [
            (self.title, "Title"),
            (self.error, "Error"),
            (self.warning, "Warning"),
            (self.success, "Success"),
            (self.info, "Info"),
            (self.highlight, "Highlight"),
            (self.option, "Option"),
            (self.dim, "Dim"),
        ];
        let mut out = format!("Theme Preview: {}\nDescription: {}\n\n", self.name, self.description);
        for (style, label) in samples {
            out.push_str(&style.paint(&format!("{label} style")));
            out.push('\n');
        }
        out
    }
}

impl Default for Theme {
    fn default() -> Self {
        THEMES[0]
    }
}
