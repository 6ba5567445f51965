use crossterm::style::{self, Stylize};
use thiserror::Error;

pub const DEFAULT_ACCENT: &str = "blue";

const ACCENTS: [(&str, style::Color); 16] = [
    ("black", style::Color::Black),
    ("red", style::Color::DarkRed),
    ("green", style::Color::DarkGreen),
    ("yellow", style::Color::DarkYellow),
    ("blue", style::Color::DarkBlue),
    ("magenta", style::Color::DarkMagenta),
    ("cyan", style::Color::DarkCyan),
    ("white", style::Color::Grey),
    ("bright_black", style::Color::DarkGrey),
    ("bright_red", style::Color::Red),
    ("bright_green", style::Color::Green),
    ("bright_yellow", style::Color::Yellow),
    ("bright_blue", style::Color::Blue),
    ("bright_magenta", style::Color::Magenta),
    ("bright_cyan", style::Color::Cyan),
    ("bright_white", style::Color::White),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("colore '{requested}' non valido, il colore di accento rimane '{kept}'")]
pub struct ThemeError {
    pub requested: String,
    pub kept: String,
}

/// How loudly a message is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
    Plain,
}

impl Level {
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Level::Error => Some("Errore"),
            Level::Warning => Some("Attenzione"),
            Level::Success => Some("Successo"),
            Level::Info | Level::Plain => None,
        }
    }
}

/// Terminal colours for the console. Only the accent is configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    accent: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self { accent: DEFAULT_ACCENT }
    }
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accent(name: &str) -> Result<Self, ThemeError> {
        let mut theme = Self::new();
        theme.set_accent(name)?;
        Ok(theme)
    }

    pub fn accent(&self) -> &str {
        self.accent
    }

    /// Switches the accent colour. An unknown name leaves the current one in place.
    pub fn set_accent(&mut self, name: &str) -> Result<(), ThemeError> {
        match ACCENTS.iter().find(|(known, _)| *known == name) {
            Some((known, _)) => {
                self.accent = *known;
                Ok(())
            }
            None => Err(ThemeError {
                requested: name.to_string(),
                kept: self.accent.to_string(),
            }),
        }
    }

    fn accent_color(&self) -> style::Color {
        ACCENTS
            .iter()
            .find(|(known, _)| *known == self.accent)
            .map_or(style::Color::DarkBlue, |(_, color)| *color)
    }

    pub fn level_color(&self, level: Level) -> style::Color {
        match level {
            Level::Info => self.accent_color(),
            Level::Success => style::Color::DarkGreen,
            Level::Warning => style::Color::DarkYellow,
            Level::Error => style::Color::DarkRed,
            Level::Plain => style::Color::Reset,
        }
    }

    /// A message ready for the terminal: bold prefix for errors, warnings and
    /// successes, plain accent colour for information.
    pub fn paint(&self, level: Level, text: &str) -> String {
        let color = self.level_color(level);
        match level.prefix() {
            Some(prefix) => format!("{} {}", format!("{}:", prefix).with(color).bold(), text),
            None if level == Level::Plain => text.to_string(),
            None => format!("{}", text.with(color)),
        }
    }

    pub fn emphasis(&self, text: &str) -> String {
        format!("{}", text.with(self.accent_color()).bold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accent() {
        assert_eq!(Theme::new().accent(), "blue");
    }

    #[test]
    fn test_set_valid_accent() {
        let mut theme = Theme::new();
        theme.set_accent("red").unwrap();
        assert_eq!(theme.accent(), "red");
        theme.set_accent("bright_cyan").unwrap();
        assert_eq!(theme.accent(), "bright_cyan");
    }

    #[test]
    fn test_invalid_accent_keeps_previous() {
        let mut theme = Theme::new();
        theme.set_accent("green").unwrap();
        let err = theme.set_accent("chartreuse").unwrap_err();
        assert_eq!(err.kept, "green");
        assert_eq!(theme.accent(), "green");
        assert!(Theme::with_accent("").is_err());
    }

    #[test]
    fn test_paint_keeps_text_and_prefix() {
        let theme = Theme::new();
        let painted = theme.paint(Level::Error, "mossa non valida");
        assert!(painted.contains("Errore:"));
        assert!(painted.contains("mossa non valida"));
        assert_eq!(theme.paint(Level::Plain, "e4"), "e4");
        assert!(!theme.paint(Level::Info, "ciao").contains(':'));
    }
}
