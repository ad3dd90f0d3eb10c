use ratatui::style::Color;

use crate::types::State;

/// Unified color theme for the application
pub struct Theme;

impl Theme {
    /// Primary branding color
    pub fn primary() -> Color {
        Color::Magenta
    }

    /// Secondary/border color
    pub fn secondary() -> Color {
        Color::Cyan
    }

    /// Selection/highlight
    pub fn highlight() -> Color {
        Color::Cyan
    }

    /// Selection marker/arrow
    pub fn selection_marker() -> Color {
        Color::Green
    }

    /// Dimmed/inactive text
    pub fn dim() -> Color {
        Color::DarkGray
    }

    /// Normal text
    pub fn text() -> Color {
        Color::White
    }

    /// Accent for numbers/counts
    pub fn accent() -> Color {
        Color::LightBlue
    }

    /// Badge color for an issue state
    pub fn state(state: State) -> Color {
        match state {
            State::ToDo => Color::Yellow,
            State::InProgress => Color::LightGreen,
            State::Done => Color::Green,
            State::Canceled => Color::Blue,
        }
    }
}
