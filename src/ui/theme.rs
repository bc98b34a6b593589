//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.
//! Category colours come from the AQI band table and are the same in both.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::Category;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for failed fetches and warnings.
    pub error: Color,
    /// Color for the "running" indicator.
    pub running: Color,
    /// Color for the "idle" indicator.
    pub idle: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            error: Color::Red,
            running: Color::Green,
            idle: Color::Gray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            error: Color::Red,
            running: Color::Green,
            idle: Color::DarkGray,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Foreground style for an AQI band, bold from "Unhealthy" upwards.
    pub fn category_style(&self, category: &Category) -> Style {
        let (r, g, b) = category.rgb();
        let style = Style::default().fg(Color::Rgb(r, g, b));
        if category.severity() >= 3 {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// Style for an error card.
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }
}
