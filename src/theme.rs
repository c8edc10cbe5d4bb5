//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between the Light and Dark palettes and
//! round-trips through the stored `theme` preference.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Light,
    Dark,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Value written to the `theme` preference.
    pub fn pref_value(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Light → Dark → Light.
    pub fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role resolved to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Header --
    pub brand: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub badge: Style,

    // -- Headline list --
    pub title: Style,
    pub selected: Style,
    pub meta: Style,
    pub description: Style,
    pub bookmark_marker: Style,

    // -- Chrome --
    pub border: Style,
    pub border_focused: Style,
    pub error: Style,
    pub muted: Style,
    pub status_bar: Style,
    pub input: Style,
}

impl ColorPalette {
    pub fn dark() -> Self {
        Self {
            brand: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            badge: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),

            title: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            meta: Style::default().fg(Color::DarkGray),
            description: Style::default().fg(Color::Gray),
            bookmark_marker: Style::default().fg(Color::Yellow),

            border: Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::Cyan),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::DarkGray),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            input: Style::default().fg(Color::Yellow),
        }
    }

    pub fn light() -> Self {
        Self {
            brand: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            badge: Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),

            title: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::Gray).fg(Color::Black),
            meta: Style::default().fg(Color::DarkGray),
            description: Style::default().fg(Color::Black),
            bookmark_marker: Style::default().fg(Color::Magenta),

            border: Style::default().fg(Color::Gray),
            border_focused: Style::default().fg(Color::Blue),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::Gray),
            status_bar: Style::default().bg(Color::Gray).fg(Color::Black),
            input: Style::default().fg(Color::Blue),
        }
    }
}
