//! Theme palettes for the list, reader, help and status views.
//!
//! `ThemeVariant` picks between a Dark and a Light `ColorPalette`; every view
//! reads its styles from the palette rather than hardcoding colors.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    // -- List --
    pub tag_header: Style,
    pub story_unread: Style,
    pub story_read: Style,
    pub story_selected: Style,
    pub story_marked: Style,

    // -- Reader --
    pub reader_heading: Style,
    pub reader_body: Style,
    pub reader_metadata: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub prompt: Style,
    pub panel_border: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            tag_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            story_unread: Style::default().add_modifier(Modifier::BOLD),
            story_read: Style::default().fg(Color::Gray),
            story_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            story_marked: Style::default().fg(Color::Yellow),

            reader_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            reader_body: Style::default(),
            reader_metadata: Style::default().fg(Color::DarkGray),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            prompt: Style::default().bg(Color::Black).fg(Color::Yellow),
            panel_border: Style::default().fg(Color::Cyan),
        }
    }

    fn light() -> Self {
        Self {
            tag_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            story_unread: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            story_read: Style::default().fg(Color::DarkGray),
            story_selected: Style::default().bg(Color::Blue).fg(Color::White),
            story_marked: Style::default().fg(Color::Magenta),

            reader_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            reader_body: Style::default().fg(Color::Black),
            reader_metadata: Style::default().fg(Color::DarkGray),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            prompt: Style::default().bg(Color::White).fg(Color::Magenta),
            panel_border: Style::default().fg(Color::Blue),
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::dark()
    }
}

// ============================================================================
// Tests
// ============================================================================
