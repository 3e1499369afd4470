//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
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

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Item rows --
    pub item_normal: Style,
    pub item_selected: Style,
    pub item_completed: Style,
    pub item_pending: Style,
    pub checkbox: Style,
    pub checkbox_done: Style,

    // -- Input rows --
    pub input: Style,
    pub input_placeholder: Style,
    pub input_label: Style,

    // -- Chrome --
    pub header: Style,
    pub status_bar: Style,
    pub status_error: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub help_key: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            item_normal: Style::default(),
            item_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            item_completed: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::CROSSED_OUT),
            item_pending: Style::default().fg(Color::DarkGray),
            checkbox: Style::default().fg(Color::Cyan),
            checkbox_done: Style::default().fg(Color::Green),

            input: Style::default().fg(Color::White).bg(Color::Black),
            input_placeholder: Style::default().fg(Color::DarkGray),
            input_label: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),

            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_error: Style::default().bg(Color::DarkGray).fg(Color::LightRed),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            help_key: Style::default().fg(Color::Yellow),
        }
    }

    fn light() -> Self {
        Self {
            item_normal: Style::default().fg(Color::Black),
            item_selected: Style::default().bg(Color::Blue).fg(Color::White),
            item_completed: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),
            item_pending: Style::default().fg(Color::Gray),
            checkbox: Style::default().fg(Color::Blue),
            checkbox_done: Style::default().fg(Color::Green),

            input: Style::default().fg(Color::Black).bg(Color::White),
            input_placeholder: Style::default().fg(Color::Gray),
            input_label: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),

            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_error: Style::default().bg(Color::White).fg(Color::Red),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            help_key: Style::default().fg(Color::Magenta),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup, built from a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 15] = [
    "item_normal",
    "item_selected",
    "item_completed",
    "item_pending",
    "checkbox",
    "checkbox_done",
    "input",
    "input_placeholder",
    "input_label",
    "header",
    "status_bar",
    "status_error",
    "panel_border",
    "panel_border_focused",
    "help_key",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 15] = [
            p.item_normal,
            p.item_selected,
            p.item_completed,
            p.item_pending,
            p.checkbox,
            p.checkbox_done,
            p.input,
            p.input_placeholder,
            p.input_label,
            p.header,
            p.status_bar,
            p.status_error,
            p.panel_border,
            p.panel_border_focused,
            p.help_key,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
