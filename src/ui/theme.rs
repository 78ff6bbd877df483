//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme: change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── page ───────────────────────────────────────────────────
    pub fn text_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn heading_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn subheading_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn rule_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn card_style() -> Style {
        Style::default().bg(Color::Rgb(30, 30, 46))
    }

    pub fn input_style() -> Style {
        Style::default()
            .fg(Color::Gray)
            .bg(Color::Rgb(40, 40, 40))
            .add_modifier(Modifier::ITALIC)
    }

    pub fn button_style() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    // ── header ─────────────────────────────────────────────────
    pub fn header_style() -> Style {
        Style::default().bg(Color::Rgb(24, 24, 37))
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn link_style() -> Style {
        Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Menu link while its item is sliding.
    pub fn link_moving_style() -> Style {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn progress_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }
}
