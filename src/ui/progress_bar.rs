//! Scroll progress indicator: a small bar + percentage rendered at the
//! right end of the status bar, with a spinner while menu items slide.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use super::theme::Theme;

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const BAR_WIDTH: usize = 12;

pub struct ProgressIndicator {
    /// Scroll progress in `0..=1`.
    pub progress: f64,
    /// Menu items currently in flight; the spinner shows while non-zero.
    pub moving: usize,
    /// Monotonically increasing tick counter (drives the spinner frame).
    pub tick: u64,
}

impl ProgressIndicator {
    fn label(&self) -> String {
        let filled = (self.progress.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
        let spinner = if self.moving > 0 {
            SPINNER_FRAMES[(self.tick as usize) % SPINNER_FRAMES.len()]
        } else {
            " "
        };
        format!(
            " {spinner} {}{} {:>3}% ",
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled),
            (self.progress * 100.0).round() as u32
        )
    }
}

impl Widget for ProgressIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label = self.label();
        let label_width = label.chars().count() as u16;
        if area.width < label_width || area.height == 0 {
            return;
        }
        let x = area.x + area.width - label_width;
        let line = Line::from(Span::styled(label, Theme::progress_style()));
        buf.set_line(x, area.y, &line, label_width);
    }
}
