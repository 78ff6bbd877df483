//! Layout helpers: split the terminal area into regions and map cells to
//! document pixels.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::dom::layout::{CHAR_WIDTH, LINE_HEIGHT};
use crate::dom::Viewport;

/// Primary screen layout with the page and a bottom status bar.
pub struct AppLayout {
    pub page_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // page (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            page_area: chunks[0],
            status_area: chunks[1],
        }
    }

    /// Document viewport covered by the page area.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            f64::from(self.page_area.width) * CHAR_WIDTH,
            f64::from(self.page_area.height) * LINE_HEIGHT,
        )
    }

    /// Centre of the cell at (`column`, `row`) in viewport px, if the cell
    /// lies on the page.
    pub fn cell_to_px(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let area = self.page_area;
        if column < area.x || row < area.y || column >= area.right() || row >= area.bottom() {
            return None;
        }
        let x = f64::from(column - area.x) * CHAR_WIDTH + CHAR_WIDTH / 2.0;
        let y = f64::from(row - area.y) * LINE_HEIGHT + LINE_HEIGHT / 2.0;
        Some((x, y))
    }
}
