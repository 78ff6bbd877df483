//! Input handling: maps key/mouse events to state mutations.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::config::Action;
use crate::dom::layout::LINE_HEIGHT;
use crate::dom::{layout, Document, NodeId};
use crate::engine::shadow::ITEM_ATTR;
use crate::ui::layout::AppLayout;
use crate::widget::header::ITEM_SELECTOR;

use super::state::AppState;

/// Lines moved per arrow key or wheel notch.
const LINES_PER_STEP: f64 = 3.0;
/// Share of the viewport moved per page key.
const PAGE_FRACTION: f64 = 0.9;

/// Process a key event.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }
    if key.kind != KeyEventKind::Press {
        return;
    }
    let Some(action) = state.config.match_key(key) else {
        return;
    };
    state.status_message = None;

    let page = state.doc.viewport().height * PAGE_FRACTION;
    match action {
        Action::ScrollDown => state.scroll.scroll_by(LINES_PER_STEP * LINE_HEIGHT),
        Action::ScrollUp => state.scroll.scroll_by(-LINES_PER_STEP * LINE_HEIGHT),
        Action::PageDown => state.scroll.scroll_by(page),
        Action::PageUp => state.scroll.scroll_by(-page),
        Action::Top => state.scroll.scroll_to(0.0),
        Action::Bottom => state.scroll.scroll_to_end(),
        Action::Replay => state.replay(),
        Action::Quit => state.should_quit = true,
    }
}

/// Process a mouse event.  `terminal_area` is the full frame.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent, terminal_area: Rect) {
    match mouse.kind {
        MouseEventKind::ScrollDown => state.scroll.scroll_by(LINES_PER_STEP * LINE_HEIGHT),
        MouseEventKind::ScrollUp => state.scroll.scroll_by(-LINES_PER_STEP * LINE_HEIGHT),
        MouseEventKind::Down(MouseButton::Left) => {
            let layout = AppLayout::from_area(terminal_area);
            let Some((x, y)) = layout.cell_to_px(mouse.column, mouse.row) else {
                return;
            };
            if let Some(id) = menu_item_at(&state.doc, state.header.root(), x, y) {
                state.scroll_to_section(&id);
            }
        }
        _ => {}
    }
}

/// The menu item whose box contains viewport point `(x, y)`.
fn menu_item_at(doc: &Document, header: Option<NodeId>, x: f64, y: f64) -> Option<String> {
    let header = header?;
    let map = layout(doc);
    doc.query_selector_all(header, ITEM_SELECTOR)
        .into_iter()
        .rev()
        .find(|&li| {
            map.get(li).is_some_and(|r| {
                x >= r.left && x < r.right() && y >= r.top && y < r.bottom()
            })
        })
        .and_then(|li| doc.attr(li, ITEM_ATTR).map(str::to_string))
}
