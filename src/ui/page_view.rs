//! Paints the laid-out document into the terminal buffer.
//!
//! One cell is `CHAR_WIDTH` × `LINE_HEIGHT` px.  Normal flow is painted in
//! document order; sticky subtrees (the header) are painted afterwards so
//! they cover the content scrolling underneath.

use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};

use crate::dom::layout::{chars_fitting, wrap_text, CHAR_WIDTH, LINE_HEIGHT};
use crate::dom::style::Position;
use crate::dom::{layout, Document, LayoutMap, NodeId};
use crate::engine::animator::ANIMATING_ATTR;

use super::theme::Theme;

pub struct DocumentView<'a> {
    doc: &'a Document,
}

impl<'a> DocumentView<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self { doc }
    }

    fn is_pinned(&self, node: NodeId) -> bool {
        std::iter::once(node)
            .chain(self.doc.ancestors(node))
            .any(|n| self.doc.style(n).position == Position::Sticky)
    }

    fn text_style(&self, node: NodeId) -> Style {
        let el = self.doc.get(node);
        match el.tag.as_str() {
            "h1" => Theme::title_style(),
            "h2" => Theme::heading_style(),
            "h3" => Theme::subheading_style(),
            "a" => {
                let moving = el
                    .parent
                    .is_some_and(|p| self.doc.attr(p, ANIMATING_ATTR).is_some());
                if moving {
                    Theme::link_moving_style()
                } else {
                    Theme::link_style()
                }
            }
            "input" | "textarea" => Theme::input_style(),
            "button" => Theme::button_style(),
            _ => Theme::text_style(),
        }
    }

    fn background(&self, node: NodeId) -> Option<Style> {
        let el = self.doc.get(node);
        match el.tag.as_str() {
            "header" => Some(Theme::header_style()),
            "input" | "textarea" => Some(Theme::input_style()),
            "button" => Some(Theme::button_style()),
            _ if el.has_class("service-card") => Some(Theme::card_style()),
            _ => None,
        }
    }

    fn paint(&self, node: NodeId, map: &LayoutMap, area: Rect, buf: &mut Buffer) {
        let Some(rect) = map.get(node) else {
            return;
        };
        let el = self.doc.get(node);
        let x = to_cells(rect.left, CHAR_WIDTH);
        let y = to_cells(rect.top, LINE_HEIGHT);
        let w = to_cells(rect.width, CHAR_WIDTH);
        let h = to_cells(rect.height, LINE_HEIGHT);

        if let Some(style) = self.background(node) {
            fill(buf, area, (x, y, w, h), style);
        }
        if el.has_class("section") {
            put_str(buf, area, x, y, &"─".repeat(w.max(0) as usize), Theme::rule_style());
        }

        let Some(text) = &el.text else {
            return;
        };
        let pad = el.style.padding;
        let lines = wrap_text(text, Some(chars_fitting(rect.width - 2.0 * pad)));
        let style = self.text_style(node);
        let tx = to_cells(rect.left + pad, CHAR_WIDTH);
        let ty = to_cells(rect.top + pad, LINE_HEIGHT);
        for (i, line) in lines.iter().enumerate() {
            put_str(buf, area, tx, ty + i as i64, line, style);
        }
    }
}

impl Widget for DocumentView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let map = layout(self.doc);
        let (flow, pinned): (Vec<NodeId>, Vec<NodeId>) = self
            .doc
            .subtree(self.doc.root())
            .into_iter()
            .partition(|&n| !self.is_pinned(n));
        for node in flow.into_iter().chain(pinned) {
            self.paint(node, &map, area, buf);
        }
    }
}

fn to_cells(px: f64, unit: f64) -> i64 {
    (px / unit).round() as i64
}

/// Style the cells of `(x, y, w, h)` (relative to `area`) that are visible.
fn fill(buf: &mut Buffer, area: Rect, (x, y, w, h): (i64, i64, i64, i64), style: Style) {
    let left = x.max(0);
    let top = y.max(0);
    let right = (x + w).min(i64::from(area.width));
    let bottom = (y + h).min(i64::from(area.height));
    if right <= left || bottom <= top {
        return;
    }
    let clip = Rect::new(
        area.x + left as u16,
        area.y + top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    );
    buf.set_style(clip, style);
    for row in clip.top()..clip.bottom() {
        for col in clip.left()..clip.right() {
            if let Some(cell) = buf.cell_mut((col, row)) {
                cell.set_symbol(" ");
            }
        }
    }
}

/// Write `text` at `(x, y)` relative to `area`, clipped on every side.
fn put_str(buf: &mut Buffer, area: Rect, x: i64, y: i64, text: &str, style: Style) {
    if y < 0 || y >= i64::from(area.height) || x >= i64::from(area.width) {
        return;
    }
    let skip = (-x).max(0) as usize;
    let col = x.max(0) as u16;
    let visible: String = text.chars().skip(skip).collect();
    if visible.is_empty() {
        return;
    }
    let max_width = (area.width - col) as usize;
    buf.set_stringn(area.x + col, area.y + y as u16, visible, max_width, style);
}
