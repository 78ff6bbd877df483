//! Layout pass: turns the styled element tree into border boxes.
//!
//! Two walks over the attached tree: the first sizes every box and places
//! it relative to its parent, the second resolves document positions,
//! applies sticky clamping and visual transforms, and subtracts the scroll
//! offset to get viewport coordinates.  Nothing is cached between calls.

use std::collections::HashMap;

use super::node::{Document, NodeId};
use super::style::{Display, FlexDirection, Position};
use super::Rect;

/// Width of one character of text.
pub const CHAR_WIDTH: f64 = 8.0;
/// Height of one line of text.
pub const LINE_HEIGHT: f64 = 16.0;

/// Viewport-relative border box of every laid-out node.
#[derive(Debug, Clone, Default)]
pub struct LayoutMap {
    rects: HashMap<NodeId, Rect>,
    content_height: f64,
}

impl LayoutMap {
    pub fn get(&self, id: NodeId) -> Option<Rect> {
        self.rects.get(&id).copied()
    }

    /// Height of the whole document (the root's box).
    pub fn content_height(&self) -> f64 {
        self.content_height
    }
}

/// Box of a node relative to its parent's border-box origin.
#[derive(Debug, Clone, Copy)]
struct Local {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

/// How many characters fit on a line `width` px wide (at least one).
pub fn chars_fitting(width: f64) -> usize {
    ((width / CHAR_WIDTH).floor() as usize).max(1)
}

/// Greedy word wrap.  `None` keeps the text on one line; words longer than
/// a line are split.  Always yields at least one line.
pub fn wrap_text(text: &str, max_chars: Option<usize>) -> Vec<String> {
    let Some(max) = max_chars else {
        return vec![text.to_string()];
    };
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            lines.push(word.drain(..max).collect());
        }
        if word.is_empty() {
            continue;
        }
        let needed = if line.is_empty() { word.len() } else { line.chars().count() + 1 + word.len() };
        if needed > max {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.extend(word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Lay out the attached part of `doc`.
pub fn layout(doc: &Document) -> LayoutMap {
    let mut locals = HashMap::new();
    let root = doc.root();
    let viewport = doc.viewport();
    let mut content_height = 0.0;
    if let Some((w, h)) = size_node(doc, root, viewport.width, true, &mut locals) {
        locals.insert(root, Local { x: 0.0, y: 0.0, w, h });
        content_height = h;
    }

    let mut map = LayoutMap {
        rects: HashMap::with_capacity(locals.len()),
        content_height,
    };
    place(doc, root, 0.0, 0.0, (0.0, -doc.scroll_y()), &locals, &mut map);
    map
}

/// Size `id` and position its children.  Returns `None` for
/// `display: none`.
fn size_node(
    doc: &Document,
    id: NodeId,
    avail_w: f64,
    stretch: bool,
    out: &mut HashMap<NodeId, Local>,
) -> Option<(f64, f64)> {
    let node = doc.get(id);
    let style = &node.style;
    if style.display == Display::None {
        return None;
    }

    let pad = style.padding;
    let definite_w = style.width.or(stretch.then_some(avail_w));
    let inner_avail = (definite_w.unwrap_or(avail_w) - 2.0 * pad).max(0.0);
    let row = style.display == Display::Flex && style.flex_direction == FlexDirection::Row;

    let (mut content_w, mut cursor) = match &node.text {
        Some(text) => {
            let max_chars = definite_w.map(|_| chars_fitting(inner_avail));
            let lines = wrap_text(text, max_chars);
            let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
            (widest as f64 * CHAR_WIDTH, lines.len() as f64 * LINE_HEIGHT)
        }
        None => (0.0, 0.0),
    };

    let mut row_x = 0.0;
    let mut row_h: f64 = 0.0;
    let mut placed_any = false;
    let mut absolutes = Vec::new();

    for &child in &node.children {
        if doc.style(child).position == Position::Absolute {
            absolutes.push(child);
            continue;
        }
        if row {
            let Some((cw, ch)) = size_node(doc, child, inner_avail, false, out) else {
                continue;
            };
            if placed_any {
                row_x += style.gap;
            }
            out.insert(child, Local { x: pad + row_x, y: pad + cursor, w: cw, h: ch });
            row_x += cw;
            row_h = row_h.max(ch);
        } else {
            let Some((cw, ch)) = size_node(doc, child, inner_avail, definite_w.is_some(), out)
            else {
                continue;
            };
            if placed_any {
                cursor += style.gap;
            }
            out.insert(child, Local { x: pad, y: pad + cursor, w: cw, h: ch });
            cursor += ch;
            content_w = content_w.max(cw);
        }
        placed_any = true;
    }
    if row {
        content_w = content_w.max(row_x);
        cursor += row_h;
    }

    for child in absolutes {
        let child_style = doc.style(child);
        let (left, top) = (child_style.left.unwrap_or(pad), child_style.top.unwrap_or(pad));
        if let Some((cw, ch)) = size_node(doc, child, inner_avail, false, out) {
            out.insert(child, Local { x: left, y: top, w: cw, h: ch });
        }
    }

    let w = definite_w.unwrap_or(content_w + 2.0 * pad);
    let h = style.height.unwrap_or(cursor + 2.0 * pad);
    Some((w, h))
}

/// Resolve viewport rects top-down.  `shift` accumulates scroll, sticky
/// clamping and ancestor transforms.
fn place(
    doc: &Document,
    id: NodeId,
    parent_x: f64,
    parent_y: f64,
    shift: (f64, f64),
    locals: &HashMap<NodeId, Local>,
    map: &mut LayoutMap,
) {
    let Some(local) = locals.get(&id) else {
        return;
    };
    let style = doc.style(id);
    let doc_x = parent_x + local.x;
    let doc_y = parent_y + local.y;

    let (mut dx, mut dy) = shift;
    if style.position == Position::Sticky {
        let natural = doc_y + dy;
        let limit = style.top.unwrap_or(0.0);
        if natural < limit {
            dy += limit - natural;
        }
    }
    let visual = doc.visible_transform(id);
    dx += visual.x;
    dy += visual.y;

    map.rects
        .insert(id, Rect::new(doc_x + dx, doc_y + dy, local.w, local.h));
    for &child in &doc.get(id).children {
        place(doc, child, doc_x, doc_y, (dx, dy), locals, map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::style::{StylePatch, Translate};
    use crate::dom::Viewport;

    fn nav(doc: &mut Document, direction: FlexDirection) -> (NodeId, Vec<NodeId>) {
        let ul = doc.create_element("ul");
        doc.update_style(
            ul,
            &StylePatch {
                gap: Some(8.0),
                ..StylePatch::flex(direction)
            },
        );
        doc.append_child(doc.root(), ul);
        let items = ["Home", "About Us", "Contact"]
            .iter()
            .map(|label| {
                let li = doc.create_element("li");
                doc.set_text(li, label);
                doc.append_child(ul, li);
                li
            })
            .collect();
        (ul, items)
    }

    #[test]
    fn column_stacks_items_at_container_width() {
        let mut doc = Document::new(Viewport::new(640.0, 384.0));
        let (ul, items) = nav(&mut doc, FlexDirection::Column);
        let map = layout(&doc);

        assert_eq!(map.get(ul), Some(Rect::new(0.0, 0.0, 640.0, 3.0 * 16.0 + 2.0 * 8.0)));
        assert_eq!(map.get(items[0]), Some(Rect::new(0.0, 0.0, 640.0, 16.0)));
        assert_eq!(map.get(items[1]), Some(Rect::new(0.0, 24.0, 640.0, 16.0)));
        assert_eq!(map.get(items[2]), Some(Rect::new(0.0, 48.0, 640.0, 16.0)));
    }

    #[test]
    fn row_places_items_at_intrinsic_width() {
        let mut doc = Document::new(Viewport::new(640.0, 384.0));
        let (_, items) = nav(&mut doc, FlexDirection::Row);
        let map = layout(&doc);

        assert_eq!(map.get(items[0]), Some(Rect::new(0.0, 0.0, 32.0, 16.0)));
        assert_eq!(map.get(items[1]), Some(Rect::new(40.0, 0.0, 64.0, 16.0)));
        assert_eq!(map.get(items[2]), Some(Rect::new(112.0, 0.0, 56.0, 16.0)));
    }

    #[test]
    fn scroll_moves_flow_content_but_not_sticky() {
        let mut doc = Document::new(Viewport::new(640.0, 384.0));
        let header = doc.create_element("header");
        doc.set_text(header, "Sticky Header");
        doc.update_style(
            header,
            &StylePatch {
                position: Some(Position::Sticky),
                top: Some(Some(0.0)),
                ..StylePatch::default()
            },
        );
        let section = doc.create_element("section");
        doc.update_style(
            section,
            &StylePatch {
                height: Some(Some(800.0)),
                ..StylePatch::default()
            },
        );
        doc.append_child(doc.root(), header);
        doc.append_child(doc.root(), section);

        doc.set_scroll_y(100.0);
        let map = layout(&doc);
        assert_eq!(map.get(header).map(|r| r.top), Some(0.0));
        assert_eq!(map.get(section).map(|r| r.top), Some(16.0 - 100.0));
        assert_eq!(map.content_height(), 816.0);
    }

    #[test]
    fn absolute_and_transform_do_not_affect_flow() {
        let mut doc = Document::new(Viewport::new(640.0, 384.0));
        let (ul, items) = nav(&mut doc, FlexDirection::Column);
        doc.update_style(
            items[0],
            &StylePatch {
                position: Some(Position::Absolute),
                left: Some(Some(0.0)),
                top: Some(Some(0.0)),
                width: Some(Some(640.0)),
                height: Some(Some(16.0)),
                transform: Some(Some(Translate::new(10.0, 20.0))),
                ..StylePatch::default()
            },
        );
        let map = layout(&doc);

        assert_eq!(map.get(items[0]), Some(Rect::new(10.0, 20.0, 640.0, 16.0)));
        // The remaining items close the gap left behind.
        assert_eq!(map.get(items[1]).map(|r| r.top), Some(0.0));
        assert_eq!(map.get(ul).map(|r| r.height), Some(16.0 + 8.0 + 16.0));
    }

    #[test]
    fn text_wraps_inside_definite_width() {
        assert_eq!(wrap_text("About Us", None), vec!["About Us"]);
        assert_eq!(
            wrap_text("get in touch with us today", Some(10)),
            vec!["get in", "touch with", "us today"]
        );
        assert_eq!(wrap_text("abcdefghij", Some(4)), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("", Some(4)), vec![""]);

        let mut doc = Document::new(Viewport::new(80.0, 100.0));
        let p = doc.create_element("p");
        doc.set_text(p, "get in touch with us today");
        doc.append_child(doc.root(), p);
        assert_eq!(layout(&doc).get(p), Some(Rect::new(0.0, 0.0, 80.0, 48.0)));
    }

    #[test]
    fn detached_and_hidden_nodes_have_no_box() {
        let mut doc = Document::new(Viewport::new(640.0, 384.0));
        let (_, items) = nav(&mut doc, FlexDirection::Column);
        let loose = doc.create_element("div");
        doc.update_style(
            items[1],
            &StylePatch {
                display: Some(Display::None),
                ..StylePatch::default()
            },
        );
        let map = layout(&doc);
        assert!(map.get(loose).is_none());
        assert!(map.get(items[1]).is_none());
        assert_eq!(map.get(items[2]).map(|r| r.top), Some(24.0));
    }
}
