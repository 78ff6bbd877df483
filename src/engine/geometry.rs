//! Geometry snapshot: bounding-box reads against the current layout.
//!
//! Every call lays the document out afresh, so callers always see the
//! effect of style writes made just before.  Batch callers should use
//! [`snapshot`] once and query the returned map.

use crate::dom::{layout, Document, LayoutMap, NodeId, Rect};

/// Fresh layout of the whole document.
pub fn snapshot(doc: &Document) -> LayoutMap {
    layout(doc)
}

/// Viewport-relative border box of `node`, or `None` when it is detached or
/// not displayed.
pub fn measure(doc: &Document, node: NodeId) -> Option<Rect> {
    layout(doc).get(node)
}

/// Border box of `node` relative to the top-left corner of `container`.
pub fn measure_relative(doc: &Document, node: NodeId, container: NodeId) -> Option<Rect> {
    relative_in(&layout(doc), node, container)
}

/// [`measure_relative`] against an existing snapshot.
pub fn relative_in(map: &LayoutMap, node: NodeId, container: NodeId) -> Option<Rect> {
    let origin = map.get(container)?;
    Some(map.get(node)?.offset_from(&origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::style::StylePatch;
    use crate::dom::Viewport;

    #[test]
    fn reads_reflect_the_latest_style_write() {
        let mut doc = Document::new(Viewport::new(320.0, 200.0));
        let pad = doc.create_element("div");
        let el = doc.create_element("div");
        doc.set_text(pad, "spacer");
        doc.append_child(doc.root(), pad);
        doc.append_child(doc.root(), el);
        assert_eq!(measure(&doc, el).map(|r| r.top), Some(16.0));

        doc.update_style(
            pad,
            &StylePatch {
                height: Some(Some(40.0)),
                ..StylePatch::default()
            },
        );
        assert_eq!(measure(&doc, el).map(|r| r.top), Some(40.0));
        assert_eq!(
            measure_relative(&doc, el, pad),
            Some(Rect::new(0.0, 40.0, 320.0, 0.0))
        );
    }

    #[test]
    fn missing_nodes_measure_as_none() {
        let mut doc = Document::new(Viewport::new(320.0, 200.0));
        let loose = doc.create_element("div");
        assert_eq!(measure(&doc, loose), None);
        assert_eq!(measure_relative(&doc, doc.root(), loose), None);
    }
}
