//! Shadow layout oracle: where would the menu items sit if the container
//! flowed the other way?
//!
//! The answer comes from a probe: deep-clone the container into a temporary
//! wrapper next to it, restyle only the clone, lay the document out, read the
//! clone's item boxes, and tear the wrapper down again.  The wrapper is held
//! by a guard whose `Drop` removes it, so every exit path (early return,
//! error, panic) leaves the document exactly as it was.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use thiserror::Error;

use crate::dom::style::{FlexDirection, Position, StylePatch};
use crate::dom::{Document, NodeId, Rect, Target};

use super::geometry;

/// Attribute naming the menu item an element represents.
pub const ITEM_ATTR: &str = "data-item";

/// Faults raised by the probe.  These indicate a setup bug, not a runtime
/// race, so they surface as errors instead of a quiet `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("container node {0} is not attached to the document")]
    DetachedContainer(NodeId),
    #[error("container node {0} has no parent to host the probe")]
    NoHost(NodeId),
    #[error("probe clone of node {0} produced no layout box")]
    NotRendered(NodeId),
}

// ───────────────────────────────────────── result ────────────

/// Item id → box relative to the container, under the alternate flow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShadowLayout {
    pub direction: FlexDirection,
    rects: HashMap<String, Rect>,
}

impl ShadowLayout {
    pub fn get(&self, item_id: &str) -> Option<Rect> {
        self.rects.get(item_id).copied()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

// ───────────────────────────────────────── probe guard ───────

/// Owns the temporary wrapper for the lifetime of a probe.
struct ProbeGuard<'d> {
    doc: &'d mut Document,
    wrapper: NodeId,
    mark: usize,
}

impl<'d> ProbeGuard<'d> {
    fn acquire(doc: &'d mut Document, host: NodeId) -> Self {
        let mark = doc.len();
        let wrapper = doc.create_element("div");
        doc.add_class(wrapper, "shadow-probe");
        doc.append_child(host, wrapper);
        Self { doc, wrapper, mark }
    }
}

impl Deref for ProbeGuard<'_> {
    type Target = Document;

    fn deref(&self) -> &Document {
        self.doc
    }
}

impl DerefMut for ProbeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Document {
        self.doc
    }
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        self.doc.remove(self.wrapper);
        self.doc.release_since(self.mark);
    }
}

/// Clone `container` next to itself, apply `patch` to the clone, and hand
/// the clone to `measure`.  The clone is gone again when this returns or
/// unwinds.
pub fn with_shadow_clone<T>(
    doc: &mut Document,
    container: NodeId,
    patch: &StylePatch,
    measure: impl FnOnce(&mut Document, NodeId) -> Result<T, ProbeError>,
) -> Result<T, ProbeError> {
    if !doc.is_attached(container) {
        return Err(ProbeError::DetachedContainer(container));
    }
    let host = doc
        .get(container)
        .parent
        .ok_or(ProbeError::NoHost(container))?;

    let mut guard = ProbeGuard::acquire(doc, host);
    let clone = guard.deep_clone(container);
    let wrapper = guard.wrapper;
    guard.append_child(wrapper, clone);
    guard.update_style(clone, patch);
    measure(&mut *guard, clone)
}

/// Probe `container` under `direction` and collect the boxes of its
/// descendants matching `item_selector`.
///
/// Items are put back into normal flow on the clone (no absolute
/// positioning, size locks, or transforms) so the result describes the pure
/// alternate layout even when some live items are already mid-animation.
pub fn probe(
    doc: &mut Document,
    container: NodeId,
    direction: FlexDirection,
    item_selector: &str,
) -> Result<ShadowLayout, ProbeError> {
    let in_flow = StylePatch {
        position: Some(Position::Static),
        left: Some(None),
        top: Some(None),
        width: Some(None),
        height: Some(None),
        transform: Some(None),
        transition: Some(None),
        ..StylePatch::default()
    };

    with_shadow_clone(doc, container, &StylePatch::flex(direction), |doc, clone| {
        let items = doc.query_selector_all(clone, item_selector);
        for &item in &items {
            doc.update_style(item, &in_flow);
        }

        let map = geometry::snapshot(doc);
        let origin = map.get(clone).ok_or(ProbeError::NotRendered(container))?;
        let mut rects = HashMap::with_capacity(items.len());
        for item in items {
            let node = doc.get(item);
            let Some(key) = node.attr(ITEM_ATTR).or(node.id.as_deref()) else {
                continue;
            };
            if let Some(rect) = map.get(item) {
                rects.insert(key.to_string(), rect.offset_from(&origin));
            }
        }
        tracing::debug!(
            items = rects.len(),
            direction = direction.as_css(),
            "shadow layout probed"
        );
        Ok(ShadowLayout { direction, rects })
    })
}

/// Resolve `target` and probe it.  `Ok(None)` when the target does not
/// name an attached element.
pub fn compute_alternate_layout(
    doc: &mut Document,
    target: Target<'_>,
    direction: FlexDirection,
    item_selector: &str,
) -> Result<Option<ShadowLayout>, ProbeError> {
    let Some(container) = target.resolve(doc) else {
        tracing::warn!(?target, "shadow layout: container not found");
        return Ok(None);
    };
    probe(doc, container, direction, item_selector).map(Some)
}

// ───────────────────────────────────────── cache ─────────────

/// The most recent shadow layout, kept until someone invalidates it.
#[derive(Debug, Default)]
pub struct ShadowLayoutCache {
    current: Option<Rc<ShadowLayout>>,
}

impl ShadowLayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_cached(&self) -> bool {
        self.current.is_some()
    }

    /// The cached layout, computing it first if needed.  Unresolvable
    /// containers are not cached, so a later call retries.
    pub fn get_or_compute(
        &mut self,
        doc: &mut Document,
        target: Target<'_>,
        direction: FlexDirection,
        item_selector: &str,
    ) -> Result<Option<Rc<ShadowLayout>>, ProbeError> {
        if let Some(layout) = &self.current {
            return Ok(Some(Rc::clone(layout)));
        }
        let computed = compute_alternate_layout(doc, target, direction, item_selector)?;
        self.current = computed.map(Rc::new);
        Ok(self.current.clone())
    }

    pub fn invalidate(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!("shadow layout cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::Node;
    use crate::dom::style::Display;
    use crate::dom::Viewport;
    use pretty_assertions::assert_eq;

    const LABELS: &[(&str, &str)] = &[("home", "Home"), ("about", "About Us"), ("contact", "Contact")];

    /// `nav > ul.menu > li.menu-item[data-item]`, column flow.
    fn menu_doc() -> (Document, NodeId) {
        let mut doc = Document::new(Viewport::new(640.0, 384.0));
        let nav = doc.create_element("nav");
        let ul = doc.create_element("ul");
        doc.add_class(ul, "menu");
        doc.update_style(
            ul,
            &StylePatch {
                position: Some(Position::Relative),
                gap: Some(8.0),
                ..StylePatch::flex(FlexDirection::Column)
            },
        );
        doc.append_child(doc.root(), nav);
        doc.append_child(nav, ul);
        for (id, label) in LABELS {
            let li = doc.create_element("li");
            doc.add_class(li, "menu-item");
            doc.set_attr(li, ITEM_ATTR, id);
            doc.set_text(li, label);
            doc.append_child(ul, li);
        }
        (doc, ul)
    }

    fn live_snapshot(doc: &Document, root: NodeId) -> Vec<Node> {
        doc.subtree(root).into_iter().map(|n| doc.get(n).clone()).collect()
    }

    #[test]
    fn probe_reports_row_positions_relative_to_container() {
        let (mut doc, ul) = menu_doc();
        let layout = probe(&mut doc, ul, FlexDirection::Row, ".menu-item").unwrap();

        assert_eq!(layout.len(), 3);
        assert_eq!(layout.get("home"), Some(Rect::new(0.0, 0.0, 32.0, 16.0)));
        assert_eq!(layout.get("about"), Some(Rect::new(40.0, 0.0, 64.0, 16.0)));
        assert_eq!(layout.get("contact"), Some(Rect::new(112.0, 0.0, 56.0, 16.0)));
    }

    #[test]
    fn probe_leaves_live_container_untouched() {
        let (mut doc, ul) = menu_doc();
        let before = live_snapshot(&doc, doc.root());
        let len_before = doc.len();

        probe(&mut doc, ul, FlexDirection::Row, ".menu-item").unwrap();

        assert_eq!(live_snapshot(&doc, doc.root()), before);
        assert_eq!(doc.len(), len_before);
    }

    #[test]
    fn probe_ignores_live_animation_state() {
        let (mut doc, ul) = menu_doc();
        let about = doc.query_selector(ul, "[data-item=about]").unwrap();
        doc.update_style(
            about,
            &StylePatch {
                position: Some(Position::Absolute),
                left: Some(Some(0.0)),
                top: Some(Some(24.0)),
                width: Some(Some(640.0)),
                ..StylePatch::default()
            },
        );
        let layout = probe(&mut doc, ul, FlexDirection::Row, ".menu-item").unwrap();
        assert_eq!(layout.get("about"), Some(Rect::new(40.0, 0.0, 64.0, 16.0)));
    }

    #[test]
    fn wrapper_is_removed_on_error_path() {
        let (mut doc, ul) = menu_doc();
        let nav = doc.get(ul).parent.unwrap();
        doc.update_style(
            nav,
            &StylePatch {
                display: Some(Display::None),
                ..StylePatch::default()
            },
        );
        let before = live_snapshot(&doc, doc.root());
        let len_before = doc.len();

        let err = probe(&mut doc, ul, FlexDirection::Row, ".menu-item").unwrap_err();
        assert_eq!(err, ProbeError::NotRendered(ul));
        assert_eq!(live_snapshot(&doc, doc.root()), before);
        assert_eq!(doc.len(), len_before);
    }

    #[test]
    fn wrapper_is_removed_when_measurement_panics() {
        let (mut doc, ul) = menu_doc();
        let before = live_snapshot(&doc, doc.root());

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = with_shadow_clone(&mut doc, ul, &StylePatch::default(), |_, _| -> Result<(), ProbeError> {
                panic!("measurement blew up")
            });
        }));
        assert!(outcome.is_err());
        assert_eq!(live_snapshot(&doc, doc.root()), before);
        assert!(doc.query_selector(doc.root(), ".shadow-probe").is_none());
    }

    #[test]
    fn detached_container_is_a_fault() {
        let (mut doc, ul) = menu_doc();
        doc.remove(ul);
        assert_eq!(
            probe(&mut doc, ul, FlexDirection::Row, ".menu-item"),
            Err(ProbeError::DetachedContainer(ul))
        );
        let root = doc.root();
        assert_eq!(
            probe(&mut doc, root, FlexDirection::Row, ".menu-item"),
            Err(ProbeError::NoHost(root))
        );
    }

    #[test]
    fn unresolvable_target_is_soft() {
        let (mut doc, _) = menu_doc();
        let result =
            compute_alternate_layout(&mut doc, Target::from("#nope"), FlexDirection::Row, ".menu-item");
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn cache_returns_same_layout_until_invalidated() {
        let (mut doc, _) = menu_doc();
        let mut cache = ShadowLayoutCache::new();
        let target = Target::from(".menu");

        let first = cache
            .get_or_compute(&mut doc, target, FlexDirection::Row, ".menu-item")
            .unwrap()
            .unwrap();
        let second = cache
            .get_or_compute(&mut doc, target, FlexDirection::Row, ".menu-item")
            .unwrap()
            .unwrap();
        assert!(Rc::ptr_eq(&first, &second));

        // A narrower viewport changes nothing for a row of short labels, but
        // the recomputed layout must still be a fresh object.
        doc.set_viewport(Viewport::new(320.0, 384.0));
        cache.invalidate();
        assert!(!cache.is_cached());
        let third = cache
            .get_or_compute(&mut doc, target, FlexDirection::Row, ".menu-item")
            .unwrap()
            .unwrap();
        assert!(!Rc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
    }

    #[test]
    fn unresolvable_target_is_not_cached() {
        let (mut doc, _) = menu_doc();
        let mut cache = ShadowLayoutCache::new();
        let missing = cache
            .get_or_compute(&mut doc, Target::from(".absent"), FlexDirection::Row, ".menu-item")
            .unwrap();
        assert!(missing.is_none());
        assert!(!cache.is_cached());
    }
}
