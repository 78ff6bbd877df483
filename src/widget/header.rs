//! Sticky header whose menu items glide into the alternate layout as the
//! page scrolls past their sections.
//!
//! Renders
//!
//! ```text
//! header.header
//! └─ div.header-content
//!    ├─ h1                      title
//!    └─ nav
//!       └─ ul.menu              position: relative
//!          └─ li.menu-item#nav-<id>[data-item=<id>]
//!             └─ a[href=#<id>]  label
//! ```
//!
//! and wires the scroll tracker to the animator: every threshold crossing
//! becomes an animation of the matching `li`.

use crate::dom::style::{FlexDirection, Position, StylePatch};
use crate::dom::{Document, NodeId, Viewport};
use crate::engine::animator::{AnimatorEvent, TransformAnimator, TriggerOutcome};
use crate::engine::shadow::ITEM_ATTR;
use crate::engine::tracker::{ThresholdTracker, Trigger};
use crate::engine::{geometry, EngineConfig};

use super::signal::Subscription;
use super::{Component, MountContext};

pub const MENU_SELECTOR: &str = ".menu";
pub const ITEM_SELECTOR: &str = ".menu-item";

/// One navigation entry; `id` is also the id of the section it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
}

impl MenuItem {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

pub struct HeaderWidget {
    title: String,
    items: Vec<MenuItem>,
    tracker: ThresholdTracker,
    animator: TransformAnimator,
    root: Option<NodeId>,
    scroll: Option<Subscription<f64>>,
    viewport: Option<Subscription<Viewport>>,
    last_trigger: Option<Trigger>,
}

impl HeaderWidget {
    pub fn new(title: &str, items: Vec<MenuItem>, config: EngineConfig) -> Self {
        Self {
            title: title.to_string(),
            items,
            tracker: ThresholdTracker::new(config.offset_threshold),
            animator: TransformAnimator::new(config, MENU_SELECTOR, ITEM_SELECTOR),
            root: None,
            scroll: None,
            viewport: None,
            last_trigger: None,
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn tracker(&self) -> &ThresholdTracker {
        &self.tracker
    }

    pub fn animator(&self) -> &TransformAnimator {
        &self.animator
    }

    /// Most recent threshold crossing, for status display.
    pub fn last_trigger(&self) -> Option<&Trigger> {
        self.last_trigger.as_ref()
    }

    /// Resting position of each item: the document-relative top of its
    /// section.  Items whose section is missing are left out.
    pub fn resting_positions(&self, doc: &Document) -> Vec<(String, f64)> {
        let scroll_y = doc.scroll_y();
        self.items
            .iter()
            .filter_map(|item| {
                let Some(section) = doc.get_element_by_id(&item.id) else {
                    tracing::warn!(item = %item.id, "header: no section for menu item");
                    return None;
                };
                let rect = geometry::measure(doc, section)?;
                Some((item.id.clone(), rect.top + scroll_y))
            })
            .collect()
    }

    /// Re-measure the sections and forget all scroll history.
    pub fn recompute_resting_positions(&mut self, doc: &Document) {
        let positions = self.resting_positions(doc);
        self.tracker.set_resting_positions(positions);
    }

    /// Put every item back in the menu and start over.
    pub fn replay(&mut self, doc: &mut Document) {
        if self.root.is_none() {
            return;
        }
        self.animator.reset(doc);
        self.recompute_resting_positions(doc);
        self.last_trigger = None;
        tracing::info!("header: replay");
    }

    fn render(&self, doc: &mut Document, mount_point: NodeId) -> NodeId {
        let header = doc.create_element("header");
        doc.add_class(header, "header");
        doc.update_style(
            header,
            &StylePatch {
                position: Some(Position::Sticky),
                top: Some(Some(0.0)),
                ..StylePatch::default()
            },
        );

        let content = doc.create_element("div");
        doc.add_class(content, "header-content");
        doc.append_child(header, content);

        let h1 = doc.create_element("h1");
        doc.set_text(h1, &self.title);
        doc.append_child(content, h1);

        let nav = doc.create_element("nav");
        doc.append_child(content, nav);

        let menu = doc.create_element("ul");
        doc.add_class(menu, "menu");
        doc.update_style(
            menu,
            &StylePatch {
                position: Some(Position::Relative),
                ..StylePatch::flex(FlexDirection::Column)
            },
        );
        doc.append_child(nav, menu);

        for item in &self.items {
            let li = doc.create_element("li");
            doc.add_class(li, "menu-item");
            doc.set_id(li, &format!("nav-{}", item.id));
            doc.set_attr(li, ITEM_ATTR, &item.id);
            let a = doc.create_element("a");
            doc.set_attr(a, "href", &format!("#{}", item.id));
            doc.set_text(a, &item.label);
            doc.append_child(li, a);
            doc.append_child(menu, li);
        }

        doc.insert_child(mount_point, 0, header);

        // Items leave flow once they animate; the menu keeps its height.
        if let Some(rect) = geometry::measure(doc, menu) {
            doc.update_style(
                menu,
                &StylePatch {
                    height: Some(Some(rect.height)),
                    ..StylePatch::default()
                },
            );
        }
        header
    }

    fn on_scroll(&mut self, doc: &mut Document, offset: f64) {
        let triggers = self.tracker.on_scroll_offset_change(offset);
        if triggers.is_empty() {
            return;
        }
        let ids: Vec<&str> = triggers.iter().map(|t| t.item_id.as_str()).collect();
        for (id, outcome) in self.animator.trigger_batch(doc, &ids) {
            if outcome == TriggerOutcome::Started {
                self.tracker.set_animating(&id, true);
            }
        }
        self.last_trigger = triggers.last().cloned();
    }
}

impl Component for HeaderWidget {
    fn mount(&mut self, cx: &mut MountContext<'_>) {
        if self.root.is_some() {
            tracing::warn!("header: already mounted");
            return;
        }
        self.root = Some(self.render(cx.doc, cx.mount_point));
        self.scroll = Some(cx.scroll.subscribe());
        self.viewport = Some(cx.viewport.subscribe());
        self.recompute_resting_positions(cx.doc);
        tracing::info!(items = self.items.len(), "header: mounted");
    }

    fn update(&mut self, doc: &mut Document) {
        if self.root.is_none() {
            return;
        }
        if let Some(viewport) = self.viewport.as_mut().and_then(|s| s.changed()) {
            tracing::info!(
                width = viewport.width,
                height = viewport.height,
                "header: viewport resized"
            );
            self.recompute_resting_positions(doc);
            self.animator.invalidate_layout();
        }
        if let Some(offset) = self.scroll.as_mut().and_then(|s| s.changed()) {
            self.on_scroll(doc, offset);
        }
    }

    fn after_paint(&mut self, doc: &mut Document) {
        if self.root.is_none() {
            return;
        }
        for event in self.animator.after_paint(doc) {
            if let AnimatorEvent::Completed(id) = event {
                self.tracker.set_animating(&id, false);
            }
        }
    }

    fn unmount(&mut self, doc: &mut Document) {
        let Some(root) = self.root.take() else {
            return;
        };
        self.scroll = None;
        self.viewport = None;
        self.animator.reset(doc);
        doc.remove(root);
        self.tracker.set_resting_positions(Vec::<(String, f64)>::new());
        self.last_trigger = None;
        tracing::info!("header: unmounted");
    }

    fn is_mounted(&self) -> bool {
        self.root.is_some()
    }
}
