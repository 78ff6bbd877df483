//! Scroll progress of one content container through the viewport.
//!
//! Progress is 0 while the container's top is still below the viewport
//! bottom and reaches 1 once its bottom has scrolled past the viewport top:
//!
//! ```text
//! progress = clamp((vh - top) / (height + vh), 0, 1)
//! ```

use crate::dom::{Document, NodeId, Rect, Target, Viewport};
use crate::engine::geometry;

use super::signal::Subscription;
use super::{Component, MountContext};

/// Progress for a container at viewport-relative `rect`.
pub fn scroll_progress(rect: Rect, viewport_height: f64) -> f64 {
    let span = rect.height + viewport_height;
    if span <= 0.0 {
        return 0.0;
    }
    ((viewport_height - rect.top) / span).clamp(0.0, 1.0)
}

pub struct ScrollProgress {
    target: String,
    progress: f64,
    mounted: bool,
    dirty: bool,
    scroll: Option<Subscription<f64>>,
    viewport: Option<Subscription<Viewport>>,
}

impl ScrollProgress {
    /// `target` selects the container to track, e.g. `#content`.
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            progress: 0.0,
            mounted: false,
            dirty: false,
            scroll: None,
            viewport: None,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    fn container(&self, doc: &Document) -> Option<NodeId> {
        Target::Selector(&self.target).resolve(doc)
    }

    fn recompute(&mut self, doc: &Document) {
        let Some(rect) = self.container(doc).and_then(|c| geometry::measure(doc, c)) else {
            tracing::debug!(container = %self.target, "progress: container not rendered");
            return;
        };
        self.progress = scroll_progress(rect, doc.viewport().height);
    }
}

impl Component for ScrollProgress {
    fn mount(&mut self, cx: &mut MountContext<'_>) {
        if self.mounted {
            tracing::warn!("progress: already mounted");
            return;
        }
        self.scroll = Some(cx.scroll.subscribe());
        self.viewport = Some(cx.viewport.subscribe());
        self.mounted = true;
        self.dirty = true;
        self.recompute(cx.doc);
    }

    fn update(&mut self, doc: &mut Document) {
        if !self.mounted {
            return;
        }
        let scrolled = self.scroll.as_mut().and_then(|s| s.changed()).is_some();
        let resized = self.viewport.as_mut().and_then(|s| s.changed()).is_some();
        if scrolled || resized || std::mem::take(&mut self.dirty) {
            self.recompute(doc);
        }
    }

    fn unmount(&mut self, _doc: &mut Document) {
        self.scroll = None;
        self.viewport = None;
        self.mounted = false;
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::style::StylePatch;
    use crate::widget::signal::{ScrollSource, ViewportSource};

    #[test]
    fn formula_is_clamped() {
        let vh = 400.0;
        assert_eq!(scroll_progress(Rect::new(0.0, 400.0, 640.0, 1600.0), vh), 0.0);
        assert_eq!(scroll_progress(Rect::new(0.0, 900.0, 640.0, 1600.0), vh), 0.0);
        assert_eq!(scroll_progress(Rect::new(0.0, -600.0, 640.0, 1600.0), vh), 0.5);
        assert_eq!(scroll_progress(Rect::new(0.0, -1600.0, 640.0, 1600.0), vh), 1.0);
        assert_eq!(scroll_progress(Rect::new(0.0, -5000.0, 640.0, 1600.0), vh), 1.0);
        assert_eq!(scroll_progress(Rect::new(0.0, 0.0, 0.0, 0.0), 0.0), 0.0);
    }

    #[test]
    fn follows_the_scroll_source() {
        let vp = Viewport::new(640.0, 400.0);
        let mut doc = Document::new(vp);
        let main = doc.create_element("main");
        doc.set_id(main, "content");
        doc.update_style(
            main,
            &StylePatch {
                height: Some(Some(1600.0)),
                ..StylePatch::default()
            },
        );
        doc.append_child(doc.root(), main);

        let scroll = ScrollSource::new(0.0);
        let viewport = ViewportSource::new(vp);
        let mut progress = ScrollProgress::new("#content");
        let mount_point = doc.root();
        progress.mount(&mut MountContext {
            doc: &mut doc,
            mount_point,
            scroll: &scroll,
            viewport: &viewport,
        });
        // Top edge at 0: (400 - 0) / 2000.
        assert_eq!(progress.progress(), 0.2);

        doc.set_scroll_y(600.0);
        scroll.set(600.0);
        progress.update(&mut doc);
        assert_eq!(progress.progress(), 0.5);

        progress.unmount(&mut doc);
        assert_eq!(scroll.subscriber_count(), 0);
        doc.set_scroll_y(1600.0);
        scroll.set(1600.0);
        progress.update(&mut doc);
        assert_eq!(progress.progress(), 0.5);
    }

    #[test]
    fn missing_container_keeps_last_value() {
        let mut doc = Document::new(Viewport::new(640.0, 400.0));
        let scroll = ScrollSource::new(0.0);
        let viewport = ViewportSource::new(doc.viewport());
        let mut progress = ScrollProgress::new("#nowhere");
        let mount_point = doc.root();
        progress.mount(&mut MountContext {
            doc: &mut doc,
            mount_point,
            scroll: &scroll,
            viewport: &viewport,
        });
        scroll.set(100.0);
        progress.update(&mut doc);
        assert_eq!(progress.progress(), 0.0);
    }
}
