//! Central application state.
//!
//! Owns the document, the widgets mounted into it and the publishers that
//! feed them.  The event loop drives it with [`AppState::frame`] and
//! [`AppState::after_paint`]; input handlers only move the scroll target.

use std::time::Duration;

use crate::config::AppConfig;
use crate::dom::{layout, Document, Viewport};
use crate::widget::header::HeaderWidget;
use crate::widget::page::{self, CONTENT_SELECTOR};
use crate::widget::progress::ScrollProgress;
use crate::widget::signal::{ScrollSource, ViewportSource};
use crate::widget::{Component, MountContext};

use super::scroll::ScrollDriver;

pub const TITLE: &str = "Sticky Nav";

/// Fraction of the remaining scroll distance covered per frame.
const SCROLL_SPEED: f64 = 0.25;

/// Top-level application state.
pub struct AppState {
    pub doc: Document,
    pub header: HeaderWidget,
    pub progress: ScrollProgress,
    pub scroll: ScrollDriver,
    pub scroll_source: ScrollSource,
    pub viewport_source: ViewportSource,
    pub config: AppConfig,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Frames seen so far; drives the activity spinner.
    pub frame_count: u64,
}

impl AppState {
    /// Build the landing page for `viewport` and mount the widgets on it.
    pub fn new(config: AppConfig, viewport: Viewport) -> Self {
        let mut doc = Document::new(viewport);
        let body = doc.root();
        page::build_landing_page(&mut doc, body);

        let scroll_source = ScrollSource::new(0.0);
        let viewport_source = ViewportSource::new(viewport);
        let mut header = HeaderWidget::new(TITLE, page::menu_items(), config.engine);
        let mut progress = ScrollProgress::new(CONTENT_SELECTOR);
        {
            let mut cx = MountContext {
                doc: &mut doc,
                mount_point: body,
                scroll: &scroll_source,
                viewport: &viewport_source,
            };
            header.mount(&mut cx);
            progress.mount(&mut cx);
        }

        let mut scroll = ScrollDriver::new(SCROLL_SPEED, config.engine.offset_threshold);
        scroll.set_max(max_scroll(&doc));

        Self {
            doc,
            header,
            progress,
            scroll,
            scroll_source,
            viewport_source,
            config,
            should_quit: false,
            status_message: None,
            frame_count: 0,
        }
    }

    pub fn max_scroll(&self) -> f64 {
        max_scroll(&self.doc)
    }

    /// Advance one frame: clock, scroll position, then widget updates.
    pub fn frame(&mut self, now: Duration) {
        self.frame_count = self.frame_count.wrapping_add(1);
        self.doc.set_time(now);
        let offset = self.scroll.tick();
        self.doc.set_scroll_y(offset);
        self.scroll_source.set(offset);
        self.header.update(&mut self.doc);
        self.progress.update(&mut self.doc);
    }

    /// Let the widgets observe the frame that was just drawn.
    pub fn after_paint(&mut self) {
        self.header.after_paint(&mut self.doc);
        self.progress.after_paint(&mut self.doc);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.doc.viewport() {
            return;
        }
        tracing::debug!(width = viewport.width, height = viewport.height, "resize");
        self.doc.set_viewport(viewport);
        page::fit_sections(&mut self.doc);
        self.scroll.set_max(max_scroll(&self.doc));
        let offset = self.scroll.position();
        self.doc.set_scroll_y(offset);
        self.scroll_source.set(offset);
        self.viewport_source.set(viewport);
        self.header.update(&mut self.doc);
        self.progress.update(&mut self.doc);
    }

    /// Return the menu to its starting layout and jump back to the top.
    pub fn replay(&mut self) {
        self.scroll.scroll_to(0.0);
        self.header.replay(&mut self.doc);
        self.status_message = Some("replaying from the top".into());
    }

    /// Scroll so the section `id` starts at the top of the page.
    pub fn scroll_to_section(&mut self, id: &str) {
        if let Some(top) = self.header.tracker().resting_position(id) {
            self.scroll.scroll_to(top);
            self.status_message = Some(format!("→ #{id}"));
        }
    }

    /// Text for the status bar: a pending message, else the last trigger,
    /// else the key hints.
    pub fn status_line(&self) -> String {
        if let Some(msg) = &self.status_message {
            return msg.clone();
        }
        let Some(t) = self.header.last_trigger() else {
            return self.config.status_bar_hint();
        };
        let mut line = format!(
            "{} {} at {:.0}px (rest {:.0}px)",
            t.item_id, t.direction, t.offset, t.resting
        );
        let tracker = self.header.tracker();
        let sliding: Vec<&str> = self
            .header
            .items()
            .iter()
            .filter(|item| tracker.state(&item.id).is_some_and(|s| s.is_animating))
            .map(|item| item.id.as_str())
            .collect();
        if !sliding.is_empty() {
            line.push_str(" · sliding: ");
            line.push_str(&sliding.join(", "));
        }
        line
    }
}

fn max_scroll(doc: &Document) -> f64 {
    (layout(doc).content_height() - doc.viewport().height).max(0.0)
}
