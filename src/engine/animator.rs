//! Transform animator: slides a menu item from where it sits now to where
//! the shadow layout says it would sit.
//!
//! Each item moves through a small state machine:
//!
//! ```text
//! trigger ──► Positioned ──(after paint)──► Animating ──(done)──► Settled
//! ```
//!
//! `trigger` pins the element absolutely at its current box and marks it
//! animating.  The transform is only written from [`TransformAnimator::after_paint`],
//! i.e. once the host has committed a frame with the starting position;
//! writing both in the same frame would collapse into a jump.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::dom::style::{Position, StylePatch, Translate};
use crate::dom::{Document, NodeId, Rect, Target};

use super::geometry;
use super::shadow::{ShadowLayoutCache, ITEM_ATTR};
use super::{Completion, EngineConfig};

/// Marker attribute present while an element is mid-slide.
pub const ANIMATING_ATTR: &str = "data-animating";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Pinned at its starting box, waiting for a paint.
    Positioned { delta: Translate },
    Animating { since: Duration },
    Settled,
}

/// Result of asking for an item to animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started,
    /// A previous slide has not completed yet; the request is dropped.
    AlreadyAnimating,
    /// Element, container or target geometry could not be resolved.
    Unavailable,
}

/// Progress reported from [`TransformAnimator::after_paint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimatorEvent {
    Started(String),
    Completed(String),
}

/// Animates the items of one menu container.
#[derive(Debug)]
pub struct TransformAnimator {
    config: EngineConfig,
    container: String,
    item_selector: String,
    cache: ShadowLayoutCache,
    phases: BTreeMap<String, Phase>,
}

impl TransformAnimator {
    /// `container` is a selector for the menu, `item_selector` picks its
    /// items (which carry a `data-item` id).
    pub fn new(config: EngineConfig, container: &str, item_selector: &str) -> Self {
        Self {
            config,
            container: container.to_string(),
            item_selector: item_selector.to_string(),
            cache: ShadowLayoutCache::new(),
            phases: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Forget the cached shadow layout; the next trigger re-probes.
    pub fn invalidate_layout(&mut self) {
        self.cache.invalidate();
    }

    #[cfg(test)]
    pub fn has_cached_layout(&self) -> bool {
        self.cache.is_cached()
    }

    /// Whether the element for `item_id` carries the animating marker.
    #[cfg(test)]
    pub fn is_animating(&self, doc: &Document, item_id: &str) -> bool {
        self.element(doc, item_id)
            .map(|(_, el)| doc.attr(el, ANIMATING_ATTR).is_some())
            .unwrap_or(false)
    }

    /// Items that are pinned or sliding.
    pub fn in_flight(&self) -> usize {
        self.phases
            .values()
            .filter(|p| !matches!(p, Phase::Settled))
            .count()
    }

    fn element(&self, doc: &Document, item_id: &str) -> Option<(NodeId, NodeId)> {
        let container = Target::Selector(&self.container).resolve(doc)?;
        let el = doc.query_selector(container, &format!("[{ITEM_ATTR}={item_id}]"))?;
        Some((container, el))
    }

    /// Start sliding one item.
    pub fn trigger(&mut self, doc: &mut Document, item_id: &str) -> TriggerOutcome {
        self.trigger_batch(doc, &[item_id])
            .pop()
            .map(|(_, outcome)| outcome)
            .unwrap_or(TriggerOutcome::Unavailable)
    }

    /// Start sliding several items.  Every box is read before any element is
    /// pinned, so pinning one item cannot skew another's starting point.
    pub fn trigger_batch<S: AsRef<str>>(
        &mut self,
        doc: &mut Document,
        item_ids: &[S],
    ) -> Vec<(String, TriggerOutcome)> {
        let mut outcomes: Vec<(String, TriggerOutcome)> = item_ids
            .iter()
            .map(|id| (id.as_ref().to_string(), TriggerOutcome::Unavailable))
            .collect();

        let Some(container) = Target::Selector(&self.container).resolve(doc) else {
            tracing::warn!(container = %self.container, "animator: container not found");
            return outcomes;
        };

        let layout = match self.cache.get_or_compute(
            doc,
            Target::Node(container),
            self.config.alternate_direction,
            &self.item_selector,
        ) {
            Ok(Some(layout)) => layout,
            Ok(None) => return outcomes,
            Err(e) => {
                tracing::error!("animator: shadow layout probe failed: {e}");
                return outcomes;
            }
        };

        // ── reads ───────────────────────────────────────────────
        let map = geometry::snapshot(doc);
        let mut planned: Vec<(usize, NodeId, Rect, Translate)> = Vec::new();
        for (idx, (id, outcome)) in outcomes.iter_mut().enumerate() {
            let Some(el) = doc.query_selector(container, &format!("[{ITEM_ATTR}={id}]")) else {
                tracing::warn!(item = %id, "animator: element not found");
                continue;
            };
            if doc.attr(el, ANIMATING_ATTR).is_some() {
                tracing::debug!(item = %id, "animator: still animating, trigger dropped");
                *outcome = TriggerOutcome::AlreadyAnimating;
                continue;
            }
            let Some(target) = layout.get(id) else {
                tracing::warn!(item = %id, "animator: no shadow geometry for item");
                continue;
            };
            let Some(current) = geometry::relative_in(&map, el, container) else {
                tracing::warn!(item = %id, "animator: element has no layout box");
                continue;
            };
            let delta = Translate::new(target.left - current.left, target.top - current.top);
            planned.push((idx, el, current, delta));
        }

        // ── writes ──────────────────────────────────────────────
        for (idx, el, current, delta) in planned {
            doc.update_style(
                el,
                &StylePatch {
                    position: Some(Position::Absolute),
                    left: Some(Some(current.left)),
                    top: Some(Some(current.top)),
                    width: Some(Some(current.width)),
                    height: Some(Some(current.height)),
                    transition: Some(None),
                    transform: Some(None),
                    ..StylePatch::default()
                },
            );
            doc.set_attr(el, ANIMATING_ATTR, "true");

            let (id, outcome) = &mut outcomes[idx];
            tracing::debug!(
                item = %id,
                dx = delta.x,
                dy = delta.y,
                style = %doc.style(el).css_text(),
                "animator: pinned"
            );
            self.phases.insert(id.clone(), Phase::Positioned { delta });
            *outcome = TriggerOutcome::Started;
        }
        outcomes
    }

    /// Advance the state machine.  Call once per frame, after the host has
    /// painted.
    pub fn after_paint(&mut self, doc: &mut Document) -> Vec<AnimatorEvent> {
        let mut events = Vec::new();
        let now = doc.now();
        // Drained every frame, whatever the completion policy.
        let ended = doc.drain_transition_ends();

        let ids: Vec<String> = self.phases.keys().cloned().collect();
        for id in ids {
            let Some(phase) = self.phases.get(&id).copied() else {
                continue;
            };
            let el = self.element(doc, &id).map(|(_, el)| el);
            match (phase, el) {
                (Phase::Positioned { delta }, Some(el)) => {
                    doc.update_style(
                        el,
                        &StylePatch {
                            transition: Some(Some(self.config.transition())),
                            transform: Some(Some(delta)),
                            ..StylePatch::default()
                        },
                    );
                    tracing::debug!(item = %id, transform = %delta, "animator: sliding");
                    self.phases.insert(id.clone(), Phase::Animating { since: now });
                    events.push(AnimatorEvent::Started(id));
                }
                (Phase::Animating { since }, Some(el)) => {
                    let done = match self.config.completion {
                        Completion::Timer => now.saturating_sub(since) >= self.config.duration,
                        Completion::TransitionEnd => {
                            ended.contains(&el) || !doc.is_transitioning(el)
                        }
                    };
                    if done {
                        doc.remove_attr(el, ANIMATING_ATTR);
                        self.phases.insert(id.clone(), Phase::Settled);
                        tracing::info!(item = %id, "animation complete");
                        events.push(AnimatorEvent::Completed(id));
                    }
                }
                (Phase::Settled, _) => {}
                (_, None) => {
                    // Re-rendered away mid-flight; nothing left to finish.
                    tracing::warn!(item = %id, "animator: element vanished mid-animation");
                    self.phases.remove(&id);
                    events.push(AnimatorEvent::Completed(id));
                }
            }
        }
        events
    }

    /// Put every item back into normal flow and forget all animation
    /// history, including the cached shadow layout.
    pub fn reset(&mut self, doc: &mut Document) {
        let restore = StylePatch {
            position: Some(Position::Static),
            left: Some(None),
            top: Some(None),
            width: Some(None),
            height: Some(None),
            transition: Some(None),
            transform: Some(None),
            ..StylePatch::default()
        };
        if let Some(container) = Target::Selector(&self.container).resolve(doc) {
            for el in doc.query_selector_all(container, &self.item_selector) {
                doc.update_style(el, &restore);
                doc.remove_attr(el, ANIMATING_ATTR);
            }
        }
        self.phases.clear();
        self.cache.invalidate();
    }
}
