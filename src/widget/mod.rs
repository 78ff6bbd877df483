//! Widgets rendered into the document: the sticky header, the scroll
//! progress indicator, and the landing page they live on.
//!
//! Widgets follow a mount / update / unmount lifecycle driven by the host.
//! Mount renders markup and installs subscriptions, update reacts to
//! whatever the subscriptions saw since the last frame, unmount tears both
//! down again.

pub mod header;
pub mod page;
pub mod progress;
pub mod signal;

use crate::dom::{Document, NodeId};

use signal::{ScrollSource, ViewportSource};

/// Everything a widget may touch while mounting.
pub struct MountContext<'a> {
    pub doc: &'a mut Document,
    /// Element the widget renders into.
    pub mount_point: NodeId,
    pub scroll: &'a ScrollSource,
    pub viewport: &'a ViewportSource,
}

/// Lifecycle notifications from the host.
pub trait Component {
    fn mount(&mut self, cx: &mut MountContext<'_>);

    /// Called once per frame, after scroll/viewport publishers ran.
    fn update(&mut self, doc: &mut Document);

    /// Called once per frame, after the host painted.
    fn after_paint(&mut self, _doc: &mut Document) {}

    fn unmount(&mut self, doc: &mut Document);

    fn is_mounted(&self) -> bool;
}
