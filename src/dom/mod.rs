//! Document model: the element tree the header widget renders into and the
//! animation engine measures.
//!
//! This plays the part of the browser DOM: an arena of elements with inline
//! styles, a layout pass that answers bounding-box queries, a virtual clock
//! that drives CSS-style transform transitions, and selector-based lookup.

pub mod layout;
pub mod node;
pub mod style;
pub mod target;

pub use layout::{layout, LayoutMap};
pub use node::{Document, NodeId};
pub use target::Target;

/// Visible area of the page in px.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned box in px.  Bottom and right are derived.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Same box shifted by `(dx, dy)`.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..self
        }
    }

    /// This box expressed relative to `origin`'s top-left corner.
    pub fn offset_from(self, origin: &Rect) -> Self {
        self.translate(-origin.left, -origin.top)
    }
}
