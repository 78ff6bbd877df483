//! Loose element references that resolve lazily against the live document.

use super::node::{Document, NodeId};

/// Something that names an element: a selector, or a handle obtained
/// earlier that may since have been detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Selector(&'a str),
    Node(NodeId),
}

impl Target<'_> {
    /// The attached element this target names, if any.
    pub fn resolve(self, doc: &Document) -> Option<NodeId> {
        match self {
            Target::Selector(sel) => doc.query_selector(doc.root(), sel),
            Target::Node(id) => doc.is_attached(id).then_some(id),
        }
    }
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(selector: &'a str) -> Self {
        Target::Selector(selector)
    }
}

impl From<NodeId> for Target<'_> {
    fn from(id: NodeId) -> Self {
        Target::Node(id)
    }
}
