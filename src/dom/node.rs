//! Arena-backed element tree standing in for the browser DOM.
//!
//! Every [`Node`] lives in a flat `Vec` owned by the [`Document`] and links
//! to its parent and children by [`NodeId`].  Removing a node only unlinks
//! it; its slot stays put so stale handles can be detected with
//! [`Document::is_attached`] instead of dangling.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use thiserror::Error;

use super::style::{Style, StylePatch, Transition, Translate};
use super::Viewport;

/// Index into the document arena.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("unsupported selector `{0}`")]
    InvalidSelector(String),
}

// ───────────────────────────────────────── node ──────────────

/// A single element.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub style: Style,
    /// Text content rendered inside the element (leaf elements only).
    pub text: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            style: Style::default(),
            text: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

// ───────────────────────────────────────── selectors ─────────

/// The selector subset the widgets need: `#id`, `.class`, `tag`,
/// `[attr]` and `[attr=value]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(String),
    Class(String),
    Tag(String),
    Attr { name: String, value: Option<String> },
}

impl Selector {
    pub fn parse(s: &str) -> Result<Self, DomError> {
        let s = s.trim();
        let invalid = || DomError::InvalidSelector(s.to_string());
        let is_ident = |t: &str| {
            !t.is_empty()
                && t.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };

        if let Some(id) = s.strip_prefix('#') {
            return is_ident(id).then(|| Selector::Id(id.into())).ok_or_else(invalid);
        }
        if let Some(class) = s.strip_prefix('.') {
            return is_ident(class)
                .then(|| Selector::Class(class.into()))
                .ok_or_else(invalid);
        }
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let (name, value) = match inner.split_once('=') {
                Some((n, v)) => (n.trim(), Some(v.trim().trim_matches('"').to_string())),
                None => (inner.trim(), None),
            };
            return is_ident(name)
                .then(|| Selector::Attr {
                    name: name.into(),
                    value,
                })
                .ok_or_else(invalid);
        }
        is_ident(s).then(|| Selector::Tag(s.into())).ok_or_else(invalid)
    }

    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Selector::Id(id) => node.id.as_deref() == Some(id),
            Selector::Class(class) => node.has_class(class),
            Selector::Tag(tag) => node.tag.eq_ignore_ascii_case(tag),
            Selector::Attr { name, value } => match (node.attr(name), value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            },
        }
    }
}

// ───────────────────────────────────────── document ──────────

/// A transform transition in flight.
#[derive(Debug, Clone, Copy)]
struct ActiveTransition {
    from: Translate,
    to: Translate,
    start: Duration,
    spec: Transition,
}

impl ActiveTransition {
    fn end(&self) -> Duration {
        self.start + self.spec.duration
    }

    fn sample(&self, now: Duration) -> Translate {
        let total = self.spec.duration.as_secs_f64();
        if total <= 0.0 {
            return self.to;
        }
        let t = (now.saturating_sub(self.start).as_secs_f64() / total).clamp(0.0, 1.0);
        self.from.lerp(self.to, self.spec.easing.apply(t))
    }
}

/// The whole page: element arena, viewport, scroll offset and clock.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    viewport: Viewport,
    scroll_y: f64,
    now: Duration,
    transitions: HashMap<NodeId, ActiveTransition>,
    transition_ends: Vec<NodeId>,
}

impl Document {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            nodes: vec![Node::new("body")],
            root: 0,
            viewport,
            scroll_y: 0.0,
            now: Duration::ZERO,
            transitions: HashMap::new(),
            transition_ends: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn set_scroll_y(&mut self, offset: f64) {
        self.scroll_y = offset.max(0.0);
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    // ── construction ───────────────────────────────────────────

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node::new(tag));
        self.nodes.len() - 1
    }

    /// Detach `child` from wherever it is and append it to `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            !self.ancestors(parent).any(|a| a == child) && parent != child,
            "appending a node into its own subtree"
        );
        self.unlink(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Like [`Document::append_child`] but at position `index` among the
    /// parent's children (clamped).
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.append_child(parent, child);
        let children = &mut self.nodes[parent].children;
        let last = children.len() - 1;
        children[index.min(last)..].rotate_right(1);
    }

    /// Detach a subtree from the document.  Transitions running inside it
    /// are dropped.
    pub fn remove(&mut self, id: NodeId) {
        self.unlink(id);
        for n in self.subtree(id) {
            self.transitions.remove(&n);
        }
    }

    /// Number of arena slots, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every slot allocated at or after `mark`.  The caller must have
    /// already detached those nodes from anything below `mark`.
    pub(crate) fn release_since(&mut self, mark: usize) {
        debug_assert!(
            self.nodes[..mark.min(self.nodes.len())]
                .iter()
                .all(|n| n.children.iter().all(|&c| c < mark)),
            "released nodes are still linked into the tree"
        );
        if mark < self.nodes.len() {
            self.nodes.truncate(mark);
            self.transitions.retain(|&id, _| id < mark);
            self.transition_ends.retain(|&id| id < mark);
        }
    }

    fn unlink(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|&c| c != id);
        }
    }

    /// Copy a subtree (attributes, classes, styles, text).  The copy is
    /// detached; visible transitions are frozen at their current value.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let mut copy = self.nodes[id].clone();
        copy.parent = None;
        copy.children = Vec::new();
        if let Some(t) = self.transitions.get(&id) {
            copy.style.transform = Some(t.sample(self.now));
        }
        self.nodes.push(copy);
        let new_id = self.nodes.len() - 1;
        for child in self.nodes[id].children.clone() {
            let child_copy = self.deep_clone(child);
            self.append_child(new_id, child_copy);
        }
        new_id
    }

    // ── element accessors ──────────────────────────────────────

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        self.nodes[node].id = Some(id.to_string());
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.nodes[node].has_class(class) {
            self.nodes[node].classes.push(class.to_string());
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node].text = Some(text.to_string());
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node].attr(name)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node]
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        self.nodes[node].attrs.remove(name);
    }

    pub fn style(&self, node: NodeId) -> &Style {
        &self.nodes[node].style
    }

    /// Apply a style patch.  A transform write on an element that declares
    /// a transition starts that transition from the currently visible
    /// translation.
    pub fn update_style(&mut self, node: NodeId, patch: &StylePatch) {
        let visible_before = self.visible_transform(node);
        self.nodes[node].style.apply(patch);

        let Some(new_transform) = patch.transform else {
            return;
        };
        let target = new_transform.unwrap_or(Translate::ZERO);
        match self.nodes[node].style.transition {
            Some(spec) if target != visible_before => {
                self.transitions.insert(
                    node,
                    ActiveTransition {
                        from: visible_before,
                        to: target,
                        start: self.now,
                        spec,
                    },
                );
            }
            _ => {
                self.transitions.remove(&node);
            }
        }
    }

    /// The translation currently on screen, mid-transition included.
    pub fn visible_transform(&self, node: NodeId) -> Translate {
        match self.transitions.get(&node) {
            Some(t) => t.sample(self.now),
            None => self.nodes[node].style.transform.unwrap_or(Translate::ZERO),
        }
    }

    pub fn is_transitioning(&self, node: NodeId) -> bool {
        self.transitions.contains_key(&node)
    }

    // ── clock ──────────────────────────────────────────────────

    /// Advance the document clock.  Transitions that reach their end queue
    /// a `transitionend` notification.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now.max(self.now);
        let mut finished: Vec<NodeId> = self
            .transitions
            .iter()
            .filter(|(_, t)| t.end() <= self.now)
            .map(|(&id, _)| id)
            .collect();
        finished.sort_unstable();
        for id in &finished {
            self.transitions.remove(id);
        }
        self.transition_ends.extend(finished);
    }

    #[cfg(test)]
    pub fn advance(&mut self, by: Duration) {
        self.set_time(self.now + by);
    }

    /// Take the queued `transitionend` notifications.
    pub fn drain_transition_ends(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.transition_ends)
    }

    // ── traversal ──────────────────────────────────────────────

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id].parent, move |&p| self.nodes[p].parent)
    }

    /// Whether `id` is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id < self.nodes.len() && (id == self.root || self.ancestors(id).any(|a| a == self.root))
    }

    /// Pre-order list of `id` and its descendants.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n].children.iter().rev());
        }
        out
    }

    /// Descendants of `scope` (excluding `scope`) matching `selector`, in
    /// document order.  An unsupported selector matches nothing.
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let sel = match Selector::parse(selector) {
            Ok(sel) => sel,
            Err(e) => {
                tracing::warn!("{e}");
                return Vec::new();
            }
        };
        self.subtree(scope)
            .into_iter()
            .skip(1)
            .filter(|&n| sel.matches(&self.nodes[n]))
            .collect()
    }

    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        self.query_selector_all(scope, selector).into_iter().next()
    }

    /// First attached element with the given `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.subtree(self.root)
            .into_iter()
            .find(|&n| self.nodes[n].id.as_deref() == Some(id))
    }
}
