//! The [`Dom`] host trait.

use veil_core::{RuntimeCaps, Size, StyleRules};

use crate::event::{EventKind, EventTarget};
use crate::node::NodeId;

/// Document operations the modal controller needs from its host.
///
/// # Contract
///
/// - Operations on a handle the host does not know (or has removed) are
///   no-ops; queries on it return `None`, `false`, or an empty value.
/// - [`append_child`](Dom::append_child) and
///   [`insert_before`](Dom::insert_before) move a node that is already
///   attached elsewhere.
/// - [`remove`](Dom::remove) destroys a subtree and drops every listener
///   registered on it; [`detach`](Dom::detach) only unlinks it.
/// - Listeners are grouped by namespace. [`unlisten_all`](Dom::unlisten_all)
///   drops one namespace without touching listeners of another.
pub trait Dom {
    /// The document body.
    fn body(&self) -> NodeId;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Parse markup into detached top-level nodes, in source order.
    fn parse_markup(&mut self, markup: &str) -> Vec<NodeId>;

    /// Replace the children of `node` with the parsed `markup`.
    fn set_inner_markup(&mut self, node: NodeId, markup: &str);

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn add_class(&mut self, node: NodeId, class: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Set an inline style property (CSS spelling, e.g. `z-index`).
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    /// Remove an inline style property.
    fn remove_style(&mut self, node: NodeId, property: &str);

    /// Inline value of a style property.
    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Insert `child` before `reference`, or append when `reference` is
    /// `None` or not a child of `parent`.
    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>);

    /// Unlink `node` from its parent, keeping it alive.
    fn detach(&mut self, node: NodeId);

    /// Unlink and destroy `node` and its subtree.
    fn remove(&mut self, node: NodeId);

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Whether `node` is reachable from the document root.
    fn is_connected(&self, node: NodeId) -> bool;

    /// Deep-copy `node`, including listeners where the host can copy them.
    /// The copy is detached.
    fn deep_clone(&mut self, node: NodeId) -> NodeId;

    /// Connected elements carrying `class`, in document order.
    fn elements_with_class(&self, class: &str) -> Vec<NodeId>;

    /// Current viewport extent.
    fn viewport(&self) -> Size;

    /// Rendered extent of `node`.
    fn measure(&self, node: NodeId) -> Size;

    fn capabilities(&self) -> RuntimeCaps;

    /// Register a listener under `namespace`.
    fn listen(&mut self, namespace: &str, target: EventTarget, kind: EventKind);

    /// Drop every listener registered under `namespace`.
    fn unlisten_all(&mut self, namespace: &str);

    fn is_listening(&self, namespace: &str, target: EventTarget, kind: EventKind) -> bool;

    /// Make `node` visible.
    fn show(&mut self, node: NodeId) {
        self.set_style(node, "display", "block");
    }

    /// Hide `node`.
    fn hide(&mut self, node: NodeId) {
        self.set_style(node, "display", "none");
    }

    fn is_hidden(&self, node: NodeId) -> bool {
        self.style(node, "display").as_deref() == Some("none")
    }

    /// Apply every rule in order.
    fn apply_styles(&mut self, node: NodeId, rules: &StyleRules) {
        for (property, value) in rules.iter() {
            self.set_style(node, property, value);
        }
    }
}
