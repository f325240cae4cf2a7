//! Deterministic in-memory document.
//!
//! [`MemoryDom`] is a complete [`Dom`] host without a browser. It backs
//! headless hosts (server-side previews, snapshot tooling) and every
//! controller test.
//!
//! # Model
//!
//! - Nodes live in an arena indexed by [`NodeId`]; removed nodes leave a
//!   tombstone so stale handles are ignored rather than aliased.
//! - The document is `<html><body>…</body></html>`; only nodes reachable
//!   from the root are connected.
//! - Layout is not computed. [`Dom::measure`] reads inline `width` and
//!   `height` pixel values, which is what the modal container is sized by.
//! - Listeners are recorded, not invoked; hosts route [`DomEvent`]s to the
//!   controller, which checks [`Dom::is_listening`].
//!
//! # Serialization
//!
//! [`MemoryDom::outer_html`] renders attributes in insertion order, then
//! `class`, then `style`. Two documents that serialize identically are
//! treated as equivalent.
//!
//! [`DomEvent`]: crate::DomEvent

mod markup;

use veil_core::geometry::parse_px;
use veil_core::{RuntimeCaps, Size, StyleRules};

use crate::event::{EventKind, EventTarget};
use crate::host::Dom;
use crate::node::NodeId;
use markup::ParsedNode;

const DEFAULT_VIEWPORT: Size = Size::new(1024.0, 768.0);

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    style: StyleRules,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Listener {
    namespace: String,
    target: EventTarget,
    kind: EventKind,
}

/// In-memory [`Dom`] host.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Option<NodeData>>,
    root: NodeId,
    body: NodeId,
    viewport: Size,
    caps: RuntimeCaps,
    listeners: Vec<Listener>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Empty document with a 1024×768 viewport and modern capabilities.
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId::from_raw(0),
            body: NodeId::from_raw(0),
            viewport: DEFAULT_VIEWPORT,
            caps: RuntimeCaps::modern(),
            listeners: Vec::new(),
        };
        dom.root = dom.alloc(NodeKind::Element(ElementData::new("html")));
        dom.body = dom.alloc(NodeKind::Element(ElementData::new("body")));
        dom.link(dom.root, dom.body, None);
        dom
    }

    /// Document whose body holds `markup`.
    #[must_use]
    pub fn with_body(markup: &str) -> Self {
        let mut dom = Self::new();
        let body = dom.body;
        dom.set_inner_markup(body, markup);
        dom
    }

    #[must_use]
    pub fn viewport_size(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    #[must_use]
    pub fn runtime_caps(mut self, caps: RuntimeCaps) -> Self {
        self.caps = caps;
        self
    }

    /// Simulate a window resize. The host is responsible for delivering
    /// the matching [`DomEvent::Resize`](crate::DomEvent::Resize).
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// First connected element with the given `id` attribute.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.attribute(*node, "id").as_deref() == Some(id))
    }

    /// Serialized body content.
    #[must_use]
    pub fn body_html(&self) -> String {
        self.inner_html(self.body)
    }

    /// Serialized children of `node`.
    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(data) = self.node(node) {
            for child in &data.children {
                self.write_node(*child, &mut out);
            }
        }
        out
    }

    /// Serialized `node`, including itself.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    /// Concatenated text of `node` and its descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    /// Tag name of an element node.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element(element) => Some(element.tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Whether `node` has not been removed.
    #[must_use]
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    /// Number of listeners registered under `namespace`.
    #[must_use]
    pub fn listener_count(&self, namespace: &str) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.namespace == namespace)
            .count()
    }

    /// Append a text node to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.alloc(NodeKind::Text(text.to_owned()));
        self.append_child(parent, node);
        node
    }

    // --- Arena ---

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(Some(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(|data| data.parent);
        }
        false
    }

    fn unlink(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).and_then(|data| data.parent) else {
            return;
        };
        if let Some(parent_data) = self.node_mut(parent) {
            parent_data.children.retain(|child| *child != node);
        }
        if let Some(data) = self.node_mut(node) {
            data.parent = None;
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if self.node(parent).is_none()
            || self.node(child).is_none()
            || self.is_inclusive_ancestor(child, parent)
        {
            return;
        }
        self.unlink(child);
        if let Some(parent_data) = self.node_mut(parent) {
            let at = reference
                .and_then(|r| parent_data.children.iter().position(|c| *c == r))
                .unwrap_or(parent_data.children.len());
            parent_data.children.insert(at, child);
        }
        if let Some(data) = self.node_mut(child) {
            data.parent = Some(parent);
        }
    }

    /// `node` and its descendants in document order.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(data) = self.node(id) else { continue };
            out.push(id);
            stack.extend(data.children.iter().rev().copied());
        }
        out
    }

    fn instantiate(&mut self, parsed: ParsedNode) -> NodeId {
        match parsed {
            ParsedNode::Text(text) => self.alloc(NodeKind::Text(text)),
            ParsedNode::Element {
                tag,
                attributes,
                children,
            } => {
                let node = self.alloc(NodeKind::Element(ElementData::new(&tag)));
                for (name, value) in attributes {
                    self.set_attribute(node, &name, &value);
                }
                for child in children {
                    let child = self.instantiate(child);
                    self.link(node, child, None);
                }
                node
            }
        }
    }

    fn clone_subtree(&mut self, node: NodeId, mapping: &mut Vec<(NodeId, NodeId)>) -> Option<NodeId> {
        let data = self.node(node)?.clone();
        let copy = self.alloc(data.kind);
        mapping.push((node, copy));
        for child in data.children {
            if let Some(child_copy) = self.clone_subtree(child, mapping) {
                self.link(copy, child_copy, None);
            }
        }
        Some(copy)
    }

    // --- Serialization ---

    fn write_node(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.node(node) else { return };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(&markup::escape_text(text)),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attributes {
                    push_attr(out, name, value);
                }
                if !element.classes.is_empty() {
                    push_attr(out, "class", &element.classes.join(" "));
                }
                if !element.style.is_empty() {
                    push_attr(out, "style", &style_text(&element.style));
                }
                out.push('>');
                if markup::is_void(&element.tag) {
                    return;
                }
                for child in &data.children {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.node(node) else { return };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(_) => {
                for child in &data.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            classes: Vec::new(),
            style: StyleRules::new(),
        }
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&markup::escape_attr(value));
    out.push('"');
}

fn style_text(style: &StyleRules) -> String {
    style
        .iter()
        .map(|(property, value)| format!("{property}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_style_text(text: &str) -> StyleRules {
    text.split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(property, value)| (property.trim().to_ascii_lowercase(), value.trim().to_owned()))
        .filter(|(property, _)| !property.is_empty())
        .collect()
}

impl Dom for MemoryDom {
    fn body(&self) -> NodeId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData::new(tag)))
    }

    fn parse_markup(&mut self, markup: &str) -> Vec<NodeId> {
        markup::parse(markup)
            .into_iter()
            .map(|parsed| self.instantiate(parsed))
            .collect()
    }

    fn set_inner_markup(&mut self, node: NodeId, markup: &str) {
        if self.element(node).is_none() {
            return;
        }
        for child in self.children(node) {
            self.remove(child);
        }
        for child in self.parse_markup(markup) {
            self.link(node, child, None);
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "class" => {
                if let Some(element) = self.element_mut(node) {
                    element.classes = value.split_whitespace().map(str::to_owned).collect();
                }
            }
            "style" => {
                if let Some(element) = self.element_mut(node) {
                    element.style = parse_style_text(value);
                }
            }
            _ => {
                let Some(element) = self.element_mut(node) else {
                    return;
                };
                match element.attributes.iter_mut().find(|(n, _)| *n == name) {
                    Some(slot) => slot.1 = value.to_owned(),
                    None => element.attributes.push((name, value.to_owned())),
                }
            }
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let element = self.element(node)?;
        match name {
            "class" => (!element.classes.is_empty()).then(|| element.classes.join(" ")),
            "style" => (!element.style.is_empty()).then(|| style_text(&element.style)),
            _ => element
                .attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        let Some(element) = self.element_mut(node) else {
            return;
        };
        for class in class.split_whitespace() {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_owned());
            }
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|element| element.classes.iter().any(|c| c == class))
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            element.style.set(property, value);
        }
    }

    fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(element) = self.element_mut(node) {
            element.style = element
                .style
                .iter()
                .filter(|(p, _)| *p != property)
                .collect();
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.element(node)?.style.get(property).map(str::to_owned)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.link(parent, child, None);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let reference = reference.filter(|r| *r != child);
        self.link(parent, child, reference);
    }

    fn detach(&mut self, node: NodeId) {
        self.unlink(node);
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.root || node == self.body {
            return;
        }
        self.unlink(node);
        let doomed = self.descendants(node);
        self.listeners.retain(|listener| match listener.target {
            EventTarget::Node(target) => !doomed.contains(&target),
            EventTarget::Window => true,
        });
        for id in doomed {
            if let Some(slot) = self.nodes.get_mut(id.index()) {
                *slot = None;
            }
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.node(parent)?.children;
        let at = siblings.iter().position(|c| *c == node)?;
        siblings.get(at + 1).copied()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.node(node).is_some() && self.is_inclusive_ancestor(self.root, node)
    }

    fn deep_clone(&mut self, node: NodeId) -> NodeId {
        let mut mapping = Vec::new();
        let Some(copy) = self.clone_subtree(node, &mut mapping) else {
            return self.alloc(NodeKind::Text(String::new()));
        };
        let copied: Vec<Listener> = self
            .listeners
            .iter()
            .filter_map(|listener| {
                let EventTarget::Node(target) = listener.target else {
                    return None;
                };
                let (_, twin) = mapping.iter().find(|(original, _)| *original == target)?;
                Some(Listener {
                    namespace: listener.namespace.clone(),
                    target: EventTarget::Node(*twin),
                    kind: listener.kind,
                })
            })
            .collect();
        self.listeners.extend(copied);
        copy
    }

    fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|node| self.has_class(*node, class))
            .collect()
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn measure(&self, node: NodeId) -> Size {
        let Some(element) = self.element(node) else {
            return Size::ZERO;
        };
        let read = |property: &str| element.style.get(property).and_then(parse_px).unwrap_or(0.0);
        Size::new(read("width"), read("height"))
    }

    fn capabilities(&self) -> RuntimeCaps {
        self.caps
    }

    fn listen(&mut self, namespace: &str, target: EventTarget, kind: EventKind) {
        if let EventTarget::Node(node) = target
            && self.node(node).is_none()
        {
            return;
        }
        self.listeners.push(Listener {
            namespace: namespace.to_owned(),
            target,
            kind,
        });
    }

    fn unlisten_all(&mut self, namespace: &str) {
        self.listeners.retain(|listener| listener.namespace != namespace);
    }

    fn is_listening(&self, namespace: &str, target: EventTarget, kind: EventKind) -> bool {
        self.listeners
            .iter()
            .any(|l| l.namespace == namespace && l.target == target && l.kind == kind)
    }
}
