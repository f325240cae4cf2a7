//! [`Dom`] over the browser document.
//!
//! # Invariants
//!
//! - A live browser node maps to exactly one [`NodeId`]; lookups compare
//!   with `isSameNode`.
//! - A removed node's slot is freed and later reused under a new
//!   generation, so a stale handle never resolves to the newcomer.
//! - Every registered callback stays alive exactly as long as its listener
//!   record, and is detached from its target when the record is dropped.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | DOM call throws | hostile page, bad markup | logged at `debug`, operation skipped |
//! | Unknown handle | node removed, slot reused, or never issued | no-op, empty query result |
//! | Hidden element measured | `display: none` has no box | measured shown-but-invisible, then restored |
//! | Element has no layout at all | detached or inside a hidden ancestor | inline `width`/`height` used instead |

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::debug;
use veil_core::geometry::parse_px;
use veil_core::{RuntimeCaps, Size};
use veil_dom::{Dom, DomEvent, EventKind, EventTarget, NodeId};
use veil_modal::{ModalData, ModalError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlTemplateElement, Node, Window};

use crate::detect::detect_caps;

type Callback = Closure<dyn FnMut(web_sys::Event)>;

/// Low bits of a handle select the slot, high bits carry its generation.
const INDEX_BITS: u32 = 20;
const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;
const GENERATION_MASK: u32 = u32::MAX >> INDEX_BITS;

/// Handle issued when the browser refuses to create a node.
const DEAD_HANDLE: NodeId = NodeId::from_raw(u32::MAX);

struct Slot {
    node: Option<Node>,
    generation: u32,
}

impl Slot {
    fn id(&self, index: usize) -> NodeId {
        NodeId::from_raw((self.generation << INDEX_BITS) | index as u32)
    }
}

/// Slots holding every node handed out so far. Freed slots are reused.
#[derive(Default)]
struct Arena {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Arena {
    fn find(&self, node: &Node) -> Option<NodeId> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            slot.node
                .as_ref()
                .is_some_and(|known| known.is_same_node(Some(node)))
                .then(|| slot.id(index))
        })
    }

    fn insert(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return slot.id(index);
        }
        // The last index is kept back so no slot can mint `DEAD_HANDLE`.
        if self.slots.len() >= INDEX_MASK as usize {
            debug!("node arena exhausted");
            return DEAD_HANDLE;
        }
        self.slots.push(Slot {
            node: Some(node),
            generation: 0,
        });
        let index = self.slots.len() - 1;
        self.slots[index].id(index)
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        if id == DEAD_HANDLE {
            return None;
        }
        let index = (id.raw() & INDEX_MASK) as usize;
        let slot = self.slots.get(index)?;
        if slot.generation != id.raw() >> INDEX_BITS {
            return None;
        }
        slot.node.as_ref()
    }

    fn release_within(&mut self, root: &Node) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.as_ref().is_some_and(|node| root.contains(Some(node))) {
                slot.node = None;
                slot.generation = (slot.generation + 1) & GENERATION_MASK;
                self.free.push(index);
            }
        }
    }

    fn occupied(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

struct WebListener {
    namespace: String,
    target: EventTarget,
    kind: EventKind,
    element: web_sys::EventTarget,
    callback: Callback,
}

impl WebListener {
    fn detach(&self) {
        let removed = self.element.remove_event_listener_with_callback(
            self.kind.as_str(),
            self.callback.as_ref().unchecked_ref(),
        );
        if let Err(err) = removed {
            debug!(?err, kind = self.kind.as_str(), "removeEventListener failed");
        }
    }
}

/// The live browser document.
pub struct WebDom {
    window: Window,
    document: Document,
    body: NodeId,
    caps: RuntimeCaps,
    nodes: RefCell<Arena>,
    listeners: Vec<WebListener>,
    queue: Rc<RefCell<VecDeque<DomEvent>>>,
}

impl std::fmt::Debug for WebDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDom")
            .field("body", &self.body)
            .field("caps", &self.caps)
            .field("nodes", &self.nodes.borrow().occupied())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl WebDom {
    /// Attach to the current page. `None` outside a browser window or
    /// before `document.body` exists.
    #[must_use]
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let body: Node = document.body()?.into();

        let user_agent = window.navigator().user_agent().unwrap_or_default();
        let has_xhr = js_sys::Reflect::has(&window, &JsValue::from_str("XMLHttpRequest"))
            .unwrap_or(false);
        let caps = detect_caps(&user_agent, &document.compat_mode(), has_xhr);
        debug!(?caps, "browser host attached");

        let mut nodes = Arena::default();
        let body_id = nodes.insert(body);

        Some(Self {
            window,
            document,
            body: body_id,
            caps,
            nodes: RefCell::new(nodes),
            listeners: Vec::new(),
            queue: Rc::new(RefCell::new(VecDeque::new())),
        })
    }

    /// Handle for a browser node, issuing one on first sight.
    pub fn handle(&self, node: &Node) -> NodeId {
        if let Some(id) = self.nodes.borrow().find(node) {
            return id;
        }
        self.nodes.borrow_mut().insert(node.clone())
    }

    /// Browser node behind a handle. `None` once the node was removed, even
    /// if its slot now holds another node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.nodes.borrow().get(id).cloned()
    }

    /// Number of nodes currently holding a handle.
    #[must_use]
    pub fn tracked_nodes(&self) -> usize {
        self.nodes.borrow().occupied()
    }

    fn element(&self, id: NodeId) -> Option<Element> {
        self.node(id)?.dyn_into::<Element>().ok()
    }

    fn html_element(&self, id: NodeId) -> Option<HtmlElement> {
        self.node(id)?.dyn_into::<HtmlElement>().ok()
    }

    /// Events queued by listener callbacks, oldest first.
    pub fn take_events(&mut self) -> Vec<DomEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub(crate) fn has_pending_events(&self) -> bool {
        !self.queue.borrow().is_empty()
    }

    /// Convert a script value into dialog content.
    ///
    /// Strings are markup, numbers are numbers, a node is a node, and an
    /// array of nodes is a selection. Anything else is rejected with its
    /// script type name.
    pub fn modal_data(&self, value: &JsValue) -> Result<ModalData, ModalError> {
        if let Some(markup) = value.as_string() {
            return Ok(ModalData::Markup(markup));
        }
        if let Some(number) = value.as_f64() {
            return Ok(ModalData::Number(number));
        }
        if let Some(node) = value.dyn_ref::<Node>() {
            return Ok(ModalData::Node(self.handle(node)));
        }
        if let Some(array) = value.dyn_ref::<js_sys::Array>() {
            let nodes: Option<Vec<NodeId>> = array
                .iter()
                .map(|item| item.dyn_ref::<Node>().map(|node| self.handle(node)))
                .collect();
            return match nodes {
                Some(nodes) if !nodes.is_empty() => Ok(ModalData::Selection(nodes)),
                Some(_) => Err(ModalError::UnsupportedData {
                    kind: "empty selection",
                }),
                None => Err(ModalError::UnsupportedData { kind: "array" }),
            };
        }
        Err(ModalError::UnsupportedData {
            kind: script_type(value),
        })
    }

    fn release_subtree(&self, root: &Node) {
        self.nodes.borrow_mut().release_within(root);
    }

    fn drop_listeners(&mut self, keep: impl Fn(&WebListener) -> bool) {
        let (kept, dropped): (Vec<_>, Vec<_>) = self.listeners.drain(..).partition(|l| keep(l));
        for listener in &dropped {
            listener.detach();
        }
        self.listeners = kept;
    }
}

fn script_type(value: &JsValue) -> &'static str {
    if value.is_null() {
        "null"
    } else if value.is_undefined() {
        "undefined"
    } else if value.as_bool().is_some() {
        "boolean"
    } else if value.is_function() {
        "function"
    } else if value.is_symbol() {
        "symbol"
    } else if value.is_bigint() {
        "bigint"
    } else {
        "object"
    }
}

/// Lay out a `display: none` element without painting it, read its box,
/// and put the inline `display` and `visibility` back as they were.
fn measure_unseen(element: &HtmlElement) -> Size {
    let style = element.style();
    let saved = ["display", "visibility"].map(|property| {
        let value = style.get_property_value(property).unwrap_or_default();
        let priority = style.get_property_priority(property);
        (property, value, priority)
    });

    logged(style.set_property("visibility", "hidden"), "style.setProperty");
    logged(style.set_property("display", "block"), "style.setProperty");
    let size = Size::new(
        f64::from(element.offset_width()),
        f64::from(element.offset_height()),
    );

    for (property, value, priority) in &saved {
        let restored = if value.is_empty() {
            style.remove_property(property).map(drop)
        } else {
            style.set_property_with_priority(property, value, priority)
        };
        logged(restored, "style restore");
    }
    size
}

fn logged<T>(result: Result<T, JsValue>, operation: &'static str) -> Option<T> {
    result
        .inspect_err(|err| debug!(?err, operation, "DOM call failed"))
        .ok()
}

impl Dom for WebDom {
    fn body(&self) -> NodeId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        match logged(self.document.create_element(tag), "createElement") {
            Some(element) => self.handle(&element),
            // Never resolves, so later calls are no-ops.
            None => DEAD_HANDLE,
        }
    }

    fn parse_markup(&mut self, markup: &str) -> Vec<NodeId> {
        let Some(template) = logged(self.document.create_element("template"), "createElement")
            .and_then(|element| element.dyn_into::<HtmlTemplateElement>().ok())
        else {
            return Vec::new();
        };
        template.set_inner_html(markup);
        let fragment = template.content();
        let children = fragment.child_nodes();

        let mut nodes = Vec::with_capacity(children.length() as usize);
        while let Some(child) = fragment.first_child() {
            let _ = logged(fragment.remove_child(&child), "removeChild");
            nodes.push(self.handle(&child));
        }
        nodes
    }

    fn set_inner_markup(&mut self, node: NodeId, markup: &str) {
        if let Some(element) = self.element(node) {
            let old = element.child_nodes();
            for index in 0..old.length() {
                if let Some(child) = old.get(index) {
                    self.release_subtree(&child);
                }
            }
            element.set_inner_html(markup);
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element(node) {
            logged(element.set_attribute(name, value), "setAttribute");
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element(node) {
            logged(element.class_list().add_1(class), "classList.add");
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|element| element.class_list().contains(class))
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(element) = self.html_element(node) {
            logged(element.style().set_property(property, value), "style.setProperty");
        }
    }

    fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(element) = self.html_element(node) {
            logged(element.style().remove_property(property), "style.removeProperty");
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        let value = self
            .html_element(node)?
            .style()
            .get_property_value(property)
            .ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let (Some(parent), Some(child)) = (self.node(parent), self.node(child)) {
            logged(parent.append_child(&child), "appendChild");
        }
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let (Some(parent_node), Some(child_node)) = (self.node(parent), self.node(child)) else {
            return;
        };
        let reference = reference
            .filter(|r| *r != child)
            .and_then(|r| self.node(r))
            .filter(|r| {
                r.parent_node()
                    .is_some_and(|p| p.is_same_node(Some(&parent_node)))
            });
        logged(
            parent_node.insert_before(&child_node, reference.as_ref()),
            "insertBefore",
        );
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(node) = self.node(node)
            && let Some(parent) = node.parent_node()
        {
            logged(parent.remove_child(&node), "removeChild");
        }
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        let Some(doomed) = self.node(node) else {
            return;
        };
        self.drop_listeners(|listener| match listener.target {
            EventTarget::Node(_) => !listener
                .element
                .dyn_ref::<Node>()
                .is_some_and(|target| doomed.contains(Some(target))),
            EventTarget::Window => true,
        });
        self.detach(node);
        self.release_subtree(&doomed);
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(node)?.parent_node()?;
        Some(self.handle(&parent))
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let sibling = self.node(node)?.next_sibling()?;
        Some(self.handle(&sibling))
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(|node| node.is_connected())
    }

    fn deep_clone(&mut self, node: NodeId) -> NodeId {
        // Browsers never copy listeners added with addEventListener.
        match self
            .node(node)
            .and_then(|node| logged(node.clone_node_with_deep(true), "cloneNode"))
        {
            Some(copy) => self.handle(&copy),
            None => DEAD_HANDLE,
        }
    }

    fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        let found = self.document.get_elements_by_class_name(class);
        (0..found.length())
            .filter_map(|index| found.item(index))
            .map(|element| self.handle(&element))
            .collect()
    }

    fn viewport(&self) -> Size {
        if let Some(root) = self.document.document_element() {
            let (width, height) = (root.client_width(), root.client_height());
            if width > 0 && height > 0 {
                return Size::new(f64::from(width), f64::from(height));
            }
        }
        let read = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };
        Size::new(
            read(self.window.inner_width()),
            read(self.window.inner_height()),
        )
    }

    fn measure(&self, node: NodeId) -> Size {
        let Some(element) = self.element(node) else {
            return Size::ZERO;
        };
        let rect = element.get_bounding_client_rect();
        if rect.width() > 0.0 || rect.height() > 0.0 {
            return Size::new(rect.width(), rect.height());
        }
        if let Some(element) = self.html_element(node) {
            let size = measure_unseen(&element);
            if size.width > 0.0 || size.height > 0.0 {
                return size;
            }
        }
        let read = |property: &str| {
            self.style(node, property)
                .and_then(|value| parse_px(&value))
                .unwrap_or(0.0)
        };
        Size::new(read("width"), read("height"))
    }

    fn capabilities(&self) -> RuntimeCaps {
        self.caps
    }

    fn listen(&mut self, namespace: &str, target: EventTarget, kind: EventKind) {
        let element: web_sys::EventTarget = match target {
            EventTarget::Window => self.window.clone().into(),
            EventTarget::Node(node) => match self.node(node) {
                Some(node) => node.into(),
                None => return,
            },
        };

        let queue = Rc::clone(&self.queue);
        let callback: Callback = Closure::new(move |event: web_sys::Event| {
            let queued = match (kind, target) {
                (EventKind::Click, EventTarget::Node(node)) => {
                    event.prevent_default();
                    DomEvent::Click { target: node }
                }
                (EventKind::Click, EventTarget::Window) => return,
                (EventKind::Resize, _) => DomEvent::Resize,
            };
            queue.borrow_mut().push_back(queued);
            crate::global::pump();
        });

        let added = element
            .add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref());
        if logged(added, "addEventListener").is_none() {
            return;
        }
        self.listeners.push(WebListener {
            namespace: namespace.to_owned(),
            target,
            kind,
            element,
            callback,
        });
    }

    fn unlisten_all(&mut self, namespace: &str) {
        self.drop_listeners(|listener| listener.namespace != namespace);
    }

    fn is_listening(&self, namespace: &str, target: EventTarget, kind: EventKind) -> bool {
        self.listeners
            .iter()
            .any(|l| l.namespace == namespace && l.target == target && l.kind == kind)
    }
}

impl Drop for WebDom {
    fn drop(&mut self) {
        for listener in &self.listeners {
            listener.detach();
        }
    }
}
