//! Dialog state: the fragments an open dialog owns and how to undo them.
//!
//! # Invariants
//!
//! - Every content node is a child of the container while the dialog is
//!   open.
//! - `origin` is recorded only for nodes that were connected to the page
//!   when the dialog opened; `original` only when, in addition, edits are
//!   not persisted.
//! - `Origin::before` is never one of the dialog's own content nodes, so
//!   restoring a multi-node selection puts every node back in order.
//! - Each node appears in `content` at most once, however often the
//!   selection named it.

use std::sync::atomic::{AtomicU64, Ordering};

use veil_core::config::{CONTAINER_CLASS, DATA_CLASS, OVERLAY_CLASS};
use veil_core::geometry::px;
use veil_core::{ModalConfig, RuntimeCaps, Size};
use veil_dom::{Dom, NodeId};

use crate::data::ModalData;

static DIALOG_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of one dialog lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialogId(u64);

impl DialogId {
    fn next() -> Self {
        Self(DIALOG_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Returned by a successful open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogHandle {
    pub id: DialogId,
    pub overlay: NodeId,
    pub container: NodeId,
}

/// Where a page node lived before the dialog took it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub parent: NodeId,
    /// First following sibling that is not dialog content; `None` when the
    /// node was last.
    pub before: Option<NodeId>,
}

/// One node shown in the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    pub node: NodeId,
    pub origin: Option<Origin>,
    /// Untouched deep copy, put back on close instead of `node`.
    pub original: Option<NodeId>,
    /// Inline `display` before the dialog hid the node.
    pub display: Option<String>,
}

/// Everything an open dialog owns. Hooks receive it by reference.
#[derive(Debug, Clone)]
pub struct DialogState {
    id: DialogId,
    config: ModalConfig,
    caps: RuntimeCaps,
    content: Vec<ContentEntry>,
    blocking_frame: Option<NodeId>,
    overlay: NodeId,
    container: NodeId,
    close_controls: Vec<NodeId>,
}

impl DialogState {
    /// Capture content and build the hidden fragments on the page body.
    ///
    /// Content is prepared (origin recorded, copy retained, marker class
    /// and styles applied) but not yet moved into the container.
    pub(crate) fn build<D: Dom + ?Sized>(dom: &mut D, data: ModalData, config: ModalConfig) -> Self {
        let caps = dom.capabilities();
        let content = capture_content(dom, data, &config);
        let viewport = dom.viewport();
        let body = dom.body();

        let blocking_frame = (config.blocking_frame || caps.needs_blocking_frame()).then(|| {
            let frame = dom.create_element("iframe");
            dom.set_attribute(frame, "src", "javascript:false;");
            dom.apply_styles(frame, &config.blocking_frame_css);
            dom.set_style(frame, "display", "none");
            dom.set_style(frame, "opacity", "0");
            dom.set_style(frame, "position", "fixed");
            set_extent(dom, frame, viewport);
            dom.set_style(frame, "z-index", &config.z_index.to_string());
            dom.set_style(frame, "top", "0");
            dom.set_style(frame, "left", "0");
            dom.append_child(body, frame);
            frame
        });

        let overlay = dom.create_element("div");
        dom.set_attribute(overlay, "id", &config.overlay_id);
        dom.add_class(overlay, OVERLAY_CLASS);
        dom.apply_styles(overlay, &config.overlay_css);
        dom.set_style(overlay, "display", "none");
        dom.set_style(overlay, "opacity", &config.overlay_opacity().to_string());
        set_extent(dom, overlay, viewport);
        dom.set_style(overlay, "position", "fixed");
        dom.set_style(overlay, "left", "0");
        dom.set_style(overlay, "top", "0");
        dom.set_style(overlay, "z-index", &config.z_index.saturating_add(1).to_string());
        dom.append_child(body, overlay);

        let container = dom.create_element("div");
        dom.set_attribute(container, "id", &config.container_id);
        dom.add_class(container, CONTAINER_CLASS);
        dom.apply_styles(container, &config.container_css);
        dom.set_style(container, "display", "none");
        dom.set_style(container, "position", "fixed");
        dom.set_style(container, "z-index", &config.z_index.saturating_add(2).to_string());
        let close_controls = if config.close {
            let controls = dom.parse_markup(&config.close_markup);
            for control in &controls {
                dom.add_class(*control, &config.close_class);
                dom.append_child(container, *control);
            }
            controls
        } else {
            Vec::new()
        };
        dom.append_child(body, container);

        Self {
            id: DialogId::next(),
            config,
            caps,
            content,
            blocking_frame,
            overlay,
            container,
            close_controls,
        }
    }

    /// Hide the content and move it into the container.
    pub(crate) fn attach_content<D: Dom + ?Sized>(&self, dom: &mut D) {
        for entry in &self.content {
            dom.hide(entry.node);
            dom.append_child(self.container, entry.node);
        }
    }

    #[must_use]
    pub fn id(&self) -> DialogId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    /// Capabilities of the host when the dialog opened.
    #[must_use]
    pub fn caps(&self) -> RuntimeCaps {
        self.caps
    }

    #[must_use]
    pub fn content(&self) -> &[ContentEntry] {
        &self.content
    }

    #[must_use]
    pub fn blocking_frame(&self) -> Option<NodeId> {
        self.blocking_frame
    }

    #[must_use]
    pub fn overlay(&self) -> NodeId {
        self.overlay
    }

    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Nodes parsed from the close markup.
    #[must_use]
    pub fn close_controls(&self) -> &[NodeId] {
        &self.close_controls
    }

    #[must_use]
    pub fn handle(&self) -> DialogHandle {
        DialogHandle {
            id: self.id,
            overlay: self.overlay,
            container: self.container,
        }
    }

    /// Show backdrop, container, and content, in that order.
    pub fn reveal<D: Dom + ?Sized>(&self, dom: &mut D) {
        dom.show(self.overlay);
        dom.show(self.container);
        for entry in &self.content {
            dom.show(entry.node);
        }
    }

    /// Put page content back and remove every fragment.
    ///
    /// Persisted content returns with its edits and its original inline
    /// `display`. Otherwise the live node is destroyed and the copy taken at
    /// open takes its place. Content that did not come from the page is
    /// destroyed.
    pub fn dismantle<D: Dom + ?Sized>(&self, dom: &mut D) {
        for entry in &self.content {
            match (entry.origin, self.config.persist) {
                (Some(origin), true) => {
                    match &entry.display {
                        Some(display) => dom.set_style(entry.node, "display", display),
                        None => dom.remove_style(entry.node, "display"),
                    }
                    dom.insert_before(origin.parent, entry.node, origin.before);
                }
                (Some(origin), false) => {
                    dom.remove(entry.node);
                    if let Some(original) = entry.original {
                        dom.insert_before(origin.parent, original, origin.before);
                    }
                }
                (None, _) => dom.remove(entry.node),
            }
        }

        dom.remove(self.container);
        dom.remove(self.overlay);
        if let Some(frame) = self.blocking_frame {
            dom.remove(frame);
        }
    }
}

pub(crate) fn set_extent<D: Dom + ?Sized>(dom: &mut D, node: NodeId, extent: Size) {
    dom.set_style(node, "height", &px(extent.height));
    dom.set_style(node, "width", &px(extent.width));
}

fn capture_content<D: Dom + ?Sized>(
    dom: &mut D,
    data: ModalData,
    config: &ModalConfig,
) -> Vec<ContentEntry> {
    let nodes = match data {
        ModalData::Node(node) => vec![node],
        ModalData::Selection(mut nodes) => {
            // A node listed twice would be captured, copied and restored twice.
            let mut seen = Vec::with_capacity(nodes.len());
            nodes.retain(|node| {
                if seen.contains(node) {
                    return false;
                }
                seen.push(*node);
                true
            });
            nodes
        }
        primitive @ (ModalData::Markup(_) | ModalData::Number(_)) => {
            let wrapper = dom.create_element("div");
            dom.set_inner_markup(wrapper, &primitive.markup().unwrap_or_default());
            vec![wrapper]
        }
    };

    let mut entries = Vec::with_capacity(nodes.len());
    for &node in &nodes {
        let origin = if dom.is_connected(node) {
            dom.parent(node).map(|parent| Origin {
                parent,
                before: next_foreign_sibling(dom, node, &nodes),
            })
        } else {
            None
        };
        let original = (origin.is_some() && !config.persist).then(|| dom.deep_clone(node));
        let display = dom.style(node, "display");
        entries.push(ContentEntry {
            node,
            origin,
            original,
            display,
        });
    }

    for entry in &entries {
        dom.add_class(entry.node, DATA_CLASS);
        dom.apply_styles(entry.node, &config.data_css);
    }
    entries
}

fn next_foreign_sibling<D: Dom + ?Sized>(dom: &D, node: NodeId, content: &[NodeId]) -> Option<NodeId> {
    let mut sibling = dom.next_sibling(node);
    while let Some(candidate) = sibling {
        if !content.contains(&candidate) {
            return Some(candidate);
        }
        sibling = dom.next_sibling(candidate);
    }
    None
}
