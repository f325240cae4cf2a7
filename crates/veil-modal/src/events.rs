//! Listener wiring for an open dialog.
//!
//! All listeners go under [`NAMESPACE`] so the whole group is dropped with
//! one `unlisten_all`, leaving listeners of other namespaces on the same
//! elements and window alone.

use veil_core::ModalConfig;
use veil_dom::{Dom, EventKind, EventTarget, NodeId};

/// Listener namespace owned by the controller.
pub const NAMESPACE: &str = "veil";

/// What `handle_event` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    /// A close trigger was clicked and `close` ran.
    Closed(CloseOutcome),
    /// The viewport changed and the dialog was re-laid out.
    Repositioned,
}

/// Which teardown path a `close` call took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Default teardown ran; the dialog is gone.
    Restored,
    /// The close hook completed teardown; the dialog is gone.
    Delegated,
    /// The close hook deferred teardown; the dialog is still active.
    Pending,
}

pub(crate) fn bind<D: Dom + ?Sized>(dom: &mut D, config: &ModalConfig) {
    let triggers = dom.elements_with_class(&config.close_class);
    tracing::trace!(count = triggers.len(), class = %config.close_class, "binding close triggers");
    for trigger in triggers {
        dom.listen(NAMESPACE, EventTarget::Node(trigger), EventKind::Click);
    }
    dom.listen(NAMESPACE, EventTarget::Window, EventKind::Resize);
}

pub(crate) fn unbind<D: Dom + ?Sized>(dom: &mut D) {
    dom.unlisten_all(NAMESPACE);
}

/// The bound close trigger a click on `target` reaches, walking up from
/// the innermost element the way the click bubbles.
pub(crate) fn close_trigger<D: Dom + ?Sized>(dom: &D, target: NodeId) -> Option<NodeId> {
    let mut current = Some(target);
    while let Some(node) = current {
        if dom.is_listening(NAMESPACE, EventTarget::Node(node), EventKind::Click) {
            return Some(node);
        }
        current = dom.parent(node);
    }
    None
}

pub(crate) fn listening_for_resize<D: Dom + ?Sized>(dom: &D) -> bool {
    dom.is_listening(NAMESPACE, EventTarget::Window, EventKind::Resize)
}
