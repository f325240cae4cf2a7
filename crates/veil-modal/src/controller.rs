//! The modal controller.
//!
//! # Invariants
//!
//! - At most one dialog is active. `open` while active returns `Ok(None)`
//!   and touches nothing.
//! - `open` either fails before any DOM mutation or completes every step.
//! - Every `close` on an active dialog drops the controller's listeners,
//!   whichever teardown path it takes.
//! - A delegated close hook fires at most once per dialog.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unsupported data | boolean, null, object, empty selection | `Err(ModalError)`, logged, DOM untouched |
//! | Overlapping open | dialog already active | `Ok(None)` |
//! | Close with nothing open | no active dialog | `None` |
//! | Stale event | listener already dropped | ignored, `None` |

use tracing::{debug, warn};
use veil_core::ModalConfig;
use veil_dom::{Dom, DomEvent};

use crate::data::IntoModalData;
use crate::dialog::{DialogHandle, DialogState};
use crate::error::ModalError;
use crate::events::{self, CloseOutcome, ModalAction};
use crate::hooks::{CloseBehavior, CloseFlow, Hook, ModalOptions, OpenBehavior};
use crate::layout;

struct ActiveDialog<D> {
    state: DialogState,
    open: OpenBehavior<D>,
    show: Option<Hook<D>>,
    close: CloseBehavior<D>,
    close_fired: bool,
}

/// Owner of the single active dialog on a host document.
///
/// The controller does not hold the document; every operation borrows it,
/// so one host can be shared with the rest of the application.
pub struct ModalController<D: Dom> {
    defaults: ModalConfig,
    active: Option<ActiveDialog<D>>,
}

impl<D: Dom> Default for ModalController<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Dom> std::fmt::Debug for ModalController<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalController")
            .field("defaults", &self.defaults)
            .field("active", &self.active.as_ref().map(|a| a.state.id()))
            .finish()
    }
}

impl<D: Dom> ModalController<D> {
    /// Controller using the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::with_defaults(ModalConfig::default())
    }

    /// Controller whose dialogs start from `defaults` before per-dialog
    /// overrides are applied.
    #[must_use]
    pub fn with_defaults(defaults: ModalConfig) -> Self {
        Self {
            defaults,
            active: None,
        }
    }

    #[must_use]
    pub fn defaults(&self) -> &ModalConfig {
        &self.defaults
    }

    /// Replace the base config used by later dialogs.
    pub fn set_defaults(&mut self, defaults: ModalConfig) {
        self.defaults = defaults;
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// State of the active dialog.
    #[must_use]
    pub fn dialog(&self) -> Option<&DialogState> {
        self.active.as_ref().map(|active| &active.state)
    }

    /// Open a dialog showing `data`.
    ///
    /// Returns `Ok(None)` without side effects when a dialog is already
    /// active, and `Err` without side effects when `data` has an
    /// unsupported shape.
    pub fn open(
        &mut self,
        dom: &mut D,
        data: impl IntoModalData,
        options: ModalOptions<D>,
    ) -> Result<Option<DialogHandle>, ModalError> {
        if let Some(active) = &self.active {
            debug!(active = active.state.id().id(), "modal already open, ignoring open");
            return Ok(None);
        }

        let data = data.into_modal_data().inspect_err(|err| {
            warn!(error = %err, "modal open rejected");
        })?;

        let ModalOptions {
            overrides,
            open,
            show,
            close,
        } = options;
        let config = self.defaults.merged(&overrides);

        let state = DialogState::build(dom, data, config);
        layout::place_container(dom, &state);
        if state.caps().needs_fixed_emulation() {
            debug!(caps = ?state.caps(), "emulating fixed positioning");
            layout::emulate_fixed(dom, &state);
        }
        state.attach_content(dom);

        let mut active = ActiveDialog {
            state,
            open,
            show,
            close,
            close_fired: false,
        };

        // Open phase.
        if let Some(frame) = active.state.blocking_frame() {
            dom.show(frame);
        }
        match &mut active.open {
            OpenBehavior::Reveal => active.state.reveal(dom),
            OpenBehavior::Delegate(hook) => hook(&active.state, dom),
        }
        events::bind(dom, active.state.config());

        if let Some(hook) = active.show.as_mut() {
            hook(&active.state, dom);
        }

        let handle = active.state.handle();
        debug!(
            dialog = handle.id.id(),
            content = active.state.content().len(),
            "modal opened"
        );
        self.active = Some(active);
        Ok(Some(handle))
    }

    /// Close the active dialog.
    ///
    /// Returns `None` when nothing is open.
    pub fn close(&mut self, dom: &mut D) -> Option<CloseOutcome> {
        let active = self.active.as_mut()?;
        let id = active.state.id().id();

        let outcome = match &mut active.close {
            CloseBehavior::Delegate(hook) if !active.close_fired => {
                active.close_fired = true;
                match hook(&active.state, dom) {
                    CloseFlow::Complete => CloseOutcome::Delegated,
                    CloseFlow::Pending => CloseOutcome::Pending,
                }
            }
            _ => {
                active.state.dismantle(dom);
                CloseOutcome::Restored
            }
        };
        events::unbind(dom);

        if outcome != CloseOutcome::Pending {
            self.active = None;
        }
        debug!(dialog = id, ?outcome, "modal closed");
        Some(outcome)
    }

    /// Re-center the active dialog, for example after its content changed
    /// size.
    pub fn reposition(&self, dom: &mut D) {
        if let Some(active) = &self.active {
            layout::place_container(dom, &active.state);
        }
    }

    /// Route a host event to the dialog.
    ///
    /// Only events matching a listener the controller registered have an
    /// effect.
    pub fn handle_event(&mut self, dom: &mut D, event: &DomEvent) -> Option<ModalAction> {
        match *event {
            DomEvent::Click { target } => {
                if self.active.is_none() {
                    return None;
                }
                events::close_trigger(dom, target)?;
                self.close(dom).map(ModalAction::Closed)
            }
            DomEvent::Resize => {
                let active = self.active.as_ref()?;
                if !events::listening_for_resize(dom) {
                    return None;
                }
                layout::follow_resize(dom, &active.state);
                debug!(dialog = active.state.id().id(), "modal repositioned");
                Some(ModalAction::Repositioned)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;
    use veil_core::{ConfigOverrides, PositionOverride, RuntimeCaps, Size, StyleRules};
    use veil_dom::{EventKind, EventTarget, MemoryDom, NodeId};

    use crate::events::NAMESPACE;

    fn sized(width: &str, height: &str) -> ConfigOverrides {
        ConfigOverrides::new().container_css(
            StyleRules::new()
                .with("width", width)
                .with("height", height),
        )
    }

    #[test]
    fn open_builds_fragments_in_order() {
        let mut dom = MemoryDom::new();
        let mut modal = ModalController::new();
        let handle = modal
            .open(&mut dom, "hello", ModalOptions::new())
            .unwrap()
            .expect("opened");

        let body = dom.children(dom.body());
        assert_eq!(body.len(), 3);
        assert_eq!(dom.tag(body[0]), Some("iframe"));
        assert_eq!(body[1], handle.overlay);
        assert_eq!(body[2], handle.container);

        let dialog = modal.dialog().expect("active");
        assert_eq!(dom.style(body[0], "z-index").as_deref(), Some("1000"));
        assert_eq!(dom.style(handle.overlay, "z-index").as_deref(), Some("1001"));
        assert_eq!(dom.style(handle.container, "z-index").as_deref(), Some("1002"));
        assert_eq!(dom.style(handle.overlay, "opacity").as_deref(), Some("0.5"));
        assert_eq!(dom.attribute(handle.overlay, "id").as_deref(), Some("veil-overlay"));

        // Close control first, then content.
        let inside = dom.children(handle.container);
        assert_eq!(inside.len(), 2);
        assert_eq!(inside[0], dialog.close_controls()[0]);
        assert!(dom.has_class(inside[0], "veil-close"));
        assert_eq!(inside[1], dialog.content()[0].node);
        assert!(dom.has_class(inside[1], "veil-data"));
        assert_eq!(dom.text_content(inside[1]), "hello");
    }

    #[test]
    fn default_open_reveals_everything() {
        let mut dom = MemoryDom::new();
        let mut modal = ModalController::new();
        modal.open(&mut dom, 42_i32, ModalOptions::new()).unwrap();
        let dialog = modal.dialog().expect("active");

        assert!(!dom.is_hidden(dialog.blocking_frame().expect("frame")));
        assert!(!dom.is_hidden(dialog.overlay()));
        assert!(!dom.is_hidden(dialog.container()));
        assert!(!dom.is_hidden(dialog.content()[0].node));
    }

    #[test]
    fn frame_can_be_disabled_unless_runtime_requires_it() {
        let no_frame = || ConfigOverrides::new().blocking_frame(false);

        let mut dom = MemoryDom::new();
        let mut modal = ModalController::new();
        modal
            .open(&mut dom, "x", ModalOptions::new().overrides(no_frame()))
            .unwrap();
        assert!(modal.dialog().expect("active").blocking_frame().is_none());
        modal.close(&mut dom);

        let legacy = RuntimeCaps::STANDARD_BOX_MODEL | RuntimeCaps::WINDOWED_CONTROLS;
        let mut dom = MemoryDom::new().runtime_caps(legacy);
        modal
            .open(&mut dom, "x", ModalOptions::new().overrides(no_frame()))
            .unwrap();
        assert!(modal.dialog().expect("active").blocking_frame().is_some());
    }

    #[test]
    fn container_is_centered_before_content_is_added() {
        let mut dom = MemoryDom::new().viewport_size(Size::new(1000.0, 800.0));
        let mut modal = ModalController::new();
        let handle = modal
            .open(
                &mut dom,
                "x",
                ModalOptions::new().overrides(sized("400px", "200px")),
            )
            .unwrap()
            .expect("opened");
        assert_eq!(dom.style(handle.container, "left").as_deref(), Some("300px"));
        assert_eq!(dom.style(handle.container, "top").as_deref(), Some("300px"));
    }

    #[test]
    fn pinned_position_is_exact() {
        let mut dom = MemoryDom::new();
        let mut modal = ModalController::new();
        let overrides = sized("400px", "200px").position(PositionOverride::new(25.0, 60.0));
        let handle = modal
            .open(&mut dom, "x", ModalOptions::new().overrides(overrides))
            .unwrap()
            .expect("opened");
        assert_eq!(dom.style(handle.container, "left").as_deref(), Some("25px"));
        assert_eq!(dom.style(handle.container, "top").as_deref(), Some("60px"));
    }

    #[test]
    fn user_styles_cannot_override_forced_layout() {
        let mut dom = MemoryDom::new();
        let mut modal = ModalController::new();
        let overrides = ConfigOverrides::new().overlay_css(
            StyleRules::new()
                .with("position", "static")
                .with("background-color", "#000"),
        );
        let handle = modal
            .open(&mut dom, "x", ModalOptions::new().overrides(overrides))
            .unwrap()
            .expect("opened");
        assert_eq!(dom.style(handle.overlay, "position").as_deref(), Some("fixed"));
        assert_eq!(
            dom.style(handle.overlay, "background-color").as_deref(),
            Some("#000")
        );
    }

    #[test]
    fn legacy_runtime_gets_expression_layout() {
        let ie6 = RuntimeCaps::STANDARD_BOX_MODEL | RuntimeCaps::WINDOWED_CONTROLS;
        let mut dom = MemoryDom::new().runtime_caps(ie6);
        let mut modal = ModalController::new();
        modal.open(&mut dom, "x", ModalOptions::new()).unwrap();
        let dialog = modal.dialog().expect("active");

        for layer in [dialog.blocking_frame().expect("frame"), dialog.overlay()] {
            assert_eq!(dom.style(layer, "position").as_deref(), Some("absolute"));
            let height = dom.style(layer, "height").unwrap_or_default();
            assert!(height.starts_with("expression("), "{height}");
        }
        let top = dom.style(dialog.container(), "top").unwrap_or_default();
        assert!(top.contains("scrollTop"), "{top}");
        assert_eq!(
            dom.style(dialog.container(), "position").as_deref(),
            Some("absolute")
        );
    }

    #[test]
    fn resize_recenters_and_stretches_layers() {
        let mut dom = MemoryDom::new().viewport_size(Size::new(800.0, 600.0));
        let mut modal = ModalController::new();
        let handle = modal
            .open(
                &mut dom,
                "x",
                ModalOptions::new().overrides(sized("200px", "100px")),
            )
            .unwrap()
            .expect("opened");
        assert_eq!(dom.style(handle.container, "left").as_deref(), Some("300px"));

        dom.set_viewport(Size::new(1200.0, 900.0));
        let action = modal.handle_event(&mut dom, &DomEvent::Resize);
        assert_eq!(action, Some(ModalAction::Repositioned));
        assert_eq!(dom.style(handle.container, "left").as_deref(), Some("500px"));
        assert_eq!(dom.style(handle.container, "top").as_deref(), Some("400px"));
        assert_eq!(dom.style(handle.overlay, "width").as_deref(), Some("1200px"));
        assert_eq!(dom.style(handle.overlay, "height").as_deref(), Some("900px"));
    }

    #[test]
    fn click_inside_close_control_bubbles_to_it() {
        let mut dom = MemoryDom::new();
        let mut modal = ModalController::new();
        let overrides = ConfigOverrides::new().close_markup(r##"<a href="#"><span>×</span></a>"##);
        modal
            .open(&mut dom, "x", ModalOptions::new().overrides(overrides))
            .unwrap();
        let link = modal.dialog().expect("active").close_controls()[0];
        let icon = dom.children(link)[0];

        let action = modal.handle_event(&mut dom, &DomEvent::Click { target: icon });
        assert_eq!(action, Some(ModalAction::Closed(CloseOutcome::Restored)));
        assert!(!modal.is_open());
    }

    #[test]
    fn click_elsewhere_is_ignored() {
        let mut dom = MemoryDom::with_body(r#"<p id="p">page</p>"#);
        let page = dom.element_by_id("p").expect("p");
        let mut modal = ModalController::new();
        modal.open(&mut dom, "x", ModalOptions::new()).unwrap();
        assert_eq!(
            modal.handle_event(&mut dom, &DomEvent::Click { target: page }),
            None
        );
        assert!(modal.is_open());
    }

    #[test]
    fn close_unbinds_only_own_namespace() {
        let mut dom = MemoryDom::new();
        dom.listen("app", EventTarget::Window, EventKind::Resize);
        let mut modal = ModalController::new();
        modal.open(&mut dom, "x", ModalOptions::new()).unwrap();
        assert!(dom.listener_count(NAMESPACE) >= 2);

        modal.close(&mut dom);
        assert_eq!(dom.listener_count(NAMESPACE), 0);
        assert!(dom.is_listening("app", EventTarget::Window, EventKind::Resize));
    }

    #[test]
    fn close_without_dialog_is_noop() {
        let mut dom = MemoryDom::with_body("<p>x</p>");
        let mut modal: ModalController<MemoryDom> = ModalController::new();
        assert_eq!(modal.close(&mut dom), None);
        assert_eq!(dom.body_html(), "<p>x</p>");
    }

    #[test]
    fn controller_defaults_apply_to_every_dialog() {
        let defaults = ModalConfig {
            z_index: 5000,
            blocking_frame: false,
            ..ModalConfig::default()
        };
        let mut dom = MemoryDom::new();
        let mut modal = ModalController::with_defaults(defaults);
        let handle = modal
            .open(&mut dom, "x", ModalOptions::new())
            .unwrap()
            .expect("opened");
        assert_eq!(dom.style(handle.overlay, "z-index").as_deref(), Some("5001"));
        assert!(modal.dialog().expect("active").blocking_frame().is_none());
    }

    #[traced_test]
    #[test]
    fn unsupported_data_is_logged() {
        let mut dom = MemoryDom::new();
        let mut modal = ModalController::new();
        let err = modal
            .open(&mut dom, Vec::<NodeId>::new(), ModalOptions::new())
            .unwrap_err();
        assert_eq!(err, ModalError::UnsupportedData { kind: "empty selection" });
        assert!(logs_contain("modal open rejected"));
        assert!(logs_contain("Unsupported data type: empty selection"));
    }

    #[traced_test]
    #[test]
    fn overlapping_open_is_logged_at_debug() {
        let mut dom = MemoryDom::new();
        let mut modal = ModalController::new();
        modal.open(&mut dom, "first", ModalOptions::new()).unwrap();
        assert_eq!(modal.open(&mut dom, "second", ModalOptions::new()), Ok(None));
        assert!(logs_contain("modal already open"));
    }
}
