//! Page-wide modal controller.
//!
//! One controller and one [`WebDom`] per page, created on first use and
//! kept in a thread-local. Listener callbacks call [`pump`]; when the
//! controller is busy (a hook is running) the events stay queued and are
//! drained when the current operation returns.

use std::cell::RefCell;

use js_sys::{Array, Function, Object, Reflect};
use tracing::{debug, warn};
use veil_core::{ConfigOverrides, ModalConfig};
use veil_dom::{Dom, EventKind, EventTarget, NodeId};
use veil_modal::{
    CloseFlow, CloseOutcome, DialogHandle, DialogState, IntoModalData, ModalController,
    ModalOptions, NAMESPACE,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom::WebDom;
use crate::error::WebError;

struct Session {
    dom: WebDom,
    controller: ModalController<WebDom>,
}

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
}

/// Run `f` with the page controller, attaching to the document first if
/// needed. Queued events are drained before returning.
///
/// Fails with [`WebError::Busy`] when called from inside a hook.
pub fn with_controller<R>(
    f: impl FnOnce(&mut ModalController<WebDom>, &mut WebDom) -> R,
) -> Result<R, WebError> {
    let result = SESSION.with(|slot| {
        let mut slot = slot.try_borrow_mut().map_err(|_| WebError::Busy)?;
        if slot.is_none() {
            *slot = Some(Session {
                dom: WebDom::new().ok_or(WebError::NoDocument)?,
                controller: ModalController::new(),
            });
        }
        let session = slot.as_mut().ok_or(WebError::NoDocument)?;
        Ok(f(&mut session.controller, &mut session.dom))
    });
    pump();
    result
}

/// Open a dialog on the page.
pub fn open(
    data: impl IntoModalData,
    options: ModalOptions<WebDom>,
) -> Result<Option<DialogHandle>, WebError> {
    with_controller(|controller, dom| controller.open(dom, data, options))?.map_err(WebError::from)
}

/// Close the page dialog, if any. `Ok(None)` when nothing was open.
///
/// Fails with [`WebError::Busy`] when called from inside a hook; the dialog
/// is left as it was.
pub fn close() -> Result<Option<CloseOutcome>, WebError> {
    with_controller(|controller, dom| controller.close(dom))
        .inspect_err(|err| warn!(error = %err, "modal close rejected"))
}

#[must_use]
pub fn is_open() -> bool {
    SESSION.with(|slot| {
        slot.try_borrow()
            .ok()
            .and_then(|slot| slot.as_ref().map(|session| session.controller.is_open()))
            .unwrap_or(false)
    })
}

/// Replace the config every later dialog starts from.
pub fn set_defaults(defaults: ModalConfig) -> Result<(), WebError> {
    with_controller(|controller, _| controller.set_defaults(defaults))
}

/// Deliver queued listener events to the controller. Returns how many were
/// handled; `0` when the controller is busy or not yet created.
pub fn pump() -> usize {
    SESSION.with(|slot| {
        let Ok(mut slot) = slot.try_borrow_mut() else {
            return 0;
        };
        let Some(session) = slot.as_mut() else {
            return 0;
        };
        let mut handled = 0;
        while session.dom.has_pending_events() {
            for event in session.dom.take_events() {
                if session
                    .controller
                    .handle_event(&mut session.dom, &event)
                    .is_some()
                {
                    handled += 1;
                }
            }
        }
        if handled > 0 {
            debug!(handled, "pumped modal events");
        }
        handled
    })
}

/// Option keys holding script callbacks rather than configuration.
const HOOK_KEYS: [&str; 3] = ["onOpen", "onShow", "onClose"];

/// Script entry point: `openModal(data, options?)`.
///
/// `options` is a plain object with the same keys as the TOML/JSON config,
/// in snake_case or camelCase (`overlayCss`, `zIndex`, `closeHTML`, ...).
/// `onOpen`, `onShow` and `onClose` are called with
/// `{ overlay, container, frame, data }`, where `data` is an array of the
/// content nodes. A truthy return from `onClose` leaves the dialog open
/// until the next `closeModal()`. Resolves to `false` when a dialog is
/// already open.
#[wasm_bindgen(js_name = openModal)]
pub fn open_modal(data: JsValue, options: JsValue) -> Result<bool, JsValue> {
    let options = script_options(&options)?;

    let opened = with_controller(|controller, dom| {
        let data = dom.modal_data(&data).inspect_err(|err| {
            warn!(error = %err, "modal open rejected");
        })?;
        controller.open(dom, data, options)
    })?
    .map_err(WebError::from)?;
    Ok(opened.is_some())
}

/// Script entry point: `closeModal()`. Resolves to `true` when a dialog was
/// open. Throws when called from inside a hook.
#[wasm_bindgen(js_name = closeModal)]
pub fn close_modal() -> Result<bool, JsValue> {
    Ok(close()?.is_some())
}

/// Split a script options object into config overrides and hooks.
fn script_options(options: &JsValue) -> Result<ModalOptions<WebDom>, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(ModalOptions::new());
    }
    let Some(source) = options.dyn_ref::<Object>() else {
        return Err(js_sys::TypeError::new("modal options must be an object").into());
    };

    let [on_open, on_show, on_close] = HOOK_KEYS.map(|key| script_hook(source, key));
    let (on_open, on_show, on_close) = (on_open?, on_show?, on_close?);

    // Shallow copy so the caller's object keeps its callbacks.
    let config = Object::assign(&Object::new(), source);
    for key in HOOK_KEYS {
        Reflect::delete_property(&config, &JsValue::from_str(key))?;
    }
    let json: String = js_sys::JSON::stringify(&config)?.into();
    let overrides = ConfigOverrides::from_json_str(&json).map_err(WebError::from)?;

    let mut out = ModalOptions::new().overrides(overrides);
    if let Some(hook) = on_open {
        out = out.on_open(move |dialog, dom: &mut WebDom| {
            call_hook(&hook, "onOpen", dialog, dom);
        });
    }
    if let Some(hook) = on_show {
        out = out.on_show(move |dialog, dom: &mut WebDom| {
            call_hook(&hook, "onShow", dialog, dom);
        });
    }
    if let Some(hook) = on_close {
        out = out.on_close(move |dialog, dom: &mut WebDom| {
            match call_hook(&hook, "onClose", dialog, dom) {
                Some(result) if result.is_truthy() => CloseFlow::Pending,
                Some(_) => CloseFlow::Complete,
                None => {
                    // A throwing hook must not strand the fragments on the page.
                    dialog.dismantle(dom);
                    CloseFlow::Complete
                }
            }
        });
    }
    Ok(out)
}

fn script_hook(options: &Object, key: &str) -> Result<Option<Function>, JsValue> {
    let value = Reflect::get(options, &JsValue::from_str(key))?;
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    value
        .dyn_into::<Function>()
        .map(Some)
        .map_err(|_| js_sys::TypeError::new(&format!("{key} must be a function")).into())
}

/// Call a script hook with the dialog's nodes. `None` when it threw.
fn call_hook(
    hook: &Function,
    name: &'static str,
    dialog: &DialogState,
    dom: &WebDom,
) -> Option<JsValue> {
    hook.call1(&JsValue::NULL, &dialog_value(dialog, dom))
        .inspect_err(|err| warn!(?err, hook = name, "modal hook threw"))
        .ok()
}

/// `{ overlay, container, frame, data }` for script hooks.
fn dialog_value(dialog: &DialogState, dom: &WebDom) -> JsValue {
    let node = |id: NodeId| dom.node(id).map_or(JsValue::NULL, JsValue::from);
    let data: Array = dialog
        .content()
        .iter()
        .filter_map(|entry| dom.node(entry.node))
        .collect();

    let value = Object::new();
    let fields = [
        ("overlay", node(dialog.overlay())),
        ("container", node(dialog.container())),
        ("frame", dialog.blocking_frame().map_or(JsValue::NULL, node)),
        ("data", data.into()),
    ];
    for (key, field) in fields {
        if let Err(err) = Reflect::set(&value, &JsValue::from_str(key), &field) {
            debug!(?err, key, "building hook argument failed");
        }
    }
    value.into()
}

/// Whether the page controller currently follows window resizes.
#[must_use]
pub fn listening_for_resize() -> bool {
    SESSION.with(|slot| {
        slot.try_borrow().ok().is_some_and(|slot| {
            slot.as_ref().is_some_and(|session| {
                session
                    .dom
                    .is_listening(NAMESPACE, EventTarget::Window, EventKind::Resize)
            })
        })
    })
}
