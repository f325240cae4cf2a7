#![forbid(unsafe_code)]
#![cfg(target_arch = "wasm32")]

//! Browser lifecycle against a real document.
//!
//! Run: `wasm-pack test --headless --firefox crates/veil-web`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Object, Reflect};
use veil_core::ConfigOverrides;
use veil_core::geometry::parse_px;
use veil_dom::{Dom, DomEvent};
use veil_modal::{CloseOutcome, ModalAction, ModalController, ModalOptions};
use veil_web::{WebDom, WebError};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

// =============================================================================
// Test Utilities
// =============================================================================

fn fixture(markup: &str) -> web_sys::Element {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .expect("document");
    let host = document.create_element("div").expect("div");
    host.set_inner_html(markup);
    document.body().expect("body").append_child(&host).expect("attach");
    host
}

type ScriptHook = Closure<dyn FnMut(JsValue) -> JsValue>;

fn document() -> web_sys::Document {
    web_sys::window()
        .and_then(|w| w.document())
        .expect("document")
}

/// Options object carrying one script hook plus plain config keys.
fn script_options(hook_key: &str, hook: &ScriptHook, config: &[(&str, JsValue)]) -> JsValue {
    let options = Object::new();
    Reflect::set(&options, &JsValue::from_str(hook_key), hook.as_ref()).expect("set hook");
    for (key, value) in config {
        Reflect::set(&options, &JsValue::from_str(key), value).expect("set key");
    }
    options.into()
}

fn field(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).expect("field")
}

fn inline_style(element: &JsValue, property: &str) -> String {
    element.dyn_ref::<web_sys::HtmlElement>()
        .expect("html element")
        .style()
        .get_property_value(property)
        .expect("style")
}

// =============================================================================
// Host
// =============================================================================

#[wasm_bindgen_test]
fn handles_are_stable() {
    let host = fixture("<p>one</p>");
    let dom = WebDom::new().expect("host");
    let a = dom.handle(&host);
    let b = dom.handle(&host);
    assert_eq!(a, b);
    host.remove();
}

#[wasm_bindgen_test]
fn removed_handle_stays_dead_after_its_slot_is_reused() {
    let mut dom = WebDom::new().expect("host");
    let gone = dom.create_element("div");
    dom.remove(gone);
    let next = dom.create_element("span");

    assert_ne!(gone, next);
    assert!(dom.node(gone).is_none());
    assert_eq!(dom.node(next).map(|n| n.node_name()).as_deref(), Some("SPAN"));
}

#[wasm_bindgen_test]
fn repeated_dialogs_do_not_grow_the_handle_table() {
    let mut dom = WebDom::new().expect("host");
    let mut modal = ModalController::new();
    let mut cycle = |dom: &mut WebDom| {
        modal.open(dom, "<p>again</p>", ModalOptions::new()).expect("open");
        modal.close(dom);
        dom.tracked_nodes()
    };

    let settled = cycle(&mut dom);
    for _ in 0..5 {
        assert_eq!(cycle(&mut dom), settled);
    }
}

#[wasm_bindgen_test]
fn stylesheet_sized_hidden_element_is_measured() {
    let host = fixture(
        r#"<style>#veil-sized { width: 320px; height: 90px; }</style><div id="veil-sized" style="display: none;"></div>"#,
    );
    let dom = WebDom::new().expect("host");
    let sized = dom.handle(&host.last_element_child().expect("sized"));

    let size = dom.measure(sized);
    assert_eq!((size.width, size.height), (320.0, 90.0));
    assert_eq!(dom.style(sized, "display").as_deref(), Some("none"));
    assert_eq!(dom.style(sized, "visibility"), None);
    host.remove();
}

#[wasm_bindgen_test]
fn script_values_map_to_content() {
    let dom = WebDom::new().expect("host");
    assert!(dom.modal_data(&JsValue::from_str("<b>x</b>")).is_ok());
    assert!(dom.modal_data(&JsValue::from_f64(4.0)).is_ok());
    let err = dom.modal_data(&JsValue::TRUE).unwrap_err();
    assert_eq!(err.to_string(), "Unsupported data type: boolean");
    let err = dom.modal_data(&JsValue::UNDEFINED).unwrap_err();
    assert_eq!(err.to_string(), "Unsupported data type: undefined");
}

// =============================================================================
// Lifecycle
// =============================================================================

#[wasm_bindgen_test]
fn page_content_round_trips() {
    let host = fixture(r#"<div id="veil-terms">Terms</div><p>after</p>"#);
    let before = host.inner_html();
    let mut dom = WebDom::new().expect("host");
    let terms = dom.handle(&host.first_element_child().expect("terms"));

    let mut modal = ModalController::new();
    modal.open(&mut dom, terms, ModalOptions::new()).expect("open");
    assert!(modal.is_open());
    modal.close(&mut dom);

    assert_eq!(host.inner_html(), before);
    host.remove();
}

#[wasm_bindgen_test]
fn stylesheet_sized_container_is_centered() {
    let style = fixture("<style>#veil-container { width: 400px; height: 200px; }</style>");
    let mut dom = WebDom::new().expect("host");
    let mut modal = ModalController::new();
    let options = ModalOptions::new().overrides(ConfigOverrides::new().close(false));
    let handle = modal
        .open(&mut dom, "centered", options)
        .expect("open")
        .expect("opened");

    let viewport = dom.viewport();
    let offset = |property: &str| {
        dom.style(handle.container, property)
            .and_then(|value| parse_px(&value))
            .expect("placed")
    };
    assert_eq!(offset("left"), viewport.width / 2.0 - 200.0);
    assert_eq!(offset("top"), viewport.height / 2.0 - 100.0);
    assert_eq!(dom.style(handle.container, "visibility"), None);

    modal.close(&mut dom);
    style.remove();
}

#[wasm_bindgen_test]
fn close_control_click_is_queued_and_handled() {
    let mut dom = WebDom::new().expect("host");
    let mut modal = ModalController::new();
    modal.open(&mut dom, "hello", ModalOptions::new()).expect("open");
    let control = modal.dialog().expect("active").close_controls()[0];

    let element = dom
        .node(control)
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .expect("control element");
    element.click();

    let events = dom.take_events();
    assert_eq!(events, vec![DomEvent::Click { target: control }]);
    assert_eq!(
        modal.handle_event(&mut dom, &events[0]),
        Some(ModalAction::Closed(CloseOutcome::Restored))
    );
    assert!(!dom.is_listening(
        veil_modal::NAMESPACE,
        veil_dom::EventTarget::Window,
        veil_dom::EventKind::Resize
    ));
}

#[wasm_bindgen_test]
fn page_controller_closes_itself_on_click() {
    assert_eq!(veil_web::open_modal(JsValue::from_str("hi"), JsValue::UNDEFINED), Ok(true));
    assert!(veil_web::is_open());
    assert!(veil_web::listening_for_resize());

    let document = web_sys::window()
        .and_then(|w| w.document())
        .expect("document");
    let control = document
        .get_elements_by_class_name("veil-close")
        .item(0)
        .and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok())
        .expect("close control");
    control.click();

    assert!(!veil_web::is_open());
    assert!(!veil_web::listening_for_resize());
    assert_eq!(veil_web::close_modal(), Ok(false));
}

// =============================================================================
// Script Hooks
// =============================================================================

#[wasm_bindgen_test]
fn on_open_hook_reveals_in_place_of_the_default() {
    let seen = Rc::new(RefCell::new(None));
    let hook: ScriptHook = Closure::new({
        let seen = Rc::clone(&seen);
        move |dialog: JsValue| {
            let overlay = field(&dialog, "overlay");
            *seen.borrow_mut() = Some(inline_style(&overlay, "display"));
            JsValue::UNDEFINED
        }
    });

    let options = script_options("onOpen", &hook, &[("zIndex", JsValue::from_f64(3000.0))]);
    assert_eq!(veil_web::open_modal(JsValue::from_str("hi"), options), Ok(true));

    // The hook ran before anything was shown.
    assert_eq!(seen.borrow().as_deref(), Some("none"));
    let container = document().get_element_by_id("veil-container").expect("container");
    assert_eq!(inline_style(&container.into(), "z-index"), "3002");
    assert_eq!(veil_web::close_modal(), Ok(true));
}

#[wasm_bindgen_test]
fn on_show_hook_sees_content_and_cannot_reenter() {
    let seen = Rc::new(RefCell::new(None));
    let hook: ScriptHook = Closure::new({
        let seen = Rc::clone(&seen);
        move |dialog: JsValue| {
            let data = js_sys::Array::from(&field(&dialog, "data"));
            let first = data
                .get(0)
                .dyn_into::<web_sys::Node>()
                .ok()
                .and_then(|node| node.text_content());
            *seen.borrow_mut() = Some((data.length(), first, veil_web::close()));
            JsValue::UNDEFINED
        }
    });

    let options = script_options("onShow", &hook, &[]);
    assert_eq!(veil_web::open_modal(JsValue::from_str("hello"), options), Ok(true));

    let (count, text, reentry) = seen.borrow_mut().take().expect("hook ran");
    assert_eq!(count, 1);
    assert_eq!(text.as_deref(), Some("hello"));
    assert_eq!(reentry, Err(WebError::Busy));
    assert!(veil_web::is_open());
    assert_eq!(veil_web::close_modal(), Ok(true));
}

#[wasm_bindgen_test]
fn truthy_on_close_defers_teardown_to_the_next_close() {
    let calls = Rc::new(Cell::new(0));
    let hook: ScriptHook = Closure::new({
        let calls = Rc::clone(&calls);
        move |_dialog: JsValue| {
            calls.set(calls.get() + 1);
            JsValue::TRUE
        }
    });

    let options = script_options("onClose", &hook, &[]);
    assert_eq!(veil_web::open_modal(JsValue::from_str("bye"), options), Ok(true));

    assert_eq!(veil_web::close_modal(), Ok(true));
    assert!(veil_web::is_open());
    assert_eq!(veil_web::close_modal(), Ok(true));
    assert!(!veil_web::is_open());
    assert_eq!(calls.get(), 1);
    assert!(document().get_element_by_id("veil-container").is_none());
}

#[wasm_bindgen_test]
fn falsy_on_close_leaves_teardown_to_the_hook() {
    let hook: ScriptHook = Closure::new(|dialog: JsValue| {
        for key in ["frame", "overlay", "container"] {
            if let Ok(element) = field(&dialog, key).dyn_into::<web_sys::Element>() {
                element.remove();
            }
        }
        JsValue::UNDEFINED
    });

    let options = script_options("onClose", &hook, &[]);
    assert_eq!(veil_web::open_modal(JsValue::from_str("bye"), options), Ok(true));

    assert_eq!(veil_web::close_modal(), Ok(true));
    assert!(!veil_web::is_open());
    assert!(document().get_element_by_id("veil-overlay").is_none());
    assert!(document().get_element_by_id("veil-container").is_none());
}

#[wasm_bindgen_test]
fn non_function_hook_is_rejected() {
    let options = Object::new();
    Reflect::set(&options, &JsValue::from_str("onShow"), &JsValue::from_str("nope"))
        .expect("set");
    assert!(veil_web::open_modal(JsValue::from_str("x"), options.into()).is_err());
    assert!(!veil_web::is_open());
}
