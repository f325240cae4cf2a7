#![forbid(unsafe_code)]

//! Browser host for veil.
//!
//! [`WebDom`] implements [`veil_dom::Dom`] over the live document through
//! `web-sys`. Listener callbacks queue [`veil_dom::DomEvent`]s; the
//! page-wide controller in this crate drains the queue whenever it is not
//! already busy, so a click on a close control closes the dialog without
//! the page wiring anything itself.
//!
//! Script callers use the exported `openModal(data, options)` and
//! `closeModal()`. Rust callers use [`open`], [`close`], and friends.
//!
//! Everything except runtime detection is only built for `wasm32`.

mod detect;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod error;
#[cfg(target_arch = "wasm32")]
mod global;

pub use detect::{QUIRKS_COMPAT_MODE, detect_caps};

#[cfg(target_arch = "wasm32")]
pub use dom::WebDom;
#[cfg(target_arch = "wasm32")]
pub use error::WebError;
#[cfg(target_arch = "wasm32")]
pub use global::{
    close, close_modal, is_open, listening_for_resize, open, open_modal, pump, set_defaults,
    with_controller,
};
