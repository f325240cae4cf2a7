#![forbid(unsafe_code)]

//! Modal dialog overlay controller.
//!
//! A [`ModalController`] shows one dialog at a time on top of a dimmed
//! backdrop. Opening a dialog builds up to three fragments on the page body
//! (blocking frame, backdrop, container), moves or creates the content
//! inside the container, and wires close-trigger clicks and window resizes.
//! Closing reverses all of it: page content goes back where it came from
//! (or is replaced by an untouched copy), fragments are removed, and
//! listeners are dropped.
//!
//! # Example
//!
//! ```
//! use veil_dom::{Dom, MemoryDom};
//! use veil_modal::{ModalController, ModalOptions};
//!
//! let mut dom = MemoryDom::with_body(r#"<div id="terms">Terms</div>"#);
//! let before = dom.body_html();
//! let terms = dom.element_by_id("terms").unwrap();
//!
//! let mut modal = ModalController::new();
//! let handle = modal.open(&mut dom, terms, ModalOptions::new()).unwrap();
//! assert!(handle.is_some());
//! assert!(modal.is_open());
//!
//! modal.close(&mut dom);
//! assert_eq!(dom.body_html(), before);
//! ```

mod controller;
mod data;
mod dialog;
mod error;
mod events;
mod hooks;
mod layout;

pub use controller::ModalController;
pub use data::{IntoModalData, ModalData};
pub use dialog::{ContentEntry, DialogHandle, DialogId, DialogState, Origin};
pub use error::ModalError;
pub use events::{CloseOutcome, ModalAction, NAMESPACE};
pub use hooks::{CloseBehavior, CloseFlow, CloseHook, Hook, ModalOptions, OpenBehavior};
