#![forbid(unsafe_code)]

//! Host document surface for veil.
//!
//! The modal controller manipulates pages only through the [`Dom`] trait.
//! Two hosts implement it:
//!
//! - [`MemoryDom`]: a deterministic in-memory document used by headless
//!   hosts and by tests. It parses and serializes a practical subset of
//!   HTML and records namespaced listeners.
//! - `veil_web::WebDom`: the browser document through `web-sys`.

pub mod event;
pub mod host;
pub mod memory;
pub mod node;

pub use event::{DomEvent, EventKind, EventTarget};
pub use host::Dom;
pub use memory::MemoryDom;
pub use node::NodeId;
