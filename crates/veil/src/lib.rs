#![forbid(unsafe_code)]

//! veil: a single-dialog modal overlay.
//!
//! This crate re-exports the workspace behind one name:
//!
//! | Module | Crate | Contents |
//! |--------|-------|----------|
//! | [`config`], [`caps`], [`geometry`] | `veil-core` | options, runtime capabilities, pixel math |
//! | [`dom`] | `veil-dom` | the host trait and the in-memory document |
//! | [`modal`] | `veil-modal` | the controller, dialog state, hooks |
//! | `web` | `veil-web` | browser host (`web` feature, wasm32) |
//!
//! Most callers only need the [`prelude`].
//!
//! ```
//! use veil::prelude::*;
//!
//! let mut dom = MemoryDom::new();
//! let mut modal = ModalController::new();
//! let options = ModalOptions::new().overrides(ConfigOverrides::new().opacity(80));
//! let handle = modal.open(&mut dom, "Saved.", options).unwrap().unwrap();
//! assert_eq!(dom.style(handle.overlay, "opacity").as_deref(), Some("0.8"));
//! assert_eq!(modal.close(&mut dom), Some(CloseOutcome::Restored));
//! ```

pub use veil_core::{caps, config, geometry, position, style};

pub mod dom {
    pub use veil_dom::*;
}

pub mod modal {
    pub use veil_modal::*;
}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web {
    pub use veil_web::*;
}

pub mod prelude {
    //! Everything needed to open and close dialogs.

    pub use veil_core::{
        ConfigError, ConfigOverrides, ModalConfig, PositionOverride, RuntimeCaps, Size, StyleRules,
    };
    pub use veil_dom::{Dom, DomEvent, MemoryDom, NodeId};
    pub use veil_modal::{
        CloseFlow, CloseOutcome, DialogHandle, DialogState, IntoModalData, ModalAction,
        ModalController, ModalData, ModalError, ModalOptions,
    };

    #[cfg(all(feature = "web", target_arch = "wasm32"))]
    pub use veil_web::WebDom;
}
