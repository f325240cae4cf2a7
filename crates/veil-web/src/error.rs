//! Errors of the browser entry points.

use std::fmt;

use veil_core::ConfigError;
use veil_modal::ModalError;

/// Why a browser entry point failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebError {
    /// No `window`, `document`, or `document.body` to attach to.
    NoDocument,
    /// Called from inside a hook while the page controller is running.
    Busy,
    /// The options object could not be read as modal configuration.
    Config(ConfigError),
    /// The controller rejected the content.
    Modal(ModalError),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDocument => write!(f, "no document body to attach the modal to"),
            Self::Busy => write!(f, "modal controller is busy"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Modal(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoDocument | Self::Busy => None,
            Self::Config(err) => Some(err),
            Self::Modal(err) => Some(err),
        }
    }
}

impl From<ConfigError> for WebError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<ModalError> for WebError {
    fn from(err: ModalError) -> Self {
        Self::Modal(err)
    }
}

impl From<WebError> for wasm_bindgen::JsValue {
    fn from(err: WebError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
