//! Runtime detection from document facts.

use veil_core::{RuntimeCaps, RuntimeSignals};

/// `document.compatMode` of a page rendered in quirks mode.
pub const QUIRKS_COMPAT_MODE: &str = "BackCompat";

/// Capabilities from `navigator.userAgent`, `document.compatMode`, and
/// whether `window.XMLHttpRequest` exists.
#[must_use]
pub fn detect_caps(user_agent: &str, compat_mode: &str, has_xml_http_request: bool) -> RuntimeCaps {
    RuntimeCaps::detect(&RuntimeSignals {
        user_agent,
        quirks_mode: compat_mode == QUIRKS_COMPAT_MODE,
        has_xml_http_request,
    })
}
