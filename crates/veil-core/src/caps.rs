//! Runtime capability detection.
//!
//! The controller never inspects browser identity directly. It asks
//! [`RuntimeCaps`] whether the host needs one of the legacy layout shims:
//!
//! | Query | Shim |
//! |-------|------|
//! | [`RuntimeCaps::needs_fixed_emulation`] | scroll-driven absolute positioning instead of `position: fixed` |
//! | [`RuntimeCaps::needs_blocking_frame`] | blocking frame under the backdrop even when not configured |
//! | [`RuntimeCaps::resizes_live`] | whether backdrop and frame follow window resizes |
//!
//! Modern hosts report [`RuntimeCaps::modern`] and take the no-op branch of
//! every query.

use bitflags::bitflags;

bitflags! {
    /// Layout capabilities of the host runtime.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RuntimeCaps: u8 {
        /// `position: fixed` is honored.
        const NATIVE_FIXED = 1 << 0;
        /// Standards-mode box model (width excludes padding and border).
        const STANDARD_BOX_MODEL = 1 << 1;
        /// Fixed layers can be resized in place when the window resizes.
        const LIVE_RESIZE = 1 << 2;
        /// Native form controls paint above positioned layers.
        const WINDOWED_CONTROLS = 1 << 3;
    }
}

/// Raw facts about the host, gathered by a backend before detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSignals<'a> {
    /// `navigator.userAgent`.
    pub user_agent: &'a str,
    /// Document is rendered in quirks (`BackCompat`) mode.
    pub quirks_mode: bool,
    /// `window.XMLHttpRequest` exists.
    pub has_xml_http_request: bool,
}

impl RuntimeCaps {
    /// Capabilities of any standards-compliant runtime.
    #[must_use]
    pub const fn modern() -> Self {
        Self::NATIVE_FIXED
            .union(Self::STANDARD_BOX_MODEL)
            .union(Self::LIVE_RESIZE)
    }

    /// Classify a runtime from what the host reports.
    ///
    /// Only Internet Explorer needs shims: version 6 without native
    /// `XMLHttpRequest` lacks fixed positioning, live resize, and paints
    /// `<select>` above everything; any IE version in quirks mode uses the
    /// non-standard box model.
    #[must_use]
    pub fn detect(signals: &RuntimeSignals<'_>) -> Self {
        let mut caps = Self::modern();
        let Some(version) = msie_major_version(signals.user_agent) else {
            return caps;
        };

        if version == 6 && !signals.has_xml_http_request {
            caps.remove(Self::NATIVE_FIXED | Self::LIVE_RESIZE);
            caps.insert(Self::WINDOWED_CONTROLS);
        }
        if signals.quirks_mode {
            caps.remove(Self::STANDARD_BOX_MODEL);
        }
        caps
    }

    /// Fragments must be positioned with scroll-tracking expressions.
    #[must_use]
    pub const fn needs_fixed_emulation(self) -> bool {
        !self.contains(Self::NATIVE_FIXED) || !self.contains(Self::STANDARD_BOX_MODEL)
    }

    /// A blocking frame is required regardless of configuration.
    #[must_use]
    pub const fn needs_blocking_frame(self) -> bool {
        self.contains(Self::WINDOWED_CONTROLS)
    }

    #[must_use]
    pub const fn resizes_live(self) -> bool {
        self.contains(Self::LIVE_RESIZE)
    }
}

impl Default for RuntimeCaps {
    fn default() -> Self {
        Self::modern()
    }
}

fn msie_major_version(user_agent: &str) -> Option<u32> {
    if user_agent.contains("Opera") {
        return None;
    }
    let (_, rest) = user_agent.split_once("MSIE ")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const IE6: &str = "Mozilla/4.0 (compatible; MSIE 6.0; Windows NT 5.1; SV1)";
    const IE7: &str = "Mozilla/4.0 (compatible; MSIE 7.0; Windows NT 6.0)";
    const FIREFOX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

    fn signals(user_agent: &str, quirks_mode: bool, xhr: bool) -> RuntimeSignals<'_> {
        RuntimeSignals {
            user_agent,
            quirks_mode,
            has_xml_http_request: xhr,
        }
    }

    #[test]
    fn modern_needs_no_shims() {
        let caps = RuntimeCaps::detect(&signals(FIREFOX, false, true));
        assert_eq!(caps, RuntimeCaps::modern());
        assert!(!caps.needs_fixed_emulation());
        assert!(!caps.needs_blocking_frame());
        assert!(caps.resizes_live());
    }

    #[test]
    fn quirks_mode_outside_ie_is_ignored() {
        let caps = RuntimeCaps::detect(&signals(FIREFOX, true, true));
        assert!(!caps.needs_fixed_emulation());
    }

    #[test]
    fn ie6_needs_every_shim() {
        let caps = RuntimeCaps::detect(&signals(IE6, false, false));
        assert!(caps.needs_fixed_emulation());
        assert!(caps.needs_blocking_frame());
        assert!(!caps.resizes_live());
    }

    #[test]
    fn ie6_with_native_xhr_is_treated_as_ie7() {
        let caps = RuntimeCaps::detect(&signals(IE6, false, true));
        assert_eq!(caps, RuntimeCaps::modern());
    }

    #[test]
    fn ie7_quirks_mode_emulates_fixed_only() {
        let caps = RuntimeCaps::detect(&signals(IE7, true, true));
        assert!(caps.needs_fixed_emulation());
        assert!(!caps.needs_blocking_frame());
        assert!(caps.resizes_live());
    }

    #[test]
    fn opera_masquerading_as_ie_is_modern() {
        let ua = "Opera/9.80 (compatible; MSIE 6.0; Windows NT 5.1)";
        assert_eq!(RuntimeCaps::detect(&signals(ua, true, false)), RuntimeCaps::modern());
    }
}
