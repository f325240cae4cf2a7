//! Modal configuration: built-in defaults merged with caller overrides.
//!
//! A [`ModalConfig`] is resolved once per dialog, when it opens, by laying
//! [`ConfigOverrides`] over a base config (normally
//! [`ModalConfig::default`], or a host-wide config held by the controller).
//! The resolved record is immutable for the lifetime of the dialog.
//!
//! # Loading
//!
//! With the `config` feature (on by default) overrides can be read from TOML
//! or JSON. Keys are the snake_case field names, and the camelCase names
//! used by script callers (`overlayCss`, `zIndex`, `closeHTML`, `iframe`)
//! are accepted as aliases. Style tables map CSS
//! property names to values; `position` is a two-element array where either
//! entry may be omitted with `null` (JSON only).
//!
//! ```toml
//! opacity = 70
//! persist = true
//! close_class = "dismiss"
//!
//! [container_css]
//! width = "420px"
//! height = "240px"
//! ```

use crate::position::PositionOverride;
use crate::style::StyleRules;

/// Marker class added to every backdrop element.
pub const OVERLAY_CLASS: &str = "veil-overlay";
/// Marker class added to every container element.
pub const CONTAINER_CLASS: &str = "veil-container";
/// Marker class added to the content shown in the dialog.
pub const DATA_CLASS: &str = "veil-data";

/// Default stacking order of the lowest fragment.
pub const DEFAULT_Z_INDEX: i32 = 1000;
/// Default backdrop opacity, in percent.
pub const DEFAULT_OPACITY: u8 = 50;

/// Resolved configuration of one dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalConfig {
    /// Insert a blocking frame under the backdrop on every runtime, not only
    /// on runtimes whose native controls paint above positioned layers.
    pub blocking_frame: bool,
    /// Extra style rules for the blocking frame.
    pub blocking_frame_css: StyleRules,
    /// Backdrop opacity in percent, `0..=100`.
    pub opacity: u8,
    /// Element id of the backdrop.
    pub overlay_id: String,
    /// Extra style rules for the backdrop.
    pub overlay_css: StyleRules,
    /// Element id of the container.
    pub container_id: String,
    /// Extra style rules for the container.
    pub container_css: StyleRules,
    /// Extra style rules for the content.
    pub data_css: StyleRules,
    /// Stacking order of the blocking frame; the backdrop and container
    /// sit one and two above it.
    pub z_index: i32,
    /// Append the close affordance to the container.
    pub close: bool,
    /// Markup of the close affordance.
    pub close_markup: String,
    /// Clicking any element with this class closes the dialog.
    pub close_class: String,
    /// Pinned container position; `None` centers it.
    pub position: Option<PositionOverride>,
    /// Keep edits made to page content while the dialog was open.
    pub persist: bool,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            blocking_frame: true,
            blocking_frame_css: StyleRules::new(),
            opacity: DEFAULT_OPACITY,
            overlay_id: "veil-overlay".to_owned(),
            overlay_css: StyleRules::new(),
            container_id: "veil-container".to_owned(),
            container_css: StyleRules::new(),
            data_css: StyleRules::new(),
            z_index: DEFAULT_Z_INDEX,
            close: true,
            close_markup: r#"<a class="veil-close-img" title="Close"></a>"#.to_owned(),
            close_class: "veil-close".to_owned(),
            position: None,
            persist: false,
        }
    }
}

impl ModalConfig {
    /// Lay `overrides` over `self`, returning the resolved config.
    ///
    /// Opacity above 100 is clamped to 100. Style tables replace the base
    /// table wholesale rather than merging property by property.
    #[must_use]
    pub fn merged(&self, overrides: &ConfigOverrides) -> Self {
        let mut out = self.clone();
        let o = overrides.clone();
        if let Some(v) = o.blocking_frame {
            out.blocking_frame = v;
        }
        if let Some(v) = o.blocking_frame_css {
            out.blocking_frame_css = v;
        }
        if let Some(v) = o.opacity {
            out.opacity = v.min(100);
        }
        if let Some(v) = o.overlay_id {
            out.overlay_id = v;
        }
        if let Some(v) = o.overlay_css {
            out.overlay_css = v;
        }
        if let Some(v) = o.container_id {
            out.container_id = v;
        }
        if let Some(v) = o.container_css {
            out.container_css = v;
        }
        if let Some(v) = o.data_css {
            out.data_css = v;
        }
        if let Some(v) = o.z_index {
            out.z_index = v;
        }
        if let Some(v) = o.close {
            out.close = v;
        }
        if let Some(v) = o.close_markup {
            out.close_markup = v;
        }
        if let Some(v) = o.close_class {
            out.close_class = v;
        }
        if let Some(v) = o.position {
            out.position = Some(v);
        }
        if let Some(v) = o.persist {
            out.persist = v;
        }
        out
    }

    /// Backdrop opacity as a CSS value in `0.0..=1.0`.
    #[must_use]
    pub fn overlay_opacity(&self) -> f64 {
        f64::from(self.opacity.min(100)) / 100.0
    }
}

/// Caller overrides; every field left `None` keeps the base value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct ConfigOverrides {
    #[cfg_attr(feature = "config", serde(alias = "blockingFrame", alias = "iframe"))]
    pub blocking_frame: Option<bool>,
    #[cfg_attr(feature = "config", serde(alias = "blockingFrameCss", alias = "iframeCss"))]
    pub blocking_frame_css: Option<StyleRules>,
    pub opacity: Option<u8>,
    #[cfg_attr(feature = "config", serde(alias = "overlayId"))]
    pub overlay_id: Option<String>,
    #[cfg_attr(feature = "config", serde(alias = "overlayCss"))]
    pub overlay_css: Option<StyleRules>,
    #[cfg_attr(feature = "config", serde(alias = "containerId"))]
    pub container_id: Option<String>,
    #[cfg_attr(feature = "config", serde(alias = "containerCss"))]
    pub container_css: Option<StyleRules>,
    #[cfg_attr(feature = "config", serde(alias = "dataCss"))]
    pub data_css: Option<StyleRules>,
    #[cfg_attr(feature = "config", serde(alias = "zIndex"))]
    pub z_index: Option<i32>,
    pub close: Option<bool>,
    #[cfg_attr(feature = "config", serde(alias = "closeMarkup", alias = "closeHTML"))]
    pub close_markup: Option<String>,
    #[cfg_attr(feature = "config", serde(alias = "closeClass"))]
    pub close_class: Option<String>,
    pub position: Option<PositionOverride>,
    pub persist: Option<bool>,
}

impl ConfigOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn blocking_frame(mut self, enabled: bool) -> Self {
        self.blocking_frame = Some(enabled);
        self
    }

    #[must_use]
    pub fn opacity(mut self, percent: u8) -> Self {
        self.opacity = Some(percent);
        self
    }

    #[must_use]
    pub fn overlay_css(mut self, rules: StyleRules) -> Self {
        self.overlay_css = Some(rules);
        self
    }

    #[must_use]
    pub fn container_css(mut self, rules: StyleRules) -> Self {
        self.container_css = Some(rules);
        self
    }

    #[must_use]
    pub fn data_css(mut self, rules: StyleRules) -> Self {
        self.data_css = Some(rules);
        self
    }

    #[must_use]
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    #[must_use]
    pub fn close(mut self, show: bool) -> Self {
        self.close = Some(show);
        self
    }

    /// Markup of the close affordance, parsed when the dialog opens.
    #[must_use]
    pub fn close_markup(mut self, markup: impl Into<String>) -> Self {
        self.close_markup = Some(markup.into());
        self
    }

    #[must_use]
    pub fn close_class(mut self, class: impl Into<String>) -> Self {
        self.close_class = Some(class.into());
        self
    }

    #[must_use]
    pub fn position(mut self, position: PositionOverride) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = Some(persist);
        self
    }

    /// Parse overrides from a TOML document.
    #[cfg(feature = "config")]
    pub fn from_toml_str(source: &str) -> Result<Self, crate::ConfigError> {
        toml::from_str(source).map_err(|err| crate::ConfigError::Toml(err.to_string()))
    }

    /// Parse overrides from a JSON document.
    #[cfg(feature = "config")]
    pub fn from_json_str(source: &str) -> Result<Self, crate::ConfigError> {
        serde_json::from_str(source).map_err(|err| crate::ConfigError::Json(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ModalConfig::default();
        assert!(config.blocking_frame);
        assert_eq!(config.opacity, 50);
        assert_eq!(config.z_index, 1000);
        assert!(config.close);
        assert_eq!(config.close_class, "veil-close");
        assert!(config.position.is_none());
        assert!(!config.persist);
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let base = ModalConfig::default();
        let merged = base.merged(&ConfigOverrides::new().persist(true).z_index(50));
        assert!(merged.persist);
        assert_eq!(merged.z_index, 50);
        assert_eq!(merged.overlay_id, base.overlay_id);
        assert_eq!(merged.close_markup, base.close_markup);
    }

    #[test]
    fn merge_clamps_opacity() {
        let merged = ModalConfig::default().merged(&ConfigOverrides::new().opacity(250));
        assert_eq!(merged.opacity, 100);
        assert!((merged.overlay_opacity() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_overrides_are_identity() {
        let base = ModalConfig::default();
        assert_eq!(base.merged(&ConfigOverrides::default()), base);
    }

    #[cfg(feature = "config")]
    #[test]
    fn loads_toml_overrides() {
        let overrides = ConfigOverrides::from_toml_str(
            r#"
            opacity = 70
            persist = true
            position = [15.0, 30.0]

            [container_css]
            width = "420px"
            height = "240px"
            "#,
        )
        .expect("valid toml");

        let config = ModalConfig::default().merged(&overrides);
        assert_eq!(config.opacity, 70);
        assert!(config.persist);
        assert_eq!(config.position, Some(PositionOverride::new(15.0, 30.0)));
        assert_eq!(config.container_css.get("width"), Some("420px"));
        assert_eq!(config.container_css.get("height"), Some("240px"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn loads_json_with_partial_position() {
        let overrides =
            ConfigOverrides::from_json_str(r#"{ "position": [null, 80], "close": false }"#)
                .expect("valid json");
        assert_eq!(
            overrides.position,
            Some(PositionOverride {
                x: None,
                y: Some(80.0)
            })
        );
        assert_eq!(overrides.close, Some(false));
    }

    #[cfg(feature = "config")]
    #[test]
    fn accepts_script_style_key_names() {
        let overrides = ConfigOverrides::from_json_str(
            r##"{
                "iframe": false,
                "overlayCss": { "background-color": "#000" },
                "containerId": "dialog",
                "dataCss": { "padding": "8px" },
                "zIndex": 3000,
                "closeHTML": "<button>x</button>",
                "closeClass": "dismiss"
            }"##,
        )
        .expect("valid json");

        let config = ModalConfig::default().merged(&overrides);
        assert!(!config.blocking_frame);
        assert_eq!(config.overlay_css.get("background-color"), Some("#000"));
        assert_eq!(config.container_id, "dialog");
        assert_eq!(config.data_css.get("padding"), Some("8px"));
        assert_eq!(config.z_index, 3000);
        assert_eq!(config.close_markup, "<button>x</button>");
        assert_eq!(config.close_class, "dismiss");
    }

    #[cfg(feature = "config")]
    #[test]
    fn rejects_unknown_keys() {
        let err = ConfigOverrides::from_toml_str("opacty = 10").unwrap_err();
        assert!(matches!(err, crate::ConfigError::Toml(_)));
        assert!(err.to_string().starts_with("invalid TOML modal config"));
    }
}
