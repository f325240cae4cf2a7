//! Dialog content shapes.

use veil_dom::NodeId;

use crate::error::ModalError;

/// Content accepted by [`ModalController::open`](crate::ModalController::open).
#[derive(Debug, Clone, PartialEq)]
pub enum ModalData {
    /// One node, either attached to the page or freshly built.
    Node(NodeId),
    /// Several nodes shown together, in order.
    Selection(Vec<NodeId>),
    /// Markup or plain text, wrapped in a new `div`.
    Markup(String),
    /// A number, rendered as text in a new `div`.
    Number(f64),
}

impl ModalData {
    /// Markup for the primitive shapes; `None` for node shapes.
    #[must_use]
    pub fn markup(&self) -> Option<String> {
        match self {
            Self::Markup(markup) => Some(markup.clone()),
            Self::Number(number) => Some(format_number(*number)),
            Self::Node(_) | Self::Selection(_) => None,
        }
    }
}

/// Renders numbers the way a browser stringifies them.
fn format_number(number: f64) -> String {
    if number.is_infinite() {
        if number.is_sign_positive() {
            "Infinity".to_owned()
        } else {
            "-Infinity".to_owned()
        }
    } else {
        number.to_string()
    }
}

/// Conversion into [`ModalData`], failing for shapes a dialog cannot show.
///
/// Statically typed inputs always succeed. Dynamic inputs (JSON values,
/// and script values in `veil-web`) are checked at runtime.
pub trait IntoModalData {
    fn into_modal_data(self) -> Result<ModalData, ModalError>;
}

impl IntoModalData for ModalData {
    fn into_modal_data(self) -> Result<ModalData, ModalError> {
        match self {
            Self::Selection(nodes) if nodes.is_empty() => Err(ModalError::UnsupportedData {
                kind: "empty selection",
            }),
            other => Ok(other),
        }
    }
}

impl IntoModalData for NodeId {
    fn into_modal_data(self) -> Result<ModalData, ModalError> {
        Ok(ModalData::Node(self))
    }
}

impl IntoModalData for Vec<NodeId> {
    fn into_modal_data(self) -> Result<ModalData, ModalError> {
        ModalData::Selection(self).into_modal_data()
    }
}

impl IntoModalData for &[NodeId] {
    fn into_modal_data(self) -> Result<ModalData, ModalError> {
        self.to_vec().into_modal_data()
    }
}

impl IntoModalData for &str {
    fn into_modal_data(self) -> Result<ModalData, ModalError> {
        Ok(ModalData::Markup(self.to_owned()))
    }
}

impl IntoModalData for String {
    fn into_modal_data(self) -> Result<ModalData, ModalError> {
        Ok(ModalData::Markup(self))
    }
}

impl IntoModalData for f64 {
    fn into_modal_data(self) -> Result<ModalData, ModalError> {
        Ok(ModalData::Number(self))
    }
}

impl IntoModalData for i64 {
    fn into_modal_data(self) -> Result<ModalData, ModalError> {
        Ok(ModalData::Number(self as f64))
    }
}

impl IntoModalData for i32 {
    fn into_modal_data(self) -> Result<ModalData, ModalError> {
        Ok(ModalData::Number(f64::from(self)))
    }
}

#[cfg(feature = "config")]
impl IntoModalData for serde_json::Value {
    fn into_modal_data(self) -> Result<ModalData, ModalError> {
        use serde_json::Value;

        match self {
            Value::String(markup) => Ok(ModalData::Markup(markup)),
            Value::Number(number) => number
                .as_f64()
                .map(ModalData::Number)
                .ok_or(ModalError::UnsupportedData { kind: "number" }),
            Value::Bool(_) => Err(ModalError::UnsupportedData { kind: "boolean" }),
            Value::Null => Err(ModalError::UnsupportedData { kind: "null" }),
            Value::Array(_) => Err(ModalError::UnsupportedData { kind: "array" }),
            Value::Object(_) => Err(ModalError::UnsupportedData { kind: "object" }),
        }
    }
}
