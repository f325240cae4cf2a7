/// Errors reported by [`ModalController::open`](crate::ModalController::open).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalError {
    /// The data handed to `open` is not a node, a selection, markup, or a
    /// number. `kind` names what was received (`"boolean"`, `"null"`, …).
    UnsupportedData { kind: &'static str },
}

impl std::fmt::Display for ModalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedData { kind } => write!(f, "Unsupported data type: {kind}"),
        }
    }
}

impl std::error::Error for ModalError {}
