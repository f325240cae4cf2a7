//! Configuration errors.

/// Errors from loading configuration documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A TOML document could not be parsed.
    Toml(String),
    /// A JSON document could not be parsed.
    Json(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Toml(msg) => write!(f, "invalid TOML modal config: {msg}"),
            Self::Json(msg) => write!(f, "invalid JSON modal config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
