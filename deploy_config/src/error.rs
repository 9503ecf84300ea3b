use thiserror::Error;

/// Failures raised while assembling the configuration.
///
/// Both `Missing` and `Invalid` are authoring/deployment mistakes; they abort
/// the load and name the key at fault.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required configuration value `{key}`")]
    Missing { key: String },

    #[error("invalid configuration value `{key}`: {reason}")]
    Invalid { key: String, reason: String },

    #[error("unknown network `{0}`")]
    UnknownNetwork(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::Missing { key: key.into() }
    }

    pub fn invalid(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Key named by a `Missing` or `Invalid` error.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Missing { key } | Self::Invalid { key, .. } => Some(key),
            _ => None,
        }
    }
}
