use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::Path,
};

use serde::{Serialize, Serializer};

use crate::error::ConfigError;

/// Opaque key-value provider of endpoint URLs, signing keys and API keys.
///
/// Empty values are treated as absent.
pub trait SecretSource {
    fn secret(&self, key: &str) -> Option<String>;
}

impl SecretSource for HashMap<String, String> {
    fn secret(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl SecretSource for BTreeMap<String, String> {
    fn secret(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<S: SecretSource + ?Sized> SecretSource for Box<S> {
    fn secret(&self, key: &str) -> Option<String> {
        (**self).secret(key)
    }
}

/// Process environment, after loading a `.env` file if one exists.
pub struct EnvSecrets;

impl EnvSecrets {
    pub fn load() -> Self {
        if let Ok(path) = dotenv::dotenv() {
            log::debug!("loaded secrets file {}", path.display());
        }
        Self
    }
}

impl SecretSource for EnvSecrets {
    fn secret(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A flat `env.json` object of string values.
#[derive(Debug, Clone, Default)]
pub struct JsonSecrets {
    values: BTreeMap<String, String>,
}

impl JsonSecrets {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(content)?;
        let mut values = BTreeMap::new();
        for (key, value) in raw {
            // numbers are accepted so that chain ids can be injected unquoted
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                _ => {
                    log::debug!("ignoring non-scalar secrets entry {key}");
                    continue;
                }
            };
            values.insert(key, value);
        }
        Ok(Self { values })
    }
}

impl SecretSource for JsonSecrets {
    fn secret(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Looks `key` up in `source`, failing with `Missing` when absent or blank.
pub fn require<S: SecretSource + ?Sized>(source: &S, key: &str) -> Result<String, ConfigError> {
    match source.secret(key) {
        Some(value) if !value.trim().is_empty() => {
            log::debug!("resolved secret `{key}`");
            Ok(value.trim().to_owned())
        }
        _ => Err(ConfigError::missing(key)),
    }
}

/// Secret material. Never printed and serialized as a placeholder.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reports_key_name() {
        let source: HashMap<String, String> = HashMap::new();
        let err = require(&source, "ARBITRUM_ONE_APIKEY").unwrap_err();
        assert!(matches!(err, ConfigError::Missing { ref key } if key == "ARBITRUM_ONE_APIKEY"));
    }

    #[test]
    fn test_require_treats_blank_as_missing() {
        let source = HashMap::from([("KEY".to_owned(), "   ".to_owned())]);
        assert!(matches!(
            require(&source, "KEY"),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn test_json_secrets_accepts_numbers() {
        let secrets =
            JsonSecrets::from_json_str(r#"{ "URL": "https://example.test", "CHAIN": 42161 }"#)
                .unwrap();
        assert_eq!(secrets.secret("URL").as_deref(), Some("https://example.test"));
        assert_eq!(secrets.secret("CHAIN").as_deref(), Some("42161"));
        assert_eq!(secrets.secret("OTHER"), None);
    }

    #[test]
    fn test_json_secrets_skip_unusable_values() {
        let source = JsonSecrets::from_json_str(
            r#"{
                "KEYS": ["a", "b"],
                "UNSET": null,
                "ENABLED": true,
                "NESTED": { "a": 1 },
                "ARBITRUM_MAINNET_URL": "https://example-arbitrum.test/rpc"
            }"#,
        )
        .unwrap();
        assert_eq!(
            source.secret("ARBITRUM_MAINNET_URL").as_deref(),
            Some("https://example-arbitrum.test/rpc")
        );
        for key in ["KEYS", "UNSET", "ENABLED", "NESTED"] {
            assert_eq!(source.secret(key), None);
        }
        assert!(matches!(
            require(&source, "UNSET"),
            Err(ConfigError::Missing { ref key }) if key == "UNSET"
        ));
    }

    #[test]
    fn test_secret_is_redacted() {
        let secret = Secret::new("0xdeadbeef");
        assert_eq!(format!("{secret:?}"), "Secret(***)");
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"***\"");
        assert_eq!(secret.expose(), "0xdeadbeef");
    }
}
