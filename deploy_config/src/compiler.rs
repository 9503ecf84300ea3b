use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SOLC_VERSION: &str = "0.8.17";
pub const DEFAULT_OPTIMIZER_RUNS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optimizer {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_runs")]
    pub runs: u32,
}

fn default_runs() -> u32 {
    DEFAULT_OPTIMIZER_RUNS
}

impl Default for Optimizer {
    fn default() -> Self {
        Self {
            enabled: true,
            runs: DEFAULT_OPTIMIZER_RUNS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolcSettings {
    #[serde(default)]
    pub optimizer: Optimizer,
}

/// Solidity compiler version and optimizer tuning handed to the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerSettings {
    pub version: String,
    #[serde(default)]
    pub settings: SolcSettings,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            version: DEFAULT_SOLC_VERSION.to_owned(),
            settings: SolcSettings::default(),
        }
    }
}

impl CompilerSettings {
    pub fn optimizer(&self) -> Optimizer {
        self.settings.optimizer
    }

    /// The `settings` object of solc standard JSON input.
    pub fn solc_settings(&self) -> serde_json::Value {
        serde_json::json!({
            "optimizer": {
                "enabled": self.settings.optimizer.enabled,
                "runs": self.settings.optimizer.runs,
            }
        })
    }

    /// Version must be a plain `MAJOR.MINOR.PATCH` release.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parts: Vec<&str> = self.version.split('.').collect();
        let well_formed = parts.len() == 3
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
        if !well_formed {
            return Err(ConfigError::invalid(
                "solidity.version",
                format!("`{}` is not a MAJOR.MINOR.PATCH version", self.version),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = CompilerSettings::default();
        assert_eq!(settings.version, "0.8.17");
        assert_eq!(
            settings.optimizer(),
            Optimizer {
                enabled: true,
                runs: 200
            }
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_solc_settings_round_trip() {
        let settings = CompilerSettings::default();
        let json = settings.solc_settings();
        assert_eq!(json["optimizer"]["enabled"], true);
        assert_eq!(json["optimizer"]["runs"], 200);

        let parsed: SolcSettings = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, settings.settings);
    }

    #[test]
    fn test_validate_rejects_bad_versions() {
        for version in ["0.8", "v0.8.17", "0.8.x", "", "0..17", "^0.8.17"] {
            let settings = CompilerSettings {
                version: version.to_owned(),
                ..Default::default()
            };
            let err = settings.validate().unwrap_err();
            assert_eq!(err.key(), Some("solidity.version"), "{version}");
        }
    }
}
