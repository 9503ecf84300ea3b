use std::{
    collections::BTreeSet,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use ethers::prelude::{Abigen, MultiAbigen};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::{
    artifacts::{discover_artifacts, read_artifact, ArtifactError},
    error::ConfigError,
};

#[derive(Error, Debug)]
pub enum BindingsError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("failed to generate bindings for {contract}: {reason}")]
    Abigen { contract: String, reason: String },
}

/// Style of the generated contract bindings.
///
/// `ethers-v5` bindings are produced with ethers-rs `Abigen`, which mirrors the
/// ethers v5 contract API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingTarget {
    EthersV5,
}

impl BindingTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingTarget::EthersV5 => "ethers-v5",
        }
    }
}

impl FromStr for BindingTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ethers-v5" | "ethers-rs" => Ok(BindingTarget::EthersV5),
            other => Err(ConfigError::invalid(
                "typechain.target",
                format!("unsupported binding target `{other}`"),
            )),
        }
    }
}

impl fmt::Display for BindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BindingTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Where and in which style contract bindings are generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingOutput {
    pub out_dir: PathBuf,
    pub target: BindingTarget,
}

impl BindingOutput {
    /// Output directory, relative paths being taken from `root`.
    pub fn out_dir_in(&self, root: &Path) -> PathBuf {
        if self.out_dir.is_absolute() {
            self.out_dir.clone()
        } else {
            root.join(&self.out_dir)
        }
    }

    /// Generates one module per contract artifact found under `artifacts_dir`
    /// into `out_dir`, plus a `mod.rs` declaring them. Returns the generated
    /// contract names, sorted.
    ///
    /// Contracts are processed in artifact path order; when two sources define
    /// a contract with the same name only the first is generated.
    pub fn generate(
        &self,
        artifacts_dir: &Path,
        out_dir: &Path,
    ) -> Result<Vec<String>, BindingsError> {
        let mut seen = BTreeSet::new();
        let mut abigens = vec![];
        for path in discover_artifacts(artifacts_dir)? {
            let artifact = read_artifact(&path)?;
            if !seen.insert(artifact.contract_name.clone()) {
                log::warn!(
                    "skipping {} from {}: a contract with the same name was already generated",
                    artifact.contract_name,
                    artifact.source_name
                );
                continue;
            }

            let abigen_err = |e: &dyn fmt::Display| BindingsError::Abigen {
                contract: artifact.contract_name.clone(),
                reason: e.to_string(),
            };
            // the abi is passed inline so abigen does not resolve paths itself
            let abi = serde_json::to_string(&artifact.abi).map_err(|e| abigen_err(&e))?;
            abigens.push(Abigen::new(&artifact.contract_name, abi).map_err(|e| abigen_err(&e))?);
            log::debug!("prepared {} from {}", artifact.contract_name, path.display());
        }

        let generated: Vec<String> = seen.into_iter().collect();
        let all_err = |e: &dyn fmt::Display| BindingsError::Abigen {
            contract: generated.join(", "),
            reason: e.to_string(),
        };
        MultiAbigen::from_abigens(abigens)
            .build()
            .map_err(|e| all_err(&e))?
            .write_to_module(out_dir, false)
            .map_err(|e| all_err(&e))?;

        log::info!(
            "generated {} {} binding(s) in {}",
            generated.len(),
            self.target,
            out_dir.display()
        );
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::artifacts::test_utils::write_artifact;

    #[test]
    fn test_target_parse() {
        assert_eq!(
            "ethers-v5".parse::<BindingTarget>().unwrap(),
            BindingTarget::EthersV5
        );
        assert_eq!(
            "ethers-rs".parse::<BindingTarget>().unwrap(),
            BindingTarget::EthersV5
        );
        let err = "web3-v1".parse::<BindingTarget>().unwrap_err();
        assert_eq!(err.key(), Some("typechain.target"));
    }

    #[test]
    fn test_out_dir_in() {
        let output = BindingOutput {
            out_dir: PathBuf::from("typechain"),
            target: BindingTarget::EthersV5,
        };
        assert_eq!(
            output.out_dir_in(Path::new("/work")),
            PathBuf::from("/work/typechain")
        );
    }

    #[test]
    fn test_generate_writes_modules() {
        let artifacts = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_artifact(artifacts.path(), "contracts/Greeter.sol", "Greeter", "0x6080");
        write_artifact(artifacts.path(), "contracts/MyToken.sol", "MyToken", "0x6080");
        write_artifact(artifacts.path(), "legacy/Greeter.sol", "Greeter", "0x6080");

        let output = BindingOutput {
            out_dir: out.path().to_path_buf(),
            target: BindingTarget::EthersV5,
        };
        let generated = output.generate(artifacts.path(), out.path()).unwrap();

        assert_eq!(generated, vec!["Greeter", "MyToken"]);

        let greeter = fs::read_to_string(out.path().join("greeter.rs")).unwrap();
        assert!(greeter.contains("Greeter"));
        assert!(out.path().join("my_token.rs").exists());
        let mod_rs = fs::read_to_string(out.path().join("mod.rs")).unwrap();
        assert!(mod_rs.contains("pub mod greeter;"));
        assert!(mod_rs.contains("pub mod my_token;"));
    }
}
