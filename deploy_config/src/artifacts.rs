use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("artifacts directory {0} does not exist")]
    MissingDir(PathBuf),

    #[error("failed to walk artifacts: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a contract artifact: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The parts of a compiled contract artifact this crate reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    #[serde(default)]
    pub source_name: String,
    pub abi: serde_json::Value,
    #[serde(default)]
    pub deployed_bytecode: String,
}

impl Artifact {
    /// Deployed bytecode length in bytes. Unlinked library placeholders count
    /// for the 20 bytes of the address they stand for.
    pub fn deployed_size(&self) -> usize {
        let code = self.deployed_bytecode.trim();
        let code = code.strip_prefix("0x").unwrap_or(code);
        code.len() / 2
    }
}

/// Contract artifact files under `dir`, sorted by path.
///
/// Debug companions (`*.dbg.json`) and the `build-info` tree are skipped.
pub fn discover_artifacts(dir: &Path) -> Result<Vec<PathBuf>, ArtifactError> {
    if !dir.is_dir() {
        return Err(ArtifactError::MissingDir(dir.to_path_buf()));
    }

    let mut paths = vec![];
    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.file_name() != "build-info")
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.ends_with(".json") && !name.ends_with(".dbg.json") {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

pub fn read_artifact(path: &Path) -> Result<Artifact, ArtifactError> {
    let content = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads every artifact under `dir`.
pub fn load_artifacts(dir: &Path) -> Result<Vec<Artifact>, ArtifactError> {
    discover_artifacts(dir)?
        .iter()
        .map(|path| read_artifact(path))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::{fs, path::Path};

    pub fn write_artifact(dir: &Path, source: &str, name: &str, deployed_bytecode: &str) {
        let contract_dir = dir.join(source);
        fs::create_dir_all(&contract_dir).unwrap();
        let artifact = serde_json::json!({
            "_format": "hh-sol-artifact-1",
            "contractName": name,
            "sourceName": source,
            "abi": [{
                "type": "function",
                "name": "greet",
                "inputs": [],
                "outputs": [{ "name": "", "type": "string", "internalType": "string" }],
                "stateMutability": "view"
            }],
            "bytecode": deployed_bytecode,
            "deployedBytecode": deployed_bytecode,
            "linkReferences": {},
            "deployedLinkReferences": {}
        });
        fs::write(
            contract_dir.join(format!("{name}.json")),
            serde_json::to_string_pretty(&artifact).unwrap(),
        )
        .unwrap();
        fs::write(
            contract_dir.join(format!("{name}.dbg.json")),
            r#"{ "_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/x.json" }"#,
        )
        .unwrap();
    }
}
