use std::{fmt, path::Path};

use crate::artifacts::{load_artifacts, ArtifactError};

/// EIP-170 cap on deployed contract bytecode.
pub const CONTRACT_SIZE_LIMIT: usize = 24_576;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSize {
    pub contract: String,
    pub source: String,
    pub bytes: usize,
}

impl ContractSize {
    pub fn kib(&self) -> f64 {
        self.bytes as f64 / 1024.0
    }

    pub fn exceeds_limit(&self) -> bool {
        self.bytes > CONTRACT_SIZE_LIMIT
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeReport {
    pub contracts: Vec<ContractSize>,
    pub allow_unlimited_contract_size: bool,
}

impl SizeReport {
    pub fn oversized(&self) -> impl Iterator<Item = &ContractSize> {
        self.contracts.iter().filter(|c| c.exceeds_limit())
    }

    /// Whether every contract is deployable on the selected network.
    pub fn is_deployable(&self) -> bool {
        self.allow_unlimited_contract_size || self.oversized().next().is_none()
    }
}

impl fmt::Display for SizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<40} {:>10}", "Contract", "Size (KiB)")?;
        for c in &self.contracts {
            let marker = if c.exceeds_limit() { " !" } else { "" };
            writeln!(f, "{:<40} {:>10.2}{marker}", c.contract, c.kib())?;
        }
        Ok(())
    }
}

/// Deployed bytecode sizes of every deployable contract under `dir`, largest
/// first. Interfaces and abstract contracts (no bytecode) are left out.
pub fn measure_artifacts(
    dir: &Path,
    allow_unlimited_contract_size: bool,
) -> Result<SizeReport, ArtifactError> {
    let mut contracts: Vec<ContractSize> = load_artifacts(dir)?
        .into_iter()
        .filter(|a| a.deployed_size() > 0)
        .map(|a| ContractSize {
            bytes: a.deployed_size(),
            contract: a.contract_name,
            source: a.source_name,
        })
        .collect();
    contracts.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.contract.cmp(&b.contract)));

    for c in contracts.iter().filter(|c| c.exceeds_limit()) {
        log::warn!(
            "{} ({}) is {} bytes, over the {CONTRACT_SIZE_LIMIT} byte limit",
            c.contract,
            c.source,
            c.bytes
        );
    }

    Ok(SizeReport {
        contracts,
        allow_unlimited_contract_size,
    })
}
