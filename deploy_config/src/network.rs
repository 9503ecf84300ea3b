use std::ops::Range;

use ethers::core::k256::ecdsa::SigningKey as EcdsaKey;
use serde::Serialize;
use url::Url;

use crate::{error::ConfigError, secrets::Secret};

const ENDPOINT_SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

/// First hardened child index; account indices must stay below it.
pub const HD_INDEX_LIMIT: u32 = 1 << 31;

/// A 32-byte secp256k1 private key, normalized to lowercase `0x` hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningKey(Secret);

impl SigningKey {
    /// `key` names where the value came from, for error reporting.
    pub fn parse(key: &str, raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let payload = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(payload)
            .map_err(|e| ConfigError::invalid(key, format!("signing key is not hex: {e}")))?;
        if bytes.len() != 32 {
            return Err(ConfigError::invalid(
                key,
                format!("signing key must be 32 bytes, found {}", bytes.len()),
            ));
        }
        // zero and values at or above the curve order are not private keys
        EcdsaKey::from_slice(&bytes).map_err(|_| {
            ConfigError::invalid(key, "signing key is not a valid secp256k1 scalar")
        })?;
        Ok(Self(Secret::new(format!("0x{}", hex::encode(bytes)))))
    }

    pub fn expose(&self) -> &str {
        self.0.expose()
    }
}

/// HD wallet accounts derived from a BIP-39 phrase along `m/44'/60'/0'/0/i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HdAccounts {
    pub mnemonic: Secret,
    pub count: u32,
    pub initial_index: u32,
}

impl HdAccounts {
    pub fn indices(&self) -> Option<Range<u32>> {
        derivation_range(self.initial_index, self.count)
    }
}

/// Child indices `initial_index..initial_index + count`, or `None` when the
/// range overflows or reaches into hardened indices.
pub fn derivation_range(initial_index: u32, count: u32) -> Option<Range<u32>> {
    let end = initial_index.checked_add(count)?;
    (end <= HD_INDEX_LIMIT).then_some(initial_index..end)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Accounts {
    Keys(Vec<SigningKey>),
    Mnemonic(HdAccounts),
}

impl Accounts {
    pub fn len(&self) -> usize {
        match self {
            Accounts::Keys(keys) => keys.len(),
            Accounts::Mnemonic(hd) => hd.count as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Forking {
    pub url: Url,
    pub block_number: Option<u64>,
    pub enabled: bool,
}

/// Connection parameters for one named target network. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkProfile {
    pub name: String,
    pub url: Url,
    pub chain_id: u64,
    pub accounts: Accounts,
    /// Fixed gas price override, in wei.
    pub gas_price: Option<u64>,
    pub forking: Option<Forking>,
    pub allow_unlimited_contract_size: bool,
}

/// Parses an endpoint URL, accepting only JSON-RPC transport schemes.
pub fn parse_endpoint(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::invalid(key, e))?;
    if !ENDPOINT_SCHEMES.contains(&url.scheme()) {
        return Err(ConfigError::invalid(
            key,
            format!("unsupported endpoint scheme `{}`", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::invalid(key, "endpoint has no host"));
    }
    Ok(url)
}

pub fn check_chain_id(key: &str, chain_id: u64) -> Result<u64, ConfigError> {
    if chain_id == 0 {
        return Err(ConfigError::invalid(key, "chain id must be positive"));
    }
    Ok(chain_id)
}
