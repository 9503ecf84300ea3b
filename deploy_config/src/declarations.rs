//! Static declarations: what each network, verification service, compiler and
//! binding generator is configured with before secrets are injected.
//!
//! Declared values are either literals or references to a key of the secret
//! source. In TOML a reference is written as `{ env = "KEY" }`:
//!
//! ```toml
//! [networks.arbitrumMainNet]
//! url = { env = "ARBITRUM_MAINNET_URL" }
//! chain_id = 42161
//! accounts = [{ env = "ARBITRUM_MAINNET_DEPLOY_KEY" }]
//!
//! [etherscan.api_key]
//! arbitrumOne = { env = "ARBITRUM_ONE_APIKEY" }
//! ```

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{compiler::CompilerSettings, error::ConfigError};

pub const ARBITRUM_MAINNET_URL_ENV_VAR: &str = "ARBITRUM_MAINNET_URL";
pub const ARBITRUM_TESTNET_DEPLOY_KEY_ENV_VAR: &str = "ARBITRUM_TESTNET_DEPLOY_KEY";
pub const ARBITRUM_MAINNET_DEPLOY_KEY_ENV_VAR: &str = "ARBITRUM_MAINNET_DEPLOY_KEY";
pub const ARBITRUM_MAINNET_TEST_DEPLOY_KEY_ENV_VAR: &str = "ARBITRUM_MAINNET_TEST_DEPLOY_KEY";
pub const ARBITRUM_ONE_APIKEY_ENV_VAR: &str = "ARBITRUM_ONE_APIKEY";

pub const LOCAL_NETWORK: &str = "hardhat";
pub const LOCAL_RPC_URL: &str = "http://127.0.0.1:8545";
pub const LOCAL_CHAIN_ID: u64 = 31337;
/// Public development mnemonic; its accounts are funded on local nodes.
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";
pub const DEV_ACCOUNT_COUNT: u32 = 20;

const ARBITRUM_FORK_URL: &str = "https://rpc.ankr.com/arbitrum";
const ARBITRUM_FORK_BLOCK: u64 = 45_976_671;
const ARBITRUM_GOERLI_URL: &str = "https://goerli-rollup.arbitrum.io/rpc";
const ARBITRUM_GOERLI_OMNIA_URL: &str = "https://endpoints.omniatech.io/v1/arbitrum/goerli/public";
const ARBITRUM_GOERLI_CHAIN_ID: u64 = 421_613;
const ARBITRUM_ONE_CHAIN_ID: u64 = 42_161;

/// A literal value or a reference to a key of the secret source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Declared<T> {
    Env { env: String },
    Literal(T),
}

impl<T> Declared<T> {
    pub fn env(key: impl Into<String>) -> Self {
        Self::Env { env: key.into() }
    }

    /// Secret key referenced by this value, if any.
    pub fn env_key(&self) -> Option<&str> {
        match self {
            Self::Env { env } => Some(env),
            Self::Literal(_) => None,
        }
    }
}

impl From<&str> for Declared<String> {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_owned())
    }
}

impl From<u64> for Declared<u64> {
    fn from(value: u64) -> Self {
        Self::Literal(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MnemonicDeclaration {
    pub mnemonic: Declared<String>,
    #[serde(default = "default_account_count")]
    pub count: u32,
    #[serde(default)]
    pub initial_index: u32,
}

fn default_account_count() -> u32 {
    DEV_ACCOUNT_COUNT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountsDeclaration {
    Keys(Vec<Declared<String>>),
    Mnemonic(MnemonicDeclaration),
}

impl Default for AccountsDeclaration {
    fn default() -> Self {
        Self::Keys(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkingDeclaration {
    pub url: Declared<String>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDeclaration {
    pub url: Declared<String>,
    pub chain_id: Declared<u64>,
    #[serde(default)]
    pub accounts: AccountsDeclaration,
    /// Fixed gas price override, in wei.
    #[serde(default)]
    pub gas_price: Option<Declared<u64>>,
    #[serde(default)]
    pub forking: Option<ForkingDeclaration>,
    #[serde(default)]
    pub allow_unlimited_contract_size: bool,
}

impl NetworkDeclaration {
    /// Remote network signing with one key read from the secret source.
    pub fn remote(url: Declared<String>, chain_id: u64, deploy_key_env: &str) -> Self {
        Self {
            url,
            chain_id: Declared::Literal(chain_id),
            accounts: AccountsDeclaration::Keys(vec![Declared::env(deploy_key_env)]),
            gas_price: None,
            forking: None,
            allow_unlimited_contract_size: false,
        }
    }

    /// Secret keys this network needs from the secret source.
    pub fn required_keys(&self) -> Vec<&str> {
        let mut keys = vec![];
        keys.extend(self.url.env_key());
        keys.extend(self.chain_id.env_key());
        match &self.accounts {
            AccountsDeclaration::Keys(accounts) => {
                keys.extend(accounts.iter().filter_map(Declared::env_key))
            }
            AccountsDeclaration::Mnemonic(m) => keys.extend(m.mnemonic.env_key()),
        }
        if let Some(gas_price) = &self.gas_price {
            keys.extend(gas_price.env_key());
        }
        if let Some(forking) = &self.forking {
            keys.extend(forking.url.env_key());
        }
        keys
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtherscanDeclaration {
    #[serde(default)]
    pub api_key: BTreeMap<String, Declared<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypechainDeclaration {
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
    #[serde(default = "default_target")]
    pub target: String,
}

fn default_out_dir() -> String {
    "typechain".to_owned()
}

fn default_target() -> String {
    "ethers-v5".to_owned()
}

impl Default for TypechainDeclaration {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            target: default_target(),
        }
    }
}

/// Everything the configuration is assembled from, apart from secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declarations {
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkDeclaration>,
    #[serde(default)]
    pub etherscan: EtherscanDeclaration,
    #[serde(default)]
    pub solidity: CompilerSettings,
    #[serde(default)]
    pub typechain: TypechainDeclaration,
}

impl Declarations {
    /// The active Arbitrum deployment setup plus the local development network.
    pub fn builtin() -> Self {
        let mut networks = BTreeMap::new();

        networks.insert(
            LOCAL_NETWORK.to_owned(),
            NetworkDeclaration {
                url: LOCAL_RPC_URL.into(),
                chain_id: LOCAL_CHAIN_ID.into(),
                accounts: AccountsDeclaration::Mnemonic(MnemonicDeclaration {
                    mnemonic: DEV_MNEMONIC.into(),
                    count: DEV_ACCOUNT_COUNT,
                    initial_index: 0,
                }),
                gas_price: None,
                forking: Some(ForkingDeclaration {
                    url: ARBITRUM_FORK_URL.into(),
                    block_number: Some(ARBITRUM_FORK_BLOCK),
                    enabled: true,
                }),
                allow_unlimited_contract_size: true,
            },
        );
        networks.insert(
            "arbitrumTestnet".to_owned(),
            NetworkDeclaration::remote(
                ARBITRUM_GOERLI_URL.into(),
                ARBITRUM_GOERLI_CHAIN_ID,
                ARBITRUM_TESTNET_DEPLOY_KEY_ENV_VAR,
            ),
        );
        networks.insert(
            "arbitrumTestnet1".to_owned(),
            NetworkDeclaration::remote(
                ARBITRUM_GOERLI_OMNIA_URL.into(),
                ARBITRUM_GOERLI_CHAIN_ID,
                ARBITRUM_TESTNET_DEPLOY_KEY_ENV_VAR,
            ),
        );
        networks.insert(
            "arbitrumMainNet".to_owned(),
            NetworkDeclaration::remote(
                Declared::env(ARBITRUM_MAINNET_URL_ENV_VAR),
                ARBITRUM_ONE_CHAIN_ID,
                ARBITRUM_MAINNET_DEPLOY_KEY_ENV_VAR,
            ),
        );
        networks.insert(
            "arbitrumMainNetTest".to_owned(),
            NetworkDeclaration::remote(
                Declared::env(ARBITRUM_MAINNET_URL_ENV_VAR),
                ARBITRUM_ONE_CHAIN_ID,
                ARBITRUM_MAINNET_TEST_DEPLOY_KEY_ENV_VAR,
            ),
        );

        let etherscan = EtherscanDeclaration {
            api_key: BTreeMap::from([(
                "arbitrumOne".to_owned(),
                Declared::env(ARBITRUM_ONE_APIKEY_ENV_VAR),
            )]),
        };

        Self {
            networks,
            etherscan,
            solidity: CompilerSettings::default(),
            typechain: TypechainDeclaration::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        log::debug!("read declarations from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Every secret key referenced anywhere, sorted and deduplicated.
    pub fn required_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .networks
            .values()
            .flat_map(NetworkDeclaration::required_keys)
            .chain(self.etherscan.api_key.values().filter_map(Declared::env_key))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}
