//! Assembly of the immutable deployment configuration.
//!
//! [`Config::assemble`] is a pure function of the static declarations and the
//! secret source. Every network and verification key is resolved eagerly, so a
//! missing or malformed value fails the load before any network is used.
//!
//! ```rust,no_run
//! use deploy_config::{config::Config, secrets::EnvSecrets};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(&EnvSecrets::load())?;
//! let network = config.network("arbitrumTestnet")?;
//! println!("{} -> {}", network.name, network.url);
//! # Ok(())
//! # }
//! ```

use std::{collections::BTreeMap, path::PathBuf, str::FromStr};

use ethers::signers::{coins_bip39::English, MnemonicBuilder};
use serde::Serialize;

use crate::{
    bindings::{BindingOutput, BindingTarget},
    compiler::CompilerSettings,
    declarations::{
        AccountsDeclaration, Declarations, Declared, ForkingDeclaration, NetworkDeclaration,
    },
    error::ConfigError,
    network::{
        check_chain_id, derivation_range, parse_endpoint, Accounts, Forking, HdAccounts,
        NetworkProfile, SigningKey, HD_INDEX_LIMIT,
    },
    secrets::{require, Secret, SecretSource},
    verification::VerificationKeys,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub networks: BTreeMap<String, NetworkProfile>,
    pub etherscan: VerificationKeys,
    pub solidity: CompilerSettings,
    pub typechain: BindingOutput,
}

impl Config {
    /// Assembles the built-in declarations with secrets from `source`.
    pub fn load<S: SecretSource + ?Sized>(source: &S) -> Result<Self, ConfigError> {
        Self::assemble(&Declarations::builtin(), source)
    }

    pub fn assemble<S: SecretSource + ?Sized>(
        declarations: &Declarations,
        source: &S,
    ) -> Result<Self, ConfigError> {
        let resolver = Resolver { source };

        let mut networks = BTreeMap::new();
        for (name, declaration) in &declarations.networks {
            let profile = resolver.network(name, declaration)?;
            networks.insert(name.clone(), profile);
        }

        let mut api_key = BTreeMap::new();
        for (service, declared) in &declarations.etherscan.api_key {
            let key = resolver.string(&format!("etherscan.api_key.{service}"), declared)?;
            api_key.insert(service.clone(), Secret::new(key));
        }

        declarations.solidity.validate()?;

        let typechain = BindingOutput {
            out_dir: PathBuf::from(&declarations.typechain.out_dir),
            target: BindingTarget::from_str(&declarations.typechain.target)?,
        };

        log::info!(
            "loaded {} network(s), {} verification key(s), solc {}",
            networks.len(),
            api_key.len(),
            declarations.solidity.version
        );

        Ok(Self {
            networks,
            etherscan: VerificationKeys { api_key },
            solidity: declarations.solidity.clone(),
            typechain,
        })
    }

    /// Selects a network by its unique name.
    pub fn network(&self, name: &str) -> Result<&NetworkProfile, ConfigError> {
        self.networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_owned()))
    }

    pub fn network_names(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }

    /// Pretty JSON with secret material redacted.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

struct Resolver<'a, S: ?Sized> {
    source: &'a S,
}

impl<S: SecretSource + ?Sized> Resolver<'_, S> {
    /// `path` names a literal's position in the declarations; a secret
    /// reference is reported by its own key.
    fn string(&self, path: &str, declared: &Declared<String>) -> Result<String, ConfigError> {
        match declared {
            Declared::Literal(value) => {
                if value.trim().is_empty() {
                    return Err(ConfigError::missing(path));
                }
                Ok(value.clone())
            }
            Declared::Env { env } => require(self.source, env),
        }
    }

    fn number(&self, path: &str, declared: &Declared<u64>) -> Result<(String, u64), ConfigError> {
        match declared {
            Declared::Literal(value) => Ok((path.to_owned(), *value)),
            Declared::Env { env } => {
                let raw = require(self.source, env)?;
                let value = raw
                    .parse::<u64>()
                    .map_err(|e| ConfigError::invalid(env, format!("`{raw}` is not numeric: {e}")))?;
                Ok((env.clone(), value))
            }
        }
    }

    /// Key used to report a malformed value: the secret key, else `path`.
    fn key_of<'d, T>(path: &'d str, declared: &'d Declared<T>) -> &'d str {
        declared.env_key().unwrap_or(path)
    }

    fn endpoint(
        &self,
        path: &str,
        declared: &Declared<String>,
    ) -> Result<url::Url, ConfigError> {
        let raw = self.string(path, declared)?;
        parse_endpoint(Self::key_of(path, declared), &raw)
    }

    fn network(
        &self,
        name: &str,
        declaration: &NetworkDeclaration,
    ) -> Result<NetworkProfile, ConfigError> {
        let prefix = format!("networks.{name}");

        let url = self.endpoint(&format!("{prefix}.url"), &declaration.url)?;
        let (chain_key, chain_id) =
            self.number(&format!("{prefix}.chain_id"), &declaration.chain_id)?;
        let chain_id = check_chain_id(&chain_key, chain_id)?;

        let accounts = self.accounts(&prefix, &declaration.accounts)?;

        let gas_price = match &declaration.gas_price {
            Some(declared) => Some(self.number(&format!("{prefix}.gas_price"), declared)?.1),
            None => None,
        };

        let forking = match &declaration.forking {
            Some(forking) => Some(self.forking(&prefix, forking)?),
            None => None,
        };

        log::debug!("resolved network {name} (chain {chain_id})");
        Ok(NetworkProfile {
            name: name.to_owned(),
            url,
            chain_id,
            accounts,
            gas_price,
            forking,
            allow_unlimited_contract_size: declaration.allow_unlimited_contract_size,
        })
    }

    fn accounts(
        &self,
        prefix: &str,
        declaration: &AccountsDeclaration,
    ) -> Result<Accounts, ConfigError> {
        match declaration {
            AccountsDeclaration::Keys(keys) => {
                let mut resolved = Vec::with_capacity(keys.len());
                for (i, declared) in keys.iter().enumerate() {
                    let path = format!("{prefix}.accounts[{i}]");
                    let raw = self.string(&path, declared)?;
                    resolved.push(SigningKey::parse(Self::key_of(&path, declared), &raw)?);
                }
                Ok(Accounts::Keys(resolved))
            }
            AccountsDeclaration::Mnemonic(m) => {
                let path = format!("{prefix}.accounts.mnemonic");
                let phrase = self.string(&path, &m.mnemonic)?;
                if m.count == 0 {
                    return Err(ConfigError::invalid(
                        format!("{prefix}.accounts.count"),
                        "account count must be positive",
                    ));
                }
                if derivation_range(m.initial_index, m.count).is_none() {
                    return Err(ConfigError::invalid(
                        format!("{prefix}.accounts.initial_index"),
                        format!(
                            "{} account(s) from index {} must stay below index {HD_INDEX_LIMIT}",
                            m.count, m.initial_index
                        ),
                    ));
                }
                // deriving the first account validates the phrase up front
                MnemonicBuilder::<English>::default()
                    .phrase(phrase.as_str())
                    .index(m.initial_index)
                    .and_then(|b| b.build())
                    .map_err(|e| ConfigError::invalid(Self::key_of(&path, &m.mnemonic), e))?;
                Ok(Accounts::Mnemonic(HdAccounts {
                    mnemonic: Secret::new(phrase),
                    count: m.count,
                    initial_index: m.initial_index,
                }))
            }
        }
    }

    fn forking(&self, prefix: &str, declaration: &ForkingDeclaration) -> Result<Forking, ConfigError> {
        let url = self.endpoint(&format!("{prefix}.forking.url"), &declaration.url)?;
        Ok(Forking {
            url,
            block_number: declaration.block_number,
            enabled: declaration.enabled,
        })
    }
}
