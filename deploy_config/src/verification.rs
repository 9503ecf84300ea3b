use std::collections::BTreeMap;

use serde::Serialize;

use crate::secrets::Secret;

/// Source-verification API keys, keyed by service/network name (e.g. `arbitrumOne`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationKeys {
    pub api_key: BTreeMap<String, Secret>,
}

impl VerificationKeys {
    pub fn get(&self, service: &str) -> Option<&Secret> {
        self.api_key.get(service)
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.api_key.keys().map(String::as_str)
    }
}
