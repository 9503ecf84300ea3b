use ethers::{
    providers::{Http, Middleware, Provider, ProviderError},
    types::U256,
};
use thiserror::Error;

use crate::network::NetworkProfile;

#[derive(Error, Debug)]
pub enum ChainCheckError {
    #[error("network {network} declares chain id {declared} but {url} serves {served}")]
    Mismatch {
        network: String,
        url: String,
        declared: u64,
        served: u64,
    },

    #[error("{url} reports chain id {served}, which does not fit in 64 bits")]
    ChainIdOverflow { url: String, served: U256 },

    #[error("failed to query chain id: {0}")]
    Provider(#[from] ProviderError),
}

/// Compares a chain id reported by the endpoint with the declared one.
pub fn check_served_chain_id(profile: &NetworkProfile, served: u64) -> Result<(), ChainCheckError> {
    if served != profile.chain_id {
        return Err(ChainCheckError::Mismatch {
            network: profile.name.clone(),
            url: profile.url.to_string(),
            declared: profile.chain_id,
            served,
        });
    }
    Ok(())
}

/// Narrows a reported chain id to `u64`.
pub fn served_chain_id(profile: &NetworkProfile, raw: U256) -> Result<u64, ChainCheckError> {
    if raw > U256::from(u64::MAX) {
        return Err(ChainCheckError::ChainIdOverflow {
            url: profile.url.to_string(),
            served: raw,
        });
    }
    Ok(raw.as_u64())
}

/// Asks the profile's endpoint for its chain id over HTTP.
///
/// Only the operator-invoked check calls this; loading never touches the
/// network.
pub async fn verify_chain_id(profile: &NetworkProfile) -> Result<u64, ChainCheckError> {
    let provider = Provider::new(Http::new(profile.url.clone()));
    let served = served_chain_id(profile, provider.get_chainid().await?)?;
    log::debug!("{} serves chain {served}", profile.url);

    check_served_chain_id(profile, served)?;
    Ok(served)
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::network::Accounts;

    fn arbitrum_one() -> NetworkProfile {
        NetworkProfile {
            name: "arbitrumMainNet".to_owned(),
            url: Url::parse("https://example-arbitrum.test/rpc").unwrap(),
            chain_id: 42161,
            accounts: Accounts::Keys(vec![]),
            gas_price: None,
            forking: None,
            allow_unlimited_contract_size: false,
        }
    }

    #[test]
    fn test_matching_chain_id() {
        assert!(check_served_chain_id(&arbitrum_one(), 42161).is_ok());
    }

    #[test]
    fn test_mismatched_chain_id() {
        let err = check_served_chain_id(&arbitrum_one(), 421613).unwrap_err();
        assert!(matches!(
            err,
            ChainCheckError::Mismatch { declared: 42161, served: 421613, .. }
        ));
        assert!(err.to_string().contains("arbitrumMainNet"));
    }

    #[test]
    fn test_served_chain_id_range() {
        let profile = arbitrum_one();
        assert_eq!(served_chain_id(&profile, U256::from(42161)).unwrap(), 42161);
        assert_eq!(
            served_chain_id(&profile, U256::from(u64::MAX)).unwrap(),
            u64::MAX
        );

        let err = served_chain_id(&profile, U256::MAX).unwrap_err();
        assert!(matches!(err, ChainCheckError::ChainIdOverflow { .. }));
        assert!(err.to_string().contains("64 bits"));
    }
}
