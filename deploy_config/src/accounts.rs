use std::{io::Write, str::FromStr};

use async_trait::async_trait;
use ethers::{
    signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer, WalletError},
    types::Address,
    utils::to_checksum,
};
use thiserror::Error;

use crate::network::{Accounts, NetworkProfile};

#[derive(Error, Debug)]
pub enum SignerError {
    #[error("failed to derive signer: {0}")]
    Wallet(#[from] WalletError),

    #[error("account range {count} from index {initial_index} leaves the non-hardened indices")]
    IndexRange { initial_index: u32, count: u32 },

    #[error("failed to write account: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplies the signing identities of a network.
#[async_trait]
pub trait SignerProvider {
    async fn signers(&self) -> Result<Vec<LocalWallet>, SignerError>;
}

/// Signers derived locally from the profile's keys or mnemonic, bound to its
/// chain id.
#[async_trait]
impl SignerProvider for NetworkProfile {
    async fn signers(&self) -> Result<Vec<LocalWallet>, SignerError> {
        let wallets = match &self.accounts {
            Accounts::Keys(keys) => keys
                .iter()
                .map(|key| LocalWallet::from_str(key.expose()))
                .collect::<Result<Vec<_>, _>>()?,
            Accounts::Mnemonic(hd) => hd
                .indices()
                .ok_or(SignerError::IndexRange {
                    initial_index: hd.initial_index,
                    count: hd.count,
                })?
                .map(|index| {
                    MnemonicBuilder::<English>::default()
                        .phrase(hd.mnemonic.expose())
                        .index(index)?
                        .build()
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(wallets
            .into_iter()
            .map(|wallet| wallet.with_chain_id(self.chain_id))
            .collect())
    }
}

/// Public addresses of `signers`, in order. Iterating again yields the same
/// sequence.
pub fn addresses(signers: &[LocalWallet]) -> impl Iterator<Item = Address> + '_ {
    signers.iter().map(Signer::address)
}

/// Writes the address of every signer from `provider` to `out`, one
/// checksummed address per line.
pub async fn list_accounts<P, W>(provider: &P, out: &mut W) -> Result<Vec<Address>, SignerError>
where
    P: SignerProvider + ?Sized,
    W: Write,
{
    let signers = provider.signers().await?;

    let mut listed = Vec::with_capacity(signers.len());
    for address in addresses(&signers) {
        writeln!(out, "{}", to_checksum(&address, None))?;
        listed.push(address);
    }
    out.flush()?;

    log::debug!("listed {} account(s)", listed.len());
    Ok(listed)
}
