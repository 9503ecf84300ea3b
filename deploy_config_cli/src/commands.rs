use std::{io, path::Path};

use anyhow::{bail, Context, Result};
use deploy_config::{
    accounts::list_accounts, chain::verify_chain_id, sizer::measure_artifacts, Config,
};
use log::info;

pub fn networks(config: &Config) -> Result<()> {
    for profile in config.networks.values() {
        println!(
            "{:<24} {:>8}  {}",
            profile.name, profile.chain_id, profile.url
        );
    }
    Ok(())
}

pub fn show(config: &Config, network: Option<&str>) -> Result<()> {
    let json = match network {
        Some(name) => serde_json::to_string_pretty(config.network(name)?)?,
        None => config.to_json()?,
    };
    println!("{json}");
    Ok(())
}

pub async fn accounts(config: &Config, network: &str) -> Result<()> {
    let profile = config.network(network)?;
    let stdout = io::stdout();
    let listed = list_accounts(profile, &mut stdout.lock())
        .await
        .with_context(|| format!("failed to list accounts of {network}"))?;
    info!("{} account(s) on {network}", listed.len());
    Ok(())
}

pub fn bindings(config: &Config, artifacts: &Path) -> Result<()> {
    let root = std::env::current_dir()?;
    let out_dir = config.typechain.out_dir_in(&root);
    let generated = config
        .typechain
        .generate(artifacts, &out_dir)
        .context("failed to generate bindings")?;
    for contract in generated {
        println!("{contract}");
    }
    println!("bindings written to {}", out_dir.display());
    Ok(())
}

pub fn size(config: &Config, artifacts: &Path, network: Option<&str>) -> Result<()> {
    let allow_unlimited = match network {
        Some(name) => config.network(name)?.allow_unlimited_contract_size,
        None => false,
    };
    let report = measure_artifacts(artifacts, allow_unlimited)
        .with_context(|| format!("failed to read artifacts in {}", artifacts.display()))?;
    print!("{report}");

    if !report.is_deployable() {
        let names: Vec<&str> = report.oversized().map(|c| c.contract.as_str()).collect();
        bail!("contract(s) over the size limit: {}", names.join(", "));
    }
    Ok(())
}

pub async fn check_chain(config: &Config, network: &str) -> Result<()> {
    let profile = config.network(network)?;
    let served = verify_chain_id(profile).await?;
    println!("{network}: chain id {served} matches {}", profile.url);
    Ok(())
}
