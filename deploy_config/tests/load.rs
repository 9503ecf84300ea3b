use std::{collections::HashMap, fs};

use deploy_config::{
    accounts::list_accounts,
    compiler::Optimizer,
    declarations::Declarations,
    network::{Accounts, SigningKey},
    secrets::JsonSecrets,
    Config, ConfigError,
};

const DEPLOY_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

const DECLARATIONS: &str = r#"
[networks.arbitrum]
url = { env = "ARBITRUM_URL" }
chain_id = 42161
accounts = [{ env = "ARBITRUM_DEPLOY_KEY" }]

[etherscan.api_key]
arbitrumOne = { env = "ARBISCAN_API_KEY" }

[typechain]
out_dir = "bindings"
"#;

fn secrets() -> HashMap<String, String> {
    HashMap::from([
        (
            "ARBITRUM_URL".to_owned(),
            "https://example-arbitrum.test/rpc".to_owned(),
        ),
        ("ARBITRUM_DEPLOY_KEY".to_owned(), DEPLOY_KEY.to_owned()),
        ("ARBISCAN_API_KEY".to_owned(), "abc".to_owned()),
    ])
}

#[test]
fn test_profile_fields_come_from_secrets() {
    let declarations = Declarations::from_toml_str(DECLARATIONS).unwrap();
    let config = Config::assemble(&declarations, &secrets()).unwrap();

    let arbitrum = config.network("arbitrum").unwrap();
    assert_eq!(arbitrum.url.as_str(), "https://example-arbitrum.test/rpc");
    assert_eq!(arbitrum.chain_id, 42161);
    assert_eq!(
        arbitrum.accounts,
        Accounts::Keys(vec![SigningKey::parse("ARBITRUM_DEPLOY_KEY", DEPLOY_KEY).unwrap()])
    );
    assert_eq!(arbitrum.gas_price, None);
    assert_eq!(arbitrum.forking, None);

    assert_eq!(config.network_names().collect::<Vec<_>>(), vec!["arbitrum"]);
    assert_eq!(config.typechain.out_dir.to_str(), Some("bindings"));
    assert_eq!(
        config.solidity.optimizer(),
        Optimizer {
            enabled: true,
            runs: 200
        }
    );
}

#[test]
fn test_missing_signing_key_fails_load() {
    let declarations = Declarations::from_toml_str(DECLARATIONS).unwrap();
    let mut source = secrets();
    source.remove("ARBITRUM_DEPLOY_KEY");

    let err = Config::assemble(&declarations, &source).unwrap_err();
    assert!(matches!(err, ConfigError::Missing { ref key } if key == "ARBITRUM_DEPLOY_KEY"));
    assert_eq!(
        err.to_string(),
        "missing required configuration value `ARBITRUM_DEPLOY_KEY`"
    );
}

#[test]
fn test_files_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let declarations_path = dir.path().join("networks.toml");
    let secrets_path = dir.path().join("env.json");
    fs::write(&declarations_path, DECLARATIONS).unwrap();
    fs::write(&secrets_path, serde_json::to_string(&secrets()).unwrap()).unwrap();

    let declarations = Declarations::from_toml_file(&declarations_path).unwrap();
    let source = JsonSecrets::from_file(&secrets_path).unwrap();
    let from_files = Config::assemble(&declarations, &source).unwrap();
    let from_memory = Config::assemble(&declarations, &secrets()).unwrap();

    assert_eq!(from_files, from_memory);
    assert_eq!(from_files.to_json().unwrap(), from_memory.to_json().unwrap());
}

#[tokio::test]
async fn test_accounts_of_loaded_network() {
    let declarations = Declarations::from_toml_str(DECLARATIONS).unwrap();
    let config = Config::assemble(&declarations, &secrets()).unwrap();

    let mut out: Vec<u8> = Vec::new();
    let listed = list_accounts(config.network("arbitrum").unwrap(), &mut out)
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266\n"
    );
}
