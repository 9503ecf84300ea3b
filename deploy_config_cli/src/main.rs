mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deploy_config::{
    declarations::Declarations,
    secrets::{EnvSecrets, JsonSecrets, SecretSource},
    Config,
};

#[derive(Parser)]
#[command(
    name = "deploy-config",
    version,
    about = "Inspect deployment networks, accounts and compiler settings"
)]
struct Cli {
    /// Declarations file (TOML). Defaults to the built-in networks.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Secrets file (`env.json`). Defaults to the environment and `.env`.
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    /// Log level (e.g. `debug`). Overrides `RUST_LOG`; defaults to `info`.
    #[arg(long, global = true)]
    log_level: Option<log::LevelFilter>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured networks
    Networks,
    /// Print the resolved configuration as JSON, secrets redacted
    Show {
        /// Only print this network
        #[arg(short, long)]
        network: Option<String>,
    },
    /// Print the addresses of a network's accounts
    Accounts {
        #[arg(short, long, default_value = "hardhat")]
        network: String,
    },
    /// Generate contract bindings from compilation artifacts
    Bindings {
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,
    },
    /// Report deployed contract sizes
    Size {
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,
        /// Apply this network's contract size policy
        #[arg(short, long)]
        network: Option<String>,
    },
    /// Compare a network's declared chain id with its endpoint
    CheckChain {
        #[arg(short, long)]
        network: String,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let declarations = match &cli.config {
        Some(path) => Declarations::from_toml_file(path)
            .with_context(|| format!("failed to read declarations {}", path.display()))?,
        None => Declarations::builtin(),
    };

    let secrets: Box<dyn SecretSource> = match &cli.secrets {
        Some(path) => Box::new(
            JsonSecrets::from_file(path)
                .with_context(|| format!("failed to read secrets {}", path.display()))?,
        ),
        None => Box::new(EnvSecrets::load()),
    };

    Config::assemble(&declarations, &secrets).context("failed to load configuration")
}

fn init_logger(level: Option<log::LevelFilter>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Networks => commands::networks(&config),
        Commands::Show { network } => commands::show(&config, network.as_deref()),
        Commands::Accounts { network } => commands::accounts(&config, &network).await,
        Commands::Bindings { artifacts } => commands::bindings(&config, &artifacts),
        Commands::Size { artifacts, network } => {
            commands::size(&config, &artifacts, network.as_deref())
        }
        Commands::CheckChain { network } => commands::check_chain(&config, &network).await,
    }
}
