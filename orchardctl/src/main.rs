//! `orchardctl`: drive the Orchard API from the command line

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;
use orchard_client::{ApiClient, ClientConfig, ClientError};

use commands::Command;

#[derive(Parser)]
#[command(name = "orchardctl", about = "Orchard investment platform client", version)]
struct Cli {
    /// Path to a config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true, env = "ORCHARD_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("orchard_client", LevelFilter::Debug)
        .filter_module("orchardctl", LevelFilter::Debug)
        .init();
}

fn build_client(cli: &Cli) -> Result<ApiClient> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_base_url(api_url)?;
    }
    Ok(ApiClient::builder(config).file_storage()?.build()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    } else {
        init_logger();
    }

    let cli = Cli::parse();
    let client = build_client(&cli)?;

    match cli.command.execute(&client).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if e
                .downcast_ref::<ClientError>()
                .is_some_and(ClientError::is_auth_lost)
            {
                eprintln!("Session expired or missing. Run `orchardctl login` first.");
            }
            Err(e)
        }
    }
}
