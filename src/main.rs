//! Remitdash main entry point

use anyhow::Context;
use clap::Parser;
use remitdash_api::{start_server, AppState};
use remitdash_client::{session_store, ApiClient, ApiRecordSource};
use remitdash_config::Config;
use remitdash_core::Dashboard;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "remitdash")]
#[command(author = "Remitdash Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Role-based dashboard for cross-border transactions and audit logs", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = Config::load_or_default(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    // RUST_LOG wins over logging.level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level))
        .init();
    if !args.config.exists() {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }
    log::info!("Config loaded: records API at {}", config.api.base_url);

    let rt = Runtime::new()?;
    rt.block_on(async {
        let client = ApiClient::new(&config.api).context("Failed to create API client")?;
        let source = Arc::new(ApiRecordSource::new(client.clone()));
        let dashboard = Dashboard::new(&config, source)?.shared();
        let sessions = session_store(&config.session);

        let state = AppState::new(config, dashboard, sessions, client);
        start_server(state).await.context("Server error")
    })
}
