//! Coffer daemon entry point.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use coffer_rpc::RpcServer;
use coffer_service::{init_logging, CofferService, LogFormat, ServiceConfig};
use coffer_store_lmdb::LmdbStore;
use coffer_types::SystemClock;

#[derive(Parser)]
#[command(name = "coffer-daemon", about = "Interest-accruing value ledger daemon")]
struct Cli {
    /// Data directory for ledger storage.
    #[arg(long, env = "COFFER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// RPC server port.
    #[arg(long, env = "COFFER_RPC_PORT")]
    rpc_port: Option<u16>,

    /// LMDB map size in bytes.
    #[arg(long, env = "COFFER_MAP_SIZE")]
    map_size: Option<usize>,

    /// Initial global accrual rate (raw per-second units). First start only;
    /// a populated store keeps its own rate.
    #[arg(long, env = "COFFER_INITIAL_RATE")]
    initial_rate: Option<u64>,

    /// Reserve vault address.
    #[arg(long, env = "COFFER_VAULT_ADDRESS")]
    vault_address: Option<String>,

    /// Owner principal; holds every capability.
    #[arg(long, env = "COFFER_OWNER")]
    owner: Option<String>,

    /// Principals granted mint-and-burn (comma-separated).
    #[arg(long, env = "COFFER_MINTERS", value_delimiter = ',')]
    minters: Vec<String>,

    /// Principals granted rate management (comma-separated).
    #[arg(long, env = "COFFER_RATE_MANAGERS", value_delimiter = ',')]
    rate_managers: Vec<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "COFFER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "COFFER_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. File settings are the base; CLI
    /// flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the daemon.
    Run,
    /// Write a starter configuration file and exit.
    Init {
        /// Where to write the file.
        #[arg(default_value = "coffer.toml")]
        path: PathBuf,
    },
}

/// Resolve the effective configuration: file as base, CLI on top.
fn load_config(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let base = match &cli.config {
        Some(path) => ServiceConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    Ok(ServiceConfig {
        data_dir: cli.data_dir.clone().unwrap_or(base.data_dir),
        rpc_port: cli.rpc_port.unwrap_or(base.rpc_port),
        map_size: cli.map_size.unwrap_or(base.map_size),
        initial_rate: cli.initial_rate.unwrap_or(base.initial_rate),
        vault_address: cli.vault_address.clone().unwrap_or(base.vault_address),
        owner: cli.owner.clone().or(base.owner),
        minters: if cli.minters.is_empty() {
            base.minters
        } else {
            cli.minters.clone()
        },
        rate_managers: if cli.rate_managers.is_empty() {
            base.rate_managers
        } else {
            cli.rate_managers.clone()
        },
        log_level: cli.log_level.clone().unwrap_or(base.log_level),
        log_format: cli.log_format.clone().unwrap_or(base.log_format),
        ..base
    })
}

fn init_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists, refusing to overwrite", path.display());
    }
    std::fs::write(path, ServiceConfig::default().to_toml_string())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("wrote starter config to {}", path.display());
    Ok(())
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    init_logging(LogFormat::parse(&config.log_format), &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "config file loaded");
    }
    tracing::info!(
        data_dir = %config.data_dir.display(),
        rpc_port = config.rpc_port,
        "starting coffer daemon"
    );

    let store = Arc::new(
        LmdbStore::open(&config.data_dir, config.map_size)
            .with_context(|| format!("opening store at {}", config.data_dir.display()))?,
    );
    let gate = Arc::new(config.role_table()?);
    let service = Arc::new(CofferService::open(
        &config,
        store,
        gate,
        Arc::new(SystemClock),
    )?);
    tracing::info!(vault = %service.vault(), rate = %service.global_rate(), "service ready");

    let server = RpcServer::new(config.rpc_port, service);
    server.start_with_shutdown(shutdown_signal()).await?;

    tracing::info!("coffer daemon exited cleanly");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "ctrl-c handler failed"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Command::Init { path } => init_config(path),
        Command::Run => run(&cli).await,
    }
}
