// bin/educhain-node.rs - EduChain certificate authority node
use anyhow::Result;
use clap::Parser;
use educhain_core::{CertificateAuthority, EduChainRpcHandler, NodeConfig};
use educhain_rpc::{spawn_server, RpcConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "educhain-node")]
#[command(about = "EduChain certificate authority node", long_about = None)]
struct Args {
    /// Config file (.toml, .yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RPC bind host
    #[arg(long)]
    rpc_host: Option<String>,

    /// RPC port
    #[arg(short, long)]
    rpc_port: Option<u16>,

    /// Leading zero hex characters required of block hashes
    #[arg(short, long)]
    difficulty: Option<usize>,

    /// Genesis block message
    #[arg(long)]
    genesis_message: Option<String>,

    /// Log level
    #[arg(short, long)]
    log_level: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_file(path)?,
            None => NodeConfig::default(),
        };

        if let Some(host) = self.rpc_host {
            config.rpc_host = host;
        }
        if let Some(port) = self.rpc_port {
            config.rpc_port = port;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(message) = self.genesis_message {
            config.genesis_message = message;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse arguments
    let config = Args::parse().into_config()?;

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    // Validate config
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Config validation failed: {}", e))?;

    tracing::info!("Starting EduChain node v{}", educhain_core::VERSION);
    tracing::info!("Configuration:");
    tracing::info!("  RPC address: {}:{}", config.rpc_host, config.rpc_port);
    tracing::info!("  Difficulty: {}", config.difficulty);
    tracing::info!("  Genesis message: {}", config.genesis_message);

    let authority = CertificateAuthority::new(&config)?;
    let genesis_hash = authority.with_ledger(|ledger| ledger.genesis().hash.clone());
    tracing::info!("  Genesis hash: {}", genesis_hash);

    let rpc = RpcConfig {
        listen_addr: config.listen_addr()?,
    };
    let (_, handle) = spawn_server(rpc, EduChainRpcHandler::new(authority)).await?;

    // Set up shutdown handler
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Received shutdown signal, stopping RPC server");
                if let Err(e) = shutdown_handle.stop() {
                    tracing::error!("RPC server already stopped: {}", e);
                }
            }
            Err(err) => {
                tracing::error!("Unable to listen for shutdown signal: {}", err);
            }
        }
    });

    handle.stopped().await;
    tracing::info!("EduChain node stopped");
    Ok(())
}
