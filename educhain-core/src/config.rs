// config.rs - Configuration for educhain-core
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use educhain_common::{
    error::{EduChainError, EduChainResult},
    types::ledger::{DEFAULT_DIFFICULTY, DEFAULT_GENESIS_MESSAGE},
    validation::ValidationUtils,
};

/// Highest difficulty a node accepts; each step multiplies mining work by 16
pub const MAX_NODE_DIFFICULTY: usize = 6;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// RPC bind host
    pub rpc_host: String,

    /// RPC server port
    pub rpc_port: u16,

    /// Leading zero hex characters required of mined block hashes
    pub difficulty: usize,

    /// Text stored in the genesis payload
    pub genesis_message: String,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_host: "127.0.0.1".to_string(),
            rpc_port: 5000,
            difficulty: DEFAULT_DIFFICULTY,
            genesis_message: DEFAULT_GENESIS_MESSAGE.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl NodeConfig {
    /// Load from `.toml`, `.yaml`/`.yml` or `.json`; missing keys take defaults
    pub fn from_file(path: impl AsRef<Path>) -> EduChainResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let config = match extension.as_deref() {
            Some("toml") => toml::from_str(&raw)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)?,
            Some("json") => serde_json::from_str(&raw)?,
            _ => {
                return Err(EduChainError::config(format!(
                    "Unsupported config format: {}",
                    path.display()
                )))
            }
        };
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> EduChainResult<()> {
        ValidationUtils::validate_range(self.difficulty, 0, MAX_NODE_DIFFICULTY, "difficulty")
            .map_err(|e| EduChainError::config(e.to_string()))?;

        if self.genesis_message.trim().is_empty() {
            return Err(EduChainError::config("genesis_message cannot be empty"));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(EduChainError::config(format!(
                "log_level must be one of {:?}",
                LOG_LEVELS
            )));
        }

        self.listen_addr()?;
        Ok(())
    }

    /// RPC bind address
    pub fn listen_addr(&self) -> EduChainResult<SocketAddr> {
        format!("{}:{}", self.rpc_host, self.rpc_port)
            .parse()
            .map_err(|e| {
                EduChainError::config(format!(
                    "invalid rpc address {}:{}: {}",
                    self.rpc_host, self.rpc_port, e
                ))
            })
    }
}
