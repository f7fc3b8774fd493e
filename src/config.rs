//! Configuration management for ForgeChain

use crate::error::{ChainError, Result};
use crate::miner::SearchBudget;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mining: MiningConfig,
    #[serde(default)]
    pub node: NodeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Limits for a single `mine` request. Zero disables a limit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MiningConfig {
    #[serde(default)]
    pub timeout_ms: u64,
    #[serde(default)]
    pub max_attempts: u64,
}

impl MiningConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Search budget for one proof search; the caller supplies any token.
    pub fn budget(&self) -> SearchBudget {
        let budget = SearchBudget::unbounded();
        if self.max_attempts > 0 {
            budget.with_max_attempts(self.max_attempts)
        } else {
            budget
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeConfig {
    /// Reward address for this node; a random one is generated when empty.
    #[serde(default)]
    pub identifier: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Load configuration from `path`, falling back to defaults when the file is
/// absent. The `PORT` environment variable overrides `server.port`.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let mut config: Config = match fs::read_to_string(path) {
        Ok(text) => toml::from_str(&text)?,
        Err(e) if e.kind() == ErrorKind::NotFound => Config::default(),
        Err(e) => return Err(e.into()),
    };

    if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        config.server.port = port;
    }

    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ChainError::Config("server.host must not be empty".to_string()));
        }
        Ok(())
    }
}
