// Daemon configuration: identity from the environment, tuning from an
// optional TOML file

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HELLO_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_LSA_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Environment variable naming the optional tuning file.
pub const CONFIG_PATH_VAR: &str = "ROUTING_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_hello_interval")]
    pub hello_interval_secs: u64,
    #[serde(default = "default_lsa_interval")]
    pub lsa_interval_secs: u64,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_hello_interval() -> u64 {
    DEFAULT_HELLO_INTERVAL_SECS
}

fn default_lsa_interval() -> u64 {
    DEFAULT_LSA_INTERVAL_SECS
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            hello_interval_secs: DEFAULT_HELLO_INTERVAL_SECS,
            lsa_interval_secs: DEFAULT_LSA_INTERVAL_SECS,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// The local router id comes from `CONTAINER_NAME`; its absence is fatal.
pub fn router_id_from_env() -> Result<String> {
    std::env::var("CONTAINER_NAME")
        .ok()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::ConfigError("CONTAINER_NAME is not set".to_string()))
}

/// Loads the tuning file named by `ROUTING_CONFIG`, or compiled defaults
/// when the variable is unset. A named but unreadable file is a startup
/// error: misconfiguration is a deployment bug, not a runtime condition.
pub fn load() -> Result<DaemonConfig> {
    match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => read_config_file(Path::new(&path)),
        Err(_) => Ok(DaemonConfig::default()),
    }
}

fn read_config_file(path: &Path) -> Result<DaemonConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::ConfigError(format!("failed to read config file {}: {}", path.display(), e))
    })?;
    let config: DaemonConfig = toml::from_str(&content).map_err(|e| {
        AppError::ConfigError(format!("failed to parse config file {}: {}", path.display(), e))
    })?;
    log::debug!("loaded config from {}: {:?}", path.display(), config);
    Ok(config)
}
