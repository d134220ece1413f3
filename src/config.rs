//! Agent configuration: collection endpoint, check cadence, logging.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Collection endpoint for health reports
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    /// Seconds between posture checks
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    /// Logging
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_json")]
    pub json: bool,
}

fn default_api_endpoint() -> String {
    "http://localhost:3000/api/health-reports".to_string()
}

fn default_check_interval_secs() -> u64 {
    900
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_json() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            check_interval_secs: default_check_interval_secs(),
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_log_json(),
        }
    }
}

impl AgentConfig {
    /// Load from JSON file if present; otherwise return default. Fields the
    /// file omits keep their defaults, so a two-line config is enough.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<AgentConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }
}
