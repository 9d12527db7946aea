//! Configuration file loading and merging with command-line arguments

use anyhow::{Context, Result};
use knx_log_decoder::MonitorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration (loaded from a TOML file)
///
/// ```toml
/// url = "ip:192.168.1.10"
/// group_file = "/etc/knx/groups.csv"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// knxd URL (`ip:host[:port]` or `local:/path`)
    #[serde(default)]
    pub url: Option<String>,
    /// ETS group address export
    #[serde(default)]
    pub group_file: Option<PathBuf>,
    /// Stop after this many telegrams
    #[serde(default)]
    pub max_telegrams: Option<usize>,
}

impl AppConfig {
    /// Overlay values given on the command line; they take precedence
    pub fn merge(
        self,
        url: Option<String>,
        group_file: Option<PathBuf>,
        max_telegrams: Option<usize>,
    ) -> Self {
        Self {
            url: url.or(self.url),
            group_file: group_file.or(self.group_file),
            max_telegrams: max_telegrams.or(self.max_telegrams),
        }
    }

    /// Library configuration for the monitor loop
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            group_file: self.group_file.clone(),
            max_telegrams: self.max_telegrams,
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
