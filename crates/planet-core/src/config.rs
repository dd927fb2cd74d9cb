//! Update configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::payload::LampType;

/// Default directory holding the stock firmware assets.
pub const DEFAULT_FIRMWARE_DIR: &str = "firmwares";

/// Configuration for an update session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Hostname or IP address of the bridge.
    pub destination: String,
    /// TCP port of the bridge. No default, the bridge is user-configured.
    pub port: u16,
    /// Lamp model, selects the stock firmware asset.
    pub lamp_type: Option<LampType>,
    /// Explicit firmware file, overrides the stock asset.
    pub firmware_path: Option<PathBuf>,
    /// Directory holding the stock assets.
    pub firmware_dir: PathBuf,
    /// Read deadline in seconds. None waits forever.
    pub read_timeout_secs: Option<u64>,
    /// Connect deadline in seconds. None uses the OS default.
    pub connect_timeout_secs: Option<u64>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            destination: String::new(),
            port: 0,
            lamp_type: None,
            firmware_path: None,
            firmware_dir: PathBuf::from(DEFAULT_FIRMWARE_DIR),
            read_timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

impl UpdateConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: UpdateConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Read deadline. Zero means no deadline, same as unset.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }

    /// Connect deadline. Zero means the OS default, same as unset.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }

    /// Firmware file this configuration points at.
    pub fn firmware_source(&self) -> Option<PathBuf> {
        match (&self.firmware_path, self.lamp_type) {
            (Some(path), _) => Some(path.clone()),
            (None, Some(lamp)) => Some(lamp.asset_path(&self.firmware_dir)),
            (None, None) => None,
        }
    }
}
