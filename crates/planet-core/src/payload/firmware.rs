//! Firmware images and lamp models.
//!
//! The image is opaque: nothing but its length is interpreted. Which image
//! to flash depends on the lamp model.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::packet::packet_count;

#[derive(Error, Debug)]
pub enum FirmwareError {
    #[error("Unknown lamp type: {0} (expected 'pro' or 'compact')")]
    UnknownLampType(String),
    #[error("Failed to read firmware {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Supported lamp models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LampType {
    /// Planet Pro (12 channels).
    Pro,
    /// Planet Compact (12 channels).
    Compact,
}

impl LampType {
    /// File name of the firmware asset shipped for this model.
    pub fn asset_name(&self) -> &'static str {
        match self {
            LampType::Pro => "PLANET12Ch-V116.bin",
            LampType::Compact => "COMPACT12Ch-V117.bin",
        }
    }

    /// Location of the asset inside `dir`.
    pub fn asset_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(self.asset_name())
    }
}

impl fmt::Display for LampType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LampType::Pro => write!(f, "pro"),
            LampType::Compact => write!(f, "compact"),
        }
    }
}

impl FromStr for LampType {
    type Err = FirmwareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pro" => Ok(LampType::Pro),
            "compact" => Ok(LampType::Compact),
            _ => Err(FirmwareError::UnknownLampType(s.to_string())),
        }
    }
}

/// Raw firmware image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    data: Vec<u8>,
}

impl FirmwareImage {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Read an image from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FirmwareError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| FirmwareError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), size = data.len(), "Firmware loaded");
        Ok(Self { data })
    }

    /// Load the stock asset for `lamp` from `dir`.
    pub fn load_asset(lamp: LampType, dir: impl AsRef<Path>) -> Result<Self, FirmwareError> {
        Self::load(lamp.asset_path(dir))
    }

    /// Number of data packets (terminator excluded).
    pub fn packet_count(&self) -> usize {
        packet_count(self.data.len())
    }

    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl AsRef<[u8]> for FirmwareImage {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
