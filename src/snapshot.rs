//! Device snapshot loading and normalization.
//!
//! The core consumes a fully materialized snapshot of all devices, collected
//! upstream over a management session and handed over as YAML. This module
//! parses the snapshot, strips domain suffixes from reported neighbors,
//! drops malformed entries (phones and peers without a usable name) and
//! validates hostname uniqueness before graph building starts.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info};
use serde::Deserialize;

/// A raw neighbor entry as reported by the device. Both fields are optional
/// here so a malformed entry skips, rather than failing the whole snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct NeighborRecord {
    #[serde(default)]
    pub local_interface: Option<String>,
    #[serde(default)]
    pub remote_host: Option<String>,
}

/// One collected device: hostname, reported model, optional raw
/// configuration text and its reported neighbor entries.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRecord {
    pub hostname: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub config: Option<String>,
    #[serde(default)]
    pub neighbors: Vec<NeighborRecord>,
}

fn default_model() -> String {
    "unknown".to_string()
}

impl DeviceRecord {
    /// Cleaned (local interface, bare remote hostname) pairs in reported
    /// order. Entries missing a local interface (phones, malformed rows) or
    /// a remote name (unknown peers) are skipped; domain suffixes are
    /// stripped; a repeated local interface keeps its position and takes the
    /// last reported remote.
    pub fn normalized_neighbors(&self) -> Vec<(String, String)> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut out: Vec<(String, String)> = Vec::new();

        for entry in &self.neighbors {
            let local = match entry.local_interface.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => name,
                _ => {
                    debug!("{}: skipping neighbor entry without local interface", self.hostname);
                    continue;
                }
            };
            let bare = entry
                .remote_host
                .as_deref()
                .map(str::trim)
                .and_then(|h| h.split('.').next())
                .unwrap_or("");
            if bare.is_empty() {
                debug!(
                    "{}: skipping neighbor on {} with no usable remote name",
                    self.hostname, local
                );
                continue;
            }

            match positions.get(local) {
                Some(&i) => out[i].1 = bare.to_string(),
                None => {
                    positions.insert(local.to_string(), out.len());
                    out.push((local.to_string(), bare.to_string()));
                }
            }
        }

        out
    }
}

/// A complete, consistent snapshot of all collected devices for one run.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub devices: Vec<DeviceRecord>,
}

/// Snapshot validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Device at position {0} has an empty hostname")]
    EmptyHostname(usize),
    #[error("Duplicate hostname in snapshot: {0}")]
    DuplicateHostname(String),
}

impl Snapshot {
    /// Parse a snapshot from YAML text and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_yaml::from_str(yaml)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Load and validate a snapshot from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading device snapshot from: {:?}", path);
        let file = File::open(path)
            .wrap_err_with(|| format!("Failed to open snapshot '{}'", path.display()))?;
        let snapshot: Snapshot = serde_yaml::from_reader(file)
            .wrap_err_with(|| format!("Failed to parse snapshot '{}'", path.display()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Validate the snapshot: hostnames must be non-empty and unique.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for (i, device) in self.devices.iter().enumerate() {
            if device.hostname.trim().is_empty() {
                return Err(ValidationError::EmptyHostname(i));
            }
            if !seen.insert(device.hostname.as_str()) {
                return Err(ValidationError::DuplicateHostname(device.hostname.clone()));
            }
        }
        Ok(())
    }
}
