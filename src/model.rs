//! Hardware model resolution.
//!
//! Maps a device's reported model identifier to a virtual-appliance profile
//! via an external JSON model map, defaulting every missing field. An
//! explicit offline mode classifies purely by hostname prefix instead; the
//! two strategies are exclusive variants of [`ModelResolver`] and never mix.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPLATE: &str = "viosl2";
pub const DEFAULT_IMAGE: &str = "viosl2-adventerprisek9-m.SSA.high_iron_20180619";
pub const DEFAULT_RAM: u32 = 2048;
pub const DEFAULT_ICON: &str = "Router.png";

const ROUTER_TEMPLATE: &str = "csr1000vng";
const ROUTER_IMAGE: &str = "csr1000vng-universalk9.17.03.02.Amsterdam";
const SWITCH_ICON: &str = "Switch.png";

/// Virtual-appliance parameters attached to a lab node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplianceProfile {
    pub template: String,
    #[serde(rename = "eve_image")]
    pub image: String,
    pub ram: u32,
    pub icon: String,
}

impl Default for ApplianceProfile {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            ram: DEFAULT_RAM,
            icon: DEFAULT_ICON.to_string(),
        }
    }
}

impl ApplianceProfile {
    /// Router defaults used by the hostname-prefix resolver.
    pub fn router_default() -> Self {
        Self {
            template: ROUTER_TEMPLATE.to_string(),
            image: ROUTER_IMAGE.to_string(),
            ram: DEFAULT_RAM,
            icon: DEFAULT_ICON.to_string(),
        }
    }

    /// Switch defaults used by the hostname-prefix resolver.
    pub fn switch_default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            ram: DEFAULT_RAM,
            icon: SWITCH_ICON.to_string(),
        }
    }
}

/// Raw model-map entry as it appears in the JSON file. Every field is
/// optional and defaulted on load.
#[derive(Debug, Deserialize)]
struct ProfileSpec {
    eve_image: Option<String>,
    template: Option<String>,
    ram: Option<u32>,
    icon: Option<String>,
}

impl ProfileSpec {
    fn into_profile(self) -> ApplianceProfile {
        ApplianceProfile {
            template: self.template.unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
            image: self.eve_image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            ram: self.ram.unwrap_or(DEFAULT_RAM),
            icon: self.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        }
    }
}

/// External model-to-profile table, keyed by model identifier.
#[derive(Debug, Clone, Default)]
pub struct ModelMap {
    profiles: HashMap<String, ApplianceProfile>,
}

impl ModelMap {
    /// An empty map: every model resolves to the default profile.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a model map from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, ProfileSpec> = serde_json::from_str(json)?;
        Ok(Self::from_specs(raw))
    }

    /// Load a model map from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading model map from: {:?}", path);
        let file = File::open(path)
            .wrap_err_with(|| format!("Failed to open model map '{}'", path.display()))?;
        let raw: HashMap<String, ProfileSpec> = serde_json::from_reader(file)
            .wrap_err_with(|| format!("Failed to parse model map '{}'", path.display()))?;
        Ok(Self::from_specs(raw))
    }

    fn from_specs(raw: HashMap<String, ProfileSpec>) -> Self {
        let profiles = raw
            .into_iter()
            .map(|(model, spec)| (model, spec.into_profile()))
            .collect();
        Self { profiles }
    }

    pub fn get(&self, model: &str) -> Option<&ApplianceProfile> {
        self.profiles.get(model)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Profile resolution strategy. Table-driven resolution and the offline
/// hostname-prefix classification are an exclusive switch: a resolver is one
/// or the other for the whole run.
#[derive(Debug, Clone)]
pub enum ModelResolver {
    /// Resolve via the external model map, defaulting unknown models.
    Table(ModelMap),
    /// Offline mode: hostnames starting with "sw" get switch defaults,
    /// everything else router defaults. The model map is bypassed entirely.
    HostnamePrefix,
}

impl ModelResolver {
    /// Resolve a device's appliance profile. Never fails: unmapped or
    /// "unknown" models fall back to the full default profile.
    pub fn resolve(&self, hostname: &str, model: &str) -> ApplianceProfile {
        match self {
            Self::Table(map) => map.get(model).cloned().unwrap_or_default(),
            Self::HostnamePrefix => {
                if hostname.to_lowercase().starts_with("sw") {
                    ApplianceProfile::switch_default()
                } else {
                    ApplianceProfile::router_default()
                }
            }
        }
    }
}
