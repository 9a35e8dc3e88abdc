use crate::catalog::Catalog;
use crate::error::Result;
use crate::paths;
use crate::types::ContractMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// How milestone contract violations are handled.
    #[serde(default)]
    pub mode: ContractMode,
    /// Currency preselected for new sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<String>,
    /// Catalog override, relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<PathBuf>,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            mode: ContractMode::default(),
            default_currency: None,
            catalog_file: None,
        }
    }
}

impl Config {
    /// Load `.onboard/config.yaml`; a missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn catalog_path(&self, root: &Path) -> PathBuf {
        match &self.catalog_file {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => paths::catalog_path(root),
        }
    }

    /// The catalog this project runs with: the override when present,
    /// otherwise the built-in one.
    pub fn load_catalog(&self, root: &Path) -> Result<Catalog> {
        Catalog::load_or_standard(&self.catalog_path(root))
    }
}
