use serde::Deserialize;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: HttpCfg,
    #[serde(default)]
    pub vault: VaultCfg,
    #[serde(default)]
    pub pki: PkiCfg,
}

#[derive(Debug, Deserialize)]
pub struct HttpCfg {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaultCfg {
    /// Secret store REST API version appended to upload requests
    pub api_version: String,
    /// Upload request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for VaultCfg {
    fn default() -> Self {
        Self {
            api_version: "7.4".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PkiCfg {
    /// Password protecting exported PFX containers
    pub pfx_password: String,
    /// Friendly name embedded in exported PFX containers
    pub pfx_friendly_name: String,
}

impl Default for PkiCfg {
    fn default() -> Self {
        Self {
            pfx_password: String::new(),
            pfx_friendly_name: "certforge".to_string(),
        }
    }
}

impl Settings {
    pub fn load(config_path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(config_path)
            .map_err(|e| AppError::Config(format!("Failed to read {config_path}: {e}")))?;
        let settings = toml::from_str(&raw)
            .map_err(|e| AppError::Config(format!("Failed to parse {config_path}: {e}")))?;
        Ok(settings)
    }
}
