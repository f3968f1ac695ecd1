use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{NdistrbError, Result};

/// File name of the per-project configuration.
pub const PROJECT_CONFIG_FILE: &str = "ndistrb.toml";

/// Represents the source of a configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Default built-in value
    Default,
    /// From `<root>/ndistrb.toml`
    Project,
    /// From environment variable
    Environment(String),
}

/// Raw configuration as written in `ndistrb.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

/// Loads configuration from the project file and the environment
#[derive(Debug)]
pub struct ConfigLoader {
    use_environment: bool,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self { use_environment }
    }

    /// Get an environment variable, ignoring empty values
    pub fn get_env(&self, var: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }

        env::var(var).ok().filter(|s| !s.is_empty())
    }

    /// Get the `NDISTRB_*` override for a kebab-case config key
    pub fn get_env_config(&self, key: &str) -> Option<String> {
        let var = format!("NDISTRB_{}", key.to_uppercase().replace('-', "_"));
        self.get_env(&var)
    }

    /// Get a numeric `NDISTRB_*` override
    pub fn get_env_u64(&self, key: &str) -> Result<Option<u64>> {
        match self.get_env_config(key) {
            Some(value) => value.trim().parse::<u64>().map(Some).map_err(|_| {
                NdistrbError::Config(format!(
                    "NDISTRB_{} must be a number of seconds, got {:?}",
                    key.to_uppercase().replace('-', "_"),
                    value
                ))
            }),
            None => Ok(None),
        }
    }

    /// Load configuration from a TOML file; a missing file yields empty config
    pub fn load_config_file<P: AsRef<Path>>(&self, path: P) -> Result<RawConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(RawConfig::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| NdistrbError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: RawConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}
