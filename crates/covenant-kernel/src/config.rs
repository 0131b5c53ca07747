//! Configuration loaded from `covenant.toml`.
//!
//! Every key is optional; a missing file section takes its defaults.
//!
//! ```toml
//! [catalog]
//! max_interfaces = 4096
//!
//! [resolver]
//! deny_warnings = false
//! cache_capacity = 256
//!
//! [engine]
//! strict_meta = true
//! max_slot_occurrences = 65535
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "covenant.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CovenantConfig {
    pub catalog: CatalogConfig,
    pub resolver: ResolverConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Upper bound on registered (name, version) pairs.
    pub max_interfaces: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_interfaces: 4096,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Fail compositions that produce any warning.
    pub deny_warnings: bool,
    /// Entries kept by [`crate::cache::ResolutionCache`]; 0 disables caching.
    pub cache_capacity: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            deny_warnings: false,
            cache_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reject meta entries the operation does not list.
    pub strict_meta: bool,
    /// Hard cap on occurrences in any one slot.
    pub max_slot_occurrences: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_meta: true,
            max_slot_occurrences: 0xFFFF,
        }
    }
}

impl CovenantConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: "<inline>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.max_interfaces == 0 {
            return Err(ConfigError::Invalid(
                "catalog.max_interfaces must be at least 1".to_string(),
            ));
        }
        if self.engine.max_slot_occurrences == 0 {
            return Err(ConfigError::Invalid(
                "engine.max_slot_occurrences must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
