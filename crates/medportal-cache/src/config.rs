//! Cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::store::DEFAULT_TTL;
use crate::ttl::ResourceTtls;

/// Read-cache configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [cache]
/// enabled = true
/// default_ttl = "30s"
///
/// [cache.resources]
/// appointments = "15s"
/// staff = "5m"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Disable to make every read go to the backend.
    pub enabled: bool,

    /// TTL for entries stored without an explicit TTL.
    #[serde(with = "humantime_serde")]
    pub default_ttl: Duration,

    /// Per-resource TTLs.
    pub resources: ResourceTtls,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: DEFAULT_TTL,
            resources: ResourceTtls::default(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl CacheConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the default TTL or any resource
    /// TTL is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_ttl.is_zero() {
            return Err(ConfigError::InvalidValue("default_ttl must be > 0".to_string()));
        }

        for (class, ttl) in self.resources.iter() {
            if ttl.is_zero() {
                return Err(ConfigError::InvalidValue(format!("resources.{class} must be > 0")));
            }
        }

        Ok(())
    }
}
