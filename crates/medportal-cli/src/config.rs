use medportal_auth::AuthConfig;
use medportal_cache::CacheConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MedportalConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Route gate and permission configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// API read-cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

impl MedportalConfig {
    pub fn validate(&self) -> Result<(), String> {
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        self.auth
            .validate()
            .map_err(|e| format!("auth config error: {e}"))?;
        self.cache
            .validate()
            .map_err(|e| format!("cache config error: {e}"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::MedportalConfig;
    use anyhow::{Context, Result, anyhow};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "medportal.toml";

    pub fn load_config(path: Option<&str>) -> Result<MedportalConfig> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                anyhow::ensure!(pathbuf.exists(), "config file not found: {p}");
                builder = builder.add_source(File::from(pathbuf));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., MEDPORTAL__CACHE__DEFAULT_TTL=10s
        builder = builder.add_source(
            Environment::with_prefix("MEDPORTAL")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder.build().context("config build error")?;
        let merged: MedportalConfig = cfg
            .try_deserialize()
            .context("config deserialize error")?;
        merged.validate().map_err(|e| anyhow!(e))?;
        Ok(merged)
    }
}
