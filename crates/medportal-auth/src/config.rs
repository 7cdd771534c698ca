//! Authorization configuration.
//!
//! Controls the login-path table used for unauthenticated redirects and
//! optional per-role overrides of the built-in permission table.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::login::LoginRoute;
use crate::role::Role;

/// Root authorization configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// fallback_login_path = "/"
///
/// [[auth.login_routes]]
/// prefix = "/admin"
/// login_path = "/admin/login"
///
/// [auth.permissions]
/// receptionist = ["view_dashboard", "view_appointments"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Where unauthenticated users go when no login route matches.
    pub fallback_login_path: String,

    /// Path prefix → login page pairs.
    pub login_routes: Vec<LoginRoute>,

    /// Per-role permission overrides keyed by role name.
    /// Roles not listed keep their built-in permissions.
    pub permissions: HashMap<String, Vec<String>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            fallback_login_path: "/".to_string(),
            login_routes: LoginRoute::builtin(),
            permissions: HashMap::new(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

fn validate_path(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Missing(field.to_string()));
    }
    if !value.starts_with('/') {
        return Err(ConfigError::InvalidValue(format!(
            "{field} must start with '/': '{value}'"
        )));
    }
    Ok(())
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - A login path, prefix or the fallback path is empty or not absolute
    /// - Two login routes share the same prefix
    /// - A permission override names an unknown role or an empty token
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_path("fallback_login_path", &self.fallback_login_path)?;

        let mut prefixes = HashSet::new();
        for route in &self.login_routes {
            validate_path("login_routes.prefix", &route.prefix)?;
            validate_path("login_routes.login_path", &route.login_path)?;
            if !prefixes.insert(route.prefix.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "duplicate login route prefix: '{}'",
                    route.prefix
                )));
            }
        }

        for (role, tokens) in &self.permissions {
            role.parse::<Role>()
                .map_err(|_| ConfigError::InvalidValue(format!("Invalid role: '{role}'")))?;
            if tokens.iter().any(|t| t.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!(
                    "permissions.{role} contains an empty token"
                )));
            }
        }

        Ok(())
    }
}
