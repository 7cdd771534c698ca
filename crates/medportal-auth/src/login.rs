//! Login-path resolution.
//!
//! Maps the path an unauthenticated user tried to open onto the login page
//! of the portal that path belongs to. The mapping is an ordered table of
//! `(prefix, login_path)` pairs evaluated by longest prefix.

use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::role::Role;

/// One entry of the login-path table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRoute {
    /// Request path prefix, e.g. `/pharmacy`.
    pub prefix: String,

    /// Login page for paths under `prefix`.
    pub login_path: String,
}

impl LoginRoute {
    #[must_use]
    pub fn new(prefix: impl Into<String>, login_path: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            login_path: login_path.into(),
        }
    }

    /// One route per portal role: `<portal>` → `<portal>/login`.
    #[must_use]
    pub fn builtin() -> Vec<LoginRoute> {
        Role::ALL
            .into_iter()
            .map(|role| {
                let prefix = role.portal_prefix();
                LoginRoute::new(prefix, format!("{prefix}/login"))
            })
            .collect()
    }
}

/// Ordered login-path table with a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRoutes {
    routes: Vec<LoginRoute>,
    fallback: String,
}

impl Default for LoginRoutes {
    fn default() -> Self {
        Self::new(LoginRoute::builtin(), "/")
    }
}

impl LoginRoutes {
    #[must_use]
    pub fn new(routes: Vec<LoginRoute>, fallback: impl Into<String>) -> Self {
        Self {
            routes,
            fallback: fallback.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.login_routes.clone(), config.fallback_login_path.clone())
    }

    /// Login path for `path`.
    ///
    /// The longest matching prefix wins; among equally long prefixes the
    /// first in table order wins. Paths matching no prefix resolve to the
    /// fallback.
    #[must_use]
    pub fn resolve(&self, path: &str) -> &str {
        let mut best: Option<&LoginRoute> = None;
        for route in &self.routes {
            if !path.starts_with(route.prefix.as_str()) {
                continue;
            }
            if best.is_none_or(|b| route.prefix.len() > b.prefix.len()) {
                best = Some(route);
            }
        }
        best.map_or(self.fallback.as_str(), |r| r.login_path.as_str())
    }

    /// Login page of `role`'s own portal.
    #[must_use]
    pub fn login_path_for(&self, role: Role) -> &str {
        self.resolve(role.portal_prefix())
    }

    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}
