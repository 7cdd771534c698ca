//! Authorization error types.
//!
//! The gate itself has no error states; these errors surface only when
//! parsing external input (role strings) or building tables from config.

/// Errors that can occur while building authorization state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// A role string does not name any portal role.
    #[error("Unknown role: {role}")]
    UnknownRole {
        /// The role string as received.
        role: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `UnknownRole` error.
    #[must_use]
    pub fn unknown_role(role: impl Into<String>) -> Self {
        Self::UnknownRole { role: role.into() }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl From<crate::config::ConfigError> for AuthError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::unknown_role("nurse");
        assert_eq!(err.to_string(), "Unknown role: nurse");

        let err = AuthError::configuration("bad prefix");
        assert_eq!(err.to_string(), "Configuration error: bad prefix");
    }

    #[test]
    fn test_from_config_error() {
        let err: AuthError =
            crate::config::ConfigError::InvalidValue("fallback_login_path".into()).into();
        assert!(matches!(err, AuthError::Configuration { .. }));
        assert!(err.to_string().contains("fallback_login_path"));
    }
}
