//! # medportal-auth
//!
//! Authorization core for the MedPortal hospital portals.
//!
//! This crate provides:
//! - The fixed set of portal [`Role`]s and their portal/dashboard paths
//! - The session contract consumed from the authentication collaborator
//! - A declarative login-path table resolved by longest prefix
//! - The route gate deciding between loading, redirect, unauthorized and render
//! - The static role → permission token table
//!
//! ## Overview
//!
//! Protected views are described by a [`RouteGuard`] (the roles allowed to see
//! them). Before rendering, the UI asks the [`AccessGate`] for a
//! [`GateDecision`] given the current [`SessionState`] and request path. The
//! gate is a pure function of its inputs and never mutates the session.
//!
//! ```
//! use medportal_auth::{AccessGate, GateDecision, Role, RouteGuard, SessionState};
//!
//! let gate = AccessGate::default();
//! let guard = RouteGuard::only(Role::Admin);
//!
//! let decision = gate.evaluate(&guard, &SessionState::anonymous(), "/admin/staff");
//! assert_eq!(decision.redirect_target(), Some("/admin/login"));
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Login routes and permission overrides
//! - [`guard`] - Route guard descriptor and the access gate
//! - [`login`] - Path prefix → login path table
//! - [`permissions`] - Role → permission token table
//! - [`role`] - Portal roles
//! - [`session`] - Session state and the authentication collaborator contract

pub mod config;
pub mod error;
pub mod guard;
pub mod login;
pub mod permissions;
pub mod role;
pub mod session;

pub use config::{AuthConfig, ConfigError};
pub use error::AuthError;
pub use guard::{AccessGate, GateDecision, Redirect, RouteGuard, UnauthorizedView};
pub use login::{LoginRoute, LoginRoutes};
pub use permissions::{PermissionTable, tokens};
pub use role::Role;
pub use session::{AuthSession, SessionState, SharedSession, UserIdentity};

/// Type alias for authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use medportal_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError};
    pub use crate::error::AuthError;
    pub use crate::guard::{AccessGate, GateDecision, Redirect, RouteGuard, UnauthorizedView};
    pub use crate::login::{LoginRoute, LoginRoutes};
    pub use crate::permissions::{PermissionTable, tokens};
    pub use crate::role::Role;
    pub use crate::session::{AuthSession, SessionState, SharedSession, UserIdentity};
}
