//! Route guard and access gate.
//!
//! A [`RouteGuard`] names the roles allowed to see a protected view. The
//! [`AccessGate`] turns a guard, the current session and the requested path
//! into a [`GateDecision`]:
//!
//! | session                         | decision                         |
//! |---------------------------------|----------------------------------|
//! | `loading`                       | [`GateDecision::Loading`]        |
//! | resolved, no user               | [`GateDecision::Redirect`]       |
//! | user whose role is not allowed  | [`GateDecision::Unauthorized`]   |
//! | user whose role is allowed      | [`GateDecision::Render`]         |
//!
//! Protected content is never rendered while the session is loading. If the
//! authentication layer never finishes resolving, the gate keeps answering
//! `Loading`.
//!
//! # Example
//!
//! ```
//! use medportal_auth::{AccessGate, GateDecision, Role, RouteGuard, SessionState, UserIdentity};
//!
//! let gate = AccessGate::default();
//! let billing = RouteGuard::new([Role::Admin, Role::Receptionist]);
//!
//! let session = SessionState::authenticated(UserIdentity::new("1", "a@x.org", Role::Admin));
//! assert_eq!(gate.evaluate(&billing, &session, "/admin/bills"), GateDecision::Render);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::login::LoginRoutes;
use crate::role::Role;
use crate::session::{AuthSession, SessionState};

// =============================================================================
// Route Guard
// =============================================================================

/// Roles permitted to view a protected route.
///
/// An empty guard authorizes nobody.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    allowed_roles: BTreeSet<Role>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed_roles: roles.into_iter().collect(),
        }
    }

    /// Guard admitting a single role.
    #[must_use]
    pub fn only(role: Role) -> Self {
        Self::new([role])
    }

    #[must_use]
    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }
}

// =============================================================================
// Decisions
// =============================================================================

/// Client-side navigation emitted by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    /// Target path.
    pub to: String,

    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl Redirect {
    /// A redirect replacing the current history entry.
    #[must_use]
    pub fn replace(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            replace: true,
        }
    }
}

/// Page shown to a signed-in user whose role is not allowed on a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnauthorizedView {
    /// Role of the signed-in user.
    pub role: Role,

    /// Target of the "go to my dashboard" action.
    pub dashboard_path: String,

    /// Where the user lands after signing out.
    pub login_path: String,
}

impl UnauthorizedView {
    /// Runs the sign-out action: ends the session and sends the user to
    /// their portal's login page.
    pub fn sign_out(&self, session: &dyn AuthSession) -> Redirect {
        session.sign_out();
        Redirect::replace(self.login_path.clone())
    }

    /// The "go to my dashboard" action.
    #[must_use]
    pub fn go_to_dashboard(&self) -> Redirect {
        Redirect::replace(self.dashboard_path.clone())
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    /// Session still resolving; show a neutral placeholder.
    Loading,
    /// Not signed in; navigate to a login page.
    Redirect(Redirect),
    /// Signed in with a role the route does not allow.
    Unauthorized(UnauthorizedView),
    /// Render the protected content.
    Render,
}

impl GateDecision {
    /// Returns `true` if the protected content may be rendered.
    #[must_use]
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render)
    }

    /// Redirect target if this is a redirect.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Redirect(redirect) => Some(&redirect.to),
            _ => None,
        }
    }
}

// =============================================================================
// Access Gate
// =============================================================================

/// Authorization decision point for protected routes.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    login_routes: Arc<LoginRoutes>,
}

impl AccessGate {
    #[must_use]
    pub fn new(login_routes: Arc<LoginRoutes>) -> Self {
        Self { login_routes }
    }

    /// Gate over the configured login routes.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the config fails validation.
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        config.validate()?;
        Ok(Self::new(Arc::new(LoginRoutes::from_config(config))))
    }

    /// Decides what to show for `path` given the session snapshot.
    ///
    /// This is a pure function of its inputs; the only side effect is
    /// diagnostic logging.
    #[must_use]
    pub fn evaluate(&self, guard: &RouteGuard, session: &SessionState, path: &str) -> GateDecision {
        if session.loading {
            tracing::debug!(path, "Session resolving, holding protected route");
            return GateDecision::Loading;
        }

        let Some(user) = &session.user else {
            let to = self.login_routes.resolve(path);
            tracing::info!(path, redirect = to, "Unauthenticated access, redirecting to login");
            return GateDecision::Redirect(Redirect::replace(to));
        };

        if !guard.allows(user.role) {
            tracing::info!(
                path,
                user_id = %user.id,
                role = %user.role,
                allowed = ?guard.allowed_roles,
                "Role not allowed on route"
            );
            return GateDecision::Unauthorized(UnauthorizedView {
                role: user.role,
                dashboard_path: user.role.dashboard_path(),
                login_path: self.login_routes.login_path_for(user.role).to_string(),
            });
        }

        tracing::debug!(path, user_id = %user.id, role = %user.role, "Access granted");
        GateDecision::Render
    }

    /// Reads the current state from the authentication layer and evaluates it.
    #[must_use]
    pub fn check(&self, guard: &RouteGuard, session: &dyn AuthSession, path: &str) -> GateDecision {
        self.evaluate(guard, &session.state(), path)
    }
}
