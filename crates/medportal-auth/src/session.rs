//! Session state and the authentication collaborator contract.
//!
//! The session is owned by the authentication layer (token validation,
//! sign-in, sign-out). The gate only ever reads it through [`AuthSession`].

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::role::Role;

// =============================================================================
// User Identity
// =============================================================================

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// User's unique identifier.
    pub id: String,

    /// Email address used to sign in.
    pub email: String,

    /// The user's portal role.
    pub role: Role,
}

impl UserIdentity {
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
        }
    }
}

// =============================================================================
// Session State
// =============================================================================

/// Snapshot of the authentication state.
///
/// `user` is only meaningful once `loading` is `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// The signed-in user, if any.
    pub user: Option<UserIdentity>,

    /// `true` while the session is still being resolved (e.g. a stored token
    /// is being validated on page load).
    pub loading: bool,
}

impl SessionState {
    /// State while the authentication layer is still resolving.
    #[must_use]
    pub fn resolving() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    /// Resolved state with nobody signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            user: None,
            loading: false,
        }
    }

    /// Resolved state with a signed-in user.
    #[must_use]
    pub fn authenticated(user: UserIdentity) -> Self {
        Self {
            user: Some(user),
            loading: false,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns `true` once resolved with a user present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.loading && self.user.is_some()
    }

    /// Role of the signed-in user.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

// =============================================================================
// Authentication Collaborator
// =============================================================================

/// Contract of the authentication layer as seen by the gate.
pub trait AuthSession: Send + Sync {
    /// Current session snapshot.
    fn state(&self) -> SessionState;

    /// Ends the current session.
    fn sign_out(&self);
}

/// In-process session holder.
///
/// Readers get consistent snapshots without locking; transitions replace the
/// whole state at once.
#[derive(Debug, Clone)]
pub struct SharedSession {
    state: Arc<ArcSwap<SessionState>>,
}

impl SharedSession {
    #[must_use]
    pub fn new(state: SessionState) -> Self {
        Self {
            state: Arc::new(ArcSwap::from_pointee(state)),
        }
    }

    /// A session that has not finished resolving yet.
    #[must_use]
    pub fn resolving() -> Self {
        Self::new(SessionState::resolving())
    }

    /// Finishes the loading window with the validated user (or none).
    pub fn resolve(&self, user: Option<UserIdentity>) {
        match &user {
            Some(u) => tracing::info!(user_id = %u.id, role = %u.role, "Session resolved"),
            None => tracing::info!("Session resolved without a user"),
        }
        self.state.store(Arc::new(SessionState {
            user,
            loading: false,
        }));
    }

    /// Signs a user in, replacing any previous session.
    pub fn sign_in(&self, user: UserIdentity) {
        self.resolve(Some(user));
    }
}

impl Default for SharedSession {
    fn default() -> Self {
        Self::resolving()
    }
}

impl AuthSession for SharedSession {
    fn state(&self) -> SessionState {
        (**self.state.load()).clone()
    }

    fn sign_out(&self) {
        let previous = self.state.swap(Arc::new(SessionState::anonymous()));
        if let Some(user) = &previous.user {
            tracing::info!(user_id = %user.id, role = %user.role, "Signed out");
        }
    }
}
