//! Portal roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// A user's role in the hospital portal.
///
/// Each role owns one portal (a path prefix) with its own login page and
/// dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    Receptionist,
    Pharmacist,
    LabTechnician,
    Patient,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Doctor,
        Role::Receptionist,
        Role::Pharmacist,
        Role::LabTechnician,
        Role::Patient,
    ];

    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Receptionist => "receptionist",
            Role::Pharmacist => "pharmacist",
            Role::LabTechnician => "lab_technician",
            Role::Patient => "patient",
        }
    }

    /// Path prefix of the portal this role works in.
    #[must_use]
    pub const fn portal_prefix(self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Doctor => "/doctor",
            Role::Receptionist => "/reception",
            Role::Pharmacist => "/pharmacy",
            Role::LabTechnician => "/lab",
            Role::Patient => "/patient",
        }
    }

    /// Landing page of the role's portal.
    #[must_use]
    pub fn dashboard_path(self) -> String {
        format!("{}/dashboard", self.portal_prefix())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    /// Exact match on the wire name; case and surrounding whitespace are
    /// significant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AuthError::unknown_role(s))
    }
}
