//! Role → permission token table.
//!
//! Fine-grained actions (issuing an invoice, dispensing a prescription) are
//! gated by permission tokens. Each role owns a fixed set of tokens; unknown
//! roles own none.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::role::Role;

/// Permission token names.
pub mod tokens {
    pub const VIEW_DASHBOARD: &str = "view_dashboard";

    pub const VIEW_APPOINTMENTS: &str = "view_appointments";
    pub const CREATE_APPOINTMENT: &str = "create_appointment";
    pub const UPDATE_APPOINTMENT: &str = "update_appointment";
    pub const CANCEL_APPOINTMENT: &str = "cancel_appointment";

    pub const VIEW_PATIENTS: &str = "view_patients";
    pub const CREATE_PATIENT: &str = "create_patient";
    pub const UPDATE_PATIENT: &str = "update_patient";

    pub const VIEW_INVOICES: &str = "view_invoices";
    pub const CREATE_INVOICE: &str = "create_invoice";
    pub const UPDATE_INVOICE: &str = "update_invoice";
    pub const REFUND_INVOICE: &str = "refund_invoice";

    pub const VIEW_PRESCRIPTIONS: &str = "view_prescriptions";
    pub const CREATE_PRESCRIPTION: &str = "create_prescription";
    pub const DISPENSE_PRESCRIPTION: &str = "dispense_prescription";

    pub const VIEW_MEDICINES: &str = "view_medicines";
    pub const MANAGE_MEDICINES: &str = "manage_medicines";

    pub const VIEW_LAB_ORDERS: &str = "view_lab_orders";
    pub const CREATE_LAB_ORDER: &str = "create_lab_order";
    pub const UPDATE_LAB_RESULTS: &str = "update_lab_results";

    pub const VIEW_STAFF: &str = "view_staff";
    pub const MANAGE_STAFF: &str = "manage_staff";

    pub const VIEW_REPORTS: &str = "view_reports";
    pub const MANAGE_SETTINGS: &str = "manage_settings";

    /// Every known token.
    pub const ALL: &[&str] = &[
        VIEW_DASHBOARD,
        VIEW_APPOINTMENTS,
        CREATE_APPOINTMENT,
        UPDATE_APPOINTMENT,
        CANCEL_APPOINTMENT,
        VIEW_PATIENTS,
        CREATE_PATIENT,
        UPDATE_PATIENT,
        VIEW_INVOICES,
        CREATE_INVOICE,
        UPDATE_INVOICE,
        REFUND_INVOICE,
        VIEW_PRESCRIPTIONS,
        CREATE_PRESCRIPTION,
        DISPENSE_PRESCRIPTION,
        VIEW_MEDICINES,
        MANAGE_MEDICINES,
        VIEW_LAB_ORDERS,
        CREATE_LAB_ORDER,
        UPDATE_LAB_RESULTS,
        VIEW_STAFF,
        MANAGE_STAFF,
        VIEW_REPORTS,
        MANAGE_SETTINGS,
    ];
}

fn builtin_tokens(role: Role) -> &'static [&'static str] {
    use tokens::*;

    match role {
        Role::Admin => ALL,
        Role::Doctor => &[
            VIEW_DASHBOARD,
            VIEW_APPOINTMENTS,
            UPDATE_APPOINTMENT,
            VIEW_PATIENTS,
            UPDATE_PATIENT,
            VIEW_PRESCRIPTIONS,
            CREATE_PRESCRIPTION,
            VIEW_MEDICINES,
            VIEW_LAB_ORDERS,
            CREATE_LAB_ORDER,
        ],
        Role::Receptionist => &[
            VIEW_DASHBOARD,
            VIEW_APPOINTMENTS,
            CREATE_APPOINTMENT,
            UPDATE_APPOINTMENT,
            CANCEL_APPOINTMENT,
            VIEW_PATIENTS,
            CREATE_PATIENT,
            UPDATE_PATIENT,
            VIEW_INVOICES,
            CREATE_INVOICE,
            UPDATE_INVOICE,
        ],
        Role::Pharmacist => &[
            VIEW_DASHBOARD,
            VIEW_PRESCRIPTIONS,
            DISPENSE_PRESCRIPTION,
            VIEW_MEDICINES,
            MANAGE_MEDICINES,
            VIEW_INVOICES,
            CREATE_INVOICE,
        ],
        Role::LabTechnician => &[
            VIEW_DASHBOARD,
            VIEW_PATIENTS,
            VIEW_LAB_ORDERS,
            UPDATE_LAB_RESULTS,
        ],
        Role::Patient => &[
            VIEW_APPOINTMENTS,
            CREATE_APPOINTMENT,
            CANCEL_APPOINTMENT,
            VIEW_INVOICES,
            VIEW_PRESCRIPTIONS,
            VIEW_LAB_ORDERS,
        ],
    }
}

static BUILTIN: LazyLock<PermissionTable> = LazyLock::new(|| {
    let roles = Role::ALL
        .into_iter()
        .map(|role| {
            let set = builtin_tokens(role).iter().map(|t| t.to_string()).collect();
            (role, set)
        })
        .collect();
    PermissionTable { roles }
});

/// Static mapping from role to the permission tokens it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTable {
    roles: HashMap<Role, HashSet<String>>,
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

impl PermissionTable {
    /// The process-wide built-in table.
    #[must_use]
    pub fn builtin() -> &'static PermissionTable {
        &BUILTIN
    }

    /// Built-in table with the config's per-role overrides applied.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the config fails validation,
    /// including overrides that name an unknown role.
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        config.validate()?;
        let mut table = Self::default();
        for (name, tokens) in &config.permissions {
            let role: Role = name.parse()?;
            tracing::debug!(%role, tokens = tokens.len(), "Overriding role permissions");
            table
                .roles
                .insert(role, tokens.iter().map(|t| t.trim().to_string()).collect());
        }
        Ok(table)
    }

    /// Returns `true` if `role` holds `permission`.
    ///
    /// Role strings that do not name a known role hold no permissions.
    #[must_use]
    pub fn has_permission(&self, role: &str, permission: &str) -> bool {
        match role.parse::<Role>() {
            Ok(role) => self.has_role_permission(role, permission),
            Err(_) => {
                tracing::debug!(role, permission, "Permission check for unknown role");
                false
            }
        }
    }

    /// Typed variant of [`has_permission`](Self::has_permission).
    #[must_use]
    pub fn has_role_permission(&self, role: Role, permission: &str) -> bool {
        self.roles
            .get(&role)
            .is_some_and(|set| set.contains(permission))
    }

    /// Returns `true` if `role` holds any of `permissions`.
    #[must_use]
    pub fn has_any_permission(&self, role: &str, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(role, p))
    }

    /// Returns `true` if `role` holds all of `permissions`.
    #[must_use]
    pub fn has_all_permissions(&self, role: &str, permissions: &[&str]) -> bool {
        permissions.iter().all(|p| self.has_permission(role, p))
    }

    /// Tokens held by `role`, sorted.
    #[must_use]
    pub fn permissions_for(&self, role: Role) -> Vec<&str> {
        let mut tokens: Vec<&str> = self
            .roles
            .get(&role)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default();
        tokens.sort_unstable();
        tokens
    }
}
