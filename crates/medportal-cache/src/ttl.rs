//! Per-resource TTL table.
//!
//! Frequently changing resources get short TTLs, rarely changing ones long
//! TTLs. The table is configuration data.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backend resource families read through the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    Appointments,
    Bills,
    LabOrders,
    Prescriptions,
    Medicines,
    Patients,
    Staff,
}

impl ResourceClass {
    pub const ALL: [ResourceClass; 7] = [
        ResourceClass::Appointments,
        ResourceClass::Bills,
        ResourceClass::LabOrders,
        ResourceClass::Prescriptions,
        ResourceClass::Medicines,
        ResourceClass::Patients,
        ResourceClass::Staff,
    ];

    /// Endpoint root of the resource.
    ///
    /// Reads build their keys from it and writes invalidate with it.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            ResourceClass::Appointments => "/appointments",
            ResourceClass::Bills => "/bills",
            ResourceClass::LabOrders => "/lab/orders",
            ResourceClass::Prescriptions => "/prescriptions",
            ResourceClass::Medicines => "/pharmacy/medicines",
            ResourceClass::Patients => "/patients",
            ResourceClass::Staff => "/staff",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceClass::Appointments => "appointments",
            ResourceClass::Bills => "bills",
            ResourceClass::LabOrders => "lab_orders",
            ResourceClass::Prescriptions => "prescriptions",
            ResourceClass::Medicines => "medicines",
            ResourceClass::Patients => "patients",
            ResourceClass::Staff => "staff",
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TTL per resource class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourceTtls {
    #[serde(with = "humantime_serde")]
    pub appointments: Duration,

    #[serde(with = "humantime_serde")]
    pub bills: Duration,

    #[serde(with = "humantime_serde")]
    pub lab_orders: Duration,

    #[serde(with = "humantime_serde")]
    pub prescriptions: Duration,

    #[serde(with = "humantime_serde")]
    pub medicines: Duration,

    #[serde(with = "humantime_serde")]
    pub patients: Duration,

    #[serde(with = "humantime_serde")]
    pub staff: Duration,
}

impl Default for ResourceTtls {
    fn default() -> Self {
        Self {
            appointments: Duration::from_secs(15),
            bills: Duration::from_secs(30),
            lab_orders: Duration::from_secs(30),
            prescriptions: Duration::from_secs(60),
            medicines: Duration::from_secs(120),
            patients: Duration::from_secs(60),
            staff: Duration::from_secs(300),
        }
    }
}

impl ResourceTtls {
    #[must_use]
    pub fn ttl_for(&self, class: ResourceClass) -> Duration {
        match class {
            ResourceClass::Appointments => self.appointments,
            ResourceClass::Bills => self.bills,
            ResourceClass::LabOrders => self.lab_orders,
            ResourceClass::Prescriptions => self.prescriptions,
            ResourceClass::Medicines => self.medicines,
            ResourceClass::Patients => self.patients,
            ResourceClass::Staff => self.staff,
        }
    }

    /// Iterates `(class, ttl)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceClass, Duration)> + '_ {
        ResourceClass::ALL.into_iter().map(|c| (c, self.ttl_for(c)))
    }
}

/// Whole milliseconds in `ttl`, saturating at `u64::MAX`.
#[must_use]
pub fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let ttls = ResourceTtls::default();
        assert_eq!(ttls.ttl_for(ResourceClass::Appointments), Duration::from_secs(15));
        assert_eq!(ttls.ttl_for(ResourceClass::Staff), Duration::from_secs(300));
        for (class, ttl) in ttls.iter() {
            if !matches!(class, ResourceClass::Appointments | ResourceClass::Staff) {
                assert!(
                    ttl >= Duration::from_secs(30) && ttl <= Duration::from_secs(120),
                    "{class}: {ttl:?}"
                );
            }
        }
    }

    #[test]
    fn test_appointments_expire_fastest() {
        let ttls = ResourceTtls::default();
        let shortest = ttls.iter().min_by_key(|(_, ttl)| *ttl).unwrap();
        let longest = ttls.iter().max_by_key(|(_, ttl)| *ttl).unwrap();
        assert_eq!(shortest.0, ResourceClass::Appointments);
        assert_eq!(longest.0, ResourceClass::Staff);
    }

    #[test]
    fn test_humantime_overrides() {
        let ttls: ResourceTtls = toml::from_str(
            r#"
            appointments = "5s"
            staff = "10m"
            "#,
        )
        .unwrap();
        assert_eq!(ttls.appointments, Duration::from_secs(5));
        assert_eq!(ttls.staff, Duration::from_secs(600));
        assert_eq!(ttls.bills, Duration::from_secs(30));
    }

    #[test]
    fn test_endpoints_share_portal_prefixes() {
        assert!(ResourceClass::Medicines.endpoint().starts_with("/pharmacy"));
        assert!(ResourceClass::LabOrders.endpoint().starts_with("/lab"));
    }

    #[test]
    fn test_ttl_millis_saturates() {
        assert_eq!(ttl_millis(Duration::from_secs(15)), 15_000);
        assert_eq!(ttl_millis(Duration::from_millis(1500)), 1_500);
        assert_eq!(ttl_millis(Duration::MAX), u64::MAX);
    }
}
