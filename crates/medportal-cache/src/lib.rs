//! TTL read-cache for MedPortal API reads.
//!
//! Service read wrappers consult an [`ApiCache`] before issuing a network
//! request and invalidate it after writes. Each entry expires after its own
//! TTL; expired entries are dropped lazily when read.
//!
//! ## Cache Keys
//!
//! [`cache_key`] combines an endpoint with its query parameters. Parameters
//! are serialized with sorted object keys so that equal parameter sets map
//! to the same key.
//!
//! ## Invalidation
//!
//! `invalidate(Some(pattern))` removes every key containing `pattern` as a
//! substring, so a write to `/pharmacy/medicines` can drop every cached list
//! and detail read under that endpoint. `invalidate(None)` clears everything.
//!
//! The cache is purely a speed optimization: a disabled cache
//! ([`ApiCache::disabled`]) always misses and the system behaves the same.

pub mod clock;
pub mod config;
pub mod key;
pub mod store;
pub mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, ConfigError};
pub use key::cache_key;
pub use store::{ApiCache, CacheStats, DEFAULT_TTL};
pub use ttl::{ResourceClass, ResourceTtls, ttl_millis};
