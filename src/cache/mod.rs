//! Caching subsystem.
//!
//! - [`response::ResponseCache`] - content-keyed cache of successful
//!   provider responses with TTL expiry and capacity-bounded eviction.
//!   Owned by the [`RequestOrchestrator`](crate::RequestOrchestrator) and
//!   reconfigurable at runtime via
//!   [`configure_cache()`](crate::RequestOrchestrator::configure_cache).

pub mod response;

pub use response::{CacheConfig, CacheEntry, CacheKey, CacheStats, ResponseCache, compute_key};
