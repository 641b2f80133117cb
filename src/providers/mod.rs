//! Provider abstraction, registry, and capability routing.
//!
//! Concrete adapters (vendor HTTP clients, local runners) live outside this
//! crate and implement [`Provider`]; this module only keeps track of them
//! and decides which one serves a request.

pub mod registry;
pub mod routing;
pub mod traits;

pub use registry::ProviderRegistry;
pub use routing::{CapabilityRouter, HealthSnapshot, ProviderHealth, RoutingConfig, RoutingPolicy};
pub use traits::Provider;
