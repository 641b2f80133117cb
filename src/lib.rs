//! Huginn - capability-routed, response-caching orchestrator for AI providers
//!
//! This crate registers interchangeable backend providers, selects one per
//! request based on the capability it declares, deduplicates identical
//! requests through a time- and size-bounded cache, and lets callers fall
//! back across providers explicitly. It does not talk to any vendor itself:
//! concrete adapters implement the [`Provider`] trait.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use huginn::{Capability, Provider, Request, RequestOrchestrator, Result};
//!
//! struct Greeter;
//!
//! #[async_trait]
//! impl Provider for Greeter {
//!     fn id(&self) -> &str {
//!         "greeter"
//!     }
//!
//!     fn capabilities(&self) -> &[Capability] {
//!         &[Capability::TextGeneration]
//!     }
//!
//!     async fn process(&self, _request: &Request) -> Result<String> {
//!         Ok("hello".to_string())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let orchestrator = RequestOrchestrator::builder()
//!         .provider(Arc::new(Greeter))
//!         .build()?;
//!
//!     let request = Request::new(Capability::TextGeneration, "hi");
//!     let first = orchestrator.dispatch(&request).await;
//!     let second = orchestrator.dispatch(&request).await;
//!
//!     assert_eq!(first.text, "hello");
//!     assert!(second.cached);
//!     assert_eq!(orchestrator.stats().hits, 1);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheKey, CacheStats, compute_key};
pub use config::OrchestratorConfig;
pub use error::{ErrorKind, HuginnError, Result};
pub use orchestrator::{DispatchHandle, OrchestratorBuilder, RequestOrchestrator};
pub use providers::{
    CapabilityRouter, HealthSnapshot, Provider, ProviderHealth, ProviderRegistry, RoutingConfig,
    RoutingPolicy,
};
pub use types::{Capability, Request, Response};
