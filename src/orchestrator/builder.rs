//! Builder for configuring orchestrator instances

use std::sync::Arc;

use super::RequestOrchestrator;
use crate::Result;
use crate::cache::CacheConfig;
use crate::config::OrchestratorConfig;
use crate::providers::{Provider, RoutingConfig, RoutingPolicy};

/// Builder for [`RequestOrchestrator`].
///
/// ```rust
/// # use huginn::{CacheConfig, RequestOrchestrator};
/// let orchestrator = RequestOrchestrator::builder()
///     .cache(CacheConfig::new().max_entries(500).max_age_seconds(600))
///     .build()
///     .unwrap();
/// assert_eq!(orchestrator.cache_config().max_entries, 500);
/// ```
#[derive(Default)]
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    providers: Vec<Arc<dyn Provider>>,
    active: Option<String>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole config (cache and routing).
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the cache config.
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    /// Set the routing config.
    pub fn routing(mut self, routing: RoutingConfig) -> Self {
        self.config.routing = routing;
        self
    }

    /// Shorthand for setting only the routing policy.
    pub fn routing_policy(mut self, policy: RoutingPolicy) -> Self {
        self.config.routing.policy = policy;
        self
    }

    /// Register a provider. Registration order is routing order.
    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Make `id` active instead of the first registered provider.
    pub fn active(mut self, id: impl Into<String>) -> Self {
        self.active = Some(id.into());
        self
    }

    /// Validate the config and assemble the orchestrator.
    ///
    /// Fails on invalid config, an invalid provider, or an `active` id
    /// that was never registered.
    pub fn build(self) -> Result<RequestOrchestrator> {
        let orchestrator = RequestOrchestrator::with_config(self.config)?;
        for provider in self.providers {
            orchestrator.register(provider)?;
        }
        if let Some(id) = self.active {
            orchestrator.set_active(&id)?;
        }
        Ok(orchestrator)
    }
}
