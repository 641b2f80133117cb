//! RequestOrchestrator - cache, route, call, write through.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures_util::FutureExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, instrument, trace, warn};

use super::builder::OrchestratorBuilder;
use super::handle::DispatchHandle;
use crate::cache::{CacheConfig, CacheEntry, CacheKey, CacheStats, ResponseCache, compute_key};
use crate::config::OrchestratorConfig;
use crate::providers::{CapabilityRouter, HealthSnapshot, Provider, ProviderRegistry};
use crate::telemetry;
use crate::types::{Capability, Request, Response};
use crate::{HuginnError, Result};

/// Per-request lifecycle, emitted as trace events.
///
/// ```text
/// Created → CacheChecked → CacheHit → Completed
///                        ↘ ProviderSelected → AwaitingProvider → Completed | Failed
/// ```
#[derive(Debug, Clone, Copy)]
enum DispatchState {
    Created,
    CacheChecked,
    CacheHit,
    ProviderSelected,
    AwaitingProvider,
    Completed,
    Failed,
}

impl DispatchState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::CacheChecked => "cache_checked",
            Self::CacheHit => "cache_hit",
            Self::ProviderSelected => "provider_selected",
            Self::AwaitingProvider => "awaiting_provider",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

fn transition(state: DispatchState) {
    trace!(state = state.as_str(), "dispatch state");
}

/// Routes requests to providers and caches their successful responses.
///
/// Construct one per composition root and share it by `Arc`; there is no
/// global instance. Registry and cache mutations are serialized by locks
/// that are never held across a provider call, so concurrent dispatches
/// only contend for the brief bookkeeping sections.
///
/// Identical requests that miss concurrently are *not* coalesced: both reach
/// a provider and both write the cache, last write wins.
pub struct RequestOrchestrator {
    registry: RwLock<ProviderRegistry>,
    cache: Mutex<ResponseCache>,
    router: CapabilityRouter,
}

impl Default for RequestOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestOrchestrator {
    /// Orchestrator with default cache and routing config and no providers.
    pub fn new() -> Self {
        Self::from_parts(OrchestratorConfig::default())
    }

    /// Orchestrator with an explicit config.
    pub fn with_config(config: OrchestratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    /// Start configuring an orchestrator.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    fn from_parts(config: OrchestratorConfig) -> Self {
        Self {
            registry: RwLock::new(ProviderRegistry::new()),
            cache: Mutex::new(ResponseCache::new(config.cache)),
            router: CapabilityRouter::new(config.routing),
        }
    }

    // ========================================================================
    // Provider management
    // ========================================================================

    /// Register a provider. See [`ProviderRegistry::register`].
    pub fn register(&self, provider: Arc<dyn Provider>) -> Result<()> {
        self.registry_mut().register(provider)
    }

    /// Remove a provider, forgetting its health history.
    pub fn unregister(&self, id: &str) -> Result<Arc<dyn Provider>> {
        let removed = self.registry_mut().unregister(id)?;
        self.router.forget(id);
        Ok(removed)
    }

    /// Make `id` the active provider.
    pub fn set_active(&self, id: &str) -> Result<()> {
        self.registry_mut().set_active(id)
    }

    /// Id of the active provider, if any.
    pub fn active_provider_id(&self) -> Option<String> {
        self.registry().active_id().map(str::to_string)
    }

    /// Registered provider ids, in registration order.
    pub fn provider_ids(&self) -> Vec<String> {
        self.registry().all_ids()
    }

    /// Registered provider display names, in registration order.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry().all_names()
    }

    /// Observed latency and outcomes for a provider.
    pub fn provider_health(&self, id: &str) -> Option<HealthSnapshot> {
        self.router.health(id)
    }

    // ========================================================================
    // Cache management
    // ========================================================================

    /// Apply new cache bounds; shrinking capacity evicts immediately.
    pub fn configure_cache(&self, config: CacheConfig) -> Result<()> {
        config.validate()?;
        self.cache_recovering().configure(config);
        Ok(())
    }

    /// Current cache configuration.
    pub fn cache_config(&self) -> CacheConfig {
        self.cache_recovering().config().clone()
    }

    /// Drop all cached responses. Statistics are kept.
    pub fn clear_cache(&self) {
        self.cache_recovering().clear();
    }

    /// Cache statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        self.cache_recovering().stats()
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Dispatch a request, routing by capability unless it pins a provider.
    ///
    /// Always resolves to exactly one [`Response`]; failures are reported
    /// with `success == false`.
    pub async fn dispatch(&self, request: &Request) -> Response {
        self.execute(request, None).await.into()
    }

    /// Like [`dispatch`](Self::dispatch), surfacing failures as errors.
    pub async fn try_dispatch(&self, request: &Request) -> Result<Response> {
        self.execute(request, None).await
    }

    /// Dispatch to a specific provider, bypassing capability routing.
    ///
    /// Fails with `ProviderNotFound` or `CapabilityNotSupported` without
    /// calling any provider.
    pub async fn dispatch_with_provider(&self, provider_id: &str, request: &Request) -> Response {
        self.execute(request, Some(provider_id)).await.into()
    }

    /// Try each provider in order until one succeeds.
    ///
    /// Every attempt is a full dispatch (cache check included), so a
    /// response cached by any earlier attempt or request short-circuits the
    /// list. Returns the last failure when all attempts fail.
    pub async fn dispatch_with_fallback<I, S>(&self, provider_ids: I, request: &Request) -> Response
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut last_err = None;
        for id in provider_ids {
            let id = id.as_ref();
            if last_err.is_some() {
                metrics::counter!(telemetry::FALLBACKS_TOTAL,
                    "capability" => request.capability.to_string(),
                )
                .increment(1);
            }
            match self.execute(request, Some(id)).await {
                Ok(response) => return response,
                Err(e) => {
                    debug!(provider = id, error = %e, "fallback attempt failed");
                    last_err = Some(e);
                }
            }
        }
        let err = last_err.unwrap_or_else(|| HuginnError::NoCapableProvider(request.capability.clone()));
        Response::failure(&err)
    }

    /// Dispatch on the tokio runtime and hand the response to `on_complete`.
    ///
    /// `on_complete` runs exactly once, unless the returned handle is
    /// cancelled or dropped first; then the in-flight call is abandoned and
    /// the completion is silently discarded. Must be called from within a
    /// tokio runtime.
    pub fn spawn_dispatch<F>(self: &Arc<Self>, request: Request, on_complete: F) -> DispatchHandle
    where
        F: FnOnce(Response) + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            let response = tokio::select! {
                biased;
                _ = cancelled.cancelled() => None,
                response = this.dispatch(&request) => Some(response),
            };
            match response {
                Some(response) if !cancelled.is_cancelled() => {
                    on_complete(response);
                    true
                }
                _ => {
                    debug!(capability = %request.capability, "dispatch cancelled, dropping completion");
                    false
                }
            }
        });
        DispatchHandle::new(token, task)
    }

    // ========================================================================
    // Core path
    // ========================================================================

    #[instrument(
        skip(self, request, pinned),
        fields(capability = %request.capability, provider = tracing::field::Empty)
    )]
    async fn execute(&self, request: &Request, pinned: Option<&str>) -> Result<Response> {
        transition(DispatchState::Created);

        // 1. Cache
        let key = self.cache_key_if_enabled(request);
        let hit = key.as_ref().and_then(|key| self.cache_lookup(key));
        transition(DispatchState::CacheChecked);
        if let Some(entry) = hit {
            transition(DispatchState::CacheHit);
            transition(DispatchState::Completed);
            return Ok(entry.response.to_cache_hit());
        }

        // 2. Resolve
        let provider = match self.resolve(request, pinned) {
            Ok(p) => p,
            Err(e) => {
                transition(DispatchState::Failed);
                return Err(e);
            }
        };
        let provider_id = provider.id().to_string();
        Span::current().record("provider", provider_id.as_str());

        // 3. Verify (only the pinned path can get here with a mismatch)
        if !provider.supports(&request.capability) {
            transition(DispatchState::Failed);
            return Err(HuginnError::CapabilityNotSupported {
                provider: provider_id,
                capability: request.capability.clone(),
            });
        }
        transition(DispatchState::ProviderSelected);

        // 4. Call
        transition(DispatchState::AwaitingProvider);
        let start = Instant::now();
        let outcome = AssertUnwindSafe(provider.process(request))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(HuginnError::provider_failed(&provider_id, "provider panicked")));
        let ok = outcome.is_ok();
        self.router.record(&provider_id, start.elapsed(), ok);
        record_call(&provider_id, &request.capability, start, ok);

        match outcome {
            Ok(text) => {
                let response = Response::ok(text, provider_id.as_str());
                if let Some(key) = key {
                    self.cache_insert(key, response.clone(), &provider_id);
                }
                transition(DispatchState::Completed);
                Ok(response)
            }
            Err(e) => {
                warn!(provider = %provider_id, error = %e, "provider call failed");
                transition(DispatchState::Failed);
                Err(match e {
                    e @ HuginnError::ProviderCallFailed { .. } => e,
                    other => HuginnError::provider_failed(provider_id, other),
                })
            }
        }
    }

    /// Pick the provider: explicit pin first, else capability routing.
    fn resolve(&self, request: &Request, pinned: Option<&str>) -> Result<Arc<dyn Provider>> {
        let registry = self.registry();
        if let Some(id) = pinned.or(request.provider_id.as_deref()) {
            return registry
                .get(id)
                .ok_or_else(|| HuginnError::ProviderNotFound(id.to_string()));
        }

        let selected = self
            .router
            .select_provider(&registry, &request.capability)
            .ok_or_else(|| HuginnError::NoCapableProvider(request.capability.clone()))?;

        if let Some(active) = registry.active_id()
            && active != selected.id()
        {
            debug!(active, selected = selected.id(), "routed away from active provider");
            metrics::counter!(telemetry::FALLBACKS_TOTAL,
                "capability" => request.capability.to_string(),
            )
            .increment(1);
        }
        Ok(selected)
    }

    // ========================================================================
    // Lock helpers
    // ========================================================================

    fn registry(&self) -> RwLockReadGuard<'_, ProviderRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, ProviderRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cache guard for management calls, recovering from poisoning.
    fn cache_recovering(&self) -> MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache_key_if_enabled(&self, request: &Request) -> Option<CacheKey> {
        let enabled = self.cache_recovering().config().enabled;
        enabled.then(|| compute_key(request))
    }

    /// Lookup on the dispatch path. A poisoned cache is treated as a miss.
    fn cache_lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        match self.cache.lock() {
            Ok(mut cache) => cache.lookup(key),
            Err(_) => {
                warn!("response cache lock poisoned, treating as miss");
                None
            }
        }
    }

    /// Insert on the dispatch path. A poisoned cache skips the write.
    fn cache_insert(&self, key: CacheKey, response: Response, provider_id: &str) {
        match self.cache.lock() {
            Ok(mut cache) => cache.insert(key, response, provider_id),
            Err(_) => warn!("response cache lock poisoned, skipping insert"),
        }
    }
}

impl std::fmt::Debug for RequestOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOrchestrator")
            .field("providers", &self.provider_ids())
            .field("active", &self.active_provider_id())
            .field("cache", &self.stats())
            .field("routing", self.router.config())
            .finish()
    }
}

/// Record provider call metrics (counter + histogram).
fn record_call(provider: &str, capability: &Capability, start: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    let elapsed = start.elapsed().as_secs_f64();
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "provider" => provider.to_owned(),
        "capability" => capability.to_string(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "provider" => provider.to_owned(),
        "capability" => capability.to_string(),
    )
    .record(elapsed);
}
