//! Capability routing, provider health tracking, and latency-aware selection.
//!
//! This module provides:
//! - [`CapabilityRouter`] - picks the provider that serves a capability
//! - [`RoutingConfig`] / [`RoutingPolicy`] - which selection rule to apply
//! - [`ProviderHealth`] - EWMA latency plus success/failure counters
//!
//! # Active-first routing (default)
//!
//! If the active provider declares the requested capability it is chosen.
//! Otherwise the registry is scanned in registration order and the first
//! provider declaring the capability wins. No weighting, no load balancing:
//! the same registry state always yields the same choice.
//!
//! # Latency-aware routing
//!
//! With [`RoutingPolicy::Latency`], capable providers whose observed success
//! rate is at least `min_success_rate` are ranked by EWMA latency (fastest
//! first). Providers without observations rank after measured ones, and
//! ties keep registration order. When every capable provider is below the
//! success-rate floor, selection falls back to the active-first rule.
//!
//! ```toml
//! [routing]
//! policy = "latency"
//! min_success_rate = 0.8
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Deserialize;

use super::registry::ProviderRegistry;
use super::traits::Provider;
use crate::types::Capability;

/// Default EWMA smoothing factor.
const DEFAULT_ALPHA: f64 = 0.2;

/// Provider selection rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingPolicy {
    /// Active provider if capable, else first capable in registration order.
    #[default]
    ActiveFirst,
    /// Fastest healthy capable provider, by observed EWMA latency.
    Latency,
}

impl std::str::FromStr for RoutingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active-first" => Ok(Self::ActiveFirst),
            "latency" => Ok(Self::Latency),
            other => Err(format!("unknown routing policy '{other}'")),
        }
    }
}

/// Routing configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub policy: RoutingPolicy,
    /// Minimum success rate (0.0–1.0) for a provider to be preferred under
    /// [`RoutingPolicy::Latency`]. Default: 0.5.
    #[serde(default = "default_min_success_rate")]
    pub min_success_rate: f64,
}

fn default_min_success_rate() -> f64 {
    0.5
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            policy: RoutingPolicy::default(),
            min_success_rate: default_min_success_rate(),
        }
    }
}

impl RoutingConfig {
    /// Create the default (active-first) config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selection policy.
    pub fn policy(mut self, policy: RoutingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the success-rate floor used by latency-aware routing.
    pub fn min_success_rate(mut self, rate: f64) -> Self {
        self.min_success_rate = rate;
        self
    }
}

// ============================================================================
// Router
// ============================================================================

/// Selects the provider that serves a capability.
///
/// Holds the routing config and the per-provider health book; the provider
/// set itself is passed in on every call, so the router never goes stale as
/// providers come and go.
#[derive(Debug, Default)]
pub struct CapabilityRouter {
    config: RoutingConfig,
    health: RwLock<HashMap<String, Arc<ProviderHealth>>>,
}

impl CapabilityRouter {
    /// Create a router with the given config.
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            config,
            health: RwLock::new(HashMap::new()),
        }
    }

    /// Current routing config.
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Select a provider for `capability`, or `None` if nothing registered
    /// declares it.
    pub fn select_provider(
        &self,
        registry: &ProviderRegistry,
        capability: &Capability,
    ) -> Option<Arc<dyn Provider>> {
        match self.config.policy {
            RoutingPolicy::ActiveFirst => select_active_first(registry, capability),
            RoutingPolicy::Latency => self
                .select_fastest(registry, capability)
                .or_else(|| select_active_first(registry, capability)),
        }
    }

    /// Record the outcome of one provider call.
    pub fn record(&self, provider_id: &str, duration: Duration, ok: bool) {
        self.health_entry(provider_id).record(duration, ok);
    }

    /// Health snapshot for a provider, if it has been observed.
    pub fn health(&self, provider_id: &str) -> Option<HealthSnapshot> {
        let book = self.health.read().unwrap_or_else(|e| e.into_inner());
        book.get(provider_id).map(|h| h.snapshot())
    }

    /// Drop health history for a provider (e.g. after unregistering it).
    pub fn forget(&self, provider_id: &str) {
        let mut book = self.health.write().unwrap_or_else(|e| e.into_inner());
        book.remove(provider_id);
    }

    fn health_entry(&self, provider_id: &str) -> Arc<ProviderHealth> {
        {
            let book = self.health.read().unwrap_or_else(|e| e.into_inner());
            if let Some(h) = book.get(provider_id) {
                return Arc::clone(h);
            }
        }
        let mut book = self.health.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            book.entry(provider_id.to_string())
                .or_insert_with(|| Arc::new(ProviderHealth::with_default_alpha())),
        )
    }

    fn select_fastest(
        &self,
        registry: &ProviderRegistry,
        capability: &Capability,
    ) -> Option<Arc<dyn Provider>> {
        let book = self.health.read().unwrap_or_else(|e| e.into_inner());
        let mut candidates: Vec<(Option<Duration>, &Arc<dyn Provider>)> = registry
            .providers()
            .iter()
            .filter(|p| p.supports(capability))
            .filter_map(|p| match book.get(p.id()) {
                Some(h) => {
                    let healthy = h
                        .success_rate()
                        .is_none_or(|rate| rate >= self.config.min_success_rate);
                    healthy.then(|| (h.average(), p))
                }
                None => Some((None, p)),
            })
            .collect();

        // Stable sort: measured before unmeasured, then fastest first.
        candidates.sort_by_key(|(latency, _)| (latency.is_none(), *latency));
        candidates.first().map(|(_, p)| Arc::clone(p))
    }
}

/// Active provider if capable, else first capable in registration order.
fn select_active_first(
    registry: &ProviderRegistry,
    capability: &Capability,
) -> Option<Arc<dyn Provider>> {
    if let Some(active) = registry.active_provider()
        && active.supports(capability)
    {
        return Some(active);
    }
    registry
        .providers()
        .iter()
        .find(|p| p.supports(capability))
        .cloned()
}

// ============================================================================
// Provider health
// ============================================================================

/// Per-provider latency and outcome tracker.
///
/// Latency is an exponentially weighted moving average, stored as `f64`
/// bits in an `AtomicU64`, so recording needs no lock. Higher `alpha`
/// reacts faster to change; lower `alpha` is smoother.
pub struct ProviderHealth {
    ewma_micros: AtomicU64,
    alpha: f64,
    successes: AtomicU64,
    failures: AtomicU64,
}

impl ProviderHealth {
    /// Create a tracker with the given EWMA smoothing factor.
    pub fn new(alpha: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&alpha), "alpha must be in [0.0, 1.0]");
        Self {
            ewma_micros: AtomicU64::new(0_f64.to_bits()),
            alpha,
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Create a tracker with the default smoothing factor (0.2).
    pub fn with_default_alpha() -> Self {
        Self::new(DEFAULT_ALPHA)
    }

    /// Record one call's duration and outcome.
    ///
    /// Two threads racing on the very first observation may both seed the
    /// average; the estimate converges after a few more samples.
    pub fn record(&self, duration: Duration, ok: bool) {
        let micros = duration.as_micros() as f64;
        let first = self.observation_count() == 0;
        loop {
            let current_bits = self.ewma_micros.load(Ordering::Relaxed);
            let current = f64::from_bits(current_bits);
            let new = if first {
                micros
            } else {
                self.alpha * micros + (1.0 - self.alpha) * current
            };
            if self
                .ewma_micros
                .compare_exchange_weak(
                    current_bits,
                    new.to_bits(),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                )
                .is_ok()
            {
                break;
            }
        }
        if ok {
            self.successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// EWMA latency, or `None` before the first observation.
    pub fn average(&self) -> Option<Duration> {
        if self.observation_count() == 0 {
            return None;
        }
        let micros = f64::from_bits(self.ewma_micros.load(Ordering::Relaxed));
        Some(Duration::from_micros(micros as u64))
    }

    /// Fraction of successful calls, or `None` before the first observation.
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.observation_count();
        (total > 0).then(|| self.successes.load(Ordering::Relaxed) as f64 / total as f64)
    }

    /// Total calls observed.
    pub fn observation_count(&self) -> u64 {
        self.successes.load(Ordering::Relaxed) + self.failures.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            average_latency: self.average(),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for ProviderHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHealth")
            .field("average", &self.average())
            .field("success_rate", &self.success_rate())
            .field("alpha", &self.alpha)
            .finish()
    }
}

/// Read-only view of a provider's health.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthSnapshot {
    pub average_latency: Option<Duration>,
    pub successes: u64,
    pub failures: u64,
}

impl HealthSnapshot {
    /// Fraction of successful calls (0.0 when nothing observed).
    pub fn success_rate(&self) -> f64 {
        let total = self.successes + self.failures;
        if total == 0 {
            0.0
        } else {
            self.successes as f64 / total as f64
        }
    }
}
