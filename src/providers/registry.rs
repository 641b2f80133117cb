//! Provider registry with an active-provider slot.
//!
//! The `ProviderRegistry` stores providers in registration order and tracks
//! which one is "active", i.e. used by default when a request does not pin
//! an explicit provider id. It is pure bookkeeping: no I/O, no locking.
//! The orchestrator wraps it in an `RwLock` for shared access.
//!
//! # Active slot
//!
//! ```text
//! register(p1)      providers: [p1]        active: p1   (first provider wins)
//! register(p2)      providers: [p1, p2]    active: p1
//! set_active(p2)    providers: [p1, p2]    active: p2
//! unregister(p2)    providers: [p1]        active: p1   (reassigned)
//! unregister(p1)    providers: []          active: -    (cleared)
//! ```
//!
//! Invariant: when the active slot is set, it names a registered provider.

use std::sync::Arc;

use tracing::{debug, warn};

use super::traits::Provider;
use crate::{HuginnError, Result};

/// Registry of providers keyed by id, in registration order.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn Provider>>,
    active: Option<String>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Register a provider.
    ///
    /// A provider whose id is already registered replaces the existing one
    /// in place (keeping its position in the routing order) and a warning
    /// is logged. The first provider registered into a registry without an
    /// active provider becomes active.
    pub fn register(&mut self, provider: Arc<dyn Provider>) -> Result<()> {
        let id = provider.id().to_string();
        if id.trim().is_empty() {
            return Err(HuginnError::InvalidProvider(
                "provider id must not be empty".to_string(),
            ));
        }

        if let Some(slot) = self.providers.iter_mut().find(|p| p.id() == id) {
            warn!(provider = %id, "replacing already registered provider");
            *slot = provider;
        } else {
            debug!(provider = %id, "registered provider");
            self.providers.push(provider);
        }

        if self.active.is_none() {
            self.active = Some(id);
        }
        Ok(())
    }

    /// Make `id` the active provider.
    ///
    /// Leaves the active slot unchanged if `id` is not registered.
    pub fn set_active(&mut self, id: &str) -> Result<()> {
        if !self.contains(id) {
            return Err(HuginnError::ProviderNotFound(id.to_string()));
        }
        self.active = Some(id.to_string());
        Ok(())
    }

    /// Remove a provider and return it.
    ///
    /// If it was active, the first remaining provider in registration order
    /// becomes active, or the slot clears when none remain.
    pub fn unregister(&mut self, id: &str) -> Result<Arc<dyn Provider>> {
        let idx = self
            .providers
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| HuginnError::ProviderNotFound(id.to_string()))?;
        let removed = self.providers.remove(idx);

        if self.active.as_deref() == Some(id) {
            self.active = self.providers.first().map(|p| p.id().to_string());
            debug!(
                removed = id,
                active = self.active.as_deref().unwrap_or("none"),
                "reassigned active provider"
            );
        }
        Ok(removed)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Look up a provider by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Provider>> {
        self.providers.iter().find(|p| p.id() == id).cloned()
    }

    /// Whether a provider with `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.providers.iter().any(|p| p.id() == id)
    }

    /// The active provider, if any.
    ///
    /// `None` is a normal condition (empty registry), not an error.
    pub fn active_provider(&self) -> Option<Arc<dyn Provider>> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    /// Id of the active provider, if any.
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Registered providers in registration order.
    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    /// Snapshot of registered ids, in registration order.
    pub fn all_ids(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.id().to_string()).collect()
    }

    /// Snapshot of display names, in registration order.
    pub fn all_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no providers are registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.all_ids())
            .field("active", &self.active)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
