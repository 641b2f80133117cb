//! Request type dispatched through the orchestrator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Capability;

/// A single unit of work for a provider.
///
/// Only `capability`, `input_text` and `custom_params` shape the output and
/// therefore the cache key. `hints` carry non-functional metadata (trace
/// ids, logging labels) and `provider_id` pins a provider; neither is part
/// of the fingerprint, so pinning or tagging a request never fragments the
/// cache.
///
/// ```rust
/// # use huginn::{Capability, Request};
/// let request = Request::new(Capability::Translation, "bonjour")
///     .param("target_language", "en")
///     .hint("trace_id", "abc123");
/// assert_eq!(request.custom_params["target_language"], "en");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub capability: Capability,
    pub input_text: String,
    /// Output-affecting parameters (e.g. target language). Sorted, so
    /// iteration order is deterministic.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_params: BTreeMap<String, String>,
    /// Non-functional parameters, excluded from the cache key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hints: BTreeMap<String, String>,
    /// Explicit provider pin. Bypasses capability routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

impl Request {
    /// Create a request for `capability` over `input_text`.
    pub fn new(capability: impl Into<Capability>, input_text: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            input_text: input_text.into(),
            custom_params: BTreeMap::new(),
            hints: BTreeMap::new(),
            provider_id: None,
        }
    }

    /// Add an output-affecting parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_params.insert(key.into(), value.into());
        self
    }

    /// Add a non-functional hint.
    pub fn hint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hints.insert(key.into(), value.into());
        self
    }

    /// Pin this request to a specific provider.
    pub fn with_provider(mut self, id: impl Into<String>) -> Self {
        self.provider_id = Some(id.into());
        self
    }
}
