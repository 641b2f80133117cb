//! Response cache keyed by request content.
//!
//! [`ResponseCache`] maps a deterministic fingerprint of a request
//! (capability, input text, output-affecting parameters) to the successful
//! response a provider produced for it. The key never includes the provider
//! id, so a response is reusable whichever provider or fallback attempt
//! produced it.
//!
//! # Bounds
//!
//! - **TTL**: an entry older than `max_age_seconds` is never returned as a
//!   hit. Expiry is lazy; stale entries stay in storage until the next
//!   capacity eviction or an explicit [`ResponseCache::purge_expired`].
//! - **Capacity**: after `insert` or `configure` returns, the cache holds at
//!   most `max_entries` entries. Eviction first purges expired entries, then
//!   removes the oldest by creation time. A creation-order index keeps
//!   both steps proportional to the number of entries removed. A
//!   `max_entries` of zero stores nothing.
//!
//! # Statistics
//!
//! `hits` and `misses` are lifetime counters: [`ResponseCache::clear`] drops
//! entries but not counters. Lookups against a disabled cache are not
//! counted.
//!
//! The cache is not internally synchronized; the orchestrator owns it behind
//! a mutex so every lookup and insert sees a consistent snapshot.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tracing::debug;

use crate::telemetry;
use crate::types::{Request, Response};
use crate::{HuginnError, Result};

/// Configuration for the response cache.
///
/// ```rust
/// # use huginn::CacheConfig;
/// let config = CacheConfig::new()
///     .max_entries(10_000)
///     .max_age_seconds(600);
/// assert!(config.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Whether lookups and inserts are performed at all. Default: true.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Maximum number of cached entries. Default: 1,000.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Time-to-live for cached entries, in seconds. Default: 1 hour.
    #[serde(default = "default_max_age_seconds")]
    pub max_age_seconds: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_max_entries() -> usize {
    1_000
}

fn default_max_age_seconds() -> u64 {
    3_600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_entries: default_max_entries(),
            max_age_seconds: default_max_age_seconds(),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A config with caching switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Enable or disable the cache.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live, in seconds.
    pub fn max_age_seconds(mut self, secs: u64) -> Self {
        self.max_age_seconds = secs;
        self
    }

    /// Time-to-live as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Check that both bounds are positive.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(HuginnError::Configuration(
                "cache.max_entries must be positive".to_string(),
            ));
        }
        if self.max_age_seconds == 0 {
            return Err(HuginnError::Configuration(
                "cache.max_age_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Snapshot of cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, or 0.0 before the first counted lookup.
    pub hit_rate: f64,
}

// ============================================================================
// Keys and entries
// ============================================================================

/// Deterministic request fingerprint: lowercase hex SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hex digest string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Version tag mixed into every key; bump when the encoding changes.
const KEY_DOMAIN: &[u8] = b"huginn/response/v1";

/// Compute the cache key for a request.
///
/// Hashes the capability tag, the input text and every `custom_params`
/// pair (in sorted key order), each length-prefixed so field boundaries
/// cannot be shifted to forge a collision. `hints` and `provider_id` are
/// not part of the key.
///
/// SHA-256 is stable across processes and toolchains, unlike
/// `DefaultHasher`, so keys can be logged and compared between runs.
pub fn compute_key(request: &Request) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update(KEY_DOMAIN);
    update_field(&mut hasher, request.capability.as_str().as_bytes());
    update_field(&mut hasher, request.input_text.as_bytes());
    hasher.update((request.custom_params.len() as u64).to_le_bytes());
    for (name, value) in &request.custom_params {
        update_field(&mut hasher, name.as_bytes());
        update_field(&mut hasher, value.as_bytes());
    }

    CacheKey(format!("{:x}", hasher.finalize()))
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// A cached successful response.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub response: Response,
    /// Provider that produced the response. Diagnostic only.
    pub provider_id: String,
    pub created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

// ============================================================================
// Cache
// ============================================================================

/// In-memory response cache with TTL expiry and oldest-first eviction.
#[derive(Debug, Default)]
pub struct ResponseCache {
    config: CacheConfig,
    entries: HashMap<CacheKey, CacheEntry>,
    /// Creation-order index over `entries`, oldest first. Same length as
    /// `entries` at all times.
    by_age: BTreeSet<(Instant, CacheKey)>,
    hits: u64,
    misses: u64,
}

impl ResponseCache {
    /// Create a cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            by_age: BTreeSet::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up `key`, counting a hit or miss.
    ///
    /// Disabled caches always miss without touching the counters. Expired
    /// entries count as misses and are left in place.
    pub fn lookup(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        if !self.config.enabled {
            return None;
        }
        let now = Instant::now();
        let ttl = self.config.ttl();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now, ttl) => {
                self.hits += 1;
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                debug!(key = %key, provider = %entry.provider_id, "cache hit");
                Some(entry.clone())
            }
            found => {
                let expired = found.is_some();
                self.misses += 1;
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                debug!(key = %key, expired, "cache miss");
                None
            }
        }
    }

    /// Store a successful response.
    ///
    /// No-op when disabled or when `max_entries` is zero. Re-inserting an
    /// existing key replaces it. When the cache is full, room is made first
    /// (see module docs).
    pub fn insert(&mut self, key: CacheKey, response: Response, provider_id: impl Into<String>) {
        if !self.config.enabled {
            return;
        }
        if self.config.max_entries == 0 {
            debug!(key = %key, "cache capacity is zero, not storing");
            return;
        }

        if let Some(previous) = self.entries.remove(&key) {
            self.by_age.remove(&(previous.created_at, previous.key));
        } else if self.entries.len() >= self.config.max_entries {
            self.evict_to(self.config.max_entries - 1);
        }

        let created_at = Instant::now();
        self.by_age.insert((created_at, key.clone()));
        let entry = CacheEntry {
            key: key.clone(),
            response,
            provider_id: provider_id.into(),
            created_at,
        };
        self.entries.insert(key, entry);
    }

    /// Drop every entry. Hit/miss counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_age.clear();
    }

    /// Apply new bounds. Shrinking `max_entries` evicts immediately.
    pub fn configure(&mut self, config: CacheConfig) {
        let shrunk = config.max_entries < self.config.max_entries;
        self.config = config;
        if shrunk {
            self.evict_to(self.config.max_entries);
        }
    }

    /// Remove every expired entry, returning how many were removed.
    ///
    /// Entries share one TTL, so the expired ones are always the oldest;
    /// only those are visited.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let ttl = self.config.ttl();
        let mut removed = 0;
        while self
            .by_age
            .first()
            .is_some_and(|(created_at, _)| now.saturating_duration_since(*created_at) > ttl)
        {
            self.pop_oldest();
            removed += 1;
        }
        if removed > 0 {
            metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL, "reason" => "expired")
                .increment(removed as u64);
        }
        removed
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            total_entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shrink storage to at most `limit` entries: expired first, then oldest.
    fn evict_to(&mut self, limit: usize) {
        if self.entries.len() <= limit {
            return;
        }
        self.purge_expired();

        let mut evicted = 0usize;
        while self.entries.len() > limit {
            self.pop_oldest();
            evicted += 1;
        }
        if evicted > 0 {
            metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL, "reason" => "capacity")
                .increment(evicted as u64);
            debug!(evicted, limit, "evicted oldest cache entries");
        }
    }

    fn pop_oldest(&mut self) {
        if let Some((_, key)) = self.by_age.pop_first() {
            self.entries.remove(&key);
        }
    }
}
