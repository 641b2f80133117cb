//! Telemetry metric name constants.
//!
//! Centralised metric names for huginn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider` - provider id (e.g. "openai", "local")
//! - `capability` - capability tag (e.g. "translation")
//! - `status` - outcome: "ok" or "error"

/// Total provider calls made by the orchestrator.
///
/// Labels: `provider`, `capability`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "huginn_requests_total";

/// Provider call duration in seconds.
///
/// Labels: `provider`, `capability`.
pub const REQUEST_DURATION_SECONDS: &str = "huginn_request_duration_seconds";

/// Total response cache hits.
pub const CACHE_HITS_TOTAL: &str = "huginn_cache_hits_total";

/// Total response cache misses (including expired entries).
pub const CACHE_MISSES_TOTAL: &str = "huginn_cache_misses_total";

/// Total entries evicted from the response cache.
///
/// Labels: `reason` ("expired" | "capacity").
pub const CACHE_EVICTIONS_TOTAL: &str = "huginn_cache_evictions_total";

/// Total times routing skipped the active provider for a capable fallback,
/// or a fallback list advanced past a failed attempt.
///
/// Labels: `capability`.
pub const FALLBACKS_TOTAL: &str = "huginn_fallbacks_total";
