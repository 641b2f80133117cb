//! Tests for [`ResponseCache`] and request fingerprinting.

use std::time::Duration;

use huginn::cache::{CacheConfig, ResponseCache, compute_key};
use huginn::{Capability, Request, Response};

fn request(input: &str) -> Request {
    Request::new(Capability::TextGeneration, input)
}

fn store(cache: &mut ResponseCache, input: &str) {
    cache.insert(
        compute_key(&request(input)),
        Response::ok(format!("out:{input}"), "p1"),
        "p1",
    );
}

fn is_cached(cache: &mut ResponseCache, input: &str) -> bool {
    cache.lookup(&compute_key(&request(input))).is_some()
}

// =========================================================================
// Fingerprinting
// =========================================================================

#[test]
fn key_is_stable_across_calls_and_clones() {
    let original = Request::new(Capability::Translation, "guten Tag")
        .param("target_language", "en")
        .param("formality", "high");
    let rebuilt = Request::new(Capability::Translation, "guten Tag")
        .param("formality", "high")
        .param("target_language", "en");

    assert_eq!(compute_key(&original), compute_key(&original.clone()));
    assert_eq!(compute_key(&original), compute_key(&rebuilt));
}

#[test]
fn key_ignores_hints_and_pins() {
    let plain = request("hi");
    let decorated = request("hi").hint("trace_id", "abc").with_provider("p2");
    assert_eq!(compute_key(&plain), compute_key(&decorated));
}

#[test]
fn key_distinguishes_output_shaping_fields() {
    let base = compute_key(&request("hi"));
    let other_input = compute_key(&request("hi "));
    let other_capability = compute_key(&Request::new(Capability::Summarization, "hi"));
    let with_param = compute_key(&request("hi").param("temperature", "0"));

    assert_ne!(base, other_input);
    assert_ne!(base, other_capability);
    assert_ne!(base, with_param);
}

#[test]
fn key_resists_field_boundary_shifts() {
    let a = request("ab").param("c", "d");
    let b = request("a").param("bc", "d");
    let c = request("abc").param("", "d");
    assert_ne!(compute_key(&a), compute_key(&b));
    assert_ne!(compute_key(&b), compute_key(&c));
}

#[test]
fn custom_capabilities_key_by_tag() {
    let custom = Request::new(Capability::custom("sentiment"), "great");
    let same = Request::new("sentiment", "great");
    assert_eq!(compute_key(&custom), compute_key(&same));
}

// =========================================================================
// Lookup / insert
// =========================================================================

#[tokio::test]
async fn miss_then_hit_updates_stats() {
    let mut cache = ResponseCache::new(CacheConfig::default());
    assert!(!is_cached(&mut cache, "hi"));
    store(&mut cache, "hi");

    let entry = cache.lookup(&compute_key(&request("hi"))).unwrap();
    assert_eq!(entry.response.text, "out:hi");
    assert_eq!(entry.provider_id, "p1");

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.total_entries), (1, 1, 1));
    assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn reinsert_replaces_without_growing() {
    let mut cache = ResponseCache::new(CacheConfig::default());
    store(&mut cache, "hi");
    cache.insert(
        compute_key(&request("hi")),
        Response::ok("newer", "p2"),
        "p2",
    );

    assert_eq!(cache.len(), 1);
    let entry = cache.lookup(&compute_key(&request("hi"))).unwrap();
    assert_eq!(entry.response.text, "newer");
}

#[tokio::test]
async fn disabling_hides_entries_until_reenabled() {
    let mut cache = ResponseCache::new(CacheConfig::default());
    store(&mut cache, "hi");

    cache.configure(CacheConfig::default().enabled(false));
    assert!(!is_cached(&mut cache, "hi"));
    store(&mut cache, "ignored");
    assert_eq!(cache.len(), 1);

    cache.configure(CacheConfig::default());
    assert!(is_cached(&mut cache, "hi"));
}

// =========================================================================
// Expiry
// =========================================================================

#[tokio::test(start_paused = true)]
async fn entries_expire_after_max_age() {
    let mut cache = ResponseCache::new(CacheConfig::new().max_age_seconds(30));
    store(&mut cache, "hi");

    tokio::time::advance(Duration::from_secs(30)).await;
    assert!(is_cached(&mut cache, "hi"), "exactly max age is still fresh");

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(!is_cached(&mut cache, "hi"));
    // Expiry is lazy: the entry is still stored until purged or evicted.
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.purge_expired(), 1);
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn purge_keeps_fresh_entries() {
    let mut cache = ResponseCache::new(CacheConfig::new().max_age_seconds(10));
    store(&mut cache, "old");
    tokio::time::advance(Duration::from_secs(8)).await;
    store(&mut cache, "new");
    tokio::time::advance(Duration::from_secs(5)).await;

    assert_eq!(cache.purge_expired(), 1);
    assert!(is_cached(&mut cache, "new"));
}

// =========================================================================
// Capacity
// =========================================================================

#[tokio::test(start_paused = true)]
async fn full_cache_evicts_oldest_first() {
    let mut cache = ResponseCache::new(CacheConfig::new().max_entries(3));
    for input in ["a", "b", "c"] {
        store(&mut cache, input);
        tokio::time::advance(Duration::from_millis(10)).await;
    }

    store(&mut cache, "d");
    assert_eq!(cache.len(), 3);
    assert!(!is_cached(&mut cache, "a"));
    for input in ["b", "c", "d"] {
        assert!(is_cached(&mut cache, input), "{input} should survive");
    }
}

#[tokio::test(start_paused = true)]
async fn expired_entries_are_evicted_before_fresh_ones() {
    let mut cache = ResponseCache::new(CacheConfig::new().max_entries(2).max_age_seconds(5));
    store(&mut cache, "stale");
    tokio::time::advance(Duration::from_secs(4)).await;
    store(&mut cache, "fresh");
    tokio::time::advance(Duration::from_secs(2)).await;

    store(&mut cache, "newest");
    assert_eq!(cache.len(), 2);
    assert!(is_cached(&mut cache, "fresh"));
    assert!(is_cached(&mut cache, "newest"));
}

#[tokio::test]
async fn size_bound_holds_under_churn() {
    let mut cache = ResponseCache::new(CacheConfig::new().max_entries(16));
    for i in 0..200 {
        store(&mut cache, &format!("prompt-{i}"));
        assert!(cache.len() <= 16);
    }
    assert_eq!(cache.stats().total_entries, 16);
}

#[tokio::test(start_paused = true)]
async fn shrinking_keeps_newest() {
    let mut cache = ResponseCache::new(CacheConfig::new().max_entries(10));
    for i in 0..6 {
        store(&mut cache, &i.to_string());
        tokio::time::advance(Duration::from_millis(1)).await;
    }

    cache.configure(CacheConfig::new().max_entries(2));
    assert_eq!(cache.len(), 2);
    assert!(is_cached(&mut cache, "4"));
    assert!(is_cached(&mut cache, "5"));
}

#[tokio::test]
async fn clear_empties_but_keeps_counters() {
    let mut cache = ResponseCache::new(CacheConfig::default());
    store(&mut cache, "hi");
    assert!(is_cached(&mut cache, "hi"));
    assert!(!is_cached(&mut cache, "other"));

    cache.clear();
    let stats = cache.stats();
    assert_eq!(stats.total_entries, 0);
    assert_eq!((stats.hits, stats.misses), (1, 1));
}
