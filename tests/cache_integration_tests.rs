//! Integration Tests for the public cache API
//!
//! Exercises construction from configuration, real-clock expiry, both storage
//! backends and sharing a cache behind an external lock.

use std::sync::{Arc, Mutex, Once};
use std::thread::{self, sleep};
use std::time::Duration;

use tiny_lru::cache::{GrowableSlots, ManualClock};
use tiny_lru::{Config, ConfigError, Expiry, FixedLruCache, LruCache};

// == Helper Functions ==

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "tiny_lru=debug".into()),
            )
            .with_test_writer()
            .init();
    });
}

type Disposed = Arc<Mutex<Vec<(String, String)>>>;

fn recording_cache(config: Config) -> (LruCache<String, String>, Disposed) {
    let disposed: Disposed = Arc::new(Mutex::new(Vec::new()));
    let sink = disposed.clone();
    let cache: LruCache<String, String> = LruCache::new(config)
        .unwrap()
        .with_dispose(move |key, value| sink.lock().unwrap().push((key, value)));
    (cache, disposed)
}

// == Construction ==

#[test]
fn test_construct_from_json_config() {
    init_tracing();
    let config = Config::from_json(r#"{"max": 3, "ttl": 1000}"#).unwrap();
    let cache: LruCache<String, String> = LruCache::new(config).unwrap();

    assert_eq!(cache.capacity(), 3);
    assert_eq!(cache.ttl_ms(), 1000);
}

#[test]
fn test_invalid_config_fails_fast() {
    assert!(matches!(
        Config::from_json(r#"{"max": -1}"#),
        Err(ConfigError::InvalidMax(_))
    ));
    assert!(matches!(
        Config::from_json(r#"{"ttl": "ten"}"#),
        Err(ConfigError::InvalidTtl(_))
    ));
}

#[test]
fn test_fixed_backend_requires_capacity() {
    let result = FixedLruCache::<String, String>::fixed(Config::default());
    assert!(matches!(result, Err(ConfigError::ZeroCapacity)));
}

#[test]
fn test_large_bound_from_json_constructs() {
    init_tracing();
    let config = Config::from_json(r#"{"max": 4000000000000}"#).unwrap();
    let mut cache: LruCache<String, String> = LruCache::new(config).unwrap();

    cache.set("k".to_string(), "v".to_string());

    assert_eq!(cache.capacity(), 4_000_000_000_000);
    assert_eq!(cache.get("k"), Some(&"v".to_string()));
}

#[test]
fn test_fixed_backend_reports_unallocatable_bound() {
    let result = FixedLruCache::<String, String>::fixed(Config::new(usize::MAX, 0));
    assert!(matches!(result, Err(ConfigError::CapacityTooLarge(_))));
}

// == Eviction ==

#[test]
fn test_eviction_disposes_oldest_once() {
    init_tracing();
    let (mut cache, disposed) = recording_cache(Config::new(2, 0));

    cache.set("a".to_string(), "1".to_string());
    cache.set("b".to_string(), "2".to_string());
    cache.set("c".to_string(), "3".to_string());

    assert!(!cache.has("a"));
    assert!(cache.has("b"));
    assert!(cache.has("c"));
    assert_eq!(
        *disposed.lock().unwrap(),
        vec![("a".to_string(), "1".to_string())]
    );
}

#[test]
fn test_recency_follows_reads_and_writes() {
    let mut cache: LruCache<String, u32> = LruCache::new(Config::new(3, 0)).unwrap();
    cache.set("a".to_string(), 1);
    cache.set("b".to_string(), 2);
    cache.set("c".to_string(), 3);

    cache.get("a");
    cache.set("b".to_string(), 20);

    let order: Vec<&str> = cache.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(order, vec!["b", "a", "c"]);

    cache.set("d".to_string(), 4);
    assert!(!cache.has("c"));
}

// == Expiry ==

#[test]
fn test_ttl_expiry_with_real_clock() {
    init_tracing();
    let (mut cache, disposed) = recording_cache(Config::new(2, 25));

    cache.set("1".to_string(), "true".to_string());
    sleep(Duration::from_millis(30));

    assert_eq!(cache.get("1"), None);
    assert_eq!(cache.len(), 0);
    assert_eq!(disposed.lock().unwrap().len(), 1);
}

#[test]
fn test_reads_do_not_slide_expiry() {
    let clock = ManualClock::new(1_000);
    let mut cache: LruCache<String, u32> = LruCache::new(Config::new(0, 25))
        .unwrap()
        .with_clock(Arc::new(clock.clone()));

    cache.set("k".to_string(), 5);

    clock.advance(10);
    assert_eq!(cache.get("k"), Some(&5));
    assert_eq!(cache.expires_at("k"), Some(Expiry::At(1_025)));

    clock.advance(20);
    assert_eq!(cache.get("k"), None);
}

#[test]
fn test_prune_reclaims_without_reads() {
    let clock = ManualClock::new(0);
    let (cache, disposed) = recording_cache(Config::new(0, 10));
    let mut cache = cache.with_clock(Arc::new(clock.clone()));

    for i in 0..10 {
        cache.set(format!("key{}", i), i.to_string());
    }
    clock.advance(10);

    assert_eq!(cache.len(), 10);
    assert_eq!(cache.prune(), 10);
    assert!(cache.is_empty());
    assert_eq!(disposed.lock().unwrap().len(), 10);
}

// == Clear ==

#[test]
fn test_clear_is_not_disposal() {
    let (mut cache, disposed) = recording_cache(Config::new(4, 0));
    cache.set("a".to_string(), "1".to_string());
    cache.set("b".to_string(), "2".to_string());

    cache.clear();

    assert!(cache.is_empty());
    assert!(cache.keys().is_empty());
    assert!(disposed.lock().unwrap().is_empty());
}

// == Backends ==

#[test]
fn test_backends_agree() {
    let config = Config::new(3, 0);
    let mut growable: LruCache<u32, u32, GrowableSlots<u32, u32>> =
        LruCache::with_storage(config).unwrap();
    let mut fixed: FixedLruCache<u32, u32> = FixedLruCache::fixed(config).unwrap();

    for i in 0..10u32 {
        growable.set(i % 5, i);
        fixed.set(i % 5, i);
        if i % 3 == 0 {
            growable.get(&(i % 4));
            fixed.get(&(i % 4));
        }
    }

    let a: Vec<(u32, u32)> = growable.iter().map(|(k, v)| (*k, *v)).collect();
    let b: Vec<(u32, u32)> = fixed.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(a, b);
}

// == Shared Access ==

#[test]
fn test_shared_behind_external_lock() {
    let cache: LruCache<String, usize> = LruCache::new(Config::new(50, 0)).unwrap();
    let cache = Arc::new(Mutex::new(cache));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    let mut guard = cache.lock().unwrap();
                    guard.set(format!("t{}-{}", t, i), i);
                    assert!(guard.len() <= 50);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let guard = cache.lock().unwrap();
    assert_eq!(guard.len(), 50);
    assert_eq!(guard.stats().evictions, 350);
}
