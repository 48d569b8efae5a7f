//! Injected key/value cache with per-entry expiry.
//!
//! Callers supply the clock, so cache behavior stays deterministic in tests and the
//! engine keeps no module-level mutable state.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Cache seam for adapters that memoize expensive lookups (e.g. market comparables).
pub trait TtlCache<V: Clone>: Send + Sync {
    /// Returns the cached value when present and not yet expired at `now`.
    fn get(&self, key: &str, now: DateTime<Utc>) -> Option<V>;
    /// Stores `value` under `key`, expiring at `now + ttl`.
    fn put(&self, key: &str, value: V, now: DateTime<Utc>);
}

struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// In-memory implementation backed by a mutex-guarded map.
pub struct InMemoryTtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V> InMemoryTtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone + Send> TtlCache<V> for InMemoryTtlCache<V> {
    fn get(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        let entries = self.entries.lock().expect("cache mutex poisoned");
        entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    fn put(&self, key: &str, value: V, now: DateTime<Utc>) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(
            key.to_owned(),
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
        entries.retain(|_, entry| entry.expires_at > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn returns_value_before_expiry() {
        let cache = InMemoryTtlCache::new(Duration::minutes(10));
        cache.put("avg-price:seongsu", 128_000i64, at(9, 0));
        assert_eq!(cache.get("avg-price:seongsu", at(9, 5)), Some(128_000));
    }

    #[test]
    fn expires_entries_after_ttl() {
        let cache = InMemoryTtlCache::new(Duration::minutes(10));
        cache.put("avg-price:seongsu", 128_000i64, at(9, 0));
        assert_eq!(cache.get("avg-price:seongsu", at(9, 10)), None);
    }

    #[test]
    fn put_overwrites_existing_entry() {
        let cache = InMemoryTtlCache::new(Duration::minutes(10));
        cache.put("avg-price:seongsu", 100_000i64, at(9, 0));
        cache.put("avg-price:seongsu", 130_000i64, at(9, 1));
        assert_eq!(cache.get("avg-price:seongsu", at(9, 2)), Some(130_000));
    }
}
