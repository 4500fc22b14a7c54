//! TTL response cache with bounded size and hit/miss statistics.
//!
//! Memoizes upstream fetch results for a bounded time and bounded space.
//! Expired entries are treated as absent and purged lazily on access;
//! there is no background sweep. When inserting a new key would exceed the
//! configured capacity, the entry with the nearest expiry is evicted first
//! (tie-break: oldest insertion), which favors retaining entries with more
//! remaining useful life.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;

use crate::errors::GatewayError;

/// A cached value with its expiry deadline.
#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
    /// Monotonic insertion sequence, the eviction tie-break.
    inserted_seq: u64,
}

/// Cumulative cache statistics.
///
/// `hits`, `misses` and `evictions` accumulate for the lifetime of the
/// cache instance and survive [`ResponseCache::clear`]; `current_size`
/// reflects live (non-expired at last check) entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Capacity-driven removals. Lazy expiry purges are not evictions.
    pub evictions: u64,
    pub current_size: usize,
    pub max_size: usize,
}

impl CacheStats {
    /// Fraction of accesses that were hits; 0.0 before any access.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
    evictions: u64,
    next_seq: u64,
}

/// TTL-keyed response cache.
///
/// Thread-safe; all operations are atomic with respect to each other.
/// Generic over the cached value type so heterogeneous result shapes can
/// share one cache through an enum without losing type safety.
pub struct ResponseCache<V> {
    state: Mutex<CacheState<V>>,
    max_size: usize,
    default_ttl: Duration,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a cache with the given capacity and default TTL.
    ///
    /// Fails with [`GatewayError::Configuration`] on a zero size or zero
    /// TTL; invalid settings are never clamped.
    pub fn new(max_size: usize, default_ttl: Duration) -> Result<Self, GatewayError> {
        if max_size == 0 {
            return Err(GatewayError::configuration(
                "cache max_size must be positive",
            ));
        }
        if default_ttl.is_zero() {
            return Err(GatewayError::configuration("cache ttl must be positive"));
        }

        info!(
            "Response cache initialized: max_size={}, ttl={:?}",
            max_size, default_ttl
        );

        Ok(Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
                evictions: 0,
                next_seq: 0,
            }),
            max_size,
            default_ttl,
        })
    }

    /// Lock the cache state, recovering from poison if necessary.
    ///
    /// Worst case after recovery is a stale or missing entry, which the
    /// caller already handles as a normal miss.
    fn lock_state(&self) -> MutexGuard<'_, CacheState<V>> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Response cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Look up a key. An entry past its expiry is treated as absent and
    /// purged. Every call counts as a hit or a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut state = self.lock_state();
        let now = Instant::now();

        let expired = matches!(state.entries.get(key), Some(e) if e.expires_at <= now);
        if expired {
            state.entries.remove(key);
        }

        if let Some(entry) = state.entries.get(key) {
            let value = entry.value.clone();
            state.hits += 1;
            debug!("Cache hit: {}", key);
            Some(value)
        } else {
            state.misses += 1;
            debug!("Cache miss: {}", key);
            None
        }
    }

    /// Store a value under the default TTL.
    pub fn put(&self, key: String, value: V) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    /// Store a value with an explicit TTL.
    ///
    /// Overwriting an existing key is done in place and is not an
    /// eviction. Inserting a new key at capacity first drops entries that
    /// have already expired, then evicts the live entry with the nearest
    /// expiry (oldest insertion on ties) until there is room.
    pub fn put_with_ttl(&self, key: String, value: V, ttl: Duration) {
        let mut state = self.lock_state();
        let now = Instant::now();

        if !state.entries.contains_key(&key) {
            state.entries.retain(|_, e| e.expires_at > now);

            while state.entries.len() >= self.max_size {
                let victim = state
                    .entries
                    .iter()
                    .min_by_key(|(_, e)| (e.expires_at, e.inserted_seq))
                    .map(|(k, _)| k.clone());

                match victim {
                    Some(victim_key) => {
                        state.entries.remove(&victim_key);
                        state.evictions += 1;
                        debug!("Cache evicted: {} (nearest expiry)", victim_key);
                    }
                    None => break,
                }
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + ttl,
                inserted_seq: seq,
            },
        );
    }

    /// Drop a single key. Absence is not an error.
    pub fn invalidate(&self, key: &str) {
        let mut state = self.lock_state();
        if state.entries.remove(key).is_some() {
            debug!("Cache invalidated: {}", key);
        }
    }

    /// Drop all entries.
    ///
    /// Resets `current_size` only; the cumulative hit/miss/eviction
    /// counters are lifetime statistics and survive a clear.
    pub fn clear(&self) {
        let mut state = self.lock_state();
        state.entries.clear();
        info!("Cache cleared");
    }

    /// Current statistics. Purges expired entries so `current_size`
    /// reflects live entries only.
    pub fn stats(&self) -> CacheStats {
        let mut state = self.lock_state();
        let now = Instant::now();
        state.entries.retain(|_, e| e.expires_at > now);

        CacheStats {
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            current_size: state.entries.len(),
            max_size: self.max_size,
        }
    }
}
