//! Two-tier cache: a circuit-breaker-guarded remote tier in front of an
//! in-memory LRU tier, with redundant writes (§4.5, component G).

use crate::metrics::{CacheMetrics, CacheMetricsSnapshot, TierSource};
use crate::remote::RemoteCacheStore;
use riptide_reliability::{CallError, CircuitBreaker, CircuitBreakerConfig};
use riptide_types::model::CacheEntry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Which tier backs reads, decided once at construction (§4.5: "Strategy
/// at construction: if remote tier enabled, strategy = remote, else lru").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Remote,
    Lru,
}

/// Tuning for a `TwoTierCache`.
#[derive(Debug, Clone, Copy)]
pub struct TwoTierCacheConfig {
    pub lru_capacity: usize,
    pub default_ttl_ms: i64,
}

impl Default for TwoTierCacheConfig {
    fn default() -> Self {
        Self {
            lru_capacity: 10_000,
            default_ttl_ms: 24 * 60 * 60 * 1000,
        }
    }
}

/// Persisted-outer / in-memory-inner cache with a circuit breaker
/// guarding the outer tier.
///
/// `T` is serialized to JSON at the remote-adapter boundary only; the LRU
/// tier stores `T` directly (§9 "Cache generics").
pub struct TwoTierCache<T> {
    remote: Option<Arc<dyn RemoteCacheStore>>,
    circuit: Option<CircuitBreaker>,
    lru: Mutex<lru::LruCache<String, CacheEntry<T>>>,
    config: TwoTierCacheConfig,
    metrics: Arc<CacheMetrics>,
    strategy: Strategy,
    _marker: PhantomData<T>,
}

impl<T> TwoTierCache<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Construct an LRU-only cache (no remote tier configured).
    pub fn lru_only(config: TwoTierCacheConfig) -> Self {
        Self {
            remote: None,
            circuit: None,
            lru: Mutex::new(lru::LruCache::new(
                NonZeroUsize::new(config.lru_capacity.max(1)).unwrap(),
            )),
            config,
            metrics: Arc::new(CacheMetrics::default()),
            strategy: Strategy::Lru,
            _marker: PhantomData,
        }
    }

    /// Construct a two-tier cache with a remote store behind a circuit
    /// breaker.
    pub fn with_remote(
        config: TwoTierCacheConfig,
        remote: Arc<dyn RemoteCacheStore>,
        breaker_config: CircuitBreakerConfig,
    ) -> Self {
        Self {
            remote: Some(remote),
            circuit: Some(CircuitBreaker::new("two-tier-cache-remote", breaker_config)),
            lru: Mutex::new(lru::LruCache::new(
                NonZeroUsize::new(config.lru_capacity.max(1)).unwrap(),
            )),
            config,
            metrics: Arc::new(CacheMetrics::default()),
            strategy: Strategy::Remote,
            _marker: PhantomData,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn metrics(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// §4.5 read policy.
    pub async fn get(&self, key: &str) -> Option<CacheEntry<T>> {
        let started = std::time::Instant::now();

        if let (Some(remote), Some(circuit)) = (&self.remote, &self.circuit) {
            if remote.is_ready().await {
                let outcome = circuit
                    .call(|| async { remote.get(key).await })
                    .await;

                match outcome {
                    Ok(Some(bytes)) => match serde_json::from_slice::<CacheEntry<T>>(&bytes) {
                        Ok(entry) if !entry.is_expired(Self::now_ms(), self.config.default_ttl_ms) => {
                            debug!(key, tier = "remote", elapsed_us = started.elapsed().as_micros() as u64, "cache hit");
                            self.metrics.record_read(TierSource::Remote);
                            return Some(entry);
                        }
                        Ok(_) => {
                            debug!(key, "remote entry expired, falling through to lru");
                        }
                        Err(err) => {
                            warn!(key, error = %err, "failed to decode remote cache entry");
                        }
                    },
                    Ok(None) => {}
                    Err(CallError::Open(_)) => {
                        debug!(key, "remote circuit open, falling back to lru");
                        self.metrics.record_circuit_open_fallback();
                    }
                    Err(CallError::Operation(err)) => {
                        warn!(key, error = %err, "remote cache read failed");
                    }
                }
            }
        }

        let mut lru = self.lru.lock().await;
        match lru.get(key) {
            Some(entry) if !entry.is_expired(Self::now_ms(), self.config.default_ttl_ms) => {
                debug!(key, tier = "lru", elapsed_us = started.elapsed().as_micros() as u64, "cache hit");
                self.metrics.record_read(TierSource::Lru);
                Some(entry.clone())
            }
            Some(_) => {
                lru.pop(key);
                self.metrics.record_read(TierSource::Miss);
                None
            }
            None => {
                self.metrics.record_read(TierSource::Miss);
                None
            }
        }
    }

    pub async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    /// §4.5 write policy: redundant writes, LRU always succeeds.
    pub async fn set(&self, key: &str, entry: CacheEntry<T>) {
        if let (Some(remote), Some(circuit)) = (&self.remote, &self.circuit) {
            if remote.is_ready().await {
                match serde_json::to_vec(&entry) {
                    Ok(bytes) => {
                        let outcome = circuit.call(|| async { remote.set(key, bytes).await }).await;
                        match outcome {
                            Ok(()) => {}
                            Err(CallError::Open(_)) => {
                                debug!(key, "remote circuit open, write served by lru only");
                            }
                            Err(CallError::Operation(err)) => {
                                warn!(key, error = %err, "remote cache write failed");
                            }
                        }
                    }
                    Err(err) => warn!(key, error = %err, "failed to encode cache entry for remote"),
                }
            }
        }

        let mut lru = self.lru.lock().await;
        lru.put(key.to_string(), entry);
        self.metrics.record_set();
    }

    /// Best-effort delete from both tiers (§4.5).
    pub async fn delete(&self, key: &str) {
        if let (Some(remote), Some(circuit)) = (&self.remote, &self.circuit) {
            let outcome = circuit.call(|| async { remote.delete(key).await }).await;
            if let Err(CallError::Operation(err)) = outcome {
                warn!(key, error = %err, "remote cache delete failed");
            }
        }
        let mut lru = self.lru.lock().await;
        lru.pop(key);
        self.metrics.record_delete();
    }

    /// Clears both tiers; never fails (§4.5).
    pub async fn clear(&self) {
        if let Some(remote) = &self.remote {
            if let Err(err) = remote.clear().await {
                warn!(error = %err, "remote cache clear failed, lru cleared regardless");
            }
        }
        let mut lru = self.lru.lock().await;
        lru.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryRemoteStore;
    use riptide_reliability::CircuitBreakerConfig;
    use std::time::Duration;

    fn breaker_cfg() -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: 5,
            reset_timeout: Duration::from_millis(50),
            half_open_max_attempts: 1,
        }
    }

    #[tokio::test]
    async fn set_then_get_round_trips_through_lru() {
        let cache: TwoTierCache<String> = TwoTierCache::lru_only(TwoTierCacheConfig::default());
        cache
            .set("k", CacheEntry::new("hello".to_string()))
            .await;
        let entry = cache.get("k").await.expect("value present");
        assert_eq!(entry.value, "hello");
    }

    #[tokio::test]
    async fn remote_outage_falls_back_to_lru_without_losing_writes() {
        let remote = InMemoryRemoteStore::new();
        let cache: TwoTierCache<String> =
            TwoTierCache::with_remote(TwoTierCacheConfig::default(), remote.clone(), breaker_cfg());

        // Trip the circuit: five failures.
        remote.set_failing(true);
        for _ in 0..5 {
            cache.set("k", CacheEntry::new("v".to_string())).await;
        }

        // LRU must still contain the value even though remote is down.
        let entry = cache.get("k").await.expect("lru still serves the value");
        assert_eq!(entry.value, "v");

        // Circuit should now be open; bringing remote back up does not
        // immediately matter until the reset window elapses.
        remote.set_failing(false);
        let entry = cache.get("k").await.expect("still served, lru or remote");
        assert_eq!(entry.value, "v");
    }

    #[tokio::test]
    async fn delete_removes_from_lru() {
        let cache: TwoTierCache<String> = TwoTierCache::lru_only(TwoTierCacheConfig::default());
        cache.set("k", CacheEntry::new("v".to_string())).await;
        cache.delete("k").await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn expired_entry_is_treated_as_miss() {
        let mut config = TwoTierCacheConfig::default();
        config.default_ttl_ms = 1;
        let cache: TwoTierCache<String> = TwoTierCache::lru_only(config);
        cache.set("k", CacheEntry::new("v".to_string())).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.get("k").await.is_none());
    }
}
