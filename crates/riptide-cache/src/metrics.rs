//! Cache metrics (§4.5: "Metrics emitted on every operation: hit/miss,
//! lookup latency, tier source"). No metrics *sink* is implemented here —
//! that's the out-of-scope "logging/metrics sinks" collaborator (§1) —
//! this just keeps running counters a host can poll or export.

use std::sync::atomic::{AtomicU64, Ordering};

/// Which tier served (or failed to serve) a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierSource {
    Remote,
    Lru,
    Miss,
}

impl TierSource {
    pub fn as_str(self) -> &'static str {
        match self {
            TierSource::Remote => "remote",
            TierSource::Lru => "lru",
            TierSource::Miss => "miss",
        }
    }
}

/// Running counters for one `TwoTierCache` instance.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    pub remote_hits: AtomicU64,
    pub lru_hits: AtomicU64,
    pub misses: AtomicU64,
    pub sets: AtomicU64,
    pub deletes: AtomicU64,
    pub circuit_open_fallbacks: AtomicU64,
}

impl CacheMetrics {
    pub fn record_read(&self, source: TierSource) {
        match source {
            TierSource::Remote => self.remote_hits.fetch_add(1, Ordering::Relaxed),
            TierSource::Lru => self.lru_hits.fetch_add(1, Ordering::Relaxed),
            TierSource::Miss => self.misses.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_circuit_open_fallback(&self) {
        self.circuit_open_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            remote_hits: self.remote_hits.load(Ordering::Relaxed),
            lru_hits: self.lru_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            circuit_open_fallbacks: self.circuit_open_fallbacks.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheMetricsSnapshot {
    pub remote_hits: u64,
    pub lru_hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub circuit_open_fallbacks: u64,
}
