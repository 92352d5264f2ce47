//! Two-tier cache: a persistent remote key/value store behind a circuit
//! breaker, in front of an in-memory LRU tier (§4.5, component G).

pub mod metrics;
pub mod remote;
pub mod two_tier;

pub use metrics::{CacheMetrics, CacheMetricsSnapshot, TierSource};
pub use remote::{InMemoryRemoteStore, RedisRemoteStore, RemoteCacheStore, RemoteStoreError};
pub use two_tier::{Strategy, TwoTierCache, TwoTierCacheConfig};
