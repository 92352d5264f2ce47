//! Cache entry type shared by both tiers of `riptide-cache` (§3, §9
//! "Cache generics").

use serde::{Deserialize, Serialize};

/// A cached value plus the bookkeeping needed for conditional requests and
/// TTL expiry (§3). Generic over the stored value so both tiers of
/// `TwoTierCache` can share one shape; at the remote-adapter boundary the
/// value is serialized to JSON and decoded back into `T` by the caller
/// (§9 "Cache generics").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    /// Epoch milliseconds at insertion time.
    pub inserted_at: i64,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub content_hash: Option<String>,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            inserted_at: chrono::Utc::now().timestamp_millis(),
            etag: None,
            last_modified: None,
            content_hash: None,
        }
    }

    pub fn with_meta(
        value: T,
        etag: Option<String>,
        last_modified: Option<String>,
        content_hash: Option<String>,
    ) -> Self {
        Self {
            value,
            inserted_at: chrono::Utc::now().timestamp_millis(),
            etag,
            last_modified,
            content_hash,
        }
    }

    /// Whether this entry is older than `ttl_ms`, relative to `now_ms`.
    pub fn is_expired(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms.saturating_sub(self.inserted_at) >= ttl_ms
    }
}
