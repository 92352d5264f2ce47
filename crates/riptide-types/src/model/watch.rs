//! Watch target and event types (§3, §4.7).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a `WatchTarget` (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    Active,
    Paused,
    Error,
}

/// The minimum polling interval, in seconds, enforced on every watch
/// (§3, §8: "for any WatchTarget, interval >= 60 after construction").
pub const MIN_INTERVAL_SECS: u64 = 60;

/// A registered URL being periodically re-fetched and diffed (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchTarget {
    pub id: Uuid,
    pub url: String,
    pub interval_secs: u64,
    pub webhook_url: Option<String>,
    /// Percent, in [0,100]. Defaults to 1.
    pub change_threshold: f64,
    pub extract_policy: Option<String>,
    pub status: WatchStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_checked: Option<chrono::DateTime<chrono::Utc>>,
    pub last_changed: Option<chrono::DateTime<chrono::Utc>>,
    pub check_count: u64,
    pub change_count: u64,
    pub last_error: Option<String>,
}

impl WatchTarget {
    pub fn new(url: String, requested_interval_secs: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            interval_secs: requested_interval_secs.max(MIN_INTERVAL_SECS),
            webhook_url: None,
            change_threshold: 1.0,
            extract_policy: None,
            status: WatchStatus::Active,
            created_at: chrono::Utc::now(),
            last_checked: None,
            last_changed: None,
            check_count: 0,
            change_count: 0,
            last_error: None,
        }
    }

    /// Whether this target is due for a check relative to `now`.
    pub fn is_due(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        match self.last_checked {
            None => true,
            Some(last) => (now - last).num_seconds() >= self.interval_secs as i64,
        }
    }
}

/// An append-only record of a detected change (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEvent {
    pub watch_id: Uuid,
    pub url: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub change_percent: f64,
    pub summary: String,
    pub previous_hash: Option<String>,
    pub current_hash: String,
}
