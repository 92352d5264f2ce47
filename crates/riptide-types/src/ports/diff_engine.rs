//! DiffEngine port (§6: change detection + its own persisted history).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A content snapshot as tracked by the diff engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub content_hash: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub title: Option<String>,
}

/// Result of `DetectChanges` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeDetection {
    pub has_changed: bool,
    /// In [0,100].
    pub change_percent: f64,
    pub current_snapshot: Snapshot,
    pub previous_snapshot: Option<Snapshot>,
    pub summary: String,
}

/// One entry of `GetHistory` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub snapshot: Snapshot,
    pub change_percent: f64,
}

/// Content-change detection, owning its own persistence (§6, component I).
#[async_trait]
pub trait DiffEngine: Debug + Send + Sync {
    async fn detect_changes(
        &self,
        url: &str,
        content: &str,
        title: Option<&str>,
    ) -> anyhow::Result<ChangeDetection>;

    async fn get_history(&self, url: &str) -> anyhow::Result<Vec<HistoryEntry>>;
}
