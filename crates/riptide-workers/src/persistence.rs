//! On-disk layout for watch state (§6):
//!
//! ```text
//! <data>/watches/<watchId>/config.json   # serialized WatchTarget
//! <data>/watches/<watchId>/events.jsonl  # newline-delimited WatchEvent, append-only
//! ```
//!
//! Files are UTF-8 JSON exactly as shaped in §3. Reads return events
//! newest-first (§3 "newest-last in persistent log, newest-first in
//! queries"); the on-disk file itself stays append-only so a crash never
//! loses ordering information.

use crate::error::{WatchError, WatchResult};
use riptide_types::model::{WatchEvent, WatchTarget};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct WatchStore {
    data_dir: PathBuf,
}

impl WatchStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn target_dir(&self, id: Uuid) -> PathBuf {
        self.data_dir.join("watches").join(id.to_string())
    }

    fn config_path(&self, id: Uuid) -> PathBuf {
        self.target_dir(id).join("config.json")
    }

    fn events_path(&self, id: Uuid) -> PathBuf {
        self.target_dir(id).join("events.jsonl")
    }

    /// Every watch id with a persisted config, discovered on startup so
    /// in-memory state can be rehydrated after a restart.
    pub async fn list_ids(&self) -> WatchResult<Vec<Uuid>> {
        let watches_dir = self.data_dir.join("watches");
        if !watches_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = fs::read_dir(&watches_dir)
            .await
            .map_err(|e| WatchError::persistence(e.to_string()))?;
        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| WatchError::persistence(e.to_string()))?
        {
            if let Some(name) = entry.file_name().to_str() {
                if let Ok(id) = Uuid::parse_str(name) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    pub async fn save_target(&self, target: &WatchTarget) -> WatchResult<()> {
        let dir = self.target_dir(target.id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| WatchError::persistence(e.to_string()))?;
        let json = serde_json::to_vec_pretty(target)
            .map_err(|e| WatchError::persistence(e.to_string()))?;
        fs::write(self.config_path(target.id), json)
            .await
            .map_err(|e| WatchError::persistence(e.to_string()))?;
        Ok(())
    }

    pub async fn load_target(&self, id: Uuid) -> WatchResult<WatchTarget> {
        let bytes = fs::read(self.config_path(id))
            .await
            .map_err(|_| WatchError::not_found(id))?;
        serde_json::from_slice(&bytes).map_err(|e| WatchError::persistence(e.to_string()))
    }

    /// Deletes the watch's entire persisted directory (config + events).
    pub async fn delete_target(&self, id: Uuid) -> WatchResult<()> {
        let dir = self.target_dir(id);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| WatchError::persistence(e.to_string()))?;
        }
        Ok(())
    }

    /// Appends one event to the newline-delimited log (§5: "events are
    /// strictly timestamp-ordered by append").
    pub async fn append_event(&self, event: &WatchEvent) -> WatchResult<()> {
        let dir = self.target_dir(event.watch_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| WatchError::persistence(e.to_string()))?;
        let mut line = serde_json::to_vec(event).map_err(|e| WatchError::persistence(e.to_string()))?;
        line.push(b'\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.events_path(event.watch_id))
            .await
            .map_err(|e| WatchError::persistence(e.to_string()))?;
        file.write_all(&line)
            .await
            .map_err(|e| WatchError::persistence(e.to_string()))?;
        Ok(())
    }

    /// Reads events newest-first, capped at `limit` (§4.7 GetEvents).
    pub async fn read_events(&self, id: Uuid, limit: usize) -> WatchResult<Vec<WatchEvent>> {
        let path = self.events_path(id);
        if !Path::new(&path).exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path)
            .await
            .map_err(|e| WatchError::persistence(e.to_string()))?;

        let mut events: Vec<WatchEvent> = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();
        events.reverse();
        events.truncate(limit);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riptide_types::model::WatchTarget;

    fn tmp_store() -> (tempfile::TempDir, WatchStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = WatchStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn round_trips_target_config() {
        let (_dir, store) = tmp_store();
        let target = WatchTarget::new("https://example.com".to_string(), 60);
        store.save_target(&target).await.unwrap();

        let loaded = store.load_target(target.id).await.unwrap();
        assert_eq!(loaded.id, target.id);
        assert_eq!(loaded.url, target.url);
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let (_dir, store) = tmp_store();
        let err = store.load_target(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, WatchError::NotFound { .. }));
    }

    #[tokio::test]
    async fn events_read_newest_first_and_capped() {
        let (_dir, store) = tmp_store();
        let watch_id = Uuid::new_v4();
        for i in 0..5 {
            let event = WatchEvent {
                watch_id,
                url: "https://example.com".to_string(),
                timestamp: chrono::Utc::now(),
                change_percent: i as f64,
                summary: format!("change {i}"),
                previous_hash: None,
                current_hash: format!("hash{i}"),
            };
            store.append_event(&event).await.unwrap();
        }

        let events = store.read_events(watch_id, 3).await.unwrap();
        assert_eq!(events.len(), 3);
        // Newest-first: the last appended event (change 4) comes first.
        assert_eq!(events[0].summary, "change 4");
        assert_eq!(events[2].summary, "change 2");
    }

    #[tokio::test]
    async fn delete_removes_persisted_directory() {
        let (_dir, store) = tmp_store();
        let target = WatchTarget::new("https://example.com".to_string(), 60);
        store.save_target(&target).await.unwrap();
        store.delete_target(target.id).await.unwrap();
        assert!(store.load_target(target.id).await.is_err());
    }
}
