//! Cooperative polling scheduler for registered URLs (§4.7, component J).
//!
//! Mirrors the shape of `riptide-workers::scheduler::JobScheduler` in the
//! teacher crate: a `DashMap` of in-memory state, a background tick loop
//! guarded by an `AtomicBool` running flag, and a single-flight guard so
//! overlapping ticks never stack up.

use crate::error::{WatchError, WatchResult};
use crate::persistence::WatchStore;
use crate::webhook;
use dashmap::DashMap;
use riptide_extraction::Distiller;
use riptide_types::model::{NodeType, WatchEvent, WatchStatus, WatchTarget};
use riptide_types::ports::{DiffEngine, FetchClient, FetchRequest};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// How often the scheduler wakes up to look for due targets (§4.7).
pub const TICK_INTERVAL: Duration = Duration::from_secs(30);

/// Options accepted by `AddWatch` (§4.7). Mirrors the field set of
/// `WatchTarget` that a caller is allowed to choose at registration time.
#[derive(Debug, Clone, Default)]
pub struct AddWatchOptions {
    pub webhook_url: Option<String>,
    /// Percent, in [0,100]. Defaults to 1 if `None`.
    pub change_threshold: Option<f64>,
    pub extract_policy: Option<String>,
}

/// Cooperative scheduler: persistent registration, periodic polling,
/// change detection via an injected [`DiffEngine`], event persistence and
/// webhook fan-out (§4.7, component J).
pub struct WatchManager {
    targets: DashMap<Uuid, WatchTarget>,
    store: WatchStore,
    fetch_client: Arc<dyn FetchClient>,
    distiller: Arc<Distiller>,
    diff_engine: Arc<dyn DiffEngine>,
    http_client: reqwest::Client,
    tick_interval: Duration,
    ticking: AtomicBool,
    running: AtomicBool,
    tick_handle: Mutex<Option<JoinHandle<()>>>,
}

impl WatchManager {
    /// Constructs a manager and rehydrates any watches persisted under
    /// `data_dir` from a previous run. Does not start the tick loop —
    /// call [`WatchManager::start`] or register a watch via
    /// [`WatchManager::add_watch`], which starts it lazily.
    pub async fn new(
        fetch_client: Arc<dyn FetchClient>,
        distiller: Arc<Distiller>,
        diff_engine: Arc<dyn DiffEngine>,
        data_dir: impl Into<std::path::PathBuf>,
    ) -> WatchResult<Arc<Self>> {
        let store = WatchStore::new(data_dir);
        let targets = DashMap::new();

        for id in store.list_ids().await? {
            match store.load_target(id).await {
                Ok(target) => {
                    targets.insert(id, target);
                }
                Err(err) => warn!(watch_id = %id, error = %err, "failed to rehydrate persisted watch"),
            }
        }

        Ok(Arc::new(Self {
            targets,
            store,
            fetch_client,
            distiller,
            diff_engine,
            http_client: reqwest::Client::new(),
            tick_interval: TICK_INTERVAL,
            ticking: AtomicBool::new(false),
            running: AtomicBool::new(false),
            tick_handle: Mutex::new(None),
        }))
    }

    /// Registers a new watch, persists it and ensures the tick loop is
    /// running (§4.7 AddWatch).
    pub async fn add_watch(
        self: &Arc<Self>,
        url: String,
        requested_interval_secs: u64,
        options: AddWatchOptions,
    ) -> WatchResult<WatchTarget> {
        if url.trim().is_empty() {
            return Err(WatchError::invalid_input("url must not be empty"));
        }

        let mut target = WatchTarget::new(url, requested_interval_secs);
        target.webhook_url = options.webhook_url;
        target.extract_policy = options.extract_policy;
        if let Some(threshold) = options.change_threshold {
            target.change_threshold = threshold.clamp(0.0, 100.0);
        }

        self.store.save_target(&target).await?;
        let id = target.id;
        self.targets.insert(id, target.clone());

        self.ensure_started();
        info!(watch_id = %id, url = %target.url, interval = target.interval_secs, "watch registered");
        Ok(target)
    }

    /// Removes a watch from memory and deletes its persisted directory
    /// (§4.7 RemoveWatch).
    pub async fn remove_watch(&self, id: Uuid) -> WatchResult<bool> {
        let removed = self.targets.remove(&id).is_some();
        if removed {
            self.store.delete_target(id).await?;
            info!(watch_id = %id, "watch removed");
        }
        Ok(removed)
    }

    async fn set_status(&self, id: Uuid, status: WatchStatus, clear_error: bool) -> WatchResult<()> {
        let mut target = self
            .targets
            .get_mut(&id)
            .ok_or_else(|| WatchError::not_found(id))?;
        target.status = status;
        if clear_error {
            target.last_error = None;
        }
        self.store.save_target(&target).await?;
        Ok(())
    }

    pub async fn pause_watch(&self, id: Uuid) -> WatchResult<()> {
        self.set_status(id, WatchStatus::Paused, false).await
    }

    pub async fn resume_watch(&self, id: Uuid) -> WatchResult<()> {
        self.set_status(id, WatchStatus::Active, true).await
    }

    pub fn get_watch(&self, id: Uuid) -> WatchResult<WatchTarget> {
        self.targets
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| WatchError::not_found(id))
    }

    pub fn list_watches(&self) -> Vec<WatchTarget> {
        self.targets.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Newest-first, capped at `limit` (§4.7 GetEvents).
    pub async fn get_events(&self, id: Uuid, limit: usize) -> WatchResult<Vec<WatchEvent>> {
        if !self.targets.contains_key(&id) {
            return Err(WatchError::not_found(id));
        }
        self.store.read_events(id, limit).await
    }

    /// Starts the background tick loop if it is not already running.
    /// Idempotent; safe to call from multiple call sites (e.g. both an
    /// explicit startup call and the lazy call from `add_watch`).
    pub fn ensure_started(self: &Arc<Self>) {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            this.run_loop().await;
        });

        // Best-effort: if a previous handle exists (shouldn't, guarded by
        // `running`), it is simply dropped and replaced.
        if let Ok(mut guard) = self.tick_handle.try_lock() {
            *guard = Some(handle);
        }
    }

    pub fn start(self: &Arc<Self>) {
        self.ensure_started();
    }

    /// Stops the tick loop and releases its background task (§5, §9
    /// "Timers and shutdown").
    pub async fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let handle = self.tick_handle.lock().await.take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    async fn run_loop(self: Arc<Self>) {
        info!("watch manager tick loop starting");
        while self.running.load(Ordering::SeqCst) {
            self.run_tick().await;
            tokio::time::sleep(self.tick_interval).await;
        }
        info!("watch manager tick loop stopped");
    }

    /// One pass of the scheduler (§4.7 "Polling loop"): single-flight,
    /// then check every due, active target.
    pub async fn run_tick(self: &Arc<Self>) {
        if self
            .ticking
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("previous tick still in flight, skipping");
            return;
        }

        let now = chrono::Utc::now();
        let due: Vec<Uuid> = self
            .targets
            .iter()
            .filter(|entry| entry.status == WatchStatus::Active && entry.is_due(now))
            .map(|entry| *entry.key())
            .collect();

        for id in due {
            if let Err(err) = self.check_target(id).await {
                error!(watch_id = %id, error = %err, "unexpected error checking watch target");
            }
        }

        self.ticking.store(false, Ordering::SeqCst);
    }

    /// Per-target check (§4.7): fetch, distill, diff, persist. Individual
    /// failures never propagate past this call — they are recorded on
    /// the target's `status`/`last_error` instead (§7).
    async fn check_target(self: &Arc<Self>, id: Uuid) -> WatchResult<()> {
        let (url, extract_policy, was_error) = {
            let target = self
                .targets
                .get(&id)
                .ok_or_else(|| WatchError::not_found(id))?;
            (
                target.url.clone(),
                target.extract_policy.clone(),
                target.status == WatchStatus::Error,
            )
        };

        let outcome = self.run_check(&url, extract_policy.as_deref()).await;

        let mut target = self
            .targets
            .get_mut(&id)
            .ok_or_else(|| WatchError::not_found(id))?;
        target.last_checked = Some(chrono::Utc::now());
        target.check_count += 1;

        match outcome {
            Ok(detection_and_hash) => {
                let (detection, current_hash, title) = detection_and_hash;
                if was_error {
                    target.status = WatchStatus::Active;
                    target.last_error = None;
                }

                if detection.has_changed && detection.change_percent >= target.change_threshold {
                    target.last_changed = Some(chrono::Utc::now());
                    target.change_count += 1;

                    let event = WatchEvent {
                        watch_id: id,
                        url: target.url.clone(),
                        timestamp: chrono::Utc::now(),
                        change_percent: detection.change_percent,
                        summary: detection.summary.clone(),
                        previous_hash: detection.previous_snapshot.as_ref().map(|s| s.content_hash.clone()),
                        current_hash,
                    };
                    self.store.append_event(&event).await?;

                    if let Some(webhook_url) = target.webhook_url.clone() {
                        let client = self.http_client.clone();
                        tokio::spawn(async move {
                            webhook::deliver(&client, &webhook_url, &event).await;
                        });
                    }

                    info!(
                        watch_id = %id,
                        change_percent = detection.change_percent,
                        title = ?title,
                        "watch target changed"
                    );
                }
            }
            Err(err) => {
                warn!(watch_id = %id, error = %err, "watch check failed");
                target.status = WatchStatus::Error;
                target.last_error = Some(err.to_string());
            }
        }

        self.store.save_target(&target).await?;
        Ok(())
    }

    /// Fetch + distill + diff for one URL, returning everything the
    /// caller needs to update the target and emit an event.
    async fn run_check(
        &self,
        url: &str,
        extract_policy: Option<&str>,
    ) -> anyhow::Result<(riptide_types::ports::ChangeDetection, String, Option<String>)> {
        let fetch_result = self
            .fetch_client
            .fetch(FetchRequest::http(url).bypass_cache())
            .await?;

        let html = fetch_result.body_as_str().into_owned();
        let distillation = self.distiller.distill(&html, url, extract_policy).await?;

        let title = distillation
            .nodes
            .iter()
            .find(|node| node.node_type == NodeType::Heading)
            .map(|node| node.text.clone());

        let detection = self
            .diff_engine
            .detect_changes(url, &distillation.content_text, title.as_deref())
            .await?;

        Ok((detection, distillation.content_hash, title))
    }
}
