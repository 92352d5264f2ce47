//! Composition root (§9 "Singletons"): wires `CircuitBreaker` ->
//! `TwoTierCache` -> `Distiller` -> `WatchManager`/`AgenticExtractor`/
//! `WorkflowEngine` through explicit construction and dependency
//! injection, rather than module-level statics. Owns the process-wide
//! lifecycle: everything long-lived is created here and released by
//! [`Services::shutdown`].

use riptide_cache::{RemoteCacheStore, TwoTierCache, TwoTierCacheConfig};
use riptide_config::ServiceSettings;
use riptide_extraction::extractors::{DomHeuristicExtractor, FallbackExtractor, ReadabilityExtractor};
use riptide_extraction::Distiller;
use riptide_headless::AgenticExtractor;
use riptide_reliability::CircuitBreakerConfig;
use riptide_types::model::DistillationResult;
use riptide_types::ports::{DiffEngine, FetchClient, PolicyEngine};
use riptide_workers::WatchManager;
use riptide_workflow::WorkflowEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Everything a host needs to run the distillation and watch system,
/// built once at startup and torn down once at shutdown.
pub struct Services {
    pub settings: ServiceSettings,
    pub distiller: Arc<Distiller>,
    pub distillation_cache: Arc<TwoTierCache<DistillationResult>>,
    pub watch_manager: Arc<WatchManager>,
    pub agentic_extractor: Arc<AgenticExtractor>,
    pub workflow_engine: Arc<WorkflowEngine>,
}

impl Services {
    /// Builds the default extraction ensemble (`dom-heuristic`,
    /// `readability`, `fallback`) the way `SPEC_FULL` §4 "Supplemented
    /// detail" describes — real, heterogeneous, testable candidates for
    /// the ensemble, with marketplace/ML adapters left to a host to
    /// supply via [`ServicesBuilder::with_marketplace_adapters`]-style
    /// extension points in `Distiller`.
    fn default_distiller(policy_engine: Option<Arc<dyn PolicyEngine>>) -> Distiller {
        let mut distiller = Distiller::new(vec![
            Arc::new(ReadabilityExtractor::new()),
            Arc::new(DomHeuristicExtractor::new()),
            Arc::new(FallbackExtractor::new()),
        ]);
        if let Some(policy) = policy_engine {
            distiller = distiller.with_policy_engine(policy);
        }
        distiller
    }

    /// Constructs every component and rehydrates any watches persisted
    /// under `data_dir` from a previous run. Does not start the watch
    /// tick loop — it starts lazily on the first `add_watch` call, or
    /// explicitly via `services.watch_manager.start()`.
    pub async fn build(
        settings: ServiceSettings,
        fetch_client: Arc<dyn FetchClient>,
        diff_engine: Arc<dyn DiffEngine>,
        policy_engine: Option<Arc<dyn PolicyEngine>>,
        remote_cache: Option<Arc<dyn RemoteCacheStore>>,
        data_dir: impl Into<PathBuf>,
    ) -> anyhow::Result<Arc<Self>> {
        let data_dir = data_dir.into();

        let distiller = Arc::new(Self::default_distiller(policy_engine));

        let circuit_config = CircuitBreakerConfig {
            failure_threshold: settings.circuit.failure_threshold,
            reset_timeout: settings.circuit.reset_timeout,
            half_open_max_attempts: settings.circuit.half_open_max_attempts,
        };
        let cache_config = TwoTierCacheConfig {
            lru_capacity: settings.cache.lru_capacity,
            default_ttl_ms: settings.cache.default_ttl_ms,
        };
        let distillation_cache = Arc::new(match remote_cache {
            Some(remote) => TwoTierCache::with_remote(cache_config, remote, circuit_config),
            None => TwoTierCache::lru_only(cache_config),
        });

        let watch_manager = WatchManager::new(
            Arc::clone(&fetch_client),
            Arc::clone(&distiller),
            Arc::clone(&diff_engine),
            data_dir.join("watches_root"),
        )
        .await?;

        info!("services composition root built");

        Ok(Arc::new(Self {
            settings,
            distiller,
            distillation_cache,
            watch_manager,
            agentic_extractor: Arc::new(AgenticExtractor::new()),
            workflow_engine: Arc::new(WorkflowEngine::new()),
        }))
    }

    /// Releases the watch tick loop and any other process-wide handles
    /// (§5 "Browser sessions and remote KV connections must be released
    /// deterministically on all exit paths", §9 "Timers and shutdown").
    pub async fn shutdown(&self) {
        self.watch_manager.shutdown().await;
        info!("services composition root shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use riptide_types::errors::CoreResult;
    use riptide_types::ports::{ChangeDetection, FetchRequest, FetchResult, HistoryEntry, Snapshot};

    #[derive(Debug)]
    struct NullFetchClient;

    #[async_trait]
    impl FetchClient for NullFetchClient {
        async fn fetch(&self, request: FetchRequest) -> CoreResult<FetchResult> {
            Ok(FetchResult {
                body: b"<html><body><p>hello</p></body></html>".to_vec(),
                final_url: request.url,
                status: 200,
                from_cache: false,
                etag: None,
                last_modified: None,
            })
        }
    }

    #[derive(Debug)]
    struct NullDiffEngine;

    #[async_trait]
    impl DiffEngine for NullDiffEngine {
        async fn detect_changes(
            &self,
            _url: &str,
            content: &str,
            title: Option<&str>,
        ) -> anyhow::Result<ChangeDetection> {
            Ok(ChangeDetection {
                has_changed: false,
                change_percent: 0.0,
                current_snapshot: Snapshot {
                    content_hash: format!("{}", content.len()),
                    timestamp: chrono::Utc::now(),
                    title: title.map(|t| t.to_string()),
                },
                previous_snapshot: None,
                summary: "no change".to_string(),
            })
        }

        async fn get_history(&self, _url: &str) -> anyhow::Result<Vec<HistoryEntry>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn builds_and_shuts_down_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let services = Services::build(
            ServiceSettings::default(),
            Arc::new(NullFetchClient),
            Arc::new(NullDiffEngine),
            None,
            None,
            dir.path(),
        )
        .await
        .unwrap();

        assert!(services.watch_manager.list_watches().is_empty());
        services.shutdown().await;
    }

    #[tokio::test]
    async fn distiller_wired_through_services_runs_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let services = Services::build(
            ServiceSettings::default(),
            Arc::new(NullFetchClient),
            Arc::new(NullDiffEngine),
            None,
            None,
            dir.path(),
        )
        .await
        .unwrap();

        let result = services
            .distiller
            .distill("<html><body><p>hello world</p></body></html>", "https://example.com", None)
            .await
            .unwrap();
        assert!(!result.content_hash.is_empty());
        services.shutdown().await;
    }
}
