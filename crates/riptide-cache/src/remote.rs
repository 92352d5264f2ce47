//! Remote (outer-tier) key/value store adapter (§4.5, component G).
//!
//! The `TwoTierCache` talks to the remote tier only through this trait so
//! that its own logic is storage-agnostic; `RedisRemoteStore` is the
//! production adapter, `InMemoryRemoteStore` a deterministic test double
//! that can be told to fail on demand (used to exercise the circuit
//! breaker in §8 scenario 5).

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteStoreError {
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}

/// A remote key/value store, storing opaque, already-serialized bytes
/// (§9 "Cache generics": values are encoded as JSON at the remote-adapter
/// boundary, decoded back into `T` by the caller).
#[async_trait]
pub trait RemoteCacheStore: std::fmt::Debug + Send + Sync {
    async fn is_ready(&self) -> bool;
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RemoteStoreError>;
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), RemoteStoreError>;
    async fn delete(&self, key: &str) -> Result<(), RemoteStoreError>;
    async fn clear(&self) -> Result<(), RemoteStoreError>;
}

/// Redis-backed remote store.
#[derive(Debug, Clone)]
pub struct RedisRemoteStore {
    client: redis::Client,
}

impl RedisRemoteStore {
    pub fn new(redis_url: &str) -> Result<Self, RemoteStoreError> {
        let client =
            redis::Client::open(redis_url).map_err(|e| RemoteStoreError::Unavailable(e.to_string()))?;
        Ok(Self { client })
    }

    async fn connection(
        &self,
    ) -> Result<redis::aio::MultiplexedConnection, RemoteStoreError> {
        self.client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| RemoteStoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl RemoteCacheStore for RedisRemoteStore {
    async fn is_ready(&self) -> bool {
        self.connection().await.is_ok()
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RemoteStoreError> {
        use redis::AsyncCommands;
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| RemoteStoreError::Unavailable(e.to_string()))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), RemoteStoreError> {
        use redis::AsyncCommands;
        let mut conn = self.connection().await?;
        let _: () = conn
            .set(key, value)
            .await
            .map_err(|e| RemoteStoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RemoteStoreError> {
        use redis::AsyncCommands;
        let mut conn = self.connection().await?;
        let _: () = conn
            .del(key)
            .await
            .map_err(|e| RemoteStoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), RemoteStoreError> {
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(|e| RemoteStoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

/// Deterministic in-process fake used in tests and local/dev setups
/// without a real Redis instance. `force_failure` lets tests simulate an
/// outage to drive the circuit breaker.
#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    data: DashMap<String, Vec<u8>>,
    force_failure: AtomicBool,
}

impl InMemoryRemoteStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Toggle forced failures, simulating an outage.
    pub fn set_failing(&self, failing: bool) {
        self.force_failure.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteCacheStore for InMemoryRemoteStore {
    async fn is_ready(&self) -> bool {
        // Connectivity is established regardless of the forced-failure
        // flag below — `force_failure` simulates per-operation errors
        // (timeouts, dropped connections), not a torn-down client.
        true
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RemoteStoreError> {
        if self.force_failure.load(Ordering::SeqCst) {
            return Err(RemoteStoreError::Unavailable("forced failure".into()));
        }
        Ok(self.data.get(key).map(|v| v.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), RemoteStoreError> {
        if self.force_failure.load(Ordering::SeqCst) {
            return Err(RemoteStoreError::Unavailable("forced failure".into()));
        }
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RemoteStoreError> {
        if self.force_failure.load(Ordering::SeqCst) {
            return Err(RemoteStoreError::Unavailable("forced failure".into()));
        }
        self.data.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), RemoteStoreError> {
        if self.force_failure.load(Ordering::SeqCst) {
            return Err(RemoteStoreError::Unavailable("forced failure".into()));
        }
        self.data.clear();
        Ok(())
    }
}
