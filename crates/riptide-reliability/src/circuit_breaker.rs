//! Three-state circuit breaker (§4.6, §8 scenario 4).
//!
//! Mirrors the phase-based locking pattern used elsewhere in the RipTide
//! codebase: a single `Mutex` guards all mutable state, and every method
//! that crosses an `.await` boundary releases the lock before doing so.
//! Unlike a metrics-heavy variant, this breaker only tracks what §4.6
//! actually specifies: consecutive failures, the open timestamp, and the
//! half-open probe budget.

use riptide_types::model::{CircuitBreakerState, CircuitState};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Circuit breaker tuning (§4.6).
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens. Default 5.
    pub failure_threshold: u32,
    /// How long to stay open before probing again. Default 30s.
    pub reset_timeout: Duration,
    /// Maximum probe requests allowed while half-open. Default 1.
    pub half_open_max_attempts: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_millis(30_000),
            half_open_max_attempts: 1,
        }
    }
}

/// Distinct "circuit open" condition (§7: "Circuit open — distinct
/// condition, caught internally by TwoTierCache and translated into a
/// cache miss; never surfaced to callers" of the cache — but callers of
/// the breaker itself, e.g. a direct HTTP dependency, do see this error).
#[derive(Debug, Error, Clone, Copy)]
#[error("circuit breaker is open")]
pub struct CircuitOpenError;

struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    half_open_attempts: u32,
}

impl Inner {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            half_open_attempts: 0,
        }
    }
}

/// A three-state (closed/open/half-open) failure shield (§4.6, component H).
#[derive(Clone)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<Inner>>,
    name: Arc<str>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .finish()
    }
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(Inner::new())),
            name: name.into().into(),
        }
    }

    /// Attempt to acquire permission to make a call. On `Ok`, the caller
    /// MUST report the outcome via `record_success`/`record_failure`.
    ///
    /// Performs the lazy open -> half-open transition described in §4.6:
    /// the check happens here, on the next call, rather than on a
    /// background timer.
    pub async fn try_acquire(&self) -> Result<(), CircuitOpenError> {
        let mut inner = self.inner.lock().await;

        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= self.config.reset_timeout {
                    info!(breaker = %self.name, "circuit transitioning open -> half_open");
                    inner.state = CircuitState::HalfOpen;
                    inner.half_open_attempts = 1;
                    Ok(())
                } else {
                    Err(CircuitOpenError)
                }
            }
            CircuitState::HalfOpen => {
                if inner.half_open_attempts < self.config.half_open_max_attempts {
                    inner.half_open_attempts += 1;
                    Ok(())
                } else {
                    Err(CircuitOpenError)
                }
            }
        }
    }

    /// Record a successful call (§4.6 transition table).
    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                info!(breaker = %self.name, "circuit closing after successful probe");
                inner.state = CircuitState::Closed;
                inner.consecutive_failures = 0;
                inner.opened_at = None;
                inner.half_open_attempts = 0;
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed call (§4.6 transition table).
    pub async fn record_failure(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    warn!(
                        breaker = %self.name,
                        failures = inner.consecutive_failures,
                        "circuit opening after consecutive failures"
                    );
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            CircuitState::HalfOpen => {
                warn!(breaker = %self.name, "circuit reopening after failed probe");
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.half_open_attempts = 0;
            }
            CircuitState::Open => {}
        }
    }

    /// Execute `operation` under the breaker's protection: acquire a
    /// permit, run the operation, and report its outcome.
    pub async fn call<F, Fut, T, E>(&self, operation: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        self.try_acquire().await.map_err(CallError::Open)?;

        match operation().await {
            Ok(value) => {
                self.record_success().await;
                Ok(value)
            }
            Err(err) => {
                self.record_failure().await;
                Err(CallError::Operation(err))
            }
        }
    }

    /// A point-in-time, report-friendly snapshot of breaker state (§3).
    pub async fn snapshot(&self) -> CircuitBreakerState {
        let inner = self.inner.lock().await;
        let last_failure_time = inner.opened_at.map(|instant| {
            let elapsed = instant.elapsed();
            chrono::Utc::now()
                - chrono::Duration::from_std(elapsed).unwrap_or(chrono::Duration::zero())
        });

        CircuitBreakerState {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            last_failure_time,
            half_open_attempts: inner.half_open_attempts,
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }
}

/// Outcome of `CircuitBreaker::call`: either the breaker rejected the
/// call, or the wrapped operation itself failed.
#[derive(Debug, Error)]
pub enum CallError<E> {
    #[error("circuit breaker open")]
    Open(#[from] CircuitOpenError),
    #[error("operation failed: {0}")]
    Operation(E),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: 5,
            reset_timeout: Duration::from_millis(30),
            half_open_max_attempts: 1,
        }
    }

    #[tokio::test]
    async fn opens_after_threshold_consecutive_failures() {
        let cb = CircuitBreaker::new("test", fast_config());

        for _ in 0..5 {
            cb.try_acquire().await.expect("closed permits calls");
            cb.record_failure().await;
        }

        assert_eq!(cb.state().await, CircuitState::Open);
        assert!(cb.try_acquire().await.is_err());
    }

    #[tokio::test]
    async fn full_cycle_closed_open_half_open_closed() {
        let cb = CircuitBreaker::new("test", fast_config());

        for _ in 0..5 {
            let _ = cb.try_acquire().await;
            cb.record_failure().await;
        }
        assert_eq!(cb.state().await, CircuitState::Open);

        // Sixth call before the cooldown elapses is rejected without
        // touching the protected operation (§8 scenario 4).
        assert!(cb.try_acquire().await.is_err());

        tokio::time::sleep(Duration::from_millis(40)).await;

        // Next call after cooldown transitions to half-open and is let
        // through as a probe.
        cb.try_acquire().await.expect("half-open allows the probe");
        assert_eq!(cb.state().await, CircuitState::HalfOpen);

        cb.record_success().await;
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn half_open_failure_reopens() {
        let cb = CircuitBreaker::new("test", fast_config());
        for _ in 0..5 {
            let _ = cb.try_acquire().await;
            cb.record_failure().await;
        }
        tokio::time::sleep(Duration::from_millis(40)).await;
        cb.try_acquire().await.unwrap();
        cb.record_failure().await;
        assert_eq!(cb.state().await, CircuitState::Open);
    }

    #[tokio::test]
    async fn success_in_closed_resets_failure_counter() {
        let cb = CircuitBreaker::new("test", fast_config());
        cb.record_failure().await;
        cb.record_failure().await;
        cb.record_success().await;

        // Another 4 failures (not enough alone to trip from a fresh
        // counter) should not open the circuit.
        for _ in 0..4 {
            cb.record_failure().await;
        }
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn call_wraps_operation_and_reports_outcome() {
        let cb = CircuitBreaker::new("test", fast_config());
        let result: Result<i32, CallError<&str>> = cb.call(|| async { Ok::<_, &str>(42) }).await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(cb.state().await, CircuitState::Closed);
    }
}
