//! Crate-wide error types
//!
//! Mirrors the shape of a typical RipTide `CoreError`: one flat enum of
//! behavioral error kinds rather than per-operation types, each variant
//! carrying enough context to log structurally and decide retryability.

use thiserror::Error;

/// Core error type shared across the distillation/watch system.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The requested resource does not exist (e.g. unknown watch id).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Caller-supplied input failed validation; never logged as a system
    /// fault, always surfaced to the caller.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A remote or external collaborator (HTTP, remote cache, browser)
    /// failed in a way that may succeed on retry.
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// The circuit protecting a dependency is open; distinguished from
    /// `UpstreamUnavailable` so callers that want to branch on it can.
    #[error("circuit open: {message}")]
    CircuitOpen { message: String },

    /// An operation exceeded its deadline.
    #[error("timeout after {elapsed_ms}ms: {message}")]
    Timeout { message: String, elapsed_ms: u64 },

    /// Serialization/deserialization failure.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// Configuration is missing or malformed.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A bug: state that should be unreachable given the documented
    /// invariants. Logged with full context; should not crash the host.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    pub fn circuit_open(message: impl Into<String>) -> Self {
        Self::CircuitOpen {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::Timeout {
            message: message.into(),
            elapsed_ms,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether a caller's retry policy should consider retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::UpstreamUnavailable { .. } | CoreError::Timeout { .. }
        )
    }
}

/// Convenience alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;
