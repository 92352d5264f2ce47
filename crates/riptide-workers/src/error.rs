//! Behavioral error kinds for watch registration and polling (§7).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    /// No `WatchTarget` exists for the given id; surfaced to the caller,
    /// never logged as a system fault (§7 "Invalid input").
    #[error("watch not found: {id}")]
    NotFound { id: uuid::Uuid },

    /// Caller-supplied registration input failed validation.
    #[error("invalid watch configuration: {message}")]
    InvalidInput { message: String },

    /// Persisting or reading a watch's config/events file failed.
    #[error("watch persistence error: {message}")]
    Persistence { message: String },
}

impl WatchError {
    pub fn not_found(id: uuid::Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }
}

pub type WatchResult<T> = Result<T, WatchError>;
