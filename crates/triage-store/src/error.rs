//! Error types for the triage-store crate.
//!
//! All store operations return [`StoreError`] via [`StoreResult`].

use std::path::PathBuf;

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the request store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The requested record was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: u64 },

    /// Two records share an id.
    #[error("duplicate request id: {0}")]
    DuplicateId(u64),

    /// Every request id up to `u64::MAX` is taken.
    #[error("request ids exhausted")]
    IdExhausted,

    /// A record failed core validation (unknown status, bad field, ...).
    #[error("invalid record: {0}")]
    Core(#[from] triage_core::TriageError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
