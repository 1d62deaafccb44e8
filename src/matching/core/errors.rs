//! Error types for the matching subsystem.

use thiserror::Error;

/// Matching subsystem error type.
///
/// Only [`MatchError::Sqlite`], [`MatchError::TokioSqlite`] and [`MatchError::Timeout`] raised
/// by the relational store ever reach a search caller; everything else is absorbed by a
/// fallback tier.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A row could not be projected into a record.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// A referenced record does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Record kind, e.g. `job` or `candidate`.
        kind: &'static str,
        /// Record identifier.
        id: i64,
    },
    /// Model output was not well-formed structured data.
    #[error("could not parse model response: {0}")]
    ParseFailure(String),
    /// Embedding or language-model provider failed or is rate limited.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// A collaborator call exceeded its deadline.
    #[error("{operation} timed out after {millis} ms")]
    Timeout {
        /// Operation that timed out.
        operation: &'static str,
        /// Deadline in milliseconds.
        millis: u64,
    },
    /// `SQLite` storage error (sync).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// `SQLite` storage error (async).
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] rig::embeddings::EmbeddingError),
    /// HTTP client error from Rig.
    #[error("http client error: {0}")]
    HttpClient(#[from] rig::http_client::Error),
    /// Completion error.
    #[error("completion error: {0}")]
    Completion(#[from] rig::completion::CompletionError),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// Required `SQLite` extension not available.
    #[error("sqlite-vec extension is not available; load it before initializing the vector index")]
    SqliteVecUnavailable,
}

impl MatchError {
    /// Build a timeout error from a duration.
    #[must_use]
    pub fn timeout(operation: &'static str, deadline: std::time::Duration) -> Self {
        Self::Timeout {
            operation,
            millis: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Convenience result alias for matching operations.
pub type MatchResult<T> = Result<T, MatchError>;
