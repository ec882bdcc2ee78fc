//! Unified error types for the plants harvester.
//!
//! Fetch-path errors split into retryable (`Transient`) and terminal
//! (`Permanent`, `Normalization`, `Cancelled`) cases. Collaborator errors
//! (`Config`, `Table`, `Io`) abort the run instead of failing one symbol.

use serde::Serialize;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal classification for a symbol that produced no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Transient failures persisted past the attempt budget.
    RetriesExhausted,
    /// Non-retryable response (unknown symbol, other 4xx, undecodable body).
    Permanent,
    /// Response arrived but violated the record contract.
    Normalization,
    /// Run was cancelled before the symbol resolved.
    Cancelled,
}

impl FailureKind {
    /// Stable name used in logs and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RetriesExhausted => "retries_exhausted",
            Self::Permanent => "permanent",
            Self::Normalization => "normalization",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Unified error type for the plants harvester.
#[derive(Debug, Error)]
pub enum Error {
    /// Retryable request failure: timeout, transport error, 429, or 5xx.
    #[error("transient request failure: {reason}")]
    Transient {
        reason: String,
        /// Server-requested wait in seconds (429 Retry-After), if present.
        retry_after: Option<u64>,
    },

    /// Non-retryable request failure.
    #[error("permanent request failure (status {status}): {reason}")]
    Permanent { status: u16, reason: String },

    /// Record fetched but missing mandatory identity fields.
    #[error("cannot normalize record for {symbol}: {reason}")]
    Normalization { symbol: String, reason: String },

    /// The run was stopped externally before this work completed.
    #[error("operation cancelled")]
    Cancelled,

    #[error("config error: {0}")]
    Config(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a transient (retryable) error.
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
            retry_after: None,
        }
    }

    /// Create a transient error carrying the server's requested wait.
    pub fn rate_limited(reason: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::Transient {
            reason: reason.into(),
            retry_after,
        }
    }

    /// Create a permanent (non-retryable) error.
    pub fn permanent(status: u16, reason: impl Into<String>) -> Self {
        Self::Permanent {
            status,
            reason: reason.into(),
        }
    }

    /// Create a normalization error for a symbol.
    pub fn normalization(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Normalization {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn table(msg: impl Into<String>) -> Self {
        Self::Table(msg.into())
    }

    /// Whether the fetch layer may retry after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Server-requested wait in seconds, if this error carries one.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Transient { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Terminal classification when this error fails a symbol.
    ///
    /// `Transient` only reaches terminal classification once the attempt
    /// budget is spent.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Transient { .. } => FailureKind::RetriesExhausted,
            Self::Normalization { .. } => FailureKind::Normalization,
            Self::Cancelled => FailureKind::Cancelled,
            _ => FailureKind::Permanent,
        }
    }
}
