use thiserror::Error;

use crate::http_client::HttpError;

/// Validation and contract errors exposed by `toprank-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("listing date must match YYYY/MM/DD: '{value}'")]
    InvalidListingDate { value: String },

    #[error("field '{field}' is not a decimal number: '{value}'")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("percentage change for '{ticker}' is not finite")]
    NonFinitePercentage { ticker: String },

    #[error("category code cannot be empty")]
    EmptyCategoryCode,

    #[error("worker concurrency must be greater than zero")]
    ZeroConcurrency,
    #[error("retry budget must allow at least one attempt")]
    ZeroAttempts,

    #[error("invalid destination '{value}', expected one of local, remote")]
    InvalidDestination { value: String },
    #[error("remote destination requires a remote endpoint")]
    MissingRemoteEndpoint,
}

/// Fatal outcome of a [`crate::FetchClient`] call.
///
/// Transient transport failures and rejected statuses are absorbed by the retry
/// loop; only these variants escape it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("giving up on {url} after {attempts} attempts: {last_failure}")]
    RetryExhausted {
        url: String,
        attempts: u32,
        last_failure: String,
    },

    #[error("non-retryable transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: HttpError,
    },

    #[error("upstream reported an error for {url} even after re-warming the session")]
    UpstreamError { url: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::RetryExhausted { url, .. }
            | Self::Transport { url, .. }
            | Self::UpstreamError { url } => url,
        }
    }
}

/// Structural failure while turning a payload into records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid selector '{selector}'")]
    Selector { selector: String },
}

/// Failure to persist an artifact.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("remote store rejected {key} with status {status}")]
    Remote { key: String, status: u16 },

    #[error("remote store transport error for {key}: {source}")]
    RemoteTransport {
        key: String,
        #[source]
        source: HttpError,
    },
}

/// Top-level error type for a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("background task failed: {0}")]
    TaskFailed(String),
}
