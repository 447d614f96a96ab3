//! Error types for the I/O collaborators
//!
//! Detection itself is infallible; only fetching candles and delivering
//! alerts can fail.

use thiserror::Error;

/// Candle retrieval failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("exchange returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode kline payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("malformed kline payload: {0}")]
    Malformed(String),
}

/// Alert delivery failure
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("failed to reach messaging API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("messaging API rejected the message ({status}): {description}")]
    Rejected {
        status: reqwest::StatusCode,
        description: String,
    },
}
