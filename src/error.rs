//! Error types for stop-herald.
//!
//! `ProviderError` never leaves the cascade: the bounded invoker turns it
//! into an [`InvocationOutcome`](crate::cascade::InvocationOutcome).
//! `RecorderError` is returned by the log writers and only ever logged.

use std::path::PathBuf;

/// Fault raised by a concrete text or speech backend.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Transport-level HTTP failure (connect, TLS, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response parsed but did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The backend produced nothing usable.
    #[error("empty output")]
    EmptyOutput,

    /// A local speech command failed to start or exited non-zero.
    #[error("process error: {0}")]
    Process(String),

    /// Audio device or playback failure.
    #[error("audio error: {0}")]
    Audio(String),
}

impl ProviderError {
    /// Build a `Status` error, keeping only the head of the body.
    pub fn status(status: u16, body: &str) -> Self {
        let body: String = body.trim().chars().take(200).collect();
        Self::Status { status, body }
    }
}

/// Failure while persisting the event log, transcript export or history.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session event is not a JSON object")]
    NotAnObject,
}

impl RecorderError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
