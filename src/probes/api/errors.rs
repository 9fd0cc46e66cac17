// 3rd party crates
use reqwest::StatusCode;
use thiserror::Error;

// Current module imports
use super::types::LifecycleStep;

/// A deviation that ends a lifecycle run.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("HTTP client error: {0}")]
    HttpClientBuild(reqwest::Error),

    #[error("{step} request failed: {error}")]
    Transport {
        step: LifecycleStep,
        error: reqwest::Error,
    },

    #[error("{step} returned unexpected status {status}")]
    UnexpectedStatus {
        step: LifecycleStep,
        status: StatusCode,
    },

    #[error("{step} returned an invalid envelope: {message}")]
    InvalidEnvelope {
        step: LifecycleStep,
        message: String,
    },

    #[error("No usable record id available at {0}")]
    MissingRecordId(LifecycleStep),

    #[error("Record '{id}' still resolvable after delete (HTTP {status})")]
    RecordStillResolvable { id: String, status: StatusCode },
}
