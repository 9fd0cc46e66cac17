// 3rd party crates
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid log level: {0}. Must be one of: error, warn, info, debug, trace")]
    InvalidLogLevel(String),
    #[error("{0}: server must not be empty")]
    EmptyServer(&'static str),
    #[error("{0}: port must be greater than 0")]
    InvalidPort(&'static str),
    #[error("{0}: timeout must be greater than 0")]
    InvalidTimeout(&'static str),
    #[error("Latency window must hold at least one sample")]
    InvalidLatencyWindow,
    #[error("{0}: interval must be greater than 0")]
    InvalidInterval(&'static str),
    #[error("{section}: min interval {min} ms is greater than max interval {max} ms")]
    InvertedInterval {
        section: &'static str,
        min: u64,
        max: u64,
    },
}
