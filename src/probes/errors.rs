// 3rd party crates
use thiserror::Error;

// Current module imports
use super::dns::errors::DnsProbeError;

/// Raised when a probe could not even determine an outcome.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("DNS probe error: {0}")]
    Dns(#[from] DnsProbeError),
}
