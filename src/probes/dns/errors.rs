// 3rd party crates
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DnsProbeError {
    #[error("No domain buckets configured")]
    NoBuckets,

    #[error("Bucket expecting {0} has no domains")]
    EmptyBucket(String),

    #[error("Failed to pick a domain bucket: {0}")]
    Selection(String),
}
