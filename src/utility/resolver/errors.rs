// 3rd party crates
use hickory_proto::error::ProtoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Domain '{domain}' is not a valid DNS name: {error}")]
    InvalidName { domain: String, error: ProtoError },

    #[error("Failed to resolve resolver address '{target}': {error}")]
    AddressLookup {
        target: String,
        error: std::io::Error,
    },

    #[error("Resolver address '{0}' yielded no socket address")]
    NoAddress(String),

    #[error("Socket error: {0}")]
    Socket(#[from] std::io::Error),

    #[error("Failed to encode query: {0}")]
    Encode(ProtoError),

    #[error("Failed to decode response: {0}")]
    Decode(ProtoError),

    #[error("Response id {got} does not match query id {expected}")]
    IdMismatch { expected: u16, got: u16 },

    #[error("No response within {0} ms")]
    Timeout(u128),
}
