// 3rd party crates
use async_trait::async_trait;

// Current module imports
use super::types::{QueryKind, Resolution};

/// Sends one query and classifies the answer.
///
/// Implementations never fail: every fault maps onto a classification, and
/// the elapsed time is measured even when no answer arrives.
#[async_trait]
pub trait ResolverClient: Send + Sync {
    async fn query(&self, domain: &str, kind: QueryKind) -> Resolution;
}
