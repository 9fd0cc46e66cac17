// Standard library
use std::sync::Arc;

// Project imports
use crate::models::Classification;
use crate::utility::resolver::{QueryKind, ResolverClient};

/// A group of domains sharing the classification they should produce.
#[derive(Debug, Clone)]
pub struct DomainBucket {
    pub domains: Vec<String>,
    /// Relative selection weight
    pub weight: u32,
    pub expected: Classification,
}

/// One selected query together with what it should classify as.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTarget {
    pub domain: String,
    pub kind: QueryKind,
    pub expected: Classification,
}

pub struct DnsProbe {
    pub(super) resolver: Arc<dyn ResolverClient>,
    pub(super) buckets: Vec<DomainBucket>,
}
