// Standard library
use std::sync::Arc;

// 3rd party crates
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

// Project imports
use crate::models::{Classification, Family, Outcome};
use crate::probes::{Probe, ProbeError};
use crate::utility::resolver::{QueryKind, ResolverClient};

// Current module imports
use super::constants::{
    KNOWN_ABSENT_DOMAINS, KNOWN_ABSENT_WEIGHT, KNOWN_GOOD_DOMAINS, KNOWN_GOOD_WEIGHT,
    MALFORMED_INPUTS, MALFORMED_WEIGHT, OVERLONG_LABEL_LEN,
};
use super::errors::DnsProbeError;
use super::types::{DnsProbe, DomainBucket, QueryTarget};

impl DomainBucket {
    pub fn new<I, S>(domains: I, weight: u32, expected: Classification) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains.into_iter().map(Into::into).collect(),
            weight,
            expected,
        }
    }

    /// Known-good, known-absent and malformed buckets weighted 60/30/10.
    ///
    /// The malformed bucket expects SERVFAIL, but the empty-label and
    /// overlong names in it cannot be encoded. Those are rejected before
    /// anything is sent and classify as `Other`, so about half of the
    /// malformed picks are failures against any server.
    pub fn defaults() -> Vec<DomainBucket> {
        let mut malformed: Vec<String> = MALFORMED_INPUTS.iter().map(|d| d.to_string()).collect();
        malformed.push(format!("toolong{}.com", "x".repeat(OVERLONG_LABEL_LEN)));

        vec![
            DomainBucket::new(KNOWN_GOOD_DOMAINS, KNOWN_GOOD_WEIGHT, Classification::NoError),
            DomainBucket::new(
                KNOWN_ABSENT_DOMAINS,
                KNOWN_ABSENT_WEIGHT,
                Classification::NxDomain,
            ),
            DomainBucket::new(malformed, MALFORMED_WEIGHT, Classification::ServFail),
        ]
    }
}

impl DnsProbe {
    /// Creates a probe over the default domain buckets.
    pub fn new(resolver: Arc<dyn ResolverClient>) -> Result<Self, DnsProbeError> {
        Self::with_buckets(resolver, DomainBucket::defaults())
    }

    pub fn with_buckets(
        resolver: Arc<dyn ResolverClient>,
        buckets: Vec<DomainBucket>,
    ) -> Result<Self, DnsProbeError> {
        if buckets.is_empty() {
            return Err(DnsProbeError::NoBuckets);
        }
        if let Some(empty) = buckets.iter().find(|bucket| bucket.domains.is_empty()) {
            return Err(DnsProbeError::EmptyBucket(empty.expected.to_string()));
        }

        Ok(Self { resolver, buckets })
    }

    /// Picks a bucket by weight, then a domain and a query kind uniformly.
    pub fn select_target<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<QueryTarget, DnsProbeError> {
        let bucket = self
            .buckets
            .choose_weighted(rng, |bucket| bucket.weight)
            .map_err(|e| DnsProbeError::Selection(e.to_string()))?;

        let domain = bucket
            .domains
            .choose(rng)
            .ok_or_else(|| DnsProbeError::EmptyBucket(bucket.expected.to_string()))?;
        let kind = QueryKind::ALL.choose(rng).copied().unwrap_or(QueryKind::A);

        Ok(QueryTarget {
            domain: domain.clone(),
            kind,
            expected: bucket.expected,
        })
    }

    /// Queries `target` once and judges the answer against its bucket.
    pub async fn probe_target(&self, target: &QueryTarget) -> Outcome {
        let resolution = self.resolver.query(&target.domain, target.kind).await;

        debug!(
            domain = %target.domain,
            kind = ?target.kind,
            expected = %target.expected,
            "DNS query -> {} ({:.3}s)",
            resolution.classification,
            resolution.elapsed.as_secs_f64()
        );

        let outcome = if resolution.classification == target.expected {
            Outcome::success(resolution.elapsed)
        } else {
            Outcome::failure(resolution.elapsed)
        };
        outcome.with_classification(resolution.classification)
    }
}

#[async_trait]
impl Probe for DnsProbe {
    fn family(&self) -> Family {
        Family::Dns
    }

    async fn probe(&self) -> Result<Outcome, ProbeError> {
        let target = {
            let mut rng = rand::rng();
            self.select_target(&mut rng)?
        };
        Ok(self.probe_target(&target).await)
    }
}
