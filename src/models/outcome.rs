// Standard library
use std::fmt;
use std::time::Duration;

/// A named group of related counters and gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Name-resolution probes.
    Dns,
    /// Record API create/read/update/delete/verify probes.
    ApiLifecycle,
}

impl Family {
    /// Every family, in exposition order.
    pub const ALL: [Family; 2] = [Family::Dns, Family::ApiLifecycle];

    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Dns => "dns",
            Family::ApiLifecycle => "api_lifecycle",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorical result of a single DNS query attempt.
///
/// `Timeout` and `Error` are distinct: the former means the server never
/// answered in time, the latter that the query could not be exchanged at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    NoError,
    NxDomain,
    ServFail,
    Timeout,
    Other,
    Error,
}

impl Classification {
    pub const ALL: [Classification; 6] = [
        Classification::NoError,
        Classification::NxDomain,
        Classification::ServFail,
        Classification::Timeout,
        Classification::Other,
        Classification::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::NoError => "noerror",
            Classification::NxDomain => "nxdomain",
            Classification::ServFail => "servfail",
            Classification::Timeout => "timeout",
            Classification::Other => "other",
            Classification::Error => "error",
        }
    }

    /// Position inside [`Classification::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Classification::NoError => 0,
            Classification::NxDomain => 1,
            Classification::ServFail => 2,
            Classification::Timeout => 3,
            Classification::Other => 4,
            Classification::Error => 5,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Result of one probe invocation, consumed exactly once by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Success {
        latency_secs: f64,
        classification: Option<Classification>,
    },
    Failure {
        latency_secs: f64,
        classification: Option<Classification>,
    },
}

impl Outcome {
    pub fn success(latency: Duration) -> Self {
        Outcome::Success {
            latency_secs: latency.as_secs_f64(),
            classification: None,
        }
    }

    pub fn failure(latency: Duration) -> Self {
        Outcome::Failure {
            latency_secs: latency.as_secs_f64(),
            classification: None,
        }
    }

    /// Attaches the resolver classification that produced this outcome.
    pub fn with_classification(self, value: Classification) -> Self {
        match self {
            Outcome::Success { latency_secs, .. } => Outcome::Success {
                latency_secs,
                classification: Some(value),
            },
            Outcome::Failure { latency_secs, .. } => Outcome::Failure {
                latency_secs,
                classification: Some(value),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn latency_secs(&self) -> f64 {
        match self {
            Outcome::Success { latency_secs, .. } | Outcome::Failure { latency_secs, .. } => {
                *latency_secs
            }
        }
    }

    pub fn classification(&self) -> Option<Classification> {
        match self {
            Outcome::Success { classification, .. } | Outcome::Failure { classification, .. } => {
                *classification
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_index_matches_all_order() {
        for (idx, classification) in Classification::ALL.iter().enumerate() {
            assert_eq!(classification.index(), idx);
        }
    }

    #[test]
    fn test_with_classification_keeps_kind_and_latency() {
        let outcome =
            Outcome::failure(Duration::from_millis(250)).with_classification(Classification::Timeout);

        assert!(!outcome.is_success());
        assert_eq!(outcome.classification(), Some(Classification::Timeout));
        assert!((outcome.latency_secs() - 0.25).abs() < f64::EPSILON);
    }
}
