// 3rd party crates
use async_trait::async_trait;

// Project imports
use crate::models::{Family, Outcome};

// Current module imports
use super::errors::ProbeError;

/// One discrete exercise-and-classify attempt against a monitored target.
///
/// Network faults are part of the outcome; an `Err` means no outcome could
/// be determined at all and nothing should be recorded.
#[async_trait]
pub trait Probe: Send + Sync {
    /// The family this probe's outcomes are recorded under.
    fn family(&self) -> Family;

    /// Runs the probe once. Never retries.
    async fn probe(&self) -> Result<Outcome, ProbeError>;

    /// Records this probe created in the target that still exist, if it
    /// creates any.
    fn active_records(&self) -> Option<usize> {
        None
    }
}
