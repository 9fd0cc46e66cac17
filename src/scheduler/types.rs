// Standard library
use std::sync::Arc;
use std::time::Duration;

// 3rd party crates
use tokio::sync::watch;
use tokio::task::JoinHandle;

// Project imports
use crate::metrics::Aggregator;

/// Delay between two consecutive probes of one family.
/// Fixed when `min == max`, otherwise drawn uniformly from `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub min: Duration,
    pub max: Duration,
}

/// Owns the probe workers and the shared running flag.
pub struct Scheduler {
    pub(super) aggregator: Arc<Aggregator>,
    pub(super) running: Arc<watch::Sender<bool>>,
    pub(super) workers: Vec<JoinHandle<()>>,
}

/// Cloneable view of the running flag, used to request and observe shutdown.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    pub(super) running: Arc<watch::Sender<bool>>,
}
