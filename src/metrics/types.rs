// Standard library
use std::collections::VecDeque;
use std::time::Instant;

// 3rd party crates
use tokio::sync::RwLock;

// Project imports
use crate::models::Classification;

/// Fixed-capacity FIFO of recent latencies in seconds.
#[derive(Debug, Clone)]
pub struct LatencyWindow {
    pub(super) samples: VecDeque<f64>,
    pub(super) capacity: usize,
}

/// Mutable per-family state, only ever touched under the aggregator lock.
#[derive(Debug, Clone)]
pub struct FamilyState {
    /// Number of recorded outcomes
    pub total: u64,
    /// Number of successful outcomes
    pub success: u64,
    /// Number of failed outcomes
    pub failure: u64,
    /// Failures since the last success
    pub consecutive_failures: u64,
    /// Last successful outcome time
    pub last_success: Option<Instant>,
    /// Recent latencies, successes and failures alike
    pub window: LatencyWindow,
}

/// Per-operation counters of the record lifecycle.
/// Only a fully completed lifecycle run moves them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OperationCounters {
    pub created: u64,
    pub read: u64,
    pub updated: u64,
    pub deleted: u64,
}

/// Diagnostic counters indexed by [`Classification::index`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationCounters(pub(super) [u64; 6]);

#[derive(Debug, Clone)]
pub struct AggregatorState {
    pub dns: FamilyState,
    pub api: FamilyState,
    pub classifications: ClassificationCounters,
    pub operations: OperationCounters,
    /// Canary records known to exist in the record API
    pub active_records: u64,
}

/// The single piece of shared mutable state of the canary.
///
/// Shared as `Arc<Aggregator>` between probe workers and the exposition
/// handler. Every `record` holds the write lock for the whole
/// read-modify-write of the family it touches.
#[derive(Debug)]
pub struct Aggregator {
    pub(super) state: RwLock<AggregatorState>,
}

/// Point-in-time view of one family with derived values resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilySnapshot {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    pub consecutive_failures: u64,
    /// `success / total`, 0 when nothing was recorded
    pub success_ratio: f64,
    pub avg_latency_secs: f64,
    pub max_latency_secs: f64,
    /// 0 when the family never succeeded
    pub secs_since_last_success: f64,
    pub window_len: usize,
}

/// Immutable copy of all counters and gauges, safe to render without locks.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub dns: FamilySnapshot,
    pub api: FamilySnapshot,
    pub classifications: ClassificationCounters,
    pub operations: OperationCounters,
    pub active_records: u64,
}

impl ClassificationCounters {
    pub fn get(&self, classification: Classification) -> u64 {
        self.0[classification.index()]
    }
}
