// Standard library
use std::collections::VecDeque;
use std::time::Instant;

// 3rd party crates
use tokio::sync::RwLock;
use tracing::trace;

// Project imports
use crate::models::{Family, Outcome};

// Current module imports
use super::constants::DEFAULT_LATENCY_WINDOW;
use super::types::{
    Aggregator, AggregatorState, ClassificationCounters, FamilySnapshot, FamilyState,
    LatencyWindow, MetricsSnapshot, OperationCounters,
};

impl LatencyWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest one when full.
    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn max(&self) -> f64 {
        self.samples.iter().copied().fold(0.0, f64::max)
    }
}

impl FamilyState {
    pub fn new(window_capacity: usize) -> Self {
        Self {
            total: 0,
            success: 0,
            failure: 0,
            consecutive_failures: 0,
            last_success: None,
            window: LatencyWindow::new(window_capacity),
        }
    }

    fn apply(&mut self, outcome: &Outcome, at: Instant) {
        self.total += 1;
        if outcome.is_success() {
            self.success += 1;
            self.consecutive_failures = 0;
            self.last_success = Some(at);
        } else {
            self.failure += 1;
            self.consecutive_failures += 1;
        }
        self.window.push(outcome.latency_secs());
    }

    fn snapshot_at(&self, now: Instant) -> FamilySnapshot {
        let success_ratio = if self.total == 0 {
            0.0
        } else {
            self.success as f64 / self.total as f64
        };

        let secs_since_last_success = self
            .last_success
            .map(|at| now.saturating_duration_since(at).as_secs_f64())
            .unwrap_or(0.0);

        FamilySnapshot {
            total: self.total,
            success: self.success,
            failure: self.failure,
            consecutive_failures: self.consecutive_failures,
            success_ratio,
            avg_latency_secs: self.window.average(),
            max_latency_secs: self.window.max(),
            secs_since_last_success,
            window_len: self.window.len(),
        }
    }
}

impl AggregatorState {
    fn family_mut(&mut self, family: Family) -> &mut FamilyState {
        match family {
            Family::Dns => &mut self.dns,
            Family::ApiLifecycle => &mut self.api,
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY_WINDOW)
    }
}

impl Aggregator {
    /// Creates an aggregator whose latency windows hold `window_capacity` samples.
    pub fn new(window_capacity: usize) -> Self {
        Self {
            state: RwLock::new(AggregatorState {
                dns: FamilyState::new(window_capacity),
                api: FamilyState::new(window_capacity),
                classifications: ClassificationCounters::default(),
                operations: OperationCounters::default(),
                active_records: 0,
            }),
        }
    }

    /// Absorbs one probe outcome for `family`.
    ///
    /// A successful lifecycle outcome also accounts for one create, one read,
    /// one update and one delete. Classifications attached to the outcome are
    /// counted whether or not the outcome was a success.
    pub async fn record(&self, family: Family, outcome: Outcome) {
        let mut state = self.state.write().await;
        let now = Instant::now();

        state.family_mut(family).apply(&outcome, now);

        if let Some(classification) = outcome.classification() {
            state.classifications.0[classification.index()] += 1;
        }

        if family == Family::ApiLifecycle && outcome.is_success() {
            state.operations.created += 1;
            state.operations.read += 1;
            state.operations.updated += 1;
            state.operations.deleted += 1;
        }

        trace!(
            family = %family,
            success = outcome.is_success(),
            latency = outcome.latency_secs(),
            "Outcome recorded"
        );
    }

    /// Gets a snapshot of the current metrics.
    pub async fn snapshot(&self) -> MetricsSnapshot {
        self.snapshot_at(Instant::now()).await
    }

    /// Gets a snapshot with time-derived gauges computed relative to `now`.
    pub async fn snapshot_at(&self, now: Instant) -> MetricsSnapshot {
        let state = self.state.read().await;
        MetricsSnapshot {
            dns: state.dns.snapshot_at(now),
            api: state.api.snapshot_at(now),
            classifications: state.classifications,
            operations: state.operations,
            active_records: state.active_records,
        }
    }

    /// Sets the number of canary records currently present in the record API.
    pub async fn set_active_records(&self, count: usize) {
        self.state.write().await.active_records = count as u64;
    }
}

impl MetricsSnapshot {
    pub fn family(&self, family: Family) -> &FamilySnapshot {
        match family {
            Family::Dns => &self.dns,
            Family::ApiLifecycle => &self.api,
        }
    }
}
