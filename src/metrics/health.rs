// Standard library
use std::time::{Instant, SystemTime, UNIX_EPOCH};

// 3rd party crates
use serde::Serialize;

/// Body of the health endpoint.
///
/// The canary reports itself healthy for as long as it can answer; target
/// health is carried by the metrics, not by this report.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HealthReport {
    pub status: &'static str,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
    /// Seconds since the process started
    pub uptime: u64,
}

impl HealthReport {
    pub fn healthy(started: Instant) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();

        Self {
            status: "healthy",
            timestamp,
            uptime: started.elapsed().as_secs(),
        }
    }
}
