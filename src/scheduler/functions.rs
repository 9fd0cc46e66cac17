// Standard library
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

// 3rd party crates
use futures::FutureExt;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

// Project imports
use crate::metrics::Aggregator;
use crate::models::{Family, Outcome};
use crate::probes::Probe;

// Current module imports
use super::constants::ERROR_BACKOFF;
use super::types::Cadence;

fn is_running(running: &watch::Receiver<bool>) -> bool {
    *running.borrow()
}

async fn stop_requested(running: &mut watch::Receiver<bool>) {
    // A dropped sender counts as a stop as well.
    let _ = running.wait_for(|running| !*running).await;
}

/// Sleeps for `delay` unless the flag is cleared first.
/// Returns whether the worker should go on.
pub async fn pause(running: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    let stopped = tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        _ = stop_requested(running) => true,
    };

    !stopped && is_running(running)
}

/// Runs `probe` on `cadence` until the running flag is cleared.
///
/// The flag is only checked between probes, an in-flight probe always runs
/// to completion.
pub async fn probe_loop(
    probe: Arc<dyn Probe>,
    cadence: Cadence,
    aggregator: Arc<Aggregator>,
    mut running: watch::Receiver<bool>,
) {
    let family: Family = probe.family();
    info!(family = %family, "Probe worker started");

    while is_running(&running) {
        let started = Instant::now();

        let delay = match AssertUnwindSafe(probe.probe()).catch_unwind().await {
            Ok(Ok(outcome)) => {
                debug!(
                    family = %family,
                    success = outcome.is_success(),
                    latency = outcome.latency_secs(),
                    "Probe finished"
                );
                aggregator.record(family, outcome).await;
                cadence.next_delay()
            }
            Ok(Err(e)) => {
                warn!(family = %family, error = %e, "Probe produced no outcome, backing off");
                ERROR_BACKOFF
            }
            Err(_) => {
                error!(family = %family, "Probe panicked, recording a failure");
                aggregator
                    .record(family, Outcome::failure(started.elapsed()))
                    .await;
                cadence.next_delay()
            }
        };

        if let Some(count) = probe.active_records() {
            aggregator.set_active_records(count).await;
        }

        if !pause(&mut running, delay).await {
            break;
        }
    }

    info!(family = %family, "Probe worker stopped");
}

/// Logs a short summary of every family each `interval`.
pub async fn stats_loop(
    aggregator: Arc<Aggregator>,
    interval: Duration,
    mut running: watch::Receiver<bool>,
) {
    while pause(&mut running, interval).await {
        let snapshot = aggregator.snapshot().await;
        for family in Family::ALL {
            let stats = snapshot.family(family);
            info!(
                family = %family,
                total = stats.total,
                consecutive_failures = stats.consecutive_failures,
                "📊 {} probes: {} total, {:.2}% success",
                family,
                stats.total,
                stats.success_ratio * 100.0
            );
        }
    }

    debug!("Stats logger stopped");
}
