// Standard library
use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

// 3rd party crates
use tokio::sync::broadcast;
use tracing::{error, info};

// Project imports
use crate::exporter::server::{bind, serve};
use crate::exporter::{Exporter, ExpositionState};
use crate::metrics::Aggregator;
use crate::probes::api::{prime_datastore, LifecycleProbe};
use crate::probes::dns::DnsProbe;
use crate::scheduler::Scheduler;
use crate::settings::{ConfigManager, Settings};
use crate::utility::resolver::UdpResolver;

/// Wires the aggregator, the exposition endpoint and the probe workers
/// together, then runs until a shutdown signal arrives.
///
/// The exposition endpoint is optional: if it cannot be bound the error is
/// logged and probing carries on. Records the canary left in the API are
/// deleted once the workers have stopped, unless `api.cleanup_on_exit` is off.
pub async fn run(
    config: Arc<ConfigManager>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), Box<dyn Error>> {
    let settings: Settings = config.get_settings().await.clone();

    let dns_target = format!("{}:{}", settings.dns.server, settings.dns.port);
    let api_target = format!("{}:{}", settings.api.server, settings.api.port);

    let aggregator = Arc::new(Aggregator::new(settings.metrics.latency_window));
    let mut scheduler = Scheduler::new(Arc::clone(&aggregator));

    // Exposition endpoint
    let state = ExpositionState {
        aggregator: Arc::clone(&aggregator),
        exporter: Arc::new(Exporter::new(dns_target.as_str(), api_target.as_str())),
        started: Instant::now(),
    };
    let bind_address: String = settings.metrics.bind_address.clone();
    let metrics_port: u16 = settings.metrics.port;
    let server_shutdown = scheduler.handle();
    let server = tokio::spawn(async move {
        let listener = match bind(&bind_address, metrics_port).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Metrics endpoint unavailable, probes keep running: {}", e);
                return;
            }
        };
        if let Err(e) = serve(listener, state, async move { server_shutdown.stopped().await }).await
        {
            error!("Metrics endpoint stopped: {}", e);
        }
    });

    // DNS probe
    info!("🔎 Probing name server at {}", dns_target);
    let resolver = Arc::new(UdpResolver::new(
        &settings.dns.server,
        settings.dns.port,
        settings.dns_timeout(),
    ));
    scheduler.spawn_probe(
        Arc::new(DnsProbe::new(resolver)?),
        settings.schedule.dns.cadence(),
    );

    // API lifecycle probe
    let mut lifecycle: Option<Arc<LifecycleProbe>> = None;
    if settings.api.enabled {
        info!("🔁 Probing record API at {}", api_target);
        let probe = LifecycleProbe::new(
            &settings.api.server,
            settings.api.port,
            settings.api_timeout(),
        )?;
        if settings.api.prime_datastore {
            prime_datastore(&probe).await;
            aggregator.set_active_records(probe.tracked_records()).await;
        }
        let probe = Arc::new(probe);
        scheduler.spawn_probe(probe.clone(), settings.schedule.api.cadence());
        lifecycle = Some(probe);
    } else {
        info!("API lifecycle probe disabled, running DNS probes only");
    }

    scheduler.spawn_stats_logger(settings.stats_interval());

    // Wait for shutdown
    if let Err(e) = shutdown_rx.recv().await {
        error!("Shutdown channel closed unexpectedly: {}", e);
    }
    info!("Stopping probe workers, waiting for in-flight probes...");
    scheduler.stop();
    scheduler.join().await;

    if let Some(probe) = lifecycle {
        if settings.api.cleanup_on_exit {
            probe.cleanup().await;
            aggregator.set_active_records(probe.tracked_records()).await;
        } else if probe.tracked_records() > 0 {
            info!(
                "Keeping {} canary records in the API, cleanup on exit is disabled",
                probe.tracked_records()
            );
        }
    }

    if let Err(e) = server.await {
        error!("Metrics server task failed: {}", e);
    }

    Ok(())
}
