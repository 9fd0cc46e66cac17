// Standard library
use std::sync::Arc;

// 3rd party crates
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

// Project modules
mod exporter;
mod functions;
mod metrics;
mod models;
mod probes;
mod scheduler;
mod settings;
mod utility;

// Project imports
use crate::functions::run;
use crate::settings::ConfigManager;
use crate::utility::signals::ShutdownSignals;

/// Main entry point for the DNS canary.
/// Continuously probes a name server and a record-management API, and
/// exposes the aggregated health and latency metrics for scraping.
///
/// Features:
/// - Weighted DNS queries with response classification
/// - Full create/read/update/delete/verify cycles against the record API
/// - Prometheus text exposition on `/metrics` and a JSON `/health` endpoint
/// - Jittered probe cadence and graceful shutdown
#[tokio::main]
async fn main() {
    // loads the .env file from the current directory or parents.
    dotenvy::dotenv_override().ok();

    // Create ConfigManager and wrap it in Arc
    let config: Arc<ConfigManager> = Arc::new(
        ConfigManager::new()
            .await
            .expect("Failed to initialize configuration"),
    );

    // setup logging.
    let log_level: String = config.get_log_level().await;

    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(LevelFilter::ERROR.into())
        .parse_lossy(log_level)
        .add_directive("hyper=error".parse().unwrap())
        .add_directive("hyper_util=error".parse().unwrap())
        .add_directive("reqwest=error".parse().unwrap())
        .add_directive("h2=error".parse().unwrap())
        .add_directive("hickory_proto=error".parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .init();

    info!("⚙️ Settings have been loaded.");

    // Create a broadcast channel for shutdown signal
    let (shutdown_tx, _) = broadcast::channel(1);
    let shutdown_tx_clone = shutdown_tx.clone();

    // Handle Ctrl+C and SIGTERM
    let mut signals: ShutdownSignals =
        ShutdownSignals::register().expect("Failed to install signal handlers");
    tokio::spawn(async move {
        match signals.recv().await {
            Ok(name) => {
                info!("Received {}, initiating graceful shutdown...", name);
            }
            Err(e) => {
                error!("Failed to listen for shutdown signals: {}", e);
                return;
            }
        }
        let _ = shutdown_tx_clone.send(());
    });

    // Run the canary with shutdown signal
    if let Err(e) = run(config, shutdown_tx.subscribe()).await {
        error!("Application error: {}", e);
    }

    info!("Shutdown complete.");
}
