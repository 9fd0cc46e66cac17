//! Process shutdown signals
//!
//! Ctrl+C everywhere, plus SIGTERM on unix so that `kill` and container
//! runtimes stop the canary gracefully.

// Standard library
use std::io;

// 3rd party crates
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Signal listeners that stay installed from registration on.
pub struct ShutdownSignals {
    #[cfg(unix)]
    terminate: Signal,
}

impl ShutdownSignals {
    /// Installs the listeners. A SIGTERM delivered after this returns is
    /// never fatal to the process.
    pub fn register() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Resolves with the name of the first shutdown signal received.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> io::Result<&'static str> {
        tokio::select! {
            result = ctrl_c() => result.map(|_| "SIGINT"),
            _ = self.terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> io::Result<&'static str> {
        ctrl_c().await.map(|_| "Ctrl+C")
    }
}
