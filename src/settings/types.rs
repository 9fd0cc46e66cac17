// Standard library
use std::sync::Arc;

// 3rd party crates
use serde::Deserialize;
use tokio::sync::RwLock;

// Current module imports
use super::constants::{
    DEFAULT_API_MAX_INTERVAL_MS, DEFAULT_API_MIN_INTERVAL_MS, DEFAULT_DNS_MAX_INTERVAL_MS,
    DEFAULT_DNS_MIN_INTERVAL_MS, DEFAULT_STATS_INTERVAL_SECS,
};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Log {
    pub level: String,
}

/// Name server under test.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Dns {
    pub server: String,
    pub port: u16,
    pub timeout_secs: u64,
}

/// Record API under test.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Api {
    pub enabled: bool,
    pub server: String,
    pub port: u16,
    pub timeout_secs: u64,
    pub prime_datastore: bool,
    /// Delete the records the canary created when shutting down
    pub cleanup_on_exit: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Metrics {
    pub bind_address: String,
    pub port: u16,
    pub latency_window: usize,
}

/// Cadence bounds of one probe family, in milliseconds.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSchedule {
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Schedule {
    #[serde(default = "default_dns_schedule")]
    pub dns: ProbeSchedule,
    #[serde(default = "default_api_schedule")]
    pub api: ProbeSchedule,
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub dns: Dns,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(default)]
    pub schedule: Schedule,
}

pub(super) fn default_dns_schedule() -> ProbeSchedule {
    ProbeSchedule {
        min_interval_ms: DEFAULT_DNS_MIN_INTERVAL_MS,
        max_interval_ms: DEFAULT_DNS_MAX_INTERVAL_MS,
    }
}

pub(super) fn default_api_schedule() -> ProbeSchedule {
    ProbeSchedule {
        min_interval_ms: DEFAULT_API_MIN_INTERVAL_MS,
        max_interval_ms: DEFAULT_API_MAX_INTERVAL_MS,
    }
}

pub(super) fn default_stats_interval() -> u64 {
    DEFAULT_STATS_INTERVAL_SECS
}

/// Settings that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedSettings(pub(super) Settings);

/// Holds the validated application settings.
pub struct ConfigManager {
    pub settings: Arc<RwLock<Settings>>,
}
