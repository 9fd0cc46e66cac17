// Standard library
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use std::{env, fs};

// 3rd party crates
use config::{Config, ConfigError, Environment, File};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{error, info};

// Project imports
use crate::metrics::constants::DEFAULT_LATENCY_WINDOW;
use crate::scheduler::Cadence;

// Current module imports
use super::constants::{
    CONFIG_DIR_NAME, CONFIG_PATH_ENV, DEFAULT_API_PORT, DEFAULT_API_SERVER,
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_CONFIG, DEFAULT_DNS_PORT, DEFAULT_DNS_SERVER,
    DEFAULT_DNS_TIMEOUT_SECS, DEFAULT_LOG_LEVEL, DEFAULT_METRICS_BIND_ADDRESS,
    DEFAULT_METRICS_PORT, ENV_PREFIX, ENV_SEPARATOR,
};
use super::errors::ValidationError;
use super::types::{
    default_api_schedule, default_dns_schedule, default_stats_interval, Api, ConfigManager, Dns,
    Log, Metrics, ProbeSchedule, Schedule, Settings, ValidatedSettings,
};

impl Default for Log {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Default for Dns {
    fn default() -> Self {
        Self {
            server: DEFAULT_DNS_SERVER.to_string(),
            port: DEFAULT_DNS_PORT,
            timeout_secs: DEFAULT_DNS_TIMEOUT_SECS,
        }
    }
}

impl Default for Api {
    fn default() -> Self {
        Self {
            enabled: true,
            server: DEFAULT_API_SERVER.to_string(),
            port: DEFAULT_API_PORT,
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            prime_datastore: false,
            cleanup_on_exit: true,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_METRICS_BIND_ADDRESS.to_string(),
            port: DEFAULT_METRICS_PORT,
            latency_window: DEFAULT_LATENCY_WINDOW,
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            dns: default_dns_schedule(),
            api: default_api_schedule(),
            stats_interval_secs: default_stats_interval(),
        }
    }
}

impl ProbeSchedule {
    pub fn cadence(&self) -> Cadence {
        Cadence::new(
            Duration::from_millis(self.min_interval_ms),
            Duration::from_millis(self.max_interval_ms),
        )
    }

    fn validate(&self, section: &'static str) -> Result<(), ValidationError> {
        if self.min_interval_ms == 0 || self.max_interval_ms == 0 {
            return Err(ValidationError::InvalidInterval(section));
        }
        if self.min_interval_ms > self.max_interval_ms {
            return Err(ValidationError::InvertedInterval {
                section,
                min: self.min_interval_ms,
                max: self.max_interval_ms,
            });
        }
        Ok(())
    }
}

fn validate_target(
    section: &'static str,
    server: &str,
    port: u16,
    timeout_secs: u64,
) -> Result<(), ValidationError> {
    if server.trim().is_empty() {
        return Err(ValidationError::EmptyServer(section));
    }
    if port == 0 {
        return Err(ValidationError::InvalidPort(section));
    }
    if timeout_secs == 0 {
        return Err(ValidationError::InvalidTimeout(section));
    }
    Ok(())
}

impl Settings {
    pub fn get_log_level(&self) -> String {
        self.log.level.to_lowercase()
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns.timeout_secs)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.stats_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        // Validate log level
        match self.get_log_level().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => return Err(ValidationError::InvalidLogLevel(self.log.level.clone())),
        }

        validate_target("dns", &self.dns.server, self.dns.port, self.dns.timeout_secs)?;

        // A disabled API target is never contacted
        if self.api.enabled {
            validate_target("api", &self.api.server, self.api.port, self.api.timeout_secs)?;
        }

        if self.metrics.bind_address.trim().is_empty() {
            return Err(ValidationError::EmptyServer("metrics"));
        }
        if self.metrics.port == 0 {
            return Err(ValidationError::InvalidPort("metrics"));
        }
        if self.metrics.latency_window == 0 {
            return Err(ValidationError::InvalidLatencyWindow);
        }

        self.schedule.dns.validate("schedule.dns")?;
        self.schedule.api.validate("schedule.api")?;
        if self.schedule.stats_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval("schedule.stats_interval_secs"));
        }

        Ok(())
    }
}

impl ConfigManager {
    /// Creates a new `ConfigManager` instance by loading and validating the configuration.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path: PathBuf = Self::get_config_path()?;
        Self::ensure_config_file_exists(&config_path)?;

        let settings: Settings = Self::load_settings(&config_path)?;

        // Validate settings before proceeding
        let validated_settings = ValidatedSettings::new(settings).map_err(|e| {
            error!("Configuration validation failed: {}", e);
            e
        })?;

        Ok(ConfigManager {
            settings: Arc::new(RwLock::new(validated_settings.into_inner())),
        })
    }

    /// Determines the configuration file path.
    fn get_config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            Ok(PathBuf::from(path))
        } else if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join(CONFIG_DIR_NAME).join("config.toml"))
        } else {
            let msg: &str = "Could not determine the configuration directory";
            error!("{}", msg);
            Err(ConfigError::Message(msg.into()))
        }
    }

    /// Ensures that the configuration file exists, creating it if necessary.
    fn ensure_config_file_exists(config_path: &Path) -> Result<(), ConfigError> {
        if !config_path.exists() {
            if let Some(parent_dir) = config_path.parent() {
                fs::create_dir_all(parent_dir).map_err(|e| {
                    let msg: String = format!("Failed to create configuration directory: {}", e);
                    error!("{}", msg);
                    ConfigError::Message(msg)
                })?;
            }
            fs::write(config_path, DEFAULT_CONFIG).map_err(|e| {
                let msg: String = format!("Failed to create default configuration file: {}", e);
                error!("{}", msg);
                ConfigError::Message(msg)
            })?;
            info!("Default configuration file created at: {:?}", config_path);
        }
        Ok(())
    }

    /// Loads the settings from the configuration file and environment variables.
    fn load_settings(config_path: &Path) -> Result<Settings, ConfigError> {
        let config_file: &str = config_path.to_str().ok_or_else(|| {
            let msg: &str = "Configuration file path contains invalid UTF-8 characters";
            error!("{}", msg);
            ConfigError::Message(msg.into())
        })?;

        let settings: Config = Config::builder()
            .add_source(File::with_name(config_file))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Provides a read-locked reference to the current settings.
    pub async fn get_settings(&self) -> RwLockReadGuard<'_, Settings> {
        self.settings.read().await
    }

    pub async fn get_log_level(&self) -> String {
        self.settings.read().await.get_log_level()
    }
}

impl ValidatedSettings {
    pub fn new(settings: Settings) -> Result<Self, ValidationError> {
        settings.validate()?;
        Ok(ValidatedSettings(settings))
    }

    pub fn into_inner(self) -> Settings {
        self.0
    }
}
