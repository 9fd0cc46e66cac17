// Project imports
use crate::probes::api::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::utility::resolver::constants::DEFAULT_QUERY_TIMEOUT_SECS;

/// Environment variable pointing at an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "DNSCANARY_CONFIG_PATH";

/// Directory under the platform config dir holding `config.toml`
pub const CONFIG_DIR_NAME: &str = "dns-canary";

/// Prefix of environment overrides, e.g. `DNSCANARY__DNS__PORT=5353`
pub const ENV_PREFIX: &str = "DNSCANARY";
pub const ENV_SEPARATOR: &str = "__";

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_DNS_SERVER: &str = "localhost";
pub const DEFAULT_DNS_PORT: u16 = 12312;
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = DEFAULT_QUERY_TIMEOUT_SECS;

pub const DEFAULT_API_SERVER: &str = "localhost";
pub const DEFAULT_API_PORT: u16 = 8080;
pub const DEFAULT_API_TIMEOUT_SECS: u64 = DEFAULT_REQUEST_TIMEOUT_SECS;

pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_METRICS_PORT: u16 = 8090;

pub const DEFAULT_DNS_MIN_INTERVAL_MS: u64 = 100;
pub const DEFAULT_DNS_MAX_INTERVAL_MS: u64 = 500;
pub const DEFAULT_API_MIN_INTERVAL_MS: u64 = 60_000;
pub const DEFAULT_API_MAX_INTERVAL_MS: u64 = 120_000;
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 60;

/// Example configuration
pub const DEFAULT_CONFIG: &str = r#"
# Logging configuration
[log]
# Level can be "error", "warn", "info", "debug", or "trace"
level = "info"

# Name server under test
[dns]
server = "localhost"
port = 12312
timeout_secs = 2

# Record API under test
[api]
enabled = true
server = "localhost"
port = 8080
timeout_secs = 5
# Create the sample records the DNS probe expects before probing starts
prime_datastore = false
# Delete primed records and records left by aborted runs on shutdown
cleanup_on_exit = true

# Exposition endpoint (/metrics and /health)
[metrics]
bind_address = "0.0.0.0"
port = 8090
# Number of recent latencies kept per probe family
latency_window = 100

# Probe cadence, drawn uniformly between min and max (equal values mean fixed)
[schedule]
stats_interval_secs = 60

[schedule.dns]
min_interval_ms = 100
max_interval_ms = 500

[schedule.api]
min_interval_ms = 60000
max_interval_ms = 120000
"#;
