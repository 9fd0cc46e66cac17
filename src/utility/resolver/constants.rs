/// Default per-query timeout in seconds
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 2;

/// Largest UDP DNS message accepted
pub const MAX_UDP_MESSAGE_SIZE: usize = 4096;
