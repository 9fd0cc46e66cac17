/// Number of recent latencies kept per family
pub const DEFAULT_LATENCY_WINDOW: usize = 100;
