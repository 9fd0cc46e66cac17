// Standard library
use std::time::Duration;

/// Pause after a probe could not produce an outcome at all
pub const ERROR_BACKOFF: Duration = Duration::from_secs(1);
