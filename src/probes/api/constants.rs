/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Collection resource of the record API
pub const RECORDS_PATH: &str = "/records";

/// Query string of the list step
pub const LIST_QUERY: &str = "page=1&per_page=10";

/// TTL of the synthetic record on create and after update
pub const CREATE_TTL: u32 = 300;
pub const UPDATE_TTL: u32 = 600;
