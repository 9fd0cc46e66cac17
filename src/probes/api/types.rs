// Standard library
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

// 3rd party crates
use reqwest::Client;

/// Steps of one lifecycle run, in the only order they may execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStep {
    List,
    Create,
    Get,
    Update,
    Delete,
    VerifyDeleted,
}

/// Transient state of a single lifecycle run.
#[derive(Debug)]
pub struct LifecycleRun {
    /// Step currently executing, or the last one if the run completed
    pub step: LifecycleStep,
    pub started: Instant,
    /// Identifier handed out by the create step
    pub record_id: Option<String>,
}

/// Drives the create/read/update/delete/verify sequence against the record API.
#[derive(Debug, Clone)]
pub struct LifecycleProbe {
    /// e.g. `http://localhost:8080`
    pub base_url: String,
    pub client: Client,
    /// Ids of records this canary created that are still in the datastore:
    /// primed samples and records left behind by aborted runs
    pub(super) tracked: Arc<Mutex<BTreeSet<String>>>,
}
