// Standard library
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

// 3rd party crates
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, error, info, warn};

// Project imports
use crate::models::{Envelope, Family, Outcome, RecordPayload};
use crate::probes::{Probe, ProbeError};

// Current module imports
use super::constants::{LIST_QUERY, RECORDS_PATH};
use super::errors::LifecycleError;
use super::functions::{mutated_record, synthetic_record};
use super::types::{LifecycleProbe, LifecycleRun, LifecycleStep};

impl LifecycleStep {
    pub const ORDER: [LifecycleStep; 6] = [
        LifecycleStep::List,
        LifecycleStep::Create,
        LifecycleStep::Get,
        LifecycleStep::Update,
        LifecycleStep::Delete,
        LifecycleStep::VerifyDeleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStep::List => "list",
            LifecycleStep::Create => "create",
            LifecycleStep::Get => "get",
            LifecycleStep::Update => "update",
            LifecycleStep::Delete => "delete",
            LifecycleStep::VerifyDeleted => "verify_deleted",
        }
    }

    /// Whether `status` is the expected result of this step.
    /// 2xx everywhere except the final check, which wants the record gone.
    pub fn accepts(&self, status: StatusCode) -> bool {
        match self {
            LifecycleStep::VerifyDeleted => status == StatusCode::NOT_FOUND,
            _ => status.is_success(),
        }
    }
}

impl fmt::Display for LifecycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for LifecycleRun {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleRun {
    pub fn new() -> Self {
        Self {
            step: LifecycleStep::List,
            started: Instant::now(),
            record_id: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn record_id(&self) -> Result<&str, LifecycleError> {
        self.record_id
            .as_deref()
            .ok_or(LifecycleError::MissingRecordId(self.step))
    }
}

impl LifecycleProbe {
    /// Creates a probe for the record API at `http://{server}:{port}`.
    pub fn new(server: &str, port: u16, timeout: Duration) -> Result<Self, LifecycleError> {
        Self::with_base_url(format!("http://{}:{}", server, port), timeout)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LifecycleError> {
        let base_url: String = base_url.into();
        let client: Client = Client::builder().timeout(timeout).build().map_err(|e| {
            error!(api = %base_url, "Failed to build HTTP client: {}", e);
            LifecycleError::HttpClientBuild(e)
        })?;

        Ok(Self {
            base_url,
            client,
            tracked: Arc::default(),
        })
    }

    fn tracked_set(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remembers a record created in the datastore until it is known gone.
    pub(super) fn track(&self, id: &str) {
        self.tracked_set().insert(id.to_string());
    }

    fn untrack(&self, id: &str) {
        self.tracked_set().remove(id);
    }

    /// Number of records this probe created that may still exist.
    pub fn tracked_records(&self) -> usize {
        self.tracked_set().len()
    }

    /// Deletes every tracked record, in id order.
    ///
    /// Records that are already gone count as removed. Records whose delete
    /// fails stay tracked. Returns the number removed.
    pub async fn cleanup(&self) -> usize {
        let ids: Vec<String> = self.tracked_set().iter().cloned().collect();
        if ids.is_empty() {
            return 0;
        }

        info!(api = %self.base_url, "🧹 Cleaning up {} canary records...", ids.len());
        let mut removed = 0;

        for id in ids {
            match self.client.delete(self.item_url(&id)).send().await {
                Ok(response)
                    if response.status().is_success()
                        || response.status() == StatusCode::NOT_FOUND =>
                {
                    self.untrack(&id);
                    removed += 1;
                }
                Ok(response) => {
                    warn!(id = %id, "Cleanup delete rejected: HTTP {}", response.status());
                }
                Err(e) => warn!(id = %id, "Cleanup delete failed: {}", e),
            }
        }

        info!(
            api = %self.base_url,
            "Cleanup complete. Removed {} records, {} left.",
            removed,
            self.tracked_records()
        );
        removed
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, RECORDS_PATH)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}{}/{}", self.base_url, RECORDS_PATH, id)
    }

    /// Runs one lifecycle and turns it into an outcome.
    ///
    /// The latency is the time spent up to completion or up to the step that
    /// deviated.
    pub async fn execute(&self) -> Outcome {
        let mut run = LifecycleRun::new();

        match self.drive(&mut run).await {
            Ok(()) => {
                debug!(
                    api = %self.base_url,
                    elapsed = run.elapsed().as_secs_f64(),
                    "Lifecycle run completed"
                );
                Outcome::success(run.elapsed())
            }
            Err(e) => {
                warn!(
                    api = %self.base_url,
                    step = %run.step,
                    error = %e,
                    "Lifecycle run aborted"
                );
                Outcome::failure(run.elapsed())
            }
        }
    }

    /// Executes every step in order, stopping at the first deviation.
    async fn drive(&self, run: &mut LifecycleRun) -> Result<(), LifecycleError> {
        let (created, updated) = {
            let mut rng = rand::rng();
            let created = synthetic_record(&mut rng);
            let updated = mutated_record(&created.name, &mut rng);
            (created, updated)
        };

        for step in LifecycleStep::ORDER {
            run.step = step;
            match step {
                LifecycleStep::List => self.list().await?,
                LifecycleStep::Create => {
                    let id = self.create(&created).await?;
                    self.track(&id);
                    run.record_id = Some(id);
                }
                LifecycleStep::Get => self.get(run.record_id()?).await?,
                LifecycleStep::Update => self.update(run.record_id()?, &updated).await?,
                LifecycleStep::Delete => self.delete(run.record_id()?).await?,
                LifecycleStep::VerifyDeleted => {
                    let id = run.record_id()?;
                    self.verify_deleted(id).await?;
                    self.untrack(id);
                }
            }
        }

        Ok(())
    }

    async fn send(
        &self,
        step: LifecycleStep,
        request: RequestBuilder,
    ) -> Result<Response, LifecycleError> {
        request
            .send()
            .await
            .map_err(|error| LifecycleError::Transport { step, error })
    }

    async fn expect_accepted(
        &self,
        step: LifecycleStep,
        request: RequestBuilder,
    ) -> Result<Response, LifecycleError> {
        let response = self.send(step, request).await?;
        let status = response.status();
        if !step.accepts(status) {
            return Err(LifecycleError::UnexpectedStatus { step, status });
        }
        Ok(response)
    }

    async fn list(&self) -> Result<(), LifecycleError> {
        let url = format!("{}?{}", self.collection_url(), LIST_QUERY);
        self.expect_accepted(LifecycleStep::List, self.client.get(&url))
            .await?;
        Ok(())
    }

    async fn create(&self, record: &RecordPayload) -> Result<String, LifecycleError> {
        let step = LifecycleStep::Create;
        let response = self
            .expect_accepted(step, self.client.post(self.collection_url()).json(record))
            .await?;

        let envelope: Envelope =
            response
                .json()
                .await
                .map_err(|e| LifecycleError::InvalidEnvelope {
                    step,
                    message: e.to_string(),
                })?;

        let id = envelope
            .record_id()
            .ok_or(LifecycleError::MissingRecordId(step))?;
        debug!(api = %self.base_url, id = %id, name = %record.name, "Created lifecycle record");
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<(), LifecycleError> {
        self.expect_accepted(LifecycleStep::Get, self.client.get(self.item_url(id)))
            .await?;
        Ok(())
    }

    async fn update(&self, id: &str, record: &RecordPayload) -> Result<(), LifecycleError> {
        self.expect_accepted(
            LifecycleStep::Update,
            self.client.put(self.item_url(id)).json(record),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), LifecycleError> {
        self.expect_accepted(LifecycleStep::Delete, self.client.delete(self.item_url(id)))
            .await?;
        Ok(())
    }

    async fn verify_deleted(&self, id: &str) -> Result<(), LifecycleError> {
        let step = LifecycleStep::VerifyDeleted;
        let response = self.send(step, self.client.get(self.item_url(id))).await?;
        let status = response.status();

        if step.accepts(status) {
            Ok(())
        } else if status.is_success() {
            Err(LifecycleError::RecordStillResolvable {
                id: id.to_string(),
                status,
            })
        } else {
            Err(LifecycleError::UnexpectedStatus { step, status })
        }
    }
}

#[async_trait]
impl Probe for LifecycleProbe {
    fn family(&self) -> Family {
        Family::ApiLifecycle
    }

    async fn probe(&self) -> Result<Outcome, ProbeError> {
        Ok(self.execute().await)
    }

    fn active_records(&self) -> Option<usize> {
        Some(self.tracked_records())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use super::*;
    use crate::metrics::types::OperationCounters;
    use crate::metrics::Aggregator;
    use crate::probes::api::prime_datastore;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Fault {
        ListDown,
        NoIdOnCreate,
        UpdateFails,
        DeleteFails,
        DeleteIgnored,
    }

    #[derive(Default)]
    struct MockApi {
        records: HashMap<String, Value>,
        next_id: u64,
        hits: Vec<&'static str>,
        fault: Option<Fault>,
    }

    type Shared = Arc<Mutex<MockApi>>;

    async fn list_records(State(api): State<Shared>) -> (StatusCode, Json<Value>) {
        let mut api = api.lock().unwrap();
        api.hits.push("list");
        if api.fault == Some(Fault::ListDown) {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"success": false})),
            );
        }
        let records: Vec<Value> = api.records.values().cloned().collect();
        (
            StatusCode::OK,
            Json(json!({"success": true, "data": {"records": records}})),
        )
    }

    async fn create_record(
        State(api): State<Shared>,
        Json(mut body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let mut api = api.lock().unwrap();
        api.hits.push("create");
        api.next_id += 1;
        let id = format!("rec-{}", api.next_id);

        if api.fault == Some(Fault::NoIdOnCreate) {
            return (StatusCode::CREATED, Json(json!({"success": true, "data": body})));
        }

        body["id"] = json!(id);
        api.records.insert(id, body.clone());
        (StatusCode::CREATED, Json(json!({"success": true, "data": body})))
    }

    async fn fetch_record(
        State(api): State<Shared>,
        Path(id): Path<String>,
    ) -> (StatusCode, Json<Value>) {
        let mut api = api.lock().unwrap();
        api.hits.push("get");
        match api.records.get(&id) {
            Some(record) => (
                StatusCode::OK,
                Json(json!({"success": true, "data": record})),
            ),
            None => (StatusCode::NOT_FOUND, Json(json!({"success": false}))),
        }
    }

    async fn update_record(
        State(api): State<Shared>,
        Path(id): Path<String>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let mut api = api.lock().unwrap();
        api.hits.push("update");
        if api.fault == Some(Fault::UpdateFails) {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false})),
            );
        }
        match api.records.get_mut(&id) {
            Some(record) => {
                record["ip"] = body["ip"].clone();
                record["ttl"] = body["ttl"].clone();
                let record = record.clone();
                (
                    StatusCode::OK,
                    Json(json!({"success": true, "data": record})),
                )
            }
            None => (StatusCode::NOT_FOUND, Json(json!({"success": false}))),
        }
    }

    async fn delete_record(State(api): State<Shared>, Path(id): Path<String>) -> StatusCode {
        let mut api = api.lock().unwrap();
        api.hits.push("delete");
        match api.fault {
            Some(Fault::DeleteIgnored) => return StatusCode::NO_CONTENT,
            Some(Fault::DeleteFails) => return StatusCode::INTERNAL_SERVER_ERROR,
            _ => {}
        }
        match api.records.remove(&id) {
            Some(_) => StatusCode::NO_CONTENT,
            None => StatusCode::NOT_FOUND,
        }
    }

    async fn spawn_mock(fault: Option<Fault>) -> (LifecycleProbe, Shared) {
        let api: Shared = Arc::new(Mutex::new(MockApi {
            fault,
            ..MockApi::default()
        }));
        let app = Router::new()
            .route("/records", get(list_records).post(create_record))
            .route(
                "/records/{id}",
                get(fetch_record).put(update_record).delete(delete_record),
            )
            .with_state(Arc::clone(&api));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let probe =
            LifecycleProbe::with_base_url(format!("http://{}", addr), Duration::from_secs(2))
                .unwrap();
        (probe, api)
    }

    fn hits(api: &Shared) -> Vec<&'static str> {
        api.lock().unwrap().hits.clone()
    }

    #[test]
    fn test_step_order_and_names() {
        let names: Vec<&str> = LifecycleStep::ORDER.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            vec!["list", "create", "get", "update", "delete", "verify_deleted"]
        );
    }

    #[test]
    fn test_step_status_predicates() {
        assert!(LifecycleStep::Create.accepts(StatusCode::CREATED));
        assert!(LifecycleStep::Delete.accepts(StatusCode::NO_CONTENT));
        assert!(!LifecycleStep::Get.accepts(StatusCode::NOT_FOUND));
        assert!(LifecycleStep::VerifyDeleted.accepts(StatusCode::NOT_FOUND));
        assert!(!LifecycleStep::VerifyDeleted.accepts(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_complete_run_counts_every_operation_once() {
        let (probe, api) = spawn_mock(None).await;
        let aggregator = Aggregator::default();

        let outcome = probe.probe().await.unwrap();
        assert!(outcome.is_success());
        aggregator.record(probe.family(), outcome).await;

        assert_eq!(
            hits(&api),
            vec!["list", "create", "get", "update", "delete", "get"]
        );
        assert!(api.lock().unwrap().records.is_empty());
        assert_eq!(probe.active_records(), Some(0));

        let snapshot = aggregator.snapshot().await;
        assert_eq!(snapshot.api.success, 1);
        assert_eq!(snapshot.api.total, 1);
        assert_eq!(
            snapshot.operations,
            OperationCounters {
                created: 1,
                read: 1,
                updated: 1,
                deleted: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_abort_at_update_records_only_family_failure() {
        let (probe, api) = spawn_mock(Some(Fault::UpdateFails)).await;
        let aggregator = Aggregator::default();

        let outcome = probe.execute().await;
        assert!(!outcome.is_success());
        assert!(outcome.latency_secs() > 0.0);
        aggregator.record(Family::ApiLifecycle, outcome).await;

        assert_eq!(hits(&api), vec!["list", "create", "get", "update"]);

        let snapshot = aggregator.snapshot().await;
        assert_eq!(snapshot.api.failure, 1);
        assert_eq!(snapshot.api.success, 0);
        assert_eq!(snapshot.operations, OperationCounters::default());
    }

    #[tokio::test]
    async fn test_create_without_id_aborts_run() {
        let (probe, api) = spawn_mock(Some(Fault::NoIdOnCreate)).await;
        let mut run = LifecycleRun::new();

        let error = probe.drive(&mut run).await.unwrap_err();
        assert!(matches!(
            error,
            LifecycleError::MissingRecordId(LifecycleStep::Create)
        ));
        assert_eq!(run.step, LifecycleStep::Create);
        assert_eq!(hits(&api), vec!["list", "create"]);
    }

    #[tokio::test]
    async fn test_record_surviving_delete_fails_verification() {
        let (probe, api) = spawn_mock(Some(Fault::DeleteIgnored)).await;
        let mut run = LifecycleRun::new();

        let error = probe.drive(&mut run).await.unwrap_err();
        assert!(matches!(
            error,
            LifecycleError::RecordStillResolvable { .. }
        ));
        assert_eq!(run.step, LifecycleStep::VerifyDeleted);
        assert_eq!(hits(&api).len(), 6);
        assert_eq!(probe.tracked_records(), 1);
    }

    #[tokio::test]
    async fn test_failing_list_stops_before_create() {
        let (probe, api) = spawn_mock(Some(Fault::ListDown)).await;
        let mut run = LifecycleRun::new();

        let error = probe.drive(&mut run).await.unwrap_err();
        assert!(matches!(
            error,
            LifecycleError::UnexpectedStatus {
                step: LifecycleStep::List,
                status: StatusCode::SERVICE_UNAVAILABLE,
            }
        ));
        assert!(run.record_id.is_none());
        assert_eq!(hits(&api), vec!["list"]);
    }

    #[tokio::test]
    async fn test_unreachable_api_is_a_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe =
            LifecycleProbe::with_base_url(format!("http://{}", addr), Duration::from_secs(1))
                .unwrap();
        let mut run = LifecycleRun::new();

        let error = probe.drive(&mut run).await.unwrap_err();
        assert!(matches!(
            error,
            LifecycleError::Transport {
                step: LifecycleStep::List,
                ..
            }
        ));
        assert!(!probe.execute().await.is_success());
    }

    #[tokio::test]
    async fn test_aborted_runs_are_tracked_and_cleaned_up() {
        let (probe, api) = spawn_mock(Some(Fault::UpdateFails)).await;

        for _ in 0..3 {
            assert!(!probe.execute().await.is_success());
        }
        assert_eq!(api.lock().unwrap().records.len(), 3);
        assert_eq!(probe.tracked_records(), 3);

        assert_eq!(probe.cleanup().await, 3);
        assert!(api.lock().unwrap().records.is_empty());
        assert_eq!(probe.active_records(), Some(0));
    }

    #[tokio::test]
    async fn test_failed_cleanup_keeps_record_tracked() {
        let (probe, api) = spawn_mock(Some(Fault::DeleteFails)).await;

        assert!(!probe.execute().await.is_success());
        assert_eq!(probe.tracked_records(), 1);

        assert_eq!(probe.cleanup().await, 0);
        assert_eq!(probe.tracked_records(), 1);
        assert_eq!(api.lock().unwrap().records.len(), 1);
    }

    #[tokio::test]
    async fn test_primed_records_are_tracked_and_cleaned_up() {
        let (probe, api) = spawn_mock(None).await;

        let created = prime_datastore(&probe).await;
        assert_eq!(created, 8);
        assert_eq!(probe.tracked_records(), 8);
        assert_eq!(api.lock().unwrap().records.len(), 8);

        assert_eq!(probe.cleanup().await, 8);
        assert!(api.lock().unwrap().records.is_empty());
        assert_eq!(probe.tracked_records(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_treats_missing_records_as_removed() {
        let (probe, _api) = spawn_mock(None).await;
        probe.track("rec-404");

        assert_eq!(probe.cleanup().await, 1);
        assert_eq!(probe.tracked_records(), 0);
    }
}
