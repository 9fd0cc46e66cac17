// Standard library
use std::future::Future;
use std::net::SocketAddr;

// 3rd party crates
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::{debug, info};

// Project imports
use crate::metrics::HealthReport;

// Current module imports
use super::constants::METRICS_CONTENT_TYPE;
use super::errors::ExpositionError;
use super::types::ExpositionState;

/// Builds the exposition router: `/metrics`, `/health`, and an empty 404 for
/// everything else.
pub fn router(state: ExpositionState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .fallback(not_found)
        .with_state(state)
}

async fn metrics_handler(State(state): State<ExpositionState>) -> impl IntoResponse {
    let snapshot = state.aggregator.snapshot().await;
    let body = state.exporter.render(&snapshot);
    debug!(bytes = body.len(), "Serving metrics scrape");
    ([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], body)
}

async fn health_handler(State(state): State<ExpositionState>) -> Json<HealthReport> {
    Json(HealthReport::healthy(state.started))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Binds the exposition endpoint.
///
/// Binding is split from serving so the caller learns about a bind failure
/// while the probes keep running regardless.
pub async fn bind(address: &str, port: u16) -> Result<TcpListener, ExpositionError> {
    let target = format!("{}:{}", address, port);
    TcpListener::bind(&target)
        .await
        .map_err(|source| ExpositionError::Bind { target, source })
}

/// Serves the exposition endpoint until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: ExpositionState,
    shutdown: F,
) -> Result<(), ExpositionError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local: Option<SocketAddr> = listener.local_addr().ok();
    if let Some(addr) = local {
        info!("📈 Metrics server started on http://{}/metrics", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ExpositionError::Serve)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::exporter::Exporter;
    use crate::metrics::Aggregator;
    use crate::models::{Family, Outcome};

    fn state() -> ExpositionState {
        ExpositionState {
            aggregator: Arc::new(Aggregator::default()),
            exporter: Arc::new(Exporter::new("127.0.0.1:53", "127.0.0.1:8080")),
            started: Instant::now(),
        }
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_metrics_endpoint_renders_snapshot() {
        let state = state();
        state
            .aggregator
            .record(Family::Dns, Outcome::success(Duration::from_millis(5)))
            .await;

        let response = router(state)
            .oneshot(request(Method::GET, "/metrics"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            METRICS_CONTENT_TYPE
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("dns_canary_queries_total{server=\"127.0.0.1:53\"} 1\n"));
    }

    #[tokio::test]
    async fn test_health_endpoint_reports_healthy() {
        let response = router(state())
            .oneshot(request(Method::GET, "/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json["timestamp"].is_u64());
    }

    #[tokio::test]
    async fn test_unknown_path_is_empty_404_for_any_method() {
        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
            let response = router(state())
                .oneshot(request(method.clone(), "/unknown"))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::NOT_FOUND, "method {method}");
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let taken = bind("127.0.0.1", 0).await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let result = bind("127.0.0.1", port).await;
        assert!(matches!(result, Err(ExpositionError::Bind { .. })));
    }
}
