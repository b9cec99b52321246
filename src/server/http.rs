//! Greeting and metrics endpoints
//!
//! - `GET /` - `Hostname: <name>` for the machine serving the request
//! - `GET /metrics` - Prometheus metrics in text format
//!
//! Unknown paths return 404. Every response except scrapes of `/metrics`,
//! including 404s, is recorded by the metrics middleware.

use crate::config::Config;
use crate::hostname::{HostnameError, HostnameResolver};
use crate::server::metrics::{MetricsError, SharedMetrics, UNMATCHED_PATH};
use crate::server::shutdown::ShutdownSignal;
use axum::{
    extract::{MatchedPath, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Scrape endpoint, never recorded in its own metrics
const METRICS_PATH: &str = "/metrics";

/// Content type of the Prometheus text exposition format
const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    metrics: SharedMetrics,
    hostname: Arc<dyn HostnameResolver>,
}

impl AppState {
    pub fn new(metrics: SharedMetrics, hostname: Arc<dyn HostnameResolver>) -> Self {
        Self { metrics, hostname }
    }

    pub fn metrics(&self) -> &SharedMetrics {
        &self.metrics
    }
}

/// Handler failures, all surfaced as 500
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to resolve host name: {0}")]
    Hostname(#[from] HostnameError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Greeting handler
///
/// Resolves the host name on every call.
async fn index(State(state): State<AppState>) -> Result<String, ApiError> {
    let name = state.hostname.hostname()?;
    Ok(format!("Hostname: {}", name))
}

/// Prometheus metrics handler
///
/// Read-only: scraping never resets counters.
async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.metrics.render()?;
    Ok(([(CONTENT_TYPE, METRICS_CONTENT_TYPE)], body))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Record method, route, status and latency of every request except scrapes
async fn track_metrics(State(metrics): State<SharedMetrics>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());

    if path == METRICS_PATH {
        return next.run(req).await;
    }

    let response = {
        let _in_progress = metrics.start_request(method.as_str(), &path);
        next.run(req).await
    };

    let latency = start.elapsed();
    let status = response.status().as_u16();
    metrics.record(method.as_str(), &path, status, latency);
    debug!(
        method = %method,
        path = %path,
        status = status,
        latency = ?latency,
        "Request handled"
    );

    response
}

/// Build the route table with the metrics middleware applied to every route
///
/// `/metrics` passes through the middleware untracked.
pub fn build_router(state: AppState) -> Router {
    let track = middleware::from_fn_with_state(state.metrics.clone(), track_metrics);

    Router::new()
        .route("/", get(index))
        .route(METRICS_PATH, get(self::metrics))
        .fallback(not_found)
        .layer(track)
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` fires
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    mut shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    let app = build_router(state);

    info!(addr = %addr, "hostinfo server listening (HTTP)");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;

    info!(addr = %addr, "hostinfo server stopped");
    Ok(())
}

/// Bind the configured address and serve until `shutdown` fires
pub async fn run_server(
    config: &Config,
    state: AppState,
    shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    serve(listener, state, shutdown).await
}
