//! HTTP server for the hostname greeting and Prometheus metrics
//!
//! - `/` - `Hostname: <name>` of the serving machine
//! - `/metrics` - Prometheus scrape endpoint
//!
//! Also provides graceful shutdown handling for SIGTERM/SIGINT.

mod http;
pub mod metrics;
pub mod shutdown;

pub use http::{build_router, run_server, serve, ApiError, AppState};
pub use metrics::{create_metrics, HttpMetrics, MetricsError, SharedMetrics};
pub use shutdown::{shutdown_channel, wait_for_signal, ShutdownController, ShutdownSignal};

#[cfg(test)]
#[path = "http_test.rs"]
mod http_tests;

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;
