//! Prometheus metrics for HTTP traffic
//!
//! Every request passing through the router is recorded here:
//! - `http_requests_total{method,path,status}` - requests served
//! - `http_request_duration_seconds{method,path,status}` - latency histogram
//! - `http_requests_in_progress{method,path}` - requests currently being handled
//! - `http_request_exceptions_total{method,path}` - requests that ended in a 5xx
//!
//! The registry is owned, not the `prometheus` default global, so each
//! server (and each test) sees only its own traffic.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::string::FromUtf8Error;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// `path` label for requests that matched no route
pub const UNMATCHED_PATH: &str = "<unmatched>";

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to register metric: {0}")]
    Register(#[source] prometheus::Error),

    #[error("failed to encode metrics: {0}")]
    Encode(#[source] prometheus::Error),

    #[error("encoded metrics are not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Metrics registry shared by all request handlers
pub type SharedMetrics = Arc<HttpMetrics>;

/// Create the metrics registry for a server
pub fn create_metrics() -> Result<SharedMetrics, MetricsError> {
    HttpMetrics::new().map(Arc::new)
}

pub struct HttpMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_progress: IntGaugeVec,
    request_exceptions_total: IntCounterVec,
}

impl HttpMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )
        .map_err(MetricsError::Register)?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            &["method", "path", "status"],
        )
        .map_err(MetricsError::Register)?;

        let requests_in_progress = IntGaugeVec::new(
            Opts::new(
                "http_requests_in_progress",
                "Number of HTTP requests currently being handled",
            ),
            &["method", "path"],
        )
        .map_err(MetricsError::Register)?;

        let request_exceptions_total = IntCounterVec::new(
            Opts::new(
                "http_request_exceptions_total",
                "Total number of HTTP requests that ended in a server error",
            ),
            &["method", "path"],
        )
        .map_err(MetricsError::Register)?;

        let exporter_info = IntGaugeVec::new(
            Opts::new("hostinfo_exporter_info", "Information about the hostinfo server"),
            &["version"],
        )
        .map_err(MetricsError::Register)?;
        exporter_info
            .with_label_values(&[env!("CARGO_PKG_VERSION")])
            .set(1);

        registry
            .register(Box::new(requests_total.clone()))
            .map_err(MetricsError::Register)?;
        registry
            .register(Box::new(request_duration_seconds.clone()))
            .map_err(MetricsError::Register)?;
        registry
            .register(Box::new(requests_in_progress.clone()))
            .map_err(MetricsError::Register)?;
        registry
            .register(Box::new(request_exceptions_total.clone()))
            .map_err(MetricsError::Register)?;
        registry
            .register(Box::new(exporter_info))
            .map_err(MetricsError::Register)?;

        #[cfg(target_os = "linux")]
        registry
            .register(Box::new(
                prometheus::process_collector::ProcessCollector::for_self(),
            ))
            .map_err(MetricsError::Register)?;

        Ok(Self {
            registry,
            requests_total,
            request_duration_seconds,
            requests_in_progress,
            request_exceptions_total,
        })
    }

    /// Mark a request as in progress until the returned guard is dropped
    pub fn start_request(&self, method: &str, path: &str) -> InProgressGuard {
        let gauge = self.requests_in_progress.with_label_values(&[method, path]);
        gauge.inc();
        InProgressGuard { gauge }
    }

    /// Record a completed request
    pub fn record(&self, method: &str, path: &str, status: u16, duration: Duration) {
        let status_label = status.to_string();
        let labels = [method, path, status_label.as_str()];

        self.requests_total.with_label_values(&labels).inc();
        self.request_duration_seconds
            .with_label_values(&labels)
            .observe(duration.as_secs_f64());

        if status >= 500 {
            self.request_exceptions_total
                .with_label_values(&[method, path])
                .inc();
        }
    }

    /// Render the current snapshot in Prometheus text exposition format
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(MetricsError::Encode)?;

        Ok(String::from_utf8(buffer)?)
    }
}

/// Decrements `http_requests_in_progress` on drop
///
/// Dropping covers handlers that are cancelled mid-flight (client hangs up).
pub struct InProgressGuard {
    gauge: IntGauge,
}

impl Drop for InProgressGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

/// Look up a sample in exposition text by its full series name, e.g.
/// `http_requests_total{method="GET",path="/",status="200"}`
#[cfg(test)]
pub(crate) fn sample_value(exposition: &str, series: &str) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let value = line.strip_prefix(series)?.strip_prefix(' ')?;
            value.trim().parse().ok()
        })
}

/// Check that every line is a comment, blank, or `name[{labels}] value`
#[cfg(test)]
pub(crate) fn assert_exposition_format(exposition: &str) {
    for line in exposition.lines() {
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix("# ") {
            assert!(
                comment.starts_with("HELP ") || comment.starts_with("TYPE "),
                "unexpected comment line: {line}"
            );
            continue;
        }

        let (series, value) = line
            .rsplit_once(' ')
            .unwrap_or_else(|| panic!("sample line without value: {line}"));
        assert!(
            value.parse::<f64>().is_ok() || value == "+Inf",
            "sample value is not a number: {line}"
        );

        let name = series.split('{').next().unwrap_or_default();
        assert!(
            !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':'),
            "invalid metric name: {line}"
        );
        if series.contains('{') {
            assert!(series.ends_with('}'), "unterminated label set: {line}");
        }
    }
}
