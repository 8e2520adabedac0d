//! Metrics collection and exposition.
//!
//! # Metrics
//! - `trace_span_duration_seconds` (histogram): traced call latency
//! - `trace_span_errors_total` (counter): failed traced calls by error kind
//! - `access_denied_total` (counter): calls rejected by the IP guard

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`. Needs a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_span(elapsed: Duration, error_kind: Option<&'static str>) {
    histogram!("trace_span_duration_seconds").record(elapsed.as_secs_f64());
    if let Some(kind) = error_kind {
        counter!("trace_span_errors_total", "kind" => kind).increment(1);
    }
}

pub fn record_access_denied() {
    counter!("access_denied_total").increment(1);
}
