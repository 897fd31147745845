//! Prometheus metrics for read/write outcomes and collaborator latency.
//!
//! Metric names follow `draft_{area}_{name}`; counters end in `_total`.

use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::DraftError;

static INIT: Once = Once::new();

macro_rules! draft_metric {
    (counter, $area:literal, $name:literal) => {
        concat!("draft_", $area, "_", $name, "_total")
    };
    (histogram, $area:literal, $name:literal) => {
        concat!("draft_", $area, "_", $name)
    };
}

/// Installs the Prometheus recorder and its HTTP listener. Idempotent.
pub fn init_metrics(addr: SocketAddr) {
    INIT.call_once(|| {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
        match builder.install() {
            Ok(()) => {
                info!("Prometheus exporter listening at http://{}/metrics", addr);
                describe_metrics();
            }
            Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
        }
    });
}

fn describe_metrics() {
    ::metrics::describe_counter!(
        draft_metric!(counter, "read", "outcomes"),
        "Read attempts by path taken (draft or canonical) and outcome"
    );
    ::metrics::describe_counter!(
        draft_metric!(counter, "write", "outcomes"),
        "Write attempts by outcome"
    );
    ::metrics::describe_histogram!(
        draft_metric!(histogram, "upstream", "call_duration_seconds"),
        "Latency of calls to collaborating services"
    );
}

fn outcome<T>(result: &Result<T, DraftError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    }
}

pub fn record_read_outcome<T>(path: &'static str, result: &Result<T, DraftError>) {
    ::metrics::counter!(
        draft_metric!(counter, "read", "outcomes"),
        "path" => path,
        "outcome" => outcome(result)
    )
    .increment(1);
}

pub fn record_write_outcome<T>(result: &Result<T, DraftError>) {
    ::metrics::counter!(
        draft_metric!(counter, "write", "outcomes"),
        "outcome" => outcome(result)
    )
    .increment(1);
}

pub fn record_upstream_call(service: &'static str, elapsed: Duration) {
    ::metrics::histogram!(
        draft_metric!(histogram, "upstream", "call_duration_seconds"),
        "service" => service
    )
    .record(elapsed.as_secs_f64());
}
