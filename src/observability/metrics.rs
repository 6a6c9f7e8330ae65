//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sender_requests_total` (counter): finished transport calls by transport, outcome
//! - `sender_request_duration_seconds` (histogram): latency of successful calls
//! - `sender_in_flight` (gauge): slots currently held
//! - `sender_parse_failures_total` (counter): corpus values whose request did not parse
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; without an installed recorder
//!   every call is a no-op
//! - The Prometheus exporter is installed only when an address is configured

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "sender_requests_total";
pub const REQUEST_DURATION: &str = "sender_request_duration_seconds";
pub const IN_FLIGHT: &str = "sender_in_flight";
pub const PARSE_FAILURES: &str = "sender_parse_failures_total";

/// Install the Prometheus recorder with a scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            metrics::describe_counter!(REQUESTS_TOTAL, "Finished transport calls");
            metrics::describe_histogram!(
                REQUEST_DURATION,
                metrics::Unit::Seconds,
                "Latency of successful transport calls"
            );
            metrics::describe_gauge!(IN_FLIGHT, "Concurrency slots currently held");
            metrics::describe_counter!(PARSE_FAILURES, "Rendered requests that failed to parse");
            tracing::info!(address = %addr, "metrics endpoint listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "failed to install metrics exporter")
        }
    }
}

/// A transport call produced a response.
pub fn record_request(transport: &'static str, outcome: &'static str, elapsed: Duration) {
    counter!(REQUESTS_TOTAL, "transport" => transport, "outcome" => outcome).increment(1);
    histogram!(REQUEST_DURATION, "transport" => transport).record(elapsed.as_secs_f64());
}

/// A transport call failed; `kind` is the error label.
pub fn record_failure(transport: &'static str, kind: &'static str) {
    counter!(REQUESTS_TOTAL, "transport" => transport, "outcome" => kind).increment(1);
}

pub fn record_parse_failure() {
    counter!(PARSE_FAILURES).increment(1);
}

pub fn slot_acquired() {
    gauge!(IN_FLIGHT).increment(1.0);
}

pub fn slot_released() {
    gauge!(IN_FLIGHT).decrement(1.0);
}
