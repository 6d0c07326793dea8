//! Metrics collection.
//!
//! # Metrics
//! - `bridge_requests_total` (counter): requests by route, method, status
//! - `bridge_request_duration_seconds` (histogram): latency by route
//! - `bridge_merge_request_lookups_total` (counter): context lookups by outcome
//!
//! # Design Decisions
//! - No exporter is installed; without a recorder these calls are no-ops
//! - Labels are the route pattern, never the raw path

use std::time::Instant;

use axum::http::{Method, StatusCode};

pub fn record_request(route: &'static str, method: &Method, status: StatusCode, start: Instant) {
    metrics::counter!(
        "bridge_requests_total",
        "route" => route,
        "method" => method.to_string(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);

    metrics::histogram!("bridge_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_merge_request_lookup(outcome: &'static str) {
    metrics::counter!("bridge_merge_request_lookups_total", "outcome" => outcome).increment(1);
}
