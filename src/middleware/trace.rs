//! Per-request tracing.

use std::time::Duration;

use tracing::{Span, debug, info_span, warn};

/// Opens the span every event for one request is recorded under.
pub(crate) fn span(method: &http::Method, path: &str) -> Span {
    info_span!("request", %method, path)
}

/// Records the outcome of a request inside its span.
pub(crate) fn finish(status: http::StatusCode, elapsed: Duration) {
    let latency_us = elapsed.as_micros() as u64;
    if status.is_server_error() {
        warn!(status = status.as_u16(), latency_us, "request failed");
    } else {
        debug!(status = status.as_u16(), latency_us, "request finished");
    }
}
