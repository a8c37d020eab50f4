//! Span definitions for tracing client operations.

use tracing::{Span, debug_span, info_span};

/// Create a span for a backend request.
///
/// ```
/// use taleweave_telemetry::spans::request_span;
///
/// let span = request_span("req-123", "GET", "/stories");
/// let _guard = span.enter();
/// ```
#[must_use]
pub fn request_span(request_id: &str, method: &str, path: &str) -> Span {
    info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        otel.kind = "client"
    )
}

/// Create a span for the lifetime of a realtime connection.
#[must_use]
pub fn connection_span(url: &str) -> Span {
    info_span!(
        "realtime_connection",
        url = %url,
        otel.kind = "client"
    )
}

/// Create a span for dispatching one inbound realtime event.
#[must_use]
pub fn realtime_event_span(event: &str) -> Span {
    debug_span!("realtime_event", event = %event)
}

/// Create a span for local persistence.
#[must_use]
pub fn storage_span(operation: &str, path: &str) -> Span {
    debug_span!("storage", operation = %operation, path = %path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_can_be_entered() {
        let span = request_span("req-1", "POST", "/auth/login");
        let _g = span.enter();
        let span = connection_span("ws://localhost:3001/socket");
        let _g = span.enter();
        let span = realtime_event_span("presence-update");
        let _g = span.enter();
        let span = storage_span("write", "/tmp/taleweave-storage.json");
        let _g = span.enter();
    }
}
