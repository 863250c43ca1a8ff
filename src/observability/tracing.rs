//! Trace context helpers
//!
//! W3C `traceparent` extraction for inbound requests and trace-id lookup for
//! correlating log lines and responses with exported spans.

use axum::http::HeaderMap;
use opentelemetry::propagation::{Extractor, TextMapPropagator};
use opentelemetry::trace::TraceContextExt;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tracing_opentelemetry::OpenTelemetrySpanExt;

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// Extract the remote parent context from `traceparent`/`tracestate` headers
pub fn extract_trace_context(headers: &HeaderMap) -> opentelemetry::Context {
    TraceContextPropagator::new().extract(&HeaderExtractor(headers))
}

/// Hex trace id carried by `cx`, if it holds a valid span context
pub fn trace_id_of(cx: &opentelemetry::Context) -> Option<String> {
    let span = cx.span();
    let span_context = span.span_context();

    if span_context.is_valid() {
        Some(format!("{:032x}", span_context.trace_id()))
    } else {
        None
    }
}

/// Get the current trace ID from the active span context
pub fn current_trace_id() -> Option<String> {
    trace_id_of(&tracing::Span::current().context())
}
