//! Request span middleware
//!
//! Wraps every request in an `http_request` span parented on any incoming
//! W3C trace context, and returns the trace id in `x-trace-id` so clients can
//! find their request in logs and exported traces.

use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, field};
use tracing_opentelemetry::OpenTelemetrySpanExt;
use uuid::Uuid;

use crate::observability::{UNMATCHED_ROUTE, extract_trace_context, trace_id_of};

/// HTTP header name for trace ID
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Trace id of the current request, available to handlers as an extension
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn trace_context_middleware(mut request: Request, next: Next) -> Response {
    let parent = extract_trace_context(request.headers());
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());
    let method = request.method().clone();

    let span = tracing::info_span!(
        "http_request",
        otel.name = %format!("{} {}", method, route),
        otel.kind = "server",
        otel.status_code = field::Empty,
        http.request.method = %method,
        http.route = %route,
        url.path = %request.uri().path(),
        http.response.status_code = field::Empty,
        trace_id = field::Empty,
    );
    let _ = span.set_parent(parent.clone());

    // Prefer the exported span's id; without an OpenTelemetry layer fall back
    // to the caller's trace, then a caller-supplied id, then a fresh one.
    let trace_id = trace_id_of(&span.context())
        .or_else(|| trace_id_of(&parent))
        .or_else(|| {
            request
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
    span.record("trace_id", trace_id.as_str());

    request.extensions_mut().insert(TraceId(trace_id.clone()));

    let mut response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    span.record("http.response.status_code", status.as_u16());
    if status.is_server_error() {
        span.record("otel.status_code", "ERROR");
    }

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn,
        routing::get,
    };
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(test_handler))
            .layer(from_fn(trace_context_middleware))
    }

    fn header(response: &Response, name: &str) -> String {
        response.headers().get(name).unwrap().to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_trace_id_generated() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let trace_id = header(&response, TRACE_ID_HEADER);
        assert_eq!(trace_id.len(), 32);
        assert!(trace_id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_traceparent_propagated() {
        let request = Request::builder()
            .uri("/")
            .header("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, TRACE_ID_HEADER), "4bf92f3577b34da6a3ce929d0e0e4736");
    }

    #[tokio::test]
    async fn test_caller_trace_id_propagated() {
        let request = Request::builder()
            .uri("/")
            .header(TRACE_ID_HEADER, "test-trace-id-12345")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(header(&response, TRACE_ID_HEADER), "test-trace-id-12345");
    }

    #[tokio::test]
    async fn test_trace_id_in_extensions() {
        async fn handler_with_extension(request: Request<Body>) -> String {
            request
                .extensions()
                .get::<TraceId>()
                .map(|id| id.as_str().to_string())
                .unwrap_or_default()
        }

        let app = Router::new()
            .route("/", get(handler_with_extension))
            .layer(from_fn(trace_context_middleware));

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let header_id = header(&response, TRACE_ID_HEADER);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), header_id);
    }
}
