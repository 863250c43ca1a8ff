//! HTTP server metrics
//!
//! Request count and latency are recorded per request with low-cardinality
//! attributes only:
//! - `http.request.method`
//! - `http.route` (the matched route template, never the raw path)
//! - `http.response.status_class` (2xx, 3xx, 4xx, 5xx)

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use std::time::Duration;

pub const REQUEST_COUNT_METRIC: &str = "http.server.request.count";
pub const REQUEST_DURATION_METRIC: &str = "http.server.request.duration";

/// Route label used when no route matched the request
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Bucket HTTP status codes to control cardinality
pub fn bucket_status_code(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

/// Instruments shared by every request handler
#[derive(Clone)]
pub struct HttpMetrics {
    requests: Counter<u64>,
    duration: Histogram<f64>,
}

impl HttpMetrics {
    pub fn new(meter: &Meter) -> Self {
        let requests = meter
            .u64_counter(REQUEST_COUNT_METRIC)
            .with_description("Number of HTTP requests handled")
            .with_unit("{request}")
            .build();

        let duration = meter
            .f64_histogram(REQUEST_DURATION_METRIC)
            .with_description("Duration of HTTP requests")
            .with_unit("s")
            .build();

        Self { requests, duration }
    }

    pub fn record_request(&self, method: &str, route: &str, status_code: u16, elapsed: Duration) {
        let attributes = [
            KeyValue::new("http.request.method", method.to_string()),
            KeyValue::new("http.route", route.to_string()),
            KeyValue::new("http.response.status_class", bucket_status_code(status_code)),
        ];

        self.requests.add(1, &attributes);
        self.duration.record(elapsed.as_secs_f64(), &attributes);

        tracing::debug!(
            method = %method,
            route = %route,
            status = status_code,
            duration_ms = %elapsed.as_millis(),
            "HTTP request metrics recorded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::metrics::MeterProvider;
    use opentelemetry_sdk::metrics::SdkMeterProvider;

    #[test]
    fn test_status_code_bucketing() {
        assert_eq!(bucket_status_code(200), "2xx");
        assert_eq!(bucket_status_code(204), "2xx");
        assert_eq!(bucket_status_code(301), "3xx");
        assert_eq!(bucket_status_code(404), "4xx");
        assert_eq!(bucket_status_code(503), "5xx");
        assert_eq!(bucket_status_code(99), "other");
        assert_eq!(bucket_status_code(600), "other");
    }

    #[test]
    fn test_recording_without_readers() {
        let provider = SdkMeterProvider::builder().build();
        let metrics = HttpMetrics::new(&provider.meter("test"));

        metrics.record_request("GET", "/movies", 200, Duration::from_millis(3));
        metrics.record_request("GET", "/movies/{id}", 404, Duration::from_micros(250));
    }
}
