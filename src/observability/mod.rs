//! Observability: traces, metrics and logs
//!
//! - [`Telemetry`] owns the tracer and meter providers built at startup
//! - [`ExporterPlan`] decides where telemetry is delivered
//! - [`HttpMetrics`] holds the per-request instruments
//! - [`init_logging`] installs the `tracing` subscriber bridged to OpenTelemetry

pub mod exporters;
pub mod init;
pub mod logging;
pub mod metrics;
pub mod tracing;

pub use exporters::{EndpointError, ExporterPlan, parse_endpoint};
pub use init::{INSTRUMENTATION_SCOPE, Telemetry, build_resource};
pub use logging::{build_env_filter, init_logging};
pub use metrics::{HttpMetrics, UNMATCHED_ROUTE, bucket_status_code};
pub use self::tracing::{current_trace_id, extract_trace_context, trace_id_of};
