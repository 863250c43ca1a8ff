//! Telemetry initialization
//!
//! Builds the tracer and meter providers once at startup and hands them back
//! as a [`Telemetry`] handle. Nothing is registered as an OpenTelemetry
//! global: the handle is threaded into the log subscriber and router state.

use anyhow::Result;
use opentelemetry::KeyValue;
use opentelemetry::metrics::MeterProvider;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use std::time::Duration;
use tracing::{info, warn};

use super::exporters::ExporterPlan;
use super::metrics::HttpMetrics;
use crate::config::{Environment, TelemetryConfig};

/// Instrumentation scope for tracers and meters created by this crate
pub const INSTRUMENTATION_SCOPE: &str = env!("CARGO_PKG_NAME");

/// Build the resource descriptor shared by every pipeline.
///
/// This is the only place service identity is attached to telemetry.
pub fn build_resource(config: &TelemetryConfig, environment: Environment) -> Resource {
    Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attributes([
            KeyValue::new("service.version", config.service_version.clone()),
            KeyValue::new("deployment.environment", environment.as_str()),
        ])
        .build()
}

/// Process-wide telemetry handle
#[derive(Clone)]
pub struct Telemetry {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
    http_metrics: HttpMetrics,
    plan: ExporterPlan,
    service: String,
    issues: Vec<String>,
}

impl Telemetry {
    /// Initialize traces and metrics export.
    ///
    /// Never fails: an OTLP exporter that cannot be built is skipped,
    /// leaving the console sink in place. Such problems are kept as
    /// [`Telemetry::issues`] and reported by [`Telemetry::log_startup`], since
    /// this usually runs before the log subscriber exists.
    pub fn init(config: &TelemetryConfig, environment: Environment) -> Self {
        let plan = ExporterPlan::resolve(config);
        let resource = build_resource(config, environment);
        let interval = Duration::from_secs(config.metrics_export_interval_secs);

        let mut issues = Vec::new();
        if let Some(rejected) = &plan.rejected_endpoint {
            issues.push(format!("Ignoring invalid OTLP endpoint ({}), using exporter default", rejected));
        }

        let tracer_provider = build_tracer_provider(&plan, resource.clone(), &mut issues);
        let meter_provider = build_meter_provider(&plan, resource, interval, &mut issues);
        let http_metrics = HttpMetrics::new(&meter_provider.meter(INSTRUMENTATION_SCOPE));

        Self {
            tracer_provider,
            meter_provider,
            http_metrics,
            plan,
            service: format!("{}@{}", config.service_name, config.service_version),
            issues,
        }
    }

    /// Report the export setup and any degraded pipelines
    pub fn log_startup(&self) {
        for issue in &self.issues {
            warn!("{}", issue);
        }

        info!(
            service = %self.service,
            console = self.plan.console,
            otlp_endpoint = self.plan.otlp_endpoint.as_ref().map(|u| u.as_str()).unwrap_or("default"),
            api_key_header = self.plan.has_api_key(),
            "Telemetry initialized"
        );
    }

    /// Problems found while wiring the exporters
    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    pub fn tracer(&self) -> SdkTracer {
        self.tracer_provider.tracer(INSTRUMENTATION_SCOPE)
    }

    pub fn http_metrics(&self) -> HttpMetrics {
        self.http_metrics.clone()
    }

    pub fn plan(&self) -> &ExporterPlan {
        &self.plan
    }

    /// Flush pending telemetry and stop the export workers.
    ///
    /// Export failures are logged, never returned.
    pub fn shutdown_blocking(&self) {
        if let Err(err) = self.tracer_provider.shutdown() {
            warn!(error = %err, "Tracer provider shutdown reported an error");
        }
        if let Err(err) = self.meter_provider.shutdown() {
            warn!(error = %err, "Meter provider shutdown reported an error");
        }
    }

    /// Async wrapper around [`Telemetry::shutdown_blocking`] for use on a runtime
    pub async fn shutdown(&self) {
        let telemetry = self.clone();
        if let Err(err) = tokio::task::spawn_blocking(move || telemetry.shutdown_blocking()).await {
            warn!(error = %err, "Telemetry shutdown task failed");
        }
    }
}

fn build_tracer_provider(
    plan: &ExporterPlan,
    resource: Resource,
    issues: &mut Vec<String>,
) -> SdkTracerProvider {
    let mut builder = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(opentelemetry_stdout::SpanExporter::default());

    match otlp_span_exporter(plan) {
        Ok(exporter) => builder = builder.with_batch_exporter(exporter),
        Err(err) => issues.push(format!("OTLP span exporter unavailable, console only: {}", err)),
    }

    builder.build()
}

fn build_meter_provider(
    plan: &ExporterPlan,
    resource: Resource,
    interval: Duration,
    issues: &mut Vec<String>,
) -> SdkMeterProvider {
    let console_reader = PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default())
        .with_interval(interval)
        .build();

    let mut builder = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_reader(console_reader);

    match otlp_metric_exporter(plan) {
        Ok(exporter) => {
            let reader = PeriodicReader::builder(exporter).with_interval(interval).build();
            builder = builder.with_reader(reader);
        }
        Err(err) => issues.push(format!("OTLP metric exporter unavailable, console only: {}", err)),
    }

    builder.build()
}

fn otlp_span_exporter(plan: &ExporterPlan) -> Result<opentelemetry_otlp::SpanExporter> {
    let mut builder = opentelemetry_otlp::SpanExporter::builder().with_http();
    if let Some(endpoint) = plan.traces_endpoint() {
        builder = builder.with_endpoint(endpoint);
    }
    if !plan.headers.is_empty() {
        builder = builder.with_headers(plan.headers.clone());
    }
    Ok(builder.build()?)
}

fn otlp_metric_exporter(plan: &ExporterPlan) -> Result<opentelemetry_otlp::MetricExporter> {
    let mut builder = opentelemetry_otlp::MetricExporter::builder().with_http();
    if let Some(endpoint) = plan.metrics_endpoint() {
        builder = builder.with_endpoint(endpoint);
    }
    if !plan.headers.is_empty() {
        builder = builder.with_headers(plan.headers.clone());
    }
    Ok(builder.build()?)
}
