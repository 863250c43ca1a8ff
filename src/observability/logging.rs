//! Structured logging bridged to OpenTelemetry
//!
//! A single global subscriber combines:
//! - an `EnvFilter` (`RUST_LOG` wins over the configured level)
//! - a fmt layer, `json` (with the current span) or `pretty`
//! - a `tracing-opentelemetry` layer bound to the telemetry handle's tracer,
//!   so every `tracing` span is exported and log lines share its trace
//!
//! Export client crates are silenced so that exporting telemetry does not
//! itself produce telemetry.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use super::init::Telemetry;
use crate::config::LoggingConfig;

const QUIET_TARGETS: [&str; 4] = ["hyper=off", "h2=off", "reqwest=off", "opentelemetry=warn"];

/// Build the filter from `RUST_LOG`, falling back to the configured level
pub fn build_env_filter(level: &str) -> Result<EnvFilter> {
    let mut filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("Invalid log level '{}': {}", level, e))?;

    for directive in QUIET_TARGETS {
        filter = filter.add_directive(directive.parse()?);
    }

    Ok(filter)
}

/// Install the global subscriber.
///
/// Fails if the format is unknown or a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig, telemetry: &Telemetry) -> Result<()> {
    let env_filter = build_env_filter(&config.level)?;

    match config.format.as_str() {
        "json" => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_thread_ids(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .with(tracing_opentelemetry::layer().with_tracer(telemetry.tracer()))
                .try_init()?;
        }
        "pretty" => {
            let pretty_layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(pretty_layer)
                .with(tracing_opentelemetry::layer().with_tracer(telemetry.tracer()))
                .try_init()?;
        }
        other => {
            return Err(anyhow!(
                "Unsupported log format: {}. Use 'json' or 'pretty'",
                other
            ));
        }
    }

    tracing::info!(format = %config.format, level = %config.level, "Logging initialized");
    Ok(())
}
