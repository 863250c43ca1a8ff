//! Exporter selection
//!
//! Decides, from configuration alone, where telemetry goes. The console sink
//! is unconditional. The OTLP exporter is always wired; the configured
//! endpoint only overrides its built-in default when it is a usable absolute
//! URL, and the API key becomes a single custom header when present.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use url::Url;

use crate::config::TelemetryConfig;

/// Path suffix for OTLP/HTTP trace export
pub const TRACES_PATH: &str = "v1/traces";

/// Path suffix for OTLP/HTTP metric export
pub const METRICS_PATH: &str = "v1/metrics";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EndpointError {
    #[error("endpoint is not an absolute URL: {0}")]
    Malformed(#[from] url::ParseError),

    #[error("unsupported endpoint scheme: {0}")]
    UnsupportedScheme(String),

    #[error("endpoint has no host")]
    MissingHost,
}

/// Parse a collector base URL. Only absolute `http`/`https` URLs with a host
/// are accepted.
pub fn parse_endpoint(raw: &str) -> Result<Url, EndpointError> {
    let url = Url::parse(raw.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(EndpointError::MissingHost);
    }

    Ok(url)
}

/// Resolved export destinations
#[derive(Clone, PartialEq, Eq)]
pub struct ExporterPlan {
    /// Always true: spans and metrics are printed to stdout
    pub console: bool,
    /// Endpoint override for the OTLP exporter; `None` keeps the exporter default
    pub otlp_endpoint: Option<Url>,
    /// Extra headers sent with every OTLP export request
    pub headers: HashMap<String, String>,
    /// Configured endpoint that was ignored, with the reason
    pub rejected_endpoint: Option<String>,
}

impl ExporterPlan {
    pub fn resolve(config: &TelemetryConfig) -> Self {
        let mut rejected_endpoint = None;
        let otlp_endpoint = match config.otlp_endpoint.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match parse_endpoint(raw) {
                Ok(url) => Some(url),
                Err(err) => {
                    rejected_endpoint = Some(format!("{}: {}", raw, err));
                    None
                }
            },
        };

        let mut headers = HashMap::new();
        if let Some(key) = config
            .otlp_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
        {
            headers.insert(config.api_key_header.to_ascii_lowercase(), key.to_string());
        }

        Self {
            console: true,
            otlp_endpoint,
            headers,
            rejected_endpoint,
        }
    }

    pub fn traces_endpoint(&self) -> Option<String> {
        self.signal_endpoint(TRACES_PATH)
    }

    pub fn metrics_endpoint(&self) -> Option<String> {
        self.signal_endpoint(METRICS_PATH)
    }

    pub fn has_api_key(&self) -> bool {
        !self.headers.is_empty()
    }

    fn signal_endpoint(&self, path: &str) -> Option<String> {
        self.otlp_endpoint
            .as_ref()
            .map(|base| format!("{}/{}", base.as_str().trim_end_matches('/'), path))
    }
}

impl fmt::Debug for ExporterPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.keys().map(String::as_str).collect();
        f.debug_struct("ExporterPlan")
            .field("console", &self.console)
            .field("otlp_endpoint", &self.otlp_endpoint.as_ref().map(Url::as_str))
            .field("headers", &header_names)
            .field("rejected_endpoint", &self.rejected_endpoint)
            .finish()
    }
}
