pub mod config;
pub mod error;
pub mod forecast;
pub mod health;
pub mod middleware;
pub mod movies;
pub mod observability;
pub mod server;

pub use config::*;
pub use error::*;
pub use server::*;

use anyhow::Result;
use observability::Telemetry;

/// Run the service on an already-initialized telemetry handle.
///
/// Serves until a shutdown signal arrives, then flushes telemetry.
pub async fn run_server(config: AppConfig, telemetry: Telemetry) -> Result<()> {
    ::tracing::info!(
        environment = config.environment.as_str(),
        "Movies API starting up"
    );

    let result = server::start_server(&config, &telemetry).await;
    if let Err(e) = &result {
        ::tracing::error!(error = %e, "Server stopped with an error");
    }

    telemetry.shutdown().await;
    result
}
