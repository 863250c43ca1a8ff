use axum::{http::StatusCode, response::Response};
use tracing::debug;

/// Liveness probe handler at /health - indicates if the application is running
///
/// The service has no external dependencies to probe, so liveness is the
/// only health signal.
pub async fn liveness_handler() -> Response<String> {
    debug!("Liveness check requested");

    let mut response = Response::new("OK".to_string());
    *response.status_mut() = StatusCode::OK;
    response
}
