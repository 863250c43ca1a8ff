use anyhow::Result;
use axum::{
    Router,
    extract::FromRef,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::forecast::weather_forecast;
use crate::health::liveness_handler;
use crate::middleware::{metrics_middleware, trace_context_middleware};
use crate::movies::{MovieCatalog, get_movie, list_movie_summaries, list_movies, search_movies};
use crate::observability::{HttpMetrics, Telemetry};

/// Shared, read-only state handed to every handler
#[derive(Clone, FromRef)]
pub struct AppState {
    pub catalog: Arc<MovieCatalog>,
    pub metrics: HttpMetrics,
}

impl AppState {
    pub fn new(catalog: MovieCatalog, telemetry: &Telemetry) -> Self {
        Self {
            catalog: Arc::new(catalog),
            metrics: telemetry.http_metrics(),
        }
    }
}

/// Start the Axum HTTP server and serve until SIGINT/SIGTERM.
///
/// In-flight requests get `server.shutdown_timeout` seconds to finish once a
/// shutdown signal arrives.
pub async fn start_server(config: &AppConfig, telemetry: &Telemetry) -> Result<()> {
    info!("Starting movies API server on {}:{}", config.server.bind, config.server.port);

    let state = AppState::new(MovieCatalog::seeded()?, telemetry);
    let app = create_router(state);

    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {}. Is another process using this port?",
            bind_addr,
            e
        )
    })?;
    info!("Server successfully bound to {}", bind_addr);

    let grace = Duration::from_secs(config.server.shutdown_timeout);
    let (signalled_tx, mut signalled_rx) = watch::channel(false);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(true);
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = async {
            if signalled_rx.wait_for(|signalled| *signalled).await.is_ok() {
                tokio::time::sleep(grace).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            warn!(
                timeout_seconds = grace.as_secs(),
                "Graceful shutdown timed out, dropping open connections"
            );
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Create the Axum router with all middleware and routes
///
/// Every route, including the 404 fallback, runs inside the request span and
/// is counted by the metrics middleware.
pub fn create_router(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/search", get(search_movies))
        .route("/movies/{id}", get(get_movie))
        .route("/weatherforecast", get(weather_forecast))
        .route("/api/movies", get(list_movie_summaries))
        .route("/health", get(liveness_handler))
        .with_state(state)
        .layer(from_fn_with_state(metrics, metrics_middleware))
        .layer(from_fn(trace_context_middleware))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
