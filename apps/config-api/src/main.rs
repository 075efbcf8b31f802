//! Dashboard configuration version service.
//!
//! Serves version history, restore and undo for dashboard configurations
//! over HTTP, backed by PostgreSQL.

mod config;
mod health;
mod logging;
mod middleware;

use std::net::SocketAddr;

use axum::{http::HeaderName, routing::get, Router};
use config::Config;
use dashcfg_api_versions::versions_router;
use dashcfg_db::{run_migrations, DbPool};
use health::health_handler;
use middleware::{caller_identity_middleware, CallerHeader};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        host = %config.host,
        port = config.port,
        retention_count = config.retention_count,
        history_page_size = config.history_page_size,
        "Starting config-api"
    );

    let pool = match DbPool::connect_with(&config.database_url, config.db_max_connections).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if config.run_migrations {
        if let Err(e) = run_migrations(&pool).await {
            tracing::error!("Failed to run migrations: {e}");
            std::process::exit(1);
        }
    }

    let caller_header = match HeaderName::from_bytes(config.caller_header.as_bytes()) {
        Ok(name) => CallerHeader(name),
        Err(e) => {
            tracing::error!("Invalid caller header '{}': {e}", config.caller_header);
            std::process::exit(1);
        }
    };

    let pool = pool.into_inner();

    let versions = versions_router(pool.clone(), config.versions_settings()).layer(
        axum::middleware::from_fn_with_state(caller_header, caller_identity_middleware),
    );

    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(pool)
        .merge(versions);

    #[cfg(feature = "openapi")]
    let app = app.route("/api-docs/openapi.json", get(openapi_handler));

    let app = app.layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

#[cfg(feature = "openapi")]
async fn openapi_handler() -> axum::Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    axum::Json(dashcfg_api_versions::VersionsApiDoc::openapi())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
