//! Health check endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health_handler(State(pool): State<PgPool>) -> (StatusCode, Json<HealthResponse>) {
    let database_up = sqlx::query("SELECT 1").execute(&pool).await.is_ok();

    if !database_up {
        tracing::warn!("Health check failed: database unreachable");
    }

    let (status, label) = if database_up {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status,
        Json(HealthResponse {
            status: label,
            database: if database_up { "up" } else { "down" },
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
