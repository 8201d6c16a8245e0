//! Service health endpoint.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::db;
use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
}

/// GET /api/v1/health - returns service and database health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = db::health_check(&state.pool).await.is_ok();
    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// Creates the health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
