//! API routes for the symposium server.

pub mod auth;
pub mod health;
pub mod import;
pub mod projects;
pub mod reconcile;

use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Creates the main router: the JSON API under `/api/v1` plus stored
/// artifacts served from disk under `/files/{bucket}/{filename}`.
pub fn create_router(state: AppState) -> Router {
    let files = ServeDir::new(state.store.root().to_path_buf());
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .nest_service("/files", files)
        .with_state(state)
}

/// Creates the v1 API routes.
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/projects", projects::router())
        .nest("/import", import::router())
        .merge(reconcile::router())
}
