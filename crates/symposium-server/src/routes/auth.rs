//! Login, logout and current-account endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{create_session, delete_session, verify_password, AuthAccount};
use crate::error::AppError;
use crate::models::account::{Account, AccountInfo};
use crate::state::AppState;

/// Request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
    pub account: AccountInfo,
}

/// Creates the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// POST /api/v1/auth/login - authenticate with username + password.
///
/// Missing accounts and wrong passwords get the same response, so the
/// endpoint does not leak which usernames exist.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let invalid = || AppError::Unauthorized("invalid username or password".to_string());

    let account: Account = sqlx::query_as("SELECT * FROM accounts WHERE username = $1")
        .bind(&req.username)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&req.password, &account.password_hash)
        .map_err(|e| AppError::Internal(format!("password verification failed: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    let session = create_session(&state.pool, account.id).await?;
    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        account: AccountInfo::from(&account),
    }))
}

/// POST /api/v1/auth/logout - revoke the presented session.
async fn logout(State(state): State<AppState>, auth: AuthAccount) -> Result<StatusCode, AppError> {
    delete_session(&state.pool, auth.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me - info about the authenticated account.
async fn me(auth: AuthAccount) -> Json<AccountInfo> {
    Json(AccountInfo::from(&auth.account))
}
