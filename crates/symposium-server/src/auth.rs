//! Authentication: Argon2id password hashing and bearer-session extractors.
//!
//! Sessions are opaque server-side tokens in the `sessions` table; a request
//! authenticates by presenting `Authorization: Bearer <token>`. Admin routes
//! take [`AdminUser`], which refuses non-admin accounts before the handler
//! body runs, so a denied request has no side effects.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Account, Session};
use crate::state::AppState;

/// How long a session stays valid.
const SESSION_TTL_DAYS: i64 = 7;

/// Hash a plaintext password using Argon2id with a random salt.
///
/// Returns the PHC-formatted hash string (includes algorithm, params, salt,
/// and hash).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted hash.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` if it does not.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Creates a new session for an account and returns it.
pub async fn create_session(pool: &PgPool, account_id: Uuid) -> Result<Session, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as(
        r#"
        INSERT INTO sessions (token, account_id, created_at, expires_at)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(account_id)
    .bind(now)
    .bind(now + Duration::days(SESSION_TTL_DAYS))
    .fetch_one(pool)
    .await
}

/// Deletes a session by token. Deleting a missing token is not an error.
pub async fn delete_session(pool: &PgPool, token: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Ensures the configured admin account exists, creating it when missing.
/// Returns true when an account was created.
pub async fn ensure_admin_account(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> anyhow::Result<bool> {
    let existing: Option<Account> = sqlx::query_as("SELECT * FROM accounts WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;
    sqlx::query(
        r#"
        INSERT INTO accounts (id, username, password_hash, is_admin, created_at)
        VALUES ($1, $2, $3, TRUE, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(true)
}

/// The authenticated account behind the request's bearer token.
#[derive(Debug, Clone)]
pub struct AuthAccount {
    pub account: Account,
    /// The presented session token, kept so logout can revoke it.
    pub token: Uuid,
}

impl FromRequestParts<AppState> for AuthAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let account: Option<Account> = sqlx::query_as(
            r#"
            SELECT a.*
            FROM accounts a
            JOIN sessions s ON s.account_id = a.id
            WHERE s.token = $1 AND s.expires_at > now()
            "#,
        )
        .bind(token)
        .fetch_optional(&state.pool)
        .await?;

        match account {
            Some(account) => Ok(AuthAccount { account, token }),
            None => Err(AppError::Unauthorized(
                "invalid or expired session".to_string(),
            )),
        }
    }
}

/// An authenticated account with the administrator flag set.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthAccount);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthAccount::from_request_parts(parts, state).await?;
        if !auth.account.is_admin {
            return Err(AppError::AccessDenied(
                "admin privileges required".to_string(),
            ));
        }
        Ok(AdminUser(auth))
    }
}

/// Pulls the UUID token out of an `Authorization: Bearer` header.
fn bearer_token(parts: &Parts) -> Result<Uuid, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_string()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_string()))?;
    token
        .parse()
        .map_err(|_| AppError::Unauthorized("malformed session token".to_string()))
}
