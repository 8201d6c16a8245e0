//! Server configuration loaded from the environment.

use std::path::PathBuf;

use anyhow::Context;

/// Default maximum request body size (16 MB), matching the largest combined
/// PDF the gallery accepts.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Runtime configuration. Built once in `main` and handed to whatever needs
/// it; nothing reads the environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP listener to.
    pub bind_addr: String,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Root directory for artifact buckets.
    pub upload_root: PathBuf,
    /// Optional path to a roster JSON file; the built-in table is used
    /// when unset.
    pub roster_path: Option<PathBuf>,
    /// Username of the bootstrap admin account.
    pub admin_username: String,
    /// Password of the bootstrap admin account.
    pub admin_password: String,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
}

impl Config {
    /// Reads configuration from environment variables. `DATABASE_URL` is
    /// required; everything else has a development default.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let max_upload_bytes = match std::env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            database_url,
            upload_root: std::env::var("UPLOAD_ROOT")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            roster_path: std::env::var("ROSTER_PATH").ok().map(PathBuf::from),
            admin_username: std::env::var("ADMIN_USERNAME")
                .unwrap_or_else(|_| "bob".to_string()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| "bobpass".to_string()),
            max_upload_bytes,
        })
    }
}
