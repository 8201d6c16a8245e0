// API client - thin ureq wrapper over the gallery server's JSON API

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use symposium_core::import::ProjectRow;

/// Response from POST /api/v1/auth/login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub account: AccountInfo,
}

#[derive(Debug, Deserialize)]
pub struct AccountInfo {
    pub username: String,
    pub is_admin: bool,
}

/// Response from the import endpoints.
#[derive(Debug, Deserialize)]
pub struct ImportReport {
    pub created: usize,
    pub errors: Vec<RowErrorInfo>,
}

#[derive(Debug, Deserialize)]
pub struct RowErrorInfo {
    pub index: usize,
    pub reason: String,
}

/// Response from PUT /api/v1/intake/{filename}.
#[derive(Debug, Deserialize)]
pub struct IntakeResponse {
    pub stored_filename: String,
}

/// Response from POST /api/v1/reconcile.
#[derive(Debug, Deserialize)]
pub struct ReconcileReport {
    pub matched: usize,
    pub committed: bool,
    pub groups: Vec<GroupOutcome>,
    pub unmatched_files: Vec<String>,
    pub unmatched_groups: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroupOutcome {
    pub label: String,
    pub project_id: Option<String>,
    pub files_assigned: usize,
}

/// Client for the gallery server API.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
        }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let response = ureq::post(&format!("{}/api/v1/auth/login", self.base_url)).send_json(
            serde_json::json!({ "username": username, "password": password }),
        );
        parse_response(response)
    }

    pub fn import_rows(&self, rows: &[ProjectRow]) -> Result<ImportReport> {
        let response = self
            .authorized(ureq::post(&format!(
                "{}/api/v1/import/rows",
                self.base_url
            )))?
            .send_json(serde_json::to_value(rows).context("failed to encode rows")?);
        parse_response(response)
    }

    pub fn upload_intake(&self, filename: &str, bytes: &[u8]) -> Result<IntakeResponse> {
        let response = self
            .authorized(ureq::put(&format!(
                "{}/api/v1/intake/{filename}",
                self.base_url
            )))?
            .set("Content-Type", "application/octet-stream")
            .send_bytes(bytes);
        parse_response(response)
    }

    pub fn reconcile(&self, dry_run: bool) -> Result<ReconcileReport> {
        let mut request = self.authorized(ureq::post(&format!(
            "{}/api/v1/reconcile",
            self.base_url
        )))?;
        if dry_run {
            request = request.query("dry_run", "true");
        }
        parse_response(request.call())
    }

    /// Attaches the bearer token, failing early when none is configured.
    fn authorized(&self, request: ureq::Request) -> Result<ureq::Request> {
        let token = self
            .token
            .as_deref()
            .context("no admin token; run `symposium login` or set SYMPOSIUM_TOKEN")?;
        Ok(request.set("Authorization", &format!("Bearer {token}")))
    }
}

/// Maps a ureq result into a typed response or a readable error.
fn parse_response<T: DeserializeOwned>(
    result: std::result::Result<ureq::Response, ureq::Error>,
) -> Result<T> {
    match result {
        Ok(response) => response
            .into_json()
            .context("server returned invalid JSON"),
        Err(ureq::Error::Status(code, response)) => {
            let body = response.into_string().unwrap_or_default();
            anyhow::bail!("server returned {code}: {body}")
        }
        Err(e) => Err(e).context("request failed"),
    }
}
