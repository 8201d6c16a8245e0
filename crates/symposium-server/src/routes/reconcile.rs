//! Submission intake and file-to-project reconciliation endpoints.
//!
//! Loose files are first uploaded into the submission-intake bucket; a
//! reconcile run then classifies them, matches them to projects, moves the
//! matched files into the posters/presentations buckets, and persists every
//! artifact reference update in a single transaction. `dry_run=true`
//! returns the plan without touching storage or the database.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use symposium_core::reconcile::{GroupReport, ProjectRef};

use crate::auth::AdminUser;
use crate::error::AppError;
use crate::models::Project;
use crate::state::AppState;
use crate::storage::Bucket;

/// Query parameters for the reconcile endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileParams {
    #[serde(default)]
    pub dry_run: bool,
}

/// Response for an intake upload.
#[derive(Debug, Serialize)]
pub struct IntakeResponse {
    pub stored_filename: String,
}

/// Response for a reconcile run.
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    /// Number of candidate labels that resolved to a project.
    pub matched: usize,
    /// False for dry runs.
    pub committed: bool,
    pub groups: Vec<GroupReport>,
    pub unmatched_files: Vec<String>,
    pub unmatched_groups: Vec<String>,
}

/// Creates the reconcile router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/intake/{filename}", put(upload_intake))
        .route("/reconcile", post(run_reconcile))
}

/// PUT /api/v1/intake/{filename} - raw-body upload into the
/// submission-intake bucket. Returns the generated stored name.
async fn upload_intake(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(filename): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<IntakeResponse>), AppError> {
    if body.is_empty() {
        return Err(AppError::Validation("empty file body".to_string()));
    }
    let stored_filename = state
        .store
        .store(Bucket::SubmissionIntake, &filename, &body)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(IntakeResponse { stored_filename }),
    ))
}

/// POST /api/v1/reconcile - match intake files against projects.
async fn run_reconcile(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<ReconcileParams>,
) -> Result<Json<ReconcileResponse>, AppError> {
    // Intake names are "{uuid}_{original}"; classification and matching run
    // over the original part, so person-name heuristics still see the
    // uploader's filename.
    let stored_names = state.store.list(Bucket::SubmissionIntake).await?;
    let originals: Vec<String> = stored_names
        .iter()
        .map(|stored| original_name(stored).to_string())
        .collect();
    let mut stored_for: HashMap<&str, &str> = HashMap::new();
    for stored in &stored_names {
        stored_for.entry(original_name(stored)).or_insert(stored);
    }

    let refs: Vec<ProjectRef> =
        sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at ASC, id")
            .fetch_all(&state.pool)
            .await?
            .iter()
            .map(Project::as_match_ref)
            .collect();

    let plan = symposium_core::plan(&originals, &refs, &state.roster);

    if params.dry_run {
        return Ok(Json(response(&plan, false)));
    }

    // Move matched files into their kind buckets, then persist every
    // reference update in one transaction: all matches commit together.
    let now = Utc::now();
    let mut tx = state.pool.begin().await?;
    for (project_id, assignment) in &plan.assignments {
        let poster = resolve_and_promote(
            &state,
            &stored_for,
            assignment.poster.as_deref(),
            Bucket::Posters,
        )
        .await?;
        let presentation = resolve_and_promote(
            &state,
            &stored_for,
            assignment.presentation.as_deref(),
            Bucket::Presentations,
        )
        .await?;

        sqlx::query(
            r#"
            UPDATE projects
            SET combined_posters_filename = COALESCE($2, combined_posters_filename),
                combined_slide_decks_filename = COALESCE($3, combined_slide_decks_filename),
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(project_id)
        .bind(&poster)
        .bind(&presentation)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!(
        matched = plan.matched(),
        unmatched_files = plan.unmatched_files.len(),
        "reconcile run committed"
    );
    Ok(Json(response(&plan, true)))
}

/// Moves one assigned intake file into its kind bucket and returns its
/// stored name.
async fn resolve_and_promote(
    state: &AppState,
    stored_for: &HashMap<&str, &str>,
    original: Option<&str>,
    bucket: Bucket,
) -> Result<Option<String>, AppError> {
    let Some(original) = original else {
        return Ok(None);
    };
    let stored = stored_for.get(original).ok_or_else(|| {
        AppError::Internal(format!("planned file '{original}' missing from intake"))
    })?;
    state
        .store
        .promote(Bucket::SubmissionIntake, bucket, stored)
        .await?;
    Ok(Some((*stored).to_string()))
}

fn response(plan: &symposium_core::ReconcilePlan, committed: bool) -> ReconcileResponse {
    ReconcileResponse {
        matched: plan.matched(),
        committed,
        groups: plan.groups.clone(),
        unmatched_files: plan.unmatched_files.clone(),
        unmatched_groups: plan.unmatched_groups.clone(),
    }
}

/// Strips the generated UUID prefix off an intake stored name.
fn original_name(stored: &str) -> &str {
    stored.split_once('_').map_or(stored, |(_, rest)| rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_original_name_strips_uuid_prefix() {
        assert_eq!(
            original_name("550e8400-e29b-41d4-a716-446655440000_alice_poster_ChCG.pdf"),
            "alice_poster_ChCG.pdf"
        );
        assert_eq!(original_name("plain.pdf"), "plain.pdf");
    }
}
