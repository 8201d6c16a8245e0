//! Project CRUD, detail-with-similar, and artifact upload endpoints.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use symposium_core::import::{validate_row, NewProject, ProjectRow};
use symposium_core::similar::find_similar;

use crate::auth::AdminUser;
use crate::error::AppError;
use crate::models::Project;
use crate::state::AppState;
use crate::storage::{ArtifactStore, Bucket};

/// How many similar projects the detail view shows.
const SIMILAR_LIMIT: usize = 3;

/// Creates the projects router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/{id}/files", post(upload_project_files))
}

/// Response for the project listing.
#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub total: usize,
    pub projects: Vec<Project>,
}

/// Response for the project detail view.
#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: Project,
    pub posters_url: Option<String>,
    pub slide_decks_url: Option<String>,
    /// Up to three other projects sharing at least one tag.
    pub similar: Vec<Project>,
}

/// GET /api/v1/projects - all projects, newest first.
async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<ProjectListResponse>, AppError> {
    let projects: Vec<Project> =
        sqlx::query_as("SELECT * FROM projects ORDER BY created_at DESC, id")
            .fetch_all(&state.pool)
            .await?;
    Ok(Json(ProjectListResponse {
        total: projects.len(),
        projects,
    }))
}

/// GET /api/v1/projects/{id} - one project plus tag-similar projects.
async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectDetailResponse>, AppError> {
    let project = fetch_project(&state.pool, id).await?;

    // Candidates in insertion order; the target is excluded by identity in
    // the query, and similarity keeps this enumeration order.
    let others: Vec<Project> =
        sqlx::query_as("SELECT * FROM projects WHERE id != $1 ORDER BY created_at ASC, id")
            .bind(id)
            .fetch_all(&state.pool)
            .await?;
    let similar = find_similar(
        project.tags.as_deref(),
        &others,
        |p| p.tags.as_deref(),
        SIMILAR_LIMIT,
    )
    .into_iter()
    .cloned()
    .collect();

    Ok(Json(ProjectDetailResponse {
        posters_url: project.posters_url(),
        slide_decks_url: project.slide_decks_url(),
        project,
        similar,
    }))
}

/// POST /api/v1/projects - create a project from form fields.
async fn create_project(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(row): Json<ProjectRow>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let new_project = validate_row(0, &row).map_err(|e| AppError::Validation(e.reason))?;
    let project = insert_project(&state.pool, &new_project).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/v1/projects/{id} - full update of a project's text fields.
async fn update_project(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(row): Json<ProjectRow>,
) -> Result<Json<Project>, AppError> {
    let fields = validate_row(0, &row).map_err(|e| AppError::Validation(e.reason))?;

    let updated: Option<Project> = sqlx::query_as(
        r#"
        UPDATE projects
        SET group_name = $2,
            member1_name = $3,
            member2_name = $4,
            paper1_title = $5,
            paper2_title = $6,
            member1_paper = $7,
            member2_paper = $8,
            presentation_video_url = $9,
            tags = $10,
            updated_at = $11
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&fields.group_name)
    .bind(&fields.member1_name)
    .bind(&fields.member2_name)
    .bind(&fields.paper1_title)
    .bind(&fields.paper2_title)
    .bind(&fields.member1_paper)
    .bind(&fields.member2_paper)
    .bind(&fields.presentation_video_url)
    .bind(&fields.tags)
    .bind(Utc::now())
    .fetch_optional(&state.pool)
    .await?;

    updated.ok_or_else(|| AppError::NotFound(format!("project {id} not found")))
        .map(Json)
}

/// DELETE /api/v1/projects/{id} - remove a project and its linked artifacts.
async fn delete_project(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let project = fetch_project(&state.pool, id).await?;

    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    // Cascade: the record delete wins even when file removal fails, so
    // artifact cleanup is best-effort and only logged.
    remove_artifact(&state.store, Bucket::Posters, &project.combined_posters_filename).await;
    remove_artifact(
        &state.store,
        Bucket::Presentations,
        &project.combined_slide_decks_filename,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{id}/files - multipart upload of the combined
/// posters and/or slide decks PDFs.
///
/// Accepted field names: `combined_posters`, `combined_slide_decks`. Files
/// are written to storage before any reference is persisted; a storage
/// failure aborts the request with the project record untouched.
async fn upload_project_files(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Project>, AppError> {
    let project = fetch_project(&state.pool, id).await?;

    let mut new_posters: Option<String> = None;
    let mut new_slide_decks: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let bucket = match field.name() {
            Some("combined_posters") => Bucket::Posters,
            Some("combined_slide_decks") => Bucket::Presentations,
            _ => continue,
        };
        let original = field.file_name().unwrap_or("").to_string();
        if original.is_empty() {
            continue;
        }
        if !original.to_lowercase().ends_with(".pdf") {
            return Err(AppError::Validation(format!("'{original}' is not a PDF")));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let stored = state.store.store(bucket, &original, &bytes).await?;
        match bucket {
            Bucket::Posters => new_posters = Some(stored),
            _ => new_slide_decks = Some(stored),
        }
    }

    if new_posters.is_none() && new_slide_decks.is_none() {
        return Err(AppError::Validation(
            "no combined_posters or combined_slide_decks PDF supplied".to_string(),
        ));
    }

    let updated: Project = sqlx::query_as(
        r#"
        UPDATE projects
        SET combined_posters_filename = COALESCE($2, combined_posters_filename),
            combined_slide_decks_filename = COALESCE($3, combined_slide_decks_filename),
            updated_at = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&new_posters)
    .bind(&new_slide_decks)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await?;

    // Replaced files are no longer referenced; drop them.
    if new_posters.is_some() {
        remove_artifact(&state.store, Bucket::Posters, &project.combined_posters_filename).await;
    }
    if new_slide_decks.is_some() {
        remove_artifact(
            &state.store,
            Bucket::Presentations,
            &project.combined_slide_decks_filename,
        )
        .await;
    }

    Ok(Json(updated))
}

/// Looks a project up by id, or reports not-found.
async fn fetch_project(pool: &PgPool, id: Uuid) -> Result<Project, AppError> {
    let project: Option<Project> = sqlx::query_as("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    project.ok_or_else(|| AppError::NotFound(format!("project {id} not found")))
}

/// Inserts a validated project with server-assigned id and timestamps.
pub(crate) async fn insert_project(
    pool: &PgPool,
    fields: &NewProject,
) -> Result<Project, AppError> {
    let now = Utc::now();
    let project = sqlx::query_as(
        r#"
        INSERT INTO projects (
            id, group_name, member1_name, member2_name,
            paper1_title, paper2_title, member1_paper, member2_paper,
            presentation_video_url, tags, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&fields.group_name)
    .bind(&fields.member1_name)
    .bind(&fields.member2_name)
    .bind(&fields.paper1_title)
    .bind(&fields.paper2_title)
    .bind(&fields.member1_paper)
    .bind(&fields.member2_paper)
    .bind(&fields.presentation_video_url)
    .bind(&fields.tags)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(project)
}

/// Best-effort artifact removal; failures are logged, never surfaced.
async fn remove_artifact(store: &ArtifactStore, bucket: Bucket, stored_name: &Option<String>) {
    if let Some(name) = stored_name {
        if let Err(e) = store.delete(bucket, name).await {
            tracing::warn!(bucket = bucket.dir_name(), name = %name, "failed to remove artifact: {e}");
        }
    }
}
