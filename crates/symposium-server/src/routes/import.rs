//! Bulk import endpoints: CSV upload and JSON row batches.
//!
//! Contract: all valid rows in a batch commit together in one transaction;
//! invalid rows are reported individually and never abort the batch. A
//! source that cannot be parsed at all fails the whole request.

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use symposium_core::import::{validate_row, validate_rows, NewProject, ProjectRow, RowError};

use crate::auth::AdminUser;
use crate::error::AppError;
use crate::state::AppState;

/// Multipart field the CSV upload is expected under.
const CSV_FIELD: &str = "csv_file";

/// Outcome of an import batch.
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub errors: Vec<RowError>,
}

/// Creates the import router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/csv", post(import_csv))
        .route("/rows", post(import_rows))
}

/// POST /api/v1/import/rows - import a JSON array of rows.
async fn import_rows(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(rows): Json<Vec<ProjectRow>>,
) -> Result<Json<ImportReport>, AppError> {
    let (valid, errors) = validate_rows(&rows);
    let created = insert_batch(&state.pool, &valid).await?;
    Ok(Json(ImportReport { created, errors }))
}

/// POST /api/v1/import/csv - import a multipart-uploaded CSV file.
async fn import_csv(
    State(state): State<AppState>,
    _admin: AdminUser,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>, AppError> {
    let mut payload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some(CSV_FIELD) || (payload.is_none() && field.file_name().is_some()) {
            let filename = field.file_name().unwrap_or("").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            payload = Some((filename, bytes));
        }
    }

    let (filename, bytes) =
        payload.ok_or_else(|| AppError::Validation("no file selected".to_string()))?;
    if !filename.to_lowercase().ends_with(".csv") {
        return Err(AppError::Validation(
            "please upload a valid CSV file".to_string(),
        ));
    }

    let (valid, errors) = parse_csv(&bytes)?;
    let created = insert_batch(&state.pool, &valid).await?;
    Ok(Json(ImportReport { created, errors }))
}

/// Parses CSV bytes into validated rows plus per-row errors.
fn parse_csv(bytes: &[u8]) -> Result<(Vec<NewProject>, Vec<RowError>), AppError> {
    let mut reader = csv::Reader::from_reader(bytes);
    reader
        .headers()
        .map_err(|e| AppError::Import(format!("unreadable CSV header: {e}")))?;

    let mut valid = Vec::new();
    let mut errors = Vec::new();
    for (index, record) in reader.deserialize::<ProjectRow>().enumerate() {
        match record {
            Ok(row) => match validate_row(index, &row) {
                Ok(project) => valid.push(project),
                Err(error) => errors.push(error),
            },
            Err(e) => errors.push(RowError {
                index,
                reason: format!("unreadable row: {e}"),
            }),
        }
    }
    Ok((valid, errors))
}

/// Inserts every valid row in one transaction: all committed, or none.
async fn insert_batch(pool: &PgPool, projects: &[NewProject]) -> Result<usize, AppError> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();
    for fields in projects {
        sqlx::query(
            r#"
            INSERT INTO projects (
                id, group_name, member1_name, member2_name,
                paper1_title, paper2_title, member1_paper, member2_paper,
                presentation_video_url, tags, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
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
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(projects.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_collects_row_errors() {
        let csv = "\
group_name,member1_name,member2_name,paper1_title,paper2_title,tags
Team Alpha,John Doe,Jane Smith,Paper One,Paper Two,\"mobile, ui design\"
,Alice,Bob,Paper Three,Paper Four,
";
        let (valid, errors) = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].group_name, "Team Alpha");
        // Member papers default to the general paper titles.
        assert_eq!(valid[0].member1_paper, "Paper One");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].index, 1);
        assert!(errors[0].reason.contains("group_name"));
    }

    #[test]
    fn test_parse_csv_tolerates_missing_optional_columns() {
        let csv = "\
group_name,member1_name,member2_name,paper1_title,paper2_title
Team Beta,Alice Johnson,Bob Wilson,Paper A,Paper B
";
        let (valid, errors) = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(valid.len(), 1);
        assert!(errors.is_empty());
        assert_eq!(valid[0].tags, None);
        assert_eq!(valid[0].presentation_video_url, None);
    }

    #[test]
    fn test_parse_csv_reports_short_rows() {
        let csv = "\
group_name,member1_name,member2_name,paper1_title,paper2_title
Team Gamma,Carol
";
        let (valid, errors) = parse_csv(csv.as_bytes()).unwrap();
        assert!(valid.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].index, 0);
    }
}
