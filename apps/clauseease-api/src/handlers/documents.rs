//! Document upload, history, reports and deletion

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    Json,
};
use chrono::Utc;
use clause_ingest::{detect_format, extract_text};
use clause_types::{DocumentReport, DocumentSummary, SimplificationLevel};

use crate::auth::AuthUser;
use crate::db::{self, NewDocument};
use crate::error::ApiError;
use crate::state::AppState;

/// Upload a contract and analyse it
///
/// Multipart fields: `file` (required, `.pdf`, `.docx` or `.txt`) and
/// `level` (optional, `basic` by default). The extension is checked before
/// the file body is read.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentReport>), ApiError> {
    let mut upload = None;
    let mut level = SimplificationLevel::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(base_name)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| ApiError::InvalidRequest("No file selected".to_string()))?;
                let format = detect_format(&filename)?;
                let data: Bytes = field.bytes().await.map_err(invalid_multipart)?;
                upload = Some((filename, format, data));
            }
            "level" => {
                let value = field.text().await.map_err(invalid_multipart)?;
                if !value.trim().is_empty() {
                    level = value
                        .parse()
                        .map_err(|e: clause_types::ParseLevelError| {
                            ApiError::InvalidRequest(e.to_string())
                        })?;
                }
            }
            _ => {}
        }
    }

    let (filename, format, data) =
        upload.ok_or_else(|| ApiError::InvalidRequest("No file part in request".to_string()))?;
    tracing::info!(user_id = user.id, %filename, %format, %level, bytes = data.len(), "Analysing upload");

    let pipeline = state.pipeline.clone();
    let (raw_text, analysis) = tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        let extracted = extract_text(format, &data)?;
        let analysis = pipeline.run(&extracted.text, level)?;
        Ok((extracted.text, analysis))
    })
    .await
    .map_err(|e| ApiError::Internal(e.into()))??;

    let created_at = db::timestamp(Utc::now());
    let document_id = db::insert_document(
        &state.db,
        &NewDocument {
            user_id: user.id,
            filename: &filename,
            format,
            level,
            raw_text: &raw_text,
            created_at: &created_at,
        },
        &analysis,
    )
    .await?;

    let report = db::load_report(&state.db, user.id, document_id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("document {} vanished", document_id)))?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// The caller's documents, newest first
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<DocumentSummary>>, ApiError> {
    Ok(Json(db::list_documents(&state.db, user.id).await?))
}

pub async fn get_document(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<DocumentReport>, ApiError> {
    Ok(Json(find_report(&state, &user, id).await?))
}

/// Download the report as a JSON attachment
pub async fn download_report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, [(String, String); 2], Vec<u8>), ApiError> {
    let report = find_report(&state, &user, id).await?;
    let body = serde_json::to_vec_pretty(&report).map_err(|e| ApiError::Internal(e.into()))?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE.as_str().to_string(),
                "application/json".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION.as_str().to_string(),
                format!(
                    "attachment; filename=\"{}\"",
                    report_filename(&report.filename)
                ),
            ),
        ],
        body,
    ))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !db::delete_document(&state.db, user.id, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = user.id, document_id = id, "Deleted document");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_report(state: &AppState, user: &AuthUser, id: i64) -> Result<DocumentReport, ApiError> {
    db::load_report(&state.db, user.id, id)
        .await?
        .ok_or_else(|| not_found(id))
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Document not found: {}", id))
}

fn invalid_multipart(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::InvalidRequest(format!("Invalid multipart body: {}", e))
}

/// Last path component of a client-supplied filename
fn base_name(name: &str) -> String {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    name.trim().to_string()
}

/// `<stem>-report.json`, with anything outside `[A-Za-z0-9._-]` replaced
pub fn report_filename(filename: &str) -> String {
    let stem = FsPath::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "document-report.json".to_string()
    } else {
        format!("{}-report.json", stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_filename() {
        assert_eq!(report_filename("lease.pdf"), "lease-report.json");
        assert_eq!(report_filename("Master Services.v2.docx"), "Master_Services.v2-report.json");
        assert_eq!(report_filename("\"quoted\".txt"), "_quoted_-report.json");
        assert_eq!(report_filename(".txt"), ".txt-report.json");
        assert_eq!(report_filename(""), "document-report.json");
    }

    #[test]
    fn test_base_name_strips_client_paths() {
        assert_eq!(base_name("C:\\Users\\ann\\nda.docx"), "nda.docx");
        assert_eq!(base_name("../../etc/terms.txt"), "terms.txt");
        assert_eq!(base_name("plain.pdf"), "plain.pdf");
    }
}
