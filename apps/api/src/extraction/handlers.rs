//! Axum route handlers for the Parse API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, Span};
use uuid::Uuid;

use crate::document::UploadedDocument;
use crate::errors::AppError;
use crate::extraction::parse_resume;
use crate::extraction::vocabulary::{format_skills, highlighted_skills};
use crate::models::candidate::CandidateRecord;
use crate::state::AppState;

const DOWNLOAD_FILENAME: &str = "resume_data.json";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// One multipart upload: a single `file` plus optional `highlight` values
/// (repeated fields or comma-separated).
struct ParseUpload {
    document: UploadedDocument,
    highlight: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub request_id: Uuid,
    pub parsed_at: DateTime<Utc>,
    pub filename: String,
    pub name_recognizer: &'static str,
    pub candidate: CandidateRecord,
    pub highlighted_skills: Vec<String>,
    pub skills_display: String,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
    pub default_highlight: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/parse
///
/// Loads the uploaded PDF/DOCX, extracts candidate fields, and returns them
/// together with the skills the client asked to highlight.
#[tracing::instrument(skip_all, fields(request_id = tracing::field::Empty))]
pub async fn handle_parse(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ParseResponse>, AppError> {
    let request_id = Uuid::new_v4();
    Span::current().record("request_id", tracing::field::display(request_id));

    let upload = read_upload(multipart).await?;
    let filename = upload.document.filename.clone();
    info!("Parsing {filename} ({})", upload.document.format.as_mime());

    let candidate = parse_resume(
        upload.document,
        state.recognizer.as_ref(),
        state.vocabulary.skills(),
    )
    .await?;

    let highlight = state.vocabulary.resolve_highlight(&upload.highlight);

    Ok(Json(ParseResponse {
        request_id,
        parsed_at: Utc::now(),
        filename,
        name_recognizer: state.recognizer.backend(),
        highlighted_skills: highlighted_skills(&candidate.skills, &highlight),
        skills_display: format_skills(&candidate.skills, &highlight),
        candidate,
    }))
}

/// POST /api/v1/resumes/parse/download
///
/// Same upload as `/parse`; responds with the bare four-key record as a
/// downloadable `resume_data.json`.
#[tracing::instrument(skip_all)]
pub async fn handle_parse_download(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload = read_upload(multipart).await?;

    let candidate = parse_resume(
        upload.document,
        state.recognizer.as_ref(),
        state.vocabulary.skills(),
    )
    .await?;

    let body = candidate
        .to_pretty_json()
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
            ),
        ],
        body,
    ))
}

/// GET /api/v1/skills
///
/// The configured vocabulary and the subset highlighted by default.
pub async fn handle_list_skills(State(state): State<AppState>) -> Json<SkillsResponse> {
    Json(SkillsResponse {
        skills: state.vocabulary.skills().to_vec(),
        default_highlight: state.vocabulary.default_highlight().to_vec(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart parsing
// ────────────────────────────────────────────────────────────────────────────

async fn read_upload(mut multipart: Multipart) -> Result<ParseUpload, AppError> {
    let mut document: Option<UploadedDocument> = None;
    let mut highlight = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "file" => {
                if document.is_some() {
                    return Err(AppError::Validation(
                        "Only one file can be parsed per request".to_string(),
                    ));
                }
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;

                // Format is decided here, before any extraction runs. Empty
                // bytes are left to the loader, which reports them as corrupt.
                document = Some(UploadedDocument::from_upload(
                    &filename,
                    content_type.as_deref(),
                    data,
                )?);
            }
            "highlight" => {
                let value = field.text().await.map_err(multipart_error)?;
                highlight.extend(
                    value
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty()),
                );
            }
            _ => {
                // Drain unknown fields so the stream can advance.
                field.bytes().await.map_err(multipart_error)?;
            }
        }
    }

    let document = document.ok_or_else(|| {
        AppError::Validation("No file uploaded (expected multipart field 'file')".to_string())
    })?;

    Ok(ParseUpload {
        document,
        highlight,
    })
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Failed to read multipart upload: {}", e.body_text()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
