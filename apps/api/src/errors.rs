use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::LoadError;
use crate::extraction::ParseError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only document-level failures surface here. A field that could not be found
/// is a normal `"Not found"` value in the response, never an error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt document: {0}")]
    CorruptDocument(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::UnsupportedFormat(msg) => AppError::UnsupportedFormat(msg),
            LoadError::CorruptDocument(msg) => AppError::CorruptDocument(msg),
        }
    }
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Load(e) => e.into(),
            ParseError::Join(e) => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::UnsupportedFormat(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                format!("Only PDF and DOCX files are supported (got {msg})"),
            ),
            AppError::CorruptDocument(msg) => {
                tracing::warn!("Corrupt document: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "CORRUPT_DOCUMENT",
                    msg.clone(),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_errors_map_to_matching_variants() {
        let err: AppError = LoadError::UnsupportedFormat(".txt".to_string()).into();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));

        let err: AppError = LoadError::CorruptDocument("bad zip".to_string()).into();
        assert!(matches!(err, AppError::CorruptDocument(ref m) if m == "bad zip"));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::UnsupportedFormat(".txt".into()), StatusCode::UNSUPPORTED_MEDIA_TYPE),
            (AppError::CorruptDocument("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::PayloadTooLarge("x".into()), StatusCode::PAYLOAD_TOO_LARGE),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
