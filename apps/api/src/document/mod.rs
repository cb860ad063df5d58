//! Document Loader — turns an uploaded PDF or DOCX into plain text.
//!
//! The format tag is chosen once at the upload boundary; `load` then matches on
//! it exhaustively. Both branches are CPU-bound and synchronous, so callers on
//! the async runtime should wrap `load` in `tokio::task::spawn_blocking`.

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

pub mod docx;
pub mod pdf;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("corrupt document: {0}")]
    CorruptDocument(String),
}

/// Container formats the loader can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        // Ignore parameters such as "; charset=binary"
        let essence = mime.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case(PDF_MIME) {
            Some(Self::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MIME) {
            Some(Self::Docx)
        } else {
            None
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
        }
    }
}

/// One uploaded file, owned by the request that carried it.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub format: DocumentFormat,
    pub bytes: Bytes,
}

impl UploadedDocument {
    /// Selects the format from the filename extension, falling back to the
    /// declared MIME type only when the filename carries no extension.
    pub fn from_upload(
        filename: &str,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> Result<Self, LoadError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str());

        let format = match extension {
            Some(ext) => DocumentFormat::from_extension(ext)
                .ok_or_else(|| LoadError::UnsupportedFormat(format!(".{ext}")))?,
            None => content_type
                .and_then(DocumentFormat::from_mime)
                .ok_or_else(|| {
                    LoadError::UnsupportedFormat(
                        content_type.unwrap_or("unknown content type").to_string(),
                    )
                })?,
        };

        Ok(Self {
            filename: filename.to_string(),
            format,
            bytes,
        })
    }
}

/// Extracts the plain text of a document.
pub fn load(document: &UploadedDocument) -> Result<String, LoadError> {
    debug!(
        "Loading {} ({}, {} bytes)",
        document.filename,
        document.format.as_mime(),
        document.bytes.len()
    );

    match document.format {
        DocumentFormat::Pdf => pdf::extract_text(&document.bytes),
        DocumentFormat::Docx => docx::extract_text(&document.bytes),
    }
}
