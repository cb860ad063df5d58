// Field Extractor: email, phone, name and skills from plain resume text.
// Document-level failures stop at the loader; every field here is best-effort
// and reports absence rather than an error.

pub mod fields;
pub mod handlers;
pub mod names;
pub mod prompts;
pub mod vocabulary;

use tokio::task::JoinError;
use tracing::{debug, info, warn};

pub use fields::{extract_email, extract_phone, extract_skills};
pub use names::{EntitySpan, HeuristicNameRecognizer, LlmNameRecognizer, NameEntityRecognizer};

use crate::document::{self, LoadError, UploadedDocument};
use crate::models::candidate::CandidateRecord;

/// Span text of the first person entity in document order.
///
/// A recognizer failure is logged and reported as absence.
pub async fn extract_name(text: &str, recognizer: &dyn NameEntityRecognizer) -> Option<String> {
    let spans = match recognizer.find_person_entities(text).await {
        Ok(spans) => spans,
        Err(e) => {
            warn!("Name recognizer ({}) failed: {e}", recognizer.backend());
            return None;
        }
    };

    spans
        .into_iter()
        .filter(|span| !span.text.trim().is_empty())
        .min_by_key(|span| span.start)
        .map(|span| span.text)
}

/// Runs all four field extractors over one text.
pub async fn extract_candidate<S: AsRef<str>>(
    text: &str,
    recognizer: &dyn NameEntityRecognizer,
    vocabulary: &[S],
) -> CandidateRecord {
    let record = CandidateRecord {
        name: extract_name(text, recognizer).await,
        email: extract_email(text),
        phone: extract_phone(text),
        skills: extract_skills(text, vocabulary),
    };

    debug!(
        "Extracted fields: name={} email={} phone={} skills={}",
        record.name.is_some(),
        record.email.is_some(),
        record.phone.is_some(),
        record.skills.len()
    );
    record
}

/// Loader → Extractor for one uploaded document.
///
/// Only the two document-level errors can fail the pipeline. The loader runs
/// on the blocking pool.
pub async fn parse_resume(
    document: UploadedDocument,
    recognizer: &dyn NameEntityRecognizer,
    vocabulary: &[String],
) -> Result<CandidateRecord, ParseError> {
    let filename = document.filename.clone();
    let text = tokio::task::spawn_blocking(move || document::load(&document))
        .await
        .map_err(loader_task_error)??;

    info!("Extracted {} chars of text from {filename}", text.len());

    Ok(extract_candidate(&text, recognizer, vocabulary).await)
}

/// Loader panics come from input the PDF/DOCX parsers choke on; report them
/// as a corrupt document.
fn loader_task_error(e: JoinError) -> ParseError {
    if e.is_panic() {
        warn!("Document loader panicked: {e}");
        LoadError::CorruptDocument("document could not be read".to_string()).into()
    } else {
        ParseError::Join(e)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("document loader task failed: {0}")]
    Join(#[from] JoinError),
}
