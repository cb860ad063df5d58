use std::panic;

use lopdf::Document;
use tracing::{debug, info, warn};

use super::LoadError;

/// Extracts PDF text page by page, joined with newlines in page order.
///
/// Pages without decodable text (scanned images, exotic font encodings)
/// contribute an empty line rather than failing the document. When every page
/// comes back blank, pdf-extract gets a second attempt over the same bytes.
pub fn extract_text(data: &[u8]) -> Result<String, LoadError> {
    let doc = Document::load_mem(data)
        .map_err(|e| LoadError::CorruptDocument(format!("failed to parse PDF: {e}")))?;

    let pages = doc.get_pages();
    let page_count = pages.len();
    let mut page_texts = Vec::with_capacity(page_count);

    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => page_texts.push(text.trim_end().to_string()),
            Err(e) => {
                warn!("No text extracted from PDF page {page_number}: {e}");
                page_texts.push(String::new());
            }
        }
    }

    if page_texts.iter().all(|t| t.trim().is_empty()) {
        if let Some(text) = fallback_extract(data) {
            info!("PDF text recovered by fallback extractor ({} chars)", text.len());
            return Ok(text);
        }
        debug!("PDF has {page_count} pages but no extractable text");
    }

    Ok(page_texts.join("\n"))
}

/// Second pass with pdf-extract, which separates pages with form feeds.
/// Returns `None` when it fails, panics, or finds nothing either.
fn fallback_extract(data: &[u8]) -> Option<String> {
    let result = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data));

    let text = match result {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            debug!("pdf-extract fallback failed: {e}");
            return None;
        }
        Err(_) => {
            warn!("pdf-extract fallback panicked");
            return None;
        }
    };

    let pages: Vec<&str> = text.split('\x0c').map(|p| p.trim()).collect();
    if pages.iter().all(|p| p.is_empty()) {
        return None;
    }
    Some(pages.join("\n"))
}
