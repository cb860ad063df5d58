//! Name recognition — pluggable, trait-based person-entity recognizer.
//!
//! Default: `HeuristicNameRecognizer` (pure-Rust, deterministic, no network).
//! Optional: `LlmNameRecognizer` (Claude via `LlmClient`).
//!
//! `AppState` holds one `Arc<dyn NameEntityRecognizer>`, chosen at startup via
//! `NAME_RECOGNIZER` and shared read-only across requests.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::extraction::prompts::{NAME_EXTRACTION_PROMPT, NAME_EXTRACTION_SYSTEM};
use crate::llm_client::LlmClient;

// ────────────────────────────────────────────────────────────────────────────
// Shared types
// ────────────────────────────────────────────────────────────────────────────

/// A person-name span. `start..end` are byte offsets into the recognized text,
/// and `text` is exactly that slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl EntitySpan {
    fn from_range(source: &str, start: usize, end: usize) -> Self {
        Self {
            text: source[start..end].to_string(),
            start,
            end,
        }
    }
}

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("LLM error: {0}")]
    Llm(#[from] crate::llm_client::LlmError),
}

/// Finds person names in free text. Implement this to swap the backing model
/// without touching the extractor or the handlers.
#[async_trait]
pub trait NameEntityRecognizer: Send + Sync {
    /// Person spans in document order.
    async fn find_person_entities(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError>;

    /// Short label for logs and the health endpoint.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicNameRecognizer — default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Capitalization-based recognizer.
///
/// Algorithm:
/// 1. Find runs of capitalized tokens on a single line: Title-case words,
///    ALL-CAPS words, or single-letter initials ("J.").
/// 2. Split each run at tokens that are common resume vocabulary rather than
///    names (section headings, titles, organization suffixes, months).
/// 3. Keep pieces of 2–4 tokens that contain at least one non-initial word.
///
/// It cannot tell a person from a two-word proper noun it has never seen
/// ("Acme Robotics"); that is the accepted precision of this backend.
pub struct HeuristicNameRecognizer;

static CAPITALIZED_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:\p{Lu}\.|\p{Lu}[\p{L}'’\-]*)(?:[ \t]+(?:\p{Lu}\.|\p{Lu}[\p{L}'’\-]*))+",
    )
    .expect("capitalized run pattern is valid")
});

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^ \t]+").expect("token pattern is valid"));

const NON_NAME_WORDS: &[&str] = &[
    // document and section headings
    "resume", "résumé", "curriculum", "vitae", "cv", "summary", "profile", "objective",
    "experience", "education", "skills", "projects", "certifications", "certification",
    "references", "contact", "languages", "interests", "awards", "publications", "work",
    "history", "professional", "personal", "technical", "employment", "achievements",
    "email", "phone", "mobile", "address", "linkedin", "github", "portfolio",
    // titles and roles
    "senior", "junior", "lead", "principal", "staff", "chief", "head", "intern",
    "engineer", "engineering", "developer", "manager", "analyst", "scientist",
    "consultant", "director", "designer", "architect", "administrator", "specialist",
    "officer", "assistant", "associate", "president", "software", "data", "machine",
    "learning", "product", "project", "marketing", "sales", "operations", "full", "stack",
    "frontend", "backend", "devops", "cloud", "team",
    // organizations and places
    "inc", "inc.", "ltd", "ltd.", "llc", "corp", "corp.", "co.", "company", "group",
    "technologies", "technology", "solutions", "systems", "services", "labs", "university",
    "college", "institute", "school", "academy", "department", "bank", "street", "road",
    "avenue", "city", "state", "united", "states", "kingdom",
    // degrees
    "bachelor", "bachelors", "master", "masters", "phd", "b.sc", "m.sc", "mba", "science",
    "arts", "of", "and", "the", "in", "at", "for",
    // calendar
    "january", "february", "march", "april", "may", "june", "july", "august",
    "september", "october", "november", "december", "jan", "feb", "mar", "apr", "jun",
    "jul", "aug", "sep", "sept", "oct", "nov", "dec", "present", "current",
];

static NON_NAMES: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| NON_NAME_WORDS.iter().copied().collect());

const MIN_NAME_TOKENS: usize = 2;
const MAX_NAME_TOKENS: usize = 4;

#[async_trait]
impl NameEntityRecognizer for HeuristicNameRecognizer {
    async fn find_person_entities(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        Ok(find_capitalized_names(text))
    }

    fn backend(&self) -> &'static str {
        "heuristic"
    }
}

fn find_capitalized_names(text: &str) -> Vec<EntitySpan> {
    let mut spans = Vec::new();

    for run in CAPITALIZED_RUN.find_iter(text) {
        // (start, end, is_initial) of each token, as offsets into `text`
        let mut piece: Vec<(usize, usize, bool)> = Vec::new();

        for token in TOKEN.find_iter(run.as_str()) {
            let start = run.start() + token.start();
            let end = run.start() + token.end();
            let word = token.as_str();
            let lower = word.to_lowercase();
            let bare = lower.trim_end_matches([',', ':', ';']);

            if NON_NAMES.contains(bare) {
                push_piece(text, &piece, &mut spans);
                piece.clear();
                continue;
            }
            let is_initial = word.chars().count() == 2 && word.ends_with('.');
            piece.push((start, end, is_initial));
        }
        push_piece(text, &piece, &mut spans);
    }

    debug!("Heuristic recognizer found {} candidate names", spans.len());
    spans
}

fn push_piece(text: &str, piece: &[(usize, usize, bool)], spans: &mut Vec<EntitySpan>) {
    if !(MIN_NAME_TOKENS..=MAX_NAME_TOKENS).contains(&piece.len()) {
        return;
    }
    if piece.iter().all(|(_, _, is_initial)| *is_initial) {
        return;
    }
    let start = piece[0].0;
    let end = piece[piece.len() - 1].1;
    spans.push(EntitySpan::from_range(text, start, end));
}

// ────────────────────────────────────────────────────────────────────────────
// LlmNameRecognizer — Claude-backed implementation
// ────────────────────────────────────────────────────────────────────────────

/// Upper bound on the text sent to the model; names sit near the top of a resume.
const LLM_MAX_INPUT_CHARS: usize = 6000;

#[derive(Debug, Deserialize)]
struct PersonNames {
    persons: Vec<String>,
}

/// Asks Claude for the person names in the text, then anchors each returned
/// name to its first verbatim occurrence. Names the model produced that do not
/// occur in the text are dropped.
pub struct LlmNameRecognizer(pub LlmClient);

#[async_trait]
impl NameEntityRecognizer for LlmNameRecognizer {
    async fn find_person_entities(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        let excerpt = truncate_chars(text, LLM_MAX_INPUT_CHARS);
        if excerpt.trim().is_empty() {
            return Ok(vec![]);
        }

        let prompt = NAME_EXTRACTION_PROMPT.replace("{resume_text}", excerpt);
        let names: PersonNames = self.0.call_json(&prompt, NAME_EXTRACTION_SYSTEM).await?;

        Ok(anchor_names(text, &names.persons))
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// Locates each name verbatim in `text`; result is sorted by position.
fn anchor_names(text: &str, names: &[String]) -> Vec<EntitySpan> {
    let mut spans: Vec<EntitySpan> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .filter_map(|n| {
            text.find(n)
                .map(|start| EntitySpan::from_range(text, start, start + n.len()))
        })
        .collect();
    spans.sort_by_key(|s| s.start);
    spans.dedup_by_key(|s| s.start);
    spans
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    fn names(text: &str) -> Vec<String> {
        find_capitalized_names(text)
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_name_on_first_line() {
        let text = "Jane Doe\nSoftware Engineer\njane.doe@example.com";
        assert_eq!(names(text).first().map(String::as_str), Some("Jane Doe"));
    }

    #[test]
    fn test_heading_words_are_split_off() {
        let text = "Resume of John Smith";
        assert_eq!(names(text), vec!["John Smith"]);
    }

    #[test]
    fn test_all_caps_and_initials() {
        assert_eq!(names("MARIA GARCIA"), vec!["MARIA GARCIA"]);
        assert_eq!(names("John Q. Public"), vec!["John Q. Public"]);
    }

    #[test]
    fn test_runs_do_not_cross_lines() {
        let text = "Alice\nBob";
        assert!(names(text).is_empty());
    }

    #[test]
    fn test_job_titles_and_sections_are_not_names() {
        let text = "Professional Summary\nSenior Data Scientist\nWork Experience";
        assert!(names(text).is_empty());
    }

    #[test]
    fn test_hyphenated_and_apostrophe_names() {
        assert_eq!(names("Mary-Jane O'Neil"), vec!["Mary-Jane O'Neil"]);
    }

    #[test]
    fn test_lowercase_text_has_no_names() {
        assert!(names("i know python and sql well").is_empty());
    }

    #[test]
    fn test_span_offsets_match_text() {
        let text = "Contact: Priya Raman, Chennai";
        for span in find_capitalized_names(text) {
            assert_eq!(&text[span.start..span.end], span.text);
        }
    }

    #[test]
    fn test_overlong_runs_are_rejected() {
        assert!(names("Alpha Beta Gamma Delta Epsilon").is_empty());
    }

    #[tokio::test]
    async fn test_heuristic_backend_via_trait() {
        let recognizer: &dyn NameEntityRecognizer = &HeuristicNameRecognizer;
        let spans = recognizer
            .find_person_entities("Curriculum Vitae\nAda Lovelace\nLondon")
            .await
            .unwrap();
        assert_eq!(spans[0].text, "Ada Lovelace");
        assert_eq!(recognizer.backend(), "heuristic");
    }

    #[test]
    fn test_anchor_names_drops_hallucinations_and_sorts() {
        let text = "Referee: Bob Stone. Candidate Alice Wong wrote this.";
        let spans = anchor_names(
            text,
            &[
                "Alice Wong".to_string(),
                "Carol Nope".to_string(),
                "Bob Stone".to_string(),
                " ".to_string(),
            ],
        );
        let found: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(found, vec!["Bob Stone", "Alice Wong"]);
        assert_eq!(&text[spans[1].start..spans[1].end], "Alice Wong");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    // ── LlmNameRecognizer against a canned Messages endpoint ──────────────


    /// Serves `reply` as the model's text on a local port and records the
    /// request bodies it receives.
    async fn canned_recognizer(reply: &str) -> (LlmNameRecognizer, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let body = json!({
            "content": [{"type": "text", "text": reply}],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        });

        let recorder = seen.clone();
        let app = Router::new().route(
            "/v1/messages",
            post(move |Json(request): Json<Value>| async move {
                recorder.lock().unwrap().push(request);
                Json(body)
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = LlmClient::new("sk-test".to_string())
            .unwrap()
            .with_api_url(format!("http://{addr}/v1/messages"));
        (LlmNameRecognizer(client), seen)
    }

    #[tokio::test]
    async fn test_llm_recognizer_anchors_returned_names() {
        let (recognizer, seen) =
            canned_recognizer(r#"{"persons": ["John Smith", "Jane Doe", "Ghost Writer"]}"#).await;
        let text = "Jane Doe\nData Engineer\nReferences: John Smith";

        let spans = recognizer.find_person_entities(text).await.unwrap();

        let found: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(found, vec!["Jane Doe", "John Smith"]);
        assert_eq!(spans[0].start, 0);
        assert_eq!(recognizer.backend(), "llm");

        let requests = seen.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let prompt = requests[0]["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.contains("References: John Smith"));
    }

    #[tokio::test]
    async fn test_llm_recognizer_accepts_fenced_json() {
        let (recognizer, _) =
            canned_recognizer("```json\n{\"persons\": [\"Ada Lovelace\"]}\n```").await;

        let spans = recognizer
            .find_person_entities("Ada Lovelace, Analyst")
            .await
            .unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_llm_recognizer_malformed_reply_is_error() {
        let (recognizer, _) = canned_recognizer("I could not find any names.").await;

        let result = recognizer.find_person_entities("Ada Lovelace").await;
        assert!(matches!(
            result,
            Err(RecognizerError::Llm(crate::llm_client::LlmError::Parse(_)))
        ));
    }

    #[tokio::test]
    async fn test_llm_recognizer_blank_text_skips_the_call() {
        let (recognizer, seen) = canned_recognizer(r#"{"persons": ["Nobody"]}"#).await;

        let spans = recognizer.find_person_entities(" \n\t ").await.unwrap();
        assert!(spans.is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }
}
