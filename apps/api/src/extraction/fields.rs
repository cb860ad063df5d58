//! Pattern-based field recognizers. Pure functions over extracted text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email pattern is valid")
});

// Optional '+', a digit, 8+ digits/whitespace/hyphens, then a closing digit.
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s\-]{8,}\d").expect("phone pattern is valid"));

/// First email-shaped substring, left to right.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL.find(text).map(|m| m.as_str().to_string())
}

/// First phone-like run of at least ten characters, verbatim.
pub fn extract_phone(text: &str) -> Option<String> {
    PHONE.find(text).map(|m| m.as_str().to_string())
}

/// Vocabulary entries whose lowercase form occurs anywhere in the lowercase text.
///
/// Plain substring containment: "R" matches inside "Director". Entries are
/// returned in their canonical spelling; blank entries never match.
pub fn extract_skills<S: AsRef<str>>(text: &str, vocabulary: &[S]) -> BTreeSet<String> {
    let text_lower = text.to_lowercase();
    vocabulary
        .iter()
        .map(|skill| skill.as_ref())
        .filter(|skill| !skill.trim().is_empty())
        .filter(|skill| text_lower.contains(&skill.to_lowercase()))
        .map(str::to_string)
        .collect()
}
