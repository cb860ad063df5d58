use anyhow::{bail, Context, Result};

use crate::extraction::vocabulary::SkillVocabulary;

/// Default request body limit for uploads (10 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which name recognizer backs `extract_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerKind {
    Heuristic,
    Llm,
}

/// Application configuration loaded from environment variables.
/// Fails at startup on malformed values, or when the LLM recognizer is
/// selected without an API key.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub vocabulary: SkillVocabulary,
    pub recognizer: RecognizerKind,
    pub anthropic_api_key: Option<String>,
    /// Messages endpoint override for the LLM recognizer (proxy, gateway).
    pub anthropic_api_url: Option<String>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let skills = var("SKILL_VOCABULARY").map(|v| split_list(&v));
        let highlight = var("HIGHLIGHT_SKILLS").map(|v| split_list(&v));
        let vocabulary = match skills {
            Some(skills) => SkillVocabulary::new(skills, highlight),
            None => match highlight {
                Some(h) => SkillVocabulary::new(SkillVocabulary::default().skills().to_vec(), Some(h)),
                None => SkillVocabulary::default(),
            },
        };
        if vocabulary.skills().is_empty() {
            bail!("SKILL_VOCABULARY must contain at least one skill");
        }

        let recognizer = match var("NAME_RECOGNIZER").as_deref().map(str::trim) {
            None | Some("heuristic") => RecognizerKind::Heuristic,
            Some("llm") => RecognizerKind::Llm,
            Some(other) => bail!("NAME_RECOGNIZER must be 'heuristic' or 'llm', got '{other}'"),
        };

        let anthropic_api_key = var("ANTHROPIC_API_KEY");
        if recognizer == RecognizerKind::Llm && anthropic_api_key.is_none() {
            bail!("Required environment variable 'ANTHROPIC_API_KEY' is not set (NAME_RECOGNIZER=llm)");
        }

        Ok(Config {
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            vocabulary,
            recognizer,
            anthropic_api_key,
            anthropic_api_url: var("ANTHROPIC_API_URL"),
            max_upload_bytes: match var("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a positive integer")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
