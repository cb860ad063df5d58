use std::sync::Arc;

use crate::config::Config;
use crate::extraction::names::NameEntityRecognizer;
use crate::extraction::vocabulary::SkillVocabulary;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Everything here is read-only after startup; each upload is parsed in
/// isolation with no per-request state stored.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable name recognizer. Default: HeuristicNameRecognizer. Swap via NAME_RECOGNIZER.
    pub recognizer: Arc<dyn NameEntityRecognizer>,
    pub vocabulary: Arc<SkillVocabulary>,
}

impl AppState {
    pub fn new(config: Config, recognizer: Arc<dyn NameEntityRecognizer>) -> Self {
        let vocabulary = Arc::new(config.vocabulary.clone());
        Self {
            config,
            recognizer,
            vocabulary,
        }
    }
}
