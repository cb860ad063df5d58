mod config;
mod document;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, RecognizerKind};
use crate::extraction::{HeuristicNameRecognizer, LlmNameRecognizer, NameEntityRecognizer};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Parser API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the name recognizer once; handlers share it read-only.
    let recognizer = build_recognizer(&config)?;
    info!("Name recognizer: {}", recognizer.backend());
    info!(
        "Skill vocabulary: {} skills, {} highlighted by default",
        config.vocabulary.skills().len(),
        config.vocabulary.default_highlight().len()
    );

    // Build app state
    let state = AppState::new(config.clone(), recognizer);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_recognizer(config: &Config) -> Result<Arc<dyn NameEntityRecognizer>> {
    match config.recognizer {
        RecognizerKind::Heuristic => Ok(Arc::new(HeuristicNameRecognizer)),
        RecognizerKind::Llm => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("ANTHROPIC_API_KEY is required for NAME_RECOGNIZER=llm"))?;
            let mut llm = LlmClient::new(api_key)?;
            if let Some(url) = &config.anthropic_api_url {
                llm = llm.with_api_url(url.as_str());
            }
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Ok(Arc::new(LlmNameRecognizer(llm)))
        }
    }
}
