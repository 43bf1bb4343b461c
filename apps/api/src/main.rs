mod config;
mod errors;
mod evaluation;
mod extraction;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::evaluation::fallback::FallbackGenerator;
use crate::evaluation::generator::ContractValidatingGenerator;
use crate::evaluation::scorer::DeterministicScorer;
use crate::evaluation::taxonomy::SkillsTaxonomy;
use crate::evaluation::Evaluator;
use crate::extraction::ocr::TesseractOcr;
use crate::extraction::text_layer::PdfExtractTextLayer;
use crate::extraction::TextExtractor;
use crate::llm_client::{GeminiClient, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer API v{}", env!("CARGO_PKG_VERSION"));

    // Skills taxonomy: built-in unless a JSON override is configured
    let taxonomy = match &config.skills_taxonomy_path {
        Some(path) => SkillsTaxonomy::from_json_file(path)?,
        None => SkillsTaxonomy::default(),
    };
    let taxonomy = Arc::new(taxonomy);
    info!("Skills taxonomy loaded: {} roles", taxonomy.len());

    // Initialize LLM client
    let llm = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_api_base.clone(),
        config.gemini_model.clone(),
        config.llm_timeout,
    )
    .context("Failed to build HTTP client for the generative service")?;
    info!(
        "LLM client initialized (model: {}, timeout: {:?})",
        llm.model(),
        config.llm_timeout
    );

    let extractor = TextExtractor::new(
        Arc::new(PdfExtractTextLayer),
        Arc::new(TesseractOcr::new(config.ocr.clone())),
        config.min_text_chars,
    );
    let evaluator = Evaluator::new(
        extractor,
        DeterministicScorer::new(Arc::clone(&taxonomy)),
        ContractValidatingGenerator::new(
            Arc::new(llm),
            FallbackGenerator::new(Arc::clone(&taxonomy)),
            config.llm_timeout,
            config.max_resume_chars,
        ),
    );

    // Build app state
    let state = AppState {
        evaluator: Arc::new(evaluator),
        max_upload_bytes: config.max_upload_bytes,
    };

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
