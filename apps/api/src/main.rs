mod config;
mod errors;
mod evaluation;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::evaluation::evaluator::Evaluator;
use crate::evaluation::reasoning::{LlmRationale, LocalRationale, RationaleSource};
use crate::evaluation::rubric_source::{FallbackRubrics, LlmRubrics, RubricSource};
use crate::llm_client::budget::CallBudgetTracker;
use crate::llm_client::http::HttpGenerationBackend;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Matcher API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (one budget tracker for the whole process)
    let llm = build_llm_client(&config)?;

    // Initialize rationale source (LocalRationale unless a provider is configured and enabled)
    let rationale: Arc<dyn RationaleSource> = match (&llm, config.enable_llm_reasoning) {
        (Some(client), true) => Arc::new(LlmRationale(client.clone())),
        _ => Arc::new(LocalRationale),
    };
    info!(
        source = rationale.name(),
        tier_adjustment = config.evaluation.reasoning_tier_adjustment,
        "Rationale source initialized"
    );

    // Rubric drafting uses the provider whenever one is configured
    let rubrics: Arc<dyn RubricSource> = match &llm {
        Some(client) => Arc::new(LlmRubrics(client.clone())),
        None => Arc::new(FallbackRubrics),
    };
    info!(source = rubrics.name(), "Rubric source initialized");

    let state = AppState {
        llm,
        evaluator: Arc::new(Evaluator::new(rationale, config.evaluation)),
        rubrics,
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

fn build_llm_client(config: &Config) -> Result<Option<LlmClient>> {
    let Some(api_key) = config.llm_api_key.clone() else {
        warn!("LLM_API_KEY not set, provider calls disabled");
        return Ok(None);
    };

    let backend = HttpGenerationBackend::new(
        api_key,
        &config.llm_base_url,
        config.llm_model.clone(),
        config.llm_request_timeout,
    )?;
    let budget = Arc::new(CallBudgetTracker::new(config.budget.clone()));
    let client = LlmClient::new(Arc::new(backend), budget, config.retry.clone());

    info!(
        model = %config.llm_model,
        calls_per_minute = config.budget.calls_per_minute,
        max_attempts = config.retry.max_attempts,
        "LLM client initialized"
    );
    Ok(Some(client))
}
