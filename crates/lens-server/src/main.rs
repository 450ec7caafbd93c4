//! robinlens HTTP Server
//!
//! Axum-based server exposing the recommendation pipeline: analyze on
//! demand, read the cached shortlist, poll the cooldown.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curve_lens::{MockCurveSource, RecommendationCache, Recommender};
use lens_core::{GenerationOptions, LlmProvider};
use lens_runtime::OpenAiProvider;

use crate::handlers::{analyze, cooldown, health_check, recommendations};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // LLM provider: a missing API key is a startup error, not something
    // the demo fallback papers over
    let provider =
        OpenAiProvider::from_env().map_err(|e| anyhow::anyhow!("LLM provider setup failed: {e}"))?;
    let model = provider.default_model().to_string();
    let provider: Arc<dyn LlmProvider> = Arc::new(provider);

    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to LLM provider"),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ LLM provider unreachable - analysis will fall back to demo data");
        }
    }

    // Candidate data source. The indexer transport is pluggable behind
    // CurveDataSource; the mock universe keeps the server self-contained.
    let source = Arc::new(MockCurveSource::new());

    let cache_path = std::env::var("ROBINLENS_CACHE_PATH")
        .unwrap_or_else(|_| ".robinlens/recommendations.json".into());

    let recommender = Recommender::new(
        source,
        Arc::clone(&provider),
        GenerationOptions::analysis(model),
        RecommendationCache::new(cache_path),
    );

    let state = AppState { recommender: Arc::new(recommender), provider };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/analyze", post(analyze))
        .route("/api/recommendations", get(recommendations))
        .route("/api/cooldown", get(cooldown))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("robinlens server running on http://{}", addr);
    tracing::info!("  GET  /api/health          - Health check");
    tracing::info!("  POST /api/analyze         - Run the analysis pipeline");
    tracing::info!("  GET  /api/recommendations - Last cached shortlist");
    tracing::info!("  GET  /api/cooldown        - Time until the next run");

    axum::serve(listener, app).await?;

    Ok(())
}
