//! HTTP Handlers

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use curve_lens::{AnalysisOutcome, CachedResult, DataSource, LensError, RecommendationConfig};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider_connected: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Evidence sources to report to the model; defaults to all
    #[serde(default = "default_sources")]
    pub enabled_sources: Vec<DataSource>,
}

fn default_sources() -> Vec<DataSource> {
    vec![DataSource::OnChain, DataSource::Technical]
}

#[derive(Debug, Serialize)]
pub struct CooldownResponse {
    pub remaining_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, code: &'static str, message: impl Into<String>) -> HandlerError {
    (status, Json(ErrorResponse { error: message.into(), code }))
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider_connected,
    })
}

/// Run the analysis pipeline. Rejected while cooling down or when a run
/// is already in flight; configuration errors surface verbatim.
pub async fn analyze(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisOutcome>, HandlerError> {
    let remaining = state.recommender.cooldown_remaining();
    if !remaining.is_zero() {
        return Err(error(
            StatusCode::TOO_MANY_REQUESTS,
            "COOLDOWN",
            format!("analysis available again in {} ms", remaining.as_millis()),
        ));
    }

    let config = RecommendationConfig { enabled_sources: payload.enabled_sources };
    let outcome = state
        .recommender
        .analyze(&config, |step| tracing::info!(%step, "analysis progress"))
        .await
        .map_err(|e| match e {
            LensError::AlreadyRunning => {
                error(StatusCode::CONFLICT, "ALREADY_RUNNING", e.to_string())
            }
            LensError::Config(_) => error(StatusCode::BAD_REQUEST, "CONFIG", e.to_string()),
            other => error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", other.to_string()),
        })?;

    Ok(Json(outcome))
}

/// Last cached result, if still fresh
pub async fn recommendations(
    State(state): State<AppState>,
) -> Result<Json<CachedResult>, HandlerError> {
    state.recommender.cached().map(Json).ok_or_else(|| {
        error(StatusCode::NOT_FOUND, "NO_CACHE", "no fresh analysis result available")
    })
}

/// Milliseconds until the next run is permitted
pub async fn cooldown(State(state): State<AppState>) -> Json<CooldownResponse> {
    Json(CooldownResponse {
        remaining_ms: state.recommender.cooldown_remaining().as_millis() as u64,
    })
}
