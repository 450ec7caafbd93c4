//! Error Types for the Recommendation Pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LensError>;

#[derive(Error, Debug)]
pub enum LensError {
    /// Missing API key, no enabled data sources, or similar. Fatal:
    /// surfaced verbatim, never absorbed by the demo fallback.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Candidate or per-token detail fetch failed.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The model returned an empty or whitespace-only reply.
    #[error("Empty LLM response")]
    EmptyResponse,

    /// The model reply could not be mapped onto the recommendation schema.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A previous analysis run is still in flight.
    #[error("Analysis already running")]
    AlreadyRunning,

    #[error("Provider error: {0}")]
    Provider(#[from] lens_core::ProviderError),

    #[error("Cache error: {0}")]
    Cache(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
