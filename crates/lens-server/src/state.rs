//! Application State

use std::sync::Arc;

use curve_lens::Recommender;
use lens_core::LlmProvider;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The recommendation pipeline (owns cache and cooldown)
    pub recommender: Arc<Recommender>,

    /// LLM provider, exposed separately for health checks
    pub provider: Arc<dyn LlmProvider>,
}
