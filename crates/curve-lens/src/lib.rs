//! # curve-lens
//!
//! Risk-scored, LLM-ranked shortlists of bonding-curve launchpad tokens.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Candidate Fetcher ──▶ Metrics Engines ──▶ Pre-Filter (20)   │
//! │         │                                        │           │
//! │   CurveDataSource                         Prompt Builder     │
//! │   (batches of 5)                                 │           │
//! │                                            LlmProvider       │
//! │                                                  │           │
//! │                  Cache ◀── Orchestrator ◀── Validation       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Data flows one way. Snapshots are fetched fresh per run, metrics are
//! derived once and consumed immediately, and only the final response is
//! persisted (single slot, 15-minute TTL). Failures past configuration
//! validation degrade to a fixed demo dataset rather than an error.

pub mod cache;
pub mod demo;
pub mod error;
pub mod metrics;
pub mod model;
pub mod prefilter;
pub mod prompt;
pub mod recommend;
pub mod schema;
pub mod source;
pub mod technical;

pub use cache::{CachedResult, CooldownState, RecommendationCache};
pub use error::{LensError, Result};
pub use model::{Curve, DataSource, OnChainMetrics, Position, TechnicalMetrics, Trade, TradeSide};
pub use recommend::{AnalysisOutcome, AnalysisStep, RecommendationConfig, Recommender};
pub use schema::{RecommendationResponse, RiskLevel, SuggestedAction, TokenRecommendation};
pub use source::{CurveDataSource, CurveSortKey, MockCurveSource};
