//! # lens-core
//!
//! Provider-agnostic LLM abstraction for the robinlens recommendation
//! pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  Recommendation Pipeline             │
//! │  ┌──────────────┐        ┌─────────────────────────┐ │
//! │  │   Prompts    │───────▶│   LlmProvider           │ │
//! │  │ (system/user)│        │   (Strategy)            │ │
//! │  └──────────────┘        └─────────────────────────┘ │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between OpenAI-compatible
//! endpoints, local inference, or any other provider without changing
//! pipeline logic.

pub mod error;
pub mod message;
pub mod provider;

pub use error::{ProviderError, Result};
pub use message::{Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider};
