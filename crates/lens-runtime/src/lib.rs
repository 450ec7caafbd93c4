//! # lens-runtime
//!
//! Runtime LLM providers for robinlens.
//!
//! ## Providers
//!
//! - **OpenAI** (default): OpenAI-compatible chat-completions endpoints
//! - **Anthropic** (coming soon): Claude API integration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lens_runtime::OpenAiProvider;
//!
//! let provider = OpenAiProvider::from_env()?;
//! let completion = provider.complete(&messages, &options).await?;
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use lens_core::{GenerationOptions, LlmProvider, Message, ProviderError, Result, Role};
