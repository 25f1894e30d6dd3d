//! # prompt-router
//!
//! A priority-aware model router for multi-provider LLM backends.
//!
//! ## Architecture
//!
//! Three coupled subsystems behind one service entry point:
//! ```text
//! prompt → HybridClassifier → (category, confidence)
//!        → RoutingEngine(category, preset, registry snapshot) → decision
//!        → BackendClient::generate → RouterResponse
//! ```
//!
//! On backend failure the selected model is marked unavailable in the
//! registry and a single static fallback invocation is attempted.

use thiserror::Error;

pub mod analytics;
pub mod category;
pub mod classify;
pub mod client;
pub mod config;
pub mod metrics;
pub mod pool;
pub mod registry;
pub mod routing;
pub mod service;

#[cfg(feature = "web-api")]
pub mod web_api;

// Re-exports
pub use category::Category;
pub use client::{
    AnthropicClient, BackendClient, GenerationOptions, GenerationOutput, GoogleClient,
    HuggingFaceClient, OpenAiClient, StaticClient,
};
pub use pool::ClientPool;
pub use registry::{ModelDescriptor, ModelRegistry, Provider};
pub use routing::{Preset, PriorityWeights, RoutingDecision, RoutingEngine};
pub use service::{RouterResponse, RouterService};

/// Router-specific errors, one variant per failure class.
#[derive(Error, Debug)]
pub enum RouterError {
    /// Missing or malformed caller input (empty prompt, unknown preset).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Model-classifier transport or protocol failure. Contained by the
    /// hybrid classifier; never surfaces from the service.
    #[error("classification failed: {0}")]
    Classification(String),

    /// Candidate filtering removed every model in the registry.
    #[error("no candidate models for category {0}")]
    NoCandidateModels(String),

    /// A backend call failed: timeout, HTTP error, empty or malformed reply.
    #[error("backend error: {0}")]
    Backend(String),

    /// Both the selected model and the static fallback failed.
    #[error("routing failed after fallback: {0}")]
    FallbackExhausted(String),

    /// Missing credential or invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Initialise tracing with env-filter support. Call once at binary startup.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
