//! # Stage: Prompt Classification
//!
//! ## Responsibility
//! Assign every prompt a [`Category`](crate::Category) and a confidence.
//! The heuristic pass is free and synchronous; the model pass costs one
//! backend call and only runs when the heuristic is unsure. The hybrid
//! layer reconciles the two and degrades gracefully when the model
//! classifier is down.
//!
//! ## Guarantees
//! - The returned category is always a member of the closed category set.
//! - Confidence is in `[0, 1]`; heuristic confidence never exceeds 0.9.
//! - A model-classifier outage never blocks classification: the hybrid
//!   result falls back to the heuristic with halved confidence.
//!
//! ## NOT Responsible For
//! - Choosing a model to serve the prompt (that belongs to `routing`)
//! - Producing the `MathReasoning` label from the model pass: the model
//!   classifier's taxonomy deliberately excludes it

pub mod heuristic;
pub mod hybrid;
pub mod model;

// Re-exports for convenience
pub use heuristic::{HeuristicClassification, HeuristicClassifier};
pub use hybrid::{FinalMethod, HybridClassification, HybridClassifier, HEURISTIC_THRESHOLD};
pub use model::{ModelClassification, ModelClassifier};

use serde::{Deserialize, Serialize};

/// Which classifier produced the adopted result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Heuristic,
    Model,
    Hybrid,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Heuristic => write!(f, "heuristic"),
            Method::Model => write!(f, "model"),
            Method::Hybrid => write!(f, "hybrid"),
        }
    }
}
