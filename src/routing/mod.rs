//! # Stage: Routing Engine
//!
//! ## Responsibility
//! Turn `(prompt, category, preset)` plus a registry snapshot into a ranked
//! [`RoutingDecision`]: filter candidates by capability, context window, and
//! availability; score the survivors under the preset's weight triple; pick
//! the winner plus a fallback and up to four annotated alternatives.
//!
//! ## Guarantees
//! - Deterministic: the same inputs against the same registry snapshot
//!   always produce the same decision.
//! - Stable: score ties break in registry insertion order.
//! - Availability-respecting: a model observed unavailable at filter time is
//!   never selected; a model that turns unavailable mid-flight fails at
//!   invocation and takes the fallback path instead.
//!
//! ## NOT Responsible For
//! - Invoking backends (that belongs to `service` / `client`)
//! - Classifying prompts (that belongs to `classify`)

pub mod engine;
pub mod weights;

// Re-exports for convenience
pub use engine::{ModelAlternative, RoutingDecision, RoutingEngine};
pub use weights::{Preset, PriorityWeights};
