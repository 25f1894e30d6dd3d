//! Hybrid classification: heuristic first, model on demand.
//!
//! The heuristic runs on every prompt. When it clears the confidence
//! threshold its answer is adopted outright; otherwise the model
//! classifier is consulted and the two results are reconciled. A model
//! outage downgrades to the heuristic answer at half confidence — a
//! classifier failure never blocks routing.

use std::time::Instant;

use serde::Serialize;

use crate::category::Category;
use crate::classify::heuristic::{HeuristicClassification, HeuristicClassifier};
use crate::classify::model::{ModelClassification, ModelClassifier};
use crate::classify::Method;

/// Heuristic confidence at or above this adopts the heuristic outright.
pub const HEURISTIC_THRESHOLD: f64 = 0.7;

/// How the final answer was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalMethod {
    /// Heuristic was confident enough on its own; no model call made.
    HeuristicOnly,
    /// Model classifier failed; heuristic adopted at half confidence.
    HeuristicFallback,
    /// Both passes agreed on the category.
    Agreement,
    /// Passes disagreed; the more confident one was adopted.
    Disagreement,
}

/// Result of the full hybrid pass.
#[derive(Debug, Clone, Serialize)]
pub struct HybridClassification {
    pub category: Category,
    pub confidence: f64,
    pub method: Method,
    pub heuristic: HeuristicClassification,
    pub model: Option<ModelClassification>,
    pub final_method: FinalMethod,
    pub reasoning: String,
    pub total_ms: u64,
}

/// Two-stage classifier: free heuristic, then the model pass when unsure.
pub struct HybridClassifier {
    heuristic: HeuristicClassifier,
    model: Option<ModelClassifier>,
}

impl HybridClassifier {
    pub fn new(model: ModelClassifier) -> Self {
        Self {
            heuristic: HeuristicClassifier::new(),
            model: Some(model),
        }
    }

    /// A hybrid with no model backend at all: every low-confidence prompt
    /// takes the heuristic-fallback path. Used when the classifier backend
    /// cannot be constructed (missing credential).
    pub fn heuristic_only() -> Self {
        Self {
            heuristic: HeuristicClassifier::new(),
            model: None,
        }
    }

    /// Classify a prompt. Infallible: every failure path degrades to a
    /// heuristic-derived answer.
    pub async fn classify(&self, prompt: &str) -> HybridClassification {
        let started = Instant::now();
        let heuristic = self.heuristic.classify(prompt);

        if heuristic.confidence >= HEURISTIC_THRESHOLD {
            let reasoning = format!(
                "heuristic confident at {:.2}: {}",
                heuristic.confidence, heuristic.reasoning
            );
            return HybridClassification {
                category: heuristic.category,
                confidence: heuristic.confidence,
                method: Method::Heuristic,
                heuristic,
                model: None,
                final_method: FinalMethod::HeuristicOnly,
                reasoning,
                total_ms: started.elapsed().as_millis() as u64,
            };
        }

        let model_result = match &self.model {
            Some(classifier) => classifier.classify(prompt).await,
            None => Err(crate::RouterError::Classification(
                "no classifier backend configured".to_string(),
            )),
        };
        let model = match model_result {
            Ok(model) => model,
            Err(e) => {
                tracing::warn!(error = %e, "model classifier unavailable, degrading to heuristic");
                let confidence = (heuristic.confidence / 2.0).max(0.1);
                let reasoning = format!(
                    "model classifier failed ({e}); heuristic {} adopted at reduced confidence",
                    heuristic.category
                );
                return HybridClassification {
                    category: heuristic.category,
                    confidence,
                    method: Method::Heuristic,
                    heuristic,
                    model: None,
                    final_method: FinalMethod::HeuristicFallback,
                    reasoning,
                    total_ms: started.elapsed().as_millis() as u64,
                };
            }
        };

        let outcome = reconcile(&heuristic, &model);
        HybridClassification {
            category: outcome.category,
            confidence: outcome.confidence,
            method: outcome.method,
            heuristic,
            model: Some(model),
            final_method: outcome.final_method,
            reasoning: outcome.reasoning,
            total_ms: started.elapsed().as_millis() as u64,
        }
    }
}

struct Reconciled {
    category: Category,
    confidence: f64,
    method: Method,
    final_method: FinalMethod,
    reasoning: String,
}

/// Merge the two passes: agreement keeps the more confident result,
/// disagreement adopts the model only when it is strictly more confident.
fn reconcile(heuristic: &HeuristicClassification, model: &ModelClassification) -> Reconciled {
    if heuristic.category == model.category {
        let (confidence, method) = if heuristic.confidence >= model.confidence {
            (heuristic.confidence, Method::Heuristic)
        } else {
            (model.confidence, Method::Model)
        };
        return Reconciled {
            category: heuristic.category,
            confidence,
            method,
            final_method: FinalMethod::Agreement,
            reasoning: format!(
                "both passes agree on {} (heuristic {:.2}, model {:.2})",
                heuristic.category, heuristic.confidence, model.confidence
            ),
        };
    }

    let margin = model.confidence - heuristic.confidence;
    let strongly = if margin > 0.2 {
        " (model is strongly more confident)"
    } else {
        ""
    };

    if margin > 0.0 {
        Reconciled {
            category: model.category,
            confidence: model.confidence,
            method: Method::Model,
            final_method: FinalMethod::Disagreement,
            reasoning: format!(
                "model {} ({:.2}) overrides heuristic {} ({:.2}){strongly}",
                model.category, model.confidence, heuristic.category, heuristic.confidence
            ),
        }
    } else {
        Reconciled {
            category: heuristic.category,
            confidence: heuristic.confidence,
            method: Method::Heuristic,
            final_method: FinalMethod::Disagreement,
            reasoning: format!(
                "heuristic {} ({:.2}) retained over model {} ({:.2})",
                heuristic.category, heuristic.confidence, model.category, model.confidence
            ),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
