//! Keyword-overlap prompt classification.
//!
//! Zero-cost, zero-latency first pass. For each scorable category the
//! prompt is checked against the category's keyword list by
//! case-insensitive substring containment:
//!
//! | Term | Definition |
//! |------|------------|
//! | `match_ratio` | matched keywords / list length (0 for an empty list) |
//! | `exact_bonus` | `0.1 × matched` |
//! | `raw_score` | `min(1.0, match_ratio + exact_bonus)` |
//!
//! The best raw score wins, ties breaking in category declaration order.
//! Confidence starts at the raw score and is boosted by the margin over
//! the runner-up, then clamped to `[0, 0.9]` — the heuristic never claims
//! more than 0.9.

use serde::Serialize;

use crate::category::Category;
use crate::classify::Method;

/// Heuristic confidence can never exceed this cap.
const CONFIDENCE_CAP: f64 = 0.9;

/// Result of a heuristic classification pass.
#[derive(Debug, Clone, Serialize)]
pub struct HeuristicClassification {
    pub category: Category,
    pub confidence: f64,
    pub method: Method,
    pub matched_keywords: Vec<String>,
    pub reasoning: String,
}

/// Stateless keyword-overlap classifier. Cheap to construct, pure: the
/// same prompt always yields the same result.
#[derive(Debug, Clone, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a prompt by keyword overlap.
    pub fn classify(&self, prompt: &str) -> HeuristicClassification {
        let lower = prompt.to_lowercase();

        let mut best: Option<(Category, f64, Vec<String>)> = None;
        let mut runner_up_score = 0.0_f64;

        for category in Category::SCORED {
            let keywords = category.keywords();
            let matched: Vec<String> = keywords
                .iter()
                .filter(|kw| lower.contains(*kw))
                .map(|kw| kw.to_string())
                .collect();

            let match_ratio = if keywords.is_empty() {
                0.0
            } else {
                matched.len() as f64 / keywords.len() as f64
            };
            let exact_bonus = 0.1 * matched.len() as f64;
            let raw_score = (match_ratio + exact_bonus).min(1.0);

            match &best {
                // Strictly-greater keeps the first category on ties.
                Some((_, best_score, _)) if raw_score <= *best_score => {
                    if raw_score > runner_up_score {
                        runner_up_score = raw_score;
                    }
                }
                _ => {
                    if let Some((_, prev, _)) = &best {
                        runner_up_score = *prev;
                    }
                    best = Some((category, raw_score, matched));
                }
            }
        }

        let Some((category, raw_score, matched)) = best else {
            return self.unknown_result();
        };
        if raw_score == 0.0 {
            return self.unknown_result();
        }

        let gap = raw_score - runner_up_score;
        let mut confidence = raw_score;
        if gap > 0.3 {
            confidence += 0.2;
        }
        if gap > 0.5 {
            confidence += 0.1;
        }
        let confidence = confidence.clamp(0.0, CONFIDENCE_CAP);

        let reasoning = format!(
            "matched {} of {} {} keywords ({}), margin {:.2} over runner-up",
            matched.len(),
            category.keywords().len(),
            category,
            matched.join(", "),
            gap
        );

        HeuristicClassification {
            category,
            confidence,
            method: Method::Heuristic,
            matched_keywords: matched,
            reasoning,
        }
    }

    fn unknown_result(&self) -> HeuristicClassification {
        HeuristicClassification {
            category: Category::Unknown,
            confidence: 0.1,
            method: Method::Heuristic,
            matched_keywords: Vec::new(),
            reasoning: "no category keywords matched".to_string(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
