//! Candidate filtering and multi-criteria scoring.
//!
//! A model is a *candidate* for a request when it serves the category (its
//! prior map contains the key), its context window covers the estimated
//! prompt tokens, and it is currently available. Candidates are scored as
//! a weighted sum of quality, cost, and latency terms plus two small
//! additive bonuses (context headroom and throughput), then ranked.
//!
//! Two regime switches depend on the preset weights:
//! - `weights.cost > 0.4`: cost is scored as simple price distance from
//!   the most expensive candidate.
//! - `weights.quality > 0.5` amplifies quality priors; `> 0.6` additionally
//!   grants cost-score floors keyed on premium model names.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use crate::category::Category;
use crate::registry::{ModelDescriptor, ModelRegistry, Provider};
use crate::routing::weights::{Preset, PriorityWeights};
use crate::RouterError;

/// A ranked non-selected candidate, annotated for display.
#[derive(Debug, Clone, Serialize)]
pub struct ModelAlternative {
    pub key: String,
    pub score: f64,
    pub reason: String,
    pub provider: Provider,
    pub quality_score: f64,
    pub cost_per_1k_tokens: f64,
    pub latency_ms: f64,
}

/// Outcome of one routing decision.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    pub selected_key: String,
    pub provider: Provider,
    pub category: Category,
    pub fallback_key: Option<String>,
    pub reasoning: String,
    pub confidence: f64,
    pub estimated_cost_usd: f64,
    pub estimated_latency_ms: f64,
    pub score: f64,
    pub priority_weights: PriorityWeights,
    pub alternatives: Vec<ModelAlternative>,
}

/// Deterministic scorer over a registry snapshot.
pub struct RoutingEngine {
    registry: Arc<ModelRegistry>,
}

impl RoutingEngine {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this engine reads from.
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Flip a model's availability off. Delegates to the registry.
    pub fn mark_model_unavailable(&self, key: &str) -> bool {
        self.registry.mark_unavailable(key)
    }

    /// Restore every model's availability. Delegates to the registry.
    pub fn reset_all_availability(&self) {
        self.registry.reset_all()
    }

    /// Produce a routing decision for `(prompt, category, preset)`.
    ///
    /// Pure given the registry snapshot taken at entry: the same inputs
    /// against the same availability state yield the same decision.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::NoCandidateModels`] when filtering leaves no
    /// model standing.
    pub fn decide(
        &self,
        prompt: &str,
        category: Category,
        preset: Preset,
    ) -> Result<RoutingDecision, RouterError> {
        let estimated_tokens = estimate_tokens(prompt);
        let snapshot = self.registry.snapshot();

        let candidates: Vec<&ModelDescriptor> = snapshot
            .iter()
            .filter(|m| {
                m.quality_prior(category).is_some()
                    && m.context_window_tokens >= estimated_tokens
                    && m.available
            })
            .collect();

        if candidates.is_empty() {
            return Err(RouterError::NoCandidateModels(category.to_string()));
        }

        let weights = preset.weights();
        let mut ranked: Vec<(&ModelDescriptor, f64)> = candidates
            .iter()
            .map(|m| (*m, score_candidate(m, category, &weights, &candidates, estimated_tokens)))
            .collect();
        // Stable sort: equal scores keep registry order.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let (selected, top_score) = ranked[0];
        let fallback_key = ranked[1..]
            .iter()
            .find(|(m, _)| m.available)
            .map(|(m, _)| m.key.clone());

        let alternatives: Vec<ModelAlternative> = ranked[1..]
            .iter()
            .filter(|(m, _)| m.available)
            .take(4)
            .map(|(m, score)| ModelAlternative {
                key: m.key.clone(),
                score: *score,
                reason: alternative_reason(m, selected, category),
                provider: m.provider,
                quality_score: m.quality_prior_or_default(category),
                cost_per_1k_tokens: m.price_input_per_1k(),
                latency_ms: m.latency_ms(),
            })
            .collect();

        let confidence = decision_confidence(&ranked);
        let reasoning = decision_reasoning(selected, category, &weights);

        let estimated_cost_usd = (estimated_tokens as f64 / 1e6) * selected.price_input_per_million
            + (category.estimated_output_tokens() as f64 / 1e6) * selected.price_output_per_million;

        tracing::debug!(
            model = selected.key.as_str(),
            category = %category,
            preset = %preset,
            score = top_score,
            confidence,
            "routing decision"
        );

        Ok(RoutingDecision {
            selected_key: selected.key.clone(),
            provider: selected.provider,
            category,
            fallback_key,
            reasoning,
            confidence,
            estimated_cost_usd,
            estimated_latency_ms: selected.latency_ms(),
            score: top_score,
            priority_weights: weights,
            alternatives,
        })
    }
}

/// `⌈chars / 4⌉` — the crude universal token estimate.
pub fn estimate_tokens(prompt: &str) -> u64 {
    (prompt.chars().count() as u64).div_ceil(4)
}

// ── Scoring ────────────────────────────────────────────────────────────

fn score_candidate(
    m: &ModelDescriptor,
    category: Category,
    weights: &PriorityWeights,
    candidates: &[&ModelDescriptor],
    estimated_tokens: u64,
) -> f64 {
    let max_price = candidates
        .iter()
        .map(|c| c.price_input_per_million)
        .fold(0.0_f64, f64::max);
    let min_price = candidates
        .iter()
        .map(|c| c.price_input_per_million)
        .fold(f64::INFINITY, f64::min);
    let max_latency_ms = candidates
        .iter()
        .map(|c| c.latency_ms())
        .fold(0.0_f64, f64::max);
    let max_tps = candidates
        .iter()
        .map(|c| c.throughput_tps())
        .max()
        .unwrap_or(1)
        .max(1);

    let mut score = quality_contribution(m, category, weights);
    score += cost_contribution(m, weights, max_price, min_price);
    score += latency_contribution(m, weights, max_latency_ms);

    // Context headroom bonus for long prompts, capped at 0.1.
    if estimated_tokens > 1000 {
        let headroom = (m.context_window_tokens.saturating_sub(estimated_tokens)) as f64 / 10_000.0;
        score += headroom.min(0.1);
    }

    // Throughput bonus, up to 0.05 for the fastest candidate.
    score += 0.05 * m.throughput_tps() as f64 / max_tps as f64;

    score
}

fn quality_contribution(m: &ModelDescriptor, category: Category, weights: &PriorityWeights) -> f64 {
    let q = m.quality_prior_or_default(category);
    let adjusted = if weights.quality > 0.5 {
        // Quality regime: compress the scale upward and reward the very top.
        let amplified = q.powf(0.3);
        if q > 0.9 {
            amplified + 0.1
        } else {
            amplified
        }
    } else {
        q
    };
    adjusted * weights.quality
}

fn cost_contribution(
    m: &ModelDescriptor,
    weights: &PriorityWeights,
    max_price: f64,
    min_price: f64,
) -> f64 {
    let price = m.price_input_per_million;

    let cost_score = if max_price == 0.0 {
        // Every candidate is free: cost cannot discriminate.
        0.5
    } else if weights.cost > 0.4 {
        // Cost-priority regime: plain distance from the most expensive.
        1.0 - price / max_price
    } else {
        let base = if price == 0.0 {
            0.6
        } else {
            let n = if (max_price - min_price).abs() < f64::EPSILON {
                0.0
            } else {
                (price - min_price) / (max_price - min_price)
            };
            1.0 - (1.0 + 2.0 * n).ln() / 3.0_f64.ln()
        };
        if weights.quality > 0.6 {
            // Premium keys are floored higher than the rest.
            let floor = if m.is_premium() { 0.6 } else { 0.4 };
            base.max(floor)
        } else {
            base
        }
    };

    cost_score * weights.cost
}

fn latency_contribution(m: &ModelDescriptor, weights: &PriorityWeights, max_latency_ms: f64) -> f64 {
    let lat_score = if max_latency_ms > 0.0 {
        1.0 - m.latency_ms() / max_latency_ms
    } else {
        0.0
    };
    lat_score * weights.latency
}

fn decision_confidence(ranked: &[(&ModelDescriptor, f64)]) -> f64 {
    if ranked.len() < 2 {
        return 1.0;
    }
    let top = ranked[0].1;
    let runner_up = ranked[1].1;
    if runner_up == 0.0 {
        return 1.0;
    }
    (0.5 + 0.5 * (top - runner_up) / top.max(runner_up)).clamp(0.0, 1.0)
}

fn decision_reasoning(
    selected: &ModelDescriptor,
    category: Category,
    weights: &PriorityWeights,
) -> String {
    let priority = match weights.dominant() {
        Some("quality") => format!("best quality for {category} under quality-weighted scoring"),
        Some("cost") => format!("lowest-cost fit for {category}"),
        Some("latency") => format!("fastest fit for {category}"),
        _ => format!("balanced performance for {category}"),
    };

    let mut parts = vec![priority];
    if selected.context_window_tokens > 100_000 {
        parts.push(format!(
            "{}k-token context window",
            selected.context_window_tokens / 1000
        ));
    }
    parts.push(format!(
        "~{} tok/s estimated throughput",
        selected.throughput_tps()
    ));
    parts.join("; ")
}

fn alternative_reason(alt: &ModelDescriptor, selected: &ModelDescriptor, category: Category) -> String {
    let q_alt = alt.quality_prior_or_default(category);
    let q_sel = selected.quality_prior_or_default(category);
    let quality = match q_alt.partial_cmp(&q_sel) {
        Some(Ordering::Greater) => format!("higher quality ({q_alt:.2} vs {q_sel:.2})"),
        Some(Ordering::Less) => format!("lower quality ({q_alt:.2} vs {q_sel:.2})"),
        _ => format!("comparable quality ({q_alt:.2})"),
    };

    let cost = match alt
        .price_input_per_million
        .partial_cmp(&selected.price_input_per_million)
    {
        Some(Ordering::Less) => format!(
            "cheaper (${:.4} vs ${:.4} per 1k in)",
            alt.price_input_per_1k(),
            selected.price_input_per_1k()
        ),
        Some(Ordering::Greater) => format!(
            "pricier (${:.4} vs ${:.4} per 1k in)",
            alt.price_input_per_1k(),
            selected.price_input_per_1k()
        ),
        _ => "same price".to_string(),
    };

    let latency = match alt.latency_ms().partial_cmp(&selected.latency_ms()) {
        Some(Ordering::Less) => format!("faster ({:.0}ms vs {:.0}ms)", alt.latency_ms(), selected.latency_ms()),
        Some(Ordering::Greater) => format!("slower ({:.0}ms vs {:.0}ms)", alt.latency_ms(), selected.latency_ms()),
        _ => "same latency".to_string(),
    };

    format!(
        "{quality}; {cost}; {latency}; {}k context",
        alt.context_window_tokens / 1000
    )
}

// ── Tests ──────────────────────────────────────────────────────────────
