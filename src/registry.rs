//! # Model registry
//!
//! ## Responsibility
//! Hold the table of known model descriptors (provider, pricing, latency
//! prior, per-category quality priors) and the only piece of process-wide
//! mutable routing state: the per-model availability flag.
//!
//! ## Guarantees
//! - Descriptor metadata is immutable after construction; only `available`
//!   changes, and only through [`ModelRegistry::mark_unavailable`] and
//!   [`ModelRegistry::reset_all`].
//! - [`ModelRegistry::snapshot`] returns a consistent copy: a routing
//!   decision never observes a half-applied availability change.
//! - Iteration order is insertion order, so score ties break stably.
//!
//! ## NOT Responsible For
//! - Scoring or filtering (that belongs to `routing::engine`)
//! - Talking to backends (that belongs to `client` / `pool`)

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::RouterError;

/// Remote LLM provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
    HuggingFace,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Google => write!(f, "google"),
            Provider::HuggingFace => write!(f, "huggingface"),
        }
    }
}

/// Static description of one routable model.
///
/// Everything except `available` is fixed at construction. A category that
/// is absent from `quality_priors` means the model does not serve that
/// category at all — this drives the capability filter in the routing
/// engine, not a default score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Stable registry key, e.g. `"gpt-4o-mini"`.
    pub key: String,
    /// Wire-level model name as the provider API expects it. May differ
    /// from `key` (e.g. `"models/gemini-1.5-flash"`).
    pub provider_model_name: String,
    /// Which provider hosts this model.
    pub provider: Provider,
    /// Maximum prompt context in tokens.
    pub context_window_tokens: u64,
    /// Input price in USD per million tokens.
    pub price_input_per_million: f64,
    /// Output price in USD per million tokens.
    pub price_output_per_million: f64,
    /// Latency prior: median seconds to completion.
    pub latency_p50_seconds: f64,
    /// Per-category quality belief in `[0, 1]`. Missing category = not served.
    pub quality_priors: HashMap<Category, f64>,
    /// Whether the model is currently routable. Defaults to true.
    pub available: bool,
}

impl ModelDescriptor {
    /// Latency prior in milliseconds.
    pub fn latency_ms(&self) -> f64 {
        self.latency_p50_seconds * 1000.0
    }

    /// Rough throughput figure derived from the latency prior.
    pub fn throughput_tps(&self) -> u64 {
        (1000.0 / self.latency_p50_seconds).round() as u64
    }

    /// Input price in USD per thousand tokens.
    pub fn price_input_per_1k(&self) -> f64 {
        self.price_input_per_million / 1000.0
    }

    /// Output price in USD per thousand tokens.
    pub fn price_output_per_1k(&self) -> f64 {
        self.price_output_per_million / 1000.0
    }

    /// Quality prior for a category, or `None` when the model does not
    /// serve it.
    pub fn quality_prior(&self, category: Category) -> Option<f64> {
        self.quality_priors.get(&category).copied()
    }

    /// Quality prior with the 0.5 default for served-but-unscored lookups.
    pub fn quality_prior_or_default(&self, category: Category) -> f64 {
        self.quality_prior(category).unwrap_or(0.5)
    }

    /// Whether the scoring function treats this model as premium tier.
    /// Keyed on the model name substring, not a descriptor field.
    pub fn is_premium(&self) -> bool {
        self.key.contains("claude") || self.key.contains("gpt-5")
    }

    /// Validate descriptor invariants, returning one message per violation.
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.key.is_empty() {
            errors.push("model key must be non-empty".to_string());
        }
        if self.context_window_tokens == 0 {
            errors.push(format!("{}: context window must be positive", self.key));
        }
        if !(self.latency_p50_seconds.is_finite() && self.latency_p50_seconds > 0.0) {
            errors.push(format!(
                "{}: latency_p50_seconds must be finite and positive, got {}",
                self.key, self.latency_p50_seconds
            ));
        }
        for (name, price) in [
            ("price_input_per_million", self.price_input_per_million),
            ("price_output_per_million", self.price_output_per_million),
        ] {
            if !(price.is_finite() && price >= 0.0) {
                errors.push(format!(
                    "{}: {name} must be finite and non-negative, got {price}",
                    self.key
                ));
            }
        }
        for (cat, prior) in &self.quality_priors {
            if !(0.0..=1.0).contains(prior) {
                errors.push(format!(
                    "{}: quality prior for {cat} must be in [0, 1], got {prior}",
                    self.key
                ));
            }
        }
        errors
    }
}

// ── Registry ───────────────────────────────────────────────────────────

/// Process-wide model table with mutable availability.
///
/// Thread-safe: the descriptor list lives behind an interior `RwLock`.
/// Reads take a full snapshot so a decision works against one consistent
/// view; last-writer-wins semantics apply between concurrent flips.
#[derive(Debug)]
pub struct ModelRegistry {
    models: RwLock<Vec<ModelDescriptor>>,
}

impl ModelRegistry {
    /// Build a registry from descriptors, validating uniqueness and value
    /// invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Config`] listing every violated constraint.
    pub fn new(descriptors: Vec<ModelDescriptor>) -> Result<Self, RouterError> {
        let mut errors = Vec::new();
        let mut keys = std::collections::HashSet::new();
        let mut wire_names = std::collections::HashSet::new();

        for d in &descriptors {
            errors.extend(d.validate());
            if !keys.insert(d.key.clone()) {
                errors.push(format!("duplicate model key: {}", d.key));
            }
            if !wire_names.insert(d.provider_model_name.clone()) {
                errors.push(format!(
                    "duplicate provider model name: {}",
                    d.provider_model_name
                ));
            }
        }

        if !errors.is_empty() {
            return Err(RouterError::Config(errors.join("; ")));
        }

        Ok(Self {
            models: RwLock::new(descriptors),
        })
    }

    /// Build the registry with the default five-model catalogue.
    pub fn with_defaults() -> Self {
        // The catalogue passes its own validation; unwrap_or keeps the
        // non-panicking contract if it ever stops doing so.
        Self::new(default_catalogue()).unwrap_or(Self {
            models: RwLock::new(Vec::new()),
        })
    }

    /// Consistent copy of every descriptor, in registry order.
    pub fn snapshot(&self) -> Vec<ModelDescriptor> {
        self.models.read().map(|g| g.clone()).unwrap_or_default()
    }

    /// Look up one descriptor by registry key.
    pub fn get(&self, key: &str) -> Option<ModelDescriptor> {
        self.models
            .read()
            .ok()
            .and_then(|g| g.iter().find(|d| d.key == key).cloned())
    }

    /// Look up one descriptor by provider-native model name.
    pub fn get_by_provider_name(&self, name: &str) -> Option<ModelDescriptor> {
        self.models
            .read()
            .ok()
            .and_then(|g| g.iter().find(|d| d.provider_model_name == name).cloned())
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.read().map(|g| g.len()).unwrap_or(0)
    }

    /// Whether the registry holds no models.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flip a model's availability flag to false. Returns `true` if the key
    /// was present. The flag stays false until [`ModelRegistry::reset_all`].
    pub fn mark_unavailable(&self, key: &str) -> bool {
        let Ok(mut guard) = self.models.write() else {
            return false;
        };
        match guard.iter_mut().find(|d| d.key == key) {
            Some(d) => {
                if d.available {
                    tracing::warn!(model = key, "marking model unavailable");
                }
                d.available = false;
                true
            }
            None => false,
        }
    }

    /// Restore every model's availability flag to true. Idempotent.
    pub fn reset_all(&self) {
        if let Ok(mut guard) = self.models.write() {
            for d in guard.iter_mut() {
                d.available = true;
            }
        }
        tracing::info!("all models reset to available");
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ── Default catalogue ──────────────────────────────────────────────────

fn priors(entries: &[(Category, f64)]) -> HashMap<Category, f64> {
    entries.iter().copied().collect()
}

/// The built-in five-model catalogue.
///
/// Categories absent from a model's prior map are categories the model is
/// not routed for: code and math stay on the premium pair (plus the free
/// open-weights model for math), which is what keeps quality-priority
/// routing deterministic.
pub fn default_catalogue() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor {
            key: "gpt-4o-mini".to_string(),
            provider_model_name: "gpt-4o-mini".to_string(),
            provider: Provider::OpenAi,
            context_window_tokens: 128_000,
            price_input_per_million: 0.15,
            price_output_per_million: 0.60,
            latency_p50_seconds: 0.46,
            quality_priors: priors(&[
                (Category::Summarize, 0.72),
                (Category::Qa, 0.86),
                (Category::Creative, 0.80),
                (Category::Unknown, 0.75),
            ]),
            available: true,
        },
        ModelDescriptor {
            key: "gpt-5".to_string(),
            provider_model_name: "gpt-5".to_string(),
            provider: Provider::OpenAi,
            context_window_tokens: 200_000,
            price_input_per_million: 10.0,
            price_output_per_million: 30.0,
            latency_p50_seconds: 7.52,
            quality_priors: priors(&[
                (Category::Code, 0.99),
                (Category::Summarize, 0.96),
                (Category::Qa, 0.98),
                (Category::Creative, 0.97),
                (Category::MathReasoning, 0.99),
                (Category::Unknown, 0.85),
            ]),
            available: true,
        },
        ModelDescriptor {
            key: "claude-3-7-sonnet-20250219".to_string(),
            provider_model_name: "claude-3-7-sonnet-20250219".to_string(),
            provider: Provider::Anthropic,
            context_window_tokens: 200_000,
            price_input_per_million: 3.0,
            price_output_per_million: 15.0,
            latency_p50_seconds: 7.45,
            quality_priors: priors(&[
                (Category::Code, 0.98),
                (Category::Summarize, 0.93),
                (Category::Qa, 0.96),
                (Category::Creative, 0.96),
                (Category::MathReasoning, 0.95),
                (Category::Unknown, 0.80),
            ]),
            available: true,
        },
        ModelDescriptor {
            key: "gemini-1.5-flash".to_string(),
            provider_model_name: "models/gemini-1.5-flash".to_string(),
            provider: Provider::Google,
            context_window_tokens: 1_050_000,
            price_input_per_million: 0.075,
            price_output_per_million: 0.30,
            latency_p50_seconds: 0.45,
            quality_priors: priors(&[
                (Category::Summarize, 0.65),
                (Category::Qa, 0.87),
                (Category::Creative, 0.84),
                (Category::Unknown, 0.72),
            ]),
            available: true,
        },
        ModelDescriptor {
            key: "gpt-oss-20b".to_string(),
            provider_model_name: "openai/gpt-oss-20b".to_string(),
            provider: Provider::HuggingFace,
            context_window_tokens: 131_072,
            price_input_per_million: 0.0,
            price_output_per_million: 0.0,
            latency_p50_seconds: 0.95,
            quality_priors: priors(&[
                (Category::Summarize, 0.86),
                (Category::Qa, 0.72),
                (Category::Creative, 0.78),
                (Category::MathReasoning, 0.30),
                (Category::Unknown, 0.60),
            ]),
            available: true,
        },
    ]
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(key: &str, wire: &str) -> ModelDescriptor {
        ModelDescriptor {
            key: key.to_string(),
            provider_model_name: wire.to_string(),
            provider: Provider::OpenAi,
            context_window_tokens: 8192,
            price_input_per_million: 1.0,
            price_output_per_million: 2.0,
            latency_p50_seconds: 0.5,
            quality_priors: priors(&[(Category::Qa, 0.8)]),
            available: true,
        }
    }

    // -- descriptor derivations ------------------------------------------

    #[test]
    fn test_latency_ms_scales_seconds() {
        let d = descriptor("m", "m-wire");
        assert!((d.latency_ms() - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_throughput_is_rounded_inverse_latency() {
        let mut d = descriptor("m", "m-wire");
        d.latency_p50_seconds = 0.46;
        assert_eq!(d.throughput_tps(), 2174);
        d.latency_p50_seconds = 7.52;
        assert_eq!(d.throughput_tps(), 133);
    }

    #[test]
    fn test_per_1k_prices() {
        let d = descriptor("m", "m-wire");
        assert!((d.price_input_per_1k() - 0.001).abs() < 1e-12);
        assert!((d.price_output_per_1k() - 0.002).abs() < 1e-12);
    }

    #[test]
    fn test_quality_prior_missing_category_is_none() {
        let d = descriptor("m", "m-wire");
        assert!(d.quality_prior(Category::Code).is_none());
        assert!((d.quality_prior_or_default(Category::Code) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_premium_detection_is_substring_based() {
        assert!(descriptor("claude-3-7-sonnet-20250219", "w1").is_premium());
        assert!(descriptor("gpt-5", "w2").is_premium());
        assert!(!descriptor("gpt-4o-mini", "w3").is_premium());
        assert!(!descriptor("gemini-1.5-flash", "w4").is_premium());
    }

    // -- construction & validation ---------------------------------------

    #[test]
    fn test_new_rejects_duplicate_keys() {
        let result = ModelRegistry::new(vec![descriptor("a", "w1"), descriptor("a", "w2")]);
        assert!(matches!(result, Err(RouterError::Config(msg)) if msg.contains("duplicate model key")));
    }

    #[test]
    fn test_new_rejects_duplicate_provider_names() {
        let result = ModelRegistry::new(vec![descriptor("a", "w"), descriptor("b", "w")]);
        assert!(
            matches!(result, Err(RouterError::Config(msg)) if msg.contains("duplicate provider model name"))
        );
    }

    #[test]
    fn test_new_rejects_zero_latency() {
        let mut d = descriptor("a", "w");
        d.latency_p50_seconds = 0.0;
        assert!(ModelRegistry::new(vec![d]).is_err());
    }

    #[test]
    fn test_new_rejects_negative_price() {
        let mut d = descriptor("a", "w");
        d.price_input_per_million = -0.5;
        assert!(ModelRegistry::new(vec![d]).is_err());
    }

    #[test]
    fn test_new_rejects_out_of_range_prior() {
        let mut d = descriptor("a", "w");
        d.quality_priors.insert(Category::Code, 1.5);
        assert!(ModelRegistry::new(vec![d]).is_err());
    }

    #[test]
    fn test_default_catalogue_is_valid() {
        let registry = ModelRegistry::with_defaults();
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_default_catalogue_all_available() {
        let registry = ModelRegistry::with_defaults();
        assert!(registry.snapshot().iter().all(|d| d.available));
    }

    // -- availability mutation -------------------------------------------

    #[test]
    fn test_mark_unavailable_flips_flag_until_reset() {
        let registry = ModelRegistry::with_defaults();
        assert!(registry.mark_unavailable("gpt-5"));
        assert!(!registry.get("gpt-5").unwrap().available);

        // Stays false across repeated marks
        assert!(registry.mark_unavailable("gpt-5"));
        assert!(!registry.get("gpt-5").unwrap().available);

        registry.reset_all();
        assert!(registry.get("gpt-5").unwrap().available);
    }

    #[test]
    fn test_mark_unavailable_unknown_key_returns_false() {
        let registry = ModelRegistry::with_defaults();
        assert!(!registry.mark_unavailable("no-such-model"));
    }

    #[test]
    fn test_reset_all_is_idempotent() {
        let registry = ModelRegistry::with_defaults();
        registry.mark_unavailable("gpt-5");
        registry.reset_all();
        registry.reset_all();
        assert!(registry.snapshot().iter().all(|d| d.available));
    }

    #[test]
    fn test_snapshot_is_independent_of_later_mutation() {
        let registry = ModelRegistry::with_defaults();
        let snap = registry.snapshot();
        registry.mark_unavailable("gpt-5");
        assert!(snap.iter().find(|d| d.key == "gpt-5").unwrap().available);
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let registry = ModelRegistry::with_defaults();
        let keys: Vec<_> = registry.snapshot().into_iter().map(|d| d.key).collect();
        assert_eq!(
            keys,
            vec![
                "gpt-4o-mini",
                "gpt-5",
                "claude-3-7-sonnet-20250219",
                "gemini-1.5-flash",
                "gpt-oss-20b"
            ]
        );
    }

    #[test]
    fn test_lookup_by_provider_name_alias() {
        let registry = ModelRegistry::with_defaults();
        let d = registry.get_by_provider_name("models/gemini-1.5-flash").unwrap();
        assert_eq!(d.key, "gemini-1.5-flash");
        assert!(registry.get_by_provider_name("gemini-1.5-flash").is_none());
    }

    #[test]
    fn test_concurrent_marks_do_not_lose_writes() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(ModelRegistry::with_defaults());
        let mut handles = Vec::new();
        for key in ["gpt-5", "gpt-4o-mini", "gemini-1.5-flash"] {
            let r = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    r.mark_unavailable(key);
                }
            }));
        }
        for h in handles {
            let _ = h.join();
        }
        assert!(!registry.get("gpt-5").unwrap().available);
        assert!(!registry.get("gpt-4o-mini").unwrap().available);
        assert!(!registry.get("gemini-1.5-flash").unwrap().available);
        assert!(registry.get("claude-3-7-sonnet-20250219").unwrap().available);
    }
}
