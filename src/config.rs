//! Router configuration from the environment.
//!
//! Read once at startup. Every knob has a documented default and a hard
//! range; out-of-range values are clamped rather than rejected so a typo'd
//! deployment still comes up with sane behaviour.
//!
//! Provider API keys are deliberately *not* read here: each backend client
//! reads its own credential at construction, so a missing key disables
//! that provider's models without touching the rest.

use serde::{Deserialize, Serialize};

use crate::registry::Provider;
use crate::routing::Preset;

// ── Default value functions ────────────────────────────────────────────

/// Default classification confidence threshold (reserved for future use;
/// the hybrid classifier's heuristic cutoff of 0.7 is hard-coded).
fn default_classification_confidence_threshold() -> f64 {
    0.6
}

/// Default maximum retry attempts (the current policy uses exactly one
/// fallback attempt).
fn default_max_retry_attempts() -> u32 {
    2
}

/// Default backend request timeout: 30 000 ms.
fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Default backend key for the model classifier.
fn default_classifier_model() -> String {
    "gpt-4o-mini".to_string()
}

// ── RouterConfig ───────────────────────────────────────────────────────

/// Environment-derived configuration for the router service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouterConfig {
    /// `CLASSIFICATION_CONFIDENCE_THRESHOLD` ∈ [0, 1]. Default 0.6.
    #[serde(default = "default_classification_confidence_threshold")]
    pub classification_confidence_threshold: f64,

    /// `MAX_RETRY_ATTEMPTS` ∈ [1, 5]. Default 2.
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,

    /// `REQUEST_TIMEOUT_MS` ∈ [5000, 120000]. Default 30000.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// `DEFAULT_PRIORITY_PRESET` ∈ {balanced, quality, cost, latency}.
    #[serde(default)]
    pub default_preset: Preset,

    /// `CLASSIFIER_MODEL`: registry key of the classification backend.
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            classification_confidence_threshold: default_classification_confidence_threshold(),
            max_retry_attempts: default_max_retry_attempts(),
            request_timeout_ms: default_request_timeout_ms(),
            default_preset: Preset::default(),
            classifier_model: default_classifier_model(),
        }
    }
}

impl RouterConfig {
    /// Read the configuration from the process environment.
    ///
    /// Unparseable values fall back to their defaults; parseable but
    /// out-of-range values are clamped into range.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = read_f64("CLASSIFICATION_CONFIDENCE_THRESHOLD") {
            config.classification_confidence_threshold = v.clamp(0.0, 1.0);
        }
        if let Some(v) = read_u64("MAX_RETRY_ATTEMPTS") {
            config.max_retry_attempts = v.clamp(1, 5) as u32;
        }
        if let Some(v) = read_u64("REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = v.clamp(5_000, 120_000);
        }
        if let Ok(v) = std::env::var("DEFAULT_PRIORITY_PRESET") {
            if let Some(preset) = Preset::from_name(&v) {
                config.default_preset = preset;
            } else {
                tracing::warn!(value = v.as_str(), "unknown DEFAULT_PRIORITY_PRESET, keeping balanced");
            }
        }
        if let Ok(v) = std::env::var("CLASSIFIER_MODEL") {
            if !v.trim().is_empty() {
                config.classifier_model = v.trim().to_string();
            }
        }

        config
    }

    /// Providers whose credentials are present in the environment.
    pub fn configured_providers() -> Vec<Provider> {
        [
            (Provider::OpenAi, "OPENAI_API_KEY"),
            (Provider::Anthropic, "ANTHROPIC_API_KEY"),
            (Provider::Google, "GOOGLE_API_KEY"),
            (Provider::HuggingFace, "HUGGINGFACE_API_KEY"),
        ]
        .into_iter()
        .filter(|(_, var)| std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false))
        .map(|(p, _)| p)
        .collect()
    }
}

fn read_f64(var: &str) -> Option<f64> {
    std::env::var(var).ok()?.trim().parse().ok()
}

fn read_u64(var: &str) -> Option<u64> {
    std::env::var(var).ok()?.trim().parse().ok()
}

// ── Tests ──────────────────────────────────────────────────────────────
