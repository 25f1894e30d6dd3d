//! # Stage: Router Service
//!
//! ## Responsibility
//! End-to-end orchestration of one request: classify the prompt, ask the
//! routing engine for a decision, invoke the selected backend, observe the
//! outcome, and assemble the response. On a backend failure the selected
//! model is marked unavailable and the static fallback model is invoked
//! exactly once.
//!
//! ## Guarantees
//! - At most one fallback attempt per request; no backoff, no same-model
//!   retry.
//! - Within a request, effects happen in order: classify → decide →
//!   invoke → (on failure) mark unavailable → invoke fallback → log.
//! - A classifier outage never fails a request; a truncation never fails a
//!   request; only routing and double backend failure propagate.
//!
//! ## NOT Responsible For
//! - HTTP encoding, CORS, auth (the `web-api` feature is a thin shim)
//! - Durable analytics storage (the request log is in-memory only)

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::analytics::{AnalyticsSummary, RequestLog, RequestLogEntry};
use crate::category::Category;
use crate::classify::{HybridClassification, HybridClassifier, ModelClassifier};
use crate::client::{GenerationOptions, GenerationOutput};
use crate::config::RouterConfig;
use crate::metrics;
use crate::pool::ClientPool;
use crate::registry::{ModelRegistry, Provider};
use crate::routing::{Preset, RoutingDecision, RoutingEngine};
use crate::RouterError;

/// Registry key invoked when the selected backend fails.
pub const STATIC_FALLBACK_KEY: &str = "gpt-4o-mini";

/// Assumed all-in cost per 1 000 tokens for the static fallback, used when
/// pricing the fallback invocation.
const FALLBACK_COST_PER_1K: f64 = 0.000_15;

/// Truncation limit in characters.
const TRUNCATE_LIMIT: usize = 3000;

/// Final answer returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RouterResponse {
    pub text: String,
    pub model_used: String,
    pub category: Category,
    pub classification_confidence: f64,
    pub decision: RoutingDecision,
    pub actual_cost_usd: f64,
    pub actual_latency_ms: u64,
    pub cost_savings_usd: f64,
    pub timestamp: DateTime<Utc>,
    pub was_truncated: bool,
}

/// Admin view of one registry entry, backing the `/models` operation.
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub name: String,
    pub model_name: String,
    pub provider: Provider,
    pub is_available: bool,
    pub notes: String,
}

/// The orchestrator. Construct once, share via `Arc`, call from any number
/// of concurrent handlers.
pub struct RouterService {
    config: RouterConfig,
    registry: Arc<ModelRegistry>,
    engine: RoutingEngine,
    pool: Arc<ClientPool>,
    classifier: HybridClassifier,
    log: RequestLog,
}

impl RouterService {
    /// Wire up the service from its parts.
    ///
    /// The classifier backend is resolved from the pool eagerly; when that
    /// fails (typically a missing credential) the service still comes up
    /// with heuristic-only classification.
    pub fn new(config: RouterConfig, registry: Arc<ModelRegistry>, pool: Arc<ClientPool>) -> Self {
        let classifier = match pool.resolve(&config.classifier_model) {
            Ok(client) => HybridClassifier::new(
                ModelClassifier::new(&config.classifier_model, client)
                    .with_timeout_ms(config.request_timeout_ms),
            ),
            Err(e) => {
                warn!(error = %e, "classifier backend unavailable, heuristic-only classification");
                HybridClassifier::heuristic_only()
            }
        };

        Self {
            engine: RoutingEngine::new(Arc::clone(&registry)),
            config,
            registry,
            pool,
            classifier,
            log: RequestLog::new(),
        }
    }

    /// Route a prompt end to end.
    ///
    /// # Errors
    ///
    /// - [`RouterError::InvalidInput`] for an empty prompt.
    /// - [`RouterError::NoCandidateModels`] when filtering leaves nothing.
    /// - [`RouterError::FallbackExhausted`] when both the selected backend
    ///   and the static fallback fail; the message carries the original
    ///   backend error.
    pub async fn route_prompt(
        &self,
        prompt: &str,
        preset: Option<Preset>,
        user_id: Option<String>,
        session_id: Option<String>,
    ) -> Result<RouterResponse, RouterError> {
        if prompt.trim().is_empty() {
            return Err(RouterError::InvalidInput("prompt must be a non-empty string".into()));
        }
        let preset = preset.unwrap_or(self.config.default_preset);
        let started = Instant::now();

        // 1. Classify. Infallible: outages degrade inside the hybrid.
        let classification = self.classifier.classify(prompt).await;
        let category = classification.category;

        // 2. Decide.
        let decision = match self.engine.decide(prompt, category, preset) {
            Ok(d) => d,
            Err(e) => {
                metrics::inc_error("no_candidates");
                return Err(e);
            }
        };

        info!(
            model = decision.selected_key.as_str(),
            category = %category,
            preset = %preset,
            confidence = decision.confidence,
            "routing prompt"
        );

        // 3. Resolve and invoke; client-resolution failure is a backend
        //    failure and takes the same fallback path.
        let primary = match self.pool.resolve(&decision.selected_key) {
            Ok(client) => {
                let options = GenerationOptions {
                    max_tokens: category.max_output_tokens(),
                    temperature: category.temperature(),
                    timeout_ms: self.config.request_timeout_ms,
                    ..GenerationOptions::default()
                };
                client.generate(prompt, &options).await
            }
            Err(e) => Err(e),
        };

        match primary {
            Ok(output) => {
                let selected = self.registry.get(&decision.selected_key);
                let (price_in, price_out) = selected
                    .map(|d| (d.price_input_per_million, d.price_output_per_million))
                    .unwrap_or((0.0, 0.0));
                let actual_cost_usd = actual_cost(prompt, &output, price_in, price_out);
                let served_by = decision.selected_key.clone();
                Ok(self.assemble_response(
                    prompt,
                    &classification,
                    decision,
                    output,
                    actual_cost_usd,
                    &served_by,
                    None,
                    started,
                    preset,
                    user_id,
                    session_id,
                ))
            }
            Err(primary_error) => {
                self.invoke_fallback(
                    prompt,
                    &classification,
                    decision,
                    primary_error,
                    started,
                    preset,
                    user_id,
                    session_id,
                )
                .await
            }
        }
    }

    /// One static fallback attempt after a primary failure.
    #[allow(clippy::too_many_arguments)]
    async fn invoke_fallback(
        &self,
        prompt: &str,
        classification: &HybridClassification,
        decision: RoutingDecision,
        primary_error: RouterError,
        started: Instant,
        preset: Preset,
        user_id: Option<String>,
        session_id: Option<String>,
    ) -> Result<RouterResponse, RouterError> {
        let failed_key = decision.selected_key.clone();
        warn!(
            model = failed_key.as_str(),
            error = %primary_error,
            "backend failed, marking unavailable and invoking static fallback"
        );
        self.engine.mark_model_unavailable(&failed_key);
        metrics::inc_fallback(&failed_key);

        let options = GenerationOptions {
            max_tokens: decision.category.max_output_tokens(),
            temperature: 0.7,
            timeout_ms: 30_000,
            ..GenerationOptions::default()
        };

        let fallback_result = match self.pool.resolve(STATIC_FALLBACK_KEY) {
            Ok(client) => client.generate(prompt, &options).await,
            Err(e) => Err(e),
        };

        match fallback_result {
            Ok(output) => {
                let input_tokens = output
                    .input_tokens
                    .unwrap_or_else(|| estimate_chars_tokens(prompt));
                let output_tokens = output
                    .output_tokens
                    .unwrap_or_else(|| estimate_chars_tokens(&output.content));
                let actual_cost_usd =
                    (input_tokens + output_tokens) as f64 / 1000.0 * FALLBACK_COST_PER_1K;

                Ok(self.assemble_response(
                    prompt,
                    classification,
                    decision,
                    output,
                    actual_cost_usd,
                    STATIC_FALLBACK_KEY,
                    Some(format!("fallback after: {primary_error}")),
                    started,
                    preset,
                    user_id,
                    session_id,
                ))
            }
            Err(fallback_error) => {
                metrics::inc_error("fallback_exhausted");
                warn!(error = %fallback_error, "static fallback also failed");
                self.log.append(self.log_entry(
                    prompt,
                    classification,
                    &decision,
                    STATIC_FALLBACK_KEY,
                    0.0,
                    started.elapsed().as_millis() as u64,
                    preset,
                    user_id,
                    session_id,
                    Some(primary_error.to_string()),
                ));
                Err(RouterError::FallbackExhausted(primary_error.to_string()))
            }
        }
    }

    /// Truncate, log, meter, and package a successful generation.
    ///
    /// `served_by` is the model that actually produced the text — the
    /// selected model normally, the static fallback after a failure, in
    /// which case `error` carries the original failure for the log.
    #[allow(clippy::too_many_arguments)]
    fn assemble_response(
        &self,
        prompt: &str,
        classification: &HybridClassification,
        decision: RoutingDecision,
        output: GenerationOutput,
        actual_cost_usd: f64,
        served_by: &str,
        error: Option<String>,
        started: Instant,
        preset: Preset,
        user_id: Option<String>,
        session_id: Option<String>,
    ) -> RouterResponse {
        let actual_latency_ms = started.elapsed().as_millis() as u64;
        let (text, was_truncated) = truncate_sentence_aware(&output.content);
        let cost_savings_usd = self.cost_savings(decision.category, actual_cost_usd);

        self.log.append(self.log_entry(
            prompt,
            classification,
            &decision,
            served_by,
            actual_cost_usd,
            actual_latency_ms,
            preset,
            user_id,
            session_id,
            error,
        ));
        metrics::observe_route(
            decision.category.as_str(),
            served_by,
            started.elapsed(),
            actual_cost_usd,
        );

        RouterResponse {
            text,
            model_used: served_by.to_string(),
            category: decision.category,
            classification_confidence: classification.confidence,
            decision,
            actual_cost_usd,
            actual_latency_ms,
            cost_savings_usd,
            timestamp: Utc::now(),
            was_truncated,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn log_entry(
        &self,
        prompt: &str,
        classification: &HybridClassification,
        decision: &RoutingDecision,
        selected_key: &str,
        cost_usd: f64,
        latency_ms: u64,
        preset: Preset,
        user_id: Option<String>,
        session_id: Option<String>,
        error: Option<String>,
    ) -> RequestLogEntry {
        RequestLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            prompt: prompt.to_string(),
            category: decision.category,
            selected_key: selected_key.to_string(),
            provider: decision.provider,
            cost_usd,
            latency_ms,
            quality_score: self
                .registry
                .get(selected_key)
                .map(|d| d.quality_prior_or_default(decision.category))
                .unwrap_or(0.5),
            classification_method: classification.method,
            classification_confidence: classification.confidence,
            preset,
            timestamp: Utc::now(),
            user_id,
            session_id,
            error,
        }
    }

    /// Savings sentinel: the most expensive per-1k figure among models
    /// serving this category, minus the actual spend. Never negative.
    fn cost_savings(&self, category: Category, actual_cost_usd: f64) -> f64 {
        let max_price_per_1k = self
            .registry
            .snapshot()
            .iter()
            .filter(|d| d.quality_prior(category).is_some())
            .map(|d| d.price_input_per_1k())
            .fold(0.0_f64, f64::max);
        (max_price_per_1k - actual_cost_usd).max(0.0)
    }

    // ── Admin operations ───────────────────────────────────────────────

    /// Status of every registered model, for the `/models` view.
    pub fn models(&self) -> Vec<ModelStatus> {
        self.registry
            .snapshot()
            .into_iter()
            .map(|d| ModelStatus {
                notes: format!(
                    "{} | {}k context | ${}/M in, ${}/M out | ~{} tok/s",
                    d.provider,
                    d.context_window_tokens / 1000,
                    d.price_input_per_million,
                    d.price_output_per_million,
                    d.throughput_tps()
                ),
                name: d.key.clone(),
                model_name: d.provider_model_name,
                provider: d.provider,
                is_available: d.available,
            })
            .collect()
    }

    /// Restore every model to available.
    pub fn reset_models(&self) {
        self.registry.reset_all();
    }

    /// The most recent `n` request log entries, newest first.
    pub fn recent_logs(&self, n: usize) -> Vec<RequestLogEntry> {
        self.log.recent(n)
    }

    /// Aggregate analytics over the in-memory log.
    pub fn analytics(&self) -> AnalyticsSummary {
        self.log.metrics()
    }

    /// Drop all analytics entries.
    pub fn reset_analytics(&self) {
        self.log.reset();
    }

    /// The service configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The shared registry.
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }
}

// ── Cost & truncation helpers ──────────────────────────────────────────

/// `⌈chars / 4⌉`, the estimate used when a backend reports no usage.
fn estimate_chars_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}

/// Actual cost from reported-or-estimated token counts and per-million
/// prices.
fn actual_cost(prompt: &str, output: &GenerationOutput, price_in: f64, price_out: f64) -> f64 {
    let input_tokens = output
        .input_tokens
        .unwrap_or_else(|| estimate_chars_tokens(prompt));
    let output_tokens = output
        .output_tokens
        .unwrap_or_else(|| estimate_chars_tokens(&output.content));
    input_tokens as f64 / 1e6 * price_in + output_tokens as f64 / 1e6 * price_out
}

/// Sentence-aware truncation at [`TRUNCATE_LIMIT`] characters.
///
/// Cuts at the last `'.'` or `'\n'` inside the limit, but only when that
/// cut lands in the final fifth of the window; otherwise the text is
/// returned whole. A sentinel at position 0 fails the `> 0.8 × L` test, so
/// such a text is returned untruncated.
fn truncate_sentence_aware(text: &str) -> (String, bool) {
    let total_chars = text.chars().count();
    if total_chars <= TRUNCATE_LIMIT {
        return (text.to_string(), false);
    }

    let prefix: Vec<char> = text.chars().take(TRUNCATE_LIMIT).collect();
    let mut cut: Option<usize> = None;
    for (i, c) in prefix.iter().enumerate() {
        if *c == '.' || *c == '\n' {
            cut = Some(i);
        }
    }

    match cut {
        Some(cut) if cut as f64 > 0.8 * TRUNCATE_LIMIT as f64 => {
            let mut truncated: String = prefix[..=cut].iter().collect();
            truncated.push('…');
            (truncated, true)
        }
        _ => (text.to_string(), false),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StaticClient;

    fn service_with_static_backends(reply: &str) -> RouterService {
        let registry = Arc::new(ModelRegistry::with_defaults());
        let pool = Arc::new(ClientPool::new(Arc::clone(&registry)));
        for d in registry.snapshot() {
            pool.insert(
                &d.key,
                Arc::new(StaticClient::new(d.provider_model_name, reply)),
            );
        }
        RouterService::new(RouterConfig::default(), registry, pool)
    }

    // -- truncation -------------------------------------------------------

    #[test]
    fn test_truncate_short_text_unchanged() {
        let (text, truncated) = truncate_sentence_aware("short answer.");
        assert_eq!(text, "short answer.");
        assert!(!truncated);
    }

    #[test]
    fn test_truncate_exactly_at_limit_unchanged() {
        let input = "a".repeat(TRUNCATE_LIMIT);
        let (text, truncated) = truncate_sentence_aware(&input);
        assert_eq!(text.chars().count(), TRUNCATE_LIMIT);
        assert!(!truncated);
    }

    #[test]
    fn test_truncate_cuts_at_late_sentence_boundary() {
        // A '.' at position 2900 is inside the final fifth of the window.
        let mut input = "a".repeat(2900);
        input.push('.');
        input.push_str(&"b".repeat(500));
        let (text, truncated) = truncate_sentence_aware(&input);
        assert!(truncated);
        assert!(text.ends_with('…'));
        // Nothing beyond position L+1, and the cut is the '.' itself.
        assert_eq!(text.chars().count(), 2902);
        assert_eq!(text.chars().nth(2900), Some('.'));
    }

    #[test]
    fn test_truncate_cuts_at_newline_too() {
        let mut input = "a".repeat(2950);
        input.push('\n');
        input.push_str(&"b".repeat(500));
        let (text, truncated) = truncate_sentence_aware(&input);
        assert!(truncated);
        assert_eq!(text.chars().nth(2950), Some('\n'));
    }

    #[test]
    fn test_truncate_early_boundary_returns_full_text() {
        // Only sentence boundary is at 100 — not > 0.8 × 3000, so no cut.
        let mut input = "a".repeat(100);
        input.push('.');
        input.push_str(&"b".repeat(4000));
        let (text, truncated) = truncate_sentence_aware(&input);
        assert!(!truncated);
        assert_eq!(text.chars().count(), 4101);
    }

    #[test]
    fn test_truncate_boundary_at_position_zero_returns_full_text() {
        let mut input = ".".to_string();
        input.push_str(&"b".repeat(4000));
        let (text, truncated) = truncate_sentence_aware(&input);
        assert!(!truncated);
        assert_eq!(text, input);
    }

    // -- cost helpers -----------------------------------------------------

    #[test]
    fn test_actual_cost_uses_reported_tokens() {
        let output = GenerationOutput {
            content: "irrelevant".to_string(),
            input_tokens: Some(1_000_000),
            output_tokens: Some(500_000),
            cost_usd: None,
            latency_ms: 1,
            timestamp: Utc::now(),
        };
        let cost = actual_cost("prompt", &output, 2.0, 4.0);
        assert!((cost - (2.0 + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_actual_cost_estimates_from_chars_when_unreported() {
        let output = GenerationOutput {
            content: "x".repeat(400), // 100 tokens
            input_tokens: None,
            output_tokens: None,
            cost_usd: None,
            latency_ms: 1,
            timestamp: Utc::now(),
        };
        let prompt = "y".repeat(800); // 200 tokens
        let cost = actual_cost(&prompt, &output, 1.0, 2.0);
        let expected = 200.0 / 1e6 * 1.0 + 100.0 / 1e6 * 2.0;
        assert!((cost - expected).abs() < 1e-12);
    }

    // -- route_prompt -----------------------------------------------------

    #[tokio::test]
    async fn test_empty_prompt_is_invalid_input() {
        let service = service_with_static_backends("hi");
        let result = service.route_prompt("   ", None, None, None).await;
        assert!(matches!(result, Err(RouterError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_route_code_prompt_end_to_end() {
        let service = service_with_static_backends("fn sorted() {}");
        let response = service
            .route_prompt(
                "Write a Python function to sort a list",
                Some(Preset::Balanced),
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(response.model_used, "claude-3-7-sonnet-20250219");
        assert_eq!(response.category, Category::Code);
        assert!(response.classification_confidence >= 0.7);
        assert_eq!(response.text, "fn sorted() {}");
        assert!(!response.was_truncated);
        assert!(response.cost_savings_usd >= 0.0);
        assert_eq!(service.recent_logs(1).len(), 1);
    }

    #[tokio::test]
    async fn test_route_uses_default_preset_when_unspecified() {
        let service = service_with_static_backends("ok");
        let response = service
            .route_prompt("Hello, how are you?", None, None, None)
            .await
            .unwrap();
        assert!((response.decision.priority_weights.quality - 0.45).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_backend_failure_marks_unavailable_and_uses_fallback() {
        let registry = Arc::new(ModelRegistry::with_defaults());
        let pool = Arc::new(ClientPool::new(Arc::clone(&registry)));
        for d in registry.snapshot() {
            let client = StaticClient::new(d.provider_model_name.clone(), "answer");
            let client = if d.key == "gpt-5" { client.failing() } else { client };
            pool.insert(&d.key, Arc::new(client));
        }
        let service = RouterService::new(RouterConfig::default(), Arc::clone(&registry), pool);

        // QUALITY + math routes to gpt-5, which fails.
        let response = service
            .route_prompt("Solve: 2x + 5 = 13", Some(Preset::Quality), None, None)
            .await
            .unwrap();
        assert_eq!(response.model_used, STATIC_FALLBACK_KEY);
        assert!(!registry.get("gpt-5").unwrap().available);

        // Subsequent identical routing must avoid gpt-5 until reset.
        let second = service
            .route_prompt("Solve: 2x + 5 = 13", Some(Preset::Quality), None, None)
            .await
            .unwrap();
        assert_eq!(second.model_used, "claude-3-7-sonnet-20250219");

        service.reset_models();
        assert!(registry.get("gpt-5").unwrap().available);
    }

    #[tokio::test]
    async fn test_double_failure_is_fallback_exhausted_with_original_error() {
        let registry = Arc::new(ModelRegistry::with_defaults());
        let pool = Arc::new(ClientPool::new(Arc::clone(&registry)));
        for d in registry.snapshot() {
            let fail = d.key == "gpt-5" || d.key == STATIC_FALLBACK_KEY;
            let client = StaticClient::new(d.provider_model_name.clone(), "answer");
            let client = if fail { client.failing() } else { client };
            pool.insert(&d.key, Arc::new(client));
        }
        let service = RouterService::new(RouterConfig::default(), Arc::clone(&registry), pool);

        let result = service
            .route_prompt("Solve: 2x + 5 = 13", Some(Preset::Quality), None, None)
            .await;
        match result {
            Err(RouterError::FallbackExhausted(msg)) => {
                assert!(msg.contains("gpt-5"), "original error must be preserved: {msg}")
            }
            other => panic!("expected FallbackExhausted, got {other:?}"),
        }
        // Terminal failures are logged too.
        let logs = service.recent_logs(1);
        assert_eq!(logs.len(), 1);
        assert!(logs[0].error.is_some());
    }

    #[tokio::test]
    async fn test_fallback_cost_uses_assumed_rate() {
        let registry = Arc::new(ModelRegistry::with_defaults());
        let pool = Arc::new(ClientPool::new(Arc::clone(&registry)));
        for d in registry.snapshot() {
            let client = StaticClient::new(d.provider_model_name.clone(), "w ".repeat(200));
            let client = if d.key == "gpt-5" { client.failing() } else { client };
            pool.insert(&d.key, Arc::new(client));
        }
        let service = RouterService::new(RouterConfig::default(), registry, pool);

        let response = service
            .route_prompt("Solve: 2x + 5 = 13", Some(Preset::Quality), None, None)
            .await
            .unwrap();
        // StaticClient reports no usage: prompt 18 chars → 5 tokens, reply
        // 400 chars → 100 tokens; (105 / 1000) × 0.00015.
        let expected = 105.0 / 1000.0 * 0.000_15;
        assert!(
            (response.actual_cost_usd - expected).abs() < 1e-12,
            "got {}",
            response.actual_cost_usd
        );
    }

    #[tokio::test]
    async fn test_long_reply_is_truncated_in_response() {
        let mut reply = "a".repeat(2900);
        reply.push('.');
        reply.push_str(&"b".repeat(2000));
        let service = service_with_static_backends(&reply);
        let response = service
            .route_prompt("Hello, how are you?", Some(Preset::Latency), None, None)
            .await
            .unwrap();
        assert!(response.was_truncated);
        assert!(response.text.ends_with('…'));
    }

    #[tokio::test]
    async fn test_analytics_accumulate_per_request() {
        let service = service_with_static_backends("ok");
        for _ in 0..3 {
            service
                .route_prompt("Hello, how are you?", None, None, None)
                .await
                .unwrap();
        }
        let summary = service.analytics();
        assert_eq!(summary.total_requests, 3);
        assert_eq!(summary.category_distribution["qa"], 3);
        service.reset_analytics();
        assert_eq!(service.analytics().total_requests, 0);
    }

    #[tokio::test]
    async fn test_models_view_reflects_availability() {
        let service = service_with_static_backends("ok");
        service.registry().mark_unavailable("gpt-5");
        let models = service.models();
        assert_eq!(models.len(), 5);
        let gpt5 = models.iter().find(|m| m.name == "gpt-5").unwrap();
        assert!(!gpt5.is_available);
        assert!(gpt5.notes.contains("context"));
        service.reset_models();
        assert!(service.models().iter().all(|m| m.is_available));
    }

    #[tokio::test]
    async fn test_oversize_prompt_routes_to_gemini() {
        let service = service_with_static_backends("summary");
        let huge = "lorem ipsum dolor sit amet ".repeat(40_000);
        let response = service
            .route_prompt(&huge, Some(Preset::Balanced), None, None)
            .await
            .unwrap();
        assert_eq!(response.model_used, "gemini-1.5-flash");
    }
}
