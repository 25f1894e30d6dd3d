//! Prometheus metrics for the router.
//!
//! ## Usage
//!
//! Call [`init_metrics`] once at process startup **before** serving
//! requests. The helper functions (`observe_route`, `inc_fallback`, …) are
//! no-ops if `init_metrics` was never called, so the router is always safe
//! to run — observability simply degrades gracefully.
//!
//! ## Metrics Exposed
//!
//! | Name | Type | Labels |
//! |------|------|--------|
//! | `router_requests_total` | Counter | `category`, `model` |
//! | `router_fallbacks_total` | Counter | `model` |
//! | `router_errors_total` | Counter | `kind` |
//! | `router_route_duration_seconds` | Histogram | — |
//! | `router_request_cost_usd` | Histogram | — |

use crate::RouterError;
use prometheus::{CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use std::sync::OnceLock;
use std::time::Duration;

// ── Internal metrics bundle ────────────────────────────────────────────────

/// All Prometheus metrics for the router, bundled together so they can be
/// stored in a single [`OnceLock`] and initialised atomically.
pub struct Metrics {
    /// Prometheus registry that owns all metric descriptors.
    pub registry: Registry,
    /// Routed requests by category and selected model.
    pub requests_total: CounterVec,
    /// Fallback invocations by originally selected model.
    pub fallbacks_total: CounterVec,
    /// Errors by kind.
    pub errors_total: CounterVec,
    /// End-to-end route latency.
    pub route_duration: Histogram,
    /// Per-request actual cost in USD.
    pub request_cost: Histogram,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

// ── Initialisation ─────────────────────────────────────────────────────────

/// Initialise all Prometheus metrics and register them with a private
/// registry. Calling it a second time is a no-op (returns `Ok(())`).
///
/// # Errors
///
/// Returns [`RouterError::Config`] if metric construction or registry
/// registration fails (e.g., duplicate descriptor names).
pub fn init_metrics() -> Result<(), RouterError> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let requests_total = CounterVec::new(
        Opts::new("router_requests_total", "Routed requests"),
        &["category", "model"],
    )
    .map_err(|e| RouterError::Config(format!("metrics init failed: {e}")))?;
    registry
        .register(Box::new(requests_total.clone()))
        .map_err(|e| RouterError::Config(format!("metrics registration failed: {e}")))?;

    let fallbacks_total = CounterVec::new(
        Opts::new(
            "router_fallbacks_total",
            "Fallback invocations after a primary backend failure",
        ),
        &["model"],
    )
    .map_err(|e| RouterError::Config(format!("metrics init failed: {e}")))?;
    registry
        .register(Box::new(fallbacks_total.clone()))
        .map_err(|e| RouterError::Config(format!("metrics registration failed: {e}")))?;

    let errors_total = CounterVec::new(
        Opts::new("router_errors_total", "Errors by kind"),
        &["kind"],
    )
    .map_err(|e| RouterError::Config(format!("metrics init failed: {e}")))?;
    registry
        .register(Box::new(errors_total.clone()))
        .map_err(|e| RouterError::Config(format!("metrics registration failed: {e}")))?;

    let route_duration = Histogram::with_opts(HistogramOpts::new(
        "router_route_duration_seconds",
        "End-to-end routing duration",
    ))
    .map_err(|e| RouterError::Config(format!("metrics init failed: {e}")))?;
    registry
        .register(Box::new(route_duration.clone()))
        .map_err(|e| RouterError::Config(format!("metrics registration failed: {e}")))?;

    let request_cost = Histogram::with_opts(
        HistogramOpts::new("router_request_cost_usd", "Actual per-request cost")
            .buckets(vec![0.0001, 0.001, 0.01, 0.05, 0.1, 0.5, 1.0]),
    )
    .map_err(|e| RouterError::Config(format!("metrics init failed: {e}")))?;
    registry
        .register(Box::new(request_cost.clone()))
        .map_err(|e| RouterError::Config(format!("metrics registration failed: {e}")))?;

    // If another thread raced us, the first one wins — both initialisations
    // produce identical metric descriptors, so neither outcome is incorrect.
    let _ = METRICS.set(Metrics {
        registry,
        requests_total,
        fallbacks_total,
        errors_total,
        route_duration,
        request_cost,
    });

    Ok(())
}

/// Return a reference to the initialised [`Metrics`], or `None` if
/// [`init_metrics`] has not been called yet.
fn metrics() -> Option<&'static Metrics> {
    METRICS.get()
}

// ── Public helper functions ────────────────────────────────────────────────

/// Record one completed route: request counter, duration, and cost.
///
/// No-op if metrics have not been initialised.
pub fn observe_route(category: &str, model: &str, duration: Duration, cost_usd: f64) {
    if let Some(m) = metrics() {
        if let Ok(c) = m
            .requests_total
            .get_metric_with_label_values(&[category, model])
        {
            c.inc();
        }
        m.route_duration.observe(duration.as_secs_f64());
        m.request_cost.observe(cost_usd);
    }
}

/// Increment the fallback counter for the model whose primary call failed.
///
/// No-op if metrics have not been initialised.
pub fn inc_fallback(model: &str) {
    if let Some(m) = metrics() {
        if let Ok(c) = m.fallbacks_total.get_metric_with_label_values(&[model]) {
            c.inc();
        }
    }
}

/// Increment the error counter for an error kind.
///
/// No-op if metrics have not been initialised.
pub fn inc_error(kind: &str) {
    if let Some(m) = metrics() {
        if let Ok(c) = m.errors_total.get_metric_with_label_values(&[kind]) {
            c.inc();
        }
    }
}

/// Gather and encode all metrics in the Prometheus text exposition format.
///
/// Returns an empty string if metrics have not been initialised or if
/// encoding fails. Observability degrades gracefully rather than panicking.
pub fn gather_metrics() -> String {
    let Some(m) = metrics() else {
        return String::new();
    };
    let families = m.registry.gather();
    if families.is_empty() {
        return String::new();
    }
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics_succeeds_and_is_idempotent() {
        assert!(init_metrics().is_ok());
        assert!(init_metrics().is_ok(), "second call must be a no-op");
    }

    #[test]
    fn test_helpers_before_init_do_not_panic() {
        // The global OnceLock may or may not be set depending on test
        // order; either way these must not panic.
        observe_route("qa", "gpt-4o-mini", Duration::from_millis(5), 0.001);
        inc_fallback("gpt-5");
        inc_error("backend");
    }

    #[test]
    fn test_gather_metrics_returns_text_format_after_observation() {
        let _ = init_metrics();
        observe_route("code", "claude-3-7-sonnet-20250219", Duration::from_millis(3), 0.01);
        let text = gather_metrics();
        assert!(text.contains("router_requests_total"));
        assert!(text.contains("router_route_duration_seconds"));
    }

    #[test]
    fn test_fallback_counter_labelled_by_model() {
        let _ = init_metrics();
        inc_fallback("gpt-5");
        let text = gather_metrics();
        assert!(text.contains("router_fallbacks_total"));
        assert!(text.contains("gpt-5"));
    }

    #[test]
    fn test_error_counter_labelled_by_kind() {
        let _ = init_metrics();
        inc_error("no_candidates");
        let text = gather_metrics();
        assert!(text.contains("router_errors_total"));
        assert!(text.contains("no_candidates"));
    }
}
