//! In-memory request analytics.
//!
//! Every routed request — fallback successes and terminal failures
//! included — is appended to a bounded ring buffer. When the buffer is
//! full the oldest entry is evicted; append and evict happen under one
//! lock so concurrent handlers cannot overshoot the capacity. Durable
//! storage is somebody else's job; this log only ever lives in memory.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::category::Category;
use crate::classify::Method;
use crate::registry::Provider;
use crate::routing::Preset;

/// Default ring buffer capacity.
pub const DEFAULT_CAPACITY: usize = 1000;

/// One routed request, as recorded for analytics.
#[derive(Debug, Clone, Serialize)]
pub struct RequestLogEntry {
    pub id: String,
    pub prompt: String,
    pub category: Category,
    pub selected_key: String,
    pub provider: Provider,
    pub cost_usd: f64,
    pub latency_ms: u64,
    pub quality_score: f64,
    pub classification_method: Method,
    pub classification_confidence: f64,
    pub preset: Preset,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate view over the current buffer contents.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub total_requests: u64,
    pub total_cost_usd: f64,
    pub average_latency_ms: f64,
    /// Requests per selected model key.
    pub usage_by_model: HashMap<String, u64>,
    /// Requests per category label.
    pub category_distribution: HashMap<String, u64>,
    /// Naive savings estimate: Σ 0.2 × cost. A reporting sentinel, not an
    /// economic quantity.
    pub estimated_savings_usd: f64,
    /// Fraction of entries with classification confidence above 0.6.
    pub classification_accuracy: f64,
}

/// Bounded insertion-order request log.
pub struct RequestLog {
    entries: Mutex<VecDeque<RequestLogEntry>>,
    capacity: usize,
}

impl RequestLog {
    /// Create a log with the default capacity of 1000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a log with a custom capacity (tests use small ones).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity: capacity.max(1),
        }
    }

    /// Append an entry, evicting the oldest when full. Append and evict
    /// are atomic with respect to concurrent appends.
    pub fn append(&self, entry: RequestLogEntry) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// The most recent `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<RequestLogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.iter().rev().take(n).cloned().collect())
            .unwrap_or_default()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregate the current buffer into a summary.
    pub fn metrics(&self) -> AnalyticsSummary {
        let Ok(entries) = self.entries.lock() else {
            return AnalyticsSummary::empty();
        };

        let total = entries.len() as u64;
        if total == 0 {
            return AnalyticsSummary::empty();
        }

        let mut total_cost = 0.0;
        let mut total_latency = 0u64;
        let mut usage_by_model: HashMap<String, u64> = HashMap::new();
        let mut category_distribution: HashMap<String, u64> = HashMap::new();
        let mut confident = 0u64;

        for e in entries.iter() {
            total_cost += e.cost_usd;
            total_latency += e.latency_ms;
            *usage_by_model.entry(e.selected_key.clone()).or_default() += 1;
            *category_distribution
                .entry(e.category.to_string())
                .or_default() += 1;
            if e.classification_confidence > 0.6 {
                confident += 1;
            }
        }

        AnalyticsSummary {
            total_requests: total,
            total_cost_usd: total_cost,
            average_latency_ms: total_latency as f64 / total as f64,
            usage_by_model,
            category_distribution,
            estimated_savings_usd: 0.2 * total_cost,
            classification_accuracy: confident as f64 / total as f64,
        }
    }

    /// Drop every entry.
    pub fn reset(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsSummary {
    fn empty() -> Self {
        Self {
            total_requests: 0,
            total_cost_usd: 0.0,
            average_latency_ms: 0.0,
            usage_by_model: HashMap::new(),
            category_distribution: HashMap::new(),
            estimated_savings_usd: 0.0,
            classification_accuracy: 0.0,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
