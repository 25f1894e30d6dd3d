//! Prompt categories and per-category generation profiles.
//!
//! The category set is closed: every classifier output is one of the six
//! members below, and [`Category::Unknown`] is the sink for anything the
//! classifiers cannot place. Each category carries a keyword list that
//! drives the heuristic classifier and generation defaults that drive the
//! router service.

use serde::{Deserialize, Serialize};

/// Semantic label for a prompt, drawn from a fixed closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Programming: writing, debugging, or explaining code.
    Code,
    /// Condensing a source text into key points.
    Summarize,
    /// Factual or conversational question answering.
    Qa,
    /// Open-ended creative writing.
    Creative,
    /// Arithmetic, algebra, and step-by-step reasoning.
    MathReasoning,
    /// No classifier produced a usable label.
    Unknown,
}

impl Category {
    /// All categories in stable iteration order. Ties in heuristic scoring
    /// break in this order; `Unknown` is deliberately last and is never
    /// scored by the heuristic.
    pub const ALL: [Category; 6] = [
        Category::Code,
        Category::Summarize,
        Category::Qa,
        Category::Creative,
        Category::MathReasoning,
        Category::Unknown,
    ];

    /// Categories the heuristic scores against (everything but `Unknown`).
    pub const SCORED: [Category; 5] = [
        Category::Code,
        Category::Summarize,
        Category::Qa,
        Category::Creative,
        Category::MathReasoning,
    ];

    /// Stable lowercase label, matching the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Code => "code",
            Category::Summarize => "summarize",
            Category::Qa => "qa",
            Category::Creative => "creative",
            Category::MathReasoning => "math_reasoning",
            Category::Unknown => "unknown",
        }
    }

    /// Parse a label case-insensitively. Unknown strings map to
    /// [`Category::Unknown`] rather than failing, per the model-classifier
    /// contract.
    pub fn from_label(label: &str) -> Category {
        match label.trim().to_lowercase().as_str() {
            "code" => Category::Code,
            "summarize" => Category::Summarize,
            "qa" => Category::Qa,
            "creative" => Category::Creative,
            "math_reasoning" => Category::MathReasoning,
            _ => Category::Unknown,
        }
    }

    /// Keyword list for the heuristic classifier. Matching is by
    /// case-insensitive substring, so short entries like `"x"` are broad
    /// nets on purpose.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Code => &[
                "code",
                "function",
                "debug",
                "python",
                "javascript",
                "algorithm",
                "implement",
                "write",
                "script",
                "compile",
                "sort",
                "refactor",
            ],
            Category::Summarize => &["summarize", "summary", "key points", "tl;dr"],
            Category::Qa => &[
                "what",
                "how",
                "why",
                "explain",
                "who",
                "when",
                "where",
                "hello",
                "how are you",
                "?",
            ],
            Category::Creative => &[
                "story",
                "poem",
                "creative",
                "imagine",
                "fiction",
                "character",
                "compose",
            ],
            Category::MathReasoning => &["solve", "calculate", "equation", "math", "=", "+", "x"],
            Category::Unknown => &[],
        }
    }

    /// Representative prompts, used in documentation and the demo binary.
    pub fn examples(&self) -> &'static [&'static str] {
        match self {
            Category::Code => &[
                "Write a Python function to sort a list",
                "Debug this JavaScript closure",
            ],
            Category::Summarize => &[
                "Summarize the key points of machine learning",
                "Give me a tl;dr of this article",
            ],
            Category::Qa => &["Hello, how are you?", "What is the capital of France?"],
            Category::Creative => &[
                "Tell me a story about a lighthouse keeper",
                "Compose a poem about autumn",
            ],
            Category::MathReasoning => &["Solve: 2x + 5 = 13", "Calculate 15% of 2400"],
            Category::Unknown => &[],
        }
    }

    /// Expected output size for this category, in tokens. Doubled (with a
    /// 1500-token floor) to produce the generation cap.
    pub fn estimated_output_tokens(&self) -> u32 {
        match self {
            Category::Code => 1000,
            Category::Summarize => 600,
            Category::Qa => 1000,
            Category::Creative => 1250,
            Category::MathReasoning => 1500,
            Category::Unknown => 500,
        }
    }

    /// Sampling temperature used when generating for this category.
    pub fn temperature(&self) -> f32 {
        match self {
            Category::Code => 0.1,
            Category::Summarize => 0.3,
            Category::Qa => 0.2,
            Category::Creative => 0.8,
            Category::MathReasoning => 0.1,
            Category::Unknown => 0.5,
        }
    }

    /// Output-token cap for this category: `max(2 × estimate, 1500)`, so a
    /// request is always granted at least 1500 output tokens.
    pub fn max_output_tokens(&self) -> u32 {
        (self.estimated_output_tokens() * 2).max(1500)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
