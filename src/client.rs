//! Backend client abstraction and implementations
//!
//! Provides the BackendClient trait and production-ready implementations:
//! - StaticClient: Testing/demo backend with canned replies
//! - OpenAiClient: OpenAI chat completions API
//! - AnthropicClient: Anthropic messages API
//! - GoogleClient: Gemini generateContent API
//! - HuggingFaceClient: HuggingFace inference API
//!
//! ## Environment Variables
//!
//! - `OPENAI_API_KEY`: Required for OpenAiClient
//! - `ANTHROPIC_API_KEY`: Required for AnthropicClient
//! - `GOOGLE_API_KEY`: Required for GoogleClient
//! - `HUGGINGFACE_API_KEY`: Required for HuggingFaceClient
//!
//! A missing key fails construction of that client only; other providers
//! remain usable.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::registry::Provider;
use crate::RouterError;

/// Options for a single generation call.
///
/// `timeout_ms` bounds the whole HTTP round trip; a timeout is reported as
/// an ordinary backend error and is indistinguishable from one downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(default)]
    pub json_mode: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1500,
            temperature: 0.7,
            timeout_ms: 30_000,
            system_prompt: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            stop_sequences: None,
            json_mode: false,
        }
    }
}

/// Result of a single generation call.
///
/// Token counts are `None` when the provider does not report usage (the
/// HuggingFace inference API); the router service falls back to a chars/4
/// estimate in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub content: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub cost_usd: Option<f64>,
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Trait for remote LLM backends
///
/// Implementations must be thread-safe (Send + Sync) for use across tasks.
/// The trait is object-safe to allow dynamic dispatch via Arc<dyn BackendClient>.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput, RouterError>;

    /// Cheap health probe. Defaults to optimistic.
    async fn is_available(&self) -> bool {
        true
    }

    /// Which provider this client talks to.
    fn provider(&self) -> Provider;

    /// Wire-level model name this client is bound to.
    fn model_name(&self) -> &str;
}

fn backend_err(provider: Provider, detail: impl std::fmt::Display) -> RouterError {
    RouterError::Backend(format!("{provider}: {detail}"))
}

/// Process-wide lock for tests that mutate provider environment variables.
/// Shared across modules so env-reading constructors never race.
#[cfg(test)]
pub(crate) static PROVIDER_ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

// ============================================================================
// Static Client (Testing / Demo)
// ============================================================================

/// In-process backend with a canned reply.
///
/// Supports a simulated delay and failure injection, which is all the
/// router service tests need to exercise the fallback path without a
/// network in the loop.
pub struct StaticClient {
    model: String,
    reply: String,
    delay_ms: u64,
    fail: bool,
}

impl StaticClient {
    /// Create a client that always answers with `reply`.
    pub fn new(model: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            reply: reply.into(),
            delay_ms: 0,
            fail: false,
        }
    }

    /// Simulate inference latency.
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Make every call fail with a backend error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl BackendClient for StaticClient {
    async fn generate(
        &self,
        _prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<GenerationOutput, RouterError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if self.fail {
            return Err(RouterError::Backend(format!(
                "static client {} configured to fail",
                self.model
            )));
        }
        Ok(GenerationOutput {
            content: self.reply.clone(),
            input_tokens: None,
            output_tokens: None,
            cost_usd: None,
            latency_ms: self.delay_ms,
            timestamp: Utc::now(),
        })
    }

    async fn is_available(&self) -> bool {
        !self.fail
    }

    fn provider(&self) -> Provider {
        Provider::HuggingFace
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// OpenAI Client
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiReplyMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

/// OpenAI chat completions client (gpt-4o-mini, gpt-5, etc.)
///
/// Requires OPENAI_API_KEY environment variable.
#[derive(Debug)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// API base URL — override for OpenAI-compatible endpoints or testing.
    base_url: String,
}

impl OpenAiClient {
    /// Create a new OpenAI client.
    ///
    /// Reads the API key from the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `Err(RouterError::Config)` if `OPENAI_API_KEY` is not set.
    pub fn new(model: impl Into<String>) -> Result<Self, RouterError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            RouterError::Config("OPENAI_API_KEY environment variable not set".into())
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        })
    }

    /// Override the API base URL.
    ///
    /// Useful for OpenAI-compatible endpoints (Azure OpenAI, Groq, local
    /// proxies) and for pointing at a mock server in tests.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl BackendClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput, RouterError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &options.system_prompt {
            messages.push(OpenAiMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(OpenAiMessage {
            role: "user",
            content: prompt.to_string(),
        });

        let request = OpenAiRequest {
            model: self.model.clone(),
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
            frequency_penalty: options.frequency_penalty,
            presence_penalty: options.presence_penalty,
            stop: options.stop_sequences.clone(),
            response_format: options
                .json_mode
                .then(|| serde_json::json!({"type": "json_object"})),
        };

        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(Duration::from_millis(options.timeout_ms))
            .json(&request)
            .send()
            .await
            .map_err(|e| backend_err(Provider::OpenAi, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(backend_err(
                Provider::OpenAi,
                format!("API error {status}: {error_text}"),
            ));
        }

        let api_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| backend_err(Provider::OpenAi, format!("failed to parse response: {e}")))?;

        let content = api_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| backend_err(Provider::OpenAi, "empty reply"))?;

        Ok(GenerationOutput {
            content,
            input_tokens: api_response.usage.as_ref().map(|u| u.prompt_tokens),
            output_tokens: api_response.usage.as_ref().map(|u| u.completion_tokens),
            cost_usd: None,
            latency_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        })
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/models", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Anthropic Client
// ============================================================================

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}

/// Anthropic messages API client
///
/// Requires ANTHROPIC_API_KEY environment variable.
#[derive(Debug)]
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// API base URL — override for testing.
    base_url: String,
}

impl AnthropicClient {
    /// Create a new Anthropic client.
    ///
    /// Reads the API key from the `ANTHROPIC_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `Err(RouterError::Config)` if `ANTHROPIC_API_KEY` is not set.
    pub fn new(model: impl Into<String>) -> Result<Self, RouterError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            RouterError::Config("ANTHROPIC_API_KEY environment variable not set".into())
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base_url: "https://api.anthropic.com/v1".to_string(),
        })
    }

    /// Override the API base URL. Default: `"https://api.anthropic.com/v1"`.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl BackendClient for AnthropicClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput, RouterError> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            system: options.system_prompt.clone(),
            top_p: options.top_p,
            stop_sequences: options.stop_sequences.clone(),
        };

        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .timeout(Duration::from_millis(options.timeout_ms))
            .json(&request)
            .send()
            .await
            .map_err(|e| backend_err(Provider::Anthropic, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(backend_err(
                Provider::Anthropic,
                format!("API error {status}: {error_text}"),
            ));
        }

        let api_response: AnthropicResponse = response.json().await.map_err(|e| {
            backend_err(Provider::Anthropic, format!("failed to parse response: {e}"))
        })?;

        let content = api_response
            .content
            .iter()
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        if content.is_empty() {
            return Err(backend_err(Provider::Anthropic, "empty reply"));
        }

        Ok(GenerationOutput {
            content,
            input_tokens: api_response.usage.as_ref().map(|u| u.input_tokens),
            output_tokens: api_response.usage.as_ref().map(|u| u.output_tokens),
            cost_usd: None,
            latency_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        })
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/models", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Google (Gemini) Client
// ============================================================================

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiReplyContent,
}

#[derive(Debug, Deserialize)]
struct GeminiReplyContent {
    #[serde(default)]
    parts: Vec<GeminiReplyPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiReplyPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

/// Google Gemini generateContent client
///
/// Requires GOOGLE_API_KEY environment variable. The model name is the
/// wire-level resource path, e.g. `"models/gemini-1.5-flash"`.
#[derive(Debug)]
pub struct GoogleClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// API base URL — override for testing.
    base_url: String,
}

impl GoogleClient {
    /// Create a new Google client.
    ///
    /// Reads the API key from the `GOOGLE_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `Err(RouterError::Config)` if `GOOGLE_API_KEY` is not set.
    pub fn new(model: impl Into<String>) -> Result<Self, RouterError> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            RouterError::Config("GOOGLE_API_KEY environment variable not set".into())
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        })
    }

    /// Override the API base URL. Default:
    /// `"https://generativelanguage.googleapis.com/v1beta"`.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl BackendClient for GoogleClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput, RouterError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
                top_p: options.top_p,
                stop_sequences: options.stop_sequences.clone(),
            },
            system_instruction: options.system_prompt.as_ref().map(|s| GeminiContent {
                parts: vec![GeminiPart { text: s.clone() }],
            }),
        };

        let started = Instant::now();
        let response = self
            .client
            .post(format!(
                "{}/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .timeout(Duration::from_millis(options.timeout_ms))
            .json(&request)
            .send()
            .await
            .map_err(|e| backend_err(Provider::Google, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(backend_err(
                Provider::Google,
                format!("API error {status}: {error_text}"),
            ));
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| backend_err(Provider::Google, format!("failed to parse response: {e}")))?;

        let content = api_response
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|c| !c.is_empty())
            .ok_or_else(|| backend_err(Provider::Google, "empty reply"))?;

        Ok(GenerationOutput {
            content,
            input_tokens: api_response
                .usage_metadata
                .as_ref()
                .map(|u| u.prompt_token_count),
            output_tokens: api_response
                .usage_metadata
                .as_ref()
                .map(|u| u.candidates_token_count),
            cost_usd: None,
            latency_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        })
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/models", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// HuggingFace Client
// ============================================================================

#[derive(Debug, Serialize)]
struct HfParameters {
    max_new_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    return_full_text: bool,
}

#[derive(Debug, Serialize)]
struct HfRequest {
    inputs: String,
    parameters: HfParameters,
}

#[derive(Debug, Deserialize)]
struct HfReply {
    generated_text: String,
}

/// HuggingFace inference API client
///
/// Requires HUGGINGFACE_API_KEY environment variable. The model name is the
/// hub id, e.g. `"openai/gpt-oss-20b"`. The inference API reports no token
/// usage; callers estimate from character counts.
#[derive(Debug)]
pub struct HuggingFaceClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// API base URL — override for testing.
    base_url: String,
}

impl HuggingFaceClient {
    /// Create a new HuggingFace client.
    ///
    /// Reads the API key from the `HUGGINGFACE_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `Err(RouterError::Config)` if `HUGGINGFACE_API_KEY` is not set.
    pub fn new(model: impl Into<String>) -> Result<Self, RouterError> {
        let api_key = std::env::var("HUGGINGFACE_API_KEY").map_err(|_| {
            RouterError::Config("HUGGINGFACE_API_KEY environment variable not set".into())
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base_url: "https://api-inference.huggingface.co".to_string(),
        })
    }

    /// Override the API base URL. Default:
    /// `"https://api-inference.huggingface.co"`.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl BackendClient for HuggingFaceClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput, RouterError> {
        let request = HfRequest {
            inputs: prompt.to_string(),
            parameters: HfParameters {
                max_new_tokens: options.max_tokens,
                temperature: options.temperature,
                top_p: options.top_p,
                return_full_text: false,
            },
        };

        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/models/{}", self.base_url, self.model))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(Duration::from_millis(options.timeout_ms))
            .json(&request)
            .send()
            .await
            .map_err(|e| backend_err(Provider::HuggingFace, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(backend_err(
                Provider::HuggingFace,
                format!("API error {status}: {error_text}"),
            ));
        }

        let replies: Vec<HfReply> = response.json().await.map_err(|e| {
            backend_err(
                Provider::HuggingFace,
                format!("failed to parse response: {e}"),
            )
        })?;

        let content = replies
            .into_iter()
            .next()
            .map(|r| r.generated_text)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| backend_err(Provider::HuggingFace, "empty reply"))?;

        Ok(GenerationOutput {
            content,
            input_tokens: None,
            output_tokens: None,
            cost_usd: None,
            latency_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        })
    }

    fn provider(&self) -> Provider {
        Provider::HuggingFace
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
