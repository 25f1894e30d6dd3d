//! Demo binary for prompt-router
//!
//! Wires the registry, a pool of static demo backends, and the router
//! service, then routes a handful of prompts across the presets and
//! prints the decisions. With the `web-api` feature enabled it serves the
//! HTTP API instead.

use std::sync::Arc;

use prompt_router::config::RouterConfig;
use prompt_router::{metrics, ClientPool, ModelRegistry, Preset, RouterService, StaticClient};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    prompt_router::init_tracing();

    // Initialize the Prometheus registry before serving any request.
    metrics::init_metrics()?;

    let config = RouterConfig::from_env();
    let registry = Arc::new(ModelRegistry::with_defaults());
    let pool = Arc::new(ClientPool::new(Arc::clone(&registry)));

    let configured = RouterConfig::configured_providers();
    if configured.is_empty() {
        info!("no provider credentials found, wiring static demo backends");
        for d in registry.snapshot() {
            pool.insert(
                &d.key,
                Arc::new(
                    StaticClient::new(
                        d.provider_model_name.clone(),
                        format!("[demo reply from {}]", d.key),
                    )
                    .with_delay(25),
                ),
            );
        }
    } else {
        info!(providers = ?configured, "provider credentials detected");
    }

    let service = Arc::new(RouterService::new(config, registry, pool));

    #[cfg(feature = "web-api")]
    {
        let server_config = prompt_router::web_api::ServerConfig::default();
        return prompt_router::web_api::start_server(server_config, service).await;
    }

    #[cfg(not(feature = "web-api"))]
    {
        info!("🚀 routing demo prompts");

        let demo_prompts = [
            ("Write a Python function to sort a list", Preset::Balanced),
            (
                "Summarize the key points of machine learning",
                Preset::Cost,
            ),
            ("Solve: 2x + 5 = 13", Preset::Quality),
            ("Hello, how are you?", Preset::Latency),
            ("Tell me a story about a lighthouse keeper", Preset::Balanced),
        ];

        for (prompt, preset) in demo_prompts {
            match service.route_prompt(prompt, Some(preset), None, None).await {
                Ok(response) => info!(
                    prompt,
                    preset = %preset,
                    model = response.model_used.as_str(),
                    category = %response.category,
                    confidence = response.decision.confidence,
                    cost_usd = response.actual_cost_usd,
                    "routed"
                ),
                Err(e) => tracing::error!(prompt, error = %e, "routing failed"),
            }
        }

        let summary = service.analytics();
        info!(
            requests = summary.total_requests,
            total_cost_usd = summary.total_cost_usd,
            avg_latency_ms = summary.average_latency_ms,
            "✅ demo complete"
        );

        Ok(())
    }
}
