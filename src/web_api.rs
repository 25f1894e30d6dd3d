//! Web API Server
//!
//! A thin HTTP surface over [`RouterService`], enabled with the `web-api`
//! feature.
//!
//! ## Endpoints
//!
//! - `POST /route` - Route a prompt (JSON `{prompt, priorityPreset?}`)
//! - `GET /models` - List models with availability
//! - `PUT /models` - Admin action (JSON `{action: "reset"}`)
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use prompt_router::{web_api, ClientPool, ModelRegistry, RouterService};
//! use prompt_router::config::RouterConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(ModelRegistry::with_defaults());
//!     let pool = Arc::new(ClientPool::new(Arc::clone(&registry)));
//!     let service = Arc::new(RouterService::new(RouterConfig::from_env(), registry, pool));
//!     let config = web_api::ServerConfig::default();
//!     web_api::start_server(config, service).await.unwrap();
//! }
//! ```

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routing::Preset;
use crate::service::RouterService;
use crate::RouterError;

// ============================================================================
// Types & Configuration
// ============================================================================

/// Configuration for the web API HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address or hostname to bind to (e.g. `"0.0.0.0"` for all interfaces).
    pub host: String,
    /// TCP port the server listens on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// JSON error body for 4xx/5xx responses.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// JSON body for `PUT /models`.
#[derive(Debug, Deserialize)]
struct ModelsAction {
    action: String,
}

// ============================================================================
// Server
// ============================================================================

/// Build the router. Exposed separately so tests can drive it without a
/// TCP listener.
pub fn app(service: Arc<RouterService>) -> Router {
    Router::new()
        .route("/route", axum::routing::post(route_prompt))
        .route("/models", get(list_models).put(mutate_models))
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Bind and serve until the process exits.
///
/// # Errors
///
/// Returns an I/O error if the listener cannot bind.
pub async fn start_server(
    config: ServerConfig,
    service: Arc<RouterService>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = format!("{}:{}", config.host, config.port);
    info!(addr = addr.as_str(), "starting router web API");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(service)).await?;
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn route_prompt(
    State(service): State<Arc<RouterService>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let Some(prompt) = body.get("prompt").and_then(|v| v.as_str()) else {
        return bad_request("prompt is required and must be a string", None);
    };

    let preset = match body.get("priorityPreset") {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(name)) => match Preset::from_name(name) {
            Some(p) => Some(p),
            None => return bad_request("unknown priorityPreset", Some(name.clone())),
        },
        Some(_) => return bad_request("priorityPreset must be a string", None),
    };

    match service.route_prompt(prompt, preset, None, None).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(RouterError::InvalidInput(msg)) => bad_request("invalid input", Some(msg)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "routing failed".to_string(),
                details: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}

async fn list_models(State(service): State<Arc<RouterService>>) -> Response {
    let models = service.models();
    (StatusCode::OK, Json(serde_json::json!({ "models": models }))).into_response()
}

async fn mutate_models(
    State(service): State<Arc<RouterService>>,
    Json(body): Json<ModelsAction>,
) -> Response {
    if body.action != "reset" {
        return bad_request("unsupported action", Some(body.action));
    }
    service.reset_models();
    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "All models reset to available" })),
    )
        .into_response()
}

async fn health() -> Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
}

async fn prometheus_metrics() -> Response {
    (StatusCode::OK, crate::metrics::gather_metrics()).into_response()
}

fn bad_request(error: &str, details: Option<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: error.to_string(),
            details,
        }),
    )
        .into_response()
}
