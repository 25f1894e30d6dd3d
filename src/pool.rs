//! Backend client pool.
//!
//! One client per model key, constructed lazily on first use and cached
//! under both the registry key and the provider-native model name. Lookup
//! tries the key first, then falls back to scanning for a matching wire
//! name, so callers can resolve either alias.
//!
//! Insertion is race-free: two concurrent misses may both construct a
//! client, but only the first insert is retained and the loser is dropped.

use std::sync::Arc;

use dashmap::DashMap;

use crate::client::{
    AnthropicClient, BackendClient, GoogleClient, HuggingFaceClient, OpenAiClient,
};
use crate::registry::{ModelRegistry, Provider};
use crate::RouterError;

/// Lazily populated cache of backend clients.
pub struct ClientPool {
    registry: Arc<ModelRegistry>,
    cache: DashMap<String, Arc<dyn BackendClient>>,
}

impl ClientPool {
    /// Create an empty pool backed by the given registry.
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            cache: DashMap::new(),
        }
    }

    /// Resolve a client by registry key or provider-native model name,
    /// constructing and caching it on first use.
    ///
    /// # Errors
    ///
    /// - [`RouterError::Backend`] if the name matches no registered model.
    /// - [`RouterError::Config`] if the provider credential for the model
    ///   is missing; other models remain resolvable.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn BackendClient>, RouterError> {
        if let Some(client) = self.cache.get(name) {
            return Ok(Arc::clone(&client));
        }
        // Alias scan: a client cached under its key also answers to its
        // wire-level model name.
        if let Some(client) = self
            .cache
            .iter()
            .find(|entry| entry.value().model_name() == name)
        {
            return Ok(Arc::clone(client.value()));
        }

        let descriptor = self
            .registry
            .get(name)
            .or_else(|| self.registry.get_by_provider_name(name))
            .ok_or_else(|| RouterError::Backend(format!("unknown model: {name}")))?;

        let wire_name = descriptor.provider_model_name.as_str();
        let client: Arc<dyn BackendClient> = match descriptor.provider {
            Provider::OpenAi => Arc::new(OpenAiClient::new(wire_name)?),
            Provider::Anthropic => Arc::new(AnthropicClient::new(wire_name)?),
            Provider::Google => Arc::new(GoogleClient::new(wire_name)?),
            Provider::HuggingFace => Arc::new(HuggingFaceClient::new(wire_name)?),
        };

        Ok(self.store(&descriptor.key, &descriptor.provider_model_name, client))
    }

    /// Insert a pre-built client under a registry key. The client is also
    /// reachable through its own `model_name()` alias. Used by tests and
    /// the demo binary to wire in static or mock-server backends.
    pub fn insert(&self, key: &str, client: Arc<dyn BackendClient>) -> Arc<dyn BackendClient> {
        let wire_name = client.model_name().to_string();
        self.store(key, &wire_name, client)
    }

    /// Number of distinct cache entries (aliases included).
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether no client has been constructed yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn store(
        &self,
        key: &str,
        wire_name: &str,
        client: Arc<dyn BackendClient>,
    ) -> Arc<dyn BackendClient> {
        // entry() keeps the first writer's client on a race; ours is dropped.
        let retained = Arc::clone(
            self.cache
                .entry(key.to_string())
                .or_insert_with(|| Arc::clone(&client))
                .value(),
        );
        if wire_name != key {
            self.cache
                .entry(wire_name.to_string())
                .or_insert_with(|| Arc::clone(&retained));
        }
        retained
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StaticClient;

    fn pool() -> ClientPool {
        ClientPool::new(Arc::new(ModelRegistry::with_defaults()))
    }

    #[test]
    fn test_resolve_unknown_name_is_backend_error() {
        let result = pool().resolve("not-a-model");
        assert!(matches!(result, Err(RouterError::Backend(_))));
    }

    #[test]
    fn test_insert_then_resolve_by_key() {
        let pool = pool();
        pool.insert(
            "gpt-4o-mini",
            Arc::new(StaticClient::new("gpt-4o-mini", "hi")),
        );
        assert!(pool.resolve("gpt-4o-mini").is_ok());
    }

    #[test]
    fn test_insert_registers_wire_name_alias() {
        let pool = pool();
        pool.insert(
            "gemini-1.5-flash",
            Arc::new(StaticClient::new("models/gemini-1.5-flash", "hi")),
        );
        // Both the registry key and the provider-native name resolve to the
        // same cached client.
        let by_key = pool.resolve("gemini-1.5-flash").unwrap();
        let by_wire = pool.resolve("models/gemini-1.5-flash").unwrap();
        assert!(Arc::ptr_eq(&by_key, &by_wire));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_insert_race_keeps_first_client() {
        let pool = pool();
        let first = pool.insert("gpt-5", Arc::new(StaticClient::new("gpt-5", "first")));
        let second = pool.insert("gpt-5", Arc::new(StaticClient::new("gpt-5", "second")));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_lazy_resolve_without_credentials_is_config_error() {
        let _lock = crate::client::PROVIDER_ENV_LOCK.lock().unwrap();
        std::env::remove_var("ANTHROPIC_API_KEY");
        let result = pool().resolve("claude-3-7-sonnet-20250219");
        assert!(matches!(result, Err(RouterError::Config(_))));
    }

    #[test]
    fn test_missing_credential_does_not_poison_other_models() {
        let _lock = crate::client::PROVIDER_ENV_LOCK.lock().unwrap();
        std::env::remove_var("OPENAI_API_KEY");
        let pool = pool();
        assert!(pool.resolve("gpt-4o-mini").is_err());

        pool.insert(
            "gpt-oss-20b",
            Arc::new(StaticClient::new("openai/gpt-oss-20b", "hi")),
        );
        assert!(pool.resolve("gpt-oss-20b").is_ok());
    }
}
