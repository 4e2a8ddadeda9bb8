//! Model registry: the [`LlmDispatcher`] implementation.
//!
//! Holds every configured model plus the subset found available at the
//! last discovery. Unpinned requests cascade through the available models
//! in priority order; pinned requests go to exactly one model.

use super::ModelAdapter;
use async_trait::async_trait;
use forge_application::ports::llm_dispatcher::{
    DispatchError, GenerationError, GenerationRequest, LlmDispatcher,
};
use forge_domain::{LlmResponse, ModelConfig, rank_by_priority};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A configured model and whether discovery found it usable
#[derive(Debug, Clone)]
pub struct ModelStatus {
    pub config: ModelConfig,
    pub available: bool,
}

pub struct ModelRegistry {
    configured: Vec<ModelConfig>,
    adapters: HashMap<String, Arc<dyn ModelAdapter>>,
    /// Keyed by `"{provider}:{model}"`; replaced wholesale on discovery
    available: RwLock<Arc<HashMap<String, ModelConfig>>>,
}

impl ModelRegistry {
    pub fn new(configured: Vec<ModelConfig>, adapters: Vec<Arc<dyn ModelAdapter>>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.provider_key().to_string(), adapter))
            .collect();
        Self {
            configured,
            adapters,
            available: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    pub fn configured(&self) -> &[ModelConfig] {
        &self.configured
    }

    fn adapter_for(&self, config: &ModelConfig) -> Option<&Arc<dyn ModelAdapter>> {
        self.adapters.get(&config.provider)
    }

    /// Probe every configured model and swap in the new available set.
    ///
    /// Returns the number of available models.
    pub async fn discover(&self) -> usize {
        let mut found = HashMap::new();
        for config in &self.configured {
            let Some(adapter) = self.adapter_for(config) else {
                warn!(model = %config.id(), "No adapter for provider '{}', skipping", config.provider);
                continue;
            };
            if adapter.is_available(config).await {
                debug!(model = %config.id(), "Model available");
                found.insert(config.id(), config.clone());
            } else {
                info!(model = %config.id(), "Model unavailable");
            }
        }

        let count = found.len();
        *self.available.write() = Arc::new(found);
        info!(available = count, configured = self.configured.len(), "Model discovery finished");
        count
    }

    /// Same as [`discover`](Self::discover); kept separate for call-site intent.
    pub async fn reload(&self) -> usize {
        self.discover().await
    }

    /// Available models, best first
    fn ranked_snapshot(&self) -> Vec<ModelConfig> {
        let snapshot = Arc::clone(&self.available.read());
        // Preserve configuration order before the stable priority sort
        let mut models: Vec<ModelConfig> = self
            .configured
            .iter()
            .filter(|config| snapshot.contains_key(&config.id()))
            .cloned()
            .collect();
        rank_by_priority(&mut models);
        models
    }

    pub fn list_models(&self) -> Vec<ModelStatus> {
        let snapshot = Arc::clone(&self.available.read());
        self.configured
            .iter()
            .map(|config| ModelStatus {
                available: snapshot.contains_key(&config.id()),
                config: config.clone(),
            })
            .collect()
    }

    async fn generate_with(
        &self,
        config: &ModelConfig,
        request: &GenerationRequest,
    ) -> Result<LlmResponse, DispatchError> {
        let adapter = self.adapter_for(config).ok_or_else(|| DispatchError::Generation {
            model: config.id(),
            source: GenerationError::UnknownProvider(config.provider.clone()),
        })?;
        let options = request.options.merged_over(&config.default_options);
        adapter
            .generate(config, &request.prompt, &options)
            .await
            .map_err(|source| DispatchError::Generation {
                model: config.id(),
                source,
            })
    }
}

#[async_trait]
impl LlmDispatcher for ModelRegistry {
    async fn generate(&self, request: GenerationRequest) -> Result<LlmResponse, DispatchError> {
        if let Some(id) = request.model.as_deref() {
            let config = self
                .configured
                .iter()
                .find(|config| config.matches_id(id))
                .ok_or_else(|| DispatchError::ModelNotFound(id.to_string()))?;
            debug!(model = %config.id(), "Dispatching to pinned model");
            return self.generate_with(config, &request).await;
        }

        let mut last_error = None;
        for config in self.ranked_snapshot() {
            match self.generate_with(&config, &request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(model = %config.id(), error = %e, "Model failed, trying next");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or(DispatchError::NoModelAvailable))
    }

    fn is_available(&self) -> bool {
        !self.available.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_application::ports::llm_dispatcher::Prompt;
    use forge_domain::GenerationOptions;
    use std::sync::Mutex;

    /// Adapter answering from a fixed table: models listed in `failing`
    /// error, models in `offline` report unavailable.
    struct MockAdapter {
        key: &'static str,
        offline: Vec<&'static str>,
        failing: Vec<&'static str>,
        calls: Mutex<Vec<(String, GenerationOptions)>>,
    }

    impl MockAdapter {
        fn new(key: &'static str) -> Self {
            Self {
                key,
                offline: Vec::new(),
                failing: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn offline(mut self, model: &'static str) -> Self {
            self.offline.push(model);
            self
        }

        fn failing(mut self, model: &'static str) -> Self {
            self.failing.push(model);
            self
        }

        fn called_models(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
        }
    }

    #[async_trait]
    impl ModelAdapter for MockAdapter {
        fn provider_key(&self) -> &str {
            self.key
        }

        async fn generate(
            &self,
            config: &ModelConfig,
            _prompt: &Prompt,
            options: &GenerationOptions,
        ) -> Result<LlmResponse, GenerationError> {
            self.calls
                .lock()
                .unwrap()
                .push((config.model.clone(), options.clone()));
            if self.failing.contains(&config.model.as_str()) {
                return Err(GenerationError::Connection("refused".to_string()));
            }
            Ok(LlmResponse::new(
                format!("from {}", config.model),
                config.model.clone(),
                self.key,
            ))
        }

        async fn is_available(&self, config: &ModelConfig) -> bool {
            !self.offline.contains(&config.model.as_str())
        }
    }

    fn registry(models: Vec<ModelConfig>, adapter: Arc<MockAdapter>) -> ModelRegistry {
        ModelRegistry::new(models, vec![adapter as Arc<dyn ModelAdapter>])
    }

    #[tokio::test]
    async fn test_empty_registry_has_no_model() {
        let registry = registry(Vec::new(), Arc::new(MockAdapter::new("mock")));
        assert_eq!(registry.discover().await, 0);
        assert!(!LlmDispatcher::is_available(&registry));
        assert!(matches!(
            registry.generate(GenerationRequest::new("hi")).await,
            Err(DispatchError::NoModelAvailable)
        ));
    }

    #[tokio::test]
    async fn test_highest_priority_wins() {
        let adapter = Arc::new(MockAdapter::new("mock"));
        let registry = registry(
            vec![
                ModelConfig::new("mock", "small").with_priority(1),
                ModelConfig::new("mock", "large").with_priority(10),
            ],
            adapter.clone(),
        );
        registry.discover().await;

        let response = registry.generate(GenerationRequest::new("hi")).await.unwrap();
        assert_eq!(response.text, "from large");
        assert_eq!(adapter.called_models(), vec!["large"]);
    }

    #[tokio::test]
    async fn test_ties_keep_configuration_order() {
        let adapter = Arc::new(MockAdapter::new("mock"));
        let registry = registry(
            vec![ModelConfig::new("mock", "first"), ModelConfig::new("mock", "second")],
            adapter,
        );
        registry.discover().await;

        let response = registry.generate(GenerationRequest::new("hi")).await.unwrap();
        assert_eq!(response.model, "first");
    }

    #[tokio::test]
    async fn test_falls_back_on_failure() {
        let adapter = Arc::new(MockAdapter::new("mock").failing("primary"));
        let registry = registry(
            vec![
                ModelConfig::new("mock", "primary").with_priority(5),
                ModelConfig::new("mock", "backup"),
            ],
            adapter.clone(),
        );
        registry.discover().await;

        let response = registry.generate(GenerationRequest::new("hi")).await.unwrap();
        assert_eq!(response.model, "backup");
        assert_eq!(adapter.called_models(), vec!["primary", "backup"]);
    }

    #[tokio::test]
    async fn test_all_failing_returns_last_error() {
        let adapter = Arc::new(MockAdapter::new("mock").failing("a").failing("b"));
        let registry = registry(
            vec![ModelConfig::new("mock", "a"), ModelConfig::new("mock", "b")],
            adapter,
        );
        registry.discover().await;

        match registry.generate(GenerationRequest::new("hi")).await {
            Err(DispatchError::Generation { model, .. }) => assert_eq!(model, "mock:b"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unavailable_models_are_skipped() {
        let adapter = Arc::new(MockAdapter::new("mock").offline("down"));
        let registry = registry(
            vec![
                ModelConfig::new("mock", "down").with_priority(9),
                ModelConfig::new("mock", "up"),
            ],
            adapter.clone(),
        );
        assert_eq!(registry.discover().await, 1);

        let statuses = registry.list_models();
        assert!(!statuses[0].available);
        assert!(statuses[1].available);

        registry.generate(GenerationRequest::new("hi")).await.unwrap();
        assert_eq!(adapter.called_models(), vec!["up"]);
    }

    #[tokio::test]
    async fn test_missing_adapter_is_skipped() {
        let registry = registry(
            vec![ModelConfig::new("nowhere", "ghost"), ModelConfig::new("mock", "real")],
            Arc::new(MockAdapter::new("mock")),
        );
        assert_eq!(registry.discover().await, 1);
        assert!(!registry.list_models()[0].available);
    }

    #[tokio::test]
    async fn test_pinned_model_bypasses_availability() {
        let adapter = Arc::new(MockAdapter::new("mock").offline("pinned"));
        let registry = registry(
            vec![
                ModelConfig::new("mock", "pinned"),
                ModelConfig::new("mock", "other").with_priority(100),
            ],
            adapter.clone(),
        );
        registry.discover().await;

        let response = registry
            .generate(GenerationRequest::new("hi").with_model("mock:pinned"))
            .await
            .unwrap();
        assert_eq!(response.model, "pinned");

        let bare = registry
            .generate(GenerationRequest::new("hi").with_model("pinned"))
            .await
            .unwrap();
        assert_eq!(bare.model, "pinned");
    }

    #[tokio::test]
    async fn test_pinned_model_does_not_fall_back() {
        let adapter = Arc::new(MockAdapter::new("mock").failing("pinned"));
        let registry = registry(
            vec![ModelConfig::new("mock", "pinned"), ModelConfig::new("mock", "other")],
            adapter.clone(),
        );
        registry.discover().await;

        let result = registry
            .generate(GenerationRequest::new("hi").with_model("mock:pinned"))
            .await;
        assert!(matches!(result, Err(DispatchError::Generation { .. })));
        assert_eq!(adapter.called_models(), vec!["pinned"]);
    }

    #[tokio::test]
    async fn test_unknown_pinned_model() {
        let registry = registry(
            vec![ModelConfig::new("mock", "real")],
            Arc::new(MockAdapter::new("mock")),
        );
        registry.discover().await;
        assert!(matches!(
            registry
                .generate(GenerationRequest::new("hi").with_model("mock:imaginary"))
                .await,
            Err(DispatchError::ModelNotFound(id)) if id == "mock:imaginary"
        ));
    }

    #[tokio::test]
    async fn test_request_options_override_model_defaults() {
        let adapter = Arc::new(MockAdapter::new("mock"));
        let registry = registry(
            vec![ModelConfig::new("mock", "m").with_default_options(
                GenerationOptions::default()
                    .with_temperature(0.5)
                    .with_max_tokens(100),
            )],
            adapter.clone(),
        );
        registry.discover().await;

        registry
            .generate(
                GenerationRequest::new("hi")
                    .with_options(GenerationOptions::default().with_max_tokens(2000)),
            )
            .await
            .unwrap();

        let calls = adapter.calls.lock().unwrap();
        assert_eq!(calls[0].1.temperature, Some(0.5));
        assert_eq!(calls[0].1.max_tokens, Some(2000));
    }

    #[tokio::test]
    async fn test_reload_is_idempotent() {
        let registry = registry(
            vec![ModelConfig::new("mock", "m")],
            Arc::new(MockAdapter::new("mock")),
        );
        assert_eq!(registry.discover().await, 1);
        assert_eq!(registry.reload().await, 1);
        assert!(LlmDispatcher::is_available(&registry));
    }
}
