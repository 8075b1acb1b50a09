use crate::traits::LLMProvider;
use filewright_core::{
    Config, FilewrightError, GenerationRequest, GenerationResponse, ProviderError, Result,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Owns the registered providers and routes generation requests to the
/// current one, filling in the configured default model when the request
/// carries none.
#[derive(Debug)]
pub struct ProviderManager {
    providers: Arc<RwLock<HashMap<String, Arc<dyn LLMProvider>>>>,
    current_provider: Arc<RwLock<Option<String>>>,
    config: Arc<Config>,
}

impl ProviderManager {
    pub fn new(config: Config) -> Self {
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
            current_provider: Arc::new(RwLock::new(None)),
            config: Arc::new(config),
        }
    }

    pub async fn register_provider(&self, provider: Arc<dyn LLMProvider>) {
        let name = provider.name().to_string();
        let mut providers = self.providers.write().await;
        providers.insert(name, provider);
    }

    pub async fn set_current_provider(&self, provider_name: &str) -> Result<()> {
        let providers = self.providers.read().await;
        if providers.contains_key(provider_name) {
            let mut current = self.current_provider.write().await;
            *current = Some(provider_name.to_string());
            Ok(())
        } else {
            Err(FilewrightError::Provider(ProviderError::NotFound(
                provider_name.to_string(),
            )))
        }
    }

    pub async fn current_provider_name(&self) -> Option<String> {
        let current = self.current_provider.read().await;
        current.clone()
    }

    pub async fn current_provider(&self) -> Result<Arc<dyn LLMProvider>> {
        let current = self.current_provider.read().await;
        let name = current.as_ref().ok_or_else(|| {
            FilewrightError::Provider(ProviderError::NotConfigured(
                "No current provider set".to_string(),
            ))
        })?;

        let providers = self.providers.read().await;
        providers.get(name).cloned().ok_or_else(|| {
            FilewrightError::Provider(ProviderError::NotFound(name.clone()))
        })
    }

    pub async fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().await;
        providers.keys().cloned().collect()
    }

    pub async fn generate(&self, mut request: GenerationRequest) -> Result<GenerationResponse> {
        let provider = self.current_provider().await?;

        if request.model.is_none() {
            request.model = self.default_model_for(provider.name());
        }

        provider.generate(request).await
    }

    fn default_model_for(&self, provider_name: &str) -> Option<String> {
        match provider_name {
            "gemini" => self
                .config
                .providers
                .gemini
                .as_ref()
                .map(|c| c.default_model.clone()),
            _ => None,
        }
    }
}

impl Default for ProviderManager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use filewright_core::{FinishReason, HealthStatus, TokenUsage};

    /// Echoes the resolved model back through `model_used`.
    #[derive(Debug)]
    struct EchoProvider {
        name: &'static str,
    }

    #[async_trait]
    impl LLMProvider for EchoProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "test provider"
        }

        fn supported_models(&self) -> Vec<String> {
            vec!["echo-1".to_string()]
        }

        async fn health_check(&self) -> Result<HealthStatus> {
            Ok(HealthStatus::Healthy)
        }

        async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
            Ok(GenerationResponse {
                content: request.prompt,
                model_used: request.model.unwrap_or_default(),
                tokens_used: TokenUsage::default(),
                finish_reason: FinishReason::Stop,
                tool_calls: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn generate_without_current_provider_fails() {
        let manager = ProviderManager::default();
        let result = manager.generate(GenerationRequest::default()).await;

        assert!(matches!(
            result,
            Err(FilewrightError::Provider(ProviderError::NotConfigured(_)))
        ));
    }

    #[tokio::test]
    async fn set_current_provider_rejects_unknown_names() {
        let manager = ProviderManager::default();
        let result = manager.set_current_provider("nonexistent").await;

        assert!(matches!(
            result,
            Err(FilewrightError::Provider(ProviderError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn generate_injects_the_configured_default_model() {
        let manager = ProviderManager::default();
        manager
            .register_provider(Arc::new(EchoProvider { name: "gemini" }))
            .await;
        manager.set_current_provider("gemini").await.unwrap();

        let response = manager
            .generate(GenerationRequest {
                prompt: "hi".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(response.model_used, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn explicit_model_is_not_overridden() {
        let manager = ProviderManager::default();
        manager
            .register_provider(Arc::new(EchoProvider { name: "gemini" }))
            .await;
        manager.set_current_provider("gemini").await.unwrap();

        let response = manager
            .generate(GenerationRequest {
                prompt: "hi".to_string(),
                model: Some("gemini-2.5-pro".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(response.model_used, "gemini-2.5-pro");
    }
}
