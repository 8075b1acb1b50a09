use async_trait::async_trait;
use filewright_core::{GenerationRequest, GenerationResponse, HealthStatus, Result};

#[async_trait]
pub trait LLMProvider: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    fn supported_models(&self) -> Vec<String>;

    async fn health_check(&self) -> Result<HealthStatus>;

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;
}
