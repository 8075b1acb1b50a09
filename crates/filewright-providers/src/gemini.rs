//! Gemini provider.
//!
//! Talks to Gemini through its OpenAI-compatible chat-completions endpoint,
//! so the wire types below follow the chat-completions shape: function tools
//! are declared under `tools`, the model answers with `tool_calls` carrying a
//! JSON-encoded argument string, and tool results go back as `role: "tool"`
//! messages keyed by `tool_call_id`.

use crate::traits::LLMProvider;
use async_trait::async_trait;
use filewright_core::{
    Exchange, FilewrightError, FinishReason, GeminiConfig, GenerationRequest, GenerationResponse,
    HealthStatus, ProviderError, Result, TokenUsage, ToolCall, ToolDefinition,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

#[derive(Debug)]
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: WireFunctionCall,
}

#[derive(Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON object encoded as a string, per the chat-completions format.
    arguments: String,
}

#[derive(Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: WireFunction,
}

#[derive(Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<WireMessage>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            FilewrightError::Provider(ProviderError::AuthFailed(format!(
                "{} is not set in environment variables",
                config.api_key_env
            )))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(FilewrightError::Network)?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn convert_tools(&self, tools: &[ToolDefinition]) -> Vec<WireTool> {
        tools
            .iter()
            .map(|tool| WireTool {
                tool_type: "function".to_string(),
                function: WireFunction {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                },
            })
            .collect()
    }

    fn build_messages(&self, request: &GenerationRequest) -> Vec<WireMessage> {
        let mut messages = Vec::new();

        if let Some(system_prompt) = &request.system_prompt {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: Some(system_prompt.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        messages.push(WireMessage {
            role: "user".to_string(),
            content: Some(request.prompt.clone()),
            tool_calls: None,
            tool_call_id: None,
        });

        for exchange in &request.exchanges {
            match exchange {
                Exchange::AssistantCalls { content, calls } => {
                    let tool_calls = calls
                        .iter()
                        .map(|call| WireToolCall {
                            id: call.id.clone(),
                            call_type: "function".to_string(),
                            function: WireFunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.to_string(),
                            },
                        })
                        .collect();
                    messages.push(WireMessage {
                        role: "assistant".to_string(),
                        content: content.clone(),
                        tool_calls: Some(tool_calls),
                        tool_call_id: None,
                    });
                }
                Exchange::ToolOutput {
                    call_id, output, ..
                } => {
                    messages.push(WireMessage {
                        role: "tool".to_string(),
                        content: Some(output.clone()),
                        tool_calls: None,
                        tool_call_id: Some(call_id.clone()),
                    });
                }
            }
        }

        messages
    }

    fn extract_tool_calls(&self, calls: Vec<WireToolCall>) -> Vec<ToolCall> {
        calls
            .into_iter()
            .map(|call| {
                let arguments =
                    serde_json::from_str(&call.function.arguments).unwrap_or_else(|e| {
                        warn!(tool = %call.function.name, error = %e,
                              "tool call arguments were not valid JSON");
                        Value::Object(Default::default())
                    });
                ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments,
                }
            })
            .collect()
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn description(&self) -> &str {
        "Google Gemini models via the OpenAI-compatible endpoint"
    }

    fn supported_models(&self) -> Vec<String> {
        vec![
            "gemini-2.5-flash".to_string(),
            "gemini-2.5-pro".to_string(),
            "gemini-2.0-flash".to_string(),
        ]
    }

    async fn health_check(&self) -> Result<HealthStatus> {
        let url = format!("{}/models", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            _ => Ok(HealthStatus::Unhealthy),
        }
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());

        let chat_request = ChatRequest {
            model: model.clone(),
            messages: self.build_messages(&request),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(self.convert_tools(&request.tools))
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&chat_request)
            .send()
            .await
            .map_err(FilewrightError::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FilewrightError::Provider(ProviderError::ApiError {
                provider: "gemini".to_string(),
                message: format!("HTTP {}: {}", status, error_text),
            }));
        }

        let chat_response: ChatResponse =
            response.json().await.map_err(FilewrightError::Network)?;

        let choice = chat_response.choices.into_iter().next().ok_or_else(|| {
            FilewrightError::Provider(ProviderError::InvalidResponse(
                "No choices in response".to_string(),
            ))
        })?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("stop") => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            Some("tool_calls") => FinishReason::ToolCalls,
            Some("content_filter") => FinishReason::ContentFilter,
            Some(other) => FinishReason::Error(other.to_string()),
            None => FinishReason::Stop,
        };

        let (content, tool_calls) = match choice.message {
            Some(message) => (
                message.content.unwrap_or_default(),
                self.extract_tool_calls(message.tool_calls.unwrap_or_default()),
            ),
            None => (String::new(), Vec::new()),
        };

        let tokens_used = chat_response
            .usage
            .map(|usage| TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            })
            .unwrap_or_default();

        Ok(GenerationResponse {
            content,
            model_used: chat_response.model.unwrap_or(model),
            tokens_used,
            finish_reason,
            tool_calls,
        })
    }
}
