use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub tools: Vec<ToolDefinition>,
    /// Tool round-trips from earlier turns of the same run, replayed to the
    /// model so it can see what its calls produced.
    pub exchanges: Vec<Exchange>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            system_prompt: None,
            model: None,
            max_tokens: Some(4096),
            temperature: Some(0.7),
            tools: Vec::new(),
            exchanges: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub content: String,
    pub model_used: String,
    pub tokens_used: TokenUsage,
    pub finish_reason: FinishReason,
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Error(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the model. `arguments` is the decoded
/// argument object, not the wire-level JSON string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// One entry of the tool-call history carried across turns of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Exchange {
    /// The assistant message that requested tool calls.
    AssistantCalls {
        content: Option<String>,
        calls: Vec<ToolCall>,
    },
    /// The textual result handed back for one of those calls.
    ToolOutput {
        call_id: String,
        name: String,
        output: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub sender: MessageSender,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MessageSender {
    User,
    Assistant { model: String },
    Tool { name: String },
}

impl Message {
    pub fn new_user(text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            sender: MessageSender::User,
            text,
        }
    }

    pub fn new_assistant(text: String, model: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            sender: MessageSender::Assistant { model },
            text,
        }
    }

    pub fn new_tool(name: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            sender: MessageSender::Tool { name },
            text,
        }
    }
}
