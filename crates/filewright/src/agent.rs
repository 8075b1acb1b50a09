//! The agent run loop: send the instruction to the model with the file tool
//! declared, execute whatever tool calls come back, replay the results, and
//! repeat until the model answers in plain text.

use filewright_core::{
    AgentConfig, Exchange, FilewrightError, GenerationRequest, Message, Result, Session, ToolCall,
};
use filewright_providers::ProviderManager;
use filewright_tools::{FileOpsTool, TOOL_NAME};
use std::sync::Arc;
use tracing::{debug, warn};

const SYSTEM_PROMPT_FILE: &str = "agent_system_prompt.md";

const FALLBACK_SYSTEM_PROMPT: &str = r#"You are a helpful file management assistant. You can:
1. Create folders and files
2. Write content to files
3. Read content from files
4. Use the file_and_folder_handler tool to perform file and folder operations
5. Generate HTML, CSS and JS code snippets when required

Examples of what you can do:
- Create a folder named 'my_folder'
- Inside 'my_folder', create a file named 'index.html' and write a basic HTML boilerplate in it
- Read the content of 'my_folder/index.html'
- Create a file named 'styles.css' and write CSS that sets the background color"#;

fn load_system_prompt() -> String {
    match std::fs::read_to_string(SYSTEM_PROMPT_FILE) {
        Ok(content) => content,
        Err(_) => FALLBACK_SYSTEM_PROMPT.to_string(),
    }
}

pub struct Agent {
    manager: Arc<ProviderManager>,
    tool: FileOpsTool,
    system_prompt: String,
    max_turns: usize,
}

impl Agent {
    pub fn new(manager: Arc<ProviderManager>, config: &AgentConfig) -> Self {
        Self {
            manager,
            tool: FileOpsTool,
            system_prompt: load_system_prompt(),
            max_turns: config.max_turns,
        }
    }

    /// Runs one instruction to completion and returns the model's final
    /// answer. Tool traffic and the answer are recorded in the session
    /// transcript.
    pub async fn run(&self, input: &str, session: &Session) -> Result<String> {
        session.push(Message::new_user(input.to_string())).await;

        let mut exchanges: Vec<Exchange> = Vec::new();

        for turn in 0..self.max_turns {
            let request = GenerationRequest {
                prompt: input.to_string(),
                system_prompt: Some(self.system_prompt.clone()),
                tools: vec![self.tool.definition()],
                exchanges: exchanges.clone(),
                ..Default::default()
            };

            let response = self.manager.generate(request).await?;

            if response.tool_calls.is_empty() {
                session
                    .push(Message::new_assistant(
                        response.content.clone(),
                        response.model_used,
                    ))
                    .await;
                return Ok(response.content);
            }

            debug!(turn, calls = response.tool_calls.len(), "executing tool calls");

            exchanges.push(Exchange::AssistantCalls {
                content: (!response.content.is_empty()).then(|| response.content.clone()),
                calls: response.tool_calls.clone(),
            });

            for call in &response.tool_calls {
                let output = self.execute(call);
                session
                    .push(Message::new_tool(call.name.clone(), output.clone()))
                    .await;
                exchanges.push(Exchange::ToolOutput {
                    call_id: call.id.clone(),
                    name: call.name.clone(),
                    output,
                });
            }
        }

        Err(FilewrightError::Agent(format!(
            "no final answer after {} turns",
            self.max_turns
        )))
    }

    /// The model always gets a textual result back, even when the tool
    /// suppressed an internal failure.
    fn execute(&self, call: &ToolCall) -> String {
        if call.name != TOOL_NAME {
            warn!(tool = %call.name, "model requested an unknown tool");
            return format!("Unknown tool '{}'.", call.name);
        }

        match self.tool.invoke(&call.arguments) {
            Some(narrative) => narrative,
            None => "The tool produced no output.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use filewright_core::{
        Config, FinishReason, GenerationResponse, HealthStatus, MessageSender, TokenUsage,
    };
    use filewright_providers::LLMProvider;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Debug)]
    struct ScriptedProvider {
        responses: Mutex<VecDeque<GenerationResponse>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<GenerationResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "gemini"
        }

        fn description(&self) -> &str {
            "scripted test provider"
        }

        fn supported_models(&self) -> Vec<String> {
            vec!["scripted".to_string()]
        }

        async fn health_check(&self) -> Result<HealthStatus> {
            Ok(HealthStatus::Healthy)
        }

        async fn generate(&self, _request: GenerationRequest) -> Result<GenerationResponse> {
            let mut responses = self.responses.lock().unwrap();
            responses.pop_front().ok_or_else(|| {
                FilewrightError::Agent("scripted provider ran out of responses".to_string())
            })
        }
    }

    fn tool_call_response(arguments: serde_json::Value) -> GenerationResponse {
        GenerationResponse {
            content: String::new(),
            model_used: "scripted".to_string(),
            tokens_used: TokenUsage::default(),
            finish_reason: FinishReason::ToolCalls,
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                name: TOOL_NAME.to_string(),
                arguments,
            }],
        }
    }

    fn final_response(content: &str) -> GenerationResponse {
        GenerationResponse {
            content: content.to_string(),
            model_used: "scripted".to_string(),
            tokens_used: TokenUsage::default(),
            finish_reason: FinishReason::Stop,
            tool_calls: Vec::new(),
        }
    }

    async fn agent_with(responses: Vec<GenerationResponse>, max_turns: usize) -> Agent {
        let config = Config::default();
        let manager = Arc::new(ProviderManager::new(config.clone()));
        manager
            .register_provider(Arc::new(ScriptedProvider::new(responses)))
            .await;
        manager.set_current_provider("gemini").await.unwrap();

        let mut agent_config = config.agent;
        agent_config.max_turns = max_turns;
        Agent::new(manager, &agent_config)
    }

    #[tokio::test]
    async fn run_executes_tool_calls_and_returns_the_final_answer() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("site").to_string_lossy().into_owned();

        let agent = agent_with(
            vec![
                tool_call_response(json!({ "folder_name": folder })),
                final_response("The folder is in place."),
            ],
            4,
        )
        .await;

        let session = Session::new();
        let answer = agent.run("create a site folder", &session).await.unwrap();

        assert_eq!(answer, "The folder is in place.");
        assert!(dir.path().join("site").is_dir());

        let transcript = session.transcript().await;
        assert_eq!(transcript.len(), 3);
        assert!(matches!(transcript[0].sender, MessageSender::User));
        assert!(matches!(transcript[1].sender, MessageSender::Tool { .. }));
        assert!(transcript[1].text.contains("is ready"));
        assert!(matches!(
            transcript[2].sender,
            MessageSender::Assistant { .. }
        ));
    }

    #[tokio::test]
    async fn run_fails_when_the_model_never_stops_calling_tools() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("loop").to_string_lossy().into_owned();

        let agent = agent_with(
            vec![
                tool_call_response(json!({ "folder_name": folder.clone() })),
                tool_call_response(json!({ "folder_name": folder })),
            ],
            2,
        )
        .await;

        let session = Session::new();
        let result = agent.run("keep going", &session).await;

        assert!(matches!(result, Err(FilewrightError::Agent(_))));
    }

    #[tokio::test]
    async fn suppressed_tool_failures_become_a_no_output_note() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "occupied").unwrap();

        let agent = agent_with(
            vec![
                tool_call_response(json!({
                    "folder_name": blocker.to_string_lossy().into_owned()
                })),
                final_response("done"),
            ],
            4,
        )
        .await;

        let session = Session::new();
        agent.run("make that folder", &session).await.unwrap();

        let transcript = session.transcript().await;
        assert_eq!(transcript[1].text, "The tool produced no output.");
    }

    #[tokio::test]
    async fn unknown_tools_are_reported_back_to_the_model() {
        let mut response = tool_call_response(json!({}));
        response.tool_calls[0].name = "shell_exec".to_string();

        let agent = agent_with(vec![response, final_response("ok")], 4).await;
        let session = Session::new();
        agent.run("try something else", &session).await.unwrap();

        let transcript = session.transcript().await;
        assert_eq!(transcript[1].text, "Unknown tool 'shell_exec'.");
    }
}
