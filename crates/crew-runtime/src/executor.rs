//! Role executor for running LLM tool loops
//!
//! The RoleExecutor implements the core agent loop pattern:
//! 1. Call LLM with conversation history and available tools
//! 2. Check stop reason
//! 3. If tool use requested, execute tools and loop back
//! 4. If completed, return final response
//!
//! Every LLM round trip counts as one step against the executor's own
//! limit and, when present, against a [`StepBudget`] shared with the
//! rest of the crew.

use crate::budget::StepBudget;
use crew_core::Result;
use crew_llm::{CompletionRequest, ContentBlock, LlmProvider, Message, StopReason};
use crew_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for role execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of LLM round trips for this role
    pub max_steps: usize,

    /// Model to use
    pub model: String,

    /// System prompt (the role's persona)
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            model: "gemini-1.0-pro".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.7),
        }
    }
}

/// Executes a role's LLM loop: completion, tool calls, loop back
pub struct RoleExecutor {
    provider: Arc<dyn LlmProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl RoleExecutor {
    /// Create a new role executor
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
        }
    }

    /// Execute the loop with a single user message
    pub async fn run(&self, user_message: String) -> Result<String> {
        self.run_with_budget(user_message, None).await
    }

    /// Execute the loop, also drawing steps from a shared crew budget
    ///
    /// The loop stops at whichever limit is hit first: the role's own
    /// `max_steps` or the shared budget.
    pub async fn run_with_budget(
        &self,
        user_message: String,
        budget: Option<&StepBudget>,
    ) -> Result<String> {
        let mut conversation = vec![Message::user(user_message)];
        let mut step = 0;

        loop {
            step += 1;
            if step > self.config.max_steps {
                warn!(
                    max_steps = self.config.max_steps,
                    "Role step limit reached, returning last text"
                );
                return Ok(last_text(&conversation));
            }

            if let Some(budget) = budget {
                if !budget.try_take() {
                    warn!("Shared crew budget exhausted, returning last text");
                    return Ok(last_text(&conversation));
                }
            }

            let tools = self.tool_registry.definitions();
            info!(
                step = step,
                max_steps = self.config.max_steps,
                model = %self.config.model,
                tool_count = tools.len(),
                "Sending request to LLM"
            );

            let mut builder = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .max_tokens(self.config.max_tokens);

            if let Some(system) = &self.config.system_prompt {
                builder = builder.system(system.clone());
            }
            if let Some(temperature) = self.config.temperature {
                builder = builder.temperature(temperature);
            }
            if !tools.is_empty() {
                builder = builder.tools(tools);
            }

            let response = self
                .provider
                .complete(builder.build())
                .await
                .map_err(|e| crew_core::Error::ProcessingFailed(e.to_string()))?;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            conversation.push(response.message.clone());

            match response.stop_reason {
                StopReason::EndTurn => {
                    let text = response.message.text().unwrap_or_default().to_string();
                    info!(step = step, response_length = text.len(), "Role completed");
                    return Ok(text);
                }

                StopReason::ToolUse => {
                    let results = self.execute_tools(&response.message).await?;
                    if results.is_empty() {
                        warn!("No tool results despite tool_use stop reason");
                        return Ok(last_text(&conversation));
                    }
                    conversation.extend(results);
                }

                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    return Ok(response.message.text().unwrap_or_default().to_string());
                }
            }
        }
    }

    /// Execute tool calls from an assistant message
    ///
    /// A failing tool does not abort the loop; the error text is sent back
    /// to the LLM as a tool result so it can recover or try another tool.
    async fn execute_tools(&self, message: &Message) -> Result<Vec<Message>> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            if let ContentBlock::ToolUse { id, name, input } = tool_use {
                debug!(tool_name = %name, tool_id = %id, input = %input, "Executing tool");

                let Some(tool) = self.tool_registry.get(name) else {
                    warn!(tool_name = %name, "Requested tool not registered");
                    results.push(Message::tool_error(
                        id.clone(),
                        name.clone(),
                        format!("Unknown tool: {name}"),
                    ));
                    continue;
                };

                let started = std::time::Instant::now();
                match tool.execute(input.clone()).await {
                    Ok(result) => {
                        let result_str = serde_json::to_string(&result)
                            .unwrap_or_else(|_| result.to_string());
                        info!(
                            tool_name = %name,
                            duration_ms = started.elapsed().as_millis() as u64,
                            result_length = result_str.len(),
                            "Tool execution succeeded"
                        );
                        results.push(Message::tool_result(id.clone(), name.clone(), result_str));
                    }
                    Err(e) => {
                        warn!(
                            tool_name = %name,
                            duration_ms = started.elapsed().as_millis() as u64,
                            error = %e,
                            "Tool execution failed"
                        );
                        results.push(Message::tool_error(
                            id.clone(),
                            name.clone(),
                            format!("Error: {e}"),
                        ));
                    }
                }
            }
        }

        Ok(results)
    }
}

/// Last assistant text seen in the conversation, for budget-exhausted exits
fn last_text(conversation: &[Message]) -> String {
    conversation
        .iter()
        .rev()
        .filter(|m| m.role == crew_llm::Role::Assistant)
        .find_map(|m| m.text())
        .unwrap_or("Step limit reached without completion")
        .to_string()
}

/// Builder for RoleExecutor
pub struct RoleExecutorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl RoleExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the maximum number of steps
    pub fn max_steps(mut self, max: usize) -> Self {
        self.config.max_steps = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set max tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Build the executor
    pub fn build(self) -> Result<RoleExecutor> {
        let provider = self.provider.ok_or_else(|| {
            crew_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        Ok(RoleExecutor::new(provider, self.tool_registry, self.config))
    }
}

impl Default for RoleExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crew_llm::{CompletionResponse, MessageContent, Role, TokenUsage};
    use crew_tools::Tool;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Provider that replays a fixed script of responses
    struct ScriptedProvider {
        responses: Mutex<Vec<CompletionResponse>>,
    }

    impl ScriptedProvider {
        fn new(mut responses: Vec<CompletionResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> crew_llm::Result<CompletionResponse> {
            let mut responses = self.responses.lock().unwrap();
            responses
                .pop()
                .ok_or_else(|| crew_llm::LlmError::RequestFailed("script exhausted".to_string()))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn end_turn(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn tool_call(name: &str, input: Value) -> CompletionResponse {
        CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: Some(MessageContent::Blocks(vec![ContentBlock::ToolUse {
                    id: format!("{name}-0"),
                    name: name.to_string(),
                    input,
                }])),
            },
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    struct FixedTool;

    #[async_trait]
    impl Tool for FixedTool {
        async fn execute(&self, _params: Value) -> crew_core::Result<Value> {
            Ok(json!({"trend": "up"}))
        }

        fn name(&self) -> &str {
            "price_history"
        }

        fn description(&self) -> &str {
            "Fetch daily price history"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"symbol": {"type": "string"}}})
        }
    }

    #[tokio::test]
    async fn test_end_turn_returns_text() {
        let executor = RoleExecutorBuilder::new()
            .provider(Arc::new(ScriptedProvider::new(vec![end_turn(
                "AAPL looks bullish",
            )])))
            .build()
            .unwrap();

        let output = executor.run("Analyze AAPL".to_string()).await.unwrap();
        assert_eq!(output, "AAPL looks bullish");
    }

    #[tokio::test]
    async fn test_tool_loop_then_completion() {
        let registry = Arc::new(ToolRegistry::new());
        registry.register(Arc::new(FixedTool));

        let executor = RoleExecutorBuilder::new()
            .provider(Arc::new(ScriptedProvider::new(vec![
                tool_call("price_history", json!({"symbol": "AAPL"})),
                end_turn("Trend is up"),
            ])))
            .tool_registry(registry)
            .build()
            .unwrap();

        let output = executor.run("Analyze AAPL".to_string()).await.unwrap();
        assert_eq!(output, "Trend is up");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_back() {
        let executor = RoleExecutorBuilder::new()
            .provider(Arc::new(ScriptedProvider::new(vec![
                tool_call("nonexistent", json!({})),
                end_turn("Recovered"),
            ])))
            .build()
            .unwrap();

        let output = executor.run("go".to_string()).await.unwrap();
        assert_eq!(output, "Recovered");
    }

    #[tokio::test]
    async fn test_shared_budget_stops_loop() {
        let registry = Arc::new(ToolRegistry::new());
        registry.register(Arc::new(FixedTool));

        // Script keeps asking for tools; only the budget can stop it
        let executor = RoleExecutorBuilder::new()
            .provider(Arc::new(ScriptedProvider::new(vec![
                tool_call("price_history", json!({"symbol": "AAPL"})),
                tool_call("price_history", json!({"symbol": "AAPL"})),
                tool_call("price_history", json!({"symbol": "AAPL"})),
            ])))
            .tool_registry(registry)
            .max_steps(10)
            .build()
            .unwrap();

        let budget = StepBudget::new(2);
        let output = executor
            .run_with_budget("go".to_string(), Some(&budget))
            .await
            .unwrap();

        assert!(budget.is_exhausted());
        assert!(!output.is_empty());
    }

    #[tokio::test]
    async fn test_role_step_limit() {
        let executor = RoleExecutorBuilder::new()
            .provider(Arc::new(ScriptedProvider::new(vec![
                tool_call("nonexistent", json!({})),
                tool_call("nonexistent", json!({})),
            ])))
            .max_steps(2)
            .build()
            .unwrap();

        let output = executor.run("go".to_string()).await.unwrap();
        assert!(!output.is_empty());
    }

    #[test]
    fn test_builder() {
        let builder = RoleExecutorBuilder::new()
            .model("gpt-4o-mini")
            .max_steps(5)
            .system_prompt("You are a trend analyst");

        assert_eq!(builder.config.model, "gpt-4o-mini");
        assert_eq!(builder.config.max_steps, 5);
    }

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.model, "gemini-1.0-pro");
    }
}
