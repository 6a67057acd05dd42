//! Base tool traits and structures

use crate::error::{Result, ToolError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Tool output returned when the model asks for a tool that does not exist
pub const UNKNOWN_TOOL_MESSAGE: &str =
    "I don't have access to that information source. Let me try a different approach.";

/// Tool output returned when a tool fails before producing a result
pub const TOOL_FAILURE_MESSAGE: &str =
    "I ran into an issue searching for that information. Please try rephrasing your question.";

/// Trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of the tool
    fn name(&self) -> &str;

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's parameters
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters
    async fn execute(&self, call: ToolCall) -> Result<ToolResult>;
}

/// A call to a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,

    /// Name of the tool to call
    pub name: String,

    /// Parameters to pass to the tool
    pub parameters: serde_json::Value,
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this is a result for
    pub tool_call_id: String,

    /// Whether the execution was successful
    pub success: bool,

    /// Result content
    pub content: String,

    /// Execution duration in milliseconds
    pub duration_ms: Option<u64>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new<S: Into<String>>(name: S, parameters: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            parameters,
        }
    }

    /// Get a parameter value by key
    pub fn get_parameter<T>(&self, key: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self
            .parameters
            .get(key)
            .ok_or_else(|| ToolError::InvalidParameters {
                message: format!("Missing parameter: {}", key),
            })?;

        serde_json::from_value(value.clone()).map_err(|_| {
            ToolError::InvalidParameters {
                message: format!("Invalid parameter type for: {}", key),
            }
            .into()
        })
    }
}

impl ToolResult {
    /// Create a successful result
    pub fn success<S: Into<String>>(tool_call_id: S, content: S) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: true,
            content: content.into(),
            duration_ms: None,
        }
    }

    /// Create an error result; the content is shown to the model verbatim
    pub fn error<S: Into<String>>(tool_call_id: S, content: S) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: false,
            content: content.into(),
            duration_ms: None,
        }
    }

    /// Set execution duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Tool executor that dispatches calls by name.
///
/// Tools keep their registration order, which is the order their
/// definitions are offered to the model.
#[derive(Default)]
pub struct ToolExecutor {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolExecutor {
    /// Create a new tool executor
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register_tool(&mut self, tool: Box<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Execute a tool call.
    ///
    /// Never fails: unknown tools and tool errors become fixed messages the
    /// model can recover from.
    pub async fn execute(&self, call: ToolCall) -> ToolResult {
        let Some(tool) = self.get_tool(&call.name) else {
            warn!(tool = %call.name, "model requested an unknown tool");
            return ToolResult::error(call.id, UNKNOWN_TOOL_MESSAGE.to_string());
        };

        let start_time = std::time::Instant::now();
        let call_id = call.id.clone();
        let tool_name = call.name.clone();
        let result = tool.execute(call).await;
        let duration = start_time.elapsed().as_millis() as u64;

        match result {
            Ok(result) => result.with_duration(duration),
            Err(e) => {
                warn!(tool = %tool_name, error = %e, "tool execution failed");
                ToolResult::error(call_id, TOOL_FAILURE_MESSAGE.to_string()).with_duration(duration)
            }
        }
    }

    /// Get tool definitions for LLM function calling
    pub fn get_tool_definitions(&self) -> Vec<crate::llm::ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| crate::llm::ToolDefinition {
                tool_type: "function".to_string(),
                function: crate::llm::FunctionDefinition {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: tool.parameters_schema(),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the text parameter"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            })
        }

        async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
            let text: String = call.get_parameter("text")?;
            Ok(ToolResult::success(call.id, text))
        }
    }

    fn executor() -> ToolExecutor {
        let mut executor = ToolExecutor::new();
        executor.register_tool(Box::new(EchoTool));
        executor
    }

    #[tokio::test]
    async fn test_execute_known_tool() {
        let call = ToolCall::new("echo", json!({"text": "hi"}));
        let id = call.id.clone();
        let result = executor().execute(call).await;
        assert!(result.success);
        assert_eq!(result.content, "hi");
        assert_eq!(result.tool_call_id, id);
        assert!(result.duration_ms.is_some());
    }

    #[tokio::test]
    async fn test_unknown_tool_message() {
        let result = executor()
            .execute(ToolCall::new("search_everything", json!({})))
            .await;
        assert!(!result.success);
        assert_eq!(result.content, UNKNOWN_TOOL_MESSAGE);
    }

    #[tokio::test]
    async fn test_tool_failure_message() {
        let result = executor()
            .execute(ToolCall::new("echo", json!({"text": 42})))
            .await;
        assert!(!result.success);
        assert_eq!(result.content, TOOL_FAILURE_MESSAGE);
    }

    #[test]
    fn test_definitions_keep_registration_order() {
        let mut executor = executor();
        executor.register_tool(Box::new(EchoTool));
        let defs = executor.get_tool_definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].tool_type, "function");
        assert_eq!(defs[0].function.name, "echo");
    }
}
