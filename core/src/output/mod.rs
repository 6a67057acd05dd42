//! Output abstraction layer for the agent core
//!
//! The agent loop reports progress as [`AgentEvent`]s to an [`AgentOutput`]
//! sink. The CLI renders them to the terminal; `predict` collects the
//! completed output items.

use crate::agent::OutputItem;
use crate::tools::{ToolCall, ToolResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type returned by output sinks
pub type OutputResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Null output handler that discards all events
pub struct NullOutput;

#[async_trait]
impl AgentOutput for NullOutput {
    async fn emit_event(&self, _event: AgentEvent) -> OutputResult {
        Ok(())
    }
}

/// Status of tool execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolExecutionStatus {
    Executing,
    Success,
    Error,
}

/// Tool execution information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecutionInfo {
    /// Tool call id assigned by the model
    pub call_id: String,
    pub tool_name: String,
    /// Raw tool arguments
    pub parameters: serde_json::Value,
    pub status: ToolExecutionStatus,
    /// Tool result (if completed)
    pub result: Option<ToolResult>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ToolExecutionInfo {
    pub fn new(call: &ToolCall, status: ToolExecutionStatus, result: Option<&ToolResult>) -> Self {
        Self {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            parameters: call.parameters.clone(),
            status,
            result: result.cloned(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Add another usage report to this total
    pub fn accumulate(&mut self, usage: &crate::llm::Usage) {
        self.input_tokens += usage.prompt_tokens;
        self.output_tokens += usage.completion_tokens;
        self.total_tokens += usage.total_tokens;
    }
}

/// Per-request execution context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub conversation_id: Option<String>,
    pub max_iterations: usize,
    /// Iterations used so far
    pub iterations: usize,
    pub execution_time: std::time::Duration,
    pub token_usage: TokenUsage,
}

/// Events emitted during a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentEvent {
    /// Request processing started
    ExecutionStarted { context: ExecutionContext },
    /// Request processing finished
    ExecutionCompleted {
        context: ExecutionContext,
        success: bool,
    },
    /// Incremental assistant text for the item `item_id`
    TextDelta { item_id: String, delta: String },
    /// A completed output item
    OutputItemDone { item: OutputItem },
    /// Tool execution started
    ToolExecutionStarted { tool_info: ToolExecutionInfo },
    /// Tool execution completed
    ToolExecutionCompleted { tool_info: ToolExecutionInfo },
    /// Token usage updated (emitted after each LLM call)
    TokenUsageUpdated { token_usage: TokenUsage },
    /// General message or log
    Message { level: MessageLevel, content: String },
}

/// Message severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageLevel {
    Debug,
    Info,
    Normal,
    Warning,
    Error,
}

/// Abstract output interface for agent execution
#[async_trait]
pub trait AgentOutput: Send + Sync {
    /// Emit an agent event
    async fn emit_event(&self, event: AgentEvent) -> OutputResult;

    /// Emit a message with specified level
    async fn emit_message(&self, level: MessageLevel, content: &str) -> OutputResult {
        self.emit_event(AgentEvent::Message {
            level,
            content: content.to_string(),
        })
        .await
    }

    async fn debug(&self, content: &str) -> OutputResult {
        self.emit_message(MessageLevel::Debug, content).await
    }

    async fn info(&self, content: &str) -> OutputResult {
        self.emit_message(MessageLevel::Info, content).await
    }

    async fn warning(&self, content: &str) -> OutputResult {
        self.emit_message(MessageLevel::Warning, content).await
    }

    async fn error(&self, content: &str) -> OutputResult {
        self.emit_message(MessageLevel::Error, content).await
    }

    /// Emit token usage update
    async fn emit_token_update(&self, token_usage: TokenUsage) -> OutputResult {
        self.emit_event(AgentEvent::TokenUsageUpdated { token_usage })
            .await
    }

    /// Whether this handler renders text deltas as they arrive
    fn supports_realtime_updates(&self) -> bool {
        false
    }

    /// Flush any buffered output
    async fn flush(&self) -> OutputResult {
        Ok(())
    }
}
