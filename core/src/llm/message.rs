//! LLM message structures

use crate::tools::ToolCall;
use serde::{Deserialize, Serialize};

/// Represents a message in an LLM conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    /// Role of the message sender
    pub role: MessageRole,

    /// Content of the message
    pub content: MessageContent,
}

/// Role of the message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message (instructions)
    System,

    /// User message (human input)
    User,

    /// Assistant message (AI response)
    Assistant,

    /// Tool message (tool execution result)
    Tool,
}

/// Content of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),

    /// Structured content with text, tool calls and tool results
    Blocks(Vec<ContentBlock>),
}

/// A block of content within a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content
    Text { text: String },

    /// Tool use request
    ToolUse {
        /// Unique identifier for this tool use
        id: String,
        /// Name of the tool to use
        name: String,
        /// Input parameters for the tool
        input: serde_json::Value,
    },

    /// Tool result
    ToolResult {
        /// ID of the tool use this is a result for
        tool_use_id: String,
        /// Whether the tool execution failed
        is_error: Option<bool>,
        /// Result content
        content: String,
    },
}

impl LlmMessage {
    /// Create a new system message
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a new user message
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a new assistant message
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message carrying optional text and tool calls
    pub fn assistant_with_tool_calls(text: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        if tool_calls.is_empty() {
            return Self::assistant(text.unwrap_or_default());
        }

        let mut blocks = Vec::with_capacity(tool_calls.len() + 1);
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            blocks.push(ContentBlock::Text { text });
        }
        blocks.extend(tool_calls.into_iter().map(|call| ContentBlock::ToolUse {
            id: call.id,
            name: call.name,
            input: call.parameters,
        }));

        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// Create a tool result message answering the tool call `tool_use_id`
    pub fn tool_result<S: Into<String>>(tool_use_id: S, content: S, is_error: bool) -> Self {
        Self {
            role: MessageRole::Tool,
            content: MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                is_error: Some(is_error),
                content: content.into(),
            }]),
        }
    }

    /// Get the text content of the message
    pub fn get_text(&self) -> Option<String> {
        match &self.content {
            MessageContent::Text(text) => Some(text.clone()),
            MessageContent::Blocks(blocks) => {
                let text_parts: Vec<&str> = blocks
                    .iter()
                    .filter_map(|block| match block {
                        ContentBlock::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                if text_parts.is_empty() {
                    None
                } else {
                    Some(text_parts.join("\n"))
                }
            }
        }
    }

    /// Check if the message contains tool use
    pub fn has_tool_use(&self) -> bool {
        match &self.content {
            MessageContent::Text(_) => false,
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .any(|block| matches!(block, ContentBlock::ToolUse { .. })),
        }
    }

    /// Extract the tool calls requested by this message, in order
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        match &self.content {
            MessageContent::Text(_) => Vec::new(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse { id, name, input } => Some(ToolCall {
                        id: id.clone(),
                        name: name.clone(),
                        parameters: input.clone(),
                    }),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Whether this is a final assistant answer (no tool calls requested)
    pub fn is_final_answer(&self) -> bool {
        self.role == MessageRole::Assistant && !self.has_tool_use()
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assistant_with_tool_calls_round_trips_calls() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "search_communications".to_string(),
            parameters: json!({"query": "JPMC calls"}),
        };
        let message =
            LlmMessage::assistant_with_tool_calls(Some("".to_string()), vec![call.clone()]);

        assert!(message.has_tool_use());
        assert!(!message.is_final_answer());
        assert_eq!(message.get_text(), None);
        assert_eq!(message.tool_calls(), vec![call]);
    }

    #[test]
    fn test_assistant_without_tool_calls_is_plain_text() {
        let message = LlmMessage::assistant_with_tool_calls(Some("Done".to_string()), Vec::new());
        assert_eq!(message.content, MessageContent::Text("Done".to_string()));
        assert!(message.is_final_answer());
    }

    #[test]
    fn test_tool_result_message() {
        let message = LlmMessage::tool_result("call_9", "Found 1 result(s)", false);
        assert_eq!(message.role, MessageRole::Tool);
        assert!(!message.is_final_answer());
        match &message.content {
            MessageContent::Blocks(blocks) => assert_eq!(
                blocks[0],
                ContentBlock::ToolResult {
                    tool_use_id: "call_9".to_string(),
                    is_error: Some(false),
                    content: "Found 1 result(s)".to_string(),
                }
            ),
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_value(MessageRole::Tool).unwrap(), json!("tool"));
        let role: MessageRole = serde_json::from_value(json!("assistant")).unwrap();
        assert_eq!(role, MessageRole::Assistant);
    }
}
