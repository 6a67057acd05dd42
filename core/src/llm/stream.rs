//! Folding of streamed chat completion chunks into a complete response

use super::client::{FinishReason, LlmResponse, LlmStreamChunk, Usage};
use super::message::LlmMessage;
use crate::tools::ToolCall;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Accumulates stream chunks until the stream ends
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    content: String,
    tool_calls: BTreeMap<u32, PartialToolCall>,
    usage: Option<Usage>,
    finish_reason: Option<FinishReason>,
}

impl StreamAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one chunk in, returning its text delta (if any)
    pub fn push(&mut self, chunk: LlmStreamChunk) -> Option<String> {
        for delta in chunk.tool_calls {
            let entry = self.tool_calls.entry(delta.index).or_default();
            if let Some(id) = delta.id.filter(|id| !id.is_empty()) {
                entry.id = id;
            }
            if let Some(name) = delta.name.filter(|name| !name.is_empty()) {
                entry.name = name;
            }
            if let Some(arguments) = delta.arguments {
                entry.arguments.push_str(&arguments);
            }
        }

        if chunk.usage.is_some() {
            self.usage = chunk.usage;
        }
        if chunk.finish_reason.is_some() {
            self.finish_reason = chunk.finish_reason;
        }

        let delta = chunk.delta.filter(|d| !d.is_empty())?;
        self.content.push_str(&delta);
        Some(delta)
    }

    /// Build the final response.
    ///
    /// Tool calls without a name are dropped. Arguments that are not valid JSON
    /// are kept as a JSON string so the tool layer can reject them.
    pub fn finish(self, model: &str) -> LlmResponse {
        let tool_calls: Vec<ToolCall> = self
            .tool_calls
            .into_values()
            .filter(|call| !call.name.is_empty())
            .map(|call| {
                let parameters = if call.arguments.trim().is_empty() {
                    serde_json::Value::Object(Default::default())
                } else {
                    serde_json::from_str(&call.arguments)
                        .unwrap_or(serde_json::Value::String(call.arguments))
                };
                let id = if call.id.is_empty() {
                    uuid::Uuid::new_v4().to_string()
                } else {
                    call.id
                };
                ToolCall {
                    id,
                    name: call.name,
                    parameters,
                }
            })
            .collect();

        let text = if self.content.is_empty() {
            None
        } else {
            Some(self.content)
        };

        LlmResponse {
            message: LlmMessage::assistant_with_tool_calls(text, tool_calls),
            usage: self.usage,
            model: model.to_string(),
            finish_reason: self.finish_reason,
        }
    }
}
