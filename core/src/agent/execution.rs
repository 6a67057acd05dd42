//! Request and response structures for agent execution

use crate::llm::{LlmMessage, MessageRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One conversation message supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    pub role: MessageRole,
    pub content: String,
}

impl InputMessage {
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&InputMessage> for LlmMessage {
    fn from(message: &InputMessage) -> Self {
        match message.role {
            MessageRole::System => LlmMessage::system(message.content.as_str()),
            MessageRole::User => LlmMessage::user(message.content.as_str()),
            MessageRole::Assistant => LlmMessage::assistant(message.content.as_str()),
            // Bare tool results without a call id cannot be replayed; pass as user text
            MessageRole::Tool => LlmMessage::user(message.content.as_str()),
        }
    }
}

/// Caller identity attached to a request for log correlation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: Option<String>,
    pub conversation_id: Option<String>,
}

/// A chat request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub input: Vec<InputMessage>,
    #[serde(default)]
    pub context: Option<RequestContext>,
}

impl AgentRequest {
    /// A request holding a single user question
    pub fn from_question<S: Into<String>>(question: S) -> Self {
        Self {
            input: vec![InputMessage::user(question)],
            context: None,
        }
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.context.as_ref()?.user_id.as_deref()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.context.as_ref()?.conversation_id.as_deref()
    }
}

/// A completed unit of agent output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    /// Assistant text
    Text { id: String, text: String },
    /// A tool call requested by the model
    FunctionCall {
        id: String,
        call_id: String,
        name: String,
        arguments: String,
    },
    /// The output of a tool call
    FunctionCallOutput { call_id: String, output: String },
}

impl OutputItem {
    pub fn text<I: Into<String>, T: Into<String>>(id: I, text: T) -> Self {
        OutputItem::Text {
            id: id.into(),
            text: text.into(),
        }
    }

    /// A text item with a fresh id
    pub fn new_text<T: Into<String>>(text: T) -> Self {
        Self::text(Uuid::new_v4().to_string(), text)
    }

    pub fn function_call(call_id: &str, name: &str, arguments: &serde_json::Value) -> Self {
        OutputItem::FunctionCall {
            id: Uuid::new_v4().to_string(),
            call_id: call_id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    pub fn function_call_output<S: Into<String>>(call_id: &str, output: S) -> Self {
        OutputItem::FunctionCallOutput {
            call_id: call_id.to_string(),
            output: output.into(),
        }
    }

    /// Text of a `Text` item
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutputItem::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// All output items produced for a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub output: Vec<OutputItem>,
}

impl AgentResponse {
    /// The last text item, usually the final answer
    pub fn final_text(&self) -> Option<&str> {
        self.output.iter().rev().find_map(OutputItem::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_deserializes_with_context() {
        let request: AgentRequest = serde_json::from_value(json!({
            "input": [{"role": "user", "content": "Tesla renewal date?"}],
            "context": {"user_id": "am@example.com", "conversation_id": "c-1"}
        }))
        .unwrap();
        assert_eq!(request.input[0], InputMessage::user("Tesla renewal date?"));
        assert_eq!(request.user_id(), Some("am@example.com"));
        assert_eq!(request.conversation_id(), Some("c-1"));

        let bare = AgentRequest::from_question("hi");
        assert_eq!(bare.user_id(), None);
    }

    #[test]
    fn test_output_item_wire_format() {
        let item = OutputItem::function_call_output("call_1", "Found 1 result(s)");
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"type": "function_call_output", "call_id": "call_1", "output": "Found 1 result(s)"})
        );

        let call = OutputItem::function_call("call_1", "search_strategy_docs", &json!({"query": "x"}));
        match call {
            OutputItem::FunctionCall { arguments, .. } => assert_eq!(arguments, r#"{"query":"x"}"#),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_final_text() {
        let response = AgentResponse {
            output: vec![
                OutputItem::text("1", "Checking."),
                OutputItem::function_call_output("c", "results"),
                OutputItem::text("2", "Tesla renews in June."),
            ],
        };
        assert_eq!(response.final_text(), Some("Tesla renews in June."));
    }
}
