//! OpenAI-compatible client implementation using async-openai library
//!
//! Serving platforms expose their chat endpoints through this protocol, with
//! the serving endpoint name standing in for the model identifier.

use crate::config::ResolvedLlmConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, ContentBlock, FinishReason, LlmClient, LlmMessage, LlmResponse, LlmStream,
    LlmStreamChunk, MessageContent, MessageRole, ToolCallDelta, ToolDefinition, Usage,
};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
        ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessage,
        ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;

/// OpenAI-compatible client using async-openai library
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    options: ChatOptions,
}

impl OpenAiClient {
    /// Create a new client from resolved LLM config
    pub fn new(config: &ResolvedLlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key found for the serving endpoint".to_string(),
            }
            .into());
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(config.base_url.trim_end_matches('/'));

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            options: ChatOptions::from(&config.params),
        })
    }

    /// Convert our internal message format to async-openai format
    fn convert_messages(
        &self,
        messages: Vec<LlmMessage>,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut converted = Vec::with_capacity(messages.len());

        for message in messages {
            match message.role {
                MessageRole::System => {
                    converted.push(ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessage {
                            content: extract_text_content(&message.content).into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::User => {
                    converted.push(ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage {
                            content: extract_text_content(&message.content).into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::Assistant => {
                    converted.push(ChatCompletionRequestMessage::Assistant(
                        convert_assistant_message(&message.content),
                    ));
                }
                MessageRole::Tool => {
                    let mut pushed_any = false;
                    if let MessageContent::Blocks(blocks) = &message.content {
                        for block in blocks {
                            if let ContentBlock::ToolResult {
                                tool_use_id,
                                content,
                                ..
                            } = block
                            {
                                converted.push(ChatCompletionRequestMessage::Tool(
                                    ChatCompletionRequestToolMessage {
                                        content: ChatCompletionRequestToolMessageContent::Text(
                                            content.clone(),
                                        ),
                                        tool_call_id: tool_use_id.clone(),
                                    },
                                ));
                                pushed_any = true;
                            }
                        }
                    }
                    if !pushed_any {
                        return Err((LlmError::InvalidRequest {
                            message: "Tool message must contain ToolResult".to_string(),
                        })
                        .into());
                    }
                }
            }
        }

        Ok(converted)
    }

    /// Convert our tool definitions to async-openai format
    fn convert_tools(&self, tools: Vec<ToolDefinition>) -> Vec<ChatCompletionTool> {
        tools
            .into_iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.function.name,
                    description: Some(tool.function.description),
                    parameters: Some(tool.function.parameters),
                    strict: None,
                },
            })
            .collect()
    }

    fn build_request(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
        stream: bool,
    ) -> Result<CreateChatCompletionRequest> {
        let converted_messages = self.convert_messages(messages)?;

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model);
        request_builder.messages(converted_messages);

        if stream {
            request_builder.stream(true);
        }

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            tracing::debug!(tools = tools.len(), "chat completion request with tools");
            request_builder.tools(self.convert_tools(tools));
        }

        let opts = options.unwrap_or_else(|| self.options.clone());
        if let Some(max_tokens) = opts.max_tokens {
            request_builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = opts.temperature {
            request_builder.temperature(temperature);
        }
        if let Some(top_p) = opts.top_p {
            request_builder.top_p(top_p);
        }

        request_builder.build().map_err(|e| {
            tracing::error!("Failed to build chat completion request: {}", e);
            (LlmError::InvalidRequest {
                message: format!("Failed to build request: {}", e),
            })
            .into()
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let request = self.build_request(messages, tools, options, false)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            tracing::error!("Chat completion call failed: {}", e);
            classify_error(e)
        })?;

        let result = convert_response(response);
        if let Ok(response) = &result {
            for call in response.message.tool_calls() {
                tracing::debug!(tool = %call.name, id = %call.id, "model requested tool call");
            }
        }
        result
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai_compat"
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    async fn chat_completion_stream(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmStream<'_>> {
        let request = self.build_request(messages, tools, options, true)?;

        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(classify_error)?;

        let converted_stream = stream.map(|result| match result {
            Ok(chunk) => Ok(convert_stream_chunk(chunk)),
            Err(e) => Err(classify_error(e).into()),
        });

        Ok(converted_stream.boxed())
    }
}

/// Map async-openai failures onto our error taxonomy, singling out rate limits
fn classify_error(error: OpenAIError) -> LlmError {
    match error {
        OpenAIError::ApiError(api_error) => {
            let kind = api_error
                .code
                .as_deref()
                .or(api_error.r#type.as_deref())
                .unwrap_or_default()
                .to_string();
            if is_rate_limit_marker(&kind) || is_rate_limit_marker(&api_error.message) {
                LlmError::RateLimit {
                    message: api_error.message,
                }
            } else if kind.is_empty() {
                LlmError::Endpoint {
                    message: api_error.message,
                }
            } else {
                LlmError::Endpoint {
                    message: format!("{}: {}", kind, api_error.message),
                }
            }
        }
        OpenAIError::Reqwest(e) => {
            let message = e.to_string();
            match e.status() {
                Some(status) => status_error(status.as_u16(), message),
                None if is_rate_limit_marker(&message) => LlmError::RateLimit { message },
                None => LlmError::Endpoint { message },
            }
        }
        OpenAIError::StreamError(message) => match stream_status(&message) {
            Some(status) => status_error(status, message),
            None if is_rate_limit_marker(&message) => LlmError::RateLimit { message },
            None => LlmError::Stream { message },
        },
        other => {
            let message = other.to_string();
            if is_rate_limit_marker(&message) {
                LlmError::RateLimit { message }
            } else {
                LlmError::Endpoint { message }
            }
        }
    }
}

fn status_error(status: u16, message: String) -> LlmError {
    match status {
        429 => LlmError::RateLimit { message },
        401 | 403 => LlmError::Authentication { message },
        _ => LlmError::ApiError { status, message },
    }
}

/// HTTP status carried in a stream error such as `Invalid status code: 429 Too Many Requests`
fn stream_status(message: &str) -> Option<u16> {
    let (_, rest) = message.split_once("status code:")?;
    rest.split_whitespace().next()?.parse().ok()
}

fn is_rate_limit_marker(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("rate_limit")
        || lower.contains("rate limit")
        || lower.contains("429")
        || lower.contains("request_limit_exceeded")
}

/// Extract text content from MessageContent
fn extract_text_content(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn convert_assistant_message(content: &MessageContent) -> ChatCompletionRequestAssistantMessage {
    match content {
        MessageContent::Text(text) => ChatCompletionRequestAssistantMessage {
            content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                text.clone(),
            )),
            name: None,
            tool_calls: None,
            audio: None,
            refusal: None,
            ..Default::default()
        },
        MessageContent::Blocks(blocks) => {
            let mut text = String::new();
            let mut tool_calls = Vec::new();

            for block in blocks {
                match block {
                    ContentBlock::Text { text: part } => {
                        if !text.is_empty() {
                            text.push('\n');
                        }
                        text.push_str(part);
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        let arguments = match input {
                            Value::String(raw) => raw.clone(),
                            other => other.to_string(),
                        };
                        tool_calls.push(ChatCompletionMessageToolCall {
                            id: id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: async_openai::types::FunctionCall {
                                name: name.clone(),
                                arguments,
                            },
                        });
                    }
                    ContentBlock::ToolResult { .. } => {}
                }
            }

            ChatCompletionRequestAssistantMessage {
                content: if text.is_empty() {
                    None
                } else {
                    Some(ChatCompletionRequestAssistantMessageContent::Text(text))
                },
                name: None,
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls)
                },
                audio: None,
                refusal: None,
                ..Default::default()
            }
        }
    }
}

fn convert_finish_reason(reason: async_openai::types::FinishReason) -> FinishReason {
    match reason {
        async_openai::types::FinishReason::Stop => FinishReason::Stop,
        async_openai::types::FinishReason::Length => FinishReason::Length,
        async_openai::types::FinishReason::ToolCalls => FinishReason::ToolCalls,
        async_openai::types::FinishReason::ContentFilter => FinishReason::ContentFilter,
        async_openai::types::FinishReason::FunctionCall => FinishReason::ToolCalls,
    }
}

/// Convert async-openai response to our internal format
fn convert_response(
    response: async_openai::types::CreateChatCompletionResponse,
) -> Result<LlmResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidRequest {
            message: "No choices in response".to_string(),
        })?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tool_call| {
            let function = tool_call.function;
            let parameters: Value = serde_json::from_str(&function.arguments)
                .unwrap_or(Value::String(function.arguments));
            crate::tools::ToolCall {
                id: tool_call.id,
                name: function.name,
                parameters,
            }
        })
        .collect();

    let message = LlmMessage::assistant_with_tool_calls(choice.message.content, tool_calls);

    let usage = response.usage.map(|u| Usage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(LlmResponse {
        message,
        usage,
        model: response.model,
        finish_reason: choice.finish_reason.map(convert_finish_reason),
    })
}

/// Convert async-openai stream chunk to our internal format
fn convert_stream_chunk(
    chunk: async_openai::types::CreateChatCompletionStreamResponse,
) -> LlmStreamChunk {
    let usage = chunk.usage.map(|u| Usage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    let Some(choice) = chunk.choices.into_iter().next() else {
        return LlmStreamChunk {
            usage,
            ..Default::default()
        };
    };

    let tool_calls = choice
        .delta
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tool_call| {
            let (name, arguments) = match tool_call.function {
                Some(function) => (function.name, function.arguments),
                None => (None, None),
            };
            ToolCallDelta {
                index: tool_call.index,
                id: tool_call.id,
                name,
                arguments,
            }
        })
        .collect();

    LlmStreamChunk {
        delta: choice.delta.content,
        tool_calls,
        finish_reason: choice.finish_reason.map(convert_finish_reason),
        usage,
    }
}
