//! LLM client abstractions and implementations

pub mod client;
pub mod message;
pub mod openai;
pub mod stream;

pub use client::{
    ChatOptions, FinishReason, FunctionDefinition, LlmClient, LlmResponse, LlmStream,
    LlmStreamChunk, ToolCallDelta, ToolDefinition, Usage,
};
pub use message::{ContentBlock, LlmMessage, MessageContent, MessageRole};
pub use openai::OpenAiClient;
pub use stream::StreamAccumulator;
