//! Agent core logic and execution engine

pub mod config;
pub mod core;
pub mod execution;
pub mod prompt;

pub use config::{AgentBuilder, AgentConfig, DEFAULT_MAX_ITERATIONS};
pub use core::{AgentCore, FALLBACK_MESSAGE, MAX_ITERATIONS_MESSAGE};
pub use execution::{AgentRequest, AgentResponse, InputMessage, OutputItem, RequestContext};
pub use prompt::{system_prompt, EPS_AGENT_SYSTEM_PROMPT};
