//! # eps-agent Core
//!
//! Core library for the EPS account intelligence agent.
//!
//! The agent answers Account Manager questions by running a bounded
//! tool-calling loop against an OpenAI-compatible serving endpoint. Each tool
//! is a thin wrapper over the enterprise search gateway with its own query
//! rewriting and result formatting.

// Core modules
pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod query;
pub mod retry;
pub mod search;
pub mod tools;

// Re-export commonly used types
pub use agent::{AgentBuilder, AgentConfig, AgentCore, AgentRequest, AgentResponse, OutputItem};
pub use config::{ModelParams, ResolvedLlmConfig, SearchConfig};
pub use error::{Error, Result};

/// Current version of the eps-agent-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing to stderr at `info`, or `debug` when `debug` is set
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}
