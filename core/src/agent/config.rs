//! Agent configuration structures

use crate::config::{ResolvedLlmConfig, SearchConfig};
use crate::llm::{LlmClient, OpenAiClient};
use crate::retry::RetryConfig;
use crate::search::{GleanClient, SearchBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default budget of loop iterations per request
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Configuration for an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum number of loop iterations per request
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Custom system prompt (optional)
    /// If not provided, the default system prompt will be used
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Backoff applied to rate-limited LLM calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Stream completions when the client supports it
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_stream() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_prompt: None,
            retry: RetryConfig::default(),
            stream: true,
        }
    }
}

/// Builder for creating agents from resolved configuration
pub struct AgentBuilder {
    llm_config: ResolvedLlmConfig,
    search_config: SearchConfig,
    agent_config: AgentConfig,
}

impl AgentBuilder {
    /// Create a new agent builder
    pub fn new(llm_config: ResolvedLlmConfig, search_config: SearchConfig) -> Self {
        Self {
            llm_config,
            search_config,
            agent_config: AgentConfig::default(),
        }
    }

    /// Set agent configuration
    pub fn with_agent_config(mut self, agent_config: AgentConfig) -> Self {
        self.agent_config = agent_config;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.agent_config.max_iterations = max_iterations;
        self
    }

    /// Set system prompt
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.agent_config.system_prompt = system_prompt;
        self
    }

    /// Build the agent.
    ///
    /// Both configurations are validated here, so a missing token fails at
    /// startup rather than on the first search.
    pub fn build(self) -> crate::error::Result<super::AgentCore> {
        self.llm_config.validate()?;
        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(&self.llm_config)?);
        let search: Arc<dyn SearchBackend> = Arc::new(GleanClient::new(&self.search_config)?);

        Ok(super::AgentCore::new(self.agent_config, llm, search))
    }
}
