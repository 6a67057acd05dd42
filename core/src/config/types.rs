//! Resolved configuration types for the agent core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in the CLI layer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the search gateway API token
pub const GLEAN_API_TOKEN_ENV: &str = "GLEAN_API_TOKEN";
/// Environment variable holding the search gateway instance name or host
pub const GLEAN_INSTANCE_ENV: &str = "GLEAN_INSTANCE";
/// Environment variable naming the LLM serving endpoint
pub const LLM_ENDPOINT_ENV: &str = "LLM_ENDPOINT";
/// Workspace host of the serving platform
pub const DATABRICKS_HOST_ENV: &str = "DATABRICKS_HOST";
/// Access token for the serving platform
pub const DATABRICKS_TOKEN_ENV: &str = "DATABRICKS_TOKEN";

/// Serving endpoint used when `LLM_ENDPOINT` is not set
pub const DEFAULT_LLM_ENDPOINT: &str = "databricks-gpt-5-mini";

/// Model parameters for LLM requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling
    pub temperature: Option<f32>,
    /// Top-p sampling parameter
    pub top_p: Option<f32>,
}

/// A fully resolved LLM configuration ready for use by core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLlmConfig {
    /// Base URL of the OpenAI-compatible API (e.g. `https://<host>/serving-endpoints`)
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Serving endpoint name, sent as the model identifier
    pub model: String,
    /// Model parameters
    #[serde(default)]
    pub params: ModelParams,
}

impl ResolvedLlmConfig {
    /// Create a new resolved LLM config
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            base_url,
            api_key,
            model,
            params: ModelParams::default(),
        }
    }

    /// Build the OpenAI-compatible base URL for a serving platform workspace host
    pub fn serving_endpoints_url(host: &str) -> String {
        let host = host.trim_end_matches('/');
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        format!("{}/serving-endpoints", host)
    }

    /// Set model parameters
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingField {
                field: "llm.api_key".to_string(),
            });
        }

        if self.model.is_empty() {
            return Err(ConfigError::MissingField {
                field: "llm.model".to_string(),
            });
        }

        if url::Url::parse(&self.base_url).is_err()
            || !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "llm.base_url".to_string(),
                value: self.base_url.clone(),
            });
        }

        if let Some(temp) = self.params.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(ConfigError::InvalidValue {
                    field: "llm.params.temperature".to_string(),
                    value: temp.to_string(),
                });
            }
        }

        if let Some(top_p) = self.params.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(ConfigError::InvalidValue {
                    field: "llm.params.top_p".to_string(),
                    value: top_p.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// A fully resolved search gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Instance name (`acme`) or host (`acme-be.glean.com`), with or without scheme
    pub instance: String,
    /// Bearer token for the search API
    pub api_token: String,
    /// Request timeout in seconds
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_timeout_secs() -> u64 {
    30
}

impl SearchConfig {
    /// Create a new search config with the default timeout
    pub fn new(instance: String, api_token: String) -> Self {
        Self {
            instance,
            api_token,
            timeout_secs: default_search_timeout_secs(),
        }
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instance.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: GLEAN_INSTANCE_ENV.to_string(),
            });
        }

        if self.api_token.is_empty() {
            return Err(ConfigError::MissingField {
                field: GLEAN_API_TOKEN_ENV.to_string(),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }
}
