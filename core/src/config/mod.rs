//! Minimal configuration module for the agent core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{
    ModelParams, ResolvedLlmConfig, SearchConfig, DATABRICKS_HOST_ENV, DATABRICKS_TOKEN_ENV,
    DEFAULT_LLM_ENDPOINT, GLEAN_API_TOKEN_ENV, GLEAN_INSTANCE_ENV, LLM_ENDPOINT_ENV,
};
