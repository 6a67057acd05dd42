//! Error types and handling for the agent core

use thiserror::Error;

/// Result type alias for agent core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the agent core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Search gateway errors
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Tool execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Agent execution errors
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// LLM client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimit { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failure reported by the endpoint without an HTTP status
    #[error("Serving endpoint error: {message}")]
    Endpoint { message: String },

    #[error("Stream error: {message}")]
    Stream { message: String },
}

/// Search gateway errors
///
/// These never reach the model directly; the search tools turn them into
/// user-facing text through [`SearchError::user_message`].
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search gateway returned status {status}")]
    Status { status: u16 },

    #[error("Search request timed out")]
    Timeout,

    #[error("Search request failed: {message}")]
    Transport { message: String },

    #[error("Malformed search response: {message}")]
    Decode { message: String },
}

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Tool execution failed: {name} - {message}")]
    ExecutionFailed { name: String, message: String },

    #[error("Invalid tool parameters: {message}")]
    InvalidParameters { message: String },
}

/// Agent execution errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl LlmError {
    /// Whether the failure is a rate limit that should be retried with backoff
    pub fn is_rate_limit(&self) -> bool {
        match self {
            LlmError::RateLimit { .. } => true,
            LlmError::ApiError { status, .. } => *status == 429,
            _ => false,
        }
    }
}

impl Error {
    /// Whether this error is an LLM rate limit
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::Llm(e) if e.is_rate_limit())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
