//! CLI configuration loader for eps-agent
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./eps-agent.json or ./.eps-agent/config.json
//! 3. Git repository root: <repo_root>/.eps-agent/config.json
//! 4. XDG config: $XDG_CONFIG_HOME/eps-agent/config.json or ~/.config/eps-agent/config.json
//! 5. Environment variables only (no files)
//!
//! Values missing from the file fall back to the environment.

use anyhow::{anyhow, Context, Result};
use eps_agent_core::config::{
    DATABRICKS_HOST_ENV, DATABRICKS_TOKEN_ENV, DEFAULT_LLM_ENDPOINT, GLEAN_API_TOKEN_ENV,
    GLEAN_INSTANCE_ENV, LLM_ENDPOINT_ENV,
};
use eps_agent_core::{AgentConfig, ModelParams, ResolvedLlmConfig, SearchConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides the agent's iteration budget
pub const MAX_ITERATIONS_ENV: &str = "EPS_AGENT_MAX_ITERATIONS";

const APP_DIR: &str = "eps-agent";

/// LLM section of the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLlmConfig {
    /// Serving platform workspace host
    pub host: Option<String>,
    /// Explicit OpenAI-compatible base URL, replaces `<host>/serving-endpoints`
    pub base_url: Option<String>,
    /// Access token (can be "env:VAR_NAME")
    pub token: Option<String>,
    /// Serving endpoint name
    pub endpoint: Option<String>,
    #[serde(default)]
    pub params: ModelParams,
}

/// Search section of the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSearchConfig {
    pub instance: Option<String>,
    /// API token (can be "env:VAR_NAME")
    pub api_token: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Raw configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub llm: RawLlmConfig,
    #[serde(default)]
    pub search: RawSearchConfig,
    #[serde(default)]
    pub agent: Option<AgentConfig>,
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub llm: ResolvedLlmConfig,
    pub search: SearchConfig,
    pub agent: AgentConfig,
    /// The file the configuration came from, if any
    pub source: Option<PathBuf>,
}

/// CLI configuration loader
#[derive(Default)]
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    endpoint_override: Option<String>,
    host_override: Option<String>,
    instance_override: Option<String>,
    max_iterations_override: Option<usize>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set serving endpoint override
    pub fn with_endpoint_override(mut self, endpoint: String) -> Self {
        self.endpoint_override = Some(endpoint);
        self
    }

    /// Set workspace host override
    pub fn with_host_override(mut self, host: String) -> Self {
        self.host_override = Some(host);
        self
    }

    /// Set search instance override
    pub fn with_instance_override(mut self, instance: String) -> Self {
        self.instance_override = Some(instance);
        self
    }

    /// Set iteration budget override
    pub fn with_max_iterations_override(mut self, max_iterations: usize) -> Self {
        self.max_iterations_override = Some(max_iterations);
        self
    }

    /// Load and resolve configuration from files and the process environment
    pub async fn load(&self) -> Result<LoadedConfig> {
        self.load_with_env(&|name| std::env::var(name).ok()).await
    }

    /// Load and resolve configuration using `env` for variable lookups
    pub async fn load_with_env(
        &self,
        env: &(dyn Fn(&str) -> Option<String> + Sync),
    ) -> Result<LoadedConfig> {
        // Step 1: Find and load base configuration
        let (config, source) = if let Some(override_path) = &self.config_override {
            let path = expand_path(override_path);
            let (config, file) = self.load_from_path(&path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?;
            (config, Some(file))
        } else {
            self.search_and_load().await?
        };

        match &source {
            Some(path) => debug!("Using config file {}", path.display()),
            None => debug!("No config file found, using environment only"),
        }

        // Step 2: Apply flag overrides and resolve
        self.resolve_config(config, source, env)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<(RawConfig, Option<PathBuf>)> {
        let cwd = std::env::current_dir()?;
        let mut candidates = vec![
            cwd.join(format!("{}.json", APP_DIR)),
            cwd.join(format!(".{}", APP_DIR)).join("config.json"),
        ];
        if let Some(git_root) = find_git_root(&cwd) {
            candidates.push(git_root.join(format!(".{}", APP_DIR)).join("config.json"));
        }
        if let Some(config_dir) = xdg_config_dir() {
            candidates.push(config_dir.join(APP_DIR).join("config.json"));
        }

        for candidate in candidates {
            if candidate.is_file() {
                let config = self.load_file(&candidate).await?;
                return Ok((config, Some(candidate)));
            }
        }

        Ok((RawConfig::default(), None))
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<(RawConfig, PathBuf)> {
        if path.is_file() {
            Ok((self.load_file(path).await?, path.to_path_buf()))
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                Ok((self.load_file(&config_file).await?, config_file))
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn resolve_config(
        &self,
        config: RawConfig,
        source: Option<PathBuf>,
        env: &(dyn Fn(&str) -> Option<String> + Sync),
    ) -> Result<LoadedConfig> {
        let RawConfig { llm, search, agent } = config;

        // LLM
        let base_url = match (&self.host_override, llm.base_url, llm.host) {
            (Some(host), _, _) => ResolvedLlmConfig::serving_endpoints_url(host),
            (None, Some(base_url), _) => base_url,
            (None, None, Some(host)) => ResolvedLlmConfig::serving_endpoints_url(&host),
            (None, None, None) => env(DATABRICKS_HOST_ENV)
                .map(|host| ResolvedLlmConfig::serving_endpoints_url(&host))
                .ok_or_else(|| {
                    anyhow!(
                        "No serving host configured. Set {} or llm.host in the config file",
                        DATABRICKS_HOST_ENV
                    )
                })?,
        };

        let api_key = resolve_secret(llm.token, DATABRICKS_TOKEN_ENV, env)?.ok_or_else(|| {
            anyhow!(
                "No serving token configured. Set {} or llm.token in the config file",
                DATABRICKS_TOKEN_ENV
            )
        })?;

        let model = self
            .endpoint_override
            .clone()
            .or(llm.endpoint)
            .or_else(|| env(LLM_ENDPOINT_ENV))
            .unwrap_or_else(|| DEFAULT_LLM_ENDPOINT.to_string());

        let llm_config = ResolvedLlmConfig::new(base_url, api_key, model).with_params(llm.params);
        llm_config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        // Search
        let instance = self
            .instance_override
            .clone()
            .or(search.instance)
            .or_else(|| env(GLEAN_INSTANCE_ENV))
            .ok_or_else(|| anyhow!("{} must be set", GLEAN_INSTANCE_ENV))?;
        let api_token = resolve_secret(search.api_token, GLEAN_API_TOKEN_ENV, env)?
            .ok_or_else(|| anyhow!("{} must be set", GLEAN_API_TOKEN_ENV))?;

        let mut search_config = SearchConfig::new(instance, api_token);
        if let Some(timeout_secs) = search.timeout_secs {
            search_config.timeout_secs = timeout_secs;
        }
        search_config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        // Agent
        let mut agent_config = agent.unwrap_or_default();
        if let Some(raw) = env(MAX_ITERATIONS_ENV) {
            agent_config.max_iterations = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a positive integer", MAX_ITERATIONS_ENV))?;
        }
        if let Some(max_iterations) = self.max_iterations_override {
            agent_config.max_iterations = max_iterations;
        }
        if agent_config.max_iterations == 0 {
            return Err(anyhow!("max_iterations must be at least 1"));
        }

        Ok(LoadedConfig {
            llm: llm_config,
            search: search_config,
            agent: agent_config,
            source,
        })
    }
}

/// Resolve a secret from the file value (plain or `env:VAR`) or the default variable
fn resolve_secret(
    value: Option<String>,
    default_env: &str,
    env: &(dyn Fn(&str) -> Option<String> + Sync),
) -> Result<Option<String>> {
    match value {
        Some(value) => match value.strip_prefix("env:") {
            Some(var_name) => env(var_name)
                .map(Some)
                .with_context(|| format!("Environment variable not found: {}", var_name)),
            None => Ok(Some(value)),
        },
        None => Ok(env(default_env).filter(|v| !v.is_empty())),
    }
}

/// Expand `~` and environment variables in a user-supplied path
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

/// Find git repository root
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Get XDG config directory
fn xdg_config_dir() -> Option<PathBuf> {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg_config) if !xdg_config.is_empty() => Some(PathBuf::from(xdg_config)),
        _ => dirs::home_dir().map(|home| home.join(".config")),
    }
}
