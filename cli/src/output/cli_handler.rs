//! CLI output handler implementation

use async_trait::async_trait;
use colored::Colorize;
use eps_agent_core::output::{
    AgentEvent, AgentOutput, MessageLevel, OutputResult, ToolExecutionInfo, ToolExecutionStatus,
};
use eps_agent_core::OutputItem;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Longest tool result preview printed under a finished tool
const RESULT_PREVIEW_CHARS: usize = 160;

/// CLI output configuration
#[derive(Debug, Clone)]
pub struct CliOutputConfig {
    /// Show spinners and print text deltas as they arrive
    pub realtime_updates: bool,
    /// Print execution statistics when a request completes
    pub show_stats: bool,
}

impl Default for CliOutputConfig {
    fn default() -> Self {
        Self {
            realtime_updates: true,
            show_stats: true,
        }
    }
}

/// CLI output handler that formats events for terminal display
pub struct CliOutputHandler {
    config: CliOutputConfig,
    /// Spinners for tools that are still running, by call id
    active_tools: Mutex<HashMap<String, ProgressBar>>,
    /// Text items whose content was already printed as deltas
    streamed_items: Mutex<HashSet<String>>,
}

impl CliOutputHandler {
    /// Create a new CLI output handler
    pub fn new(config: CliOutputConfig) -> Self {
        Self {
            config,
            active_tools: Mutex::new(HashMap::new()),
            streamed_items: Mutex::new(HashSet::new()),
        }
    }

    fn tool_spinner(&self, tool_info: &ToolExecutionInfo) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(format_tool_line(tool_info));
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    async fn handle_item(&self, item: OutputItem) {
        match item {
            OutputItem::Text { id, text } => {
                let streamed = self.streamed_items.lock().await.remove(&id);
                if streamed {
                    // Deltas already printed the text
                    println!();
                } else {
                    println!("{}", text);
                }
            }
            OutputItem::FunctionCall { name, arguments, .. } => {
                debug!("Model requested {} with {}", name, arguments);
            }
            OutputItem::FunctionCallOutput { call_id, output } => {
                debug!("Tool output for {}: {} chars", call_id, output.len());
            }
        }
    }
}

impl Default for CliOutputHandler {
    fn default() -> Self {
        Self::new(CliOutputConfig::default())
    }
}

#[async_trait]
impl AgentOutput for CliOutputHandler {
    async fn emit_event(&self, event: AgentEvent) -> OutputResult {
        match event {
            AgentEvent::ExecutionStarted { context } => {
                debug!(
                    "Starting request {} (max {} iterations)",
                    context.request_id, context.max_iterations
                );
            }

            AgentEvent::ExecutionCompleted { context, success } => {
                if !success {
                    debug!("Request {} ended with the fallback answer", context.request_id);
                }
                if self.config.show_stats {
                    let mut stats = format!(
                        "{} iterations · {:.2}s",
                        context.iterations,
                        context.execution_time.as_secs_f64()
                    );
                    let usage = context.token_usage;
                    if usage.total_tokens > 0 {
                        stats.push_str(&format!(
                            " · {} input + {} output = {} tokens",
                            usage.input_tokens, usage.output_tokens, usage.total_tokens
                        ));
                    }
                    println!("{}", stats.dimmed());
                }
            }

            AgentEvent::TextDelta { item_id, delta } => {
                if self.config.realtime_updates {
                    print!("{}", delta);
                    std::io::stdout().flush()?;
                    self.streamed_items.lock().await.insert(item_id);
                }
            }

            AgentEvent::OutputItemDone { item } => {
                self.handle_item(item).await;
            }

            AgentEvent::ToolExecutionStarted { tool_info } => {
                if self.config.realtime_updates {
                    let spinner = self.tool_spinner(&tool_info);
                    self.active_tools
                        .lock()
                        .await
                        .insert(tool_info.call_id.clone(), spinner);
                } else {
                    println!("{} {}", "●".white(), format_tool_line(&tool_info));
                }
            }

            AgentEvent::ToolExecutionCompleted { tool_info } => {
                if let Some(spinner) = self.active_tools.lock().await.remove(&tool_info.call_id) {
                    spinner.finish_and_clear();
                }

                let marker = match tool_info.status {
                    ToolExecutionStatus::Success => "●".green(),
                    ToolExecutionStatus::Error => "●".red(),
                    ToolExecutionStatus::Executing => "●".white(),
                };
                println!("{} {}", marker, format_tool_line(&tool_info));

                if let Some(result) = &tool_info.result {
                    let preview = preview(&result.content, RESULT_PREVIEW_CHARS);
                    if !preview.is_empty() {
                        println!("  ⎿ {}", preview.dimmed());
                    }
                }
            }

            AgentEvent::TokenUsageUpdated { token_usage } => {
                debug!("Tokens so far: {}", token_usage.total_tokens);
            }

            AgentEvent::Message { level, content } => match level {
                MessageLevel::Debug => debug!("{}", content),
                MessageLevel::Info => info!("{}", content),
                MessageLevel::Normal => println!("{}", content),
                MessageLevel::Warning => warn!("{}", content),
                MessageLevel::Error => error!("{}", content),
            },
        }

        Ok(())
    }

    fn supports_realtime_updates(&self) -> bool {
        self.config.realtime_updates
    }

    async fn flush(&self) -> OutputResult {
        for (_, spinner) in self.active_tools.lock().await.drain() {
            spinner.finish_and_clear();
        }
        std::io::stdout().flush()?;
        Ok(())
    }
}

/// `tool_name("query")` style status line
fn format_tool_line(tool_info: &ToolExecutionInfo) -> String {
    let query = tool_info
        .parameters
        .get("query")
        .and_then(|q| q.as_str())
        .unwrap_or("");
    format!("{}(\"{}\")", tool_info.tool_name.bold(), query)
}

/// First line of `text`, cut to `max_chars` characters
fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let mut out: String = first_line.chars().take(max_chars).collect();
    if first_line.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}
