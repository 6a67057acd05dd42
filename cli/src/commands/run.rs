//! Question answering commands: single question and interactive chat

use crate::config::{CliConfigLoader, LoadedConfig};
use crate::output::{CliOutputConfig, CliOutputHandler};
use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input};
use eps_agent_core::agent::{InputMessage, RequestContext};
use eps_agent_core::{AgentBuilder, AgentCore, AgentRequest};
use tracing::{debug, info};

/// Inputs that end an interactive session
const EXIT_COMMANDS: &[&str] = &["exit", "quit", ":q"];

async fn build_agent(config_loader: &CliConfigLoader) -> Result<AgentCore> {
    let LoadedConfig {
        llm,
        search,
        agent,
        source,
    } = config_loader.load().await?;

    if let Some(path) = &source {
        debug!("Loaded configuration from {}", path.display());
    }
    info!("Using serving endpoint: {}", llm.model);

    AgentBuilder::new(llm, search)
        .with_agent_config(agent)
        .build()
        .context("Failed to initialise the agent")
}

/// Answer a single question
pub async fn run_command(question: String, config_loader: CliConfigLoader) -> Result<()> {
    let agent = build_agent(&config_loader).await?;
    let output = CliOutputHandler::new(CliOutputConfig::default());

    let request = AgentRequest::from_question(question);
    agent.predict_stream(&request, &output).await;
    Ok(())
}

/// Interactive chat that keeps the conversation history between questions
pub async fn interactive_command(config_loader: CliConfigLoader) -> Result<()> {
    let agent = build_agent(&config_loader).await?;
    let output = CliOutputHandler::new(CliOutputConfig::default());
    let theme = ColorfulTheme::default();

    let context = RequestContext {
        user_id: std::env::var("USER").ok(),
        conversation_id: Some(uuid::Uuid::new_v4().to_string()),
    };
    let mut history: Vec<InputMessage> = Vec::new();

    println!("{}", "EPS account intelligence agent".bold());
    println!(
        "{}",
        format!("Ask about an account. Type {} to leave.", EXIT_COMMANDS.join(", ")).dimmed()
    );

    loop {
        let line: String = Input::with_theme(&theme)
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")?;

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit_command(question) {
            break;
        }

        history.push(InputMessage::user(question));
        let request = AgentRequest {
            input: history.clone(),
            context: Some(context.clone()),
        };

        let response = agent.predict_stream(&request, &output).await;
        if let Some(answer) = response.final_text() {
            history.push(InputMessage::assistant(answer));
        }
    }

    println!("{}", "Goodbye!".dimmed());
    Ok(())
}

fn is_exit_command(input: &str) -> bool {
    EXIT_COMMANDS
        .iter()
        .any(|cmd| cmd.eq_ignore_ascii_case(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("QUIT"));
        assert!(!is_exit_command("exit strategy for Tesla"));
    }
}
