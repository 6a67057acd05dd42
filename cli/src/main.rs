//! # eps-agent CLI
//!
//! Command-line interface for the EPS account intelligence agent.
//!
//! ## Usage
//!
//! - `eps-agent` - Start an interactive chat
//! - `eps-agent "question"` - Answer a single question
//! - `eps-agent tools` - Show available tools
//! - `eps-agent deploy [dev|staging|prod]` - Deploy the agent bundle

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod output;

use commands::{
    deploy_command, interactive_command, run_command, tools_command, DeployOptions, DeployTarget,
};
use config::CliConfigLoader;

/// eps-agent - Account intelligence over enterprise search
#[derive(Parser)]
#[command(name = "eps-agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Answers Account Manager questions using Salesforce, Gong, Slack and Drive search")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serving endpoint name override
    #[arg(long)]
    endpoint: Option<String>,

    /// Serving platform workspace host override
    #[arg(long)]
    host: Option<String>,

    /// Search instance override
    #[arg(long)]
    search_instance: Option<String>,

    /// Maximum number of agent loop iterations
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// The question to answer (if omitted, starts an interactive chat)
    question: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show available tools
    Tools,

    /// Validate, deploy and summarize the agent bundle for a target
    Deploy {
        /// Deployment target
        #[arg(value_enum, default_value_t = DeployTarget::Dev)]
        target: DeployTarget,

        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,

        /// Platform CLI executable
        #[arg(long, default_value = "databricks")]
        databricks_bin: String,
    },
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(endpoint) = &cli.endpoint {
        loader = loader.with_endpoint_override(endpoint.clone());
    }

    if let Some(host) = &cli.host {
        loader = loader.with_host_override(host.clone());
    }

    if let Some(instance) = &cli.search_instance {
        loader = loader.with_instance_override(instance.clone());
    }

    if let Some(max_iterations) = cli.max_iterations {
        loader = loader.with_max_iterations_override(max_iterations);
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    eps_agent_core::init_tracing_with_debug(cli.verbose);

    let config_loader = build_config_loader(&cli);

    match (cli.question, cli.command) {
        (Some(question), None) => {
            if question.trim().is_empty() {
                bail!("Question must not be empty");
            }
            run_command(question, config_loader).await
        }
        (Some(_), Some(_)) => bail!("Cannot specify both a question and a subcommand"),
        (None, Some(Commands::Tools)) => tools_command().await,
        (None, Some(Commands::Deploy {
            target,
            dry_run,
            databricks_bin,
        })) => {
            deploy_command(DeployOptions {
                target,
                dry_run,
                databricks_bin,
            })
            .await
        }
        (None, None) => interactive_command(config_loader).await,
    }
}
