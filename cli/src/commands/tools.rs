//! Tools listing command

use anyhow::Result;
use colored::Colorize;
use eps_agent_core::tools::SEARCH_TOOLS;
use tracing::info;

/// Show the search tools offered to the model
pub async fn tools_command() -> Result<()> {
    info!("Listing available tools");

    println!("{}\n", "Available Tools".bold());

    for spec in SEARCH_TOOLS {
        println!("{} {}", "•".cyan(), spec.name.bold());
        println!("  {}", spec.description);
        let sources = if spec.datasources.is_empty() {
            "all".to_string()
        } else {
            spec.datasources.join(", ")
        };
        println!(
            "  {}\n",
            format!("sources: {} · page size: {}", sources, spec.page_size).dimmed()
        );
    }

    Ok(())
}
