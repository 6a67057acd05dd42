//! Bundle deployment command
//!
//! Drives the platform CLI through `bundle validate`, `bundle deploy` and
//! `bundle summary` for one target, stopping at the first failure.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use clap::ValueEnum;
use colored::Colorize;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Deployment target declared in the bundle configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DeployTarget {
    #[default]
    Dev,
    Staging,
    Prod,
}

impl DeployTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployTarget::Dev => "dev",
            DeployTarget::Staging => "staging",
            DeployTarget::Prod => "prod",
        }
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bundle subcommands, in execution order
pub const BUNDLE_STEPS: [&str; 3] = ["validate", "deploy", "summary"];

/// Arguments for one bundle step against `target`
pub fn bundle_args(step: &str, target: DeployTarget) -> Vec<String> {
    vec![
        "bundle".to_string(),
        step.to_string(),
        "-t".to_string(),
        target.as_str().to_string(),
    ]
}

/// Runs one platform CLI invocation and reports its exit code
#[async_trait]
pub trait BundleRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<i32>;
}

/// Spawns the platform CLI as a child process with inherited stdio
pub struct ProcessRunner;

#[async_trait]
impl BundleRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<i32> {
        let executable = which::which(program)
            .with_context(|| format!("Could not find '{}' on PATH", program))?;
        debug!("Resolved {} to {}", program, executable.display());

        let status = Command::new(&executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .with_context(|| format!("Failed to spawn {}", executable.display()))?;

        // Killed by a signal
        Ok(status.code().unwrap_or(-1))
    }
}

/// Deploy command options
#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub target: DeployTarget,
    pub dry_run: bool,
    pub databricks_bin: String,
}

/// Run the bundle steps for the selected target
pub async fn deploy_command(options: DeployOptions) -> Result<()> {
    if options.databricks_bin.trim().is_empty() {
        bail!("--databricks-bin must not be empty");
    }
    run_deploy(&options, &ProcessRunner).await
}

/// Run the bundle steps with an explicit runner
pub async fn run_deploy(options: &DeployOptions, runner: &dyn BundleRunner) -> Result<()> {
    info!(target = %options.target, dry_run = options.dry_run, "Deploying bundle");

    for step in BUNDLE_STEPS {
        let args = bundle_args(step, options.target);
        let display = format!("{} {}", options.databricks_bin, args.join(" "));

        if options.dry_run {
            println!("{}", display);
            continue;
        }

        println!("{} {}", "▶".cyan(), display.bold());
        let code = runner.run(&options.databricks_bin, &args).await?;
        if code != 0 {
            println!("{} {} failed", "✗".red(), display);
            return Err(anyhow!(
                "`{}` exited with status {} (target {})",
                display,
                code,
                options.target
            ));
        }
        println!("{} {}", "✓".green(), display);
    }

    if options.dry_run {
        return Ok(());
    }

    if options.target == DeployTarget::Prod {
        println!("{}", "Deployed to prod".green().bold());
    } else {
        println!("Deployed to {}", options.target);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockRunner {
        codes: Vec<i32>,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl MockRunner {
        fn new(codes: Vec<i32>) -> Self {
            Self {
                codes,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn steps(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, args)| args[1].clone())
                .collect()
        }
    }

    #[async_trait]
    impl BundleRunner for MockRunner {
        async fn run(&self, program: &str, args: &[String]) -> Result<i32> {
            let mut calls = self.calls.lock().unwrap();
            let code = self.codes.get(calls.len()).copied().unwrap_or(0);
            calls.push((program.to_string(), args.to_vec()));
            Ok(code)
        }
    }

    fn options(target: DeployTarget, dry_run: bool) -> DeployOptions {
        DeployOptions {
            target,
            dry_run,
            databricks_bin: "databricks".to_string(),
        }
    }

    #[tokio::test]
    async fn test_runs_steps_in_order() {
        let runner = MockRunner::new(vec![0, 0, 0]);
        run_deploy(&options(DeployTarget::Staging, false), &runner)
            .await
            .unwrap();

        assert_eq!(runner.steps(), vec!["validate", "deploy", "summary"]);
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].0, "databricks");
        assert_eq!(calls[1].1, vec!["bundle", "deploy", "-t", "staging"]);
    }

    #[tokio::test]
    async fn test_stops_after_first_failure() {
        let runner = MockRunner::new(vec![1]);
        let err = run_deploy(&options(DeployTarget::Dev, false), &runner)
            .await
            .unwrap_err();

        assert_eq!(runner.steps(), vec!["validate"]);
        assert!(err.to_string().contains("bundle validate -t dev"));

        let runner = MockRunner::new(vec![0, 2]);
        assert!(run_deploy(&options(DeployTarget::Prod, false), &runner)
            .await
            .is_err());
        assert_eq!(runner.steps(), vec!["validate", "deploy"]);
    }

    #[tokio::test]
    async fn test_dry_run_spawns_nothing() {
        let runner = MockRunner::new(vec![1, 1, 1]);
        run_deploy(&options(DeployTarget::Prod, true), &runner)
            .await
            .unwrap();
        assert!(runner.steps().is_empty());
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let result = ProcessRunner
            .run("eps-agent-no-such-binary", &bundle_args("validate", DeployTarget::Dev))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_target_names() {
        assert_eq!(DeployTarget::default(), DeployTarget::Dev);
        assert_eq!(
            DeployTarget::from_str("staging", false).unwrap(),
            DeployTarget::Staging
        );
        assert!(DeployTarget::from_str("qa", false).is_err());
        assert_eq!(DeployTarget::Prod.to_string(), "prod");
    }
}
