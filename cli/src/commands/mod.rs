//! CLI command implementations

pub mod deploy;
pub mod run;
pub mod tools;

pub use deploy::{deploy_command, DeployOptions, DeployTarget};
pub use run::{interactive_command, run_command};
pub use tools::tools_command;
