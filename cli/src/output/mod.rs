//! CLI-specific output implementations
//!
//! Renders agent events for the terminal: streamed answer text, tool
//! progress spinners and a short statistics footer.

pub mod cli_handler;

pub use cli_handler::{CliOutputConfig, CliOutputHandler};
