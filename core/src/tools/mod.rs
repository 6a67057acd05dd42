//! Tool system and the search tools

pub mod base;
pub mod registry;
pub mod search_tools;

pub use base::{
    Tool, ToolCall, ToolExecutor, ToolResult, TOOL_FAILURE_MESSAGE,
    UNKNOWN_TOOL_MESSAGE,
};
pub use registry::{SearchToolFactory, ToolFactory, ToolRegistry};
pub use search_tools::{find_search_tool, SearchTool, SearchToolSpec, SEARCH_TOOLS};
