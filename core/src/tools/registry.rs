//! Tool registry for managing available tools

use crate::search::SearchBackend;
use crate::tools::search_tools::{SearchTool, SearchToolSpec, SEARCH_TOOLS};
use crate::tools::{Tool, ToolExecutor};
use std::sync::Arc;

/// Registry for managing tool creation and registration
#[derive(Default)]
pub struct ToolRegistry {
    factories: Vec<Box<dyn ToolFactory>>,
}

/// Factory trait for creating tools
pub trait ToolFactory: Send + Sync {
    /// Create a new instance of the tool
    fn create(&self) -> Box<dyn Tool>;

    /// Get the name of the tool this factory creates
    fn tool_name(&self) -> &str;

    /// Get the description of the tool this factory creates
    fn tool_description(&self) -> &str;
}

/// Creates search tools that share one backend
pub struct SearchToolFactory {
    spec: &'static SearchToolSpec,
    backend: Arc<dyn SearchBackend>,
}

impl SearchToolFactory {
    pub fn new(spec: &'static SearchToolSpec, backend: Arc<dyn SearchBackend>) -> Self {
        Self { spec, backend }
    }
}

impl ToolFactory for SearchToolFactory {
    fn create(&self) -> Box<dyn Tool> {
        Box::new(SearchTool::new(self.spec, Arc::clone(&self.backend)))
    }

    fn tool_name(&self) -> &str {
        self.spec.name
    }

    fn tool_description(&self) -> &str {
        self.spec.description
    }
}

impl ToolRegistry {
    /// Create an empty tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every search tool, bound to `backend`
    pub fn with_search_backend(backend: Arc<dyn SearchBackend>) -> Self {
        let mut registry = Self::new();
        for spec in SEARCH_TOOLS {
            registry.register_factory(Box::new(SearchToolFactory::new(spec, Arc::clone(&backend))));
        }
        registry
    }

    /// Register a tool factory, replacing one with the same tool name
    pub fn register_factory(&mut self, factory: Box<dyn ToolFactory>) {
        match self
            .factories
            .iter()
            .position(|f| f.tool_name() == factory.tool_name())
        {
            Some(idx) => self.factories[idx] = factory,
            None => self.factories.push(factory),
        }
    }

    /// Create a tool by name
    pub fn create_tool(&self, name: &str) -> Option<Box<dyn Tool>> {
        self.factories
            .iter()
            .find(|f| f.tool_name() == name)
            .map(|factory| factory.create())
    }

    /// List all available tool names in registration order
    pub fn list_tools(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.tool_name()).collect()
    }

    /// Get tool information
    pub fn get_tool_info(&self, name: &str) -> Option<(&str, &str)> {
        self.factories
            .iter()
            .find(|f| f.tool_name() == name)
            .map(|factory| (factory.tool_name(), factory.tool_description()))
    }

    /// Create a tool executor with the specified tools
    pub fn create_executor(&self, tool_names: &[String]) -> ToolExecutor {
        let mut executor = ToolExecutor::new();

        for name in tool_names {
            if let Some(tool) = self.create_tool(name) {
                executor.register_tool(tool);
            }
        }

        executor
    }

    /// Create a tool executor with all available tools
    pub fn create_executor_with_all(&self) -> ToolExecutor {
        let mut executor = ToolExecutor::new();

        for factory in &self.factories {
            executor.register_tool(factory.create());
        }

        executor
    }
}
