// ABOUTME: Fixed tool registry, built once at startup as data rather than discovered via reflection
// ABOUTME: A name-keyed Arc<dyn Tool> map; lookups are O(1) and registration happens once at startup

use std::collections::HashMap;
use std::sync::Arc;

use meridian_providers::ToolSpec;

use crate::error::{AgentError, Result};
use crate::tool::Tool;

pub struct ToolRegistry {
    tools: HashMap<&'static str, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tool_names", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.descriptor().name, tool);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// # Errors
    /// Returns `AgentError::UnknownTool` when no tool with this name was registered.
    pub fn require(&self, name: &str) -> Result<&Arc<dyn Tool>> {
        self.get(name).ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    /// The specs sent to the LLM collaborator on every `chat` call, in
    /// registration order.
    #[must_use]
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .values()
            .map(|tool| {
                let descriptor = tool.descriptor();
                ToolSpec {
                    name: descriptor.name.to_string(),
                    description: descriptor.description.to_string(),
                    parameters_schema: descriptor.input_schema.clone(),
                }
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
