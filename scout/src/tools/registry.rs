//! ToolRegistry - closed set of named tools the workflow may invoke

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::llm::{ToolCall, ToolDefinition};

use super::builtin::{
    AddItineraryItemTool, CreateTripEventTool, ListTripsTool, RecallPreferencesTool, SearchFlightsTool,
    SearchHotelsTool, StorePreferenceTool,
};
use super::{ToolContext, ToolError, ToolResult, TravelTool};

/// Registry mapping tool names to handlers
///
/// The set is fixed at construction; dispatch is by name, and an
/// unknown name resolves to an error result rather than a panic, so a
/// hallucinated tool call degrades into conversation the next stage
/// can react to.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn TravelTool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    /// Registry with the standard travel tool set
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.add_tool(Box::new(SearchFlightsTool));
        registry.add_tool(Box::new(SearchHotelsTool));
        registry.add_tool(Box::new(CreateTripEventTool));
        registry.add_tool(Box::new(StorePreferenceTool));
        registry.add_tool(Box::new(RecallPreferencesTool));
        registry.add_tool(Box::new(AddItineraryItemTool));
        registry.add_tool(Box::new(ListTripsTool));
        registry
    }

    /// Empty registry (tests)
    pub fn empty() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Register a tool
    pub fn add_tool(&mut self, tool: Box<dyn TravelTool>) {
        debug!(tool_name = %tool.name(), "ToolRegistry::add_tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Definitions advertised to the LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect();
        // Stable ordering keeps prompts deterministic
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Fail fast if a configured tool name has no handler
    ///
    /// Called at startup so a typo in configuration is a detectable
    /// error instead of a silent per-call failure.
    pub fn validate_names(&self, names: &[String]) -> Result<(), ToolError> {
        for name in names {
            if !self.tools.contains_key(name) {
                return Err(ToolError::UnknownTool { name: name.clone() });
            }
        }
        Ok(())
    }

    /// Drop every tool not in `names`
    ///
    /// Validate the names first; an unknown name here is silently a
    /// no-op.
    pub fn retain(&mut self, names: &[String]) {
        self.tools.retain(|name, _| names.iter().any(|n| n == name));
    }

    /// Execute a single tool call
    pub async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        match self.tools.get(&call.name) {
            Some(tool) => {
                debug!(tool_name = %call.name, tool_id = %call.id, "ToolRegistry::execute");
                tool.execute(call.input.clone(), ctx).await
            }
            None => {
                warn!(tool_name = %call.name, "ToolRegistry::execute: unknown tool");
                ToolResult::error(format!("Unknown tool: {}", call.name))
            }
        }
    }

    /// Execute tool calls in request order
    ///
    /// Returns exactly one id-tagged result per call. Failures are
    /// error results, never panics or Err - the controller appends
    /// them to the conversation either way.
    pub async fn execute_all(&self, calls: &[ToolCall], ctx: &ToolContext) -> Vec<(String, ToolResult)> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let result = self.execute(call, ctx).await;
            results.push((call.id.clone(), result));
        }
        results
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}
