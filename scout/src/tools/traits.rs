//! TravelTool trait definition

use async_trait::async_trait;
use serde_json::Value;

use super::context::ToolContext;

/// A travel capability the workflow's LLM may invoke by name
#[async_trait]
pub trait TravelTool: Send + Sync {
    /// Tool name (matches the tool_use name in assistant messages)
    fn name(&self) -> &'static str;

    /// Human-readable description advertised to the LLM
    fn description(&self) -> &'static str;

    /// JSON Schema for input arguments
    fn input_schema(&self) -> Value;

    /// Execute the tool
    ///
    /// Never fails outward: every failure mode resolves to an
    /// error-flagged [`ToolResult`] carrying a structured payload the
    /// next stage can surface in natural language.
    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult;
}

/// Result of one tool execution
///
/// `content` is a JSON document rendered to text - the conversation
/// stores tool results as strings, and the stage handlers let the LLM
/// read them.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    /// Successful result from a JSON value
    pub fn json(value: Value) -> Self {
        Self {
            content: value.to_string(),
            is_error: false,
        }
    }

    /// Error result with the `{"error": ...}` payload shape
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: serde_json::json!({"error": message.into()}).to_string(),
            is_error: true,
        }
    }

    /// Error result carrying recovery instructions for the user
    pub fn error_with_instructions(message: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            content: serde_json::json!({
                "error": message.into(),
                "instructions": instructions.into(),
            })
            .to_string(),
            is_error: true,
        }
    }

    /// Parse the content back into JSON (tests, result harvesting)
    pub fn as_json(&self) -> Option<Value> {
        serde_json::from_str(&self.content).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_result() {
        let result = ToolResult::json(serde_json::json!({"flights": []}));
        assert!(!result.is_error);
        assert!(result.as_json().unwrap()["flights"].is_array());
    }

    #[test]
    fn test_error_result_payload() {
        let result = ToolResult::error("SERPAPI_API_KEY not configured");
        assert!(result.is_error);
        let payload = result.as_json().unwrap();
        assert_eq!(payload["error"], "SERPAPI_API_KEY not configured");
    }

    #[test]
    fn test_error_with_instructions() {
        let result = ToolResult::error_with_instructions("Authentication required", "Run setup first");
        let payload = result.as_json().unwrap();
        assert_eq!(payload["error"], "Authentication required");
        assert_eq!(payload["instructions"], "Run setup first");
    }
}
