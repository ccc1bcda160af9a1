//! store_preference / recall_preferences - long-lived user preferences

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use tripstore::DEFAULT_RECALL_LIMIT;

use crate::tools::{ToolContext, ToolResult, TravelTool};

#[derive(Debug, Deserialize)]
struct StoreRequest {
    preference_type: String,
    value: String,
}

/// Remember a travel preference for the current user
pub struct StorePreferenceTool;

#[async_trait]
impl TravelTool for StorePreferenceTool {
    fn name(&self) -> &'static str {
        "store_preference"
    }

    fn description(&self) -> &'static str {
        "Remember a travel preference the user expressed, so future trips can use it."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "preference_type": {
                    "type": "string",
                    "description": "Category, e.g. \"airline\", \"hotel_stars\", \"seat_class\""
                },
                "value": {
                    "type": "string",
                    "description": "The preference itself, e.g. \"window seat\""
                }
            },
            "required": ["preference_type", "value"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        let req: StoreRequest = match serde_json::from_value(input) {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Invalid arguments: {}", e)),
        };

        match ctx.store.store_preference(&ctx.user_id, &req.preference_type, &req.value) {
            Ok(()) => {
                debug!(user_id = %ctx.user_id, preference_type = %req.preference_type, "store_preference");
                ToolResult::json(json!({
                    "stored": true,
                    "preference": format!("{}={}", req.preference_type, req.value),
                }))
            }
            Err(e) => ToolResult::error(format!("Failed to store preference: {}", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecallRequest {
    query: String,
}

/// Look up preferences relevant to the current request
pub struct RecallPreferencesTool;

#[async_trait]
impl TravelTool for RecallPreferencesTool {
    fn name(&self) -> &'static str {
        "recall_preferences"
    }

    fn description(&self) -> &'static str {
        "Recall stored travel preferences relevant to a query. Call this before searching."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for, e.g. \"airline and seating preferences\""
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        let req: RecallRequest = match serde_json::from_value(input) {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Invalid arguments: {}", e)),
        };

        match ctx.store.recall_preferences(&ctx.user_id, &req.query, DEFAULT_RECALL_LIMIT) {
            Ok(prefs) => {
                let rendered: Vec<String> = prefs.iter().map(|p| p.render()).collect();
                ToolResult::json(json!({"preferences": rendered}))
            }
            // Recall is advisory; a broken store degrades to "nothing
            // remembered" rather than failing the research stage
            Err(e) => ToolResult::json(json!({
                "preferences": [],
                "note": format!("preference store unavailable: {}", e),
            })),
        }
    }
}
