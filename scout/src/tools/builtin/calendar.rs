//! create_trip_event - Google Calendar integration

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::{ToolContext, ToolResult, TravelTool};

#[derive(Debug, Deserialize)]
struct EventRequest {
    title: String,
    start_date: String,
    end_date: String,
    description: String,
    location: String,
}

/// Stored OAuth token, written by a separate setup flow
#[derive(Debug, Deserialize)]
struct StoredToken {
    access_token: String,
}

/// Create an all-day calendar event for the trip
pub struct CreateTripEventTool;

#[async_trait]
impl TravelTool for CreateTripEventTool {
    fn name(&self) -> &'static str {
        "create_trip_event"
    }

    fn description(&self) -> &'static str {
        "Create a calendar event for the trip, spanning its start and end dates."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Event title (e.g. \"Tokyo Trip\")"
                },
                "start_date": {
                    "type": "string",
                    "description": "Format YYYY-MM-DD"
                },
                "end_date": {
                    "type": "string",
                    "description": "Format YYYY-MM-DD"
                },
                "description": {
                    "type": "string",
                    "description": "Trip details including flight/hotel info"
                },
                "location": {
                    "type": "string",
                    "description": "Destination city"
                }
            },
            "required": ["title", "start_date", "end_date", "description", "location"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        let event: EventRequest = match serde_json::from_value(input) {
            Ok(e) => e,
            Err(e) => return ToolResult::error(format!("Invalid arguments: {}", e)),
        };

        let token = match read_token(&ctx.calendar.token_path) {
            Some(t) => t,
            None => {
                return ToolResult::error_with_instructions(
                    "Google Calendar authentication required. Run setup first.",
                    format!(
                        "Authenticate with Google Calendar and save the OAuth token to {}",
                        ctx.calendar.token_path.display()
                    ),
                );
            }
        };

        debug!(title = %event.title, "create_trip_event: inserting event");

        let url = format!("{}/calendars/primary/events", ctx.calendar.base_url);
        let body = json!({
            "summary": event.title,
            "location": event.location,
            "description": event.description,
            "start": {"date": event.start_date},
            "end": {"date": event.end_date},
        });

        let response = match ctx.http.post(&url).bearer_auth(&token.access_token).json(&body).send().await {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Failed to create calendar event: {}", e)),
        };

        if response.status().as_u16() == 401 {
            return ToolResult::error_with_instructions(
                "Google Calendar token expired or invalid",
                "Re-authenticate with Google Calendar",
            );
        }
        if !response.status().is_success() {
            return ToolResult::error(format!("Failed to create calendar event: HTTP {}", response.status()));
        }

        let created: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => return ToolResult::error(format!("Failed to create calendar event: {}", e)),
        };

        ToolResult::json(json!({
            "event_id": created["id"],
            "link": created["htmlLink"].as_str().unwrap_or(""),
        }))
    }
}

fn read_token(path: &std::path::Path) -> Option<StoredToken> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}
