//! add_itinerary_item / list_trips - persistent itinerary storage

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use tripstore::NewItineraryItem;

use crate::tools::{ToolContext, ToolResult, TravelTool};

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    trip_id: i64,
    title: String,
    item_type: String,
    start_datetime: String,
    end_datetime: Option<String>,
    location: Option<String>,
    description: Option<String>,
    cost: Option<f64>,
}

/// Add a booked item (flight, hotel, activity) to a trip's itinerary
pub struct AddItineraryItemTool;

#[async_trait]
impl TravelTool for AddItineraryItemTool {
    fn name(&self) -> &'static str {
        "add_itinerary_item"
    }

    fn description(&self) -> &'static str {
        "Add an item to a trip's itinerary. Item types: flight, hotel, activity, dining, transport."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "trip_id": {
                    "type": "integer",
                    "description": "Trip to attach the item to (see list_trips)"
                },
                "title": {
                    "type": "string",
                    "description": "Short label, e.g. \"Flight to Tokyo\""
                },
                "item_type": {
                    "type": "string",
                    "enum": ["flight", "hotel", "activity", "dining", "transport"]
                },
                "start_datetime": {
                    "type": "string",
                    "description": "ISO 8601, e.g. \"2026-04-10T10:30:00\""
                },
                "end_datetime": {
                    "type": "string",
                    "description": "ISO 8601, omit for point-in-time items"
                },
                "location": {
                    "type": "string"
                },
                "description": {
                    "type": "string"
                },
                "cost": {
                    "type": "number",
                    "description": "Cost in USD"
                }
            },
            "required": ["trip_id", "title", "item_type", "start_datetime"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        let req: AddItemRequest = match serde_json::from_value(input) {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Invalid arguments: {}", e)),
        };

        let title = req.title.clone();
        let item = NewItineraryItem {
            trip_id: req.trip_id,
            title: req.title,
            item_type: req.item_type,
            start_datetime: req.start_datetime,
            end_datetime: req.end_datetime,
            location: req.location,
            description: req.description,
            cost: req.cost,
        };

        match ctx.store.add_itinerary_item(item) {
            Ok(item_id) => {
                debug!(item_id, trip_id = req.trip_id, "add_itinerary_item");
                ToolResult::json(json!({
                    "status": "success",
                    "item_id": item_id,
                    "message": format!("Added {} to itinerary", title),
                }))
            }
            Err(e) => ToolResult::error(format!("Failed to add itinerary item: {}", e)),
        }
    }
}

/// List saved trips so the agent can pick a trip_id
pub struct ListTripsTool;

#[async_trait]
impl TravelTool for ListTripsTool {
    fn name(&self) -> &'static str {
        "list_trips"
    }

    fn description(&self) -> &'static str {
        "List saved trips with their ids, newest first."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value, ctx: &ToolContext) -> ToolResult {
        match ctx.store.list_trips() {
            Ok(trips) => {
                let trips: Vec<Value> = trips
                    .iter()
                    .map(|t| {
                        json!({
                            "id": t.id,
                            "name": t.name,
                            "destination": t.destination,
                            "start_date": t.start_date,
                        })
                    })
                    .collect();
                ToolResult::json(json!({"trips": trips}))
            }
            Err(e) => ToolResult::error(format!("Failed to list trips: {}", e)),
        }
    }
}
