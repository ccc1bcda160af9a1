//! search_flights - flight search via SerpApi Google Flights

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::{ToolContext, ToolResult, TravelTool};

/// Cap on returned options
const MAX_FLIGHTS: usize = 10;

#[derive(Debug, Deserialize)]
struct FlightQuery {
    origin: String,
    destination: String,
    departure_date: String,
    return_date: Option<String>,
    #[serde(default = "default_adults")]
    adults: u32,
    #[serde(default)]
    direct_only: bool,
    max_price: Option<f64>,
}

fn default_adults() -> u32 {
    1
}

/// Search for flights between two airports
pub struct SearchFlightsTool;

#[async_trait]
impl TravelTool for SearchFlightsTool {
    fn name(&self) -> &'static str {
        "search_flights"
    }

    fn description(&self) -> &'static str {
        "Search for flights using Google Flights. Returns price, airline, duration, and stops for each option."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "origin": {
                    "type": "string",
                    "description": "IATA airport code (e.g. \"SFO\")"
                },
                "destination": {
                    "type": "string",
                    "description": "IATA airport code (e.g. \"NRT\")"
                },
                "departure_date": {
                    "type": "string",
                    "description": "Format YYYY-MM-DD"
                },
                "return_date": {
                    "type": "string",
                    "description": "Format YYYY-MM-DD, omit for one-way"
                },
                "adults": {
                    "type": "integer",
                    "description": "Number of passengers",
                    "default": 1
                },
                "direct_only": {
                    "type": "boolean",
                    "description": "Only return non-stop flights",
                    "default": false
                },
                "max_price": {
                    "type": "number",
                    "description": "Maximum price in USD"
                }
            },
            "required": ["origin", "destination", "departure_date"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        let query: FlightQuery = match serde_json::from_value(input) {
            Ok(q) => q,
            Err(e) => return ToolResult::error(format!("Invalid arguments: {}", e)),
        };

        let api_key = match ctx.credential(&ctx.search.serpapi_key_env) {
            Some(key) => key,
            None => return ToolResult::error(format!("{} not configured", ctx.search.serpapi_key_env)),
        };

        debug!(origin = %query.origin, destination = %query.destination, "search_flights: querying SerpApi");

        let mut params = vec![
            ("engine".to_string(), "google_flights".to_string()),
            ("departure_id".to_string(), query.origin.clone()),
            ("arrival_id".to_string(), query.destination.clone()),
            ("outbound_date".to_string(), query.departure_date.clone()),
            ("adults".to_string(), query.adults.to_string()),
            // SerpApi type: 1 = non-stop only, 2 = any
            ("type".to_string(), if query.direct_only { "1" } else { "2" }.to_string()),
            ("api_key".to_string(), api_key),
        ];
        if let Some(return_date) = &query.return_date {
            params.push(("return_date".to_string(), return_date.clone()));
        }

        let response = match ctx.http.get(&ctx.search.serpapi_base_url).query(&params).send().await {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Failed to search flights: {}", e)),
        };

        if !response.status().is_success() {
            return ToolResult::error(format!("Failed to search flights: HTTP {}", response.status()));
        }

        let data: Value = match response.json().await {
            Ok(d) => d,
            Err(e) => return ToolResult::error(format!("Failed to search flights: {}", e)),
        };

        ToolResult::json(json!({"flights": parse_flight_results(&data, query.max_price)}))
    }
}

/// Flatten best_flights + other_flights into the agent-facing shape,
/// filter by max_price, sort cheapest first, cap the list
fn parse_flight_results(data: &Value, max_price: Option<f64>) -> Vec<Value> {
    let empty = Vec::new();
    let best = data["best_flights"].as_array().unwrap_or(&empty);
    let other = data["other_flights"].as_array().unwrap_or(&empty);

    let mut flights: Vec<Value> = best
        .iter()
        .chain(other.iter())
        .filter_map(|flight| {
            let price = flight["price"].as_f64()?;
            if let Some(cap) = max_price
                && price > cap
            {
                return None;
            }

            let legs = flight["flights"].as_array()?;
            let first = legs.first()?;
            let last = legs.last()?;

            Some(json!({
                "price": price,
                "airline": first["airline"].as_str().unwrap_or("Unknown"),
                "duration": flight["total_duration"].as_u64().unwrap_or(0),
                "stops": legs.len().saturating_sub(1),
                "departure": first["departure_airport"]["time"],
                "arrival": last["arrival_airport"]["time"],
                "booking_token": flight["booking_token"],
            }))
        })
        .collect();

    flights.sort_by(|a, b| {
        let pa = a["price"].as_f64().unwrap_or(f64::MAX);
        let pb = b["price"].as_f64().unwrap_or(f64::MAX);
        pa.total_cmp(&pb)
    });
    flights.truncate(MAX_FLIGHTS);
    flights
}
