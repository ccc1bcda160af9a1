//! Builtin travel tools
//!
//! Argument names and result shapes follow the external contracts the
//! agent's prompts were written against; see each tool's input schema.

mod calendar;
mod flights;
mod hotels;
mod itinerary;
mod memory;

pub use calendar::CreateTripEventTool;
pub use flights::SearchFlightsTool;
pub use hotels::SearchHotelsTool;
pub use itinerary::{AddItineraryItemTool, ListTripsTool};
pub use memory::{RecallPreferencesTool, StorePreferenceTool};
