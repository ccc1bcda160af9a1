//! TripStore - SQLite-backed storage for the Scout travel agent
//!
//! Holds the records the agent's tools read and write: trips,
//! itinerary items, and stored user preferences. The workflow core
//! never touches this crate directly - it only reaches it through the
//! tool boundary.

mod store;

pub use store::{ItineraryItem, NewItineraryItem, Preference, StoreError, TripRecord, TripStore};

/// Default number of preferences returned by a recall query
pub const DEFAULT_RECALL_LIMIT: usize = 5;
