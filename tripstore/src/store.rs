//! Core TripStore implementation

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Trip not found: {trip_id}")]
    TripNotFound { trip_id: i64 },

    #[error("Invalid item type: {item_type} (expected flight, hotel, activity, dining, or transport)")]
    InvalidItemType { item_type: String },

    #[error("Store lock poisoned")]
    Poisoned,
}

/// A stored trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: i64,
    pub name: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub created_at: String,
}

/// An itinerary item attached to a trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryItem {
    pub id: i64,
    pub trip_id: i64,
    pub title: String,
    pub item_type: String,
    pub start_datetime: String,
    pub end_datetime: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub cost: Option<f64>,
}

/// Input for creating an itinerary item
#[derive(Debug, Clone, Default)]
pub struct NewItineraryItem {
    pub trip_id: i64,
    pub title: String,
    pub item_type: String,
    pub start_datetime: String,
    pub end_datetime: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub cost: Option<f64>,
}

/// A stored user preference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    pub user_id: String,
    pub preference_type: String,
    pub value: String,
}

impl Preference {
    /// Render as the "type: value" line the agent reads back
    pub fn render(&self) -> String {
        format!("{}: {}", self.preference_type, self.value)
    }
}

const VALID_ITEM_TYPES: &[&str] = &["flight", "hotel", "activity", "dining", "transport"];

/// SQLite-backed store for trips, itinerary items, and preferences
///
/// Each tool call opens no new connections - the store holds a single
/// connection behind a mutex, which is enough for the agent's strictly
/// sequential tool execution.
pub struct TripStore {
    conn: Mutex<Connection>,
}

impl TripStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(path.as_ref())?;
        let store = Self { conn: Mutex::new(conn) };
        store.migrate()?;
        info!(path = %path.as_ref().display(), "Opened trip store");
        Ok(store)
    }

    /// Open an in-memory store (tests, ephemeral sessions)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Mutex::new(conn) };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS trips (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 name TEXT NOT NULL,
                 destination TEXT NOT NULL,
                 start_date TEXT NOT NULL,
                 end_date TEXT NOT NULL,
                 created_at TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS itinerary_items (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 trip_id INTEGER NOT NULL REFERENCES trips(id),
                 title TEXT NOT NULL,
                 item_type TEXT NOT NULL,
                 start_datetime TEXT NOT NULL,
                 end_datetime TEXT,
                 location TEXT,
                 description TEXT,
                 cost REAL
             );
             CREATE TABLE IF NOT EXISTS preferences (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 user_id TEXT NOT NULL,
                 preference_type TEXT NOT NULL,
                 value TEXT NOT NULL,
                 created_at TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_items_trip ON itinerary_items(trip_id);
             CREATE INDEX IF NOT EXISTS idx_prefs_user ON preferences(user_id);",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Create a trip and return its id
    pub fn add_trip(
        &self,
        name: &str,
        destination: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO trips (name, destination, start_date, end_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, destination, start_date, end_date, Utc::now().to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();
        debug!(trip_id = id, %destination, "Added trip");
        Ok(id)
    }

    /// List all trips, newest first
    pub fn list_trips(&self) -> Result<Vec<TripRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, destination, start_date, end_date, created_at
             FROM trips ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TripRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                destination: row.get(2)?,
                start_date: row.get(3)?,
                end_date: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Add an itinerary item to an existing trip
    pub fn add_itinerary_item(&self, item: NewItineraryItem) -> Result<i64, StoreError> {
        if !VALID_ITEM_TYPES.contains(&item.item_type.as_str()) {
            return Err(StoreError::InvalidItemType {
                item_type: item.item_type,
            });
        }

        let conn = self.lock()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM trips WHERE id = ?1)",
            params![item.trip_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StoreError::TripNotFound { trip_id: item.trip_id });
        }

        conn.execute(
            "INSERT INTO itinerary_items
             (trip_id, title, item_type, start_datetime, end_datetime, location, description, cost)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                item.trip_id,
                item.title,
                item.item_type,
                item.start_datetime,
                item.end_datetime,
                item.location,
                item.description,
                item.cost,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(item_id = id, trip_id = item.trip_id, "Added itinerary item");
        Ok(id)
    }

    /// All items for a trip, ordered by start time
    pub fn items_for_trip(&self, trip_id: i64) -> Result<Vec<ItineraryItem>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, trip_id, title, item_type, start_datetime, end_datetime, location, description, cost
             FROM itinerary_items WHERE trip_id = ?1 ORDER BY start_datetime",
        )?;
        let rows = stmt.query_map(params![trip_id], |row| {
            Ok(ItineraryItem {
                id: row.get(0)?,
                trip_id: row.get(1)?,
                title: row.get(2)?,
                item_type: row.get(3)?,
                start_datetime: row.get(4)?,
                end_datetime: row.get(5)?,
                location: row.get(6)?,
                description: row.get(7)?,
                cost: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// All trips, newest first, each paired with its itinerary items
    pub fn trips_with_items(&self) -> Result<Vec<(TripRecord, Vec<ItineraryItem>)>, StoreError> {
        let trips = self.list_trips()?;
        let mut out = Vec::with_capacity(trips.len());
        for trip in trips {
            let items = self.items_for_trip(trip.id)?;
            out.push((trip, items));
        }
        Ok(out)
    }

    /// Store a user preference
    pub fn store_preference(&self, user_id: &str, preference_type: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO preferences (user_id, preference_type, value, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, preference_type, value, Utc::now().to_rfc3339()],
        )?;
        debug!(%user_id, %preference_type, "Stored preference");
        Ok(())
    }

    /// Recall preferences relevant to a query
    ///
    /// Scores each stored preference by how many query words appear in
    /// its "type: value" rendering. Ties fall back to recency. This is
    /// deliberately simple - similarity search proper lives outside
    /// this store.
    pub fn recall_preferences(&self, user_id: &str, query: &str, limit: usize) -> Result<Vec<Preference>, StoreError> {
        let all = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(
                "SELECT user_id, preference_type, value FROM preferences
                 WHERE user_id = ?1 ORDER BY id DESC",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                Ok(Preference {
                    user_id: row.get(0)?,
                    preference_type: row.get(1)?,
                    value: row.get(2)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        let words: Vec<String> = query.to_lowercase().split_whitespace().map(String::from).collect();

        let mut scored: Vec<(usize, Preference)> = all
            .into_iter()
            .map(|pref| {
                let haystack = pref.render().to_lowercase();
                let score = words.iter().filter(|w| haystack.contains(w.as_str())).count();
                (score, pref)
            })
            .collect();

        // Stable sort keeps the recency ordering within equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().take(limit).map(|(_, p)| p).collect())
    }
}
