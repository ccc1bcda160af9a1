//! ToolContext - per-session dependencies handed to every tool call

use std::sync::Arc;
use std::time::Duration;

use tripstore::TripStore;

use crate::config::{CalendarConfig, SearchConfig};

/// Dependencies a tool may need at execution time
///
/// One context per session/run. Tools are stateless; everything
/// environment-shaped (credentials, endpoints, the trip store) flows
/// through here.
#[derive(Clone)]
pub struct ToolContext {
    /// User the session belongs to (preference scoping)
    pub user_id: String,

    /// Shared HTTP client for outbound API calls
    pub http: reqwest::Client,

    /// Search endpoints and credential env-var names
    pub search: SearchConfig,

    /// Calendar endpoint and token location
    pub calendar: CalendarConfig,

    /// Trip/itinerary/preference store
    pub store: Arc<TripStore>,
}

impl ToolContext {
    pub fn new(user_id: impl Into<String>, search: SearchConfig, calendar: CalendarConfig, store: Arc<TripStore>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(search.timeout_ms))
            .build()
            .unwrap_or_default();

        Self {
            user_id: user_id.into(),
            http,
            search,
            calendar,
            store,
        }
    }

    /// Look up a credential by the env-var name configured for it
    pub fn credential(&self, var: &str) -> Option<String> {
        std::env::var(var).ok().filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
pub mod testutil {
    use super::*;
    use crate::config::{CalendarConfig, SearchConfig};

    /// Context with an in-memory store and credential env vars pointed
    /// at names that are never set, so tools exercise their
    /// unconfigured paths deterministically.
    pub fn unconfigured_context() -> ToolContext {
        let mut search = SearchConfig::default();
        search.serpapi_key_env = "SCOUT_TEST_UNSET_SERPAPI".to_string();
        search.skyscanner_key_env = "SCOUT_TEST_UNSET_SKYSCANNER".to_string();

        let mut calendar = CalendarConfig::default();
        calendar.token_path = std::path::PathBuf::from("/nonexistent/scout-test/token.json");

        let store = Arc::new(TripStore::open_in_memory().unwrap());
        ToolContext::new("test-user", search, calendar, store)
    }
}
