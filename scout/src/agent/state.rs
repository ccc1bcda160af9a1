//! TripState - accumulated state for one planning run

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::llm::Message;

/// Workflow stage, strictly ordered
///
/// Stages only move forward. Tool rounds happen inside Research and do
/// not change the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Intake,
    Research,
    Compare,
    Finalize,
    Complete,
}

impl Stage {
    /// Whether a transition to `next` respects the stage order
    pub fn can_advance_to(self, next: Stage) -> bool {
        next >= self
    }
}

/// Trip date range, YYYY-MM-DD on both ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Everything a planning run knows so far
///
/// Flight and hotel options are unvalidated tool output carried as raw
/// JSON; the model reads them back out of the conversation, the state
/// copy exists for harvesting and inspection.
#[derive(Debug, Clone, Default)]
pub struct TripState {
    pub conversation: Vec<Message>,
    pub destination: String,
    pub dates: Option<DateRange>,
    pub budget: BTreeMap<String, f64>,
    pub travelers: u32,
    pub preferences: BTreeMap<String, String>,
    pub flight_options: Vec<Value>,
    pub hotel_options: Vec<Value>,
    pub selected_flights: Option<Value>,
    pub selected_hotel: Option<Value>,
    pub calendar_event_id: String,
    pub stage: Stage,
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Intake
    }
}

impl TripState {
    /// Fresh state seeded with the user's opening message
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            conversation: vec![Message::user(user_input)],
            travelers: 1,
            ..Default::default()
        }
    }

    /// Merge an update into this state
    ///
    /// Messages append; every other field overwrites only when the
    /// update carries it. Absent fields are left untouched, so folding
    /// a sequence of updates left to right composes. A stage
    /// regression is refused and logged rather than applied.
    pub fn apply(&mut self, update: StateUpdate) {
        self.conversation.extend(update.messages);

        if let Some(destination) = update.destination {
            self.destination = destination;
        }
        if let Some(dates) = update.dates {
            self.dates = Some(dates);
        }
        if let Some(budget) = update.budget {
            self.budget = budget;
        }
        if let Some(travelers) = update.travelers {
            self.travelers = travelers;
        }
        if let Some(preferences) = update.preferences {
            self.preferences = preferences;
        }
        if let Some(flights) = update.flight_options {
            self.flight_options = flights;
        }
        if let Some(hotels) = update.hotel_options {
            self.hotel_options = hotels;
        }
        if let Some(selected) = update.selected_flights {
            self.selected_flights = Some(selected);
        }
        if let Some(selected) = update.selected_hotel {
            self.selected_hotel = Some(selected);
        }
        if let Some(event_id) = update.calendar_event_id {
            self.calendar_event_id = event_id;
        }
        if let Some(stage) = update.stage {
            if self.stage.can_advance_to(stage) {
                self.stage = stage;
            } else {
                warn!(from = ?self.stage, to = ?stage, "Refusing stage regression");
            }
        }
    }

    /// The last message in the conversation, if any
    pub fn last_message(&self) -> Option<&Message> {
        self.conversation.last()
    }

    /// Text of the last assistant message, for the final response
    pub fn last_assistant_text(&self) -> Option<String> {
        self.conversation
            .iter()
            .rev()
            .find(|m| m.role == crate::llm::Role::Assistant)
            .and_then(|m| m.text())
    }
}

/// A patch against TripState
///
/// Every field optional; `messages` appends, the rest overwrite when
/// present. Produced by stage handlers and the tool-result harvester,
/// consumed only by `TripState::apply`.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub destination: Option<String>,
    pub dates: Option<DateRange>,
    pub budget: Option<BTreeMap<String, f64>>,
    pub travelers: Option<u32>,
    pub preferences: Option<BTreeMap<String, String>>,
    pub flight_options: Option<Vec<Value>>,
    pub hotel_options: Option<Vec<Value>>,
    pub selected_flights: Option<Value>,
    pub selected_hotel: Option<Value>,
    pub calendar_event_id: Option<String>,
    pub stage: Option<Stage>,
}

impl StateUpdate {
    /// Update that only appends a message
    pub fn message(msg: Message) -> Self {
        Self {
            messages: vec![msg],
            ..Default::default()
        }
    }

    /// Update that only advances the stage
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Default::default()
        }
    }
}
