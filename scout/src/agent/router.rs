//! Post-research routing decision

use super::state::TripState;

/// Where the workflow goes after a research turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The model requested tools; execute them and loop back
    Tools,
    /// No tool requests; research is done, move on to comparison
    Compare,
}

/// Inspect the last message and decide the next hop
///
/// Pure function of the state. Tools iff the conversation ends with an
/// assistant message carrying at least one tool_use block.
pub fn route(state: &TripState) -> Route {
    match state.last_message() {
        Some(msg) if !msg.tool_uses().is_empty() => Route::Tools,
        _ => Route::Compare,
    }
}
