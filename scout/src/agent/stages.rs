//! Stage handlers - one completion per workflow stage
//!
//! Each handler builds its stage prompt, calls the LLM with the running
//! conversation, and returns a StateUpdate carrying the assistant
//! message plus whatever the stage learned. Stage advancement is part
//! of the update, never a side effect.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::llm::{CompletionRequest, LlmClient, LlmError, Message, ToolDefinition};
use crate::prompts;

use super::state::{DateRange, Stage, StateUpdate, TripState};

/// Structured block the intake prompt asks the model to emit
#[derive(Debug, Default, Deserialize)]
struct TripDetails {
    destination: Option<String>,
    dates: Option<DateRange>,
    budget: Option<BTreeMap<String, f64>>,
    travelers: Option<u32>,
    preferences: Option<BTreeMap<String, String>>,
}

/// Intake: extract trip requirements or ask a clarifying question
///
/// Called with no tools so the model can only converse. Field updates
/// come from the fenced trip_details block; a missing or malformed
/// block updates nothing but the conversation.
pub async fn run_intake(llm: &dyn LlmClient, state: &TripState, max_tokens: u32) -> Result<StateUpdate, LlmError> {
    let response = llm
        .complete(CompletionRequest {
            system_prompt: prompts::INTAKE_SYSTEM.to_string(),
            messages: state.conversation.clone(),
            tools: Vec::new(),
            max_tokens,
        })
        .await?;

    let text = response.content.clone().unwrap_or_default();
    let details = extract_trip_details(&text).unwrap_or_default();
    debug!(destination = ?details.destination, dates = ?details.dates, "run_intake: extracted details");

    Ok(StateUpdate {
        messages: vec![Message::assistant(strip_trip_details(&text))],
        destination: details.destination,
        dates: details.dates,
        budget: details.budget,
        travelers: details.travelers,
        preferences: details.preferences,
        stage: Some(Stage::Research),
        ..Default::default()
    })
}

/// Research: one completion with the full tool list
///
/// No stage change here; the controller routes on whether the reply
/// requested tools.
pub async fn run_research(
    llm: &dyn LlmClient,
    state: &TripState,
    tools: Vec<ToolDefinition>,
    max_tokens: u32,
) -> Result<StateUpdate, LlmError> {
    let response = llm
        .complete(CompletionRequest {
            system_prompt: prompts::RESEARCH_SYSTEM.to_string(),
            messages: state.conversation.clone(),
            tools,
            max_tokens,
        })
        .await?;

    Ok(StateUpdate::message(response.to_message()))
}

/// Compare: present gathered options, recommend, ask for a choice
pub async fn run_compare(llm: &dyn LlmClient, state: &TripState, max_tokens: u32) -> Result<StateUpdate, LlmError> {
    let response = llm
        .complete(CompletionRequest {
            system_prompt: prompts::COMPARE_SYSTEM.to_string(),
            messages: state.conversation.clone(),
            tools: Vec::new(),
            max_tokens,
        })
        .await?;

    let text = response.content.unwrap_or_default();
    let mut update = StateUpdate::message(Message::assistant(text));
    update.stage = Some(Stage::Finalize);
    Ok(update)
}

/// Finalize: request booking tools, then confirm
///
/// The first completion may ask for tools (calendar, itinerary,
/// preferences); the controller executes that single pass and calls
/// back here for the confirmation turn.
pub async fn run_finalize(
    llm: &dyn LlmClient,
    state: &TripState,
    tools: Vec<ToolDefinition>,
    max_tokens: u32,
) -> Result<StateUpdate, LlmError> {
    let response = llm
        .complete(CompletionRequest {
            system_prompt: prompts::FINALIZE_SYSTEM.to_string(),
            messages: state.conversation.clone(),
            tools,
            max_tokens,
        })
        .await?;

    Ok(StateUpdate::message(response.to_message()))
}

/// Pull the fenced ```trip_details block out of intake's reply
fn extract_trip_details(text: &str) -> Option<TripDetails> {
    let json = fenced_block(text, "trip_details")?;
    match serde_json::from_str(json) {
        Ok(details) => Some(details),
        Err(e) => {
            warn!(error = %e, "extract_trip_details: malformed block, ignoring");
            None
        }
    }
}

/// The reply with the trip_details fence removed, trimmed
fn strip_trip_details(text: &str) -> String {
    match text.find("```trip_details") {
        Some(start) => {
            let after = &text[start + "```trip_details".len()..];
            let rest = after.find("```").map(|end| &after[end + 3..]).unwrap_or("");
            format!("{}{}", &text[..start], rest).trim().to_string()
        }
        None => text.trim().to_string(),
    }
}

fn fenced_block<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    let fence = format!("```{}", tag);
    let start = text.find(&fence)? + fence.len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockLlmClient;
    use crate::llm::{CompletionResponse, StopReason, TokenUsage};

    fn text_response(text: &str) -> CompletionResponse {
        CompletionResponse {
            content: Some(text.to_string()),
            tool_calls: vec![],
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    #[test]
    fn test_extract_trip_details() {
        let reply = "Tokyo in April, got it.\n\n```trip_details\n{\"destination\": \"Tokyo\", \
                     \"dates\": {\"start\": \"2026-04-10\", \"end\": \"2026-04-15\"}, \"travelers\": 2}\n```";
        let details = extract_trip_details(reply).unwrap();
        assert_eq!(details.destination.as_deref(), Some("Tokyo"));
        assert_eq!(details.dates.unwrap().start, "2026-04-10");
        assert_eq!(details.travelers, Some(2));
        assert!(details.budget.is_none());
    }

    #[test]
    fn test_extract_missing_block() {
        assert!(extract_trip_details("Where would you like to go?").is_none());
    }

    #[test]
    fn test_extract_malformed_block() {
        assert!(extract_trip_details("```trip_details\nnot json\n```").is_none());
    }

    #[test]
    fn test_strip_trip_details() {
        let reply = "Sounds good!\n\n```trip_details\n{\"destination\": \"Tokyo\"}\n```\n";
        assert_eq!(strip_trip_details(reply), "Sounds good!");
        assert_eq!(strip_trip_details("no block here"), "no block here");
    }

    #[tokio::test]
    async fn test_intake_applies_extracted_fields() {
        let llm = MockLlmClient::new(vec![text_response(
            "Great, Tokyo it is.\n```trip_details\n{\"destination\": \"Tokyo\", \"travelers\": 2}\n```",
        )]);

        let state = TripState::new("Plan a trip to Tokyo for two");
        let update = run_intake(&llm, &state, 1024).await.unwrap();

        assert_eq!(update.destination.as_deref(), Some("Tokyo"));
        assert_eq!(update.travelers, Some(2));
        assert_eq!(update.stage, Some(Stage::Research));
        assert_eq!(update.messages[0].text().as_deref(), Some("Great, Tokyo it is."));
    }

    #[tokio::test]
    async fn test_intake_sends_no_tools() {
        let llm = MockLlmClient::new(vec![text_response("Where to?")]);
        let state = TripState::new("plan something");
        run_intake(&llm, &state, 1024).await.unwrap();

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].tools.is_empty());
    }

    #[tokio::test]
    async fn test_compare_advances_to_finalize() {
        let llm = MockLlmClient::new(vec![text_response("Option A is best")]);
        let state = TripState::new("plan");
        let update = run_compare(&llm, &state, 1024).await.unwrap();
        assert_eq!(update.stage, Some(Stage::Finalize));
        assert!(llm.requests()[0].tools.is_empty());
    }
}
