//! End-to-end workflow tests with a scripted LLM
//!
//! The LLM is replaced by a script of completions; tools are a mix of
//! real builtins (hotel fallback path) and static stand-ins so each
//! scenario controls exactly what the "model" and the tools return.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use scout::agent::{Stage, TripState, Workflow, run_workflow};
use scout::config::{CalendarConfig, Config, SearchConfig};
use scout::llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LlmClient, LlmError, Message, MessageContent, StopReason,
    TokenUsage, ToolCall,
};
use scout::tools::builtin::SearchHotelsTool;
use scout::tools::{ToolContext, ToolRegistry, ToolResult, TravelTool};
use tripstore::TripStore;

/// LLM that replays a fixed script of completions
struct ScriptedLlm {
    responses: Mutex<Vec<CompletionResponse>>,
}

impl ScriptedLlm {
    fn new(mut responses: Vec<CompletionResponse>) -> Self {
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))
    }
}

fn text(content: &str) -> CompletionResponse {
    CompletionResponse {
        content: Some(content.to_string()),
        tool_calls: vec![],
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
    }
}

fn tool_use(content: &str, calls: Vec<(&str, &str, Value)>) -> CompletionResponse {
    CompletionResponse {
        content: Some(content.to_string()),
        tool_calls: calls
            .into_iter()
            .map(|(id, name, input)| ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                input,
            })
            .collect(),
        stop_reason: StopReason::ToolUse,
        usage: TokenUsage::default(),
    }
}

/// Tool that returns a fixed payload and counts invocations
struct StaticTool {
    name: &'static str,
    payload: Value,
    invocations: Arc<AtomicUsize>,
}

impl StaticTool {
    fn new(name: &'static str, payload: Value) -> (Self, Arc<AtomicUsize>) {
        let invocations = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name,
                payload,
                invocations: invocations.clone(),
            },
            invocations,
        )
    }
}

#[async_trait]
impl TravelTool for StaticTool {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "static test tool"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _input: Value, _ctx: &ToolContext) -> ToolResult {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        ToolResult::json(self.payload.clone())
    }
}

/// Context with an in-memory store and unset credential env names
fn test_ctx() -> ToolContext {
    let search = SearchConfig {
        serpapi_key_env: "SCOUT_ITEST_UNSET_SERPAPI".to_string(),
        skyscanner_key_env: "SCOUT_ITEST_UNSET_SKYSCANNER".to_string(),
        ..Default::default()
    };
    let calendar = CalendarConfig {
        token_path: "/nonexistent/scout-itest/token.json".into(),
        ..Default::default()
    };
    let store = Arc::new(TripStore::open_in_memory().unwrap());
    ToolContext::new("itest-user", search, calendar, store)
}

fn tool_result_messages(state: &TripState) -> Vec<&Message> {
    state
        .conversation
        .iter()
        .filter(|m| {
            matches!(
                &m.content,
                MessageContent::Blocks(blocks)
                    if blocks.iter().any(|b| matches!(b, ContentBlock::ToolResult { .. }))
            )
        })
        .collect()
}

#[tokio::test]
async fn tokyo_trip_end_to_end() {
    let llm = ScriptedLlm::new(vec![
        text(
            "Tokyo for two in April, got it.\n```trip_details\n\
             {\"destination\": \"Tokyo\", \"dates\": {\"start\": \"2026-04-10\", \"end\": \"2026-04-15\"}, \
             \"budget\": {\"total\": 3000.0}, \"travelers\": 2, \"preferences\": {\"airline\": \"ANA\"}}\n```",
        ),
        tool_use(
            "Searching for flights and hotels",
            vec![
                (
                    "c1",
                    "search_flights",
                    json!({"origin": "SFO", "destination": "NRT", "departure_date": "2026-04-10"}),
                ),
                (
                    "c2",
                    "search_hotels",
                    json!({"destination": "Tokyo", "checkin": "2026-04-10", "checkout": "2026-04-15"}),
                ),
            ],
        ),
        text("Found 2 flights and 3 hotels"),
        text("I recommend the ANA flight and Sample Hotel Tokyo. Shall I book?"),
        tool_use(
            "Putting it on your calendar",
            vec![(
                "c3",
                "create_trip_event",
                json!({"title": "Tokyo Trip", "start_date": "2026-04-10", "end_date": "2026-04-15",
                       "description": "ANA flight, Sample Hotel", "location": "Tokyo"}),
            )],
        ),
        text("Booked! Your Tokyo trip is on the calendar."),
    ]);

    let (flights, _) = StaticTool::new(
        "search_flights",
        json!({"flights": [{"price": 620, "airline": "United"}, {"price": 850, "airline": "ANA"}]}),
    );
    let (calendar, _) = StaticTool::new("create_trip_event", json!({"event_id": "evt_tokyo_1", "link": "https://cal"}));

    let mut registry = ToolRegistry::empty();
    registry.add_tool(Box::new(flights));
    registry.add_tool(Box::new(SearchHotelsTool));
    registry.add_tool(Box::new(calendar));

    let workflow = Workflow::new(Box::new(llm), registry, test_ctx(), 5, 1024);
    let state = workflow
        .run(TripState::new("Plan a trip to Tokyo for two, April 10-15, $3000. We like ANA."))
        .await
        .unwrap();

    assert_eq!(state.stage, Stage::Complete);
    assert_eq!(state.destination, "Tokyo");
    assert_eq!(state.dates.as_ref().unwrap().start, "2026-04-10");
    assert_eq!(state.budget["total"], 3000.0);
    assert_eq!(state.travelers, 2);
    assert_eq!(state.preferences["airline"], "ANA");
    assert_eq!(state.flight_options.len(), 2);
    assert_eq!(state.hotel_options.len(), 3);
    assert_eq!(state.calendar_event_id, "evt_tokyo_1");
    assert!(state.last_assistant_text().unwrap().contains("Booked"));
}

#[tokio::test]
async fn missing_llm_credential_short_circuits() {
    let mut config = Config::default();
    config.llm.api_key_env = "SCOUT_ITEST_UNSET_ANTHROPIC".to_string();

    let response = run_workflow("Plan a weekend in Lisbon", "u1", &config).await;
    assert!(response.starts_with("Error:"), "got: {}", response);
    assert!(response.contains("SCOUT_ITEST_UNSET_ANTHROPIC"));
}

#[tokio::test]
async fn hotel_fallback_data_is_a_success() {
    let llm = ScriptedLlm::new(vec![
        text("Okay.\n```trip_details\n{\"destination\": \"Kyoto\"}\n```"),
        tool_use(
            "Checking hotels",
            vec![(
                "c1",
                "search_hotels",
                json!({"destination": "Kyoto", "checkin": "2026-05-01", "checkout": "2026-05-04"}),
            )],
        ),
        text("Here are some hotels"),
        text("Budget Stay Kyoto is the best value"),
        text("All set"),
    ]);

    let mut registry = ToolRegistry::empty();
    registry.add_tool(Box::new(SearchHotelsTool));

    let workflow = Workflow::new(Box::new(llm), registry, test_ctx(), 5, 1024);
    let state = workflow.run(TripState::new("Kyoto in May")).await.unwrap();

    assert_eq!(state.stage, Stage::Complete);
    assert!(!state.hotel_options.is_empty());

    // The fallback result went into the conversation as a non-error
    let results = tool_result_messages(&state);
    assert_eq!(results.len(), 1);
    match &results[0].content {
        MessageContent::Blocks(blocks) => match &blocks[0] {
            ContentBlock::ToolResult { is_error, content, .. } => {
                assert!(!is_error);
                assert!(content.contains("Sample Hotel"));
            }
            _ => panic!("expected tool_result block"),
        },
        _ => panic!("expected blocks"),
    }
}

#[tokio::test]
async fn options_accumulate_across_tool_rounds() {
    let llm = ScriptedLlm::new(vec![
        text("Okay.\n```trip_details\n{\"destination\": \"Tokyo\"}\n```"),
        tool_use(
            "Searching outbound",
            vec![("c1", "search_flights", json!({"departure_date": "2026-04-10"}))],
        ),
        tool_use(
            "Searching alternate date",
            vec![("c2", "search_flights", json!({"departure_date": "2026-04-11"}))],
        ),
        text("Two dates covered"),
        text("Comparison"),
        text("Done"),
    ]);

    let (flights, invocations) = StaticTool::new("search_flights", json!({"flights": [{"price": 700}]}));
    let mut registry = ToolRegistry::empty();
    registry.add_tool(Box::new(flights));

    let workflow = Workflow::new(Box::new(llm), registry, test_ctx(), 5, 1024);
    let state = workflow.run(TripState::new("Tokyo, flexible dates")).await.unwrap();

    // Different arguments, so both rounds really ran, and the options
    // are the union of both
    assert_eq!(invocations.load(Ordering::SeqCst), 2);
    assert_eq!(state.flight_options.len(), 2);
    assert_eq!(state.stage, Stage::Complete);
}

#[tokio::test]
async fn duplicate_tool_calls_served_from_cache() {
    let args = json!({"origin": "SFO", "destination": "NRT", "departure_date": "2026-04-10"});
    let llm = ScriptedLlm::new(vec![
        text("Okay.\n```trip_details\n{\"destination\": \"Tokyo\"}\n```"),
        tool_use(
            "Searching twice for no reason",
            vec![
                ("c1", "search_flights", args.clone()),
                ("c2", "search_flights", args.clone()),
            ],
        ),
        text("Found flights"),
        text("Comparison"),
        text("Done"),
    ]);

    let (flights, invocations) = StaticTool::new("search_flights", json!({"flights": [{"price": 700}]}));
    let mut registry = ToolRegistry::empty();
    registry.add_tool(Box::new(flights));

    let workflow = Workflow::new(Box::new(llm), registry, test_ctx(), 5, 1024);
    let state = workflow.run(TripState::new("Tokyo")).await.unwrap();

    // One real invocation, but both tool_use ids got a result
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    let results = tool_result_messages(&state);
    assert_eq!(results.len(), 1);
    match &results[0].content {
        MessageContent::Blocks(blocks) => assert_eq!(blocks.len(), 2),
        _ => panic!("expected blocks"),
    }
}

#[tokio::test]
async fn tool_round_budget_forces_comparison() {
    let llm = ScriptedLlm::new(vec![
        text("Okay.\n```trip_details\n{\"destination\": \"Tokyo\"}\n```"),
        tool_use("Round 1", vec![("c1", "search_flights", json!({"departure_date": "d1"}))]),
        tool_use("Round 2", vec![("c2", "search_flights", json!({"departure_date": "d2"}))]),
        tool_use("Round 3", vec![("c3", "search_flights", json!({"departure_date": "d3"}))]),
        text("Comparison with what we have"),
        text("Done"),
    ]);

    let (flights, invocations) = StaticTool::new("search_flights", json!({"flights": [{"price": 700}]}));
    let mut registry = ToolRegistry::empty();
    registry.add_tool(Box::new(flights));

    let workflow = Workflow::new(Box::new(llm), registry, test_ctx(), 2, 1024);
    let state = workflow.run(TripState::new("Tokyo")).await.unwrap();

    // Third round refused, its pending call answered with an error result
    assert_eq!(invocations.load(Ordering::SeqCst), 2);
    assert_eq!(state.flight_options.len(), 2);
    assert_eq!(state.stage, Stage::Complete);

    let results = tool_result_messages(&state);
    assert_eq!(results.len(), 3);
    match &results[2].content {
        MessageContent::Blocks(blocks) => match &blocks[0] {
            ContentBlock::ToolResult { is_error, .. } => assert!(is_error),
            _ => panic!("expected tool_result block"),
        },
        _ => panic!("expected blocks"),
    }
}
