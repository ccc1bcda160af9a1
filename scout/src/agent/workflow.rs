//! Workflow controller - explicit FSM over the planning stages
//!
//! Drives one planning run: intake, research with a bounded
//! research/tools cycle, compare, finalize. Stage handlers produce
//! StateUpdates; this controller owns the transitions, the tool-round
//! budget, the duplicate-call cache, and result harvesting.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{AgentConfig, Config};
use crate::llm::{AnthropicClient, ContentBlock, LlmClient, LlmError, Message, ToolCall};
use crate::tools::{ToolContext, ToolError, ToolRegistry, ToolResult};
use tripstore::TripStore;

use super::router::{Route, route};
use super::stages;
use super::state::{Stage, StateUpdate, TripState};

/// FSM node
///
/// Nodes are control-flow positions, not stages: `Tools` has no stage
/// of its own, and `Research` is visited once per tool round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Intake,
    Research,
    Tools,
    Compare,
    Finalize,
    Complete,
}

/// One planning run's controller
pub struct Workflow {
    llm: Box<dyn LlmClient>,
    registry: ToolRegistry,
    ctx: ToolContext,
    max_tool_rounds: u32,
    max_tokens: u32,
    run_id: Uuid,
}

impl Workflow {
    pub fn new(
        llm: Box<dyn LlmClient>,
        registry: ToolRegistry,
        ctx: ToolContext,
        max_tool_rounds: u32,
        max_tokens: u32,
    ) -> Self {
        Self {
            llm,
            registry,
            ctx,
            max_tool_rounds,
            max_tokens,
            run_id: Uuid::now_v7(),
        }
    }

    /// Run the workflow to completion
    ///
    /// Tool failures stay inside the conversation as error results;
    /// only LLM transport failures escape as Err.
    pub async fn run(&self, mut state: TripState) -> Result<TripState, LlmError> {
        let mut node = Node::Intake;
        let mut rounds = 0u32;
        let mut cache: HashMap<(String, String), ToolResult> = HashMap::new();

        info!(run_id = %self.run_id, "Workflow started");

        while node != Node::Complete {
            debug!(run_id = %self.run_id, node = ?node, stage = ?state.stage, "Workflow step");
            node = match node {
                Node::Intake => {
                    let update = stages::run_intake(self.llm.as_ref(), &state, self.max_tokens).await?;
                    state.apply(update);
                    Node::Research
                }
                Node::Research => {
                    let update =
                        stages::run_research(self.llm.as_ref(), &state, self.registry.definitions(), self.max_tokens)
                            .await?;
                    state.apply(update);
                    match route(&state) {
                        Route::Tools => Node::Tools,
                        Route::Compare => Node::Compare,
                    }
                }
                Node::Tools => {
                    let calls = state.last_message().map(|m| m.tool_uses()).unwrap_or_default();
                    if rounds >= self.max_tool_rounds {
                        warn!(run_id = %self.run_id, rounds, "Tool round budget exhausted, forcing comparison");
                        state.apply(StateUpdate::message(refuse_calls(&calls)));
                        Node::Compare
                    } else {
                        rounds += 1;
                        let results = self.execute_with_cache(&calls, &mut cache).await;
                        state.apply(harvest(&state, &results));
                        Node::Research
                    }
                }
                Node::Compare => {
                    let update = stages::run_compare(self.llm.as_ref(), &state, self.max_tokens).await?;
                    state.apply(update);
                    Node::Finalize
                }
                Node::Finalize => {
                    let update =
                        stages::run_finalize(self.llm.as_ref(), &state, self.registry.definitions(), self.max_tokens)
                            .await?;
                    state.apply(update);

                    // Single bounded pass for finalize's tool requests,
                    // then one confirmation turn without tools
                    let calls = state.last_message().map(|m| m.tool_uses()).unwrap_or_default();
                    if !calls.is_empty() {
                        let results = self.execute_with_cache(&calls, &mut cache).await;
                        state.apply(harvest(&state, &results));
                        let confirm =
                            stages::run_finalize(self.llm.as_ref(), &state, Vec::new(), self.max_tokens).await?;
                        state.apply(confirm);
                    }
                    state.apply(StateUpdate::stage(Stage::Complete));
                    Node::Complete
                }
                Node::Complete => Node::Complete,
            };
        }

        info!(run_id = %self.run_id, rounds, flights = state.flight_options.len(), hotels = state.hotel_options.len(), "Workflow complete");
        Ok(state)
    }

    /// Execute tool calls, serving repeats from the per-run cache
    ///
    /// Calls not yet cached go through `ToolRegistry::execute_all` in
    /// one ordered batch; the rest reuse their first result. Every
    /// requested id still gets a result, in request order.
    async fn execute_with_cache(
        &self,
        calls: &[ToolCall],
        cache: &mut HashMap<(String, String), ToolResult>,
    ) -> Vec<(String, ToolResult)> {
        let mut fresh = Vec::new();
        for call in calls {
            let key = cache_key(call);
            if !cache.contains_key(&key) && fresh.iter().all(|c| cache_key(c) != key) {
                fresh.push(call.clone());
            }
        }

        if fresh.len() < calls.len() {
            debug!(run_id = %self.run_id, repeats = calls.len() - fresh.len(), "Serving repeated tool calls from cache");
        }
        for (call, (_, result)) in fresh.iter().zip(self.registry.execute_all(&fresh, &self.ctx).await) {
            cache.insert(cache_key(call), result);
        }

        calls
            .iter()
            .map(|call| {
                let result = cache
                    .get(&cache_key(call))
                    .cloned()
                    .unwrap_or_else(|| ToolResult::error(format!("No result recorded for tool: {}", call.name)));
                (call.id.clone(), result)
            })
            .collect()
    }
}

/// Cache key for a tool call
///
/// Tool name plus serialized arguments; serde_json orders object keys,
/// so equal arguments serialize equally regardless of how the model
/// spelled them.
fn cache_key(call: &ToolCall) -> (String, String) {
    (call.name.clone(), call.input.to_string())
}

/// Registry for a run: the standard tool set, restricted to
/// `agent.tools` when configured
///
/// An unknown configured name fails here, before any LLM call.
fn build_registry(agent: &AgentConfig) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::standard();
    if !agent.tools.is_empty() {
        registry.validate_names(&agent.tools)?;
        registry.retain(&agent.tools);
    }
    Ok(registry)
}

/// Tool-results message refusing pending calls once the budget is spent
///
/// Keeps the conversation well-formed: every tool_use id still gets a
/// tool_result, just an error one.
fn refuse_calls(calls: &[ToolCall]) -> Message {
    let blocks = calls
        .iter()
        .map(|call| {
            ContentBlock::tool_result(
                call.id.clone(),
                ToolResult::error("Tool round limit reached; continue with the options gathered so far").content,
                true,
            )
        })
        .collect();
    Message::tool_results(blocks)
}

/// Fold a round of tool results into a StateUpdate
///
/// Appends the tool_results message and harvests structured output:
/// flight and hotel options accumulate as a union across rounds, a
/// created calendar event records its id.
fn harvest(state: &TripState, results: &[(String, ToolResult)]) -> StateUpdate {
    let blocks = results
        .iter()
        .map(|(id, result)| ContentBlock::tool_result(id.clone(), result.content.clone(), result.is_error))
        .collect();

    let mut flights = state.flight_options.clone();
    let mut hotels = state.hotel_options.clone();
    let mut calendar_event_id = None;

    for (_, result) in results.iter().filter(|(_, r)| !r.is_error) {
        let Some(payload) = result.as_json() else { continue };
        if let Some(found) = payload["flights"].as_array() {
            flights.extend(found.iter().cloned());
        }
        if let Some(found) = payload["hotels"].as_array() {
            hotels.extend(found.iter().cloned());
        }
        if let Some(event_id) = payload["event_id"].as_str() {
            calendar_event_id = Some(event_id.to_string());
        }
    }

    StateUpdate {
        messages: vec![Message::tool_results(blocks)],
        flight_options: Some(flights),
        hotel_options: Some(hotels),
        calendar_event_id,
        ..Default::default()
    }
}

/// Run one complete planning workflow for a user request
///
/// Never returns an error: a missing LLM credential short-circuits
/// with a message naming the variable, and anything else that escapes
/// the controller is rendered as an "Error: " string.
pub async fn run_workflow(user_input: &str, user_id: &str, config: &Config) -> String {
    if let Err(e) = config.validate() {
        return format!("Error: {}", e);
    }

    match try_run(user_input, user_id, config).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Workflow failed");
            format!("Error: {}", e)
        }
    }
}

async fn try_run(user_input: &str, user_id: &str, config: &Config) -> eyre::Result<String> {
    let registry = build_registry(&config.agent)?;
    let llm = AnthropicClient::from_config(&config.llm)?;
    let store = Arc::new(TripStore::open(&config.storage.db_path)?);
    let ctx = ToolContext::new(user_id, config.search.clone(), config.calendar.clone(), store);

    let workflow = Workflow::new(
        Box::new(llm),
        registry,
        ctx,
        config.agent.max_tool_rounds,
        config.llm.max_tokens,
    );

    let state = workflow.run(TripState::new(user_input)).await?;
    Ok(state
        .last_assistant_text()
        .unwrap_or_else(|| "I wasn't able to produce a plan for that request.".to_string()))
}
