//! Scout - conversational travel-planning agent
//!
//! Scout turns a natural-language trip request into a researched,
//! compared, and booked plan by driving an LLM through a staged
//! workflow: intake extracts requirements, research gathers flight and
//! hotel options through tools, compare recommends, finalize puts the
//! trip on the calendar.
//!
//! # Modules
//!
//! - [`agent`] - Workflow controller, stages, routing, trip state
//! - [`llm`] - LLM client trait and Anthropic implementation
//! - [`tools`] - Tool registry and the builtin travel tools
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod agent;
pub mod chat;
pub mod cli;
pub mod config;
pub mod llm;
pub mod prompts;
pub mod tools;

pub use agent::{Stage, StateUpdate, TripState, Workflow, run_workflow};
pub use config::Config;
pub use llm::{AnthropicClient, LlmClient, LlmError};
pub use tools::{ToolContext, ToolRegistry, ToolResult, TravelTool};
