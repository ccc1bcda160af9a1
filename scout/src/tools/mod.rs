//! Tool system for the travel workflow
//!
//! Each tool is a named capability with typed JSON arguments and a
//! JSON result. The workflow controller only ever reaches the outside
//! world (search APIs, calendar, the trip store) through this
//! boundary, and failures inside it resolve to structured error
//! payloads instead of crashing the session.

mod context;
mod error;
mod registry;
mod traits;

pub mod builtin;

pub use context::ToolContext;
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use traits::{ToolResult, TravelTool};
