//! Tool error types

use thiserror::Error;

/// Errors surfaced at the tool boundary
///
/// Execution failures never leave [`super::TravelTool::execute`]; this
/// type covers the cases that are real errors for the caller, such as
/// registry misconfiguration detected at startup.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    UnknownTool { name: String },
}
