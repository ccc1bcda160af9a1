//! Workflow controller, stages, routing, and trip state

mod router;
mod stages;
mod state;
mod workflow;

pub use router::{Route, route};
pub use state::{DateRange, Stage, StateUpdate, TripState};
pub use workflow::{Workflow, run_workflow};
