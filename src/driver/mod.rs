//! Event-scheduling simulation driver.
//!
//! The driver advances an [`Engine`](crate::model::Engine) from one event to
//! the next. Four event streams race each tick: driving-index updates, state
//! writes, sample writes and the clock tick. Whichever fires first decides
//! the next step.

mod run;
mod schedule;

pub use run::{DriverConfig, DriverError, DriverEvent, OutputMode, RunContext, RunSummary, SimulationDriver};
pub use schedule::EventSchedule;
