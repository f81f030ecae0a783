//! Output sinks for model state and samples.
//!
//! Exactly one sink is active per run: gzip-compressed full-state records,
//! or plain-text sample records.

mod samples;
mod state;

pub use samples::SampleWriter;
pub use state::{read_time_header, OutputError, StateWriter, TIME_HEADER_BYTES};
