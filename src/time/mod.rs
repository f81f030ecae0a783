//! Simulated time values.
//!
//! Simulation time is an absolute UTC timestamp. The driver and the filling
//! strategies only ever need whole-second arithmetic with fractional offsets,
//! so the helpers here work in `f64` seconds and millisecond resolution.

mod sim_time;

pub use sim_time::{
    add_seconds, format_time, from_epoch_seconds, from_ymdh, seconds_between, time_fields,
    SimTime,
};
