//! Run inputs: the Kp driving-index series and the sample schedule.

mod kp;
mod samples;

pub use kp::{parse_wdc, KpEntry, KpError, KpSeries};
pub use samples::{SampleError, SampleLocation, SampleSchedule};
