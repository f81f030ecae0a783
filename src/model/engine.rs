//! Engine trait consumed by the simulation driver.

use std::io::{self, Write};

use super::PotentialModel;
use crate::time::SimTime;

/// A density-model engine that can be stepped through time.
pub trait Engine {
    /// Advances the model state by `dt` seconds.
    fn advance(&mut self, dt: f64);

    /// Re-parameterizes the electric potential model (e.g. with a new Kp value).
    fn set_driving_parameter(&mut self, model: PotentialModel, values: &[f64]);

    /// Pushes the current simulation time to the filling strategy.
    fn set_clock(&mut self, time: SimTime);

    /// Writes the one-off grid header that precedes state records.
    fn write_header(&self, sink: &mut dyn Write) -> io::Result<()>;

    /// Writes the current model state.
    fn write_state(&self, sink: &mut dyn Write) -> io::Result<()>;

    /// Density (cm⁻³) at L-shell `l` and longitude `longitude_deg`.
    fn sample_density(&self, l: f64, longitude_deg: f64) -> f64;
}
