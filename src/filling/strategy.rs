//! Filling strategy trait.

use crate::model::{GridCoordinates, GridFields};
use crate::time::SimTime;

/// Trait for per-step grid filling.
///
/// Implementations mutate the density fields in place. The engine owns the
/// strategy and calls [`fill`](FillingStrategy::fill) once per internal step
/// with the step length in seconds.
pub trait FillingStrategy {
    /// Returns a human-readable name for the strategy.
    fn name(&self) -> &str;

    /// Adds (or removes) plasma on every grid cell for a step of `dt` seconds.
    fn fill(&mut self, coords: &GridCoordinates, fields: &mut GridFields, dt: f64);

    /// Informs the strategy of the current simulation time.
    ///
    /// Time-independent strategies ignore it.
    fn set_time(&mut self, _time: SimTime) {
        // Default: do nothing
    }
}
