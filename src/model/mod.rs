//! Plasmasphere model engine.
//!
//! The driver only sees the [`Engine`] trait. [`PlasmasphereModel`] is the
//! reference implementation: a dipole grid in (L-shell, local time) whose
//! flux tubes corotate, open and close with a Kp-driven plasmapause, and are
//! refilled by a pluggable [`FillingStrategy`](crate::filling::FillingStrategy).

mod engine;
mod grid;
mod plasmasphere;
mod potential;

pub use engine::Engine;
pub use grid::{FieldGrid, GridConfig, GridCoordinates, GridError, GridFields};
pub use plasmasphere::PlasmasphereModel;
pub use potential::PotentialModel;
