//! Plasmasphere density simulation driver with localized spot filling.
//!
//! The crate steps a density-model engine through simulated time, driven by
//! a Kp index series, and periodically writes either the full model state or
//! density samples at fixed locations. A [`SpotFilling`] strategy can inject
//! strongly amplified ionospheric outflow inside a circular region during a
//! time window, on top of the baseline [`DefaultFilling`].

pub mod config;
pub mod driver;
pub mod filling;
pub mod geometry;
pub mod input;
pub mod model;
pub mod output;
pub mod time;

pub use config::{ConfigError, RunConfig, RunOptions};
pub use driver::{DriverConfig, DriverError, EventSchedule, OutputMode, RunSummary, SimulationDriver};
pub use filling::{DefaultFilling, FillingConfig, FillingStrategy, Saturation, SpotConfig, SpotFilling};
pub use input::{KpSeries, SampleSchedule};
pub use model::{Engine, GridConfig, PlasmasphereModel, PotentialModel};
pub use time::SimTime;
