//! Per-step plasma filling strategies.
//!
//! The engine calls a [`FillingStrategy`] once per internal step to add
//! ionospheric outflow to the grid. [`DefaultFilling`] is the baseline
//! saturation-limited refilling; [`SpotFilling`] decorates it with an extra,
//! strongly amplified flux inside a circular spot during a time window.

mod config;
mod default;
mod saturation;
mod spot;
mod strategy;

pub use config::{FillingConfig, SpotConfig, SpotConfigError};
pub use default::DefaultFilling;
pub use saturation::Saturation;
pub use spot::SpotFilling;
pub use strategy::FillingStrategy;
