//! Filling and spot configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::SimTime;

/// Parameters of the baseline filling.
///
/// Units: `max_flux` in particles/m²/s, timescales in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillingConfig {
    /// Refilling flux at zero density on closed field lines.
    pub max_flux: f64,
    /// Relaxation timescale toward saturation for over-saturated closed flux tubes.
    pub tau_closed: f64,
    /// Loss timescale on open (outside plasmapause) flux tubes.
    pub tau_open: f64,
}

impl Default for FillingConfig {
    fn default() -> Self {
        Self {
            max_flux: 2e12,
            tau_closed: 86400.0,
            tau_open: 86400.0,
        }
    }
}

impl FillingConfig {
    pub fn new(max_flux: f64, tau_closed: f64, tau_open: f64) -> Self {
        Self {
            max_flux,
            tau_closed,
            tau_open,
        }
    }

    /// Builds a configuration from timescales given in days.
    pub fn from_days(max_flux: f64, tau_closed_days: f64, tau_open_days: f64) -> Self {
        Self::new(max_flux, tau_closed_days * 86400.0, tau_open_days * 86400.0)
    }
}

/// Errors for invalid spot parameters.
#[derive(Error, Debug, PartialEq)]
pub enum SpotConfigError {
    #[error("Spot radius must be positive, got {0} km")]
    NonPositiveRadius(f64),
    #[error("Spot centre colatitude must be in (0, 180) degrees, got {0}")]
    InvalidColatitude(f64),
}

/// Location, extent, strength and active window of a filling spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotConfig {
    /// Time at which the spot switches on (inclusive).
    pub active_start: SimTime,
    /// Time at which the spot switches off (inclusive).
    pub active_end: SimTime,
    /// Colatitude of the spot centre, degrees.
    pub center_colatitude_deg: f64,
    /// Local time of the spot centre, degrees east of midnight.
    pub center_longitude_deg: f64,
    /// Radius of the spot at the Earth's surface, km.
    pub radius_km: f64,
    /// Multiplier on saturation density and max flux inside the spot.
    pub amplification: f64,
}

impl SpotConfig {
    pub fn new(
        active_start: SimTime,
        active_end: SimTime,
        center_colatitude_deg: f64,
        center_longitude_deg: f64,
        radius_km: f64,
        amplification: f64,
    ) -> Self {
        Self {
            active_start,
            active_end,
            center_colatitude_deg,
            center_longitude_deg,
            radius_km,
            amplification,
        }
    }

    /// Returns true if `time` lies within `[active_start, active_end]`.
    pub fn is_active_at(&self, time: SimTime) -> bool {
        self.active_start <= time && time <= self.active_end
    }

    pub fn validate(&self) -> Result<(), SpotConfigError> {
        if !(self.radius_km > 0.0) {
            return Err(SpotConfigError::NonPositiveRadius(self.radius_km));
        }
        if !(self.center_colatitude_deg > 0.0 && self.center_colatitude_deg < 180.0) {
            return Err(SpotConfigError::InvalidColatitude(self.center_colatitude_deg));
        }
        Ok(())
    }
}
