//! Run options, resolution and validation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::driver::DriverConfig;
use crate::filling::{
    DefaultFilling, FillingConfig, FillingStrategy, Saturation, SpotConfig, SpotConfigError,
    SpotFilling,
};
use crate::input::KpSeries;
use crate::model::{GridConfig, GridError, PlasmasphereModel, PotentialModel};
use crate::time::{add_seconds, format_time, SimTime};

/// Fatal configuration errors.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("No input Kp files specified")]
    NoInput,
    #[error("Must use custom filling model in order to use custom saturation model")]
    SaturationWithoutFilling,
    #[error("End time {end} is before start time {start}")]
    EndBeforeStart { start: String, end: String },
    #[error("Output start {output_start} is after end time {end}")]
    OutputStartAfterEnd { output_start: String, end: String },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("Invalid spot: {0}")]
    Spot(#[from] SpotConfigError),
}

/// Spot parameters as given on the command line.
///
/// Start and stop are offsets in seconds from the run start. The defaults
/// describe a window that never opens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotOptions {
    pub start_offset: f64,
    pub stop_offset: f64,
    pub colatitude_deg: f64,
    pub longitude_deg: f64,
    pub radius_km: f64,
    pub factor: f64,
}

impl Default for SpotOptions {
    fn default() -> Self {
        Self {
            start_offset: 1e31,
            stop_offset: -1e31,
            colatitude_deg: 30.0,
            longitude_deg: 315.0,
            radius_km: 1000.0,
            factor: 10.0,
        }
    }
}

/// Raw run options.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub input_files: Vec<PathBuf>,
    pub start: Option<SimTime>,
    pub end: Option<SimTime>,
    pub output_start: Option<SimTime>,
    /// Seconds between state writes or sample emissions.
    pub output_period: f64,
    /// Run length in seconds; ignored when `end` is given.
    pub duration: Option<f64>,
    pub output_file: Option<PathBuf>,
    pub samples_file: Option<PathBuf>,
    /// Custom baseline filling; the spot is only installed when this is set.
    pub filling: Option<FillingConfig>,
    pub saturation: Option<Saturation>,
    pub spot: SpotOptions,
    pub potential: PotentialModel,
    pub grid: GridConfig,
    pub clock_period: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            input_files: Vec::new(),
            start: None,
            end: None,
            output_start: None,
            output_period: 900.0,
            duration: None,
            output_file: None,
            samples_file: None,
            filling: None,
            saturation: None,
            spot: SpotOptions::default(),
            potential: PotentialModel::default(),
            grid: GridConfig::default(),
            clock_period: 300.0,
        }
    }
}

/// Where output goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OutputTarget {
    /// Gzip-compressed full state every output period.
    State { path: PathBuf },
    /// Density samples at the locations listed in `locations`.
    Samples { locations: PathBuf, path: PathBuf },
}

/// Fully resolved run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub start: SimTime,
    pub end: SimTime,
    pub output_start: SimTime,
    pub output_period: f64,
    pub clock_period: f64,
    pub output: OutputTarget,
    pub potential: PotentialModel,
    pub grid: GridConfig,
    pub filling: Option<FillingConfig>,
    pub saturation: Option<Saturation>,
    pub spot: Option<SpotConfig>,
    pub input_files: Vec<PathBuf>,
}

impl RunOptions {
    /// Checks the options that do not depend on input data.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_files.is_empty() {
            return Err(ConfigError::NoInput);
        }
        if self.saturation.is_some() && self.filling.is_none() {
            return Err(ConfigError::SaturationWithoutFilling);
        }
        positive("Output period", self.output_period)?;
        positive("Clock period", self.clock_period)?;
        positive("Engine step", self.grid.max_step_seconds)?;
        if let Some(duration) = self.duration {
            positive("Duration", duration)?;
        }
        if let Some(filling) = &self.filling {
            positive("Max flux", filling.max_flux)?;
            positive("Closed timescale", filling.tau_closed)?;
            positive("Open timescale", filling.tau_open)?;
        }
        Ok(())
    }

    /// Resolves start, end and output times against the Kp series.
    ///
    /// The end time comes from an explicit end, else start plus duration,
    /// else the last Kp entry.
    pub fn resolve(&self, kp: &KpSeries) -> Result<RunConfig, ConfigError> {
        self.validate()?;

        let start = self.start.unwrap_or(kp.first().time);
        let end = match (self.end, self.duration) {
            (Some(end), _) => end,
            (None, Some(duration)) => add_seconds(start, duration),
            (None, None) => kp.last().time,
        };
        if end < start {
            return Err(ConfigError::EndBeforeStart {
                start: format_time(start),
                end: format_time(end),
            });
        }

        let output_start = self.output_start.unwrap_or(start);
        if output_start > end {
            return Err(ConfigError::OutputStartAfterEnd {
                output_start: format_time(output_start),
                end: format_time(end),
            });
        }

        let path = self
            .output_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("output.dat"));
        let output = match &self.samples_file {
            Some(locations) => OutputTarget::Samples {
                locations: locations.clone(),
                path,
            },
            None => OutputTarget::State { path },
        };

        let spot = match self.filling {
            Some(_) => {
                let s = &self.spot;
                let spot = SpotConfig::new(
                    add_seconds(start, s.start_offset),
                    add_seconds(start, s.stop_offset),
                    s.colatitude_deg,
                    s.longitude_deg,
                    s.radius_km,
                    s.factor,
                );
                spot.validate()?;
                Some(spot)
            }
            None => None,
        };

        Ok(RunConfig {
            start,
            end,
            output_start,
            output_period: self.output_period,
            clock_period: self.clock_period,
            output,
            potential: self.potential,
            grid: self.grid,
            filling: self.filling,
            saturation: self.saturation,
            spot,
            input_files: self.input_files.clone(),
        })
    }
}

impl RunConfig {
    /// Scheduling parameters for the simulation driver.
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            start: self.start,
            end: self.end,
            output_start: self.output_start,
            output_period: self.output_period,
            clock_period: self.clock_period,
            potential: self.potential,
        }
    }

    /// Filling strategy for this run.
    ///
    /// Without a custom filling the engine uses the stock baseline. With one,
    /// the baseline takes the custom parameters and saturation and is wrapped
    /// by the spot injector.
    pub fn filling_strategy(&self) -> Box<dyn FillingStrategy> {
        let Some(config) = self.filling else {
            return Box::new(DefaultFilling::default());
        };
        let mut base = DefaultFilling::new(config);
        if let Some(saturation) = self.saturation {
            base.set_saturation(saturation);
        }
        match self.spot {
            Some(spot) => Box::new(SpotFilling::new(base, spot)),
            None => Box::new(base),
        }
    }

    /// Builds the reference engine with this run's grid and filling.
    pub fn build_engine(&self) -> Result<PlasmasphereModel, GridError> {
        PlasmasphereModel::new(self.grid, self.filling_strategy())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}
