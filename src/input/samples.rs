//! Sample locations and the schedule on which they are emitted.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{add_seconds, SimTime};

/// Errors that can occur while loading sample locations.
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("IO error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{file}:{line}: expected '<L> <longitude>', got '{text}'")]
    Parse {
        file: String,
        line: usize,
        text: String,
    },
    #[error("No sample locations in '{0}'")]
    Empty(String),
    #[error("Sample period must be positive, got {0} s")]
    NonPositivePeriod(f64),
}

/// An observation point given by L-shell and magnetic longitude (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleLocation {
    pub l: f64,
    pub longitude_deg: f64,
}

/// Where and when samples are taken.
///
/// The first emission is at the schedule start; each [`advance`](Self::advance)
/// moves the next emission one period later.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSchedule {
    locations: Vec<SampleLocation>,
    next: SimTime,
    period: f64,
}

impl SampleSchedule {
    pub fn new(
        locations: Vec<SampleLocation>,
        start: SimTime,
        period: f64,
    ) -> Result<Self, SampleError> {
        if locations.is_empty() {
            return Err(SampleError::Empty("<memory>".to_string()));
        }
        if !(period > 0.0) {
            return Err(SampleError::NonPositivePeriod(period));
        }
        Ok(Self {
            locations,
            next: start,
            period,
        })
    }

    /// Reads `L longitude` pairs from a text file.
    pub fn load(path: &Path, start: SimTime, period: f64) -> Result<Self, SampleError> {
        let text = fs::read_to_string(path).map_err(|source| SampleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = path.display().to_string();
        let locations = parse_locations(&text, &file)?;
        if locations.is_empty() {
            return Err(SampleError::Empty(file));
        }
        Self::new(locations, start, period)
    }

    pub fn locations(&self) -> &[SampleLocation] {
        &self.locations
    }

    /// Time of the next emission.
    pub fn next_time(&self) -> SimTime {
        self.next
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Moves to the following emission and returns its time.
    pub fn advance(&mut self) -> SimTime {
        self.next = add_seconds(self.next, self.period);
        self.next
    }
}

fn parse_locations(text: &str, file: &str) -> Result<Vec<SampleLocation>, SampleError> {
    let mut locations = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let values: Vec<f64> = line
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<_, _>>()
            .map_err(|_| SampleError::Parse {
                file: file.to_string(),
                line: idx + 1,
                text: raw.to_string(),
            })?;
        match values.as_slice() {
            [l, lon] => locations.push(SampleLocation {
                l: *l,
                longitude_deg: *lon,
            }),
            _ => {
                return Err(SampleError::Parse {
                    file: file.to_string(),
                    line: idx + 1,
                    text: raw.to_string(),
                })
            }
        }
    }
    Ok(locations)
}
