//! Grid coordinates and the parallel field arrays the filling acts on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{
    colatitude_from_l_shell, flux_tube_volume, ionospheric_field, l_shell_from_colatitude,
};

/// Errors raised when assembling grid fields.
#[derive(Error, Debug, PartialEq)]
pub enum GridError {
    #[error("Field '{name}' has {actual} values, expected {expected} ({n_lon} x {n_colat})")]
    ShapeMismatch {
        name: &'static str,
        actual: usize,
        expected: usize,
        n_lon: usize,
        n_colat: usize,
    },
    #[error("Grid must have at least one longitude and one colatitude bin")]
    Empty,
}

/// Layout of the reference dipole grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of L-shell (colatitude) bins.
    pub n_l: usize,
    /// Number of longitude (local time) bins.
    pub n_lon: usize,
    /// Innermost L-shell.
    pub l_min: f64,
    /// Outermost L-shell.
    pub l_max: f64,
    /// Longest internal step taken by the engine, seconds.
    pub max_step_seconds: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            n_l: 41,
            n_lon: 48,
            l_min: 1.5,
            l_max: 9.5,
            max_step_seconds: 300.0,
        }
    }
}

/// Bin-centre coordinate vectors.
///
/// `r[it]` is the L-shell of colatitude bin `it`, `t` holds colatitudes in
/// degrees and `p` longitudes in degrees east of midnight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCoordinates {
    pub r: Vec<f64>,
    pub t: Vec<f64>,
    pub p: Vec<f64>,
}

impl GridCoordinates {
    /// Builds coordinates from explicit colatitude and longitude vectors.
    ///
    /// `r` is derived from `t` through the dipole L-shell relation.
    pub fn new(t: Vec<f64>, p: Vec<f64>) -> Self {
        let r = t.iter().map(|&c| l_shell_from_colatitude(c)).collect();
        Self { r, t, p }
    }

    /// Evenly spaced L-shells from `l_min` to `l_max`, evenly spaced longitudes from 0°.
    pub fn dipole(config: &GridConfig) -> Self {
        let n_l = config.n_l.max(1);
        let dl = if n_l > 1 {
            (config.l_max - config.l_min) / (n_l - 1) as f64
        } else {
            0.0
        };
        let t = (0..n_l)
            .map(|i| colatitude_from_l_shell(config.l_min + dl * i as f64))
            .collect();

        let n_lon = config.n_lon.max(1);
        let p = (0..n_lon).map(|j| 360.0 * j as f64 / n_lon as f64).collect();

        Self::new(t, p)
    }

    pub fn n_colat(&self) -> usize {
        self.t.len()
    }

    pub fn n_lon(&self) -> usize {
        self.p.len()
    }

    /// Index of the colatitude bin nearest to `colatitude_deg`.
    pub fn nearest_colat(&self, colatitude_deg: f64) -> Option<usize> {
        nearest_index(&self.t, |t| (t - colatitude_deg).abs())
    }

    /// Index of the longitude bin nearest to `longitude_deg`, accounting for wrap.
    pub fn nearest_lon(&self, longitude_deg: f64) -> Option<usize> {
        nearest_index(&self.p, |p| {
            let d = (p - longitude_deg).rem_euclid(360.0);
            d.min(360.0 - d)
        })
    }
}

fn nearest_index(values: &[f64], distance: impl Fn(f64) -> f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i, distance(v)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// A 2-D array indexed by (longitude bin, colatitude bin), stored longitude-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGrid<T> {
    n_lon: usize,
    n_colat: usize,
    values: Vec<T>,
}

impl<T: Copy> FieldGrid<T> {
    /// Creates a grid filled with `value`.
    pub fn filled(n_lon: usize, n_colat: usize, value: T) -> Self {
        Self {
            n_lon,
            n_colat,
            values: vec![value; n_lon * n_colat],
        }
    }

    /// Wraps existing values, checking the shape.
    pub fn from_values(
        name: &'static str,
        n_lon: usize,
        n_colat: usize,
        values: Vec<T>,
    ) -> Result<Self, GridError> {
        let expected = n_lon * n_colat;
        if values.len() != expected {
            return Err(GridError::ShapeMismatch {
                name,
                actual: values.len(),
                expected,
                n_lon,
                n_colat,
            });
        }
        Ok(Self {
            n_lon,
            n_colat,
            values,
        })
    }

    #[inline]
    fn index(&self, ip: usize, it: usize) -> usize {
        debug_assert!(ip < self.n_lon && it < self.n_colat);
        ip * self.n_colat + it
    }

    #[inline]
    pub fn get(&self, ip: usize, it: usize) -> T {
        self.values[self.index(ip, it)]
    }

    #[inline]
    pub fn set(&mut self, ip: usize, it: usize, value: T) {
        let i = self.index(ip, it);
        self.values[i] = value;
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_lon, self.n_colat)
    }

    /// Values in longitude-major order.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }
}

/// The parallel field arrays owned by the engine.
///
/// * `n` - flux-tube content per unit magnetic flux (particles/Wb)
/// * `den` - equatorial density, `n / vol` (cm⁻³)
/// * `vol` - flux-tube volume per unit flux (cm³/Wb)
/// * `bi` - ionospheric field strength (T), converts surface flux into content
/// * `open` - true where the flux tube lies outside the plasmapause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridFields {
    pub n: FieldGrid<f64>,
    pub den: FieldGrid<f64>,
    pub vol: FieldGrid<f64>,
    pub bi: FieldGrid<f64>,
    pub open: FieldGrid<bool>,
}

impl GridFields {
    /// Empty flux tubes with dipole volume and field factors for `coords`.
    pub fn dipole(coords: &GridCoordinates) -> Result<Self, GridError> {
        let (n_lon, n_colat) = (coords.n_lon(), coords.n_colat());
        if n_lon == 0 || n_colat == 0 {
            return Err(GridError::Empty);
        }

        let mut vol = FieldGrid::filled(n_lon, n_colat, 0.0);
        let mut bi = FieldGrid::filled(n_lon, n_colat, 0.0);
        for it in 0..n_colat {
            let v = flux_tube_volume(coords.r[it]);
            let b = ionospheric_field(coords.t[it]);
            for ip in 0..n_lon {
                vol.set(ip, it, v);
                bi.set(ip, it, b);
            }
        }

        Ok(Self {
            n: FieldGrid::filled(n_lon, n_colat, 0.0),
            den: FieldGrid::filled(n_lon, n_colat, 0.0),
            vol,
            bi,
            open: FieldGrid::filled(n_lon, n_colat, false),
        })
    }

    /// Assembles fields from raw longitude-major values, checking every shape.
    pub fn from_parts(
        n_lon: usize,
        n_colat: usize,
        n: Vec<f64>,
        den: Vec<f64>,
        vol: Vec<f64>,
        bi: Vec<f64>,
    ) -> Result<Self, GridError> {
        if n_lon == 0 || n_colat == 0 {
            return Err(GridError::Empty);
        }
        Ok(Self {
            n: FieldGrid::from_values("n", n_lon, n_colat, n)?,
            den: FieldGrid::from_values("den", n_lon, n_colat, den)?,
            vol: FieldGrid::from_values("vol", n_lon, n_colat, vol)?,
            bi: FieldGrid::from_values("bi", n_lon, n_colat, bi)?,
            open: FieldGrid::filled(n_lon, n_colat, false),
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.n.shape()
    }

    /// Sets the density of one cell and the matching content.
    pub fn set_density(&mut self, ip: usize, it: usize, den: f64) {
        self.den.set(ip, it, den);
        self.n.set(ip, it, den * self.vol.get(ip, it));
    }

    /// Recomputes `den = n / vol` everywhere.
    pub fn update_density(&mut self) {
        let vol = self.vol.values();
        for ((d, &n), &v) in self.den.values_mut().iter_mut().zip(self.n.values()).zip(vol) {
            *d = n / v;
        }
    }
}
