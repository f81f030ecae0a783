//! Reference plasmasphere engine.

use std::io::{self, Write};

use tracing::{debug, trace};

use super::{Engine, GridConfig, GridCoordinates, GridError, GridFields, PotentialModel};
use crate::filling::{FillingStrategy, Saturation};
use crate::geometry::colatitude_from_l_shell;
use crate::time::SimTime;

/// Earth's rotation rate in degrees of longitude per second.
const COROTATION_DEG_PER_S: f64 = 360.0 / 86164.0;

/// Density assigned to flux tubes that start outside the plasmapause (cm⁻³).
const TROUGH_DENSITY: f64 = 1.0;

/// Dipole-grid plasmasphere model.
///
/// Each internal step corotates flux-tube content eastward in local time,
/// marks tubes beyond the plasmapause as open, then calls the filling
/// strategy.
pub struct PlasmasphereModel {
    config: GridConfig,
    coords: GridCoordinates,
    fields: GridFields,
    filling: Box<dyn FillingStrategy>,
    potential: PotentialModel,
    kp: f64,
}

impl PlasmasphereModel {
    /// Creates a model with a saturated plasmasphere inside the quiet-time plasmapause.
    pub fn new(config: GridConfig, filling: Box<dyn FillingStrategy>) -> Result<Self, GridError> {
        let coords = GridCoordinates::dipole(&config);
        let mut fields = GridFields::dipole(&coords)?;

        let potential = PotentialModel::default();
        let kp = 0.0;
        let plasmapause = potential.plasmapause_l(kp);
        let saturation = Saturation::default();
        for (it, &l) in coords.r.iter().enumerate() {
            let den = if l <= plasmapause {
                saturation.density(l)
            } else {
                TROUGH_DENSITY
            };
            for ip in 0..coords.n_lon() {
                fields.set_density(ip, it, den);
            }
        }

        let mut model = Self {
            config,
            coords,
            fields,
            filling,
            potential,
            kp,
        };
        model.update_open_closed();
        Ok(model)
    }

    pub fn coords(&self) -> &GridCoordinates {
        &self.coords
    }

    pub fn fields(&self) -> &GridFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut GridFields {
        &mut self.fields
    }

    pub fn filling_name(&self) -> &str {
        self.filling.name()
    }

    pub fn kp(&self) -> f64 {
        self.kp
    }

    /// Current plasmapause L-shell.
    pub fn plasmapause_l(&self) -> f64 {
        self.potential.plasmapause_l(self.kp)
    }

    fn update_open_closed(&mut self) {
        let plasmapause = self.plasmapause_l();
        let n_lon = self.coords.n_lon();
        for (it, &l) in self.coords.r.iter().enumerate() {
            for ip in 0..n_lon {
                self.fields.open.set(ip, it, l > plasmapause);
            }
        }
    }

    /// Shifts flux-tube content eastward by `shift_deg` with linear interpolation.
    fn corotate(&mut self, shift_deg: f64) {
        let (n_lon, n_colat) = self.fields.shape();
        if n_lon < 2 {
            return;
        }
        let bin = 360.0 / n_lon as f64;
        let shift = (shift_deg / bin).rem_euclid(n_lon as f64);
        let whole = shift.floor() as usize;
        let frac = shift - shift.floor();

        let old = self.fields.n.clone();
        for it in 0..n_colat {
            for ip in 0..n_lon {
                let i0 = (ip + n_lon - whole % n_lon) % n_lon;
                let i1 = (i0 + n_lon - 1) % n_lon;
                let n = (1.0 - frac) * old.get(i0, it) + frac * old.get(i1, it);
                self.fields.n.set(ip, it, n);
            }
        }
        self.fields.update_density();
    }

    fn step(&mut self, dt: f64) {
        self.corotate(COROTATION_DEG_PER_S * dt);
        self.update_open_closed();
        self.filling.fill(&self.coords, &mut self.fields, dt);
    }
}

impl Engine for PlasmasphereModel {
    fn advance(&mut self, dt: f64) {
        if !(dt > 0.0) {
            return;
        }
        let max_step = if self.config.max_step_seconds > 0.0 {
            self.config.max_step_seconds
        } else {
            dt
        };
        let steps = (dt / max_step).ceil().max(1.0) as usize;
        let h = dt / steps as f64;
        trace!(dt, steps, "advancing model");
        for _ in 0..steps {
            self.step(h);
        }
    }

    fn set_driving_parameter(&mut self, model: PotentialModel, values: &[f64]) {
        self.potential = model;
        if let Some(&kp) = values.first() {
            self.kp = kp;
        }
        self.update_open_closed();
        debug!(
            model = model.name(),
            kp = self.kp,
            plasmapause = self.plasmapause_l(),
            "potential updated"
        );
    }

    fn set_clock(&mut self, time: SimTime) {
        self.filling.set_time(time);
    }

    fn write_header(&self, sink: &mut dyn Write) -> io::Result<()> {
        sink.write_all(&(self.coords.n_lon() as u32).to_le_bytes())?;
        sink.write_all(&(self.coords.n_colat() as u32).to_le_bytes())?;
        for v in self.coords.r.iter().chain(&self.coords.t).chain(&self.coords.p) {
            sink.write_all(&(*v as f32).to_le_bytes())?;
        }
        Ok(())
    }

    fn write_state(&self, sink: &mut dyn Write) -> io::Result<()> {
        for &d in self.fields.den.values() {
            sink.write_all(&(d as f32).to_le_bytes())?;
        }
        Ok(())
    }

    fn sample_density(&self, l: f64, longitude_deg: f64) -> f64 {
        let colat = colatitude_from_l_shell(l);
        match (self.coords.nearest_lon(longitude_deg), self.coords.nearest_colat(colat)) {
            (Some(ip), Some(it)) => self.fields.den.get(ip, it),
            _ => f64::NAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filling::DefaultFilling;

    fn small_config() -> GridConfig {
        GridConfig {
            n_l: 13,
            n_lon: 24,
            l_min: 2.0,
            l_max: 8.0,
            max_step_seconds: 300.0,
        }
    }

    fn model() -> PlasmasphereModel {
        PlasmasphereModel::new(small_config(), Box::new(DefaultFilling::default())).unwrap()
    }

    #[test]
    fn test_initial_state_is_saturated_inside_plasmapause() {
        let m = model();
        let sat = Saturation::default();
        let it = m.coords().nearest_colat(30.0).unwrap();
        assert!((m.fields().den.get(0, it) - sat.density(4.0)).abs() < 1e-6);
        assert!(!m.fields().open.get(0, it));

        let outer = m.coords().n_colat() - 1;
        assert!(m.fields().open.get(0, outer));
    }

    #[test]
    fn test_kp_moves_plasmapause() {
        let mut m = model();
        let quiet = m.plasmapause_l();
        m.set_driving_parameter(PotentialModel::Sojka, &[6.0]);
        assert!(m.plasmapause_l() < quiet);
        assert_eq!(m.kp(), 6.0);

        let it = m.coords().nearest_colat(30.0).unwrap();
        assert!(m.fields().open.get(0, it));
    }

    #[test]
    fn test_corotation_full_bin_shift_moves_content() {
        let mut m = model();
        let it = 0;
        m.fields_mut().set_density(0, it, 1000.0);
        m.corotate(15.0);
        assert!((m.fields().den.get(1, it) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_corotation_conserves_total_content() {
        let mut m = model();
        m.fields_mut().set_density(3, 2, 5000.0);
        let before: f64 = m.fields().n.values().iter().sum();
        m.corotate(7.3);
        let after: f64 = m.fields().n.values().iter().sum();
        assert!(((after - before) / before).abs() < 1e-12);
    }

    #[test]
    fn test_write_header_and_state_sizes() {
        let m = model();
        let mut header = Vec::new();
        m.write_header(&mut header).unwrap();
        assert_eq!(header.len(), 8 + 4 * (13 + 13 + 24));

        let mut state = Vec::new();
        m.write_state(&mut state).unwrap();
        assert_eq!(state.len(), 4 * 13 * 24);
    }

    #[test]
    fn test_sample_density_uses_nearest_bin() {
        let m = model();
        let sat = Saturation::default();
        assert!((m.sample_density(4.05, 3.0) - sat.density(4.0)).abs() < 1e-6);
    }

    #[test]
    fn test_advance_ignores_non_positive_dt() {
        let mut m = model();
        let before = m.fields().clone();
        m.advance(0.0);
        m.advance(-5.0);
        assert_eq!(&before, m.fields());
    }
}
