//! Spot filling: baseline filling plus a localized, amplified flux.

use tracing::debug;

use super::{DefaultFilling, FillingStrategy, SpotConfig};
use crate::geometry::{l_shell_from_colatitude, spot_offset};
use crate::model::{GridCoordinates, GridFields};
use crate::time::{format_time, SimTime};

/// Decorates [`DefaultFilling`] with a substorm-like spot.
///
/// The baseline always runs first. While the clock lies inside the spot
/// window, every cell whose surface distance from the spot centre is
/// strictly below `radius_km` receives an additional flux
/// `(sat_s − den) / sat_s · fmax_s`, where `sat_s` and `fmax_s` are the
/// baseline saturation at the centre's L-shell and the baseline max flux,
/// both multiplied by the amplification factor.
#[derive(Debug, Clone)]
pub struct SpotFilling {
    base: DefaultFilling,
    spot: SpotConfig,
    clock: Option<SimTime>,
}

impl SpotFilling {
    pub fn new(base: DefaultFilling, spot: SpotConfig) -> Self {
        Self {
            base,
            spot,
            clock: None,
        }
    }

    /// Replaces the spot parameters.
    pub fn set_spot(&mut self, spot: SpotConfig) {
        self.spot = spot;
    }

    pub fn spot(&self) -> &SpotConfig {
        &self.spot
    }

    pub fn base(&self) -> &DefaultFilling {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut DefaultFilling {
        &mut self.base
    }

    /// Returns true if the last clock value lies inside the spot window.
    pub fn is_active(&self) -> bool {
        self.clock.is_some_and(|t| self.spot.is_active_at(t))
    }

    /// Amplified saturation density at the spot centre's L-shell.
    pub fn spot_saturation(&self) -> f64 {
        let l = l_shell_from_colatitude(self.spot.center_colatitude_deg);
        self.spot.amplification * self.base.saturation().density(l)
    }

    /// Amplified maximum flux.
    pub fn spot_max_flux(&self) -> f64 {
        self.spot.amplification * self.base.config().max_flux
    }

    /// Flux injected into a spot cell at the given density.
    ///
    /// Positive below the amplified saturation, negative above it.
    pub fn injected_flux(&self, density: f64) -> f64 {
        let sat = self.spot_saturation();
        (sat - density) / sat * self.spot_max_flux()
    }

    /// Returns true if the cell lies strictly inside the spot circle.
    pub fn contains(&self, colatitude_deg: f64, longitude_deg: f64) -> bool {
        spot_offset(
            colatitude_deg,
            longitude_deg,
            self.spot.center_colatitude_deg,
            self.spot.center_longitude_deg,
        )
        .distance_km()
            < self.spot.radius_km
    }
}

impl FillingStrategy for SpotFilling {
    fn name(&self) -> &str {
        "Spot Filling"
    }

    fn fill(&mut self, coords: &GridCoordinates, fields: &mut GridFields, dt: f64) {
        self.base.fill(coords, fields, dt);

        if !self.is_active() {
            return;
        }
        if let Some(t) = self.clock {
            debug!(time = %format_time(t), "spot active");
        }

        let sat = self.spot_saturation();
        let max_flux = self.spot_max_flux();
        let (n_lon, n_colat) = fields.shape();

        for it in 0..n_colat {
            for ip in 0..n_lon {
                if !self.contains(coords.t[it], coords.p[ip]) {
                    continue;
                }
                let flux = (sat - fields.den.get(ip, it)) / sat * max_flux;
                let n = fields.n.get(ip, it) + flux * dt / fields.bi.get(ip, it);
                fields.n.set(ip, it, n);
                fields.den.set(ip, it, n / fields.vol.get(ip, it));
            }
        }
    }

    fn set_time(&mut self, time: SimTime) {
        self.clock = Some(time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filling::{FillingConfig, Saturation};
    use crate::geometry::SPOT_EARTH_RADIUS_KM;
    use crate::time::from_epoch_seconds;

    fn spot_config() -> SpotConfig {
        SpotConfig::new(
            from_epoch_seconds(0.0),
            from_epoch_seconds(3600.0),
            30.0,
            315.0,
            1000.0,
            10.0,
        )
    }

    /// 1° colatitude bins from 20° to 40°, 5° longitude bins.
    fn setup() -> (GridCoordinates, GridFields) {
        let t: Vec<f64> = (20..=40).map(|c| c as f64).collect();
        let p: Vec<f64> = (0..72).map(|j| j as f64 * 5.0).collect();
        let coords = GridCoordinates::new(t, p);
        let mut fields = GridFields::dipole(&coords).unwrap();
        for it in 0..coords.n_colat() {
            for ip in 0..coords.n_lon() {
                fields.set_density(ip, it, 10.0);
            }
        }
        (coords, fields)
    }

    fn run_both(time: f64) -> (GridCoordinates, GridFields, GridFields) {
        let (coords, fields) = setup();
        let base = DefaultFilling::new(FillingConfig::new(2e12, 864000.0, 86400.0));

        let mut baseline_fields = fields.clone();
        let mut baseline = base.clone();
        baseline.fill(&coords, &mut baseline_fields, 300.0);

        let mut spot_fields = fields;
        let mut spot = SpotFilling::new(base, spot_config());
        spot.set_time(from_epoch_seconds(time));
        spot.fill(&coords, &mut spot_fields, 300.0);

        (coords, baseline_fields, spot_fields)
    }

    #[test]
    fn test_outside_window_equals_baseline() {
        for time in [-1.0, 3600.5, 1e6] {
            let (_, baseline, spot) = run_both(time);
            assert_eq!(baseline, spot, "spot must be a no-op at t={}", time);
        }
    }

    #[test]
    fn test_cells_outside_radius_untouched() {
        let (coords, baseline, spot) = run_both(1800.0);
        let filling = SpotFilling::new(DefaultFilling::default(), spot_config());

        let mut inside = 0;
        for it in 0..coords.n_colat() {
            for ip in 0..coords.n_lon() {
                if filling.contains(coords.t[it], coords.p[ip]) {
                    inside += 1;
                    assert!(spot.den.get(ip, it) > baseline.den.get(ip, it));
                } else {
                    assert_eq!(spot.n.get(ip, it).to_bits(), baseline.n.get(ip, it).to_bits());
                    assert_eq!(spot.den.get(ip, it).to_bits(), baseline.den.get(ip, it).to_bits());
                }
            }
        }
        assert!(inside > 0);
    }

    #[test]
    fn test_window_edges_are_active() {
        for time in [0.0, 3600.0] {
            let (coords, baseline, spot) = run_both(time);
            let it = coords.nearest_colat(30.0).unwrap();
            let ip = coords.nearest_lon(315.0).unwrap();
            assert!(spot.den.get(ip, it) > baseline.den.get(ip, it));
        }
    }

    #[test]
    fn test_injected_flux_sign() {
        let filling = SpotFilling::new(DefaultFilling::default(), spot_config());
        let sat = filling.spot_saturation();

        assert!(filling.injected_flux(0.5 * sat) > 0.0);
        assert!(filling.injected_flux(2.0 * sat) < 0.0);
        assert_eq!(filling.injected_flux(sat), 0.0);
        assert!((filling.injected_flux(0.0) - filling.spot_max_flux()).abs() < 1.0);
    }

    #[test]
    fn test_amplification_scales_saturation_and_flux() {
        let base = DefaultFilling::default().with_saturation(Saturation::new(3.0, -0.25));
        let filling = SpotFilling::new(base, spot_config());

        let expected_sat = 10.0 * 10f64.powf(3.0 - 0.25 * 4.0);
        assert!((filling.spot_saturation() - expected_sat).abs() < 1e-6);
        assert_eq!(filling.spot_max_flux(), 2e13);
    }

    #[test]
    fn test_above_spot_saturation_density_decreases() {
        let (coords, mut fields) = setup();
        let mut filling = SpotFilling::new(DefaultFilling::default(), spot_config());
        let it = coords.nearest_colat(30.0).unwrap();
        let ip = coords.nearest_lon(315.0).unwrap();
        let high = 3.0 * filling.spot_saturation();
        fields.set_density(ip, it, high);

        filling.set_time(from_epoch_seconds(10.0));
        filling.fill(&coords, &mut fields, 300.0);

        assert!(fields.den.get(ip, it) < high);
    }

    #[test]
    fn test_hard_edge_at_radius() {
        let filling = SpotFilling::new(DefaultFilling::default(), spot_config());
        let deg_per_km = 1.0 / (SPOT_EARTH_RADIUS_KM * std::f64::consts::PI / 180.0);

        assert!(filling.contains(30.0 + 999.0 * deg_per_km, 315.0));
        assert!(!filling.contains(30.0 + 1001.0 * deg_per_km, 315.0));
    }

    #[test]
    fn test_unset_clock_is_inactive() {
        let filling = SpotFilling::new(DefaultFilling::default(), spot_config());
        assert!(!filling.is_active());
    }
}
