//! Dipole field-line geometry.
//!
//! Grid rows are field lines labelled by the colatitude of their ionospheric
//! foot point. For a centred dipole the equatorial crossing distance (the
//! L-shell, in Earth radii) is `1 / sin²(colatitude)`.

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6.371e6;

/// Equatorial surface field of the dipole, in tesla.
pub const DIPOLE_MOMENT_TESLA: f64 = 3.12e-5;

/// L-shell of the field line with foot point at `colatitude_deg`.
pub fn l_shell_from_colatitude(colatitude_deg: f64) -> f64 {
    let s = colatitude_deg.to_radians().sin();
    1.0 / (s * s)
}

/// Foot-point colatitude (degrees, northern hemisphere) of L-shell `l`.
pub fn colatitude_from_l_shell(l: f64) -> f64 {
    (1.0 / l.sqrt()).asin().to_degrees()
}

/// Flux-tube volume per unit magnetic flux, in cm³/Wb.
///
/// Integrates `ds / B` along the dipole field line between its two
/// ionospheric foot points. In latitude `λ` the integrand is
/// `L⁴ R_E cos⁷λ / B₀`, which has a closed form.
pub fn flux_tube_volume(l: f64) -> f64 {
    let s = (1.0 - 1.0 / l).max(0.0).sqrt();
    let cos7_integral =
        s - s.powi(3) + 3.0 / 5.0 * s.powi(5) - 1.0 / 7.0 * s.powi(7);
    let volume_m_per_t = 2.0 * l.powi(4) * EARTH_RADIUS_M / DIPOLE_MOMENT_TESLA * cos7_integral;
    volume_m_per_t * 1e6
}

/// Field strength (tesla) at the Earth's surface at `colatitude_deg`.
pub fn ionospheric_field(colatitude_deg: f64) -> f64 {
    let c = colatitude_deg.to_radians().cos();
    DIPOLE_MOMENT_TESLA * (1.0 + 3.0 * c * c).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l_shell_round_trip_at_thirty_degrees() {
        let l = l_shell_from_colatitude(30.0);
        assert!((l - 4.0).abs() < 1e-9);
        assert!((colatitude_from_l_shell(l) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_volume_grows_with_l() {
        let mut prev = 0.0;
        for l in [1.5, 2.0, 3.0, 4.0, 6.0, 8.0] {
            let v = flux_tube_volume(l);
            assert!(v > prev, "volume at L={} should exceed {}", l, prev);
            prev = v;
        }
    }

    #[test]
    fn test_field_stronger_at_pole() {
        assert!(ionospheric_field(0.0) > ionospheric_field(45.0));
        assert!((ionospheric_field(90.0) - DIPOLE_MOMENT_TESLA).abs() < 1e-12);
        assert!((ionospheric_field(0.0) - 2.0 * DIPOLE_MOMENT_TESLA).abs() < 1e-12);
    }
}
