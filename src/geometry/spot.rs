//! Planar distance of a grid cell from a spot centre.

/// Earth radius (km) used when projecting angular offsets onto the surface.
pub const SPOT_EARTH_RADIUS_KM: f64 = 6400.0;

/// Wraps a longitude difference (degrees) into `[-180, 180]`.
///
/// A single wrap is applied, which is sufficient for differences of two
/// longitudes that each lie in `[0, 360)`.
pub fn wrap_longitude_deg(delta_deg: f64) -> f64 {
    let mut d = delta_deg;
    if d > 180.0 {
        d -= 360.0;
    }
    if d < -180.0 {
        d += 360.0;
    }
    d
}

/// Surface offset of a cell from a spot centre, in kilometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotOffset {
    /// Offset along the meridian (positive toward larger colatitude).
    pub north_south_km: f64,
    /// Offset along the parallel, scaled by meridian convergence.
    pub east_west_km: f64,
}

impl SpotOffset {
    /// Planar distance `sqrt(ns² + ew²)`.
    pub fn distance_km(&self) -> f64 {
        self.north_south_km.hypot(self.east_west_km)
    }
}

/// Computes the offset of a cell at (`colatitude_deg`, `longitude_deg`) from a
/// spot centred at (`center_colatitude_deg`, `center_longitude_deg`).
///
/// The east-west component uses the wrapped longitude difference scaled by
/// `sin(colatitude)` of the cell. At the poles that scale collapses to zero.
pub fn spot_offset(
    colatitude_deg: f64,
    longitude_deg: f64,
    center_colatitude_deg: f64,
    center_longitude_deg: f64,
) -> SpotOffset {
    let north_south_km = (colatitude_deg - center_colatitude_deg).to_radians() * SPOT_EARTH_RADIUS_KM;
    let d_lon = wrap_longitude_deg(longitude_deg - center_longitude_deg);
    let east_west_km =
        d_lon.to_radians() * SPOT_EARTH_RADIUS_KM * colatitude_deg.to_radians().sin();

    SpotOffset {
        north_south_km,
        east_west_km,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude_deg(358.0), -2.0);
        assert_eq!(wrap_longitude_deg(-358.0), 2.0);
        assert_eq!(wrap_longitude_deg(180.0), 180.0);
        assert_eq!(wrap_longitude_deg(-45.0), -45.0);
    }

    #[test]
    fn test_wraparound_matches_two_degree_separation() {
        let wrapped = spot_offset(60.0, 359.0, 60.0, 1.0);
        let direct = spot_offset(60.0, 3.0, 60.0, 1.0);

        assert!((wrapped.east_west_km.abs() - direct.east_west_km.abs()).abs() < 1e-9);
        assert!((wrapped.distance_km() - direct.distance_km()).abs() < 1e-9);

        let expected = 2f64.to_radians() * SPOT_EARTH_RADIUS_KM * 60f64.to_radians().sin();
        assert!((wrapped.distance_km() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_centre_has_zero_distance() {
        let offset = spot_offset(30.0, 315.0, 30.0, 315.0);
        assert_eq!(offset.distance_km(), 0.0);
    }

    #[test]
    fn test_meridian_offset() {
        let offset = spot_offset(40.0, 315.0, 30.0, 315.0);
        let expected = 10f64.to_radians() * SPOT_EARTH_RADIUS_KM;
        assert!((offset.north_south_km - expected).abs() < 1e-9);
        assert_eq!(offset.east_west_km, 0.0);
    }

    #[test]
    fn test_pole_collapses_east_west() {
        let offset = spot_offset(0.0, 90.0, 0.0, 270.0);
        assert!(offset.east_west_km.abs() < 1e-9);
        assert!(offset.distance_km() < 1e-9);
    }
}
