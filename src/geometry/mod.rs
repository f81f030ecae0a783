//! Geometry on the magnetospheric grid.
//!
//! Provides dipole field-line helpers (L-shell, flux-tube volume, ionospheric
//! field strength) and the planar offset used to decide whether a grid cell
//! lies inside a localized filling spot.

mod dipole;
mod spot;

pub use dipole::{
    colatitude_from_l_shell, flux_tube_volume, ionospheric_field, l_shell_from_colatitude,
    DIPOLE_MOMENT_TESLA, EARTH_RADIUS_M,
};
pub use spot::{spot_offset, wrap_longitude_deg, SpotOffset, SPOT_EARTH_RADIUS_KM};
