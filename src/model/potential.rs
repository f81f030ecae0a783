//! Kp-driven convection potential models.

use serde::{Deserialize, Serialize};

/// Corotation potential coefficient `Ω B₀ R_E²` in kV·R_E.
const COROTATION_KV: f64 = 92.4;

/// Electric potential model selecting how Kp sets the plasmapause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PotentialModel {
    /// Empirical plasmapause location, `L = 5.6 − 0.46·Kp`.
    #[default]
    Sojka,
    /// Volland–Stern convection with the Maynard–Chen Kp scaling; the
    /// plasmapause sits at the dusk stagnation point.
    VollandStern,
}

impl PotentialModel {
    pub fn name(&self) -> &'static str {
        match self {
            PotentialModel::Sojka => "sojka",
            PotentialModel::VollandStern => "volland-stern",
        }
    }

    /// L-shell of the last closed drift path for activity level `kp`.
    pub fn plasmapause_l(&self, kp: f64) -> f64 {
        let l = match self {
            PotentialModel::Sojka => 5.6 - 0.46 * kp,
            PotentialModel::VollandStern => {
                let a0 = 0.045 / (1.0 - 0.159 * kp + 0.0093 * kp * kp).powi(3);
                (COROTATION_KV / (2.0 * a0)).cbrt()
            }
        };
        l.max(1.5)
    }
}
