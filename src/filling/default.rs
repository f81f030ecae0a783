//! Baseline saturation-limited filling.

use super::{FillingConfig, FillingStrategy, Saturation};
use crate::model::{GridCoordinates, GridFields};

/// Baseline refilling of the plasmasphere.
///
/// On closed flux tubes below saturation, the ionosphere supplies a flux
/// `max_flux · (sat − den) / sat`. Closed tubes above saturation relax back
/// toward it over `tau_closed`; open tubes drain over `tau_open`.
#[derive(Debug, Clone, Default)]
pub struct DefaultFilling {
    config: FillingConfig,
    saturation: Saturation,
}

impl DefaultFilling {
    pub fn new(config: FillingConfig) -> Self {
        Self {
            config,
            saturation: Saturation::default(),
        }
    }

    /// Replaces the saturation model.
    pub fn set_saturation(&mut self, saturation: Saturation) -> &mut Self {
        self.saturation = saturation;
        self
    }

    pub fn with_saturation(mut self, saturation: Saturation) -> Self {
        self.saturation = saturation;
        self
    }

    pub fn config(&self) -> &FillingConfig {
        &self.config
    }

    pub fn saturation(&self) -> &Saturation {
        &self.saturation
    }
}

impl FillingStrategy for DefaultFilling {
    fn name(&self) -> &str {
        "Default Filling"
    }

    fn fill(&mut self, coords: &GridCoordinates, fields: &mut GridFields, dt: f64) {
        let (n_lon, n_colat) = fields.shape();
        let closed_decay = 1.0 - (-dt / self.config.tau_closed).exp();
        let open_decay = (-dt / self.config.tau_open).exp();

        for it in 0..n_colat {
            let sat = self.saturation.density(coords.r[it]);
            for ip in 0..n_lon {
                let vol = fields.vol.get(ip, it);
                let mut n = fields.n.get(ip, it);

                if fields.open.get(ip, it) {
                    n *= open_decay;
                } else {
                    let den = fields.den.get(ip, it);
                    if den < sat {
                        let flux = (sat - den) / sat * self.config.max_flux;
                        n += flux * dt / fields.bi.get(ip, it);
                    } else {
                        n += (sat * vol - n) * closed_decay;
                    }
                }

                fields.n.set(ip, it, n);
                fields.den.set(ip, it, n / vol);
            }
        }
    }
}
