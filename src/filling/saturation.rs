//! Equilibrium (saturation) density as a function of L-shell.

use serde::{Deserialize, Serialize};

/// Saturation model `n_eq = 10^(a + b·L)` in cm⁻³.
///
/// Defaults follow the Carpenter–Anderson saturated plasmasphere profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Saturation {
    pub a: f64,
    pub b: f64,
}

impl Default for Saturation {
    fn default() -> Self {
        Self {
            a: 3.9043,
            b: -0.3145,
        }
    }
}

impl Saturation {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// Saturation density at L-shell `l`.
    pub fn density(&self, l: f64) -> f64 {
        10f64.powf(self.a + self.b * l)
    }
}
