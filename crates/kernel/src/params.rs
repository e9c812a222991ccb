//! Tunable SPH parameters.
//!
//! All fields may be changed between steps. A new smoothing radius takes
//! effect at the next `step()`, when the neighbor grid is rebuilt with the
//! matching cell size.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Parameters controlling the SPH solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphParams {
    /// Smoothing radius h (m); also the neighbor grid cell size.
    pub smoothing_radius: f64,
    /// Rest density rho_0; pressure is zero here.
    pub rest_density: f64,
    /// Equation-of-state stiffness k.
    pub gas_constant: f64,
    /// Viscosity coefficient mu.
    pub viscosity: f64,
    /// Gravitational acceleration (m/s^2).
    pub gravity: DVec2,
    /// Fixed time step (s).
    pub dt: f64,
}

impl Default for SphParams {
    fn default() -> Self {
        Self {
            smoothing_radius: 0.5,
            rest_density: 1000.0,
            gas_constant: 2000.0,
            viscosity: 0.018,
            gravity: DVec2::new(0.0, -9.81),
            dt: 0.001,
        }
    }
}

impl SphParams {
    /// Check that every parameter is usable by the solver.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.smoothing_radius.is_finite() && self.smoothing_radius > 0.0) {
            return Err(format!(
                "smoothing_radius must be finite and positive, got {}",
                self.smoothing_radius
            ));
        }
        if !(self.rest_density.is_finite() && self.rest_density > 0.0) {
            return Err(format!(
                "rest_density must be finite and positive, got {}",
                self.rest_density
            ));
        }
        if !(self.gas_constant.is_finite() && self.gas_constant >= 0.0) {
            return Err(format!(
                "gas_constant must be finite and non-negative, got {}",
                self.gas_constant
            ));
        }
        if !(self.viscosity.is_finite() && self.viscosity >= 0.0) {
            return Err(format!(
                "viscosity must be finite and non-negative, got {}",
                self.viscosity
            ));
        }
        if !self.gravity.is_finite() {
            return Err(format!("gravity must be finite, got {}", self.gravity));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(format!("dt must be finite and positive, got {}", self.dt));
        }
        Ok(())
    }
}
