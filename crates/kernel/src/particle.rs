//! Particle state and the per-particle integration step.
//!
//! Particles are stored array-of-structs in a single arena owned by the
//! simulator. The neighbor grid refers to them by slot index only.

use glam::DVec2;

/// Mass assigned to particles when the caller has no better value.
pub const DEFAULT_PARTICLE_MASS: f64 = 1.0;

/// A single fluid particle.
///
/// `density` and `pressure` are derived every step by the density pass.
/// `force` is only meaningful between the force pass and integration of a
/// single step; it is zero at every public step boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Position (m)
    pub position: DVec2,
    /// Velocity (m/s)
    pub velocity: DVec2,
    /// Mass (kg), strictly positive
    pub mass: f64,
    /// Density from the last density pass (kg/m^2)
    pub density: f64,
    /// Pressure from the last density pass (Pa)
    pub pressure: f64,
    /// Accumulated force for the current step (N)
    pub force: DVec2,
}

impl Particle {
    /// Create a particle with zero density, pressure and force.
    pub fn new(position: DVec2, velocity: DVec2, mass: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
            density: 0.0,
            pressure: 0.0,
            force: DVec2::ZERO,
        }
    }

    /// Advance velocity and position by `dt` with semi-implicit Euler.
    ///
    /// ```text
    /// v(t + dt) = v(t) + F / m * dt
    /// x(t + dt) = x(t) + v(t + dt) * dt
    /// ```
    ///
    /// The accumulated force is reset to zero afterwards.
    pub fn update(&mut self, dt: f64) {
        let acceleration = self.force / self.mass;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
        self.force = DVec2::ZERO;
    }

    /// Speed |v| (m/s).
    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(DVec2::ZERO, DVec2::ZERO, DEFAULT_PARTICLE_MASS)
    }
}
