//! Axis-aligned domain walls.
//!
//! The domain is the rectangle `[0, width] x [0, height]`. Particles that end
//! a step outside it are clamped back onto the wall and their velocity
//! component along that axis is reflected and damped.

use serde::{Deserialize, Serialize};

use crate::particle::Particle;

/// Fraction of normal speed kept (and reversed) after hitting a wall.
pub const BOUNDARY_DAMPING: f64 = 0.5;

/// Extent of the simulation rectangle anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainBounds {
    /// Extent along x (m)
    pub width: f64,
    /// Extent along y (m)
    pub height: f64,
}

impl DomainBounds {
    /// Create bounds, rejecting non-finite or non-positive extents.
    pub fn new(width: f64, height: f64) -> Result<Self, String> {
        let bounds = Self { width, height };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check both extents are finite and positive.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(format!("domain width must be finite and positive, got {}", self.width));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(format!("domain height must be finite and positive, got {}", self.height));
        }
        Ok(())
    }

    /// Extent along each axis as `[width, height]`.
    pub fn extent(&self) -> [f64; 2] {
        [self.width, self.height]
    }

    /// Return `true` if `[x, y]` lies inside the closed rectangle.
    pub fn contains(&self, position: [f64; 2]) -> bool {
        (0.0..=self.width).contains(&position[0]) && (0.0..=self.height).contains(&position[1])
    }
}

impl Default for DomainBounds {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 10.0,
        }
    }
}

/// Clamp every particle into the domain.
///
/// Each axis is handled independently, so a particle past a corner is
/// clamped on both axes in the same call. The velocity component is
/// multiplied by `-BOUNDARY_DAMPING` regardless of its sign.
pub fn enforce_domain(particles: &mut [Particle], bounds: &DomainBounds) {
    let extent = bounds.extent();

    for p in particles.iter_mut() {
        for axis in 0..2 {
            if p.position[axis] < 0.0 {
                p.position[axis] = 0.0;
                p.velocity[axis] *= -BOUNDARY_DAMPING;
            }
            if p.position[axis] > extent[axis] {
                p.position[axis] = extent[axis];
                p.velocity[axis] *= -BOUNDARY_DAMPING;
            }
        }
    }
}
