//! SPH smoothing kernels and the density and force passes.
//!
//! Three radially symmetric kernels with compact support `h`:
//!
//! - Poly6 for density summation
//! - gradient of Spiky for pressure forces
//! - Laplacian of the viscosity kernel for viscous forces
//!
//! The normalization constants are the classic Muller et al. (2003) ones and
//! are reproduced exactly; the simulation's reference behavior depends on
//! them.

use std::f64::consts::PI;

use glam::DVec2;

use crate::eos;
use crate::neighbor::NeighborGrid;
use crate::params::SphParams;
use crate::particle::Particle;

/// Separations below this are treated as coincident: the pressure gradient
/// is zero and the pair is skipped in the force pass.
pub const MIN_SEPARATION: f64 = 1.0e-6;

/// Poly6 density kernel.
///
/// ```text
/// W(r, h) = 315 / (64 pi h^9) * (h^2 - r^2)^3   for r < h
/// W(r, h) = 0                                    otherwise
/// ```
pub fn density_kernel(r: f64, h: f64) -> f64 {
    if r >= h {
        return 0.0;
    }
    let coeff = 315.0 / (64.0 * PI * h.powi(9));
    coeff * (h * h - r * r).powi(3)
}

/// Gradient of the Spiky kernel, used for pressure forces.
///
/// ```text
/// grad W(r_vec, h) = -45 / (pi h^6) * (h - r)^2 * r_vec / r   for 1e-6 <= r < h
/// ```
///
/// Returns the zero vector outside the support and for near-coincident
/// particles.
///
/// # Arguments
/// * `r_vec` - Displacement from particle j to particle i.
/// * `r` - Its length, precomputed by the caller.
/// * `h` - Smoothing radius.
pub fn pressure_gradient_kernel(r_vec: DVec2, r: f64, h: f64) -> DVec2 {
    if r >= h || r < MIN_SEPARATION {
        return DVec2::ZERO;
    }
    let coeff = -45.0 / (PI * h.powi(6));
    coeff * (h - r).powi(2) * r_vec / r
}

/// Laplacian of the viscosity kernel.
///
/// ```text
/// lap W(r, h) = 45 / (pi h^6) * (h - r)   for r < h
/// ```
pub fn viscosity_kernel(r: f64, h: f64) -> f64 {
    if r >= h {
        return 0.0;
    }
    let coeff = 45.0 / (PI * h.powi(6));
    coeff * (h - r)
}

// ---------------------------------------------------------------------------
// Density and pressure
// ---------------------------------------------------------------------------

/// Compute density and pressure for every particle.
///
/// ```text
/// rho_i = max(sum_j m_j * W(|x_i - x_j|, h), rho_0)
/// p_i   = k * (rho_i - rho_0)
/// ```
///
/// The neighbor query includes particle i itself, so each particle
/// contributes its own mass at r = 0. The grid must have been rebuilt from
/// the current positions.
pub fn compute_density_pressure(particles: &mut [Particle], grid: &NeighborGrid, params: &SphParams) {
    let h = params.smoothing_radius;

    for i in 0..particles.len() {
        let mut rho = 0.0;
        grid.for_each_neighbor(particles[i].position, h, particles, |j, _, r| {
            rho += particles[j].mass * density_kernel(r, h);
        });

        let density = eos::floor_density(rho, params.rest_density);
        particles[i].density = density;
        particles[i].pressure = eos::linear_eos(density, params.rest_density, params.gas_constant);
    }
}

// ---------------------------------------------------------------------------
// Forces
// ---------------------------------------------------------------------------

/// Pressure and viscosity force on particle `i` from its neighbors,
/// excluding gravity.
///
/// ```text
/// F_p = -sum_j m_j * (p_i + p_j) / (2 rho_j) * grad W(x_i - x_j, h)
/// F_v =  mu * sum_j m_j * (v_j - v_i) / rho_j * lap W(|x_i - x_j|, h)
/// ```
///
/// Runs its own neighbor query rather than reusing the density pass result.
/// The self-match and pairs closer than [`MIN_SEPARATION`] are skipped.
pub fn interaction_force(i: usize, particles: &[Particle], grid: &NeighborGrid, params: &SphParams) -> (DVec2, DVec2) {
    let h = params.smoothing_radius;
    let pi = &particles[i];
    let mut pressure_force = DVec2::ZERO;
    let mut viscosity_force = DVec2::ZERO;

    grid.for_each_neighbor(pi.position, h, particles, |j, r_vec, r| {
        if j == i || r < MIN_SEPARATION {
            return;
        }
        let pj = &particles[j];

        let grad = pressure_gradient_kernel(r_vec, r, h);
        pressure_force -= pj.mass * ((pi.pressure + pj.pressure) / (2.0 * pj.density)) * grad;

        let velocity_diff = pj.velocity - pi.velocity;
        viscosity_force += pj.mass * (velocity_diff / pj.density) * viscosity_kernel(r, h);
    });

    (pressure_force, viscosity_force * params.viscosity)
}

/// Compute the total force on every particle and store it, replacing
/// whatever was accumulated before.
///
/// ```text
/// F_i = F_p + F_v + m_i * g
/// ```
///
/// All forces are evaluated against the same particle state before any is
/// written back. Densities and pressures must be current.
pub fn compute_forces(particles: &mut [Particle], grid: &NeighborGrid, params: &SphParams) {
    let state: &[Particle] = particles;
    let forces: Vec<DVec2> = (0..state.len())
        .map(|i| {
            let (pressure, viscous) = interaction_force(i, state, grid, params);
            pressure + viscous + state[i].mass * params.gravity
        })
        .collect();

    for (p, f) in particles.iter_mut().zip(forces) {
        p.force = f;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: f64 = 0.5;

    fn at(x: f64, y: f64) -> Particle {
        Particle::new(DVec2::new(x, y), DVec2::ZERO, 1.0)
    }

    fn grid_for(particles: &[Particle], h: f64) -> NeighborGrid {
        let mut grid = NeighborGrid::new(h);
        grid.rebuild(particles);
        grid
    }

    #[test]
    fn density_kernel_at_zero_distance() {
        let expected = 315.0 / (64.0 * PI * H.powi(9)) * H.powi(6);
        let w = density_kernel(0.0, H);
        assert!((w - expected).abs() < 1e-9, "w={w}, expected={expected}");
    }

    #[test]
    fn kernels_vanish_at_and_beyond_support() {
        for r in [H, H + 1e-9, 2.0 * H, 10.0] {
            assert_eq!(density_kernel(r, H), 0.0);
            assert_eq!(viscosity_kernel(r, H), 0.0);
            assert_eq!(pressure_gradient_kernel(DVec2::new(r, 0.0), r, H), DVec2::ZERO);
        }
    }

    #[test]
    fn kernels_positive_inside_support() {
        for i in 0..50 {
            let r = i as f64 * 0.01;
            assert!(density_kernel(r, H) > 0.0, "poly6 at r={r}");
            assert!(viscosity_kernel(r, H) > 0.0, "viscosity laplacian at r={r}");
        }
    }

    #[test]
    fn gradient_is_zero_for_coincident_particles() {
        assert_eq!(pressure_gradient_kernel(DVec2::ZERO, 0.0, H), DVec2::ZERO);
        let tiny = DVec2::new(5e-7, 0.0);
        assert_eq!(pressure_gradient_kernel(tiny, tiny.length(), H), DVec2::ZERO);
    }

    #[test]
    fn gradient_points_toward_neighbor() {
        // r_vec from j to i along +x, gradient of a decreasing kernel points along -x
        let r_vec = DVec2::new(0.2, 0.0);
        let g = pressure_gradient_kernel(r_vec, 0.2, H);
        assert!(g.x < 0.0, "gx={}", g.x);
        assert_eq!(g.y, 0.0);

        let expected = -45.0 / (PI * H.powi(6)) * (H - 0.2_f64).powi(2);
        assert!((g.x - expected).abs() < 1e-9);
    }

    #[test]
    fn gradient_is_antisymmetric() {
        let r_vec = DVec2::new(0.12, -0.07);
        let r = r_vec.length();
        assert_eq!(pressure_gradient_kernel(r_vec, r, H), -pressure_gradient_kernel(-r_vec, r, H));
    }

    #[test]
    fn lone_particle_density_is_floored() {
        let mut particles = vec![at(5.0, 5.0)];
        let grid = grid_for(&particles, H);
        let params = SphParams::default();
        compute_density_pressure(&mut particles, &grid, &params);
        assert_eq!(particles[0].density, params.rest_density);
        assert_eq!(particles[0].pressure, 0.0);
    }

    #[test]
    fn density_includes_self_contribution() {
        let mut particles = vec![at(5.0, 5.0), at(5.1, 5.0)];
        let grid = grid_for(&particles, H);
        let params = SphParams {
            rest_density: 1.0,
            ..SphParams::default()
        };
        compute_density_pressure(&mut particles, &grid, &params);

        let expected = density_kernel(0.0, H) + density_kernel(0.1, H);
        assert!((particles[0].density - expected).abs() < 1e-9);
        let p = params.gas_constant * (expected - params.rest_density);
        assert!((particles[0].pressure - p).abs() < 1e-6);
    }

    #[test]
    fn lone_particle_feels_only_gravity() {
        let mut particles = vec![at(5.0, 5.0)];
        let grid = grid_for(&particles, H);
        let params = SphParams::default();
        compute_density_pressure(&mut particles, &grid, &params);
        compute_forces(&mut particles, &grid, &params);
        assert_eq!(particles[0].force, params.gravity);
    }

    #[test]
    fn compressed_pair_repels() {
        let mut particles = vec![at(5.0, 5.0), at(5.2, 5.0)];
        let grid = grid_for(&particles, H);
        let params = SphParams {
            rest_density: 1.0,
            gravity: DVec2::ZERO,
            ..SphParams::default()
        };
        compute_density_pressure(&mut particles, &grid, &params);
        compute_forces(&mut particles, &grid, &params);

        assert!(particles[0].force.x < 0.0, "left particle pushed left");
        assert!(particles[1].force.x > 0.0, "right particle pushed right");
        assert_eq!(particles[0].force, -particles[1].force);
    }

    #[test]
    fn coincident_pair_is_skipped() {
        let mut particles = vec![at(5.0, 5.0), at(5.0, 5.0)];
        let grid = grid_for(&particles, H);
        let params = SphParams {
            rest_density: 1.0,
            gravity: DVec2::ZERO,
            ..SphParams::default()
        };
        compute_density_pressure(&mut particles, &grid, &params);
        compute_forces(&mut particles, &grid, &params);
        assert!(particles[0].pressure > 0.0);
        assert_eq!(particles[0].force, DVec2::ZERO);
        assert_eq!(particles[1].force, DVec2::ZERO);
    }

    #[test]
    fn viscosity_pulls_velocities_together() {
        let mut particles = vec![at(5.0, 5.0), at(5.2, 5.0)];
        particles[0].velocity = DVec2::new(0.0, 1.0);
        particles[1].velocity = DVec2::new(0.0, -1.0);
        let grid = grid_for(&particles, H);
        let params = SphParams {
            gravity: DVec2::ZERO,
            viscosity: 1.0,
            ..SphParams::default()
        };
        compute_density_pressure(&mut particles, &grid, &params);
        let (pressure, viscous) = interaction_force(0, &particles, &grid, &params);

        // floored density, no pressure; viscosity drags particle 0 downward
        assert_eq!(pressure, DVec2::ZERO);
        assert!(viscous.y < 0.0);
        let expected = 1.0 * (-2.0 / params.rest_density) * viscosity_kernel(0.2, H);
        assert!((viscous.y - expected).abs() < 1e-12);
    }
}
