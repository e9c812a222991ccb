//! 2D SPH Fluid Simulation Kernel
//!
//! This crate provides the core of a Smoothed Particle Hydrodynamics (SPH)
//! fluid simulation in two dimensions. It owns particle state, the spatial
//! index and the fixed per-step pipeline; scenario setup, running and
//! validation live in separate crates.
//!
//! # Modules
//! - [`particle`] -- Particle state and semi-implicit Euler integration.
//! - [`neighbor`] -- Uniform-grid spatial hash for neighbor search.
//! - [`sph`] -- Poly6 / Spiky / viscosity kernels, density and force passes.
//! - [`eos`] -- Linear equation of state and the density floor.
//! - [`boundary`] -- Domain bounds and wall reflection.
//! - [`params`] -- Tunable solver parameters.

#![warn(missing_docs)]

pub mod boundary;
pub mod eos;
pub mod neighbor;
pub mod params;
pub mod particle;
pub mod sph;

pub use boundary::DomainBounds;
pub use neighbor::NeighborGrid;
pub use params::SphParams;
pub use particle::{Particle, DEFAULT_PARTICLE_MASS};
pub use sph::{density_kernel, pressure_gradient_kernel, viscosity_kernel};

use glam::DVec2;

// ---------------------------------------------------------------------------
// SimulationKernel trait
// ---------------------------------------------------------------------------

/// Aggregate diagnostics for a simulation snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationStats {
    /// Number of particles.
    pub particle_count: usize,
    /// Sum of particle masses.
    pub total_mass: f64,
    /// Total kinetic energy, sum of 0.5 m |v|^2.
    pub kinetic_energy: f64,
    /// Gravitational potential energy, sum of -m g . x.
    pub potential_energy: f64,
    /// Largest particle speed.
    pub max_speed: f64,
    /// Mean particle density.
    pub mean_density: f64,
    /// Largest relative density deviation from rest density.
    pub max_density_variation: f64,
    /// Largest particle pressure.
    pub max_pressure: f64,
    /// Lower-left corner of the particle bounding box.
    pub min_position: [f64; 2],
    /// Upper-right corner of the particle bounding box.
    pub max_position: [f64; 2],
}

impl SimulationStats {
    /// Compute diagnostics over `particles`.
    pub fn from_particles(particles: &[Particle], params: &SphParams) -> Self {
        let n = particles.len();
        let mut stats = Self {
            particle_count: n,
            total_mass: 0.0,
            kinetic_energy: 0.0,
            potential_energy: 0.0,
            max_speed: 0.0,
            mean_density: 0.0,
            max_density_variation: 0.0,
            max_pressure: 0.0,
            min_position: [0.0; 2],
            max_position: [0.0; 2],
        };
        if n == 0 {
            return stats;
        }

        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        let mut density_sum = 0.0;
        for p in particles {
            stats.total_mass += p.mass;
            stats.kinetic_energy += 0.5 * p.mass * p.velocity.length_squared();
            stats.potential_energy -= p.mass * params.gravity.dot(p.position);
            stats.max_speed = stats.max_speed.max(p.speed());
            density_sum += p.density;
            let variation = (p.density - params.rest_density).abs() / params.rest_density;
            stats.max_density_variation = stats.max_density_variation.max(variation);
            stats.max_pressure = stats.max_pressure.max(p.pressure);
            min = min.min(p.position);
            max = max.max(p.position);
        }
        stats.mean_density = density_sum / n as f64;
        stats.min_position = min.to_array();
        stats.max_position = max.to_array();
        stats
    }

    /// Total mechanical energy (kinetic + potential).
    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy + self.potential_energy
    }
}

/// Trait implemented by simulation back-ends.
///
/// A `SimulationKernel` owns particle data and advances it by one fixed time
/// step per call:
///
/// 1. Neighbor grid rebuild
/// 2. Density and pressure
/// 3. Force computation (pressure + viscous + gravity)
/// 4. Time integration (semi-implicit Euler)
/// 5. Boundary reflection
pub trait SimulationKernel {
    /// Execute one simulation step of the configured time step.
    fn step(&mut self);

    /// Read back current particle state.
    fn particles(&self) -> &[Particle];

    /// Current diagnostics.
    fn stats(&self) -> SimulationStats;

    /// Number of particles in the simulation.
    fn particle_count(&self) -> usize {
        self.particles().len()
    }

    /// Time step used by the next `step()` call (s).
    fn time_step(&self) -> f64;
}

// ---------------------------------------------------------------------------
// FluidSimulator -- CPU implementation of SimulationKernel
// ---------------------------------------------------------------------------

/// Single-threaded SPH simulator.
///
/// Owns the particle arena and the neighbor grid exclusively. Parameters in
/// [`FluidSimulator::params`] may be changed between steps.
#[derive(Debug, Clone)]
pub struct FluidSimulator {
    /// Solver parameters.
    pub params: SphParams,
    /// Domain rectangle.
    bounds: DomainBounds,
    /// Particle arena; slot index is the particle's identity.
    particles: Vec<Particle>,
    /// Spatial index, rebuilt every step.
    grid: NeighborGrid,
    /// Number of completed steps.
    step_count: u64,
    /// Simulated time accumulated over completed steps (s).
    elapsed: f64,
}

impl FluidSimulator {
    /// Create an empty simulator over `[0, width] x [0, height]` with
    /// default parameters.
    pub fn new(width: f64, height: f64) -> Result<Self, String> {
        Self::with_params(width, height, SphParams::default())
    }

    /// Create an empty simulator with explicit parameters.
    pub fn with_params(width: f64, height: f64, params: SphParams) -> Result<Self, String> {
        let bounds = DomainBounds::new(width, height)?;
        params.validate()?;
        tracing::info!(
            "SPH simulator created: domain {}x{}, h={}, dt={}",
            width,
            height,
            params.smoothing_radius,
            params.dt
        );
        Ok(Self {
            grid: NeighborGrid::new(params.smoothing_radius),
            params,
            bounds,
            particles: Vec::new(),
            step_count: 0,
            elapsed: 0.0,
        })
    }

    /// Append a particle and return its slot index.
    ///
    /// Mass must be finite and strictly positive and position and velocity
    /// must be finite. Containment in the domain is not checked.
    pub fn add_particle(&mut self, position: DVec2, velocity: DVec2, mass: f64) -> Result<usize, String> {
        if !(mass.is_finite() && mass > 0.0) {
            tracing::warn!("rejected particle with mass {}", mass);
            return Err(format!("particle mass must be finite and positive, got {mass}"));
        }
        if !position.is_finite() || !velocity.is_finite() {
            tracing::warn!("rejected particle at {} with velocity {}", position, velocity);
            return Err(format!(
                "particle position and velocity must be finite, got {position} / {velocity}"
            ));
        }
        self.particles.push(Particle::new(position, velocity, mass));
        Ok(self.particles.len() - 1)
    }

    /// Append a particle at rest with the default mass.
    pub fn add_particle_at_rest(&mut self, position: DVec2) -> Result<usize, String> {
        self.add_particle(position, DVec2::ZERO, DEFAULT_PARTICLE_MASS)
    }

    /// Advance the simulation by one time step.
    ///
    /// # Panics
    /// If `params.smoothing_radius` has been set to a non-finite or
    /// non-positive value since construction.
    pub fn step(&mut self) {
        let h = self.params.smoothing_radius;

        // --- 1. Rebuild neighbor grid at the current smoothing radius ---
        if self.grid.cell_size() != h {
            tracing::debug!("resizing neighbor grid cells {} -> {}", self.grid.cell_size(), h);
            self.grid.set_cell_size(h);
        }
        self.grid.rebuild(&self.particles);

        // --- 2. Density and pressure ---
        sph::compute_density_pressure(&mut self.particles, &self.grid, &self.params);

        // --- 3. Pressure, viscous and gravity forces ---
        sph::compute_forces(&mut self.particles, &self.grid, &self.params);

        // --- 4. Semi-implicit Euler ---
        let dt = self.params.dt;
        for p in &mut self.particles {
            p.update(dt);
        }

        // --- 5. Wall reflection ---
        boundary::enforce_domain(&mut self.particles, &self.bounds);

        self.step_count += 1;
        self.elapsed += dt;
    }

    /// Positions in insertion order.
    pub fn positions(&self) -> Vec<[f64; 2]> {
        self.particles.iter().map(|p| p.position.to_array()).collect()
    }

    /// Velocities in insertion order.
    pub fn velocities(&self) -> Vec<[f64; 2]> {
        self.particles.iter().map(|p| p.velocity.to_array()).collect()
    }

    /// All particles in insertion order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Particle in slot `index`, if any.
    pub fn particle(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Return `true` if no particle has been added.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Domain rectangle.
    pub fn bounds(&self) -> DomainBounds {
        self.bounds
    }

    /// Neighbor grid as left by the last step.
    pub fn grid(&self) -> &NeighborGrid {
        &self.grid
    }

    /// Number of completed steps.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Simulated time over completed steps (s).
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed
    }
}

impl Default for FluidSimulator {
    fn default() -> Self {
        let params = SphParams::default();
        Self {
            grid: NeighborGrid::new(params.smoothing_radius),
            params,
            bounds: DomainBounds::default(),
            particles: Vec::new(),
            step_count: 0,
            elapsed: 0.0,
        }
    }
}

impl SimulationKernel for FluidSimulator {
    fn step(&mut self) {
        FluidSimulator::step(self);
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn stats(&self) -> SimulationStats {
        SimulationStats::from_particles(&self.particles, &self.params)
    }

    fn time_step(&self) -> f64 {
        self.params.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_domain_is_ten_by_ten() {
        let sim = FluidSimulator::default();
        assert_eq!(sim.bounds(), DomainBounds::new(10.0, 10.0).unwrap());
        assert!(sim.is_empty());
        assert_eq!(sim.params, SphParams::default());
    }

    #[test]
    fn constructor_rejects_bad_domain() {
        assert!(FluidSimulator::new(0.0, 10.0).is_err());
        assert!(FluidSimulator::new(10.0, f64::NAN).is_err());
    }

    #[test]
    fn add_particle_returns_slot_index() {
        let mut sim = FluidSimulator::default();
        assert_eq!(sim.add_particle(DVec2::new(1.0, 1.0), DVec2::ZERO, 1.0), Ok(0));
        assert_eq!(sim.add_particle_at_rest(DVec2::new(2.0, 1.0)), Ok(1));
        assert_eq!(sim.len(), 2);
        assert_eq!(sim.particle(1).map(|p| p.mass), Some(DEFAULT_PARTICLE_MASS));
        assert!(sim.particle(2).is_none());
    }

    #[test]
    fn add_particle_rejects_bad_mass() {
        let mut sim = FluidSimulator::default();
        assert!(sim.add_particle(DVec2::ONE, DVec2::ZERO, 0.0).is_err());
        assert!(sim.add_particle(DVec2::ONE, DVec2::ZERO, -1.0).is_err());
        assert!(sim.add_particle(DVec2::ONE, DVec2::ZERO, f64::NAN).is_err());
        assert!(sim.is_empty());
    }

    #[test]
    fn add_particle_accepts_positions_outside_domain() {
        let mut sim = FluidSimulator::default();
        assert!(sim.add_particle(DVec2::new(-5.0, 20.0), DVec2::ZERO, 1.0).is_ok());
        assert_eq!(sim.positions(), vec![[-5.0, 20.0]]);
    }

    #[test]
    fn step_on_empty_simulator() {
        let mut sim = FluidSimulator::default();
        sim.step();
        assert_eq!(sim.step_count(), 1);
        assert!((sim.elapsed_time() - 0.001).abs() < 1e-15);
    }

    #[test]
    fn force_is_zero_after_step() {
        let mut sim = FluidSimulator::default();
        for i in 0..4 {
            sim.add_particle_at_rest(DVec2::new(5.0 + 0.1 * i as f64, 5.0)).unwrap();
        }
        sim.step();
        assert!(sim.particles().iter().all(|p| p.force == DVec2::ZERO));
    }

    #[test]
    fn smoothing_radius_change_applies_on_next_step() {
        let mut sim = FluidSimulator::default();
        sim.add_particle_at_rest(DVec2::new(5.0, 5.0)).unwrap();
        sim.params.smoothing_radius = 0.8;
        assert_eq!(sim.grid().cell_size(), 0.5);
        sim.step();
        assert_eq!(sim.grid().cell_size(), 0.8);
        assert_eq!(sim.grid().len(), 1);
    }

    #[test]
    fn snapshots_follow_insertion_order() {
        let mut sim = FluidSimulator::default();
        sim.add_particle(DVec2::new(1.0, 2.0), DVec2::new(0.1, 0.2), 1.0).unwrap();
        sim.add_particle(DVec2::new(3.0, 4.0), DVec2::new(0.3, 0.4), 1.0).unwrap();
        assert_eq!(sim.positions(), vec![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(sim.velocities(), vec![[0.1, 0.2], [0.3, 0.4]]);
    }

    #[test]
    fn stats_over_particles() {
        let mut sim = FluidSimulator::default();
        sim.add_particle(DVec2::new(1.0, 2.0), DVec2::new(3.0, 4.0), 2.0).unwrap();
        sim.add_particle(DVec2::new(4.0, 1.0), DVec2::ZERO, 1.0).unwrap();
        let stats = SimulationKernel::stats(&sim);
        assert_eq!(stats.particle_count, 2);
        assert_eq!(stats.total_mass, 3.0);
        assert!((stats.kinetic_energy - 25.0).abs() < 1e-12);
        assert!((stats.potential_energy - 9.81 * (2.0 * 2.0 + 1.0)).abs() < 1e-9);
        assert_eq!(stats.max_speed, 5.0);
        assert_eq!(stats.min_position, [1.0, 1.0]);
        assert_eq!(stats.max_position, [4.0, 2.0]);
    }

    #[test]
    fn simulator_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<FluidSimulator>();
    }
}
