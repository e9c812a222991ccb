//! Reference test framework for SPH fluid simulation validation
//!
//! This crate runs complete scenarios from a `SimulationConfig` for a fixed
//! number of steps and validates the final state against expected
//! behavior: containment, the density floor, bounded spreading, finite
//! state and, for isolated particles, the ballistic closed form.

#![warn(missing_docs)]


pub mod analytical;

use fluid_kernel::{FluidSimulator, Particle, SimulationKernel, SimulationStats};
use fluid_orchestrator::{build_simulator, SimulationConfig};
use glam::DVec2;

/// Expected result criteria for a reference test
#[derive(Debug, Clone, Default)]
pub struct ExpectedResult {
    /// Particle position bounds validation
    pub position_bounds: Option<PositionBoundsCheck>,
    /// Density floored at rest density and pressure non-negative
    pub density_floor: bool,
    /// Bounded change of the particle cloud extent
    pub spread: Option<SpreadCheck>,
    /// No NaN or infinite position/velocity
    pub finite_state: bool,
    /// Isolated particles follow the discrete free-fall solution
    pub free_fall: Option<FreeFallCheck>,
}

/// Check that particles remain within specified bounds
#[derive(Debug, Clone)]
pub struct PositionBoundsCheck {
    /// Minimum allowed position [x, y]
    pub min: [f64; 2],
    /// Maximum allowed position [x, y]
    pub max: [f64; 2],
}

/// Check the maximum pairwise distance relative to its initial value
#[derive(Debug, Clone)]
pub struct SpreadCheck {
    /// Smallest allowed final/initial ratio
    pub min_ratio: f64,
    /// Largest allowed final/initial ratio
    pub max_ratio: f64,
}

/// Check every particle against the semi-implicit Euler free-fall solution
#[derive(Debug, Clone)]
pub struct FreeFallCheck {
    /// Maximum allowed position error (m)
    pub tolerance: f64,
}

/// Result of running a reference test
#[derive(Debug)]
pub struct TestResult {
    /// Test name
    pub name: String,
    /// Whether test passed
    pub passed: bool,
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Final diagnostics
    pub stats: SimulationStats,
    /// Number of timesteps executed
    pub timesteps: u64,
    /// Simulated time (seconds)
    pub sim_time: f64,
}

/// Result of an individual validation check
#[derive(Debug)]
pub struct CheckResult {
    /// Check name
    pub name: String,
    /// Whether check passed
    pub passed: bool,
    /// Detail message
    pub message: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message,
        }
    }

    fn fail(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: Some(message),
        }
    }
}

/// A reference test case
#[derive(Debug, Clone)]
pub struct ReferenceTest {
    /// Test name
    pub name: String,
    /// Scenario configuration
    pub config: SimulationConfig,
    /// Number of timesteps to run
    pub timesteps: u64,
    /// Expected results to validate
    pub expected: ExpectedResult,
}

impl ReferenceTest {
    /// Build a test from a JSON configuration file
    pub fn from_file(
        name: &str,
        config_path: &str,
        timesteps: u64,
        expected: ExpectedResult,
    ) -> Result<Self, String> {
        Ok(Self {
            name: name.to_string(),
            config: SimulationConfig::load(config_path)?,
            timesteps,
            expected,
        })
    }

    /// Run the reference test and return results
    pub fn run(&self) -> Result<TestResult, String> {
        tracing::info!("Running reference test: {}", self.name);

        let mut sim = build_simulator(&self.config)?;
        let initial: Vec<Particle> = sim.particles().to_vec();

        tracing::info!(
            "Initialized: {} particles, h={}",
            sim.len(),
            sim.params.smoothing_radius
        );

        tracing::info!("Running {} timesteps...", self.timesteps);
        for step in 0..self.timesteps {
            sim.step();

            // Log progress every 10% of steps
            if (step + 1) % (self.timesteps / 10).max(1) == 0 {
                let progress = ((step + 1) as f64 / self.timesteps as f64) * 100.0;
                tracing::info!("Progress: {:.0}% ({}/{})", progress, step + 1, self.timesteps);
            }
        }
        tracing::info!(
            "Simulation complete: {} steps, {:.6}s simulated",
            sim.step_count(),
            sim.elapsed_time()
        );

        // Validate results
        let mut checks = Vec::new();

        if let Some(ref bounds) = self.expected.position_bounds {
            checks.push(validate_position_bounds(sim.particles(), bounds));
        }

        if self.expected.density_floor {
            checks.push(validate_density_floor(&sim));
        }

        if let Some(ref spread) = self.expected.spread {
            checks.push(validate_spread(&initial, sim.particles(), spread));
        }

        if self.expected.finite_state {
            checks.push(validate_finite_state(sim.particles()));
        }

        if let Some(ref free_fall) = self.expected.free_fall {
            checks.push(validate_free_fall(&initial, &sim, free_fall));
        }

        Ok(TestResult {
            name: self.name.clone(),
            passed: checks.iter().all(|c| c.passed),
            checks,
            stats: sim.stats(),
            timesteps: sim.step_count(),
            sim_time: sim.elapsed_time(),
        })
    }
}

/// Largest distance between any two particles
pub fn max_pairwise_distance(particles: &[Particle]) -> f64 {
    let mut max = 0.0_f64;
    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            max = max.max(a.position.distance(b.position));
        }
    }
    max
}

/// Validate that particles remain within specified bounds
fn validate_position_bounds(particles: &[Particle], bounds: &PositionBoundsCheck) -> CheckResult {
    let mut violations = 0;
    let mut max_violation = 0.0_f64;

    for p in particles {
        for axis in 0..2 {
            let x = p.position[axis];
            if x < bounds.min[axis] {
                violations += 1;
                max_violation = max_violation.max(bounds.min[axis] - x);
            }
            if x > bounds.max[axis] {
                violations += 1;
                max_violation = max_violation.max(x - bounds.max[axis]);
            }
        }
    }

    if violations == 0 {
        CheckResult::pass("Position Bounds", None)
    } else {
        CheckResult::fail(
            "Position Bounds",
            format!(
                "{} particles out of bounds (max violation: {:.6} m)",
                violations, max_violation
            ),
        )
    }
}

/// Validate the density floor and non-negative pressure
fn validate_density_floor(sim: &FluidSimulator) -> CheckResult {
    let rest = sim.params.rest_density;
    let below = sim
        .particles()
        .iter()
        .filter(|p| p.density < rest || p.pressure < 0.0)
        .count();

    if below == 0 {
        let stats = sim.stats();
        CheckResult::pass(
            "Density Floor",
            Some(format!(
                "Mean density: {:.2}, max pressure: {:.1}",
                stats.mean_density, stats.max_pressure
            )),
        )
    } else {
        CheckResult::fail(
            "Density Floor",
            format!("{} particles below rest density {:.1} or with negative pressure", below, rest),
        )
    }
}

/// Validate the change of the particle cloud extent
fn validate_spread(initial: &[Particle], particles: &[Particle], check: &SpreadCheck) -> CheckResult {
    let before = max_pairwise_distance(initial);
    if before == 0.0 {
        return CheckResult::fail("Spread", "Initial spread is zero".to_string());
    }
    let after = max_pairwise_distance(particles);
    let ratio = after / before;
    let message = format!(
        "Initial: {:.3} m, final: {:.3} m, ratio {:.3} (allowed [{:.2}, {:.2}])",
        before, after, ratio, check.min_ratio, check.max_ratio
    );

    if (check.min_ratio..=check.max_ratio).contains(&ratio) {
        CheckResult::pass("Spread", Some(message))
    } else {
        CheckResult::fail("Spread", message)
    }
}

/// Validate that no position or velocity is NaN or infinite
fn validate_finite_state(particles: &[Particle]) -> CheckResult {
    let bad = particles
        .iter()
        .filter(|p| !p.position.is_finite() || !p.velocity.is_finite())
        .count();

    if bad == 0 {
        CheckResult::pass("Finite State", None)
    } else {
        CheckResult::fail("Finite State", format!("{} particles with non-finite state", bad))
    }
}

/// Validate every particle against the discrete free-fall closed form
fn validate_free_fall(initial: &[Particle], sim: &FluidSimulator, check: &FreeFallCheck) -> CheckResult {
    let gravity: DVec2 = sim.params.gravity;
    let mut max_error = 0.0_f64;

    for (p0, p) in initial.iter().zip(sim.particles()) {
        let (expected, _) = analytical::semi_implicit_free_fall(
            p0.position,
            p0.velocity,
            gravity,
            sim.params.dt,
            sim.step_count(),
        );
        max_error = max_error.max((p.position - expected).length());
    }

    let message = format!(
        "Max position error: {:.3e} m (tolerance: {:.1e} m)",
        max_error, check.tolerance
    );
    if max_error <= check.tolerance {
        CheckResult::pass("Free Fall", Some(message))
    } else {
        CheckResult::fail("Free Fall", message)
    }
}

impl TestResult {
    /// Print a summary of the test result
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(80));
        println!("Test: {}", self.name);
        println!("{}", "=".repeat(80));
        println!("Status: {}", if self.passed { "PASSED" } else { "FAILED" });
        println!("Particles: {}", self.stats.particle_count);
        println!("Timesteps: {}", self.timesteps);
        println!("Simulated time: {:.6} s", self.sim_time);
        println!("\nDiagnostics:");
        println!("  Max speed: {:.4} m/s", self.stats.max_speed);
        println!("  Kinetic energy: {:.4} J", self.stats.kinetic_energy);
        println!("  Max density variation: {:.2}%", self.stats.max_density_variation * 100.0);
        println!(
            "  Bounding box: [{:.3}, {:.3}] - [{:.3}, {:.3}]",
            self.stats.min_position[0],
            self.stats.min_position[1],
            self.stats.max_position[0],
            self.stats.max_position[1]
        );
        println!("\nValidation Checks:");
        for check in &self.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            print!("  [{}] {}", status, check.name);
            if let Some(ref msg) = check.message {
                print!(" - {}", msg);
            }
            println!();
        }
        println!("{}", "=".repeat(80));
    }
}
