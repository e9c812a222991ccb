//! Orchestration Layer
//!
//! This crate provides orchestration for the SPH simulation, including:
//! - JSON configuration loading and validation
//! - Scenario layouts (dam break, drop, ring)
//! - Simulation runner with lifecycle management and snapshots

#![warn(missing_docs)]

pub mod config;
pub mod domain;
pub mod runner;

pub use config::{ScenarioConfig, SimulationConfig};
pub use runner::{RunLimits, RunnerState, SimulationRunner, Snapshot};

use fluid_kernel::FluidSimulator;

/// Build a populated simulator from a validated configuration
///
/// Creates the domain with the configured SPH parameters and adds the
/// scenario's particles.
pub fn build_simulator(config: &SimulationConfig) -> Result<FluidSimulator, String> {
    config.validate()?;

    let mut sim = FluidSimulator::with_params(
        config.domain.width,
        config.domain.height,
        config.sph.clone(),
    )?;
    domain::populate(&mut sim, config)?;
    Ok(sim)
}

/// Run limits taken from a configuration
pub fn run_limits(config: &SimulationConfig) -> RunLimits {
    RunLimits {
        max_timesteps: config.max_timesteps,
        max_time: config.max_time,
        snapshot_interval: config.snapshot_interval,
    }
}

/// Create a complete simulation from a configuration file
///
/// This function performs the full simulation setup pipeline:
/// 1. Load and validate the configuration
/// 2. Create the simulator and place the scenario's particles
/// 3. Wrap it in a SimulationRunner for lifecycle management
///
/// # Arguments
/// * `config_path` - Path to the JSON configuration file
///
/// # Returns
/// A `SimulationRunner` ready to be started, or an error if setup fails
///
/// # Example
/// ```no_run
/// use fluid_orchestrator::create_simulation;
///
/// let runner = create_simulation("configs/dam_break.json")?;
/// runner.start();
/// // ... query status, pause, resume, etc.
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn create_simulation(config_path: &str) -> Result<SimulationRunner, Box<dyn std::error::Error>> {
    tracing::info!("Creating simulation from config: {}", config_path);

    // 1. Load and validate configuration
    let config = SimulationConfig::load(config_path)?;
    tracing::info!("Configuration loaded: {}", config.name);

    // 2. Create simulator and place particles
    let sim = build_simulator(&config)?;
    tracing::info!(
        "Simulator ready: {} particles, {} scenario",
        sim.len(),
        config.scenario.label()
    );

    // 3. Wrap in SimulationRunner
    let runner = SimulationRunner::new(Box::new(sim), run_limits(&config));

    tracing::info!("Simulation ready to start");
    Ok(runner)
}
