//! Simulation runner with lifecycle management
//!
//! This module provides the `SimulationRunner` which drives a simulation
//! kernel in a background thread at its fixed time step, including start,
//! pause, resume, stop, status tracking and periodic snapshots.

use fluid_kernel::{SimulationKernel, SimulationStats};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

/// Runner state enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerState {
    /// Simulation created but not yet started
    Created,
    /// Simulation actively running
    Running,
    /// Simulation paused
    Paused,
    /// Simulation finished (stopping condition or explicit stop)
    Finished,
}

/// Particle state published by the runner thread
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Timestep count when the snapshot was taken
    pub step: u64,
    /// Simulated time when the snapshot was taken (seconds)
    pub sim_time: f64,
    /// Particle positions in insertion order
    pub positions: Vec<[f64; 2]>,
    /// Particle velocities in insertion order
    pub velocities: Vec<[f64; 2]>,
    /// Diagnostics at the same instant
    pub stats: SimulationStats,
}

impl Snapshot {
    fn capture(kernel: &dyn SimulationKernel, step: u64, sim_time: f64) -> Self {
        let particles = kernel.particles();
        Self {
            step,
            sim_time,
            positions: particles.iter().map(|p| p.position.to_array()).collect(),
            velocities: particles.iter().map(|p| p.velocity.to_array()).collect(),
            stats: kernel.stats(),
        }
    }
}

/// Stopping conditions and publishing cadence for a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunLimits {
    /// Optional maximum number of timesteps
    pub max_timesteps: Option<u64>,
    /// Optional maximum simulation time (seconds)
    pub max_time: Option<f64>,
    /// Publish a snapshot every this many timesteps (at least 1)
    pub snapshot_interval: u64,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_timesteps: None,
            max_time: None,
            snapshot_interval: 10,
        }
    }
}

/// Shared state between the runner thread and control interface
struct SharedState {
    /// Current runner state
    state: RunnerState,
    /// Current simulation time (seconds)
    sim_time: f64,
    /// Number of timesteps executed
    timestep_count: u64,
    /// Most recently published snapshot
    snapshot: Snapshot,
}

/// Handle for controlling and querying a running simulation
pub struct SimulationRunner {
    /// Shared state (protected by mutex)
    shared: Arc<Mutex<SharedState>>,
    /// Handle to the background thread
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Lock the shared state, recovering it if the runner thread panicked.
fn lock(shared: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    shared.lock().unwrap_or_else(|e| e.into_inner())
}

impl SimulationRunner {
    /// Create a new simulation runner with the given kernel
    ///
    /// The background thread is spawned immediately but waits in
    /// `Created` until [`SimulationRunner::start`] is called.
    ///
    /// # Arguments
    /// * `kernel` - The simulation kernel to run
    /// * `limits` - Stopping conditions and snapshot cadence
    pub fn new(mut kernel: Box<dyn SimulationKernel + Send>, limits: RunLimits) -> Self {
        let shared = Arc::new(Mutex::new(SharedState {
            state: RunnerState::Created,
            sim_time: 0.0,
            timestep_count: 0,
            snapshot: Snapshot::capture(&*kernel, 0, 0.0),
        }));

        let shared_clone = Arc::clone(&shared);

        // Spawn background thread
        let thread_handle = thread::spawn(move || {
            run_simulation_loop(kernel.as_mut(), shared_clone, limits);
        });

        Self {
            shared,
            thread_handle: Some(thread_handle),
        }
    }

    /// Get current runner state
    pub fn state(&self) -> RunnerState {
        lock(&self.shared).state.clone()
    }

    /// Get current simulation time (seconds)
    pub fn sim_time(&self) -> f64 {
        lock(&self.shared).sim_time
    }

    /// Get current timestep count
    pub fn timestep_count(&self) -> u64 {
        lock(&self.shared).timestep_count
    }

    /// Most recently published snapshot
    pub fn snapshot(&self) -> Snapshot {
        lock(&self.shared).snapshot.clone()
    }

    /// Diagnostics from the most recent snapshot
    pub fn stats(&self) -> SimulationStats {
        lock(&self.shared).snapshot.stats
    }

    /// Start the simulation (transition from Created to Running)
    pub fn start(&self) {
        let mut state = lock(&self.shared);
        if state.state == RunnerState::Created {
            state.state = RunnerState::Running;
            tracing::info!("Simulation started");
        }
    }

    /// Pause the simulation
    pub fn pause(&self) {
        let mut state = lock(&self.shared);
        if state.state == RunnerState::Running {
            state.state = RunnerState::Paused;
            tracing::info!("Simulation paused at step {}", state.timestep_count);
        }
    }

    /// Resume the simulation
    pub fn resume(&self) {
        let mut state = lock(&self.shared);
        if state.state == RunnerState::Paused {
            state.state = RunnerState::Running;
            tracing::info!("Simulation resumed at step {}", state.timestep_count);
        }
    }

    /// Stop the simulation from any state; the thread exits after the
    /// current step.
    pub fn stop(&self) {
        let mut state = lock(&self.shared);
        if state.state != RunnerState::Finished {
            state.state = RunnerState::Finished;
            tracing::info!("Simulation stopped at step {}", state.timestep_count);
        }
    }

    /// Wait for the simulation thread to complete
    ///
    /// A running simulation is joined once a stopping condition is reached.
    /// `join` consumes the handle, so nothing could start or resume the run
    /// afterwards: a runner still `Created` or `Paused` is stopped first and
    /// joins immediately with its current state published.
    pub fn join(mut self) -> Result<(), String> {
        {
            let mut state = lock(&self.shared);
            if matches!(state.state, RunnerState::Created | RunnerState::Paused) {
                tracing::info!(
                    "Joining {:?} runner: stopping at step {}",
                    state.state,
                    state.timestep_count
                );
                state.state = RunnerState::Finished;
            }
        }
        if let Some(handle) = self.thread_handle.take() {
            handle.join().map_err(|_| "Thread panicked".to_string())?;
        }
        Ok(())
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        // Set state to Finished to signal thread to exit
        let mut state = lock(&self.shared);
        if state.state != RunnerState::Finished {
            state.state = RunnerState::Finished;
        }
    }
}

/// Main simulation loop executed in background thread
fn run_simulation_loop(
    kernel: &mut dyn SimulationKernel,
    shared: Arc<Mutex<SharedState>>,
    limits: RunLimits,
) {
    // Wait for start signal
    loop {
        let state = lock(&shared).state.clone();

        match state {
            RunnerState::Created => {
                // Wait a bit and check again
                thread::sleep(Duration::from_millis(10));
            }
            RunnerState::Running | RunnerState::Paused => break,
            RunnerState::Finished => return,
        }
    }

    let start_wall_time = Instant::now();
    let snapshot_interval = limits.snapshot_interval.max(1);
    let mut sim_time = 0.0_f64;
    let mut timestep_count = 0_u64;

    loop {
        // Check state
        let current_state = lock(&shared).state.clone();

        match current_state {
            RunnerState::Running => {
                let dt = kernel.time_step();
                kernel.step();

                // Update counters
                sim_time += dt;
                timestep_count += 1;

                let stop_reason = if limits.max_timesteps.is_some_and(|max| timestep_count >= max) {
                    Some(format!("reached max_timesteps = {}", timestep_count))
                } else if limits.max_time.is_some_and(|max| sim_time >= max) {
                    Some(format!("reached max_time = {:.3}s", sim_time))
                } else {
                    None
                };

                let snapshot = if stop_reason.is_some() || timestep_count % snapshot_interval == 0 {
                    Some(Snapshot::capture(kernel, timestep_count, sim_time))
                } else {
                    None
                };

                // Update shared state
                {
                    let mut guard = lock(&shared);
                    guard.sim_time = sim_time;
                    guard.timestep_count = timestep_count;
                    if let Some(snapshot) = snapshot {
                        guard.snapshot = snapshot;
                    }
                    if let Some(reason) = &stop_reason {
                        tracing::info!("Simulation finished: {}", reason);
                        guard.state = RunnerState::Finished;
                    }
                }
                if stop_reason.is_some() {
                    break;
                }

                // Log progress periodically
                if timestep_count % 100 == 0 {
                    let wall_time = start_wall_time.elapsed().as_secs_f64();
                    tracing::debug!(
                        "Step {}: sim_time={:.4}s, dt={:.6}s, wall_time={:.2}s",
                        timestep_count,
                        sim_time,
                        dt,
                        wall_time,
                    );
                }
            }
            RunnerState::Paused => {
                // Wait while paused
                thread::sleep(Duration::from_millis(20));
            }
            RunnerState::Finished | RunnerState::Created => {
                // Publish the final state before exiting
                let snapshot = Snapshot::capture(kernel, timestep_count, sim_time);
                lock(&shared).snapshot = snapshot;
                break;
            }
        }
    }

    tracing::info!(
        "Simulation thread exiting: {} timesteps, {:.4}s simulated",
        timestep_count,
        sim_time
    );
}
