//! Configuration parsing and validation for SPH simulations

use fluid_kernel::{DomainBounds, SphParams};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fs;

/// Main simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Human-readable simulation name
    pub name: String,
    /// Simulation rectangle `[0, width] x [0, height]`
    #[serde(default)]
    pub domain: DomainBounds,
    /// Solver parameters; omitted fields take their defaults
    #[serde(default)]
    pub sph: SphParams,
    /// Initial particle layout
    pub scenario: ScenarioConfig,
    /// Mass of every generated particle (kg)
    #[serde(default = "default_particle_mass")]
    pub particle_mass: f64,
    /// Standard deviation of random initial velocity on lattice scenarios (m/s)
    #[serde(default = "default_jitter")]
    pub jitter: f64,
    /// Seed for the jitter generator
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Stop after this many timesteps
    pub max_timesteps: Option<u64>,
    /// Stop after this much simulated time (seconds)
    pub max_time: Option<f64>,
    /// Publish a snapshot every this many timesteps
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: u64,
}

/// Initial particle layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScenarioConfig {
    /// Rectangular block of fluid released from rest
    DamBreak {
        /// Lattice spacing (m)
        #[serde(default = "default_spacing")]
        spacing: f64,
        /// Left edge of the block (inclusive)
        #[serde(default = "default_dam_x_min")]
        x_min: f64,
        /// Right edge of the block (exclusive)
        #[serde(default = "default_dam_x_max")]
        x_max: f64,
        /// Bottom edge of the block (inclusive)
        #[serde(default = "default_dam_y_min")]
        y_min: f64,
        /// Top edge of the block (exclusive)
        #[serde(default = "default_dam_y_max")]
        y_max: f64,
    },
    /// Circular drop of fluid
    Drop {
        /// Drop center [x, y]
        #[serde(default = "default_drop_center")]
        center: DVec2,
        /// Drop radius (m)
        #[serde(default = "default_drop_radius")]
        radius: f64,
        /// Lattice spacing (m)
        #[serde(default = "default_spacing")]
        spacing: f64,
    },
    /// Particles on a circle moving toward its center
    Ring {
        /// Ring center [x, y]
        #[serde(default = "default_ring_center")]
        center: DVec2,
        /// Ring radius (m)
        #[serde(default = "default_ring_radius")]
        radius: f64,
        /// Number of particles
        #[serde(default = "default_ring_count")]
        count: usize,
        /// Initial speed toward the center (m/s)
        #[serde(default = "default_inward_speed")]
        inward_speed: f64,
    },
}

// Default values
fn default_particle_mass() -> f64 {
    1.0
}

fn default_jitter() -> f64 {
    0.1
}

fn default_seed() -> u64 {
    42
}

fn default_snapshot_interval() -> u64 {
    10
}

fn default_spacing() -> f64 {
    0.2
}

fn default_dam_x_min() -> f64 {
    0.5
}

fn default_dam_x_max() -> f64 {
    3.0
}

fn default_dam_y_min() -> f64 {
    0.5
}

fn default_dam_y_max() -> f64 {
    7.0
}

fn default_drop_center() -> DVec2 {
    DVec2::new(5.0, 7.0)
}

fn default_drop_radius() -> f64 {
    1.5
}

fn default_ring_center() -> DVec2 {
    DVec2::new(5.0, 5.0)
}

fn default_ring_radius() -> f64 {
    2.0
}

fn default_ring_count() -> usize {
    20
}

fn default_inward_speed() -> f64 {
    0.5
}

impl ScenarioConfig {
    /// Dam break block with default extents.
    pub fn dam_break() -> Self {
        Self::DamBreak {
            spacing: default_spacing(),
            x_min: default_dam_x_min(),
            x_max: default_dam_x_max(),
            y_min: default_dam_y_min(),
            y_max: default_dam_y_max(),
        }
    }

    /// Drop with default center and radius.
    pub fn water_drop() -> Self {
        Self::Drop {
            center: default_drop_center(),
            radius: default_drop_radius(),
            spacing: default_spacing(),
        }
    }

    /// Ring with default center, radius and count.
    pub fn ring() -> Self {
        Self::Ring {
            center: default_ring_center(),
            radius: default_ring_radius(),
            count: default_ring_count(),
            inward_speed: default_inward_speed(),
        }
    }

    /// Short name used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::DamBreak { .. } => "dam_break",
            Self::Drop { .. } => "drop",
            Self::Ring { .. } => "ring",
        }
    }

    /// Validate scenario parameters
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::DamBreak {
                spacing,
                x_min,
                x_max,
                y_min,
                y_max,
            } => {
                check_spacing(*spacing)?;
                if !(x_min.is_finite() && x_max.is_finite() && x_min < x_max) {
                    return Err("Dam break x_min must be less than x_max".to_string());
                }
                if !(y_min.is_finite() && y_max.is_finite() && y_min < y_max) {
                    return Err("Dam break y_min must be less than y_max".to_string());
                }
            }
            Self::Drop {
                center,
                radius,
                spacing,
            } => {
                check_spacing(*spacing)?;
                if !center.is_finite() {
                    return Err("Drop center must be finite".to_string());
                }
                if !(radius.is_finite() && *radius > 0.0) {
                    return Err("Drop radius must be positive".to_string());
                }
            }
            Self::Ring {
                center,
                radius,
                count,
                inward_speed,
            } => {
                if !center.is_finite() {
                    return Err("Ring center must be finite".to_string());
                }
                if !(radius.is_finite() && *radius > 0.0) {
                    return Err("Ring radius must be positive".to_string());
                }
                if *count == 0 {
                    return Err("Ring count must be at least 1".to_string());
                }
                if !inward_speed.is_finite() {
                    return Err("Ring inward_speed must be finite".to_string());
                }
            }
        }
        Ok(())
    }
}

fn check_spacing(spacing: f64) -> Result<(), String> {
    if !(spacing.is_finite() && spacing > 0.0) {
        return Err("Particle spacing must be positive".to_string());
    }
    Ok(())
}

impl SimulationConfig {
    /// Configuration with default domain and parameters for `scenario`
    pub fn new(name: impl Into<String>, scenario: ScenarioConfig) -> Self {
        Self {
            name: name.into(),
            domain: DomainBounds::default(),
            sph: SphParams::default(),
            scenario,
            particle_mass: default_particle_mass(),
            jitter: default_jitter(),
            seed: default_seed(),
            max_timesteps: None,
            max_time: None,
            snapshot_interval: default_snapshot_interval(),
        }
    }

    /// Load configuration from a JSON file
    pub fn load(path: &str) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path, e))?;

        Self::from_json(&contents)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let config: SimulationConfig = serde_json::from_str(contents)
            .map_err(|e| format!("Failed to parse config JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.domain.validate()?;
        self.sph.validate()?;
        self.scenario.validate()?;

        if !(self.particle_mass.is_finite() && self.particle_mass > 0.0) {
            return Err("Particle mass must be positive".to_string());
        }

        if !(self.jitter.is_finite() && self.jitter >= 0.0) {
            return Err("Jitter must be non-negative".to_string());
        }

        if self.snapshot_interval == 0 {
            return Err("snapshot_interval must be at least 1".to_string());
        }

        // Check max_timesteps
        if let Some(max_timesteps) = self.max_timesteps {
            if max_timesteps == 0 {
                return Err("max_timesteps must be at least 1".to_string());
            }
        }

        // Check max_time
        if let Some(max_time) = self.max_time {
            if !(max_time.is_finite() && max_time > 0.0) {
                return Err("max_time must be positive".to_string());
            }
        }

        Ok(())
    }
}
