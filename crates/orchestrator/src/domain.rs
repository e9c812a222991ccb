//! Domain setup: initial particle placement for each scenario

use fluid_kernel::FluidSimulator;
use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::config::{ScenarioConfig, SimulationConfig};

/// Initial state of one generated particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialParticle {
    /// Position (m)
    pub position: DVec2,
    /// Velocity (m/s)
    pub velocity: DVec2,
}

/// Evenly spaced values `start + k * step` for `k` in `0..ceil((end - start) / step)`.
///
/// `end` is exclusive. Yields nothing when `end <= start`.
pub fn arange(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = ((end - start) / step).ceil().max(0.0) as usize;
    (0..count).map(move |k| start + k as f64 * step)
}

/// Generate the particle layout for a scenario
///
/// Lattice scenarios (dam break, drop) get a random initial velocity with
/// each component drawn from a normal distribution of standard deviation
/// `jitter`. The ring is deterministic.
pub fn scenario_layout(scenario: &ScenarioConfig, jitter: f64, seed: u64) -> Vec<InitialParticle> {
    let mut rng = StdRng::seed_from_u64(seed);

    match *scenario {
        ScenarioConfig::DamBreak {
            spacing,
            x_min,
            x_max,
            y_min,
            y_max,
        } => {
            let mut particles = Vec::new();
            for x in arange(x_min, x_max, spacing) {
                for y in arange(y_min, y_max, spacing) {
                    particles.push(InitialParticle {
                        position: DVec2::new(x, y),
                        velocity: random_velocity(&mut rng, jitter),
                    });
                }
            }
            particles
        }
        ScenarioConfig::Drop {
            center,
            radius,
            spacing,
        } => {
            let mut particles = Vec::new();
            for x in arange(center.x - radius, center.x + radius, spacing) {
                for y in arange(center.y - radius, center.y + radius, spacing) {
                    let position = DVec2::new(x, y);
                    if (position - center).length() < radius {
                        particles.push(InitialParticle {
                            position,
                            velocity: random_velocity(&mut rng, jitter),
                        });
                    }
                }
            }
            particles
        }
        ScenarioConfig::Ring {
            center,
            radius,
            count,
            inward_speed,
        } => (0..count)
            .map(|i| {
                let angle = std::f64::consts::TAU * i as f64 / count as f64;
                let direction = DVec2::new(angle.cos(), angle.sin());
                InitialParticle {
                    position: center + radius * direction,
                    velocity: -inward_speed * direction,
                }
            })
            .collect(),
    }
}

fn random_velocity(rng: &mut StdRng, jitter: f64) -> DVec2 {
    if jitter == 0.0 {
        return DVec2::ZERO;
    }
    let vx: f64 = rng.sample(StandardNormal);
    let vy: f64 = rng.sample(StandardNormal);
    jitter * DVec2::new(vx, vy)
}

/// Add the configured scenario to `sim`
///
/// Returns the number of particles added. Particles generated outside the
/// domain are kept; the first step clamps them onto the walls.
pub fn populate(sim: &mut FluidSimulator, config: &SimulationConfig) -> Result<usize, String> {
    let layout = scenario_layout(&config.scenario, config.jitter, config.seed);

    let bounds = sim.bounds();
    let outside = layout
        .iter()
        .filter(|p| !bounds.contains(p.position.to_array()))
        .count();
    if outside > 0 {
        tracing::warn!(
            "{} of {} {} particles start outside the {}x{} domain",
            outside,
            layout.len(),
            config.scenario.label(),
            bounds.width,
            bounds.height
        );
    }

    for p in &layout {
        sim.add_particle(p.position, p.velocity, config.particle_mass)?;
    }

    tracing::info!(
        "Domain setup complete: {} {} particles",
        layout.len(),
        config.scenario.label()
    );
    Ok(layout.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arange_excludes_end() {
        let xs: Vec<f64> = arange(0.0, 1.0, 0.25).collect();
        assert_eq!(xs, vec![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(arange(1.0, 1.0, 0.1).count(), 0);
        assert_eq!(arange(2.0, 1.0, 0.1).count(), 0);
    }

    #[test]
    fn test_arange_partial_last_step() {
        // 2.5 / 0.2 = 12.5 -> 13 values, last one below the end
        let xs: Vec<f64> = arange(0.5, 3.0, 0.2).collect();
        assert_eq!(xs.len(), 13);
        assert!(*xs.last().unwrap() < 3.0);
    }

    #[test]
    fn test_dam_break_layout() {
        let layout = scenario_layout(&ScenarioConfig::dam_break(), 0.1, 42);
        assert_eq!(layout.len(), 13 * 33);
        assert_eq!(layout[0].position, DVec2::new(0.5, 0.5));
        assert_eq!(layout[1].position.x, 0.5);

        for p in &layout {
            assert!(p.position.x >= 0.5 && p.position.x < 3.0);
            assert!(p.position.y >= 0.5 && p.position.y < 7.0);
        }
        assert!(layout.iter().any(|p| p.velocity != DVec2::ZERO));
    }

    #[test]
    fn test_jitter_is_normal_with_jitter_as_std_dev() {
        let layout = scenario_layout(&ScenarioConfig::dam_break(), 0.1, 42);
        let samples: Vec<f64> = layout
            .iter()
            .flat_map(|p| [p.velocity.x, p.velocity.y])
            .collect();
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let std_dev = (samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

        assert_eq!(samples.len(), 2 * 429);
        assert!(mean.abs() < 0.02, "mean={mean}");
        assert!((std_dev - 0.1).abs() < 0.015, "std_dev={std_dev}");
        // unbounded tails: some components exceed one standard deviation
        let beyond = samples.iter().filter(|v| v.abs() > 0.1).count() as f64 / n;
        assert!(beyond > 0.2 && beyond < 0.45, "fraction beyond 1 sigma={beyond}");
    }

    #[test]
    fn test_drop_layout_inside_circle() {
        let layout = scenario_layout(&ScenarioConfig::water_drop(), 0.1, 42);
        assert_eq!(layout.len(), 172);
        let center = DVec2::new(5.0, 7.0);
        assert!(layout.iter().all(|p| (p.position - center).length() < 1.5));
    }

    #[test]
    fn test_ring_layout() {
        let layout = scenario_layout(&ScenarioConfig::ring(), 0.1, 42);
        assert_eq!(layout.len(), 20);
        let center = DVec2::new(5.0, 5.0);
        for p in &layout {
            assert!(((p.position - center).length() - 2.0).abs() < 1e-12);
            assert!((p.velocity.length() - 0.5).abs() < 1e-12);
            // velocity points at the center
            assert!(p.velocity.dot(center - p.position) > 0.0);
        }
        assert!((layout[0].position - DVec2::new(7.0, 5.0)).length() < 1e-12);
    }

    #[test]
    fn test_layout_is_reproducible() {
        let a = scenario_layout(&ScenarioConfig::dam_break(), 0.1, 7);
        let b = scenario_layout(&ScenarioConfig::dam_break(), 0.1, 7);
        let c = scenario_layout(&ScenarioConfig::dam_break(), 0.1, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_zero_jitter_starts_at_rest() {
        let layout = scenario_layout(&ScenarioConfig::water_drop(), 0.0, 42);
        assert!(layout.iter().all(|p| p.velocity == DVec2::ZERO));
    }

    #[test]
    fn test_populate_adds_particles() {
        let mut config = SimulationConfig::new("drop", ScenarioConfig::water_drop());
        config.particle_mass = 2.0;
        let mut sim = FluidSimulator::default();

        let n = populate(&mut sim, &config).unwrap();
        assert_eq!(n, 172);
        assert_eq!(sim.len(), 172);
        assert!(sim.particles().iter().all(|p| p.mass == 2.0));
    }
}
