//! Analytical reference solutions for ballistic particles.
//!
//! An isolated particle (no neighbor closer than the smoothing radius) has
//! its density floored and feels only gravity, so its trajectory has a
//! closed form both in continuous time and under the discrete integrator.

use glam::DVec2;

/// Continuous-time ballistic trajectory.
///
/// ```text
/// x(t) = x0 + v0 t + g t^2 / 2
/// v(t) = v0 + g t
/// ```
pub fn ballistic_state(x0: DVec2, v0: DVec2, gravity: DVec2, t: f64) -> (DVec2, DVec2) {
    let position = x0 + v0 * t + 0.5 * gravity * t * t;
    let velocity = v0 + gravity * t;
    (position, velocity)
}

/// Exact state after `n` semi-implicit Euler steps of size `dt` under
/// constant acceleration `gravity`.
///
/// ```text
/// v_n = v0 + n g dt
/// x_n = x0 + n v0 dt + g dt^2 n (n + 1) / 2
/// ```
pub fn semi_implicit_free_fall(x0: DVec2, v0: DVec2, gravity: DVec2, dt: f64, n: u64) -> (DVec2, DVec2) {
    let nf = n as f64;
    let velocity = v0 + gravity * (nf * dt);
    let position = x0 + v0 * (nf * dt) + gravity * (dt * dt * nf * (nf + 1.0) / 2.0);
    (position, velocity)
}

/// Position offset of the discrete integrator relative to the continuous
/// solution at `t = n dt`.
///
/// ```text
/// x_n - x(t) = g dt t / 2
/// ```
///
/// The scheme is first order: the offset shrinks linearly with `dt`.
pub fn integrator_position_offset(gravity: DVec2, dt: f64, t: f64) -> DVec2 {
    0.5 * gravity * dt * t
}

/// Time for a particle released from rest at height `height` to reach the
/// floor under gravity of magnitude `g`.
pub fn time_to_floor(height: f64, g: f64) -> f64 {
    (2.0 * height / g).sqrt()
}
