//! Kernel shape and density summation checks.
//!
//! The Poly6/Spiky/viscosity constants are the classic 3D ones applied in
//! 2D, so the kernels do not integrate to one over the disc. These tests pin
//! the resulting 2D integral, check the Spiky gradient against a numerical
//! derivative and compare grid-based density against a brute-force sum on a
//! lattice.

use std::f64::consts::PI;

use fluid_kernel::sph::compute_density_pressure;
use fluid_kernel::{density_kernel, pressure_gradient_kernel, NeighborGrid, Particle, SphParams};
use glam::DVec2;

/// Spiky kernel whose gradient is used for pressure forces.
fn spiky(r: f64, h: f64) -> f64 {
    if r >= h {
        return 0.0;
    }
    15.0 / (PI * h.powi(6)) * (h - r).powi(3)
}

#[test]
fn poly6_disc_integral() {
    // int_0^h W(r) 2 pi r dr = 315 / (256 h)
    let h = 0.5;
    let n = 20_000;
    let dr = h / n as f64;
    let integral: f64 = (0..n)
        .map(|i| {
            let r = (i as f64 + 0.5) * dr;
            density_kernel(r, h) * 2.0 * PI * r * dr
        })
        .sum();
    let expected = 315.0 / (256.0 * h);

    let relative_error = (integral - expected).abs() / expected;
    eprintln!("Poly6 disc integral: {integral:.6} (expected {expected:.6})");
    assert!(relative_error < 1.0e-6, "relative error {relative_error}");
}

#[test]
fn spiky_gradient_matches_numerical_derivative() {
    let h = 0.5;
    let direction = DVec2::new(3.0, 4.0).normalize();
    let eps = 1.0e-6;

    for i in 1..10 {
        let r = i as f64 * 0.05;
        let numerical = (spiky(r + eps, h) - spiky(r - eps, h)) / (2.0 * eps);
        let grad = pressure_gradient_kernel(direction * r, r, h);

        let expected = numerical * direction;
        let err = (grad - expected).length();
        assert!(
            err < 1.0e-4 * expected.length().max(1.0),
            "r={r}: analytic {grad}, numerical {expected}"
        );
    }
}

#[test]
fn lattice_density_matches_direct_sum() {
    let h = 0.5;
    let spacing = h / 2.0;
    let params = SphParams {
        smoothing_radius: h,
        rest_density: 1.0,
        ..SphParams::default()
    };

    // 7x7 lattice centered on (2, 2)
    let mut particles = Vec::new();
    for ix in -3i32..=3 {
        for iy in -3i32..=3 {
            let position = DVec2::new(2.0 + ix as f64 * spacing, 2.0 + iy as f64 * spacing);
            particles.push(Particle::new(position, DVec2::ZERO, 1.0));
        }
    }
    let center = 24;
    assert_eq!(particles[center].position, DVec2::new(2.0, 2.0));

    let mut grid = NeighborGrid::new(h);
    grid.rebuild(&particles);
    compute_density_pressure(&mut particles, &grid, &params);

    for i in [0, center, 10, 48] {
        let xi = particles[i].position;
        let direct: f64 = particles
            .iter()
            .map(|p| p.mass * density_kernel(xi.distance(p.position), h))
            .sum();
        let computed = particles[i].density;
        assert!(
            (computed - direct).abs() < 1.0e-9 * direct,
            "particle {i}: grid density {computed}, direct sum {direct}"
        );
    }

    // Center sees itself plus 4 axis neighbors at spacing and 4 diagonals
    let expected = density_kernel(0.0, h)
        + 4.0 * density_kernel(spacing, h)
        + 4.0 * density_kernel(spacing * 2f64.sqrt(), h);
    assert!((particles[center].density - expected).abs() < 1.0e-9 * expected);
}
