//! Equation of state.
//!
//! A linear (ideal-gas type) relation between density and gauge pressure:
//! zero at rest density, growing linearly with compression. Densities are
//! floored at rest density first, so pressure is never negative.

/// Floor `density` at `rest_density`.
#[inline]
pub fn floor_density(density: f64, rest_density: f64) -> f64 {
    density.max(rest_density)
}

/// Linear equation of state.
///
/// ```text
/// p = k * (rho - rho_0)
/// ```
///
/// # Arguments
/// * `density` - Current density rho.
/// * `rest_density` - Reference density rho_0.
/// * `gas_constant` - Stiffness k.
#[inline]
pub fn linear_eos(density: f64, rest_density: f64, gas_constant: f64) -> f64 {
    gas_constant * (density - rest_density)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_zero_at_rest_density() {
        assert_eq!(linear_eos(1000.0, 1000.0, 2000.0), 0.0);
    }

    #[test]
    fn pressure_positive_when_compressed() {
        let p = linear_eos(1010.0, 1000.0, 2000.0);
        assert!((p - 20_000.0).abs() < 1e-6, "got {p}");
    }

    #[test]
    fn floor_keeps_pressure_non_negative() {
        let rho = floor_density(400.0, 1000.0);
        assert_eq!(rho, 1000.0);
        assert_eq!(linear_eos(rho, 1000.0, 2000.0), 0.0);
    }

    #[test]
    fn floor_passes_denser_values_through() {
        assert_eq!(floor_density(1200.0, 1000.0), 1200.0);
    }
}
