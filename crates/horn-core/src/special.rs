//! Special-function helpers for radiation impedance.
//!
//! The circular-piston-in-baffle radiation impedance needs the Bessel
//! function J₁ for its resistive part and the Struve function H₁ for its
//! reactive part. J₁ (and Y₁ for the large-argument Struve form) come
//! from `spec_math`; H₁ is summed here since no crate in the stack
//! provides it.

use num_complex::Complex64;
use spec_math::Bessel;
use std::f64::consts::{FRAC_2_PI, PI};

use crate::medium::MediumProperties;

/// Cylindrical Bessel function of the first kind, order 0.
fn bessel_j0(x: f64) -> f64 {
    x.bessel_jv(0.0)
}

/// Cylindrical Bessel function of the first kind, order 1.
fn bessel_j1(x: f64) -> f64 {
    x.bessel_jv(1.0)
}

/// Cylindrical Bessel function of the second kind (Neumann), order 1.
fn bessel_y1(x: f64) -> f64 {
    x.bessel_yv(1.0)
}

/// Argument above which the power series hands over to the asymptotic
/// form. At the crossover both branches agree to a few parts in 1e6.
const STRUVE_SERIES_CUTOFF: f64 = 16.0;

/// Struve function H₁(x) for x ≥ 0.
///
/// Power series for moderate arguments:
///
/// ```text
/// H₁(x) = Σₖ (−1)ᵏ (x/2)^(2k+2) / (Γ(k+3/2)·Γ(k+5/2))
/// ```
///
/// and for large arguments the expansion through Y₁:
///
/// ```text
/// H₁(x) ≈ Y₁(x) + (2/π)·(1 + x⁻² − 3x⁻⁴)
/// ```
pub fn struve_h1(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    if x < STRUVE_SERIES_CUTOFF {
        // First term: (x/2)² / (Γ(3/2)Γ(5/2)) = (x/2)²·8/(3π); successive
        // terms via the ratio −(x/2)² / ((k+3/2)(k+5/2)).
        let h = x / 2.0;
        let mut term = h * h * 8.0 / (3.0 * PI);
        let mut sum = term;
        for k in 0..60 {
            let kf = k as f64;
            term *= -(h * h) / ((kf + 1.5) * (kf + 2.5));
            sum += term;
            if term.abs() < sum.abs() * 1e-16 {
                break;
            }
        }
        sum
    } else {
        let x2 = x * x;
        bessel_y1(x) + FRAC_2_PI * (1.0 + 1.0 / x2 - 3.0 / (x2 * x2))
    }
}

/// Fast rational approximation of H₁(x) after Aarts & Janssen (2003):
///
/// ```text
/// H₁(x) ≈ 2/π − J₀(x) + (16/π − 5)·sin(x)/x + (12 − 36/π)·(1 − cos x)/x²
/// ```
///
/// Within 1% of [`struve_h1`] over the whole piston argument range.
pub fn struve_h1_fast(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    let sinc = x.sin() / x;
    let versine = (1.0 - x.cos()) / (x * x);
    FRAC_2_PI - bessel_j0(x) + (16.0 / PI - 5.0) * sinc + (12.0 - 36.0 / PI) * versine
}

/// Normalized piston radiation resistance R₁(x) = 1 − 2J₁(x)/x.
///
/// The direct form loses all significance as x → 0, so small arguments
/// use the series x²/8 − x⁴/192.
pub fn piston_resistance(x: f64) -> f64 {
    if x.abs() < 0.1 {
        let x2 = x * x;
        x2 / 8.0 - x2 * x2 / 192.0
    } else {
        1.0 - 2.0 * bessel_j1(x) / x
    }
}

/// Normalized piston radiation reactance X₁(x) = 2H₁(x)/x.
pub fn piston_reactance(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        2.0 * struve_h1(x) / x
    }
}

/// Radiation impedance of a rigid circular piston of area `area` in an
/// infinite baffle:
///
/// ```text
/// Z = (ρc/S)·[R₁(2ka) + j·X₁(2ka)],   a = √(S/π),  k = ω/c
/// ```
///
/// At zero frequency both parts vanish, so the result is exactly zero
/// rather than a fault.
pub fn piston_radiation_impedance(
    medium: &MediumProperties,
    area: f64,
    omega: f64,
) -> Complex64 {
    if omega == 0.0 {
        return Complex64::new(0.0, 0.0);
    }
    let radius = (area / PI).sqrt();
    let x = 2.0 * medium.wave_number(omega) * radius;
    let zc = medium.characteristic_impedance(area);
    Complex64::new(zc * piston_resistance(x), zc * piston_reactance(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_bessel_reference_values() {
        // J₁(1) ≈ 0.4400505857449335
        assert_abs_diff_eq!(bessel_j1(1.0), 0.4400505857449335, epsilon = 1e-10);
        // J₀(1) ≈ 0.7651976865579666
        assert_abs_diff_eq!(bessel_j0(1.0), 0.7651976865579666, epsilon = 1e-10);
    }

    #[test]
    fn test_struve_reference_values() {
        // Abramowitz & Stegun table 12.1
        assert_abs_diff_eq!(struve_h1(1.0), 0.198457, epsilon = 1e-5);
        assert_abs_diff_eq!(struve_h1(5.0), 0.807812, epsilon = 1e-4);
        assert_abs_diff_eq!(struve_h1(0.0), 0.0);
    }

    #[test]
    fn test_struve_branch_crossover_is_continuous() {
        // Series just below the handover must match the asymptotic form
        // just above it.
        let below = struve_h1(STRUVE_SERIES_CUTOFF - 1e-9);
        let above = struve_h1(STRUVE_SERIES_CUTOFF + 1e-9);
        assert_abs_diff_eq!(below, above, epsilon = 1e-5);
    }

    #[test]
    fn test_fast_struve_within_one_percent() {
        let mut x = 0.05;
        while x < 40.0 {
            let exact = struve_h1(x);
            let fast = struve_h1_fast(x);
            // H₁ stays O(1) over this range, so an absolute bound of 1%
            // of its scale is the meaningful comparison near its zeros.
            assert!(
                (fast - exact).abs() < 0.01,
                "H1 mismatch at x = {x}: exact = {exact}, fast = {fast}"
            );
            x += 0.05;
        }
    }

    #[test]
    fn test_piston_resistance_limits() {
        // Low-frequency slope: R₁(x) ≈ x²/8
        assert_relative_eq!(piston_resistance(0.01), 0.01f64.powi(2) / 8.0, max_relative = 1e-3);
        // Series and direct forms agree at the 0.1 handover; the bound
        // allows for the slope of R₁ across the sample gap.
        assert_abs_diff_eq!(
            piston_resistance(0.0999999),
            piston_resistance(0.1000001),
            epsilon = 2e-8
        );
        // ka = 0.5 → x = 1: R₁(1) = 1 − 2·J₁(1)
        assert_abs_diff_eq!(piston_resistance(1.0), 1.0 - 2.0 * 0.4400505857449335, epsilon = 1e-9);
        // High-frequency limit: R₁ → 1
        assert_abs_diff_eq!(piston_resistance(200.0), 1.0, epsilon = 0.02);
    }

    #[test]
    fn test_piston_reactance_limits() {
        // Low-frequency slope: X₁(x) ≈ 4x/(3π)
        assert_relative_eq!(
            piston_reactance(0.01),
            4.0 * 0.01 / (3.0 * PI),
            max_relative = 1e-3
        );
        // ka = 0.5 → x = 1: X₁(1) = 2·H₁(1)
        assert_abs_diff_eq!(piston_reactance(1.0), 2.0 * 0.198457, epsilon = 1e-4);
        // Reactance falls away at high frequency
        assert!(piston_reactance(200.0) < 0.02);
    }

    #[test]
    fn test_radiation_impedance_zero_frequency() {
        let air = MediumProperties::default();
        let z = piston_radiation_impedance(&air, 0.05, 0.0);
        assert_eq!(z, Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_radiation_impedance_matches_rho_c_over_s_at_high_ka() {
        let air = MediumProperties::default();
        let area = 0.05; // m²
        let omega = 2.0 * PI * 20_000.0;
        let z = piston_radiation_impedance(&air, area, omega);
        let zc = air.characteristic_impedance(area);
        assert_relative_eq!(z.re, zc, max_relative = 0.05);
        assert!(z.im.abs() < 0.1 * zc);
    }
}
