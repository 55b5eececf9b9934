//! Frequency-sweep results and derived scalar metrics.
//!
//! A sweep evaluates the system independently at each frequency (no
//! state is shared between points) and collects the results into a
//! [`ResponseCurve`]. The curve is produced fresh per call and never
//! mutated afterwards.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Reference intensity for SPL, W/m² (corresponds to 20 µPa in air).
const REFERENCE_INTENSITY: f64 = 1e-12;

/// One evaluated frequency point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyPoint {
    /// Frequency in Hz.
    pub frequency: f64,
    /// Electrical impedance at the driver terminals, Ω.
    pub electrical_impedance: Complex64,
    /// Volume velocity at the reference plane, m³/s.
    pub volume_velocity: Complex64,
    /// Sound pressure level at 1 m over a half-space, dB re 20 µPa.
    pub spl_db: f64,
}

/// A frequency band [low, high] in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, frequency: f64) -> bool {
        frequency >= self.low && frequency <= self.high
    }
}

/// The result of one frequency sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCurve {
    points: Vec<FrequencyPoint>,
    drive_voltage: f64,
}

impl ResponseCurve {
    pub fn new(points: Vec<FrequencyPoint>, drive_voltage: f64) -> Self {
        Self {
            points,
            drive_voltage,
        }
    }

    pub fn points(&self) -> &[FrequencyPoint] {
        &self.points
    }

    pub fn drive_voltage(&self) -> f64 {
        self.drive_voltage
    }

    /// The −3 dB cutoff: starting from the passband maximum and
    /// scanning DOWN in frequency, the first crossing of max − 3 dB,
    /// linearly interpolated between the bracketing points.
    ///
    /// This is a property of the simulated response, distinct from any
    /// profile's theoretical flare cutoff. Returns `None` when the
    /// level never drops 3 dB below the maximum within the sweep.
    pub fn cutoff_frequency(&self) -> Option<f64> {
        if self.points.len() < 2 {
            return None;
        }
        let max_idx = self
            .points
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.spl_db.total_cmp(&b.1.spl_db))
            .map(|(i, _)| i)?;
        let threshold = self.points[max_idx].spl_db - 3.0;
        for i in (0..max_idx).rev() {
            let below = &self.points[i];
            if below.spl_db < threshold {
                let above = &self.points[i + 1];
                let fraction = (threshold - below.spl_db) / (above.spl_db - below.spl_db);
                return Some(below.frequency + fraction * (above.frequency - below.frequency));
            }
        }
        None
    }

    /// Flatness over `band`: the standard deviation of SPL in dB.
    ///
    /// With `detrend` set, a least-squares line against log-frequency
    /// is removed first so a monotonic slope is not mis-scored as
    /// ripple. A perfectly flat level array reports exactly 0. Returns
    /// `None` when the band contains no points.
    pub fn flatness(&self, band: Band, detrend: bool) -> Option<f64> {
        let in_band: Vec<(f64, f64)> = self
            .points
            .iter()
            .filter(|p| band.contains(p.frequency))
            .map(|p| (p.frequency.log10(), p.spl_db))
            .collect();
        if in_band.is_empty() {
            return None;
        }
        let n = in_band.len() as f64;
        // Anchor the means on the first element; a constant level array
        // then yields bitwise-zero residuals rather than rounding dust.
        let (x0, y0) = in_band[0];
        let mean_x = x0 + in_band.iter().map(|(x, _)| x - x0).sum::<f64>() / n;
        let mean_y = y0 + in_band.iter().map(|(_, y)| y - y0).sum::<f64>() / n;

        let mut residuals: Vec<f64> = in_band.iter().map(|(_, y)| y - mean_y).collect();
        if detrend && in_band.len() >= 2 {
            let sxx: f64 = in_band.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
            if sxx > 0.0 {
                let sxy: f64 = in_band
                    .iter()
                    .zip(&residuals)
                    .map(|((x, _), r)| (x - mean_x) * r)
                    .sum();
                let slope = sxy / sxx;
                for ((x, _), r) in in_band.iter().zip(&mut residuals) {
                    *r -= slope * (x - mean_x);
                }
            }
        }
        let variance = residuals.iter().map(|r| r * r).sum::<f64>() / n;
        Some(variance.sqrt())
    }

    /// Mean ratio of radiated acoustic power to electrical input power
    /// over `band`. Returns `None` when the band contains no points or
    /// no electrical power is drawn.
    pub fn efficiency(&self, band: Band) -> Option<f64> {
        let mut total = 0.0;
        let mut count = 0usize;
        for p in self.points.iter().filter(|p| band.contains(p.frequency)) {
            let z = p.electrical_impedance;
            let electrical = 0.5 * self.drive_voltage * self.drive_voltage * z.re / z.norm_sqr();
            if electrical <= 0.0 {
                return None;
            }
            total += acoustic_power_from_spl(p.spl_db) / electrical;
            count += 1;
        }
        if count == 0 {
            None
        } else {
            Some(total / count as f64)
        }
    }

    /// Frequency of the electrical impedance magnitude maximum, the
    /// system resonance.
    pub fn impedance_peak(&self) -> Option<f64> {
        self.points
            .iter()
            .max_by(|a, b| {
                a.electrical_impedance
                    .norm_sqr()
                    .total_cmp(&b.electrical_impedance.norm_sqr())
            })
            .map(|p| p.frequency)
    }
}

/// SPL at 1 m over a half-space from the volume velocity and the real
/// part of the radiation (or throat) load it works into:
///
/// ```text
/// P = ½·|U|²·Re(Z),   SPL = 10·log₁₀(P/(2π·I_ref))
/// ```
pub fn spl_from_volume_velocity(volume_velocity: Complex64, radiation_resistance: f64) -> f64 {
    let power = 0.5 * volume_velocity.norm_sqr() * radiation_resistance;
    let intensity = power / (2.0 * PI);
    10.0 * (intensity / REFERENCE_INTENSITY).log10()
}

/// Radiated acoustic power back out of an SPL value.
fn acoustic_power_from_spl(spl_db: f64) -> f64 {
    REFERENCE_INTENSITY * 10f64.powf(spl_db / 10.0) * 2.0 * PI
}

/// Logarithmically spaced frequency grid from `low` to `high` (Hz),
/// inclusive of both ends.
pub fn log_spaced(low: f64, high: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![low],
        _ => {
            let ratio = high / low;
            (0..count)
                .map(|i| low * ratio.powf(i as f64 / (count - 1) as f64))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn point(frequency: f64, spl_db: f64) -> FrequencyPoint {
        FrequencyPoint {
            frequency,
            electrical_impedance: Complex64::new(8.0, 0.0),
            volume_velocity: Complex64::new(1e-3, 0.0),
            spl_db,
        }
    }

    #[test]
    fn test_log_spaced_endpoints_and_ratio() {
        let grid = log_spaced(10.0, 20_000.0, 64);
        assert_eq!(grid.len(), 64);
        assert_abs_diff_eq!(grid[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(*grid.last().unwrap(), 20_000.0, max_relative = 1e-12);
        let r0 = grid[1] / grid[0];
        for w in grid.windows(2) {
            assert_relative_eq!(w[1] / w[0], r0, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_flatness_of_constant_level_is_exactly_zero() {
        for n in [3usize, 7, 64] {
            let points: Vec<FrequencyPoint> = log_spaced(100.0, 1000.0, n)
                .into_iter()
                .map(|f| point(f, 87.3))
                .collect();
            let curve = ResponseCurve::new(points, 2.83);
            let band = Band::new(50.0, 2000.0);
            assert_eq!(curve.flatness(band, false), Some(0.0));
            assert_eq!(curve.flatness(band, true), Some(0.0));
        }
    }

    #[test]
    fn test_flatness_detrend_removes_linear_slope() {
        // A pure tilt against log-frequency: 6 dB/octave.
        let points: Vec<FrequencyPoint> = log_spaced(100.0, 1600.0, 40)
            .into_iter()
            .map(|f| point(f, 80.0 + 20.0 * (f / 100.0).log10()))
            .collect();
        let curve = ResponseCurve::new(points, 2.83);
        let band = Band::new(100.0, 1600.0);
        let raw = curve.flatness(band, false).unwrap();
        let detrended = curve.flatness(band, true).unwrap();
        assert!(raw > 1.0, "tilted curve should score badly raw: {raw}");
        assert!(
            detrended < 1e-9,
            "tilt should vanish after detrending: {detrended}"
        );
    }

    #[test]
    fn test_flatness_empty_band_is_none() {
        let curve = ResponseCurve::new(vec![point(100.0, 90.0)], 2.83);
        assert_eq!(curve.flatness(Band::new(5000.0, 9000.0), false), None);
    }

    #[test]
    fn test_cutoff_scans_down_from_passband_maximum() {
        // 12 dB/octave low-frequency rolloff into a flat passband.
        let points: Vec<FrequencyPoint> = log_spaced(10.0, 1000.0, 200)
            .into_iter()
            .map(|f| {
                let level = if f < 100.0 {
                    90.0 + 40.0 * (f / 100.0).log10()
                } else {
                    90.0
                };
                point(f, level)
            })
            .collect();
        let curve = ResponseCurve::new(points, 2.83);
        let cutoff = curve.cutoff_frequency().unwrap();
        // max − 3 dB = 87 dB, crossed where 40·log10(f/100) = −3.
        let expected = 100.0 * 10f64.powf(-3.0 / 40.0);
        assert_relative_eq!(cutoff, expected, max_relative = 0.02);
    }

    #[test]
    fn test_cutoff_none_when_low_side_never_drops() {
        // A response that never drops 3 dB below its maximum on the
        // low side has no cutoff inside the sweep.
        let points: Vec<FrequencyPoint> = log_spaced(10.0, 1000.0, 50)
            .into_iter()
            .map(|f| point(f, 90.0 - (f / 1000.0)))
            .collect();
        let curve = ResponseCurve::new(points, 2.83);
        assert_eq!(curve.cutoff_frequency(), None);
    }

    #[test]
    fn test_impedance_peak_finds_maximum() {
        let mut points: Vec<FrequencyPoint> = log_spaced(10.0, 1000.0, 100)
            .into_iter()
            .map(|f| point(f, 90.0))
            .collect();
        for p in &mut points {
            // Synthetic resonance bump at 50 Hz.
            let x = (p.frequency / 50.0).log10();
            p.electrical_impedance = Complex64::new(8.0 + 60.0 * (-x * x / 0.01).exp(), 0.0);
        }
        let curve = ResponseCurve::new(points, 2.83);
        let peak = curve.impedance_peak().unwrap();
        assert_relative_eq!(peak, 50.0, max_relative = 0.05);
    }

    #[test]
    fn test_spl_reference_level() {
        // 1 W of acoustic power over a half-space at 1 m is
        // 10·log10(1/(2π·1e-12)) ≈ 112 dB.
        let u = Complex64::new(1.0, 0.0);
        let spl = spl_from_volume_velocity(u, 2.0); // P = ½·1²·2 = 1 W
        assert_abs_diff_eq!(spl, 112.0, epsilon = 0.1);
    }

    #[test]
    fn test_efficiency_round_trip() {
        // One point, resistive impedance: P_e = V²/(2R); pick SPL so
        // P_ac = P_e/100 and expect exactly 1%.
        let voltage: f64 = 2.83;
        let resistance = 8.0;
        let p_e = voltage * voltage / (2.0 * resistance);
        let p_ac = p_e / 100.0;
        let spl = 10.0 * (p_ac / (2.0 * PI) / REFERENCE_INTENSITY).log10();
        let curve = ResponseCurve::new(vec![point(500.0, spl)], voltage);
        let eff = curve.efficiency(Band::new(100.0, 1000.0)).unwrap();
        assert_relative_eq!(eff, 0.01, max_relative = 1e-9);
    }
}
