//! Horn cascade composer.
//!
//! A [`HornProfile`] is an ordered chain of segments, throat to mouth.
//! The composer multiplies the segment matrices strictly in that order
//! and terminates the product with the mouth radiation impedance to
//! obtain the acoustic impedance seen at the throat.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::trace;

use crate::error::{SimError, SimResult};
use crate::medium::MediumProperties;
use crate::segments::HornSegment;
use crate::special::piston_radiation_impedance;
use crate::transfer_matrix::TransferMatrix;

/// Relative tolerance for the junction-area continuity check.
const JUNCTION_TOLERANCE: f64 = 1e-6;

/// An ordered sequence of horn segments, throat to mouth.
///
/// Junction continuity (adjacent segments sharing the area where they
/// meet) is an invariant of the whole chain; it is checked when the
/// cascade is composed, not duplicated in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HornProfile {
    segments: Vec<HornSegment>,
}

impl HornProfile {
    pub fn new(segments: Vec<HornSegment>) -> Self {
        Self { segments }
    }

    /// Single-segment convenience constructor.
    pub fn single(segment: HornSegment) -> Self {
        Self {
            segments: vec![segment],
        }
    }

    pub fn segments(&self) -> &[HornSegment] {
        &self.segments
    }

    /// Throat area of the first segment in m².
    pub fn throat_area(&self) -> SimResult<f64> {
        Ok(self.first()?.throat_area())
    }

    /// Mouth area of the last segment in m².
    pub fn mouth_area(&self) -> SimResult<f64> {
        let last = self.segments.last().ok_or_else(Self::empty_error)?;
        Ok(last.mouth_area())
    }

    /// Flare cutoff of the throat-side segment, the profile's evanescence
    /// boundary toward low frequencies. Zero for profiles that propagate
    /// to DC.
    pub fn flare_cutoff(&self, medium: &MediumProperties) -> SimResult<f64> {
        Ok(self.first()?.flare_cutoff(medium))
    }

    fn first(&self) -> SimResult<&HornSegment> {
        self.segments.first().ok_or_else(Self::empty_error)
    }

    fn empty_error() -> SimError {
        SimError::UnsupportedConfiguration {
            reason: "horn profile contains no segments".into(),
        }
    }

    /// Check that adjacent segments share their junction area.
    fn check_junctions(&self) -> SimResult<()> {
        for pair in self.segments.windows(2) {
            let upstream_mouth = pair[0].mouth_area();
            let downstream_throat = pair[1].throat_area();
            let scale = upstream_mouth.abs().max(downstream_throat.abs());
            if (upstream_mouth - downstream_throat).abs() > JUNCTION_TOLERANCE * scale {
                return Err(SimError::geometry("junction_area", downstream_throat));
            }
        }
        Ok(())
    }

    /// Total transfer matrix T = T₁·T₂·…·Tₙ, multiplied strictly in
    /// throat→mouth order.
    pub fn total_transfer_matrix(
        &self,
        medium: &MediumProperties,
        omega: f64,
    ) -> SimResult<TransferMatrix> {
        self.first()?;
        self.check_junctions()?;
        let mut total = TransferMatrix::identity();
        for segment in &self.segments {
            let t = segment.transfer_matrix(medium, omega)?;
            total = total.chain(&t);
        }
        if !total.is_finite() {
            return Err(SimError::unstable("horn cascade", omega / (2.0 * PI)));
        }
        Ok(total)
    }

    /// Acoustic impedance at the throat when the mouth is terminated
    /// with `mouth_impedance`:
    ///
    /// ```text
    /// Z_throat = (a·Z_mouth + b) / (c·Z_mouth + d)
    /// ```
    pub fn throat_impedance(
        &self,
        medium: &MediumProperties,
        frequency: f64,
        mouth_impedance: Complex64,
    ) -> SimResult<Complex64> {
        let omega = 2.0 * PI * frequency;
        let total = self.total_transfer_matrix(medium, omega)?;
        let z = total.terminate(mouth_impedance);
        if !z.re.is_finite() || !z.im.is_finite() {
            return Err(SimError::unstable("throat impedance", frequency));
        }
        trace!(frequency, z_throat_re = z.re, z_throat_im = z.im, "cascade");
        Ok(z)
    }

    /// Throat impedance with the mouth radiating as a circular piston in
    /// an infinite baffle, the standard termination for a horn mouth.
    pub fn baffled_throat_impedance(
        &self,
        medium: &MediumProperties,
        frequency: f64,
    ) -> SimResult<Complex64> {
        let mouth_area = self.mouth_area()?;
        let z_mouth = piston_radiation_impedance(medium, mouth_area, 2.0 * PI * frequency);
        self.throat_impedance(medium, frequency, z_mouth)
    }
}
