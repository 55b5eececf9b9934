//! Chamber (compliance) impedance models.
//!
//! An enclosed air volume behaves as an acoustic compliance
//! C = V/(ρc²) with impedance Z = 1/(jωC). How that impedance enters
//! the rest of the circuit is a property of the chamber's placement in
//! the flow topology, carried explicitly on each chamber; the
//! series/shunt choice is never inferred at composition time.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{SimError, SimResult};
use crate::medium::MediumProperties;

/// How a chamber's impedance combines with the rest of the acoustic
/// load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// The chamber carries the same volume velocity as the load it
    /// combines with; impedances add.
    Series,
    /// The chamber provides a bypass path; volume velocity splits and
    /// impedances combine as a parallel pair.
    Shunt,
}

/// Combine two impedances in series: Z = Zₐ + Z_b.
pub fn compose_series(z_a: Complex64, z_b: Complex64) -> Complex64 {
    z_a + z_b
}

/// Combine two impedances in shunt: Z = Zₐ·Z_b/(Zₐ+Z_b).
///
/// A non-finite operand is the open-circuit limit and returns the other
/// operand unchanged, so a diverging branch means "no pathway" rather
/// than a NaN.
pub fn compose_shunt(z_a: Complex64, z_b: Complex64) -> Complex64 {
    if !z_a.re.is_finite() || !z_a.im.is_finite() {
        return z_b;
    }
    if !z_b.re.is_finite() || !z_b.im.is_finite() {
        return z_a;
    }
    (z_a * z_b) / (z_a + z_b)
}

/// Apply the composition rule named by `placement`.
pub fn compose(placement: Placement, z_a: Complex64, z_b: Complex64) -> Complex64 {
    match placement {
        Placement::Series => compose_series(z_a, z_b),
        Placement::Shunt => compose_shunt(z_a, z_b),
    }
}

/// Treatment of a chamber's internal standing waves.
///
/// The lumped compliance is only valid while the chamber's extent is
/// small against wavelength; the standing-wave model adds the first `n`
/// closed-duct modes on top of it. The choice is always explicit; no
/// size heuristic picks modes silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalModel {
    /// Pure lumped compliance, no modal terms.
    Lumped,
    /// Lumped compliance plus the first `modes` standing-wave
    /// resonances of the chamber depth.
    StandingWave { modes: usize },
}

/// Chamber between the driver and the horn throat.
///
/// Sits directly in the flow path: the diaphragm's volume velocity
/// passes through it into the throat, so its impedance composes in
/// series with the horn's throat impedance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroatChamber {
    /// Volume in m³. Zero means no chamber.
    pub volume: f64,
    /// Cross-section area in m², used to derive the chamber depth for
    /// the standing-wave model.
    pub cross_section_area: f64,
    pub modal: ModalModel,
}

impl ThroatChamber {
    pub fn new(volume: f64, cross_section_area: f64) -> Self {
        Self {
            volume,
            cross_section_area,
            modal: ModalModel::Lumped,
        }
    }

    pub fn with_modal(mut self, modal: ModalModel) -> Self {
        self.modal = modal;
        self
    }

    /// This chamber's place in the flow topology.
    pub fn placement(&self) -> Placement {
        Placement::Series
    }

    /// Series impedance contribution at angular frequency `omega`.
    ///
    /// The lumped part is 1/(jωC); the standing-wave model adds the
    /// cotangent-expansion modes of the closed duct of depth d = V/S:
    ///
    /// ```text
    /// Z = 1/(jωC) + Σₙ (ρc/S)·2jkd/((nπ)² − (kd)²)
    /// ```
    ///
    /// A zero-volume chamber contributes nothing: the series identity,
    /// not an error.
    pub fn impedance(&self, medium: &MediumProperties, omega: f64) -> SimResult<Complex64> {
        if self.volume < 0.0 {
            return Err(SimError::geometry("chamber_volume", self.volume));
        }
        if self.volume == 0.0 {
            if let ModalModel::StandingWave { modes } = self.modal {
                return Err(SimError::UnsupportedConfiguration {
                    reason: format!(
                        "{modes} standing-wave modes requested on a zero-volume chamber"
                    ),
                });
            }
            return Ok(Complex64::new(0.0, 0.0));
        }
        if !(self.cross_section_area > 0.0) {
            return Err(SimError::geometry(
                "chamber_cross_section_area",
                self.cross_section_area,
            ));
        }
        let compliance = acoustic_compliance(medium, self.volume);
        let mut z = lumped_impedance(compliance, omega);
        if let ModalModel::StandingWave { modes } = self.modal {
            let depth = self.volume / self.cross_section_area;
            let kd = medium.wave_number(omega) * depth;
            let zc = medium.characteristic_impedance(self.cross_section_area);
            for n in 1..=modes {
                let n_pi = n as f64 * PI;
                z += Complex64::new(0.0, zc * 2.0 * kd / (n_pi * n_pi - kd * kd));
            }
        }
        if !z.re.is_finite() || !z.im.is_finite() {
            return Err(SimError::unstable("throat chamber", omega / (2.0 * PI)));
        }
        Ok(z)
    }
}

/// Sealed chamber behind the diaphragm.
///
/// The diaphragm's whole rear volume velocity works against the
/// enclosed air, so the chamber impedance composes in series into the
/// driver's acoustic load; the trapped volume acts as an added spring,
/// which is what raises the system resonance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RearChamber {
    /// Volume in m³. Zero means no chamber.
    pub volume: f64,
}

impl RearChamber {
    pub fn new(volume: f64) -> Self {
        Self { volume }
    }

    /// This chamber's place in the flow topology.
    pub fn placement(&self) -> Placement {
        Placement::Series
    }

    /// Series impedance contribution at angular frequency `omega`; the
    /// series identity for a zero volume.
    pub fn impedance(&self, medium: &MediumProperties, omega: f64) -> SimResult<Complex64> {
        if self.volume < 0.0 {
            return Err(SimError::geometry("chamber_volume", self.volume));
        }
        if self.volume == 0.0 {
            return Ok(Complex64::new(0.0, 0.0));
        }
        let z = lumped_impedance(acoustic_compliance(medium, self.volume), omega);
        if !z.re.is_finite() || !z.im.is_finite() {
            return Err(SimError::unstable("rear chamber", omega / (2.0 * PI)));
        }
        Ok(z)
    }
}

/// Acoustic compliance C = V/(ρc²) of a volume V.
pub fn acoustic_compliance(medium: &MediumProperties, volume: f64) -> f64 {
    volume / (medium.density * medium.sound_speed * medium.sound_speed)
}

fn lumped_impedance(compliance: f64, omega: f64) -> Complex64 {
    Complex64::new(0.0, -1.0 / (omega * compliance))
}

/// The chamber configuration of one system: an optional throat chamber
/// between driver and horn, and an optional sealed rear chamber.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChamberSet {
    pub throat: Option<ThroatChamber>,
    pub rear: Option<RearChamber>,
}

impl ChamberSet {
    /// No chambers at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_throat(mut self, chamber: ThroatChamber) -> Self {
        self.throat = Some(chamber);
        self
    }

    pub fn with_rear(mut self, chamber: RearChamber) -> Self {
        self.rear = Some(chamber);
        self
    }
}
