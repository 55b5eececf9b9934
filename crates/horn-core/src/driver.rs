//! Driver parameters and the electrical-mechanical-acoustic coupling
//! solver.
//!
//! The reference area used to reflect the acoustic load into the
//! mechanical domain is a per-topology contract, decided by the caller
//! and passed in explicitly:
//!
//! - direct radiator: the diaphragm area `sd`, with the load referenced
//!   at the diaphragm plane;
//! - horn- or compression-loaded: the horn THROAT area, with the throat
//!   chamber and horn impedance both referenced at the throat plane.
//!
//! Using the wrong plane/area pair mis-scales the reflected impedance
//! by (Sd/S_throat)², several orders of magnitude for a high
//! compression ratio.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{SimError, SimResult};

/// Lumped electromechanical parameters of one driver.
///
/// Immutable per evaluation; sourced from an external parameter
/// database.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverParameters {
    /// Voice-coil DC resistance in Ω.
    pub re: f64,
    /// Voice-coil inductance in H.
    pub le: f64,
    /// Force factor B·l in T·m.
    pub bl: f64,
    /// Moving mass in kg.
    pub mms: f64,
    /// Suspension compliance in m/N.
    pub cms: f64,
    /// Mechanical resistance in N·s/m.
    pub rms: f64,
    /// Diaphragm area in m².
    pub sd: f64,
}

impl DriverParameters {
    /// Build the mechanical branch from resonance frequency `fs` (Hz)
    /// and mechanical quality factor `qms`, the form driver databases
    /// usually state:
    ///
    /// ```text
    /// Cms = 1/(Mms·ωs²),   Rms = ωs·Mms/Qms
    /// ```
    pub fn from_resonance(
        re: f64,
        le: f64,
        bl: f64,
        mms: f64,
        fs: f64,
        qms: f64,
        sd: f64,
    ) -> Self {
        let ws = 2.0 * PI * fs;
        Self {
            re,
            le,
            bl,
            mms,
            cms: 1.0 / (mms * ws * ws),
            rms: ws * mms / qms,
            sd,
        }
    }

    /// Unloaded mechanical resonance 1/(2π·√(Mms·Cms)) in Hz.
    pub fn resonance_frequency(&self) -> f64 {
        1.0 / (2.0 * PI * (self.mms * self.cms).sqrt())
    }

    pub fn validate(&self) -> SimResult<()> {
        for (name, value, strict) in [
            ("re", self.re, true),
            ("le", self.le, false),
            ("bl", self.bl, true),
            ("mms", self.mms, true),
            ("cms", self.cms, true),
            ("rms", self.rms, false),
            ("sd", self.sd, true),
        ] {
            if !value.is_finite() || value < 0.0 || (strict && value == 0.0) {
                return Err(SimError::geometry(name, value));
            }
        }
        Ok(())
    }
}

/// Result of one coupling solve: the complex electrical and motional
/// state of the driver at a single frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouplingSolution {
    /// Total electrical impedance seen at the terminals, Ω.
    pub electrical_impedance: Complex64,
    /// Voice-coil current phasor, A.
    pub current: Complex64,
    /// Diaphragm velocity phasor, m/s.
    pub velocity: Complex64,
    /// Volume velocity phasor at the reference plane, m³/s.
    pub volume_velocity: Complex64,
}

/// Solve the coupled circuit for one frequency.
///
/// `z_acoustic` is the combined acoustic load referenced at the plane
/// of `reference_area` (see module docs for the per-topology contract).
///
/// ```text
/// Z_mech = Rms + jωMms + 1/(jωCms) + S_ref²·Z_acoustic
/// Z_e    = Re + jωLe + BL²/Z_mech
/// I      = V/Z_e          (full complex phasor)
/// v      = BL·I/Z_mech
/// U      = v·S_ref
/// ```
pub fn solve_coupling(
    driver: &DriverParameters,
    z_acoustic: Complex64,
    reference_area: f64,
    voltage: f64,
    frequency: f64,
) -> SimResult<CouplingSolution> {
    driver.validate()?;
    if !(frequency > 0.0) || !frequency.is_finite() {
        return Err(SimError::geometry("frequency", frequency));
    }
    if !(reference_area > 0.0) || !reference_area.is_finite() {
        return Err(SimError::geometry("reference_area", reference_area));
    }
    if !(voltage > 0.0) || !voltage.is_finite() {
        return Err(SimError::geometry("voltage", voltage));
    }
    if !z_acoustic.re.is_finite() || !z_acoustic.im.is_finite() {
        return Err(SimError::unstable("acoustic load", frequency));
    }

    let omega = 2.0 * PI * frequency;
    let j = Complex64::new(0.0, 1.0);
    let z_mech = driver.rms
        + j * omega * driver.mms
        + Complex64::new(0.0, -1.0 / (omega * driver.cms))
        + reference_area * reference_area * z_acoustic;
    // Exactly zero would mean unbounded velocity from finite drive;
    // that is a numerical fault, not a physical state.
    if z_mech == Complex64::new(0.0, 0.0) {
        return Err(SimError::unstable("mechanical impedance", frequency));
    }

    let bl2 = driver.bl * driver.bl;
    let electrical_impedance = driver.re + j * omega * driver.le + bl2 / z_mech;
    // The full complex current phasor; taking only its in-phase part
    // under-predicts output wherever the load is reactive.
    let current = voltage / electrical_impedance;
    let velocity = driver.bl * current / z_mech;
    let volume_velocity = velocity * reference_area;

    let finite = [electrical_impedance, current, velocity, volume_velocity]
        .iter()
        .all(|z| z.re.is_finite() && z.im.is_finite());
    if !finite {
        return Err(SimError::unstable("coupling solve", frequency));
    }

    Ok(CouplingSolution {
        electrical_impedance,
        current,
        velocity,
        volume_velocity,
    })
}
