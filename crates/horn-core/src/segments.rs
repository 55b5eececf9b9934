//! Per-segment horn transfer matrices.
//!
//! Each variant of [`HornSegment`] maps its geometry and an angular
//! frequency to the 2×2 matrix of `transfer_matrix.rs`. Dispatch is a
//! closed tagged enum so the formula set stays exhaustive; a profile
//! kind that is not matched here does not exist.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{SimError, SimResult};
use crate::medium::MediumProperties;
use crate::transfer_matrix::TransferMatrix;

/// One horn segment, throat side first.
///
/// Areas are in m², lengths in m, all strictly positive. Flared
/// variants require mouth area ≥ throat area; equality routes to the
/// cylindrical formula, which is the exact limit of every flare family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HornSegment {
    /// Constant cross-section duct.
    Cylindrical { area: f64, length: f64 },
    /// Linear radius growth toward a virtual apex behind the throat.
    Conical {
        throat_area: f64,
        mouth_area: f64,
        length: f64,
    },
    /// Exponential area growth S(x) = S₁·e^(m·x).
    Exponential {
        throat_area: f64,
        mouth_area: f64,
        length: f64,
    },
    /// Salmon hypex family: radius ∝ cosh(x/x₀) + t·sinh(x/x₀).
    ///
    /// `taper` = 1 is exactly the exponential profile; taper → ∞
    /// approaches the conical profile; taper = 0 is the catenoidal horn.
    Hyperbolic {
        throat_area: f64,
        mouth_area: f64,
        length: f64,
        taper: f64,
    },
}

/// Wave regime of a flared segment at one frequency.
///
/// The choice between oscillatory and decaying axial solutions is a
/// single comparison of the wave number against the flare constant
/// (m/2 for exponential, 1/x₀ for hypex); it is made here, once, rather
/// than left to the branch cut of a complex square root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveRegime {
    /// k > flare constant: travelling waves above cutoff.
    Propagating,
    /// k < flare constant: exponentially decaying solutions below cutoff.
    Evanescent,
    /// k equals the flare constant exactly.
    Cutoff,
}

/// Classify `k` against a segment's flare constant.
pub fn wave_regime(k: f64, flare_constant: f64) -> WaveRegime {
    if k > flare_constant {
        WaveRegime::Propagating
    } else if k < flare_constant {
        WaveRegime::Evanescent
    } else {
        WaveRegime::Cutoff
    }
}

/// sin(x)/x with its series limit at the origin.
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-8 {
        1.0 - x * x / 6.0
    } else {
        x.sin() / x
    }
}

/// sinh(x)/x with its series limit at the origin.
fn sinch(x: f64) -> f64 {
    if x.abs() < 1e-8 {
        1.0 + x * x / 6.0
    } else {
        x.sinh() / x
    }
}

/// (sin x − x·cos x)/x² with its series limit at the origin.
fn sin_minus_xcos_over_x2(x: f64) -> f64 {
    if x.abs() < 1e-4 {
        x / 3.0 - x * x * x / 30.0
    } else {
        (x.sin() - x * x.cos()) / (x * x)
    }
}

/// Axial solution kernels (C, S) for a flared segment of length `length`
/// and flare constant `e` at wave number `k`:
///
/// - propagating: C = cos(βL), S = sin(βL)/β with β = √(k²−e²)
/// - evanescent:  C = cosh(γL), S = sinh(γL)/γ with γ = √(e²−k²)
/// - at cutoff:   C = 1, S = L
///
/// Both branches satisfy C² + (k²−e²)·S² = 1, which is what makes the
/// assembled matrices unimodular.
fn flare_kernels(k: f64, e: f64, length: f64) -> (f64, f64) {
    match wave_regime(k, e) {
        WaveRegime::Propagating => {
            let beta = (k * k - e * e).sqrt();
            ((beta * length).cos(), length * sinc(beta * length))
        }
        WaveRegime::Evanescent => {
            let gamma = (e * e - k * k).sqrt();
            ((gamma * length).cosh(), length * sinch(gamma * length))
        }
        WaveRegime::Cutoff => (1.0, length),
    }
}

impl HornSegment {
    /// Throat-side area in m².
    pub fn throat_area(&self) -> f64 {
        match *self {
            Self::Cylindrical { area, .. } => area,
            Self::Conical { throat_area, .. }
            | Self::Exponential { throat_area, .. }
            | Self::Hyperbolic { throat_area, .. } => throat_area,
        }
    }

    /// Mouth-side area in m².
    pub fn mouth_area(&self) -> f64 {
        match *self {
            Self::Cylindrical { area, .. } => area,
            Self::Conical { mouth_area, .. }
            | Self::Exponential { mouth_area, .. }
            | Self::Hyperbolic { mouth_area, .. } => mouth_area,
        }
    }

    /// Axial length in m.
    pub fn length(&self) -> f64 {
        match *self {
            Self::Cylindrical { length, .. }
            | Self::Conical { length, .. }
            | Self::Exponential { length, .. }
            | Self::Hyperbolic { length, .. } => length,
        }
    }

    /// Reject non-positive dimensions and flare violations before any
    /// matrix arithmetic runs.
    pub fn validate(&self) -> SimResult<()> {
        let throat = self.throat_area();
        let mouth = self.mouth_area();
        let length = self.length();
        if !(throat > 0.0) || !throat.is_finite() {
            return Err(SimError::geometry("throat_area", throat));
        }
        if !(mouth > 0.0) || !mouth.is_finite() {
            return Err(SimError::geometry("mouth_area", mouth));
        }
        if !(length > 0.0) || !length.is_finite() {
            return Err(SimError::geometry("length", length));
        }
        match *self {
            Self::Cylindrical { .. } => {}
            // Expansion-role segments must not contract.
            Self::Conical { .. } | Self::Exponential { .. } => {
                if mouth < throat {
                    return Err(SimError::geometry("mouth_area", mouth));
                }
            }
            Self::Hyperbolic { taper, .. } => {
                if mouth < throat {
                    return Err(SimError::geometry("mouth_area", mouth));
                }
                if !(taper >= 0.0) || !taper.is_finite() {
                    return Err(SimError::geometry("taper", taper));
                }
            }
        }
        Ok(())
    }

    /// Flare cutoff frequency f_c in Hz; zero for the profiles that
    /// propagate down to DC (cylindrical, conical).
    ///
    /// This is the theoretical evanescence boundary of the profile, not
    /// the −3 dB point of any simulated response.
    pub fn flare_cutoff(&self, medium: &MediumProperties) -> f64 {
        medium.sound_speed * self.flare_constant() / (2.0 * PI)
    }

    /// Flare constant (rad/m): m/2 for exponential, 1/x₀ for hypex,
    /// zero for cylindrical and conical.
    fn flare_constant(&self) -> f64 {
        match *self {
            Self::Cylindrical { .. } | Self::Conical { .. } => 0.0,
            Self::Exponential {
                throat_area,
                mouth_area,
                length,
            } => {
                if mouth_area == throat_area {
                    0.0
                } else {
                    (mouth_area / throat_area).ln() / (2.0 * length)
                }
            }
            Self::Hyperbolic {
                throat_area,
                mouth_area,
                length,
                taper,
            } => {
                if mouth_area == throat_area {
                    0.0
                } else {
                    hypex_flare_constant(throat_area, mouth_area, length, taper)
                }
            }
        }
    }

    /// The 2×2 transfer matrix of this segment at angular frequency
    /// `omega`, with `[p_in; U_in] = T·[p_out; U_out]`.
    pub fn transfer_matrix(
        &self,
        medium: &MediumProperties,
        omega: f64,
    ) -> SimResult<TransferMatrix> {
        self.validate()?;
        // Static limit: pressure and volume velocity are uniform, so
        // every lossless segment degenerates to the identity.
        if omega == 0.0 {
            return Ok(TransferMatrix::identity());
        }
        let t = match *self {
            Self::Cylindrical { area, length } => cylindrical_matrix(medium, area, length, omega),
            Self::Conical {
                throat_area,
                mouth_area,
                length,
            } => {
                if mouth_area == throat_area {
                    cylindrical_matrix(medium, throat_area, length, omega)
                } else {
                    conical_matrix(medium, throat_area, mouth_area, length, omega)
                }
            }
            Self::Exponential {
                throat_area,
                mouth_area,
                length,
            } => {
                if mouth_area == throat_area {
                    cylindrical_matrix(medium, throat_area, length, omega)
                } else {
                    exponential_matrix(medium, throat_area, mouth_area, length, omega)
                }
            }
            Self::Hyperbolic {
                throat_area,
                mouth_area,
                length,
                taper,
            } => {
                if mouth_area == throat_area {
                    cylindrical_matrix(medium, throat_area, length, omega)
                } else {
                    hyperbolic_matrix(medium, throat_area, mouth_area, length, taper, omega)
                }
            }
        };
        if !t.is_finite() {
            return Err(SimError::unstable(
                "segment transfer matrix",
                omega / (2.0 * PI),
            ));
        }
        Ok(t)
    }
}

/// Uniform duct: T = [[cos kL, jZc·sin kL], [j·sin kL/Zc, cos kL]].
fn cylindrical_matrix(
    medium: &MediumProperties,
    area: f64,
    length: f64,
    omega: f64,
) -> TransferMatrix {
    let k = medium.wave_number(omega);
    let zc = medium.characteristic_impedance(area);
    let kl = k * length;
    let cos_kl = Complex64::new(kl.cos(), 0.0);
    let j = Complex64::new(0.0, 1.0);
    TransferMatrix::new(
        cos_kl,
        j * zc * kl.sin(),
        j * kl.sin() / zc,
        cos_kl,
    )
}

/// Conical segment from the spherical-wave solution.
///
/// With apex distances r₁ = L·√S₁/(√S₂−√S₁) and r₂ = r₁ + L:
///
/// ```text
/// a = (r₂/r₁)·cos kL − sin(kL)/(k·r₁)
/// b = j·ρc·sin(kL)/√(S₁S₂)
/// c = j·(Ω/ρc)·[L²·(sin kL − kL·cos kL)/(kL)² + r₁r₂·sin kL],  Ω = S₁/r₁²
/// d = (r₁/r₂)·cos kL + sin(kL)/(k·r₂)
/// ```
///
/// The 1/k factors are folded into sinc-style kernels so the closed form
/// stays exact as ω → 0 and as S₁ → S₂ (where it converges to the
/// cylindrical matrix).
fn conical_matrix(
    medium: &MediumProperties,
    throat_area: f64,
    mouth_area: f64,
    length: f64,
    omega: f64,
) -> TransferMatrix {
    let k = medium.wave_number(omega);
    let rho_c = medium.density * medium.sound_speed;
    let sqrt_s1 = throat_area.sqrt();
    let sqrt_s2 = mouth_area.sqrt();
    let r1 = length * sqrt_s1 / (sqrt_s2 - sqrt_s1);
    let r2 = r1 + length;
    let solid_angle = throat_area / (r1 * r1);

    let x = k * length;
    let cos_x = x.cos();
    let sin_x = x.sin();
    let j = Complex64::new(0.0, 1.0);

    let a = Complex64::new((r2 / r1) * cos_x - (length / r1) * sinc(x), 0.0);
    let b = j * rho_c * sin_x / (sqrt_s1 * sqrt_s2);
    let c = j * (solid_angle / rho_c)
        * (length * length * sin_minus_xcos_over_x2(x) + r1 * r2 * sin_x);
    let d = Complex64::new((r1 / r2) * cos_x + (length / r2) * sinc(x), 0.0);
    TransferMatrix::new(a, b, c, d)
}

/// Exponential segment, flare rate m = ln(S₂/S₁)/L.
///
/// With b = m/2 and the regime kernels (C, S) of [`flare_kernels`]:
///
/// ```text
/// a = √(S₂/S₁)·(C − b·S)
/// b = j·ρc·k·S/√(S₁S₂)
/// c = j·√(S₁S₂)·k·S/ρc
/// d = √(S₁/S₂)·(C + b·S)
/// ```
///
/// The finite-horn mouth reflection is carried by the cascade: this
/// matrix is always terminated with the real mouth radiation impedance,
/// never with the infinite-horn asymptote.
fn exponential_matrix(
    medium: &MediumProperties,
    throat_area: f64,
    mouth_area: f64,
    length: f64,
    omega: f64,
) -> TransferMatrix {
    let k = medium.wave_number(omega);
    let rho_c = medium.density * medium.sound_speed;
    let flare = (mouth_area / throat_area).ln() / (2.0 * length);
    let (big_c, big_s) = flare_kernels(k, flare, length);

    let sqrt_ratio = (mouth_area / throat_area).sqrt();
    let sqrt_s1s2 = (throat_area * mouth_area).sqrt();
    let j = Complex64::new(0.0, 1.0);

    let a = Complex64::new(sqrt_ratio * (big_c - flare * big_s), 0.0);
    let b = j * rho_c * k * big_s / sqrt_s1s2;
    let c = j * sqrt_s1s2 * k * big_s / rho_c;
    let d = Complex64::new((big_c + flare * big_s) / sqrt_ratio, 0.0);
    TransferMatrix::new(a, b, c, d)
}

/// Flare constant 1/x₀ of a hypex segment, from the closed-form root of
/// cosh(L/x₀) + t·sinh(L/x₀) = √(S₂/S₁):
///
/// ```text
/// e^(L/x₀) = (R + √(R² − 1 + t²)) / (1 + t),   R = √(S₂/S₁)
/// ```
fn hypex_flare_constant(throat_area: f64, mouth_area: f64, length: f64, taper: f64) -> f64 {
    let r = (mouth_area / throat_area).sqrt();
    let y = (r + (r * r - 1.0 + taper * taper).sqrt()) / (1.0 + taper);
    y.ln() / length
}

/// Salmon hypex segment.
///
/// Substituting p = ψ/√S into the Webster equation leaves
/// ψ'' + (k² − 1/x₀²)·ψ = 0 for the whole family, so the axial kernels
/// are those of the exponential horn with flare constant 1/x₀; the area
/// terms differ through F = cosh + t·sinh and its derivative.
fn hyperbolic_matrix(
    medium: &MediumProperties,
    throat_area: f64,
    mouth_area: f64,
    length: f64,
    taper: f64,
    omega: f64,
) -> TransferMatrix {
    let k = medium.wave_number(omega);
    let rho_c = medium.density * medium.sound_speed;
    let e = hypex_flare_constant(throat_area, mouth_area, length, taper);
    let (big_c, big_s) = flare_kernels(k, e, length);

    let q = e * length;
    let ch = q.cosh();
    let sh = q.sinh();
    let r = (mouth_area / throat_area).sqrt(); // = cosh q + t·sinh q
    let g = sh + taper * ch;
    let sqrt_s1s2 = (throat_area * mouth_area).sqrt();
    let j = Complex64::new(0.0, 1.0);

    let a = Complex64::new(r * big_c - e * g * big_s, 0.0);
    let b = j * rho_c * k * big_s / sqrt_s1s2;
    // c = j·(S₁/ρc)·[k·S·R + (1−t²)·e·(C·sinh q − e·S·cosh q)/k]; the
    // second term is O(k²) and vanishes with the ω = 0 identity guard.
    let w = big_c * sh - e * big_s * ch;
    let c = j
        * (throat_area / rho_c)
        * (k * big_s * r + (1.0 - taper * taper) * e * w / k);
    let d = Complex64::new((big_c + taper * e * big_s) / r, 0.0);
    TransferMatrix::new(a, b, c, d)
}
