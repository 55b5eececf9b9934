use serde::{Deserialize, Serialize};

/// Physical properties of the propagation medium.
///
/// An immutable value object passed explicitly into every computation;
/// nothing in the engine reads a global default mid-evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediumProperties {
    /// Density ρ in kg/m³.
    pub density: f64,
    /// Speed of sound c in m/s.
    pub sound_speed: f64,
    /// Dynamic viscosity μ in Pa·s.
    pub viscosity: f64,
    /// Thermal diffusivity α in m²/s.
    pub thermal_diffusivity: f64,
}

impl MediumProperties {
    /// Air properties at temperature `temperature_c` (°C) and standard
    /// pressure, using the ideal-gas approximation.
    pub fn air_at(temperature_c: f64) -> Self {
        let t_kelvin = temperature_c + 273.15;
        // c = 331.3 * sqrt(T/273.15)
        let sound_speed = 331.3 * (t_kelvin / 273.15).sqrt();
        // ρ = p / (R_specific * T), with p = 101325 Pa, R_specific = 287.05 J/(kg·K)
        let density = 101325.0 / (287.05 * t_kelvin);
        // Sutherland's law for air: μ_ref = 1.716e-5 Pa·s at 273.15 K, S = 110.4 K
        let viscosity =
            1.716e-5 * (t_kelvin / 273.15).powf(1.5) * (273.15 + 110.4) / (t_kelvin + 110.4);
        // α = κ / (ρ·cp), κ ≈ 0.0262 W/(m·K), cp = 1005 J/(kg·K) near room temperature
        let thermal_diffusivity = 0.0262 / (density * 1005.0);
        Self {
            density,
            sound_speed,
            viscosity,
            thermal_diffusivity,
        }
    }

    /// Characteristic impedance ρc/S of a duct of cross-section `area` (m²).
    pub fn characteristic_impedance(&self, area: f64) -> f64 {
        self.density * self.sound_speed / area
    }

    /// Wave number k = ω/c.
    pub fn wave_number(&self, omega: f64) -> f64 {
        omega / self.sound_speed
    }
}

impl Default for MediumProperties {
    /// Air at 20 °C.
    fn default() -> Self {
        Self::air_at(20.0)
    }
}

/// Cross-sectional area from diameter (both in metres).
pub fn area_from_diameter(diameter: f64) -> f64 {
    std::f64::consts::PI * (diameter / 2.0).powi(2)
}
