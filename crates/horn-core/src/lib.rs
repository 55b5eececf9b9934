//! Frequency-domain simulation of loudspeaker drivers coupled to
//! horn-loaded enclosures.
//!
//! The engine is a chain of pure computations: per-segment horn
//! transfer matrices ([`segments`]), a throat→mouth cascade composer
//! ([`profile`]), chamber compliance models ([`chamber`]), and the
//! electrical-mechanical-acoustic coupling solver ([`driver`]), driven
//! across a frequency grid by [`sweep`]. Every input is an immutable
//! value object and every call returns fresh data, so callers may
//! parallelize across frequencies or whole designs without locking.

pub mod chamber;
pub mod driver;
pub mod error;
pub mod medium;
pub mod profile;
pub mod response;
pub mod segments;
pub mod special;
pub mod transfer_matrix;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use chamber::{ChamberSet, ModalModel, Placement, RearChamber, ThroatChamber};
pub use driver::{solve_coupling, CouplingSolution, DriverParameters};
pub use error::{SimError, SimResult};
pub use medium::MediumProperties;
pub use profile::HornProfile;
pub use response::{log_spaced, Band, FrequencyPoint, ResponseCurve};
pub use segments::{HornSegment, WaveRegime};
pub use transfer_matrix::TransferMatrix;

use chamber::compose;
use special::piston_radiation_impedance;

/// Evaluate one fully specified system at a single frequency.
///
/// Topology and reference plane:
///
/// - With a horn profile, the acoustic load is the horn's throat
///   impedance (mouth terminated by the piston-in-baffle radiation
///   model), composed with the throat chamber at the throat plane; the
///   reference area is the horn THROAT area. The driver's rear sees the
///   rear chamber if present, otherwise it is unloaded.
/// - Without a profile the driver is a direct radiator in an infinite
///   baffle: the front load is the diaphragm's own piston radiation,
///   the rear is either the rear chamber or the opposite half-space
///   radiation, and the reference area is the diaphragm area.
pub fn evaluate(
    driver: &DriverParameters,
    horn: Option<&HornProfile>,
    chambers: &ChamberSet,
    medium: &MediumProperties,
    voltage: f64,
    frequency: f64,
) -> SimResult<FrequencyPoint> {
    driver.validate()?;
    if !(frequency > 0.0) || !frequency.is_finite() {
        return Err(SimError::geometry("frequency", frequency));
    }
    let omega = 2.0 * std::f64::consts::PI * frequency;

    let (z_front, reference_area) = match horn {
        Some(profile) => {
            let z_horn = profile.baffled_throat_impedance(medium, frequency)?;
            let z_front = match &chambers.throat {
                Some(tc) => compose(tc.placement(), z_horn, tc.impedance(medium, omega)?),
                None => z_horn,
            };
            (z_front, profile.throat_area()?)
        }
        None => {
            if chambers.throat.is_some() {
                return Err(SimError::UnsupportedConfiguration {
                    reason: "throat chamber requires a horn profile".into(),
                });
            }
            (
                piston_radiation_impedance(medium, driver.sd, omega),
                driver.sd,
            )
        }
    };

    let z_acoustic = match &chambers.rear {
        Some(rc) => compose(rc.placement(), z_front, rc.impedance(medium, omega)?),
        // A bare direct radiator also radiates from its rear face into
        // the other half-space; a horn driver's rear is left unloaded.
        None => match horn {
            Some(_) => z_front,
            None => z_front + piston_radiation_impedance(medium, driver.sd, omega),
        },
    };

    let solution = solve_coupling(driver, z_acoustic, reference_area, voltage, frequency)?;
    let spl_db = response::spl_from_volume_velocity(solution.volume_velocity, z_front.re);

    Ok(FrequencyPoint {
        frequency,
        electrical_impedance: solution.electrical_impedance,
        volume_velocity: solution.volume_velocity,
        spl_db,
    })
}

/// Sweep the system across `frequencies`, evaluating each point
/// independently. A single failing point fails the sweep with the
/// offending frequency rather than being silently replaced.
pub fn sweep(
    driver: &DriverParameters,
    horn: Option<&HornProfile>,
    chambers: &ChamberSet,
    medium: &MediumProperties,
    voltage: f64,
    frequencies: &[f64],
) -> SimResult<ResponseCurve> {
    debug!(points = frequencies.len(), "frequency sweep");
    let mut points = Vec::with_capacity(frequencies.len());
    for &frequency in frequencies {
        points.push(evaluate(driver, horn, chambers, medium, voltage, frequency)?);
    }
    Ok(ResponseCurve::new(points, voltage))
}

/// A fully specified system: driver, optional horn, chambers, and
/// drive voltage. Convenience wrapper over [`evaluate`]/[`sweep`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HornSystem {
    pub driver: DriverParameters,
    pub horn: Option<HornProfile>,
    pub chambers: ChamberSet,
    /// Drive voltage amplitude in V.
    pub drive_voltage: f64,
}

impl HornSystem {
    pub fn evaluate(
        &self,
        medium: &MediumProperties,
        frequency: f64,
    ) -> SimResult<FrequencyPoint> {
        evaluate(
            &self.driver,
            self.horn.as_ref(),
            &self.chambers,
            medium,
            self.drive_voltage,
            frequency,
        )
    }

    pub fn sweep(
        &self,
        medium: &MediumProperties,
        frequencies: &[f64],
    ) -> SimResult<ResponseCurve> {
        sweep(
            &self.driver,
            self.horn.as_ref(),
            &self.chambers,
            medium,
            self.drive_voltage,
            frequencies,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn air() -> MediumProperties {
        MediumProperties::air_at(20.0)
    }

    /// Re 5.3 Ω, Le 0.5 mH, BL 12.4 T·m, Mms 28 g, fs 30 Hz, Qms 3.5,
    /// Sd 220 cm².
    fn test_driver() -> DriverParameters {
        DriverParameters::from_resonance(5.3, 0.5e-3, 12.4, 0.028, 30.0, 3.5, 0.022)
    }

    fn exponential_horn() -> HornProfile {
        HornProfile::single(HornSegment::Exponential {
            throat_area: 0.005,
            mouth_area: 0.05,
            length: 0.3,
        })
    }

    #[test]
    fn test_infinite_baffle_impedance_peaks_near_free_resonance() {
        // The radiation mass load pulls the peak slightly below the
        // unloaded mechanical resonance; it must stay within 5 Hz.
        let driver = test_driver();
        let grid = log_spaced(10.0, 200.0, 400);
        let curve = sweep(
            &driver,
            None,
            &ChamberSet::none(),
            &air(),
            2.83,
            &grid,
        )
        .unwrap();
        let peak = curve.impedance_peak().unwrap();
        assert!(
            (peak - driver.resonance_frequency()).abs() < 5.0,
            "peak {peak} Hz vs fs {}",
            driver.resonance_frequency()
        );
    }

    #[test]
    fn test_rear_chamber_strictly_raises_resonance() {
        let driver = test_driver();
        let grid = log_spaced(10.0, 200.0, 400);
        let peak = |chambers: &ChamberSet| {
            sweep(&driver, None, chambers, &air(), 2.83, &grid)
                .unwrap()
                .impedance_peak()
                .unwrap()
        };
        let free = peak(&ChamberSet::none());
        let large_box = peak(&ChamberSet::none().with_rear(RearChamber::new(0.1)));
        let small_box = peak(&ChamberSet::none().with_rear(RearChamber::new(0.02)));
        // Monotonic stiffening: any sealed volume raises the resonance,
        // and a smaller volume raises it further.
        assert!(large_box > free, "100 l box: {large_box} vs free {free}");
        assert!(small_box > large_box, "20 l box: {small_box} vs {large_box}");
    }

    #[test]
    fn test_direct_radiator_response_metrics() {
        let driver = test_driver();
        let grid = log_spaced(10.0, 1000.0, 300);
        let curve = sweep(&driver, None, &ChamberSet::none(), &air(), 2.83, &grid).unwrap();

        let max_spl = curve
            .points()
            .iter()
            .map(|p| p.spl_db)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(
            (85.0..93.0).contains(&max_spl),
            "passband SPL out of range: {max_spl}"
        );

        // The simulated −3 dB point of this system sits near 130 Hz,
        // well above the driver's 30 Hz free resonance, because the
        // motional impedance suppresses current through the lower band.
        let cutoff = curve.cutoff_frequency().unwrap();
        assert!(
            (100.0..200.0).contains(&cutoff),
            "unexpected cutoff: {cutoff}"
        );

        let efficiency = curve.efficiency(Band::new(200.0, 800.0)).unwrap();
        assert!(
            (0.002..0.02).contains(&efficiency),
            "unexpected efficiency: {efficiency}"
        );
    }

    #[test]
    fn test_horn_system_sweeps_cleanly() {
        let system = HornSystem {
            driver: test_driver(),
            horn: Some(exponential_horn()),
            chambers: ChamberSet::none().with_rear(RearChamber::new(0.02)),
            drive_voltage: 2.83,
        };
        let grid = log_spaced(10.0, 20_000.0, 240);
        let curve = system.sweep(&air(), &grid).unwrap();
        assert_eq!(curve.points().len(), 240);
        for p in curve.points() {
            assert!(
                p.electrical_impedance.re.is_finite() && p.spl_db.is_finite(),
                "non-finite result at {} Hz",
                p.frequency
            );
            // A passive system can never present a negative resistance.
            assert!(
                p.electrical_impedance.re > 0.0,
                "negative resistance at {} Hz",
                p.frequency
            );
        }
    }

    #[test]
    fn test_horn_loading_beats_direct_radiator_near_cutoff() {
        // Around twice the flare cutoff the horn's resistive throat
        // load converts more electrical power to sound than the bare
        // diaphragm does.
        let driver = test_driver();
        let horn = exponential_horn();
        let chambers = ChamberSet::none().with_rear(RearChamber::new(0.02));
        let grid = log_spaced(250.0, 350.0, 30);
        let horn_eff = sweep(&driver, Some(&horn), &chambers, &air(), 2.83, &grid)
            .unwrap()
            .efficiency(Band::new(250.0, 350.0))
            .unwrap();
        let direct_eff = sweep(&driver, None, &ChamberSet::none(), &air(), 2.83, &grid)
            .unwrap()
            .efficiency(Band::new(250.0, 350.0))
            .unwrap();
        assert!(
            horn_eff > direct_eff,
            "horn {horn_eff} should beat direct {direct_eff} here"
        );
    }

    #[test]
    fn test_throat_chamber_changes_the_response() {
        let driver = test_driver();
        let horn = exponential_horn();
        let base = ChamberSet::none().with_rear(RearChamber::new(0.02));
        let with_tc = base.with_throat(ThroatChamber::new(1e-4, 0.005));
        let f = 500.0;
        let a = evaluate(&driver, Some(&horn), &base, &air(), 2.83, f).unwrap();
        let b = evaluate(&driver, Some(&horn), &with_tc, &air(), 2.83, f).unwrap();
        assert!(
            (a.spl_db - b.spl_db).abs() > 0.2,
            "throat chamber should shift the response: {} vs {}",
            a.spl_db,
            b.spl_db
        );
    }

    #[test]
    fn test_throat_chamber_without_horn_rejected() {
        let driver = test_driver();
        let chambers = ChamberSet::none().with_throat(ThroatChamber::new(1e-4, 0.005));
        assert!(matches!(
            evaluate(&driver, None, &chambers, &air(), 2.83, 100.0),
            Err(SimError::UnsupportedConfiguration { .. })
        ));
    }

    #[test]
    fn test_sweep_fails_on_bad_point() {
        let driver = test_driver();
        let frequencies = [100.0, 0.0, 400.0];
        match sweep(
            &driver,
            None,
            &ChamberSet::none(),
            &air(),
            2.83,
            &frequencies,
        ) {
            Err(SimError::InvalidGeometry { parameter, value }) => {
                assert_eq!(parameter, "frequency");
                assert_eq!(value, 0.0);
            }
            other => panic!("expected explicit failure, got {other:?}"),
        }
    }

    #[test]
    fn test_evaluation_is_pure() {
        // Same inputs, same outputs; nothing is cached or mutated.
        let system = HornSystem {
            driver: test_driver(),
            horn: Some(exponential_horn()),
            chambers: ChamberSet::none(),
            drive_voltage: 2.83,
        };
        let a = system.evaluate(&air(), 440.0).unwrap();
        let b = system.evaluate(&air(), 440.0).unwrap();
        assert_eq!(a, b);
    }
}
