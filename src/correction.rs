//! Per-measurement salinity correction and saturation.
//!
//! The salinity factor is defined at standard pressure, while saturation
//! is relative to the solubility at the run's in-situ pressure.

use crate::constants::{CONCENTRATION_DECIMALS, SALINITY_DECIMALS};
use crate::models::{CorrectedMeasurement, CorrectedRow, MeasurementSample};
use crate::salinity::SalinityResolver;
use crate::solubility::{salinity_factor, solubility_mg_per_liter, to_umol_per_kg};

/// Round to `decimals` places, ties to even on the scaled value
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Applies the correction for one fixed run pressure
#[derive(Debug, Clone, Copy)]
pub struct CorrectionEngine {
    pressure_pa: f64,
}

impl CorrectionEngine {
    pub fn new(pressure_pa: f64) -> Self {
        Self { pressure_pa }
    }

    pub fn pressure_pa(&self) -> f64 {
        self.pressure_pa
    }

    /// Salinity-corrected DO (mg/L, unrounded) and the salinity used
    pub fn corrected_do(&self, sample: &MeasurementSample, salinity: f64) -> (f64, f64) {
        let salinity = round_to(salinity, SALINITY_DECIMALS);
        let corrected = sample.dissolved_oxygen * salinity_factor(sample.temperature, salinity);
        (corrected, salinity)
    }

    /// Percent saturation of the corrected DO at the run pressure
    pub fn saturation(&self, sample: &MeasurementSample, salinity: f64) -> f64 {
        let (corrected, salinity) = self.corrected_do(sample, salinity);
        let max_concentration =
            solubility_mg_per_liter(sample.temperature, self.pressure_pa, salinity);
        corrected / max_concentration * 100.0
    }

    /// Full output record for a sample and its resolved salinity
    pub fn correct(&self, sample: &MeasurementSample, salinity: f64) -> CorrectedMeasurement {
        let (corrected, salinity_used) = self.corrected_do(sample, salinity);
        let corrected_mg_per_liter = round_to(corrected, CONCENTRATION_DECIMALS);

        CorrectedMeasurement {
            resolved_salinity: salinity,
            corrected_mg_per_liter,
            saturation_percent: self.saturation(sample, salinity),
            salinity_used: round_to(salinity_used, SALINITY_DECIMALS),
            // Derived from the rounded mg/L value
            corrected_umol_per_kg: round_to(
                to_umol_per_kg(corrected_mg_per_liter),
                CONCENTRATION_DECIMALS,
            ),
        }
    }

    /// Resolve salinity for every sample and correct it, preserving order
    pub fn correct_all(
        &self,
        samples: Vec<MeasurementSample>,
        resolver: &SalinityResolver,
    ) -> Vec<CorrectedRow> {
        samples
            .into_iter()
            .map(|sample| {
                let salinity = resolver.resolve(sample.timestamp);
                let corrected = self.correct(&sample, salinity);
                CorrectedRow { sample, corrected }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STANDARD_PRESSURE_PA;
    use crate::models::SalinitySample;
    use crate::solubility::elevation_to_pressure;
    use chrono::{DateTime, NaiveDateTime};

    fn assert_approx_eq(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    fn at(seconds: i64) -> NaiveDateTime {
        DateTime::from_timestamp(seconds, 0).unwrap().naive_utc()
    }

    fn reading(seconds: i64, temperature: f64, dissolved_oxygen: f64) -> MeasurementSample {
        MeasurementSample {
            timestamp: at(seconds),
            temperature,
            dissolved_oxygen,
            extra: Vec::new(),
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.3456, 2), 12.35);
        assert_eq!(round_to(-0.125, 2), -0.12);
        assert_eq!(round_to(30.125, 2), 30.12);
        assert_eq!(round_to(30.375, 2), 30.38);
        assert_eq!(round_to(8.0, 6), 8.0);
    }

    #[test]
    fn test_freshwater_correction_is_identity() {
        let engine = CorrectionEngine::new(STANDARD_PRESSURE_PA);
        let sample = reading(0, 20.0, 8.0);

        let (corrected, salinity) = engine.corrected_do(&sample, 0.0);
        assert_eq!(corrected, 8.0);
        assert_eq!(salinity, 0.0);

        let expected = 8.0 / solubility_mg_per_liter(20.0, STANDARD_PRESSURE_PA, 0.0) * 100.0;
        assert_eq!(engine.saturation(&sample, 0.0), expected);
        assert_approx_eq(expected, 87.98886, 1e-4);
    }

    #[test]
    fn test_salinity_is_rounded_before_use() {
        let engine = CorrectionEngine::new(STANDARD_PRESSURE_PA);
        let sample = reading(0, 15.0, 7.5);

        let (rounded_input, used) = engine.corrected_do(&sample, 31.2549);
        let (exact_input, _) = engine.corrected_do(&sample, 31.25);
        assert_eq!(used, 31.25);
        assert_eq!(rounded_input, exact_input);

        // Exact binary ties go to the even digit
        let (tied, used) = engine.corrected_do(&sample, 30.125);
        let (even, _) = engine.corrected_do(&sample, 30.12);
        assert_eq!(used, 30.12);
        assert_eq!(tied, even);

        // Rounds to zero, so no correction at all
        let (corrected, used) = engine.corrected_do(&sample, 0.004);
        assert_eq!(used, 0.0);
        assert_eq!(corrected, 7.5);
    }

    #[test]
    fn test_seawater_lowers_concentration() {
        let engine = CorrectionEngine::new(STANDARD_PRESSURE_PA);
        let record = engine.correct(&reading(0, 20.0, 8.0), 35.0);

        assert_approx_eq(record.corrected_mg_per_liter, 8.0 * 0.813362, 1e-5);
        assert_eq!(record.salinity_used, 35.0);
        assert_eq!(record.resolved_salinity, 35.0);
    }

    #[test]
    fn test_saturation_uses_run_pressure() {
        let sea_level = CorrectionEngine::new(STANDARD_PRESSURE_PA);
        let upland = CorrectionEngine::new(elevation_to_pressure(500.0));
        let sample = reading(0, 20.0, 8.0);

        // Same corrected concentration, higher saturation at lower pressure
        assert_eq!(
            sea_level.corrected_do(&sample, 10.0),
            upland.corrected_do(&sample, 10.0)
        );
        assert!(upland.saturation(&sample, 10.0) > sea_level.saturation(&sample, 10.0));
        assert_approx_eq(upland.saturation(&reading(0, 20.0, 8.0), 0.0), 93.49734, 1e-3);
    }

    #[test]
    fn test_output_rounding() {
        let engine = CorrectionEngine::new(STANDARD_PRESSURE_PA);
        let record = engine.correct(&reading(0, 12.3, 9.87654321), 27.345);

        assert_eq!(round_to(record.corrected_mg_per_liter, 6), record.corrected_mg_per_liter);
        assert_eq!(round_to(record.corrected_umol_per_kg, 6), record.corrected_umol_per_kg);
        assert_eq!(record.salinity_used, round_to(27.345, 2));
        assert_approx_eq(
            record.corrected_umol_per_kg,
            record.corrected_mg_per_liter * 1000.0 / 31.9988,
            1e-6,
        );
    }

    #[test]
    fn test_correct_all_preserves_order() {
        let engine = CorrectionEngine::new(STANDARD_PRESSURE_PA);
        let resolver = SalinityResolver::new(&[
            SalinitySample {
                timestamp: at(0),
                salinity: 0.0,
            },
            SalinitySample {
                timestamp: at(3_600),
                salinity: 30.0,
            },
        ])
        .unwrap();

        let samples = vec![
            reading(3_000, 18.0, 7.0),
            reading(0, 18.0, 7.0),
            reading(600, 18.0, 7.0),
        ];
        let rows = engine.correct_all(samples.clone(), &resolver);

        assert_eq!(rows.len(), 3);
        for (row, sample) in rows.iter().zip(&samples) {
            assert_eq!(&row.sample, sample);
        }
        assert_eq!(rows[0].corrected.salinity_used, 30.0);
        assert_eq!(rows[1].corrected.corrected_mg_per_liter, 7.0);
        assert_eq!(rows[2].corrected.resolved_salinity, 0.0);
    }
}
