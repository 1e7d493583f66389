//! Oxygen solubility model.
//!
//! Garcia & Gordon (1992) reference solubility, a water vapour pressure fit,
//! and the partial-pressure correction to an arbitrary total pressure.
//! Temperatures are in degrees Celsius, salinities in PSU, pressures in Pa.
//! All functions are pure.

use crate::constants::{
    COSTAR_SCALE, KELVIN_OFFSET, OXYGEN_MOLAR_MASS, OXYGEN_MOLE_FRACTION, SCALE_HEIGHT_M,
    STANDARD_PRESSURE_PA, vapor_pressure,
};

/// Saturated water vapour pressure as a fraction of total pressure
pub fn saturated_vapor_pressure(temperature: f64, salinity: f64) -> f64 {
    let tk = temperature + KELVIN_OFFSET;
    (vapor_pressure::D0
        + vapor_pressure::D1 * 100.0 / tk
        + vapor_pressure::D2 * (tk / 100.0).ln()
        + vapor_pressure::D3 * salinity)
        .exp()
}

/// Reference oxygen solubility (CoStar) at one standard atmosphere, in umol/kg
pub fn reference_solubility(temperature: f64, salinity: f64) -> f64 {
    use crate::constants::garcia_gordon::{A, B, C0};

    let ts = ((298.15 - temperature) / (KELVIN_OFFSET + temperature)).ln();
    let temperature_terms = A[0]
        + A[1] * ts
        + A[2] * ts.powi(2)
        + A[3] * ts.powi(3)
        + A[4] * ts.powi(4)
        + A[5] * ts.powi(5);
    let salinity_terms = salinity * (B[0] + B[1] * ts + B[2] * ts.powi(2) + B[3] * ts.powi(3));

    (temperature_terms + salinity_terms + C0 * salinity.powi(2)).exp() * COSTAR_SCALE
}

/// Partial pressure of oxygen for a (relative) dry-air pressure
pub fn oxygen_partial_pressure(pressure: f64) -> f64 {
    OXYGEN_MOLE_FRACTION * pressure
}

/// Oxygen solubility at total pressure `pressure_pa`, in umol/kg
///
/// Identical to [`reference_solubility`] at [`STANDARD_PRESSURE_PA`]: the
/// pressure ratio is evaluated first so it collapses to exactly 1.0.
pub fn solubility_at_pressure(temperature: f64, pressure_pa: f64, salinity: f64) -> f64 {
    let total = pressure_pa / STANDARD_PRESSURE_PA;
    let water_vapor = saturated_vapor_pressure(temperature, salinity);
    let measured = oxygen_partial_pressure(total - water_vapor);
    let reference = oxygen_partial_pressure(1.0 - water_vapor);

    reference_solubility(temperature, salinity) * (measured / reference)
}

/// Oxygen solubility at total pressure `pressure_pa`, in mg/L
pub fn solubility_mg_per_liter(temperature: f64, pressure_pa: f64, salinity: f64) -> f64 {
    to_mg_per_liter(solubility_at_pressure(temperature, pressure_pa, salinity))
}

/// Ratio of solubility at `salinity` to freshwater solubility, both at
/// standard pressure. Exactly 1.0 for freshwater.
pub fn salinity_factor(temperature: f64, salinity: f64) -> f64 {
    if salinity != 0.0 {
        solubility_mg_per_liter(temperature, STANDARD_PRESSURE_PA, salinity)
            / solubility_mg_per_liter(temperature, STANDARD_PRESSURE_PA, 0.0)
    } else {
        1.0
    }
}

pub fn to_mg_per_liter(umol_per_kg: f64) -> f64 {
    umol_per_kg * OXYGEN_MOLAR_MASS / 1000.0
}

pub fn to_umol_per_kg(mg_per_liter: f64) -> f64 {
    mg_per_liter * 1000.0 / OXYGEN_MOLAR_MASS
}

/// Barometric approximation of total pressure (Pa) at an elevation in metres
pub fn elevation_to_pressure(elevation_m: f64) -> f64 {
    STANDARD_PRESSURE_PA * (-elevation_m / SCALE_HEIGHT_M).exp()
}
