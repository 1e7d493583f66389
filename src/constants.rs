//! Application constants for the dissolved-oxygen processor
//!
//! Physical constants of the oxygen solubility model, the column names
//! of the logger and salinity files, and default run settings.

// =============================================================================
// Physical Constants
// =============================================================================

/// Standard atmospheric pressure in pascals
pub const STANDARD_PRESSURE_PA: f64 = 101_325.0;

/// Molar mass of O2 in g/mol, used for both unit conversion directions
pub const OXYGEN_MOLAR_MASS: f64 = 31.9988;

/// Mole fraction of oxygen in dry air
pub const OXYGEN_MOLE_FRACTION: f64 = 0.209446;

/// Offset between degrees Celsius and kelvin
pub const KELVIN_OFFSET: f64 = 273.15;

/// Scale height of the barometric approximation in metres
pub const SCALE_HEIGHT_M: f64 = 8434.5;

/// Converts the Garcia-Gordon ml/l-equivalent result to umol/kg
pub const COSTAR_SCALE: f64 = 44.6596044945426;

/// Pascals per millibar
pub const PA_PER_MBAR: f64 = 100.0;

/// Garcia-Gordon solubility coefficients
pub mod garcia_gordon {
    /// Temperature polynomial terms A0..A5
    pub const A: [f64; 6] = [2.00907, 3.22014, 4.0501, 4.94457, -0.256847, 3.88767];

    /// Salinity cross terms B0..B3
    pub const B: [f64; 4] = [-0.00624523, -0.00737614, -0.010341, -0.00817083];

    /// Pure salinity-squared term
    pub const C0: f64 = -4.88682E-7;
}

/// Water vapour pressure fit coefficients
pub mod vapor_pressure {
    pub const D0: f64 = 24.4543;
    pub const D1: f64 = -67.4509;
    pub const D2: f64 = -4.8489;
    pub const D3: f64 = -5.44E-4;
}

// =============================================================================
// Input Columns
// =============================================================================

/// Elapsed-seconds time column as written by the logger
pub const RAW_TIME_COLUMN: &str = "Time (sec)";

/// Time column name after renaming
pub const TIME_COLUMN: &str = "Time";

pub const TEMPERATURE_COLUMN: &str = "T (deg C)";
pub const DO_COLUMN: &str = "DO (mg/l)";

pub const SALINITY_TIMESTAMP_COLUMN: &str = "Timestamp";
pub const SALINITY_VALUE_COLUMN: &str = "Salinity";

/// Day-first salinity timestamps, fractional seconds optional
pub const SALINITY_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S%.f";

// =============================================================================
// Output Columns
// =============================================================================

pub const FIRST_DATE_COLUMN: &str = "First Measure Date";
pub const LAST_DATE_COLUMN: &str = "Last Measure Date";
pub const PRESSURE_LABEL: &str = "Pressure used (mbar)";
pub const ELEVATION_LABEL: &str = "Elevation used (m)";

pub const RESOLVED_SALINITY_COLUMN: &str = "Salinity";
pub const CORRECTED_DO_COLUMN: &str = "Corrected DO (mg/l)";
pub const SATURATION_COLUMN: &str = "DO Saturation (%)";
pub const USED_SALINITY_COLUMN: &str = "Used Salinity (PSU)";
pub const CORRECTED_DO_UMOL_COLUMN: &str = "Corrected DO (umol/kg)";

pub const SUMMARY_DATE_FORMAT: &str = "%Y-%m-%d";
pub const OUTPUT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Defaults
// =============================================================================

/// Extension of logger measurement files
pub const DEFAULT_MEASUREMENT_EXTENSION: &str = "txt";

/// Serial number and firmware lines preceding the column header
pub const DEFAULT_PREAMBLE_LINES: usize = 2;

pub const DEFAULT_OUTPUT_DIR: &str = "./outputs";
pub const DEFAULT_OUTPUT_FILE: &str = "DO_processed_output.csv";

/// Decimal places of the reported concentrations
pub const CONCENTRATION_DECIMALS: i32 = 6;

/// Decimal places of the salinity used in the correction
pub const SALINITY_DECIMALS: i32 = 2;
