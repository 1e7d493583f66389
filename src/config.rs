//! Configuration management and validation.
//!
//! Provides the pressure regime of a run and the processing settings
//! (file filtering, preamble handling, concurrency, output location).

use crate::constants::{
    DEFAULT_MEASUREMENT_EXTENSION, DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_FILE, DEFAULT_PREAMBLE_LINES,
    ELEVATION_LABEL, PA_PER_MBAR, PRESSURE_LABEL,
};
use crate::error::{DoError, Result};
use crate::solubility::elevation_to_pressure;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// The single pressure regime applied to every measurement of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PressureInput {
    /// Ambient pressure entered directly, in millibars
    Pressure { mbar: f64 },
    /// Site elevation in metres, converted with the barometric formula
    Elevation { meters: f64 },
}

impl PressureInput {
    /// Build from a mode letter (`p` or `e`, any case) and the value fields.
    ///
    /// Exactly one of `pressure_mbar` and `elevation_m` must be given, and it
    /// must be the one the mode selects.
    pub fn from_mode(
        mode: &str,
        pressure_mbar: Option<f64>,
        elevation_m: Option<f64>,
    ) -> Result<Self> {
        if pressure_mbar.is_some() && elevation_m.is_some() {
            return Err(DoError::configuration(
                "pressure_input",
                "supply either a pressure or an elevation, not both",
            ));
        }

        let input = match mode.trim().to_ascii_lowercase().as_str() {
            "p" => Self::Pressure {
                mbar: pressure_mbar.ok_or_else(|| {
                    DoError::configuration("pressure", "pressure mode selected but no value given")
                })?,
            },
            "e" => Self::Elevation {
                meters: elevation_m.ok_or_else(|| {
                    DoError::configuration(
                        "elevation",
                        "elevation mode selected but no value given",
                    )
                })?,
            },
            other => {
                return Err(DoError::configuration(
                    "pressure_input_type",
                    format!("invalid input type '{other}', expected 'p' or 'e'"),
                ));
            }
        };

        input.validate()?;
        debug!("Pressure input: {} = {}", input.label(), input.value());
        Ok(input)
    }

    /// Reject non-finite values
    pub fn validate(&self) -> Result<()> {
        let (parameter, value) = match self {
            Self::Pressure { mbar } => ("pressure", *mbar),
            Self::Elevation { meters } => ("elevation", *meters),
        };
        if !value.is_finite() {
            return Err(DoError::configuration(
                parameter,
                format!("value must be a finite number, got {value}"),
            ));
        }
        Ok(())
    }

    /// Total pressure of the run in pascals
    pub fn pascals(&self) -> f64 {
        match self {
            Self::Pressure { mbar } => mbar * PA_PER_MBAR,
            Self::Elevation { meters } => elevation_to_pressure(*meters),
        }
    }

    /// Header of the summary column carrying [`Self::value`]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pressure { .. } => PRESSURE_LABEL,
            Self::Elevation { .. } => ELEVATION_LABEL,
        }
    }

    /// The value as the user entered it (mbar or m)
    pub fn value(&self) -> f64 {
        match self {
            Self::Pressure { mbar } => *mbar,
            Self::Elevation { meters } => *meters,
        }
    }
}

/// Settings for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Extension of measurement files picked up from the input directory
    pub measurement_extension: String,

    /// Lines skipped before the column header of a measurement file
    pub preamble_lines: usize,

    /// Maximum files processed concurrently
    pub max_concurrent_files: usize,

    /// Show a progress bar while processing
    pub show_progress: bool,

    /// Location of the combined CSV
    pub output_path: PathBuf,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            measurement_extension: DEFAULT_MEASUREMENT_EXTENSION.to_string(),
            preamble_lines: DEFAULT_PREAMBLE_LINES,
            max_concurrent_files: num_cpus::get().max(1),
            show_progress: false,
            output_path: PathBuf::from(DEFAULT_OUTPUT_DIR).join(DEFAULT_OUTPUT_FILE),
        }
    }
}

impl ProcessorConfig {
    /// Set the measurement file extension (without the dot)
    pub fn with_measurement_extension(mut self, extension: impl Into<String>) -> Self {
        self.measurement_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Set the number of preamble lines
    pub fn with_preamble_lines(mut self, lines: usize) -> Self {
        self.preamble_lines = lines;
        self
    }

    /// Set maximum concurrent files
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Enable the progress bar
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Set the output CSV path
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(DoError::configuration(
                "max_concurrent_files",
                "must be at least 1",
            ));
        }
        if self.measurement_extension.is_empty() {
            return Err(DoError::configuration(
                "measurement_extension",
                "must not be empty",
            ));
        }
        Ok(())
    }
}
