//! Core data structures for dissolved-oxygen correction runs.
//!
//! Defines the measurement and salinity samples read from input files,
//! the corrected rows derived from them, and the per-file and per-run
//! aggregates.

use crate::config::PressureInput;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One logger reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSample {
    pub timestamp: NaiveDateTime,
    /// Water temperature in degrees Celsius
    pub temperature: f64,
    /// Raw dissolved oxygen in mg/L
    pub dissolved_oxygen: f64,
    /// Values of the pass-through columns, aligned with
    /// [`MeasurementFile::extra_columns`]
    pub extra: Vec<String>,
}

/// A salinity reference sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalinitySample {
    pub timestamp: NaiveDateTime,
    /// Salinity in PSU
    pub salinity: f64,
}

/// Contents of one logger file, rows in file order
#[derive(Debug, Clone)]
pub struct MeasurementFile {
    pub path: PathBuf,
    /// Column names of the file after trimming and renaming
    pub columns: Vec<String>,
    /// Columns other than time, temperature and DO, in file order
    pub extra_columns: Vec<String>,
    pub samples: Vec<MeasurementSample>,
}

impl MeasurementFile {
    /// First and last timestamps of the deployment
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        time_range(self.samples.iter().map(|s| s.timestamp))
    }
}

/// Correction results for a single measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectedMeasurement {
    /// Salinity of the nearest reference sample, unrounded
    pub resolved_salinity: f64,
    /// Salinity-corrected DO in mg/L, 6 decimals
    pub corrected_mg_per_liter: f64,
    /// Percent saturation at the run pressure, unrounded
    pub saturation_percent: f64,
    /// Salinity used in the correction, 2 decimals
    pub salinity_used: f64,
    /// Corrected DO in umol/kg, 6 decimals
    pub corrected_umol_per_kg: f64,
}

/// A measurement row paired with its correction
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedRow {
    pub sample: MeasurementSample,
    pub corrected: CorrectedMeasurement,
}

/// Corrected rows of one source file
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: PathBuf,
    pub columns: Vec<String>,
    pub extra_columns: Vec<String>,
    pub rows: Vec<CorrectedRow>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        time_range(self.rows.iter().map(|r| r.sample.timestamp))
    }
}

/// Metadata record written ahead of the data rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub first_timestamp: NaiveDateTime,
    pub last_timestamp: NaiveDateTime,
    pub pressure_input: PressureInput,
}

/// All datasets of a run in processing order
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub summary: BatchSummary,
    pub datasets: Vec<Dataset>,
}

impl BatchResult {
    /// Number of data rows, excluding the summary record
    pub fn total_rows(&self) -> usize {
        self.datasets.iter().map(Dataset::len).sum()
    }

    /// Data rows across all datasets in file-then-row order
    pub fn rows(&self) -> impl Iterator<Item = &CorrectedRow> {
        self.datasets.iter().flat_map(|d| d.rows.iter())
    }
}

/// Statistics reported after a run
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub total_rows: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
    /// First and last measurement timestamp of the run
    pub date_range: Option<(NaiveDateTime, NaiveDateTime)>,
}

fn time_range(
    mut timestamps: impl Iterator<Item = NaiveDateTime>,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let first = timestamps.next()?;
    Some(timestamps.fold((first, first), |(min, max), ts| (min.min(ts), max.max(ts))))
}
