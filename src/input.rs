//! Readers for logger measurement files and salinity reference files.
//!
//! Measurement files carry a short preamble (serial number, firmware/calibration
//! line) ahead of a comma-separated table whose header cells are padded with
//! spaces:
//!
//! ```text
//! 7450-123456
//! OS REV: 1.00 Sensor Cal: 1
//!   Time (sec),  BV (Volts),  T (deg C),  DO (mg/l),  Q ()
//! 1537808400,  3.57,  21.9,  8.2,  0.93
//! ```
//!
//! Salinity files are plain CSV with `Timestamp` (`dd/mm/YYYY HH:MM:SS`) and
//! `Salinity` columns.

use crate::constants::{
    DO_COLUMN, RAW_TIME_COLUMN, SALINITY_TIMESTAMP_COLUMN, SALINITY_TIMESTAMP_FORMAT,
    SALINITY_VALUE_COLUMN, TEMPERATURE_COLUMN, TIME_COLUMN,
};
use crate::error::{DoError, Result};
use crate::models::{MeasurementFile, MeasurementSample, SalinitySample};
use chrono::{DateTime, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Read a measurement file, skipping `preamble_lines` lines before the header
pub fn load_measurement_file(path: &Path, preamble_lines: usize) -> Result<MeasurementFile> {
    let file = File::open(path).map_err(|e| DoError::file_io(path, e))?;
    let mut reader = BufReader::new(file);

    let mut line = String::new();
    for _ in 0..preamble_lines {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| DoError::file_io(path, e))?;
        if read == 0 {
            return Err(DoError::InvalidFormat {
                path: path.to_path_buf(),
                reason: format!("file ends inside the {preamble_lines}-line preamble"),
            });
        }
    }

    let measurements = parse_measurements(reader, path, preamble_lines)?;
    debug!(
        "Loaded {} measurements from {}",
        measurements.samples.len(),
        path.display()
    );
    Ok(measurements)
}

/// Parse the tabular part of a measurement file.
///
/// `line_offset` is the number of lines consumed before `reader`, used for
/// error line numbers.
pub fn parse_measurements<R: Read>(
    reader: R,
    path: &Path,
    line_offset: usize,
) -> Result<MeasurementFile> {
    let mut csv = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let columns: Vec<String> = csv
        .headers()
        .map_err(|e| invalid_format(path, &e))?
        .iter()
        .map(|name| match clean_header(name) {
            RAW_TIME_COLUMN => TIME_COLUMN.to_string(),
            other => other.to_string(),
        })
        .collect();

    let time_idx = column_index(&columns, TIME_COLUMN, path)?;
    let temperature_idx = column_index(&columns, TEMPERATURE_COLUMN, path)?;
    let do_idx = column_index(&columns, DO_COLUMN, path)?;

    let extra_indices: Vec<usize> = (0..columns.len())
        .filter(|i| ![time_idx, temperature_idx, do_idx].contains(i))
        .collect();
    let extra_columns = extra_indices.iter().map(|&i| columns[i].clone()).collect();

    let mut samples = Vec::new();
    for (row, record) in csv.records().enumerate() {
        let record = record.map_err(|e| invalid_format(path, &e))?;
        // Header occupies the first line after the offset
        let line = line_offset + row + 2;

        let time_value = field(&record, time_idx);
        let timestamp =
            parse_epoch_seconds(time_value).ok_or_else(|| DoError::InvalidTimestamp {
                path: path.to_path_buf(),
                line,
                value: time_value.to_string(),
            })?;

        samples.push(MeasurementSample {
            timestamp,
            temperature: parse_number(&record, temperature_idx, &columns, path, line)?,
            dissolved_oxygen: parse_number(&record, do_idx, &columns, path, line)?,
            extra: extra_indices
                .iter()
                .map(|&i| field(&record, i).to_string())
                .collect(),
        });
    }

    Ok(MeasurementFile {
        path: path.to_path_buf(),
        columns,
        extra_columns,
        samples,
    })
}

/// Read a salinity reference file
pub fn load_salinity_file(path: &Path) -> Result<Vec<SalinitySample>> {
    let file = File::open(path).map_err(|e| DoError::file_io(path, e))?;
    let samples = parse_salinity(BufReader::new(file), path)?;
    debug!(
        "Loaded {} salinity samples from {}",
        samples.len(),
        path.display()
    );
    Ok(samples)
}

/// Parse salinity samples, keeping file order
pub fn parse_salinity<R: Read>(reader: R, path: &Path) -> Result<Vec<SalinitySample>> {
    let mut csv = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let columns: Vec<String> = csv
        .headers()
        .map_err(|e| invalid_format(path, &e))?
        .iter()
        .map(|name| clean_header(name).to_string())
        .collect();
    let timestamp_idx = column_index(&columns, SALINITY_TIMESTAMP_COLUMN, path)?;
    let salinity_idx = column_index(&columns, SALINITY_VALUE_COLUMN, path)?;

    let mut samples = Vec::new();
    for (row, record) in csv.records().enumerate() {
        let record = record.map_err(|e| invalid_format(path, &e))?;
        let line = row + 2;

        let value = field(&record, timestamp_idx);
        let timestamp = NaiveDateTime::parse_from_str(value, SALINITY_TIMESTAMP_FORMAT).map_err(
            |_| DoError::InvalidTimestamp {
                path: path.to_path_buf(),
                line,
                value: value.to_string(),
            },
        )?;

        samples.push(SalinitySample {
            timestamp,
            salinity: parse_number(&record, salinity_idx, &columns, path, line)?,
        });
    }

    Ok(samples)
}

/// Convert elapsed seconds since the Unix epoch (integer or fractional)
pub fn parse_epoch_seconds(value: &str) -> Option<NaiveDateTime> {
    if let Ok(seconds) = value.parse::<i64>() {
        return DateTime::from_timestamp(seconds, 0).map(|dt| dt.naive_utc());
    }

    let seconds = value.parse::<f64>().ok().filter(|s| s.is_finite())?;
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos).map(|dt| dt.naive_utc())
}

fn clean_header(name: &str) -> &str {
    name.trim_start_matches('\u{feff}').trim()
}

fn column_index(columns: &[String], name: &str, path: &Path) -> Result<usize> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| DoError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

fn parse_number(
    record: &StringRecord,
    index: usize,
    columns: &[String],
    path: &Path,
    line: usize,
) -> Result<f64> {
    let value = field(record, index);
    value.parse::<f64>().map_err(|_| DoError::InvalidNumber {
        path: path.to_path_buf(),
        line,
        column: columns[index].clone(),
        value: value.to_string(),
    })
}

fn invalid_format(path: &Path, error: &csv::Error) -> DoError {
    DoError::InvalidFormat {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}
