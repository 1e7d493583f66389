//! Integration tests for the processor module
//!
//! Tests the complete correction pipeline using logger and salinity files
//! written to temporary directories.

pub mod basic_processing;

use std::fs;
use std::path::{Path, PathBuf};

/// Write a logger file with the two preamble lines and padded header
pub fn write_minidot_file(dir: &Path, name: &str, rows: &[(i64, f64, f64)]) -> PathBuf {
    let mut content = String::from(
        "7450-123456\nOS REV: 1.00 Sensor Cal: 1\n  Time (sec),  BV (Volts),  T (deg C),  DO (mg/l),  Q ()\n",
    );
    for (seconds, temperature, dissolved_oxygen) in rows {
        content.push_str(&format!(
            "{seconds},  3.57,  {temperature},  {dissolved_oxygen},  0.93\n"
        ));
    }

    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Write a salinity file with day-first timestamps
pub fn write_salinity_file(dir: &Path, name: &str, rows: &[(&str, f64)]) -> PathBuf {
    let mut content = String::from("Timestamp,Salinity\n");
    for (timestamp, salinity) in rows {
        content.push_str(&format!("{timestamp},{salinity}\n"));
    }

    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Unix seconds at midnight UTC of a January 2024 day
pub fn january_2024(day: u32) -> i64 {
    chrono::NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp()
}
