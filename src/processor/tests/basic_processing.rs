//! Basic processing integration tests

use super::{write_minidot_file, write_salinity_file};
use crate::config::{PressureInput, ProcessorConfig};
use crate::constants::STANDARD_PRESSURE_PA;
use crate::correction::round_to;
use crate::input::load_salinity_file;
use crate::processor::BatchProcessor;
use crate::salinity::SalinityResolver;
use crate::solubility::{elevation_to_pressure, salinity_factor, solubility_mg_per_liter};
use std::fs;
use tempfile::TempDir;

fn sea_level_processor() -> BatchProcessor {
    BatchProcessor::new(PressureInput::Pressure { mbar: 1013.25 }).unwrap()
}

#[tokio::test]
async fn test_freshwater_single_file() {
    let temp_dir = TempDir::new().unwrap();
    let measurement = write_minidot_file(temp_dir.path(), "cat.txt", &[(0, 20.0, 8.0)]);
    let salinity = write_salinity_file(temp_dir.path(), "sal.csv", &[("01/01/1970 00:00:00", 0.0)]);

    let processor = sea_level_processor();
    assert_eq!(processor.pressure_pa(), STANDARD_PRESSURE_PA);

    let result = processor.run(&[measurement.clone()], &salinity).await.unwrap();

    assert_eq!(result.datasets.len(), 1);
    assert_eq!(result.datasets[0].source, measurement);
    assert_eq!(result.total_rows(), 1);

    let row = &result.datasets[0].rows[0];
    assert_eq!(row.corrected.corrected_mg_per_liter, 8.0);
    assert_eq!(row.corrected.salinity_used, 0.0);
    assert_eq!(
        row.corrected.saturation_percent,
        8.0 / solubility_mg_per_liter(20.0, STANDARD_PRESSURE_PA, 0.0) * 100.0
    );
    assert_eq!(result.summary.first_timestamp, result.summary.last_timestamp);
}

#[tokio::test]
async fn test_seawater_correction() {
    let temp_dir = TempDir::new().unwrap();
    let measurement = write_minidot_file(
        temp_dir.path(),
        "cat.txt",
        &[(1_000, 10.0, 9.0), (2_000, 10.0, 9.0)],
    );
    let salinity = write_salinity_file(
        temp_dir.path(),
        "sal.csv",
        &[("01/01/1970 00:16:40", 30.004), ("01/01/1970 00:33:20", 35.0)],
    );

    let result = sea_level_processor()
        .run(&[measurement], &salinity)
        .await
        .unwrap();
    let rows = &result.datasets[0].rows;

    assert_eq!(rows[0].corrected.resolved_salinity, 30.004);
    assert_eq!(rows[0].corrected.salinity_used, 30.0);
    let expected = 9.0 * salinity_factor(10.0, 30.0);
    assert!((rows[0].corrected.corrected_mg_per_liter - expected).abs() < 1e-6);
    assert_eq!(rows[1].corrected.salinity_used, 35.0);
    assert!(rows[1].corrected.corrected_mg_per_liter < rows[0].corrected.corrected_mg_per_liter);
}

#[tokio::test]
async fn test_elevation_run_uses_barometric_pressure() {
    let temp_dir = TempDir::new().unwrap();
    let measurement = write_minidot_file(temp_dir.path(), "cat.txt", &[(0, 20.0, 8.0)]);
    let salinity = write_salinity_file(temp_dir.path(), "sal.csv", &[("01/01/1970 00:00:00", 0.0)]);

    let input = PressureInput::from_mode("e", None, Some(500.0)).unwrap();
    let processor = BatchProcessor::new(input).unwrap();
    assert_eq!(processor.pressure_pa(), elevation_to_pressure(500.0));

    let result = processor.run(&[measurement], &salinity).await.unwrap();
    let row = &result.datasets[0].rows[0];

    // Salinity factor stays at standard pressure; saturation uses 500 m
    assert_eq!(row.corrected.corrected_mg_per_liter, 8.0);
    assert_eq!(
        row.corrected.saturation_percent,
        8.0 / solubility_mg_per_liter(20.0, elevation_to_pressure(500.0), 0.0) * 100.0
    );
    assert_eq!(result.summary.pressure_input, input);
}

#[tokio::test]
async fn test_run_to_csv_writes_output() {
    let temp_dir = TempDir::new().unwrap();
    let measurement = write_minidot_file(
        temp_dir.path(),
        "cat.txt",
        &[(1_537_808_400, 21.9, 8.2), (1_537_809_000, 21.7, 8.1)],
    );
    let salinity = write_salinity_file(temp_dir.path(), "sal.csv", &[("24/09/2018 17:00:00", 31.2)]);
    let output_path = temp_dir.path().join("outputs").join("DO_processed_output.csv");

    let processor = sea_level_processor().with_config(
        ProcessorConfig::default().with_output_path(&output_path),
    );
    let stats = processor.run_to_csv(&[measurement], &salinity).await.unwrap();

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.total_rows, 2);
    assert_eq!(stats.output_path, output_path);
    let (first, last) = stats.date_range.unwrap();
    assert_eq!(first.and_utc().timestamp(), 1_537_808_400);
    assert_eq!(last.and_utc().timestamp(), 1_537_809_000);

    let content = fs::read_to_string(&output_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("First Measure Date,Last Measure Date,Pressure used (mbar),Time,"));
    assert!(lines[0].ends_with(",Used Salinity (PSU),Corrected DO (umol/kg)"));
    assert!(lines[1].starts_with("2018-09-24,2018-09-24,"));
    assert!(lines[2].contains("2018-09-24 17:00:00"));
}

#[tokio::test]
async fn test_run_directory() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("raw");
    fs::create_dir_all(&data_dir).unwrap();
    write_minidot_file(&data_dir, "b.txt", &[(600, 15.0, 9.5)]);
    write_minidot_file(&data_dir, "a.txt", &[(0, 15.0, 9.0)]);
    fs::write(data_dir.join("notes.md"), "not a logger file").unwrap();
    let salinity = write_salinity_file(temp_dir.path(), "sal.csv", &[("01/01/1970 00:00:00", 5.0)]);
    let output_path = temp_dir.path().join("out.csv");

    let processor = sea_level_processor().with_config(
        ProcessorConfig::default()
            .with_output_path(&output_path)
            .with_max_concurrent_files(1),
    );
    let stats = processor.run_directory(&data_dir, &salinity).await.unwrap();

    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.total_rows, 2);

    let content = fs::read_to_string(&output_path).unwrap();
    let data_lines: Vec<&str> = content.lines().skip(2).collect();
    assert!(data_lines[0].contains("1970-01-01 00:00:00"));
    assert!(data_lines[1].contains("1970-01-01 00:10:00"));
}

#[test]
fn test_process_file_with_loaded_resolver() {
    let temp_dir = TempDir::new().unwrap();
    let measurement = write_minidot_file(
        temp_dir.path(),
        "cat.txt",
        &[(0, 12.0, 9.0), (3_000, 12.0, 9.0)],
    );
    let salinity = write_salinity_file(
        temp_dir.path(),
        "sal.csv",
        &[("01/01/1970 00:00:00", 10.0), ("01/01/1970 01:00:00", 30.125)],
    );
    let resolver = SalinityResolver::new(&load_salinity_file(&salinity).unwrap()).unwrap();

    let dataset = sea_level_processor()
        .process_file(&measurement, &resolver)
        .unwrap();

    assert_eq!(dataset.source, measurement);
    assert_eq!(dataset.extra_columns, vec!["BV (Volts)", "Q ()"]);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.rows[0].corrected.salinity_used, 10.0);
    assert_eq!(dataset.rows[1].corrected.resolved_salinity, 30.125);
    assert_eq!(dataset.rows[1].corrected.salinity_used, 30.12);
    assert_eq!(
        dataset.rows[1].corrected.corrected_mg_per_liter,
        round_to(9.0 * salinity_factor(12.0, 30.12), 6)
    );
}
