//! Batch correction engine.
//!
//! Orchestrates a complete run: pressure resolution, salinity loading,
//! per-file correction and cross-file aggregation into one dataset with a
//! summary record. Any failing file aborts the run before output is written.

pub mod discovery;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::writer::CsvOutputWriter;

use crate::config::{PressureInput, ProcessorConfig};
use crate::correction::CorrectionEngine;
use crate::error::{DoError, Result};
use crate::input::{load_measurement_file, load_salinity_file};
use crate::models::{BatchResult, BatchSummary, Dataset, ProcessingStats};
use crate::salinity::SalinityResolver;

use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{debug, info, warn};

/// Runs the salinity and pressure correction over a set of measurement files
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    pressure_input: PressureInput,
    engine: CorrectionEngine,
    config: ProcessorConfig,
}

impl BatchProcessor {
    /// Create a processor for one pressure regime
    pub fn new(pressure_input: PressureInput) -> Result<Self> {
        pressure_input.validate()?;
        Ok(Self {
            pressure_input,
            engine: CorrectionEngine::new(pressure_input.pascals()),
            config: ProcessorConfig::default(),
        })
    }

    /// Configure the processor
    pub fn with_config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn pressure_input(&self) -> PressureInput {
        self.pressure_input
    }

    /// Run pressure in pascals
    pub fn pressure_pa(&self) -> f64 {
        self.engine.pressure_pa()
    }

    /// Correct every file and aggregate the results.
    ///
    /// Datasets keep the order of `measurement_files` regardless of which
    /// file finishes first.
    pub async fn run(
        &self,
        measurement_files: &[PathBuf],
        salinity_file: &Path,
    ) -> Result<BatchResult> {
        self.config.validate()?;

        if measurement_files.is_empty() {
            return Err(DoError::EmptyBatch {
                directory: PathBuf::new(),
                extension: self.config.measurement_extension.clone(),
            });
        }

        info!(
            "Correcting {} files at {:.1} Pa ({} = {})",
            measurement_files.len(),
            self.pressure_pa(),
            self.pressure_input.label(),
            self.pressure_input.value()
        );

        let resolver = Arc::new(self.load_resolver(salinity_file).await?);

        let pb = self.progress_bar(measurement_files.len());
        let concurrent_limit = self.config.max_concurrent_files.min(measurement_files.len());

        let datasets: Vec<Dataset> = stream::iter(measurement_files.iter().cloned())
            .map(|path| {
                let resolver = Arc::clone(&resolver);
                let engine = self.engine;
                let preamble_lines = self.config.preamble_lines;
                let pb = pb.clone();
                async move {
                    let task_path = path.clone();
                    let dataset = task::spawn_blocking(move || {
                        process_file(&task_path, preamble_lines, &engine, &resolver)
                    })
                    .await
                    .map_err(|e| DoError::ProcessingFailed {
                        path: path.clone(),
                        reason: format!("Correction task failed: {}", e),
                    })??;
                    pb.inc(1);
                    Ok::<_, DoError>(dataset)
                }
            })
            .buffered(concurrent_limit)
            .try_collect()
            .await?;

        pb.finish_and_clear();

        aggregate(datasets, self.pressure_input)
    }

    /// Run and write the combined CSV to the configured output path
    pub async fn run_to_csv(
        &self,
        measurement_files: &[PathBuf],
        salinity_file: &Path,
    ) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        let result = self.run(measurement_files, salinity_file).await?;
        let date_range = Some((result.summary.first_timestamp, result.summary.last_timestamp));

        let writer = CsvOutputWriter::new(self.config.output_path.clone());
        let total_rows = task::spawn_blocking(move || writer.write(&result))
            .await
            .map_err(|e| DoError::ProcessingFailed {
                path: self.config.output_path.clone(),
                reason: format!("Output task failed: {}", e),
            })??;

        Ok(ProcessingStats {
            files_processed: measurement_files.len(),
            total_rows,
            output_path: self.config.output_path.clone(),
            processing_time_ms: start_time.elapsed().as_millis(),
            date_range,
        })
    }

    /// Discover measurement files in `directory`, then [`Self::run_to_csv`]
    pub async fn run_directory(
        &self,
        directory: &Path,
        salinity_file: &Path,
    ) -> Result<ProcessingStats> {
        let files =
            discovery::discover_measurement_files(directory, &self.config.measurement_extension)
                .await?;
        self.run_to_csv(&files, salinity_file).await
    }

    /// Correct a single measurement file against an already loaded series
    pub fn process_file(&self, path: &Path, resolver: &SalinityResolver) -> Result<Dataset> {
        process_file(path, self.config.preamble_lines, &self.engine, resolver)
    }

    async fn load_resolver(&self, salinity_file: &Path) -> Result<SalinityResolver> {
        let path = salinity_file.to_path_buf();
        let samples = task::spawn_blocking({
            let path = path.clone();
            move || load_salinity_file(&path)
        })
        .await
        .map_err(|e| DoError::ProcessingFailed {
            path: path.clone(),
            reason: format!("Failed to load salinity file: {}", e),
        })??;

        let resolver = SalinityResolver::new(&samples).ok_or_else(|| DoError::InvalidFormat {
            path: path.clone(),
            reason: "salinity file contains no samples".to_string(),
        })?;

        let (first, last) = resolver.time_range();
        debug!(
            "Salinity series: {} samples from {} to {}",
            resolver.len(),
            first,
            last
        );
        Ok(resolver)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Correcting files");
        pb
    }
}

/// Load, resolve and correct one file
fn process_file(
    path: &Path,
    preamble_lines: usize,
    engine: &CorrectionEngine,
    resolver: &SalinityResolver,
) -> Result<Dataset> {
    let measurements = load_measurement_file(path, preamble_lines)?;

    if let Some((start, end)) = measurements.time_range() {
        let (salinity_start, salinity_end) = resolver.time_range();
        if start < salinity_start || end > salinity_end {
            warn!(
                "Salinity series ({} to {}) does not cover {} ({} to {}); using nearest edge values",
                salinity_start,
                salinity_end,
                path.display(),
                start,
                end
            );
        }
    } else {
        warn!("No measurements in {}", path.display());
    }

    let rows = engine.correct_all(measurements.samples, resolver);
    debug!("Corrected {} rows from {}", rows.len(), path.display());

    Ok(Dataset {
        source: measurements.path,
        columns: measurements.columns,
        extra_columns: measurements.extra_columns,
        rows,
    })
}

/// Global date range over all datasets, rows kept in file-then-row order
fn aggregate(datasets: Vec<Dataset>, pressure_input: PressureInput) -> Result<BatchResult> {
    let (first_timestamp, last_timestamp) = datasets
        .iter()
        .filter_map(Dataset::time_range)
        .reduce(|(min, max), (start, end)| (min.min(start), max.max(end)))
        .ok_or_else(|| DoError::InvalidFormat {
            path: datasets
                .first()
                .map(|d| d.source.clone())
                .unwrap_or_default(),
            reason: "no measurement rows in any input file".to_string(),
        })?;

    let result = BatchResult {
        summary: BatchSummary {
            first_timestamp,
            last_timestamp,
            pressure_input,
        },
        datasets,
    };

    info!(
        "Aggregated {} rows from {} files ({} to {})",
        result.total_rows(),
        result.datasets.len(),
        first_timestamp,
        last_timestamp
    );
    Ok(result)
}
