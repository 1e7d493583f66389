//! CSV output for a batch run
//!
//! Builds one polars frame per dataset plus a single-row summary frame and
//! stacks them with a diagonal concatenation: the output header is the union
//! of all columns and cells a frame does not have are left empty.

use crate::constants::{
    CORRECTED_DO_COLUMN, CORRECTED_DO_UMOL_COLUMN, DO_COLUMN, FIRST_DATE_COLUMN,
    LAST_DATE_COLUMN, OUTPUT_TIME_FORMAT, RESOLVED_SALINITY_COLUMN, SATURATION_COLUMN,
    SUMMARY_DATE_FORMAT, TEMPERATURE_COLUMN, TIME_COLUMN, USED_SALINITY_COLUMN,
};
use crate::error::{DoError, Result};
use crate::models::{BatchResult, BatchSummary, CorrectedMeasurement, Dataset};

use polars::prelude::{
    Column, CsvWriter, DataFrame, IntoLazy, LazyFrame, PolarsResult, SerWriter, UnionArgs,
    concat_lf_diagonal,
};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writes a [`BatchResult`] as a single CSV table
#[derive(Debug)]
pub struct CsvOutputWriter {
    output_path: PathBuf,
}

impl CsvOutputWriter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write the summary record and all rows, returning the data row count
    pub fn write(&self, result: &BatchResult) -> Result<usize> {
        let mut df = result.to_dataframe()?;

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| DoError::file_io(parent, e))?;
            }
        }

        let mut file =
            File::create(&self.output_path).map_err(|e| DoError::file_io(&self.output_path, e))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| DoError::ProcessingFailed {
                path: self.output_path.clone(),
                reason: format!("Failed to write CSV: {}", e),
            })?;

        debug!(
            "Wrote {} rows x {} columns to {}",
            df.height(),
            df.width(),
            self.output_path.display()
        );

        Ok(result.total_rows())
    }
}

impl BatchResult {
    /// Summary row followed by every dataset's rows
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut frames: Vec<LazyFrame> = Vec::with_capacity(self.datasets.len() + 1);
        frames.push(summary_frame(&self.summary)?.lazy());
        for dataset in &self.datasets {
            frames.push(dataset_frame(dataset)?.lazy());
        }

        // A pass-through column can be numeric in one file and text in another
        let args = UnionArgs {
            to_supertypes: true,
            ..Default::default()
        };
        Ok(concat_lf_diagonal(frames, args)?.collect()?)
    }

    /// Write to `path`, see [`CsvOutputWriter::write`]
    pub fn write_csv(&self, path: impl Into<PathBuf>) -> Result<usize> {
        CsvOutputWriter::new(path).write(self)
    }
}

fn summary_frame(summary: &BatchSummary) -> PolarsResult<DataFrame> {
    let input = summary.pressure_input;
    DataFrame::new(vec![
        Column::new(
            FIRST_DATE_COLUMN.into(),
            [summary
                .first_timestamp
                .format(SUMMARY_DATE_FORMAT)
                .to_string()],
        ),
        Column::new(
            LAST_DATE_COLUMN.into(),
            [summary.last_timestamp.format(SUMMARY_DATE_FORMAT).to_string()],
        ),
        Column::new(input.label().into(), [input.value()]),
    ])
}

/// Input columns in file order, then the computed columns
fn dataset_frame(dataset: &Dataset) -> PolarsResult<DataFrame> {
    let rows = &dataset.rows;
    let computed: [(&str, fn(&CorrectedMeasurement) -> f64); 5] = [
        (RESOLVED_SALINITY_COLUMN, |c| c.resolved_salinity),
        (CORRECTED_DO_COLUMN, |c| c.corrected_mg_per_liter),
        (SATURATION_COLUMN, |c| c.saturation_percent),
        (USED_SALINITY_COLUMN, |c| c.salinity_used),
        (CORRECTED_DO_UMOL_COLUMN, |c| c.corrected_umol_per_kg),
    ];
    let mut columns = Vec::with_capacity(dataset.columns.len() + computed.len());

    for name in &dataset.columns {
        let column = match name.as_str() {
            TIME_COLUMN => Column::new(
                name.as_str().into(),
                rows.iter()
                    .map(|r| r.sample.timestamp.format(OUTPUT_TIME_FORMAT).to_string())
                    .collect::<Vec<_>>(),
            ),
            TEMPERATURE_COLUMN => Column::new(
                name.as_str().into(),
                rows.iter().map(|r| r.sample.temperature).collect::<Vec<_>>(),
            ),
            DO_COLUMN => Column::new(
                name.as_str().into(),
                rows.iter()
                    .map(|r| r.sample.dissolved_oxygen)
                    .collect::<Vec<_>>(),
            ),
            extra if computed.iter().any(|(column, _)| *column == extra) => {
                warn!(
                    "Column '{}' in {} is replaced by the computed column",
                    extra,
                    dataset.source.display()
                );
                continue;
            }
            extra => {
                let idx = dataset
                    .extra_columns
                    .iter()
                    .position(|c| c == extra)
                    .unwrap_or_default();
                pass_through_column(
                    extra,
                    rows.iter()
                        .map(|r| r.sample.extra.get(idx).map_or("", String::as_str))
                        .collect(),
                )
            }
        };
        columns.push(column);
    }

    for (name, value) in computed {
        columns.push(Column::new(
            name.into(),
            rows.iter().map(|r| value(&r.corrected)).collect::<Vec<_>>(),
        ));
    }

    DataFrame::new(columns)
}

/// Numeric when every non-empty cell parses as a float, text otherwise
fn pass_through_column(name: &str, values: Vec<&str>) -> Column {
    let numbers: Option<Vec<Option<f64>>> = values
        .iter()
        .map(|value| {
            if value.is_empty() {
                Some(None)
            } else {
                value.parse::<f64>().ok().map(Some)
            }
        })
        .collect();

    match numbers {
        Some(numbers) => Column::new(name.into(), numbers),
        None => Column::new(name.into(), values),
    }
}
