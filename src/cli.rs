//! Command-line interface components.

use crate::config::{PressureInput, ProcessorConfig};
use crate::constants::{DEFAULT_MEASUREMENT_EXTENSION, DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_FILE};
use crate::models::ProcessingStats;
use crate::processor::BatchProcessor;
use crate::processor::discovery::discover_measurement_files;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "do-salinity")]
#[command(about = "Correct dissolved-oxygen logger data for salinity and pressure")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(group(
    ArgGroup::new("pressure_input")
        .required(true)
        .args(["pressure", "elevation", "mode"])
))]
pub struct Args {
    /// Directory containing the raw logger files
    #[arg(value_name = "MEASUREMENTS_DIR")]
    pub measurements_dir: PathBuf,

    /// Salinity CSV with Timestamp (dd/mm/YYYY HH:MM:SS) and Salinity columns
    #[arg(value_name = "SALINITY_FILE")]
    pub salinity_file: PathBuf,

    /// Ambient pressure in millibars
    #[arg(short, long, value_name = "MBAR")]
    pub pressure: Option<f64>,

    /// Site elevation in metres
    #[arg(short, long, value_name = "METERS", allow_negative_numbers = true)]
    pub elevation: Option<f64>,

    /// Pressure input type: 'p' (pressure, mbar) or 'e' (elevation, m)
    #[arg(short, long, requires = "value")]
    pub mode: Option<String>,

    /// Value for --mode
    #[arg(long, requires = "mode", allow_negative_numbers = true)]
    pub value: Option<f64>,

    /// Output CSV path
    #[arg(short, long, default_value_t = default_output_path().display().to_string())]
    pub output: String,

    /// Extension of logger files to pick up
    #[arg(long, default_value = DEFAULT_MEASUREMENT_EXTENSION)]
    pub extension: String,

    /// Maximum files corrected concurrently (defaults to CPU count)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR).join(DEFAULT_OUTPUT_FILE)
}

impl Args {
    /// Resolve the pressure regime from whichever flags were given
    pub fn pressure_input(&self) -> crate::error::Result<PressureInput> {
        match (&self.mode, self.value) {
            (Some(mode), value) => {
                let lowered = mode.trim().to_ascii_lowercase();
                let pressure = self.pressure.or(value.filter(|_| lowered == "p"));
                let elevation = self.elevation.or(value.filter(|_| lowered == "e"));
                PressureInput::from_mode(mode, pressure, elevation)
            }
            (None, _) => {
                let mode = if self.pressure.is_some() { "p" } else { "e" };
                PressureInput::from_mode(mode, self.pressure, self.elevation)
            }
        }
    }

    pub fn processor_config(&self) -> ProcessorConfig {
        let mut config = ProcessorConfig::default()
            .with_measurement_extension(self.extension.clone())
            .with_output_path(&self.output);
        if let Some(jobs) = self.jobs {
            config = config.with_max_concurrent_files(jobs);
        }
        if !self.quiet {
            config = config.with_progress();
        }
        config
    }

    pub fn get_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Set up structured logging based on CLI arguments
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("do_salinity_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Run a full correction from parsed arguments
pub async fn run(args: Args) -> Result<ProcessingStats> {
    let start_time = Instant::now();
    let pressure_input = args.pressure_input()?;
    let config = args.processor_config();

    if !args.quiet {
        println!("{}", "Starting dissolved-oxygen correction".bright_green().bold());
        println!(
            "  {} {}",
            "Measurements:".bright_cyan(),
            args.measurements_dir.display()
        );
        println!(
            "  {} {}",
            "Salinity:".bright_cyan(),
            args.salinity_file.display()
        );
        println!(
            "  {} {} = {}",
            "Pressure input:".bright_cyan(),
            pressure_input.label(),
            pressure_input.value()
        );
    }

    let files = discover_measurement_files(&args.measurements_dir, &config.measurement_extension)
        .await
        .with_context(|| {
            format!(
                "Failed to list measurement files in {}",
                args.measurements_dir.display()
            )
        })?;

    if !args.quiet {
        println!(
            "  {} {} measurement files",
            "Found".bright_green(),
            files.len().to_string().bright_white().bold()
        );
    }

    let processor = BatchProcessor::new(pressure_input)?.with_config(config);
    let mut stats = processor.run_to_csv(&files, &args.salinity_file).await?;
    stats.processing_time_ms = start_time.elapsed().as_millis();

    if !args.quiet {
        println!("\n{}", "Processing Summary".bright_green().bold());
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            stats.processing_time_ms.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Files processed:".bright_cyan(),
            stats.files_processed.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Total rows:".bright_cyan(),
            stats.total_rows.to_string().bright_white().bold()
        );
        if let Some((first, last)) = stats.date_range {
            println!(
                "  {} {} to {}",
                "Date range:".bright_cyan(),
                first.date(),
                last.date()
            );
        }
        println!(
            "  {} {}",
            "Output:".bright_cyan(),
            stats.output_path.display()
        );
    }

    Ok(stats)
}
