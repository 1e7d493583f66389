//! DO Salinity Processor Library
//!
//! A Rust library for correcting dissolved-oxygen logger data (miniDOT style
//! exports) for salinity and barometric pressure.
//!
//! This library provides tools for:
//! - Parsing logger files with a fixed preamble and epoch-second timestamps
//! - Matching each measurement to the nearest-in-time salinity sample
//! - Garcia–Gordon oxygen solubility with vapor-pressure corrected pO2
//! - Batch correction of many files with bounded concurrency
//! - Writing a single combined CSV with a summary record

pub mod cli;
pub mod config;
pub mod constants;
pub mod correction;
pub mod error;
pub mod input;
pub mod models;
pub mod processor;
pub mod salinity;
pub mod solubility;

// Re-export commonly used types
pub use config::{PressureInput, ProcessorConfig};
pub use correction::CorrectionEngine;
pub use error::{DoError, Result};
pub use models::{
    BatchResult, BatchSummary, CorrectedMeasurement, CorrectedRow, Dataset, MeasurementSample,
    ProcessingStats, SalinitySample,
};
pub use processor::BatchProcessor;
pub use salinity::SalinityResolver;
