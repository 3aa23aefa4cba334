//! Error types and SNAFU context selectors for the conversion pipeline.
//!
//! Per-file problems never appear here: they are isolated into the run's
//! failed-file list. A `ConvertError` means the run as a whole failed and
//! no canonical output was (fully) replaced.

use std::path::PathBuf;

use arrow::error::ArrowError;
use snafu::prelude::*;

use crate::formats::FormatError;
use crate::pipeline::FailedFile;
use crate::storage::StorageError;

/// Result alias for pipeline operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Run-level conversion failures.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConvertError {
    /// Enumerating the reviews directory failed.
    #[snafu(display("Failed to scan input directory {}: {source}", dir.display()))]
    Discover {
        /// Directory being scanned.
        dir: PathBuf,
        /// Underlying storage error.
        #[snafu(source, backtrace)]
        source: StorageError,
    },

    /// No `*_reviews.json` file exists under the reviews directory.
    #[snafu(display("No input files matching *_reviews.json under {}", dir.display()))]
    NoInputFiles {
        /// Directory that was scanned.
        dir: PathBuf,
    },

    /// Processing finished without enough rows to write both tables.
    #[snafu(display(
        "No data to convert: {restaurants} restaurant rows, {reviews} review rows, {} failed files",
        failed.len()
    ))]
    NoData {
        /// Restaurant rows extracted.
        restaurants: usize,
        /// Review rows extracted.
        reviews: usize,
        /// Files that failed extraction.
        failed: Vec<FailedFile>,
    },

    /// Assembling an Arrow batch from records failed.
    #[snafu(display("Failed to build {table} table: {source}"))]
    BuildBatch {
        /// Table name.
        table: &'static str,
        /// Underlying Arrow error.
        source: ArrowError,
    },

    /// The output directory could not be prepared.
    #[snafu(display("Failed to prepare output directory: {source}"))]
    PrepareOutput {
        /// Underlying storage error.
        #[snafu(source, backtrace)]
        source: StorageError,
    },

    /// Writing a canonical Parquet table failed.
    #[snafu(display("Failed to write {table} table: {source}"))]
    WriteTable {
        /// Table name.
        table: &'static str,
        /// Underlying format error.
        source: FormatError,
    },

    /// Writing a CSV audit sample failed.
    #[snafu(display("Failed to write {table} sample: {source}"))]
    WriteSample {
        /// Table name.
        table: &'static str,
        /// Underlying format error.
        source: FormatError,
    },

    /// Reading back output file sizes failed.
    #[snafu(display("Failed to stat output file: {source}"))]
    OutputSize {
        /// Underlying storage error.
        #[snafu(source, backtrace)]
        source: StorageError,
    },
}

impl ConvertError {
    /// Files that failed extraction, when the run got that far.
    pub fn failed_files(&self) -> &[FailedFile] {
        match self {
            ConvertError::NoData { failed, .. } => failed,
            _ => &[],
        }
    }
}
