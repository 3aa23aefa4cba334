//! On-disk encodings of the output tables.
//!
//! - [`parquet`]: canonical tables, Snappy-compressed column chunks.
//! - [`csv`]: small human-readable audit samples.
//!
//! Both write through [`crate::storage::OutputSink`], so a failed write never
//! replaces a previous output.

pub mod csv;
pub mod parquet;

use arrow::error::ArrowError;
use ::parquet::errors::ParquetError;
use snafu::prelude::*;

use crate::storage::StorageError;

/// Result alias for format writers.
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors raised while encoding a table to disk.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FormatError {
    /// Opening, flushing or committing the output file failed.
    #[snafu(display("Storage error while writing output: {source}"))]
    Storage {
        /// Underlying storage error.
        #[snafu(source, backtrace)]
        source: StorageError,
    },

    /// The Parquet encoder rejected the batch.
    #[snafu(display("Parquet write error for {path}: {source}"))]
    ParquetWrite {
        /// Output path.
        path: String,
        /// Underlying Parquet error.
        source: ParquetError,
    },

    /// The CSV encoder rejected the batch.
    #[snafu(display("CSV write error for {path}: {source}"))]
    CsvWrite {
        /// Output path.
        path: String,
        /// Underlying Arrow error.
        source: ArrowError,
    },

    /// Writing the byte-order mark failed.
    #[snafu(display("Failed to write byte-order mark to {path}: {source}"))]
    ByteOrderMark {
        /// Output path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
