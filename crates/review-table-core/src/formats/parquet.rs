//! Parquet table writer.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use snafu::ResultExt;

use crate::formats::{FormatResult, ParquetWriteSnafu, StorageSnafu};
use crate::storage::{OutputRoot, OutputSink};

/// Writer properties shared by both canonical tables.
pub fn table_writer_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Write `batch` as a single Parquet file at `root` + `rel_path`, replacing
/// any existing file.
pub fn write_table(root: &OutputRoot, rel_path: &Path, batch: &RecordBatch) -> FormatResult<()> {
    let path = root.resolve(rel_path).display().to_string();
    let mut sink = OutputSink::create(root, rel_path).context(StorageSnafu)?;

    let mut writer = ArrowWriter::try_new(
        sink.writer(),
        batch.schema(),
        Some(table_writer_properties()),
    )
    .context(ParquetWriteSnafu { path: path.clone() })?;
    writer
        .write(batch)
        .context(ParquetWriteSnafu { path: path.clone() })?;
    writer.close().context(ParquetWriteSnafu { path })?;

    sink.finish().context(StorageSnafu)
}
