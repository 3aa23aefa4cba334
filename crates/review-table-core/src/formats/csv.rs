//! CSV audit samples.
//!
//! Samples start with a UTF-8 byte-order mark so spreadsheet tools detect
//! the encoding of non-ASCII review text.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use arrow_csv::WriterBuilder;
use snafu::ResultExt;

use crate::formats::{ByteOrderMarkSnafu, CsvWriteSnafu, FormatResult, StorageSnafu};
use crate::storage::{OutputRoot, OutputSink};

/// UTF-8 byte-order mark.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write the first `max_rows` rows of `batch` as CSV with a header row.
///
/// Returns the number of data rows written.
pub fn write_sample(
    root: &OutputRoot,
    rel_path: &Path,
    batch: &RecordBatch,
    max_rows: usize,
) -> FormatResult<usize> {
    let path = root.resolve(rel_path).display().to_string();
    let rows = batch.num_rows().min(max_rows);
    let sample = batch.slice(0, rows);

    let mut sink = OutputSink::create(root, rel_path).context(StorageSnafu)?;
    sink.writer()
        .write_all(UTF8_BOM)
        .context(ByteOrderMarkSnafu { path: path.clone() })?;

    let mut writer = WriterBuilder::new().with_header(true).build(sink.writer());
    writer.write(&sample).context(CsvWriteSnafu { path })?;
    drop(writer);

    sink.finish().context(StorageSnafu)?;
    Ok(rows)
}
