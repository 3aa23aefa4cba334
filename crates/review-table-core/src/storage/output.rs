use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use snafu::ResultExt;

use crate::storage::{IoSnafu, OutputRoot, StorageResult};

/// Atomic writer for one output file.
///
/// Bytes are streamed into `<target>.tmp`; [`OutputSink::finish`] flushes,
/// fsyncs and renames it over the target. A sink dropped before `finish`
/// deletes its temp file, so the previous output (if any) stays intact.
pub struct OutputSink {
    tmp_path: PathBuf,
    final_path: PathBuf,
    writer: BufWriter<File>,
    committed: bool,
}

impl OutputSink {
    /// Start writing `rel_path` under `root`, creating parent directories.
    pub fn create(root: &OutputRoot, rel_path: &Path) -> StorageResult<Self> {
        let final_path = root.resolve(rel_path);
        if let Some(parent) = final_path.parent() {
            std::fs::create_dir_all(parent).context(IoSnafu {
                path: parent.display().to_string(),
            })?;
        }

        let tmp_path = final_path.with_extension("tmp");
        let file = File::create(&tmp_path).context(IoSnafu {
            path: tmp_path.display().to_string(),
        })?;

        Ok(Self {
            tmp_path,
            final_path,
            writer: BufWriter::new(file),
            committed: false,
        })
    }

    /// Writer for the temp file.
    pub fn writer(&mut self) -> &mut (dyn Write + Send) {
        &mut self.writer
    }

    /// Final location of the file.
    pub fn path(&self) -> &Path {
        &self.final_path
    }

    /// Flush, fsync and move the temp file over the target.
    pub fn finish(mut self) -> StorageResult<()> {
        let tmp = self.tmp_path.display().to_string();
        self.writer.flush().context(IoSnafu { path: tmp.clone() })?;
        self.writer.get_ref().sync_all().context(IoSnafu { path: tmp })?;

        std::fs::rename(&self.tmp_path, &self.final_path).context(IoSnafu {
            path: self.final_path.display().to_string(),
        })?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for OutputSink {
    fn drop(&mut self) {
        if !self.committed {
            // Usually already unwinding another error; nothing to report.
            let _ = std::fs::remove_file(&self.tmp_path);
        }
    }
}
