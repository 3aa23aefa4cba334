//! Filesystem access for the conversion.
//!
//! - [`OutputRoot`] resolves output files (see [`layout`] for the fixed
//!   names) and [`OutputSink`] writes them: bytes go to a temp file next to
//!   the target, which is renamed into place on `finish()`.
//! - [`find_files_with_suffix`] enumerates input documents below the reviews
//!   directory, skipping subdirectories it cannot read.
//!
//! All operations are blocking.

pub mod layout;
mod output;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use snafu::{Backtrace, prelude::*};

pub use output::OutputSink;

/// General result type used by storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    /// The path does not exist.
    #[snafu(display("Path not found: {path}"))]
    NotFound {
        /// The missing path.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
        /// Backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// Any other filesystem failure.
    #[snafu(display("I/O error at {path}: {source}"))]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
        /// Backtrace at the time the error occurred.
        backtrace: Backtrace,
    },
}

/// Directory that receives the conversion outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputRoot(PathBuf);

impl OutputRoot {
    /// Wrap an output directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self(dir.into())
    }

    /// The output directory itself.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Path of `rel` under this root.
    pub fn resolve(&self, rel: &Path) -> PathBuf {
        self.0.join(rel)
    }

    /// Create the directory (and parents) if missing.
    pub fn ensure_exists(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.0).context(IoSnafu {
            path: self.0.display().to_string(),
        })
    }

    /// Size in bytes of the file at `rel`.
    pub fn file_size(&self, rel: &Path) -> StorageResult<u64> {
        let abs = self.resolve(rel);
        let path = abs.display().to_string();
        match fs::metadata(&abs) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(e).context(NotFoundSnafu { path })
            }
            Err(e) => Err(e).context(IoSnafu { path }),
        }
    }
}

/// A directory (or entry) below the input root that could not be read.
#[derive(Debug)]
pub struct SkippedPath {
    /// The unreadable path.
    pub path: PathBuf,
    /// Why it could not be read.
    pub source: io::Error,
}

/// Outcome of input discovery.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Matching files, sorted by path.
    pub files: Vec<PathBuf>,
    /// Unreadable subdirectories and entries, sorted by path.
    pub skipped: Vec<SkippedPath>,
}

impl Discovery {
    fn skip(&mut self, path: &Path, source: io::Error) {
        self.skipped.push(SkippedPath {
            path: path.to_path_buf(),
            source,
        });
    }
}

/// Recursively collect files under `root` whose name ends with `suffix`.
///
/// Results are sorted so that downstream row order is reproducible. A
/// missing `root` yields nothing. Failing to list `root` itself is an error;
/// anything unreadable below it is recorded in [`Discovery::skipped`] and the
/// walk continues.
pub fn find_files_with_suffix(root: &Path, suffix: &str) -> StorageResult<Discovery> {
    let mut discovery = Discovery::default();
    if !root.is_dir() {
        return Ok(discovery);
    }

    let entries = fs::read_dir(root).context(IoSnafu {
        path: root.display().to_string(),
    })?;
    scan(entries, root, suffix, &mut discovery);

    discovery.files.sort();
    discovery.skipped.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(discovery)
}

fn scan(entries: fs::ReadDir, dir: &Path, suffix: &str, out: &mut Discovery) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                out.skip(dir, e);
                continue;
            }
        };
        let path = entry.path();

        match entry.file_type() {
            Err(e) => out.skip(&path, e),
            Ok(kind) if kind.is_dir() => match fs::read_dir(&path) {
                Ok(children) => scan(children, &path, suffix, out),
                Err(e) => out.skip(&path, e),
            },
            Ok(_) => {
                let matches = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(suffix));
                if matches {
                    out.files.push(path);
                }
            }
        }
    }
}
