//! Run log sink.
//!
//! The conversion core never installs a global logger. Instead, the entry
//! point builds a [`RunLogger`] and hands it to the pipeline as a
//! `&dyn log::Log`; every component writes through that handle using the
//! crate-private [`log_to!`] macro.
//!
//! Lines are formatted as `<timestamp> - <LEVEL> - <message>` and appended
//! to the configured writer (normally `<log_dir>/conversion.log`).

use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use snafu::prelude::*;

/// File name of the run log inside the log directory.
pub const RUN_LOG_FILE_NAME: &str = "conversion.log";

/// Emit a record through an explicitly supplied logger reference.
macro_rules! log_to {
    ($logger:expr, $level:ident, $($arg:tt)+) => {
        ::log::Log::log(
            $logger,
            &::log::Record::builder()
                .args(format_args!($($arg)+))
                .level(::log::Level::$level)
                .target(module_path!())
                .module_path_static(Some(module_path!()))
                .file_static(Some(file!()))
                .line(Some(line!()))
                .build(),
        )
    };
}
pub(crate) use log_to;

/// Errors raised while opening the run log.
#[derive(Debug, Snafu)]
pub enum RunLogError {
    /// The log directory could not be created.
    #[snafu(display("Failed to create log directory: {path}"))]
    CreateLogDir {
        /// Directory that could not be created.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The log file could not be opened for appending.
    #[snafu(display("Failed to open run log: {path}"))]
    OpenLogFile {
        /// Log file path.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// A `log::Log` implementation writing timestamped lines to a single sink.
pub struct RunLogger {
    level: LevelFilter,
    sink: Mutex<Box<dyn Write + Send>>,
    mirror_stderr: bool,
    path: Option<PathBuf>,
}

impl RunLogger {
    /// Build a logger over an arbitrary writer.
    pub fn new(sink: Box<dyn Write + Send>, level: LevelFilter) -> Self {
        Self {
            level,
            sink: Mutex::new(sink),
            mirror_stderr: false,
            path: None,
        }
    }

    /// Open (append-or-create) `<log_dir>/conversion.log`.
    pub fn open_in_dir(log_dir: &Path, level: LevelFilter) -> Result<Self, RunLogError> {
        std::fs::create_dir_all(log_dir).context(CreateLogDirSnafu {
            path: log_dir.display().to_string(),
        })?;

        let path = log_dir.join(RUN_LOG_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context(OpenLogFileSnafu {
                path: path.display().to_string(),
            })?;

        let mut logger = Self::new(Box::new(file), level);
        logger.path = Some(path);
        Ok(logger)
    }

    /// Also echo every line to stderr.
    pub fn with_stderr_mirror(mut self, mirror: bool) -> Self {
        self.mirror_stderr = mirror;
        self
    }

    /// Path of the backing log file, when file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Log for RunLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format!(
            "{} - {} - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            record.level(),
            record.args()
        );

        if let Ok(mut sink) = self.sink.lock() {
            // A broken log sink must not abort the conversion.
            let _ = sink.write_all(line.as_bytes());
        }
        if self.mirror_stderr {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.flush();
        }
    }
}
