use std::path::PathBuf;

use review_table_core::{ConvertError, RunLogError};
use snafu::Snafu;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("Failed to set up run log in {}: {source}", dir.display()))]
    RunLog { dir: PathBuf, source: RunLogError },

    #[snafu(display("Conversion failed: {source}"))]
    Convert {
        #[snafu(source(from(ConvertError, Box::new)))]
        source: Box<ConvertError>,
    },
}

impl CliError {
    /// Whether the run log was available when the error happened.
    pub fn has_run_log(&self) -> bool {
        matches!(self, CliError::Convert { .. })
    }
}
