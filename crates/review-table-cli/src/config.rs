//! Run settings resolved from flags, environment and `.env`.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Convert collected review JSON files into Parquet tables
#[derive(Debug, Clone, Parser)]
#[command(name = "review-table", version)]
pub struct Cli {
    /// Project root the default directories are resolved against
    #[arg(long, env = "REVIEW_TABLE_BASE_DIR", default_value = ".")]
    pub base_dir: PathBuf,

    /// Directory searched recursively for *_reviews.json (default: <base>/reviews)
    #[arg(long, env = "REVIEWS_DIR")]
    pub reviews_dir: Option<PathBuf>,

    /// Directory receiving the tables and samples (default: <base>/parquet_data)
    #[arg(long, env = "PARQUET_DATA_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory holding conversion.log (default: <base>/log)
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// off, error, warn, info, debug or trace
    #[arg(long, env = "REVIEW_TABLE_LOG", default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,

    /// Rows written to each CSV audit sample
    #[arg(long, default_value_t = review_table_core::pipeline::DEFAULT_SAMPLE_ROWS)]
    pub sample_rows: usize,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub reviews_dir: PathBuf,
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: LevelFilter,
    pub sample_rows: usize,
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        let base = cli.base_dir;
        Self {
            reviews_dir: cli.reviews_dir.unwrap_or_else(|| base.join("reviews")),
            output_dir: cli.output_dir.unwrap_or_else(|| base.join("parquet_data")),
            log_dir: cli.log_dir.unwrap_or_else(|| base.join("log")),
            log_level: cli.log_level,
            sample_rows: cli.sample_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(args: &[&str]) -> Settings {
        let argv = std::iter::once("review-table").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().into()
    }

    #[test]
    fn directories_default_under_base() {
        let s = settings(&["--base-dir", "/data/project"]);
        assert_eq!(s.reviews_dir, PathBuf::from("/data/project/reviews"));
        assert_eq!(s.output_dir, PathBuf::from("/data/project/parquet_data"));
        assert_eq!(s.log_dir, PathBuf::from("/data/project/log"));
        assert_eq!(s.sample_rows, 100);
    }

    #[test]
    fn explicit_directories_win() {
        let s = settings(&[
            "--base-dir",
            "/base",
            "--reviews-dir",
            "/in",
            "--output-dir",
            "/out",
            "--log-level",
            "debug",
            "--sample-rows",
            "5",
        ]);
        assert_eq!(s.reviews_dir, PathBuf::from("/in"));
        assert_eq!(s.output_dir, PathBuf::from("/out"));
        assert_eq!(s.log_dir, PathBuf::from("/base/log"));
        assert_eq!(s.log_level, LevelFilter::Debug);
        assert_eq!(s.sample_rows, 5);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let argv = ["review-table", "--log-level", "loud"];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
