//! Batch conversion of a reviews directory into the two output tables.
//!
//! A run moves through [`RunStage`]s:
//!
//! ```text
//! Discovering -> Processing(i/N) -> Aggregating -> Failed (no data)
//!                                               \-> Persisting -> Reporting -> Done
//! ```
//!
//! Every file is extracted independently; a failure is recorded in the
//! run's failed-file list and processing moves on. Only after all files
//! are processed are the two tables assembled and written. A run that
//! ends with zero restaurant rows or zero review rows writes nothing.
//!
//! There is no resume: every run rebuilds both tables from scratch and
//! replaces the previous outputs.

mod error;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::Log;
use snafu::prelude::*;

pub use error::{ConvertError, ConvertResult};
use error::{
    BuildBatchSnafu, DiscoverSnafu, NoDataSnafu, NoInputFilesSnafu, OutputSizeSnafu,
    PrepareOutputSnafu, WriteSampleSnafu, WriteTableSnafu,
};

use crate::date_expr::DateExpressionParser;
use crate::extract::{ExtractResult, RecordExtractor};
use crate::formats;
use crate::record::{ExtractedDocument, RestaurantRecord, ReviewRecord};
use crate::run_log::log_to;
use crate::schema;
use crate::storage::{self, OutputRoot, layout};
use crate::summary::{OutputSizes, RunSummary};

/// Rows written to each CSV audit sample by default.
pub const DEFAULT_SAMPLE_ROWS: usize = 100;

/// Files between progress log lines by default.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// Inputs of a conversion run.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Directory searched recursively for `*_reviews.json`.
    pub reviews_dir: PathBuf,
    /// Directory receiving the tables and samples.
    pub output_dir: PathBuf,
    /// Reference instant for relative dates; fixed for the whole run.
    pub now: NaiveDateTime,
    /// Rows per CSV audit sample.
    pub sample_rows: usize,
    /// Files between progress log lines (`0` disables progress lines).
    pub progress_interval: usize,
}

impl ConversionConfig {
    /// Config with default sample size and progress interval.
    pub fn new(
        reviews_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            reviews_dir: reviews_dir.into(),
            output_dir: output_dir.into(),
            now,
            sample_rows: DEFAULT_SAMPLE_ROWS,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Override the CSV sample size.
    pub fn with_sample_rows(mut self, rows: usize) -> Self {
        self.sample_rows = rows;
        self
    }

    /// Override the progress interval.
    pub fn with_progress_interval(mut self, files: usize) -> Self {
        self.progress_interval = files;
        self
    }
}

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// Not started.
    Idle,
    /// Enumerating input files.
    Discovering,
    /// Extracting files; `done` of `total` finished.
    Processing {
        /// Files finished so far.
        done: usize,
        /// Files discovered.
        total: usize,
    },
    /// Assembling tables from the accumulated rows.
    Aggregating,
    /// Writing tables and samples.
    Persisting,
    /// Computing the run summary.
    Reporting,
    /// Finished successfully.
    Done,
    /// Finished without writing (or with a write failure).
    Failed,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStage::Idle => write!(f, "idle"),
            RunStage::Discovering => write!(f, "discovering"),
            RunStage::Processing { done, total } => write!(f, "processing ({done}/{total})"),
            RunStage::Aggregating => write!(f, "aggregating"),
            RunStage::Persisting => write!(f, "persisting"),
            RunStage::Reporting => write!(f, "reporting"),
            RunStage::Done => write!(f, "done"),
            RunStage::Failed => write!(f, "failed"),
        }
    }
}

/// An input file (or unreadable input directory) that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    /// The file.
    pub path: PathBuf,
    /// Rendered extraction error.
    pub reason: String,
}

impl fmt::Display for FailedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.path.display(), self.reason)
    }
}

/// Rows accumulated over the processing loop.
#[derive(Debug, Clone, Default)]
pub struct ProcessedFiles {
    /// Files handed to the loop.
    pub files_found: usize,
    /// One row per successful file, in processing order.
    pub restaurants: Vec<RestaurantRecord>,
    /// All review rows, in processing order.
    pub reviews: Vec<ReviewRecord>,
    /// Files that failed extraction.
    pub failed: Vec<FailedFile>,
}

impl ProcessedFiles {
    /// Files that converted successfully (one restaurant row each).
    pub fn succeeded(&self) -> usize {
        self.restaurants.len()
    }

    fn accept(&mut self, doc: ExtractedDocument) {
        self.restaurants.push(doc.restaurant);
        self.reviews.extend(doc.reviews);
    }
}

/// Absolute paths of everything a successful run writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Canonical restaurants table.
    pub restaurants_parquet: PathBuf,
    /// Canonical reviews table.
    pub reviews_parquet: PathBuf,
    /// Restaurants audit sample.
    pub sample_restaurants_csv: PathBuf,
    /// Reviews audit sample.
    pub sample_reviews_csv: PathBuf,
}

impl OutputPaths {
    fn under(root: &OutputRoot) -> Self {
        Self {
            restaurants_parquet: root.resolve(&layout::restaurants_rel_path()),
            reviews_parquet: root.resolve(&layout::reviews_rel_path()),
            sample_restaurants_csv: root.resolve(&layout::sample_restaurants_rel_path()),
            sample_reviews_csv: root.resolve(&layout::sample_reviews_rel_path()),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// Input files discovered.
    pub files_found: usize,
    /// Input files converted.
    pub files_succeeded: usize,
    /// Input files skipped because extraction failed.
    pub failed: Vec<FailedFile>,
    /// Rows written to `restaurants.parquet`.
    pub restaurant_rows: usize,
    /// Rows written to `reviews.parquet`.
    pub review_rows: usize,
    /// Output files.
    pub outputs: OutputPaths,
    /// Aggregate statistics.
    pub summary: RunSummary,
}

/// Orchestrates one conversion run.
pub struct ConversionPipeline<'a> {
    config: ConversionConfig,
    parser: DateExpressionParser,
    logger: &'a dyn Log,
    stage: RunStage,
}

impl<'a> ConversionPipeline<'a> {
    /// Create a pipeline logging through `logger`.
    pub fn new(config: ConversionConfig, logger: &'a dyn Log) -> Self {
        Self {
            config,
            parser: DateExpressionParser::default(),
            logger,
            stage: RunStage::Idle,
        }
    }

    /// Replace the date parser (for example, with an extended vocabulary).
    pub fn with_date_parser(mut self, parser: DateExpressionParser) -> Self {
        self.parser = parser;
        self
    }

    /// The run configuration.
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Current stage of the run.
    pub fn stage(&self) -> RunStage {
        self.stage
    }

    fn enter(&mut self, stage: RunStage) {
        log_to!(self.logger, Debug, "stage: {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    fn extractor(&self) -> RecordExtractor<'_> {
        RecordExtractor::new(&self.parser, self.config.now, self.logger)
    }

    /// Enumerate input files under the reviews directory, sorted by path.
    ///
    /// Unreadable subdirectories are logged and returned as failures; only
    /// an unreadable reviews directory is fatal.
    pub fn discover(&self) -> ConvertResult<(Vec<PathBuf>, Vec<FailedFile>)> {
        let dir = &self.config.reviews_dir;
        let discovery = storage::find_files_with_suffix(dir, layout::INPUT_FILE_SUFFIX)
            .context(DiscoverSnafu { dir: dir.clone() })?;

        let skipped = discovery
            .skipped
            .into_iter()
            .map(|s| {
                log_to!(
                    self.logger,
                    Warn,
                    "Skipping unreadable path: {} - {}",
                    s.path.display(),
                    s.source
                );
                FailedFile {
                    path: s.path,
                    reason: format!("unreadable: {}", s.source),
                }
            })
            .collect();
        Ok((discovery.files, skipped))
    }

    /// Extract a single file.
    pub fn process_file(&self, path: &Path) -> ExtractResult<ExtractedDocument> {
        self.extractor().extract_file(path)
    }

    /// Extract every file, isolating per-file failures.
    pub fn process_files(&mut self, files: &[PathBuf]) -> ProcessedFiles {
        let total = files.len();
        let mut processed = ProcessedFiles {
            files_found: total,
            ..ProcessedFiles::default()
        };

        for (i, path) in files.iter().enumerate() {
            let done = i + 1;
            if self.config.progress_interval > 0 && done % self.config.progress_interval == 0 {
                log_to!(self.logger, Info, "Progress: {done}/{total} files processed");
            }

            match self.process_file(path) {
                Ok(doc) => processed.accept(doc),
                Err(e) => {
                    log_to!(
                        self.logger,
                        Error,
                        "Failed to process file: {} - {e}",
                        path.display()
                    );
                    processed.failed.push(FailedFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            self.stage = RunStage::Processing { done, total };
        }

        log_to!(
            self.logger,
            Info,
            "File processing complete: {} succeeded, {} failed",
            processed.succeeded(),
            processed.failed.len()
        );
        processed
    }

    /// Run discovery, extraction, persistence and reporting.
    pub fn run(&mut self) -> ConvertResult<ConversionReport> {
        log_to!(self.logger, Info, "Starting review conversion");
        match self.run_stages() {
            Ok(report) => {
                self.log_failed_files(&report.failed);
                log_to!(
                    self.logger,
                    Info,
                    "Conversion complete. Output directory: {}",
                    self.config.output_dir.display()
                );
                self.enter(RunStage::Done);
                Ok(report)
            }
            Err(e) => {
                self.log_failed_files(e.failed_files());
                log_to!(self.logger, Error, "Conversion failed: {e}");
                self.enter(RunStage::Failed);
                Err(e)
            }
        }
    }

    fn run_stages(&mut self) -> ConvertResult<ConversionReport> {
        self.enter(RunStage::Discovering);
        log_to!(self.logger, Info, "Searching for JSON files...");
        let (files, skipped) = self.discover()?;
        log_to!(self.logger, Info, "Found {} JSON files", files.len());
        ensure!(
            !files.is_empty(),
            NoInputFilesSnafu {
                dir: self.config.reviews_dir.clone(),
            }
        );

        self.enter(RunStage::Processing {
            done: 0,
            total: files.len(),
        });
        let mut processed = self.process_files(&files);
        processed.failed.splice(0..0, skipped);

        self.enter(RunStage::Aggregating);
        if processed.restaurants.is_empty() || processed.reviews.is_empty() {
            return NoDataSnafu {
                restaurants: processed.restaurants.len(),
                reviews: processed.reviews.len(),
                failed: processed.failed,
            }
            .fail();
        }

        log_to!(self.logger, Info, "Building restaurants table...");
        let restaurants_batch = schema::restaurants_batch(&processed.restaurants)
            .context(BuildBatchSnafu {
                table: "restaurants",
            })?;
        log_to!(self.logger, Info, "Building reviews table...");
        let reviews_batch =
            schema::reviews_batch(&processed.reviews).context(BuildBatchSnafu { table: "reviews" })?;

        self.enter(RunStage::Persisting);
        let root = OutputRoot::new(&self.config.output_dir);
        root.ensure_exists().context(PrepareOutputSnafu)?;

        log_to!(self.logger, Info, "Writing Parquet files...");
        formats::parquet::write_table(&root, &layout::restaurants_rel_path(), &restaurants_batch)
            .context(WriteTableSnafu {
                table: "restaurants",
            })?;
        formats::parquet::write_table(&root, &layout::reviews_rel_path(), &reviews_batch)
            .context(WriteTableSnafu { table: "reviews" })?;

        let sample_rows = self.config.sample_rows;
        formats::csv::write_sample(
            &root,
            &layout::sample_restaurants_rel_path(),
            &restaurants_batch,
            sample_rows,
        )
        .context(WriteSampleSnafu {
            table: "restaurants",
        })?;
        formats::csv::write_sample(
            &root,
            &layout::sample_reviews_rel_path(),
            &reviews_batch,
            sample_rows,
        )
        .context(WriteSampleSnafu { table: "reviews" })?;
        log_to!(self.logger, Info, "Sample CSV files written");

        self.enter(RunStage::Reporting);
        let sizes = OutputSizes {
            restaurants_bytes: root
                .file_size(&layout::restaurants_rel_path())
                .context(OutputSizeSnafu)?,
            reviews_bytes: root
                .file_size(&layout::reviews_rel_path())
                .context(OutputSizeSnafu)?,
        };
        let summary = RunSummary::compute(&processed.restaurants, &processed.reviews, sizes);
        log_to!(self.logger, Info, "Conversion summary\n{summary}");

        Ok(ConversionReport {
            files_found: processed.files_found,
            files_succeeded: processed.succeeded(),
            restaurant_rows: processed.restaurants.len(),
            review_rows: processed.reviews.len(),
            failed: processed.failed,
            outputs: OutputPaths::under(&root),
            summary,
        })
    }

    fn log_failed_files(&self, failed: &[FailedFile]) {
        if failed.is_empty() {
            return;
        }
        log_to!(self.logger, Warn, "Failed files:");
        for file in failed {
            log_to!(self.logger, Warn, "  - {}", file.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 27)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    #[test]
    fn process_files_isolates_failures() -> TestResult {
        let tmp = TempDir::new()?;
        let good = tmp.path().join("a_reviews.json");
        let bad = tmp.path().join("b_reviews.json");
        let missing = tmp.path().join("c_reviews.json");
        std::fs::write(&good, r#"{"place_id": "a", "reviews": [{"rating": 4}, {"rating": 2}]}"#)?;
        std::fs::write(&bad, r#"{"place_id": "b", "rating": "bad"}"#)?;

        let config = ConversionConfig::new(tmp.path(), tmp.path().join("out"), now());
        let mut pipeline = ConversionPipeline::new(config, log::logger());
        let processed = pipeline.process_files(&[good, bad.clone(), missing.clone()]);

        assert_eq!(processed.files_found, 3);
        assert_eq!(processed.succeeded(), 1);
        assert_eq!(processed.restaurants.len(), 1);
        assert_eq!(processed.reviews.len(), 2);
        let failed: Vec<_> = processed.failed.iter().map(|f| f.path.clone()).collect();
        assert_eq!(failed, vec![bad, missing]);
        assert_eq!(pipeline.stage(), RunStage::Processing { done: 3, total: 3 });
        Ok(())
    }

    #[test]
    fn restaurants_without_reviews_is_no_data() -> TestResult {
        let tmp = TempDir::new()?;
        let input = tmp.path().join("in");
        std::fs::create_dir_all(&input)?;
        std::fs::write(input.join("a_reviews.json"), r#"{"place_id": "a", "reviews": []}"#)?;

        let out = tmp.path().join("out");
        let config = ConversionConfig::new(&input, &out, now());
        let mut pipeline = ConversionPipeline::new(config, log::logger());
        let err = pipeline.run().unwrap_err();

        assert!(matches!(
            err,
            ConvertError::NoData {
                restaurants: 1,
                reviews: 0,
                ..
            }
        ));
        assert_eq!(pipeline.stage(), RunStage::Failed);
        assert!(!out.join(layout::RESTAURANTS_PARQUET).exists());
        Ok(())
    }

    #[test]
    fn stage_display_is_readable() {
        assert_eq!(
            RunStage::Processing { done: 2, total: 5 }.to_string(),
            "processing (2/5)"
        );
        assert_eq!(RunStage::Done.to_string(), "done");
    }
}
