//! Conversion engine turning collected restaurant review documents into
//! analysis-ready Parquet tables.
//!
//! This crate provides:
//!
//! - Localized relative-date parsing with a pluggable keyword vocabulary
//!   (`date_expr` module).
//! - Per-document extraction of one restaurant row plus its review rows,
//!   with an explicit missing-value policy (`extract` module).
//! - Arrow schemas declaring the final column types, including dictionary
//!   encoded categoricals and a narrow `UInt8` rating (`schema` module).
//! - Atomic local output (temp file then rename) and input discovery
//!   (`storage` module), plus Parquet and CSV encoders (`formats` module).
//! - The batch pipeline that isolates per-file failures and writes both
//!   tables only when the run produced data (`pipeline` module).
//!
//! The engine is synchronous and never installs a global logger; callers
//! pass a `&dyn log::Log` (usually a [`run_log::RunLogger`]).
#![deny(missing_docs)]
pub mod date_expr;
pub mod extract;
pub mod formats;
pub mod pipeline;
pub mod record;
pub mod run_log;
pub mod schema;
pub mod storage;
pub mod summary;

pub use date_expr::{DateExpressionParser, DateVocabulary, ParsedDate};
pub use extract::{ExtractError, RecordExtractor};
pub use pipeline::{
    ConversionConfig, ConversionPipeline, ConversionReport, ConvertError, FailedFile, RunStage,
};
pub use record::{ExtractedDocument, RestaurantRecord, ReviewRecord};
pub use run_log::{RunLogError, RunLogger};
pub use summary::RunSummary;
