//! CLI tool converting collected restaurant reviews into Parquet tables.

mod config;
mod error;
mod render;

use chrono::Local;
use clap::Parser;
use log::Log;
use review_table_core::pipeline::{ConversionConfig, ConversionPipeline, ConversionReport};
use review_table_core::run_log::{RUN_LOG_FILE_NAME, RunLogger};
use snafu::ResultExt;

use crate::{
    config::{Cli, Settings},
    error::{CliResult, ConvertSnafu, RunLogSnafu},
    render::{render_failed, render_outputs, render_report},
};

fn run(settings: &Settings) -> CliResult<ConversionReport> {
    let logger = RunLogger::open_in_dir(&settings.log_dir, settings.log_level)
        .context(RunLogSnafu {
            dir: settings.log_dir.clone(),
        })?
        .with_stderr_mirror(true);

    // One reference instant for every relative date in this run.
    let now = Local::now().naive_local();
    let config = ConversionConfig::new(&settings.reviews_dir, &settings.output_dir, now)
        .with_sample_rows(settings.sample_rows);

    let result = ConversionPipeline::new(config, &logger).run();
    logger.flush();
    result.context(ConvertSnafu)
}

fn print_report(report: &ConversionReport) {
    println!("{}", render_report(report));
    if let Some(failed) = render_failed(report) {
        println!("{failed}");
    }
    print!("{}", render_outputs(report));
}

fn main() {
    // A missing .env is fine; flags and the process environment still apply.
    dotenvy::dotenv().ok();
    let settings = Settings::from(Cli::parse());

    match run(&settings) {
        Ok(report) => print_report(&report),
        Err(e) => {
            eprintln!("{e}");
            if e.has_run_log() {
                eprintln!(
                    "See {} for details",
                    settings.log_dir.join(RUN_LOG_FILE_NAME).display()
                );
            }
            std::process::exit(1);
        }
    }
}
