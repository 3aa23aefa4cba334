#![allow(missing_docs)]

use std::fs::File;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use predicates::prelude::*;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const CONFIG_VARS: [&str; 5] = [
    "REVIEW_TABLE_BASE_DIR",
    "REVIEWS_DIR",
    "PARQUET_DATA_DIR",
    "LOG_DIR",
    "REVIEW_TABLE_LOG",
];

fn cli(cwd: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("review-table"));
    cmd.current_dir(cwd);
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn write_review_file(dir: &Path, name: &str, body: &str) -> TestResult {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(name), body)?;
    Ok(())
}

fn row_count(path: &Path) -> Result<i64, Box<dyn std::error::Error>> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    Ok(builder.metadata().file_metadata().num_rows())
}

const PLACE: &str = r#"{
    "place_id": "p1",
    "name": "Mapo Noodles",
    "grid": "G-11",
    "rating": 4.2,
    "reviews": [
        {"review_id": "r1", "date": "3일 전", "language": "ko", "rating": 4, "text": "국물이 진해요"},
        {"review_id": "r2", "date": "a week ago", "language": "en", "rating": 5, "text": "great"}
    ]
}"#;

#[test]
fn converts_with_defaults_under_base_dir() -> TestResult {
    let tmp = TempDir::new()?;
    write_review_file(&tmp.path().join("reviews/G-11"), "p1_reviews.json", PLACE)?;

    cli(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Top languages"))
        .stdout(predicate::str::contains("Generated files:"))
        .stdout(predicate::str::contains("reviews.parquet"))
        .stderr(predicate::str::contains("Found 1 JSON files"));

    let out = tmp.path().join("parquet_data");
    assert_eq!(row_count(&out.join("restaurants.parquet"))?, 1);
    assert_eq!(row_count(&out.join("reviews.parquet"))?, 2);
    assert!(out.join("sample_reviews.csv").exists());

    let log = std::fs::read_to_string(tmp.path().join("log/conversion.log"))?;
    assert!(log.contains(" - INFO - Starting review conversion"));
    assert!(log.contains("Conversion complete"));
    Ok(())
}

#[test]
fn directories_from_flags_and_env() -> TestResult {
    let tmp = TempDir::new()?;
    let input = tmp.path().join("collected");
    let output = tmp.path().join("tables");
    let logs = tmp.path().join("logs");
    write_review_file(&input, "p1_reviews.json", PLACE)?;

    cli(tmp.path())
        .env("PARQUET_DATA_DIR", &output)
        .env("LOG_DIR", &logs)
        .arg("--reviews-dir")
        .arg(&input)
        .args(["--sample-rows", "1"])
        .assert()
        .success();

    assert!(output.join("restaurants.parquet").exists());
    assert!(logs.join("conversion.log").exists());
    assert!(!tmp.path().join("parquet_data").exists());

    let sample = std::fs::read_to_string(output.join("sample_reviews.csv"))?;
    // Header plus one row (the leading BOM is part of the first line).
    assert_eq!(sample.lines().count(), 2);
    Ok(())
}

#[test]
fn failed_files_are_reported_but_run_succeeds() -> TestResult {
    let tmp = TempDir::new()?;
    let input = tmp.path().join("reviews");
    write_review_file(&input, "p1_reviews.json", PLACE)?;
    write_review_file(&input, "p2_reviews.json", r#"{"place_id": "p2", "rating": "n/a"}"#)?;

    cli(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed files"))
        .stdout(predicate::str::contains("p2_reviews.json"))
        .stderr(predicate::str::contains("Failed to process file"));

    assert_eq!(
        row_count(&tmp.path().join("parquet_data/restaurants.parquet"))?,
        1
    );
    Ok(())
}

#[test]
fn missing_input_fails_with_log_pointer() -> TestResult {
    let tmp = TempDir::new()?;

    cli(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No input files"))
        .stderr(predicate::str::contains("conversion.log"));

    assert!(!tmp.path().join("parquet_data/restaurants.parquet").exists());
    let log = std::fs::read_to_string(tmp.path().join("log/conversion.log"))?;
    assert!(log.contains(" - ERROR - Conversion failed"));
    Ok(())
}

#[test]
fn no_usable_data_fails() -> TestResult {
    let tmp = TempDir::new()?;
    write_review_file(
        &tmp.path().join("reviews"),
        "p1_reviews.json",
        r#"{"place_id": "p1", "reviews": []}"#,
    )?;

    cli(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No data to convert"));
    Ok(())
}

#[test]
fn rejects_invalid_log_level() -> TestResult {
    let tmp = TempDir::new()?;
    cli(tmp.path())
        .args(["--log-level", "chatty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--log-level"));
    Ok(())
}
