//! Fixed file names of the conversion outputs.
//!
//! All helpers return paths *relative* to the output root; callers join them
//! with an [`crate::storage::OutputRoot`] before doing IO.

use std::path::PathBuf;

/// Canonical restaurants table.
pub const RESTAURANTS_PARQUET: &str = "restaurants.parquet";

/// Canonical reviews table.
pub const REVIEWS_PARQUET: &str = "reviews.parquet";

/// Audit sample of the restaurants table.
pub const SAMPLE_RESTAURANTS_CSV: &str = "sample_restaurants.csv";

/// Audit sample of the reviews table.
pub const SAMPLE_REVIEWS_CSV: &str = "sample_reviews.csv";

/// Suffix identifying input documents under the reviews directory.
pub const INPUT_FILE_SUFFIX: &str = "_reviews.json";

/// Relative path: `restaurants.parquet`
pub fn restaurants_rel_path() -> PathBuf {
    PathBuf::from(RESTAURANTS_PARQUET)
}

/// Relative path: `reviews.parquet`
pub fn reviews_rel_path() -> PathBuf {
    PathBuf::from(REVIEWS_PARQUET)
}

/// Relative path: `sample_restaurants.csv`
pub fn sample_restaurants_rel_path() -> PathBuf {
    PathBuf::from(SAMPLE_RESTAURANTS_CSV)
}

/// Relative path: `sample_reviews.csv`
pub fn sample_reviews_rel_path() -> PathBuf {
    PathBuf::from(SAMPLE_REVIEWS_CSV)
}
