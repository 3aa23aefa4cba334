//! In-memory row types for the `restaurants` and `reviews` tables.

use chrono::NaiveDateTime;

/// One row of the `restaurants` table; one per successfully parsed file.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantRecord {
    /// External place identifier (may be empty).
    pub restaurant_id: String,
    /// Display name.
    pub name: String,
    /// Spatial partition the collection targeted.
    pub grid: String,
    /// Formatted address.
    pub address: String,
    /// Average rating, `0.0` when absent.
    pub rating: f64,
    /// Number of user ratings reported by the source.
    pub user_ratings_total: u64,
    /// Phone number as provided.
    pub phone_number: String,
    /// Declared review count (independent of parsed review rows).
    pub reviews_count: u64,
    /// File the record was read from.
    pub source_path: String,
}

/// One row of the `reviews` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    /// Review identifier (may be empty).
    pub review_id: String,
    /// Owning restaurant's place identifier.
    pub restaurant_id: String,
    /// Denormalized restaurant name.
    pub restaurant_name: String,
    /// Denormalized grid.
    pub grid: String,
    /// Raw date text from the source.
    pub date_original: String,
    /// Timestamp estimated from `date_original`.
    pub estimated_date: NaiveDateTime,
    /// Whether the date text carried an edited marker.
    pub is_modified: bool,
    /// Language code.
    pub language: String,
    /// Star rating in `0..=5`.
    pub rating: u8,
    /// Review body.
    pub text: String,
    /// Character count of `text`.
    pub text_length: u64,
}

/// Everything extracted from a single input document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    /// The document's restaurant row.
    pub restaurant: RestaurantRecord,
    /// Review rows in source order.
    pub reviews: Vec<ReviewRecord>,
}
