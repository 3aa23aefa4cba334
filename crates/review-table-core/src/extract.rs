//! Mapping raw place documents into table rows.
//!
//! A document is one JSON object as produced by the collection step:
//!
//! ```json
//! {
//!   "place_id": "...", "name": "...", "grid": "...", "address": "...",
//!   "rating": 4.5, "user_ratings_total": 120, "phone_number": "...",
//!   "reviews_count": 5,
//!   "reviews": [
//!     {"review_id": "...", "date": "2주 전", "language": "ko", "rating": 5, "text": "..."}
//!   ]
//! }
//! ```
//!
//! Extraction is all-or-nothing per document: either a restaurant row plus
//! every review row is returned, or an [`ExtractError`] and nothing else.

pub mod fields;

use std::path::Path;

use chrono::NaiveDateTime;
use log::Log;
use serde_json::Value;
use snafu::prelude::*;

use crate::date_expr::DateExpressionParser;
use crate::record::{ExtractedDocument, RestaurantRecord, ReviewRecord};

/// Result alias for extraction.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Why a single document could not be converted.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExtractError {
    /// The input file could not be read.
    #[snafu(display("Failed to read {path}: {source}"))]
    ReadFile {
        /// File path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid JSON.
    #[snafu(display("Invalid JSON: {source}"))]
    InvalidJson {
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// The top-level JSON value is not an object.
    #[snafu(display("Expected a JSON object at top level, found {found}"))]
    NotAnObject {
        /// JSON type actually found.
        found: &'static str,
    },

    /// A numeric field holds a value that cannot be read as a number.
    #[snafu(display("Field {field} is not numeric: {value}"))]
    NonNumeric {
        /// Field path, e.g. `rating` or `reviews[0].rating`.
        field: String,
        /// The offending JSON value.
        value: String,
    },

    /// A numeric field is outside the range its column allows.
    #[snafu(display("Field {field} is out of range: {value}"))]
    OutOfRange {
        /// Field path.
        field: String,
        /// The offending JSON value.
        value: String,
    },

    /// `reviews` is present but is not an array.
    #[snafu(display("Field reviews must be an array, found {found}"))]
    ReviewsNotArray {
        /// JSON type actually found.
        found: &'static str,
    },

    /// An entry of `reviews` is not an object.
    #[snafu(display("Entry reviews[{index}] must be an object, found {found}"))]
    ReviewNotObject {
        /// Position in the array.
        index: usize,
        /// JSON type actually found.
        found: &'static str,
    },
}

/// Converts one document into a restaurant row and its review rows.
#[derive(Clone, Copy)]
pub struct RecordExtractor<'a> {
    parser: &'a DateExpressionParser,
    now: NaiveDateTime,
    logger: &'a dyn Log,
}

impl<'a> RecordExtractor<'a> {
    /// Create an extractor resolving relative dates against `now`.
    pub fn new(parser: &'a DateExpressionParser, now: NaiveDateTime, logger: &'a dyn Log) -> Self {
        Self {
            parser,
            now,
            logger,
        }
    }

    /// Read and extract a document from disk.
    pub fn extract_file(&self, path: &Path) -> ExtractResult<ExtractedDocument> {
        let source_path = path.display().to_string();
        let bytes = std::fs::read(path).context(ReadFileSnafu {
            path: source_path.clone(),
        })?;
        let doc: Value = serde_json::from_slice(&bytes).context(InvalidJsonSnafu)?;
        self.extract_value(&doc, &source_path)
    }

    /// Extract a document from its JSON text.
    pub fn extract_str(&self, json: &str, source_path: &str) -> ExtractResult<ExtractedDocument> {
        let doc: Value = serde_json::from_str(json).context(InvalidJsonSnafu)?;
        self.extract_value(&doc, source_path)
    }

    /// Extract an already-decoded document.
    pub fn extract_value(&self, doc: &Value, source_path: &str) -> ExtractResult<ExtractedDocument> {
        let obj = doc.as_object().context(NotAnObjectSnafu {
            found: fields::json_type(doc),
        })?;

        let restaurant = RestaurantRecord {
            restaurant_id: fields::text(obj, "place_id"),
            name: fields::text(obj, "name"),
            grid: fields::text(obj, "grid"),
            address: fields::text(obj, "address"),
            rating: fields::float(obj, "rating", "rating")?,
            user_ratings_total: fields::count(obj, "user_ratings_total", "user_ratings_total")?,
            phone_number: fields::text(obj, "phone_number"),
            reviews_count: fields::count(obj, "reviews_count", "reviews_count")?,
            source_path: source_path.to_string(),
        };

        let entries: &[Value] = match obj.get("reviews") {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items,
            Some(other) => {
                return ReviewsNotArraySnafu {
                    found: fields::json_type(other),
                }
                .fail();
            }
        };

        let reviews = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| self.extract_review(&restaurant, index, entry))
            .collect::<ExtractResult<Vec<_>>>()?;

        Ok(ExtractedDocument {
            restaurant,
            reviews,
        })
    }

    fn extract_review(
        &self,
        restaurant: &RestaurantRecord,
        index: usize,
        entry: &Value,
    ) -> ExtractResult<ReviewRecord> {
        let review = entry.as_object().context(ReviewNotObjectSnafu {
            index,
            found: fields::json_type(entry),
        })?;

        let date_original = fields::text(review, "date");
        let parsed = self.parser.parse(&date_original, self.now, self.logger);
        let text = fields::text(review, "text");
        let text_length = text.chars().count() as u64;

        Ok(ReviewRecord {
            review_id: fields::text(review, "review_id"),
            restaurant_id: restaurant.restaurant_id.clone(),
            restaurant_name: restaurant.name.clone(),
            grid: restaurant.grid.clone(),
            date_original,
            estimated_date: parsed.estimated,
            is_modified: parsed.is_modified,
            language: fields::text(review, "language"),
            rating: fields::rating(review, "rating", &format!("reviews[{index}].rating"))?,
            text,
            text_length,
        })
    }
}
