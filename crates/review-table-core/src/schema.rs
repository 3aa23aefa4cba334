//! Arrow schemas for the two output tables and record-to-batch builders.
//!
//! Column types are declared with their final semantic type up front:
//! low-cardinality text (`grid`, `language`) is dictionary encoded with
//! `Int32` keys, the review rating is `UInt8`, and `estimated_date` is a
//! timezone-less microsecond timestamp.

use std::sync::{Arc, LazyLock};

use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, StringBuilder, StringDictionaryBuilder,
    TimestampMicrosecondBuilder, UInt8Builder, UInt64Builder,
};
use arrow::datatypes::{DataType, Field, Int32Type, Schema, SchemaRef, TimeUnit};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::record::{RestaurantRecord, ReviewRecord};

fn categorical(name: &str) -> Field {
    Field::new(
        name,
        DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8)),
        false,
    )
}

static RESTAURANTS_SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    Arc::new(Schema::new(vec![
        Field::new("restaurant_id", DataType::Utf8, false),
        Field::new("name", DataType::Utf8, false),
        categorical("grid"),
        Field::new("address", DataType::Utf8, false),
        Field::new("rating", DataType::Float64, false),
        Field::new("user_ratings_total", DataType::UInt64, false),
        Field::new("phone_number", DataType::Utf8, false),
        Field::new("reviews_count", DataType::UInt64, false),
        Field::new("source_path", DataType::Utf8, false),
    ]))
});

static REVIEWS_SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    Arc::new(Schema::new(vec![
        Field::new("review_id", DataType::Utf8, false),
        Field::new("restaurant_id", DataType::Utf8, false),
        Field::new("restaurant_name", DataType::Utf8, false),
        categorical("grid"),
        Field::new("date_original", DataType::Utf8, false),
        Field::new(
            "estimated_date",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            false,
        ),
        Field::new("is_modified", DataType::Boolean, false),
        categorical("language"),
        Field::new("rating", DataType::UInt8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("text_length", DataType::UInt64, false),
    ]))
});

/// Schema of the `restaurants` table.
pub fn restaurants_schema() -> SchemaRef {
    Arc::clone(&RESTAURANTS_SCHEMA)
}

/// Schema of the `reviews` table.
pub fn reviews_schema() -> SchemaRef {
    Arc::clone(&REVIEWS_SCHEMA)
}

/// Build the `restaurants` batch, preserving input order.
pub fn restaurants_batch(rows: &[RestaurantRecord]) -> Result<RecordBatch, ArrowError> {
    let n = rows.len();
    let mut restaurant_id = StringBuilder::with_capacity(n, n * 16);
    let mut name = StringBuilder::with_capacity(n, n * 16);
    let mut grid = StringDictionaryBuilder::<Int32Type>::new();
    let mut address = StringBuilder::with_capacity(n, n * 32);
    let mut rating = Float64Builder::with_capacity(n);
    let mut user_ratings_total = UInt64Builder::with_capacity(n);
    let mut phone_number = StringBuilder::with_capacity(n, n * 16);
    let mut reviews_count = UInt64Builder::with_capacity(n);
    let mut source_path = StringBuilder::with_capacity(n, n * 32);

    for r in rows {
        restaurant_id.append_value(&r.restaurant_id);
        name.append_value(&r.name);
        grid.append_value(&r.grid);
        address.append_value(&r.address);
        rating.append_value(r.rating);
        user_ratings_total.append_value(r.user_ratings_total);
        phone_number.append_value(&r.phone_number);
        reviews_count.append_value(r.reviews_count);
        source_path.append_value(&r.source_path);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(restaurant_id.finish()),
        Arc::new(name.finish()),
        Arc::new(grid.finish()),
        Arc::new(address.finish()),
        Arc::new(rating.finish()),
        Arc::new(user_ratings_total.finish()),
        Arc::new(phone_number.finish()),
        Arc::new(reviews_count.finish()),
        Arc::new(source_path.finish()),
    ];
    RecordBatch::try_new(restaurants_schema(), columns)
}

/// Build the `reviews` batch, preserving input order.
pub fn reviews_batch(rows: &[ReviewRecord]) -> Result<RecordBatch, ArrowError> {
    let n = rows.len();
    let mut review_id = StringBuilder::with_capacity(n, n * 16);
    let mut restaurant_id = StringBuilder::with_capacity(n, n * 16);
    let mut restaurant_name = StringBuilder::with_capacity(n, n * 16);
    let mut grid = StringDictionaryBuilder::<Int32Type>::new();
    let mut date_original = StringBuilder::with_capacity(n, n * 8);
    let mut estimated_date = TimestampMicrosecondBuilder::with_capacity(n);
    let mut is_modified = BooleanBuilder::with_capacity(n);
    let mut language = StringDictionaryBuilder::<Int32Type>::new();
    let mut rating = UInt8Builder::with_capacity(n);
    let mut text = StringBuilder::with_capacity(n, n * 64);
    let mut text_length = UInt64Builder::with_capacity(n);

    for r in rows {
        review_id.append_value(&r.review_id);
        restaurant_id.append_value(&r.restaurant_id);
        restaurant_name.append_value(&r.restaurant_name);
        grid.append_value(&r.grid);
        date_original.append_value(&r.date_original);
        estimated_date.append_value(r.estimated_date.and_utc().timestamp_micros());
        is_modified.append_value(r.is_modified);
        language.append_value(&r.language);
        rating.append_value(r.rating);
        text.append_value(&r.text);
        text_length.append_value(r.text_length);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(review_id.finish()),
        Arc::new(restaurant_id.finish()),
        Arc::new(restaurant_name.finish()),
        Arc::new(grid.finish()),
        Arc::new(date_original.finish()),
        Arc::new(estimated_date.finish()),
        Arc::new(is_modified.finish()),
        Arc::new(language.finish()),
        Arc::new(rating.finish()),
        Arc::new(text.finish()),
        Arc::new(text_length.finish()),
    ];
    RecordBatch::try_new(reviews_schema(), columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray, DictionaryArray};
    use arrow::datatypes::{TimestampMicrosecondType, UInt8Type};
    use chrono::NaiveDate;

    fn restaurant(id: &str, grid: &str) -> RestaurantRecord {
        RestaurantRecord {
            restaurant_id: id.to_string(),
            name: format!("name-{id}"),
            grid: grid.to_string(),
            address: String::new(),
            rating: 4.0,
            user_ratings_total: 10,
            phone_number: String::new(),
            reviews_count: 1,
            source_path: format!("{id}_reviews.json"),
        }
    }

    fn review(id: &str, language: &str, rating: u8) -> ReviewRecord {
        ReviewRecord {
            review_id: id.to_string(),
            restaurant_id: "p1".to_string(),
            restaurant_name: "n".to_string(),
            grid: "G1".to_string(),
            date_original: "1일 전".to_string(),
            estimated_date: NaiveDate::from_ymd_opt(2025, 1, 26)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
            is_modified: false,
            language: language.to_string(),
            rating,
            text: "hi".to_string(),
            text_length: 2,
        }
    }

    #[test]
    fn restaurants_batch_dictionary_encodes_grid() {
        let rows = vec![restaurant("a", "G1"), restaurant("b", "G2"), restaurant("c", "G1")];
        let batch = restaurants_batch(&rows).unwrap();

        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.schema(), restaurants_schema());

        let grid = batch
            .column_by_name("grid")
            .unwrap()
            .as_any()
            .downcast_ref::<DictionaryArray<Int32Type>>()
            .unwrap();
        assert_eq!(grid.values().len(), 2);
        assert_eq!(grid.keys().value(0), grid.keys().value(2));
    }

    #[test]
    fn reviews_batch_uses_narrow_rating_and_micros() {
        let rows = vec![review("r1", "ko", 5), review("r2", "en", 1)];
        let batch = reviews_batch(&rows).unwrap();

        let rating = batch
            .column_by_name("rating")
            .unwrap()
            .as_primitive::<UInt8Type>();
        assert_eq!(rating.values().to_vec(), vec![5, 1]);

        let ts = batch
            .column_by_name("estimated_date")
            .unwrap()
            .as_primitive::<TimestampMicrosecondType>();
        assert_eq!(ts.value(0), rows[0].estimated_date.and_utc().timestamp_micros());
    }

    #[test]
    fn empty_input_builds_empty_batch() {
        let batch = reviews_batch(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), reviews_schema().fields().len());
    }
}
