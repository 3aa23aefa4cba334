//! Aggregate statistics reported after a conversion run.
//!
//! These figures are for humans reading the run output; nothing downstream
//! should depend on them programmatically.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::record::{RestaurantRecord, ReviewRecord};

/// Grids listed in the distribution.
pub const TOP_GRIDS: usize = 10;

/// Languages listed in the distribution.
pub const TOP_LANGUAGES: usize = 5;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A categorical value with its frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct Share<T> {
    /// Category value.
    pub value: T,
    /// Number of rows carrying it.
    pub count: usize,
    /// `count` as a percentage of all rows.
    pub percent: f64,
}

/// Statistics over the `restaurants` table.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantStats {
    /// Row count.
    pub total: usize,
    /// Most frequent grids, descending.
    pub top_grids: Vec<Share<String>>,
    /// Mean of `rating`.
    pub avg_rating: f64,
    /// Mean of the declared `reviews_count`.
    pub avg_reviews_count: f64,
}

/// Statistics over the `reviews` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewStats {
    /// Row count.
    pub total: usize,
    /// Most frequent languages, descending.
    pub top_languages: Vec<Share<String>>,
    /// Mean of `text_length`.
    pub avg_text_length: f64,
    /// Every rating value present, ascending.
    pub rating_distribution: Vec<Share<u8>>,
}

/// Sizes of the written canonical tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputSizes {
    /// `restaurants.parquet` size in bytes.
    pub restaurants_bytes: u64,
    /// `reviews.parquet` size in bytes.
    pub reviews_bytes: u64,
}

impl OutputSizes {
    /// `restaurants_bytes` in MiB.
    pub fn restaurants_mb(&self) -> f64 {
        self.restaurants_bytes as f64 / BYTES_PER_MB
    }

    /// `reviews_bytes` in MiB.
    pub fn reviews_mb(&self) -> f64 {
        self.reviews_bytes as f64 / BYTES_PER_MB
    }
}

/// Everything printed at the end of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Restaurant table statistics.
    pub restaurants: RestaurantStats,
    /// Review table statistics.
    pub reviews: ReviewStats,
    /// Output file sizes.
    pub sizes: OutputSizes,
}

impl RunSummary {
    /// Compute statistics over the converted rows.
    pub fn compute(
        restaurants: &[RestaurantRecord],
        reviews: &[ReviewRecord],
        sizes: OutputSizes,
    ) -> Self {
        Self {
            restaurants: RestaurantStats {
                total: restaurants.len(),
                top_grids: top_shares(restaurants.iter().map(|r| r.grid.as_str()), TOP_GRIDS),
                avg_rating: mean(restaurants.iter().map(|r| r.rating)),
                avg_reviews_count: mean(restaurants.iter().map(|r| r.reviews_count as f64)),
            },
            reviews: ReviewStats {
                total: reviews.len(),
                top_languages: top_shares(
                    reviews.iter().map(|r| r.language.as_str()),
                    TOP_LANGUAGES,
                ),
                avg_text_length: mean(reviews.iter().map(|r| r.text_length as f64)),
                rating_distribution: rating_shares(reviews),
            },
            sizes,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Frequencies sorted by count descending, ties broken by value.
fn top_shares<'a>(values: impl Iterator<Item = &'a str>, limit: usize) -> Vec<Share<String>> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0;
    for v in values {
        *counts.entry(v).or_default() += 1;
        total += 1;
    }

    let mut sorted: Vec<(&str, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted
        .into_iter()
        .take(limit)
        .map(|(value, count)| Share {
            value: value.to_string(),
            count,
            percent: percent(count, total),
        })
        .collect()
}

fn rating_shares(reviews: &[ReviewRecord]) -> Vec<Share<u8>> {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for r in reviews {
        *counts.entry(r.rating).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(value, count)| Share {
            value,
            count,
            percent: percent(count, reviews.len()),
        })
        .collect()
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.restaurants;
        writeln!(f, "Restaurants:")?;
        writeln!(f, "  total: {}", r.total)?;
        writeln!(f, "  grid distribution:")?;
        for share in &r.top_grids {
            writeln!(f, "    {}: {}", share.value, share.count)?;
        }
        writeln!(f, "  average rating: {:.2}", r.avg_rating)?;
        writeln!(f, "  average review count: {:.1}", r.avg_reviews_count)?;

        let v = &self.reviews;
        writeln!(f, "Reviews:")?;
        writeln!(f, "  total: {}", v.total)?;
        writeln!(f, "  language distribution:")?;
        for share in &v.top_languages {
            writeln!(f, "    {}: {} ({:.1}%)", share.value, share.count, share.percent)?;
        }
        writeln!(f, "  average text length: {:.0}", v.avg_text_length)?;
        writeln!(f, "  rating distribution:")?;
        for share in &v.rating_distribution {
            writeln!(f, "    {}: {} ({:.1}%)", share.value, share.count, share.percent)?;
        }

        writeln!(f, "File sizes:")?;
        writeln!(f, "  restaurants.parquet: {:.2} MB", self.sizes.restaurants_mb())?;
        write!(f, "  reviews.parquet: {:.2} MB", self.sizes.reviews_mb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn restaurant(grid: &str, rating: f64, reviews_count: u64) -> RestaurantRecord {
        RestaurantRecord {
            restaurant_id: String::new(),
            name: String::new(),
            grid: grid.to_string(),
            address: String::new(),
            rating,
            user_ratings_total: 0,
            phone_number: String::new(),
            reviews_count,
            source_path: String::new(),
        }
    }

    fn review(language: &str, rating: u8, text: &str) -> ReviewRecord {
        ReviewRecord {
            review_id: String::new(),
            restaurant_id: String::new(),
            restaurant_name: String::new(),
            grid: String::new(),
            date_original: String::new(),
            estimated_date: NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
            is_modified: false,
            language: language.to_string(),
            rating,
            text: text.to_string(),
            text_length: text.chars().count() as u64,
        }
    }

    #[test]
    fn computes_distributions_and_means() {
        let restaurants = vec![
            restaurant("B", 4.0, 10),
            restaurant("A", 3.0, 0),
            restaurant("B", 5.0, 5),
        ];
        let reviews = vec![
            review("ko", 5, "좋아요"),
            review("en", 1, "bad"),
            review("ko", 5, "최고"),
            review("ja", 3, "a"),
        ];
        let summary = RunSummary::compute(&restaurants, &reviews, OutputSizes::default());

        assert_eq!(summary.restaurants.total, 3);
        assert_eq!(summary.restaurants.top_grids[0].value, "B");
        assert_eq!(summary.restaurants.top_grids[0].count, 2);
        assert_eq!(summary.restaurants.top_grids[1].value, "A");
        assert!((summary.restaurants.avg_rating - 4.0).abs() < 1e-9);
        assert!((summary.restaurants.avg_reviews_count - 5.0).abs() < 1e-9);

        let langs: Vec<_> = summary
            .reviews
            .top_languages
            .iter()
            .map(|s| (s.value.as_str(), s.count))
            .collect();
        // Ties sort by value.
        assert_eq!(langs, vec![("ko", 2), ("en", 1), ("ja", 1)]);
        assert!((summary.reviews.top_languages[0].percent - 50.0).abs() < 1e-9);

        let ratings: Vec<_> = summary
            .reviews
            .rating_distribution
            .iter()
            .map(|s| (s.value, s.count))
            .collect();
        assert_eq!(ratings, vec![(1, 1), (3, 1), (5, 2)]);
        assert!((summary.reviews.avg_text_length - 2.25).abs() < 1e-9);
    }

    #[test]
    fn top_grids_is_capped() {
        let restaurants: Vec<_> = (0..15)
            .map(|i| restaurant(&format!("G{i:02}"), 1.0, 1))
            .collect();
        let summary = RunSummary::compute(&restaurants, &[], OutputSizes::default());
        assert_eq!(summary.restaurants.top_grids.len(), TOP_GRIDS);
        assert_eq!(summary.reviews.avg_text_length, 0.0);
    }

    #[test]
    fn display_mentions_every_section() {
        let summary = RunSummary::compute(
            &[restaurant("G1", 4.5, 2)],
            &[review("ko", 4, "맛집")],
            OutputSizes {
                restaurants_bytes: 2 * 1024 * 1024,
                reviews_bytes: 0,
            },
        );
        let text = summary.to_string();
        assert!(text.contains("G1: 1"));
        assert!(text.contains("ko: 1 (100.0%)"));
        assert!(text.contains("restaurants.parquet: 2.00 MB"));
    }
}
