use std::path::Path;

use review_table_core::pipeline::ConversionReport;
use review_table_core::summary::Share;
use tabled::{
    builder::Builder,
    settings::{Style, object::Rows, style::LineText, width::MinWidth},
};

const TITLE_OFFSET: usize = 2;

fn render_table(title: &str, columns: &[&str], rows: &[Vec<String>]) -> String {
    let min_width = TITLE_OFFSET + title.chars().count() + 4;

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_string()));
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.with(MinWidth::new(min_width));
    table.with(LineText::new(title, Rows::first()).offset(TITLE_OFFSET));
    // LineText re-estimates dimensions, so re-apply MinWidth afterwards.
    table.with(MinWidth::new(min_width));
    table.to_string()
}

fn share_rows<T: ToString>(shares: &[Share<T>]) -> Vec<Vec<String>> {
    shares
        .iter()
        .map(|s| {
            vec![
                s.value.to_string(),
                s.count.to_string(),
                format!("{:.1}%", s.percent),
            ]
        })
        .collect()
}

/// Render the end-of-run report as a sequence of tables.
pub fn render_report(report: &ConversionReport) -> String {
    let summary = &report.summary;
    let r = &summary.restaurants;
    let v = &summary.reviews;

    let overview = render_table(
        "Conversion",
        &["metric", "value"],
        &[
            vec!["files found".into(), report.files_found.to_string()],
            vec!["files converted".into(), report.files_succeeded.to_string()],
            vec!["files failed".into(), report.failed.len().to_string()],
            vec!["restaurants".into(), r.total.to_string()],
            vec!["average rating".into(), format!("{:.2}", r.avg_rating)],
            vec![
                "average review count".into(),
                format!("{:.1}", r.avg_reviews_count),
            ],
            vec!["reviews".into(), v.total.to_string()],
            vec![
                "average text length".into(),
                format!("{:.0}", v.avg_text_length),
            ],
            vec![
                "restaurants.parquet".into(),
                format!("{:.2} MB", summary.sizes.restaurants_mb()),
            ],
            vec![
                "reviews.parquet".into(),
                format!("{:.2} MB", summary.sizes.reviews_mb()),
            ],
        ],
    );

    let grids = render_table(
        "Top grids",
        &["grid", "restaurants", "share"],
        &share_rows(&r.top_grids),
    );
    let languages = render_table(
        "Top languages",
        &["language", "reviews", "share"],
        &share_rows(&v.top_languages),
    );
    let ratings = render_table(
        "Review ratings",
        &["rating", "reviews", "share"],
        &share_rows(&v.rating_distribution),
    );

    [overview, grids, languages, ratings].join("\n")
}

/// List of output files, one per line.
pub fn render_outputs(report: &ConversionReport) -> String {
    let o = &report.outputs;
    let files: [&Path; 4] = [
        &o.restaurants_parquet,
        &o.reviews_parquet,
        &o.sample_restaurants_csv,
        &o.sample_reviews_csv,
    ];
    let mut out = String::from("Generated files:\n");
    for file in files {
        out.push_str(&format!("  - {}\n", file.display()));
    }
    out
}

/// Failed inputs, or `None` when every file converted.
pub fn render_failed(report: &ConversionReport) -> Option<String> {
    if report.failed.is_empty() {
        return None;
    }
    let rows: Vec<Vec<String>> = report
        .failed
        .iter()
        .map(|f| vec![f.path.display().to_string(), f.reason.clone()])
        .collect();
    Some(render_table("Failed files", &["file", "reason"], &rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_table_includes_title_and_cells() {
        let rows = vec![
            vec!["ko".to_string(), "3".to_string()],
            vec!["en".to_string(), "12".to_string()],
        ];
        let rendered = render_table("Top languages", &["language", "reviews"], &rows);

        assert!(rendered.contains("Top languages"));
        assert!(rendered.contains("language"));
        assert!(rendered.contains("12"));
        let widths: Vec<usize> = rendered.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn share_rows_format_percentages() {
        let shares = vec![Share {
            value: 5u8,
            count: 2,
            percent: 66.666,
        }];
        assert_eq!(
            share_rows(&shares),
            vec![vec!["5".to_string(), "2".to_string(), "66.7%".to_string()]]
        );
    }
}
