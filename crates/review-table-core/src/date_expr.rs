//! Parsing of localized relative date expressions.
//!
//! Review sources render dates as short human phrases such as `"2주 전"`,
//! `"수정일: 3달 전"` or `"a week ago"`. [`DateExpressionParser`] turns such a
//! phrase plus a reference instant into an estimated absolute timestamp and
//! an "edited" flag.
//!
//! Recognition is keyword driven. The keyword tables live in
//! [`DateVocabulary`] so new languages or spellings can be added without
//! touching the parsing logic:
//!
//! - edited markers (stripped before parsing, set `is_modified`)
//! - relative markers (the word for "ago"; without one the text is not
//!   treated as relative and resolves to `now`)
//! - unit rules, scanned in priority order; the first keyword found wins
//!
//! All matching is substring based over the lowercased text. Unit lengths are
//! fixed approximations (a month is 30 days, a year 365), not calendar aware.

use chrono::{NaiveDateTime, TimeDelta};
use log::Log;
use snafu::prelude::*;

use crate::run_log::log_to;

/// Errors from [`DateExpressionParser::try_parse`].
///
/// These never escape [`DateExpressionParser::parse`], which degrades to the
/// reference instant instead.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum DateParseError {
    /// The numeric literal does not fit in an `i64`.
    #[snafu(display("Number literal {literal} is too large"))]
    NumberOverflow {
        /// The offending digits.
        literal: String,
    },

    /// `magnitude * days_per_unit` overflowed or exceeds the representable span.
    #[snafu(display("Day count {magnitude} x {days_per_unit} is out of range"))]
    DayCountOverflow {
        /// Parsed magnitude.
        magnitude: i64,
        /// Days per matched unit.
        days_per_unit: i64,
    },

    /// Subtracting the day count from the reference instant underflowed.
    #[snafu(display("{days_ago} days before the reference instant is out of range"))]
    TimestampUnderflow {
        /// Requested number of days in the past.
        days_ago: i64,
    },
}

/// One unit keyword and its fixed day multiplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRule {
    /// Language code the keyword belongs to (informational).
    pub language: String,
    /// Keyword to look for; stored lowercased.
    pub keyword: String,
    /// Days represented by one unit.
    pub days: i64,
}

impl UnitRule {
    /// Create a rule; the keyword is lowercased for matching.
    pub fn new(language: impl Into<String>, keyword: &str, days: i64) -> Self {
        Self {
            language: language.into(),
            keyword: keyword.to_lowercase(),
            days,
        }
    }
}

/// Keyword tables driving [`DateExpressionParser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateVocabulary {
    edited_markers: Vec<String>,
    relative_markers: Vec<String>,
    units: Vec<UnitRule>,
}

impl DateVocabulary {
    /// An empty vocabulary; nothing is recognized until rules are added.
    pub fn empty() -> Self {
        Self {
            edited_markers: Vec::new(),
            relative_markers: Vec::new(),
            units: Vec::new(),
        }
    }

    /// Add a marker that flags the expression as edited.
    pub fn with_edited_marker(mut self, marker: &str) -> Self {
        self.edited_markers.push(marker.to_lowercase());
        self
    }

    /// Add a word meaning "ago".
    pub fn with_relative_marker(mut self, marker: &str) -> Self {
        self.relative_markers.push(marker.to_lowercase());
        self
    }

    /// Append a unit rule at the lowest priority.
    pub fn with_unit(mut self, rule: UnitRule) -> Self {
        self.units.push(rule);
        self
    }

    /// Unit rules in priority order.
    pub fn units(&self) -> &[UnitRule] {
        &self.units
    }
}

impl Default for DateVocabulary {
    /// Korean and English, with day > week > month > year priority.
    fn default() -> Self {
        Self::empty()
            .with_edited_marker("수정일:")
            .with_edited_marker("수정일：")
            .with_edited_marker("edited")
            .with_relative_marker("전")
            .with_relative_marker("ago")
            .with_unit(UnitRule::new("ko", "일", 1))
            .with_unit(UnitRule::new("en", "day", 1))
            .with_unit(UnitRule::new("ko", "주", 7))
            .with_unit(UnitRule::new("en", "week", 7))
            .with_unit(UnitRule::new("ko", "달", 30))
            .with_unit(UnitRule::new("en", "month", 30))
            .with_unit(UnitRule::new("ko", "년", 365))
            .with_unit(UnitRule::new("en", "year", 365))
    }
}

/// Result of parsing one date expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    /// Estimated absolute timestamp.
    pub estimated: NaiveDateTime,
    /// Whether the expression carried an edited marker.
    pub is_modified: bool,
}

/// Converts free-text relative dates into absolute timestamps.
#[derive(Debug, Clone, Default)]
pub struct DateExpressionParser {
    vocabulary: DateVocabulary,
}

impl DateExpressionParser {
    /// Build a parser over a custom vocabulary.
    pub fn new(vocabulary: DateVocabulary) -> Self {
        Self { vocabulary }
    }

    /// The vocabulary in use.
    pub fn vocabulary(&self) -> &DateVocabulary {
        &self.vocabulary
    }

    /// Parse `text` relative to `now`, degrading to `(now, false)` on error.
    ///
    /// Failures are reported as warnings on `logger`.
    pub fn parse(&self, text: &str, now: NaiveDateTime, logger: &dyn Log) -> ParsedDate {
        match self.try_parse(text, now) {
            Ok(parsed) => parsed,
            Err(e) => {
                log_to!(logger, Warn, "Date parse failed: {text} - {e}");
                ParsedDate {
                    estimated: now,
                    is_modified: false,
                }
            }
        }
    }

    /// Parse `text` relative to `now`, surfacing arithmetic failures.
    pub fn try_parse(&self, text: &str, now: NaiveDateTime) -> Result<ParsedDate, DateParseError> {
        let mut normalized = text.to_lowercase();
        let mut is_modified = false;

        for marker in &self.vocabulary.edited_markers {
            if normalized.contains(marker.as_str()) {
                is_modified = true;
                normalized = normalized.replace(marker.as_str(), "");
            }
        }
        let normalized = normalized.trim();

        let is_relative = self
            .vocabulary
            .relative_markers
            .iter()
            .any(|m| normalized.contains(m.as_str()));
        if !is_relative {
            return Ok(ParsedDate {
                estimated: now,
                is_modified,
            });
        }

        let magnitude = first_integer(normalized)?.unwrap_or(1);
        let days_per_unit = self
            .vocabulary
            .units
            .iter()
            .find(|rule| normalized.contains(rule.keyword.as_str()))
            .map_or(0, |rule| rule.days);

        let days_ago = magnitude
            .checked_mul(days_per_unit)
            .context(DayCountOverflowSnafu {
                magnitude,
                days_per_unit,
            })?;
        let delta = TimeDelta::try_days(days_ago).context(DayCountOverflowSnafu {
            magnitude,
            days_per_unit,
        })?;
        let estimated = now
            .checked_sub_signed(delta)
            .context(TimestampUnderflowSnafu { days_ago })?;

        Ok(ParsedDate {
            estimated,
            is_modified,
        })
    }
}

/// Value of a decimal digit: ASCII `0-9` or full-width `０-９`.
fn decimal_digit(c: char) -> Option<u32> {
    c.to_digit(10).or_else(|| {
        ('\u{FF10}'..='\u{FF19}')
            .contains(&c)
            .then(|| c as u32 - 0xFF10)
    })
}

/// First run of decimal digits in `text`, if any.
fn first_integer(text: &str) -> Result<Option<i64>, DateParseError> {
    let mut digits = text
        .chars()
        .skip_while(|c| decimal_digit(*c).is_none())
        .map_while(decimal_digit)
        .peekable();
    if digits.peek().is_none() {
        return Ok(None);
    }

    let literal: Vec<u32> = digits.collect();
    literal
        .iter()
        .try_fold(0i64, |acc, d| acc.checked_mul(10)?.checked_add(i64::from(*d)))
        .map(Some)
        .ok_or_else(|| DateParseError::NumberOverflow {
            literal: literal
                .iter()
                .filter_map(|d| char::from_digit(*d, 10))
                .collect(),
        })
}
