//! Core data types for fundamentals extraction.
//!
//! This module defines the fundamental data structures:
//!
//! - [`PeriodSpan`] - Duration or instant window of a context
//! - [`PeriodDescriptor`] - A context declared by a filing
//! - [`PeriodLabel`] - Fiscal year or quarter-end date a value is filed under
//! - [`Concept`] - Financial line item with alternate tag names
//! - [`QualifiedTag`] - Normalized, namespace-qualified tag name
//! - [`Fact`] - A resolved value
//! - [`FilingMetadata`] - Document and entity information (DEI) facts

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FilingError;

/// Display format of quarter-end labels.
pub const QUARTER_LABEL_FORMAT: &str = "%d/%m/%Y";

/// Whether a context covers a range of days or a single day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    /// A start and end date.
    Duration,
    /// A single date.
    Instant,
}

/// The reporting window a context declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodSpan {
    /// A range of days, e.g. a fiscal year or a quarter.
    Duration {
        /// First day of the period.
        start: NaiveDate,
        /// Last day of the period.
        end: NaiveDate,
    },
    /// A point in time, e.g. a balance sheet date.
    Instant(NaiveDate),
}

impl PeriodSpan {
    /// Returns the kind of this span.
    #[must_use]
    pub const fn kind(&self) -> PeriodKind {
        match self {
            Self::Duration { .. } => PeriodKind::Duration,
            Self::Instant(_) => PeriodKind::Instant,
        }
    }

    /// Number of days between start and end, for durations.
    #[must_use]
    pub fn days(&self) -> Option<i64> {
        match self {
            Self::Duration { start, end } => Some(end.signed_duration_since(*start).num_days()),
            Self::Instant(_) => None,
        }
    }

    /// End date of a duration, or the date of an instant.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        match self {
            Self::Duration { end, .. } => *end,
            Self::Instant(date) => *date,
        }
    }
}

/// A context declared once per filing.
///
/// Several descriptors may denote the same real-world period; dimensional
/// breakdowns usually carry longer ids than the company-wide context.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodDescriptor {
    /// Context id referenced by facts.
    pub id: String,
    /// Reporting window.
    pub span: PeriodSpan,
}

impl PeriodDescriptor {
    /// Creates a duration descriptor.
    #[must_use]
    pub fn duration(id: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: id.into(),
            span: PeriodSpan::Duration { start, end },
        }
    }

    /// Creates an instant descriptor.
    #[must_use]
    pub fn instant(id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            span: PeriodSpan::Instant(date),
        }
    }

    /// Returns the kind of this descriptor.
    #[must_use]
    pub const fn kind(&self) -> PeriodKind {
        self.span.kind()
    }

    /// Length of the id, the basis of every shorter-id tie-break.
    #[must_use]
    pub fn id_len(&self) -> usize {
        self.id.chars().count()
    }
}

/// The period a resolved value is filed under.
///
/// Serialized as its display string so it can key JSON maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PeriodLabel {
    /// A fiscal year (annual and year-end tiers).
    FiscalYear(i32),
    /// The end date of the latest quarter described by a filing.
    QuarterEnd(NaiveDate),
}

impl PeriodLabel {
    /// Returns the fiscal year, if this is a fiscal-year label.
    #[must_use]
    pub const fn fiscal_year(&self) -> Option<i32> {
        match self {
            Self::FiscalYear(year) => Some(*year),
            Self::QuarterEnd(_) => None,
        }
    }

    /// Returns the quarter-end date, if this is a quarter label.
    #[must_use]
    pub const fn quarter_end(&self) -> Option<NaiveDate> {
        match self {
            Self::FiscalYear(_) => None,
            Self::QuarterEnd(date) => Some(*date),
        }
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FiscalYear(year) => write!(f, "{year}"),
            Self::QuarterEnd(date) => write!(f, "{}", date.format(QUARTER_LABEL_FORMAT)),
        }
    }
}

impl FromStr for PeriodLabel {
    type Err = FilingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(year) = s.parse::<i32>() {
            return Ok(Self::FiscalYear(year));
        }
        NaiveDate::parse_from_str(s, QUARTER_LABEL_FORMAT)
            .map(Self::QuarterEnd)
            .map_err(|e| FilingError::InvalidParameter(format!("Invalid period label {s:?}: {e}")))
    }
}

impl From<PeriodLabel> for String {
    fn from(label: PeriodLabel) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for PeriodLabel {
    type Error = FilingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<i32> for PeriodLabel {
    fn from(year: i32) -> Self {
        Self::FiscalYear(year)
    }
}

/// A financial line item and the tag names filers use for it.
///
/// The canonical tag doubles as the concept's column name in the fact table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Concept {
    /// Canonical tag name, without a taxonomy prefix (e.g. "Revenues").
    pub canonical_tag: String,
    /// Alternate tag names, tried in order.
    #[serde(default)]
    pub alternates: Vec<String>,
}

impl Concept {
    /// Creates a concept with no alternates.
    #[must_use]
    pub fn new(canonical_tag: impl Into<String>) -> Self {
        Self {
            canonical_tag: canonical_tag.into(),
            alternates: Vec::new(),
        }
    }

    /// Appends an alternate tag name.
    #[must_use]
    pub fn with_alternate(mut self, alternate: impl Into<String>) -> Self {
        self.alternates.push(alternate.into());
        self
    }

    /// Appends several alternate tag names.
    #[must_use]
    pub fn with_alternates<I, S>(mut self, alternates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternates.extend(alternates.into_iter().map(Into::into));
        self
    }

    /// Name the concept's values are stored under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.canonical_tag
    }
}

impl From<&str> for Concept {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A tag name qualified with its taxonomy prefix, lowercased.
///
/// Built once per lookup by [`QualifiedTag::normalize`]; markup lookups
/// compare both parts case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedTag {
    prefix: String,
    local_name: String,
}

impl QualifiedTag {
    /// Maps a concept name to its fully-qualified tag name.
    ///
    /// A name that already carries `prefix:` is not prefixed twice.
    #[must_use]
    pub fn normalize(prefix: &str, name: &str) -> Self {
        let prefix = prefix.trim().trim_end_matches(':').to_lowercase();
        let name = name.trim().to_lowercase();
        let local_name = name
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .map_or_else(|| name.clone(), str::to_string);
        Self { prefix, local_name }
    }

    /// Taxonomy prefix, e.g. "us-gaap".
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Local element name, e.g. "revenues".
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

impl fmt::Display for QualifiedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local_name)
    }
}

/// A resolved value for one concept and period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Concept name.
    pub concept: String,
    /// Period the value is filed under.
    pub period: PeriodLabel,
    /// Numeric value.
    pub value: f64,
}

impl Fact {
    /// Creates a new fact.
    #[must_use]
    pub fn new(concept: impl Into<String>, period: PeriodLabel, value: f64) -> Self {
        Self {
            concept: concept.into(),
            period,
            value,
        }
    }
}

/// Document and entity information reported alongside the financial facts.
///
/// Every field is independently optional; a filing without DEI facts yields
/// the default value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingMetadata {
    /// Last day of the period the document reports on.
    pub document_period_end_date: Option<NaiveDate>,
    /// Fiscal year the document focuses on.
    pub fiscal_year_focus: Option<i32>,
    /// Context id of the fiscal-year-focus fact.
    pub fiscal_year_focus_context: Option<String>,
    /// Sum of all reported share classes outstanding.
    pub entity_shares_outstanding: Option<i64>,
}

impl FilingMetadata {
    /// Returns the document end date and fiscal-year focus when both are known.
    ///
    /// Only then can annual contexts be aligned to the filer's fiscal calendar.
    #[must_use]
    pub fn fiscal_alignment(&self) -> Option<(NaiveDate, i32)> {
        self.document_period_end_date.zip(self.fiscal_year_focus)
    }

    /// Fiscal year of `end` under this filing's calendar.
    ///
    /// Returns `None` if `end` does not fall on the document end date's month
    /// and day, or if the alignment is unknown.
    #[must_use]
    pub fn aligned_year(&self, end: NaiveDate) -> Option<i32> {
        let (document_end, focus) = self.fiscal_alignment()?;
        if end.month() != document_end.month() || end.day() != document_end.day() {
            return None;
        }
        Some(focus - (document_end.year() - end.year()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_span_days_and_end() {
        let year = PeriodSpan::Duration {
            start: date(2019, 1, 1),
            end: date(2019, 12, 31),
        };
        assert_eq!(year.days(), Some(364));
        assert_eq!(year.end(), date(2019, 12, 31));
        assert_eq!(year.kind(), PeriodKind::Duration);

        let instant = PeriodSpan::Instant(date(2019, 12, 31));
        assert_eq!(instant.days(), None);
        assert_eq!(instant.kind(), PeriodKind::Instant);
    }

    #[rstest]
    #[case("us-gaap", "Revenues", "us-gaap:revenues")]
    #[case("us-gaap", "us-gaap:Revenues", "us-gaap:revenues")]
    #[case("US-GAAP:", "SalesRevenueNet", "us-gaap:salesrevenuenet")]
    #[case("us-gaap", "EPS", "us-gaap:eps")]
    #[case("dei", "DocumentPeriodEndDate", "dei:documentperiodenddate")]
    fn test_tag_normalization(#[case] prefix: &str, #[case] name: &str, #[case] expected: &str) {
        assert_eq!(QualifiedTag::normalize(prefix, name).to_string(), expected);
    }

    #[test]
    fn test_label_display_and_parse() {
        let year = PeriodLabel::FiscalYear(2019);
        assert_eq!(year.to_string(), "2019");
        assert_eq!("2019".parse::<PeriodLabel>().unwrap(), year);

        let quarter = PeriodLabel::QuarterEnd(date(2020, 3, 28));
        assert_eq!(quarter.to_string(), "28/03/2020");
        assert_eq!("28/03/2020".parse::<PeriodLabel>().unwrap(), quarter);

        assert!("Q3".parse::<PeriodLabel>().is_err());
    }

    #[test]
    fn test_labels_order_years_before_quarters() {
        let mut labels = vec![
            PeriodLabel::QuarterEnd(date(2018, 6, 30)),
            PeriodLabel::FiscalYear(2020),
            PeriodLabel::FiscalYear(2019),
        ];
        labels.sort();
        assert_eq!(labels[0], PeriodLabel::FiscalYear(2019));
        assert_eq!(labels[2].quarter_end(), Some(date(2018, 6, 30)));
    }

    #[test]
    fn test_concept_builder() {
        let concept = Concept::new("Revenues")
            .with_alternate("SalesRevenueNet")
            .with_alternates(["RevenueFromContractWithCustomerExcludingAssessedTax"]);
        assert_eq!(concept.name(), "Revenues");
        assert_eq!(concept.alternates.len(), 2);
        assert_eq!(concept.alternates[0], "SalesRevenueNet");
    }

    #[test]
    fn test_metadata_alignment() {
        let metadata = FilingMetadata {
            document_period_end_date: Some(date(2019, 9, 28)),
            fiscal_year_focus: Some(2019),
            ..Default::default()
        };
        assert_eq!(metadata.aligned_year(date(2019, 9, 28)), Some(2019));
        assert_eq!(metadata.aligned_year(date(2017, 9, 28)), Some(2017));
        assert_eq!(metadata.aligned_year(date(2019, 9, 29)), None);

        let partial = FilingMetadata {
            fiscal_year_focus: Some(2019),
            ..Default::default()
        };
        assert_eq!(partial.fiscal_alignment(), None);
        assert_eq!(partial.aligned_year(date(2019, 9, 28)), None);
    }
}
