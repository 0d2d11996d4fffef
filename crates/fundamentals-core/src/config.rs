//! Extraction configuration.
//!
//! Every heuristic threshold used to classify contexts is a named setting
//! with a default. Historical versions of these heuristics disagree on some
//! values (notably the fiscal-year-end month cutoff); the defaults here are
//! one explicit policy, and any of them can be overridden in code or from
//! JSON.
//!
//! # Example
//!
//! ```
//! use fundamentals_core::{Concept, ExtractionConfig};
//!
//! let config = ExtractionConfig::from_json(
//!     r#"{ "use_filing_metadata": true, "catalog": { "fiscal_year_end_month_cutoff": 6 } }"#,
//! )
//! .unwrap()
//! .with_concept(Concept::new("InterestExpense"));
//!
//! assert!(config.use_filing_metadata);
//! assert_eq!(config.catalog.fiscal_year_end_month_cutoff, 6);
//! assert_eq!(config.catalog.annual_min_days, 360);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::concepts::{NUMBER_OF_SHARES, default_concepts};
use crate::error::{FilingError, Result};
use crate::types::Concept;

/// Thresholds used to classify contexts into period indices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// A duration must span strictly more days than this to count as annual.
    pub annual_min_days: i64,
    /// A quarter duration must span strictly more days than this.
    pub quarter_min_days: i64,
    /// A quarter duration must span strictly fewer days than this.
    pub quarter_max_days: i64,
    /// Substring marking a context id as a dimensional breakdown. Empty disables.
    pub segment_marker: String,
    /// Annual durations ending in this month or later are assigned their end
    /// year; earlier ones their start year.
    pub fiscal_year_end_month_cutoff: u32,
    /// Instants dated before this month are assigned to the previous year.
    pub instant_rollback_month: u32,
    /// Length override applies only when `id_len * override_ratio` exceeds this.
    pub override_min_len: usize,
    /// A new id wins regardless of date when its length times this ratio is
    /// shorter than the current winner's id.
    pub override_ratio: usize,
    /// Apply the length override to the latest-quarter instant as well.
    pub latest_instant_length_override: bool,
    /// Fill years left unset with the fixed `FD<year>Q4YTD` / `FI<year>Q4` ids.
    pub legacy_context_ids: bool,
    /// First year legacy ids are considered for.
    pub legacy_first_year: i32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            annual_min_days: 360,
            quarter_min_days: 35,
            quarter_max_days: 100,
            segment_marker: "us-gaap".to_string(),
            fiscal_year_end_month_cutoff: 3,
            instant_rollback_month: 2,
            override_min_len: 8,
            override_ratio: 2,
            latest_instant_length_override: false,
            legacy_context_ids: true,
            legacy_first_year: 2010,
        }
    }
}

impl CatalogConfig {
    /// Returns true if `id` carries the dimensional breakdown marker.
    #[must_use]
    pub fn is_segment(&self, id: &str) -> bool {
        !self.segment_marker.is_empty() && id.contains(&self.segment_marker)
    }

    /// Returns true if a `span_days` duration counts as a calendar quarter.
    #[must_use]
    pub const fn is_quarter(&self, span_days: i64) -> bool {
        self.quarter_min_days < span_days && span_days < self.quarter_max_days
    }

    /// Returns true if a new id of `len` overrides a winner of `current_len`
    /// regardless of dates.
    ///
    /// Verbose dimensional ids sometimes win the date rules; an id at most
    /// half as long replaces them.
    #[must_use]
    pub const fn overrides_by_length(&self, len: usize, current_len: usize) -> bool {
        let scaled = len.saturating_mul(self.override_ratio);
        self.override_min_len < scaled && scaled < current_len
    }

    fn validate(&self) -> Result<()> {
        if self.annual_min_days <= 0 {
            return Err(FilingError::Config(
                "annual_min_days must be positive".to_string(),
            ));
        }
        if self.quarter_min_days >= self.quarter_max_days {
            return Err(FilingError::Config(format!(
                "quarter window is empty: {} .. {}",
                self.quarter_min_days, self.quarter_max_days
            )));
        }
        for (name, month) in [
            ("fiscal_year_end_month_cutoff", self.fiscal_year_end_month_cutoff),
            ("instant_rollback_month", self.instant_rollback_month),
        ] {
            if !(1..=12).contains(&month) {
                return Err(FilingError::Config(format!(
                    "{name} must be a month (1-12), got {month}"
                )));
            }
        }
        if self.override_ratio == 0 {
            return Err(FilingError::Config(
                "override_ratio must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for resolving concepts against a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Namespace prefix concept tags are looked up under.
    pub taxonomy_prefix: String,
    /// In annual mode, fall back to fiscal-year-end instants when no annual
    /// duration yields a value.
    pub allow_year_end_instant_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            taxonomy_prefix: "us-gaap".to_string(),
            allow_year_end_instant_fallback: true,
        }
    }
}

/// Complete configuration of an extraction session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Context classification thresholds.
    pub catalog: CatalogConfig,
    /// Concept resolution settings.
    pub resolver: ResolverConfig,
    /// Concepts extracted from every filing, in order.
    pub concepts: Vec<Concept>,
    /// Use DEI facts to align annual contexts to the fiscal calendar and to
    /// backfill the share count.
    pub use_filing_metadata: bool,
    /// Concept the DEI share count is backfilled into.
    pub shares_concept: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            resolver: ResolverConfig::default(),
            concepts: default_concepts(),
            use_filing_metadata: false,
            shares_concept: NUMBER_OF_SHARES.to_string(),
        }
    }
}

impl ExtractionConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FilingError::Config(format!("Failed to parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Appends a concept to the extracted set.
    #[must_use]
    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concepts.push(concept);
        self
    }

    /// Replaces the extracted concept set.
    #[must_use]
    pub fn with_concepts(mut self, concepts: Vec<Concept>) -> Self {
        self.concepts = concepts;
        self
    }

    /// Enables or disables use of DEI filing metadata.
    #[must_use]
    pub const fn with_filing_metadata(mut self, enabled: bool) -> Self {
        self.use_filing_metadata = enabled;
        self
    }

    /// Enables or disables the fiscal-year-end instant fallback.
    #[must_use]
    pub const fn with_year_end_fallback(mut self, enabled: bool) -> Self {
        self.resolver.allow_year_end_instant_fallback = enabled;
        self
    }

    /// Replaces the catalog thresholds.
    #[must_use]
    pub fn with_catalog(mut self, catalog: CatalogConfig) -> Self {
        self.catalog = catalog;
        self
    }

    /// Checks the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        if self.resolver.taxonomy_prefix.trim().is_empty() {
            return Err(FilingError::Config(
                "taxonomy_prefix must not be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for concept in &self.concepts {
            if concept.canonical_tag.trim().is_empty() {
                return Err(FilingError::Config(
                    "concept with an empty canonical tag".to_string(),
                ));
            }
            if !seen.insert(concept.canonical_tag.as_str()) {
                return Err(FilingError::Config(format!(
                    "duplicate concept {}",
                    concept.canonical_tag
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractionConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.use_filing_metadata);
        assert!(config.resolver.allow_year_end_instant_fallback);
        assert_eq!(config.shares_concept, "NumberOfShares");
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = ExtractionConfig::from_json(
            r#"{ "concepts": [ { "canonical_tag": "Revenues", "alternates": ["SalesRevenueNet"] } ] }"#,
        )
        .unwrap();
        assert_eq!(config.concepts.len(), 1);
        assert_eq!(config.concepts[0].alternates, vec!["SalesRevenueNet"]);
        assert_eq!(config.catalog, CatalogConfig::default());
        assert_eq!(config.resolver.taxonomy_prefix, "us-gaap");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            ExtractionConfig::from_json("not json"),
            Err(FilingError::Config(_))
        ));
    }

    #[rstest]
    #[case(r#"{ "catalog": { "quarter_min_days": 100, "quarter_max_days": 35 } }"#)]
    #[case(r#"{ "catalog": { "fiscal_year_end_month_cutoff": 13 } }"#)]
    #[case(r#"{ "catalog": { "instant_rollback_month": 0 } }"#)]
    #[case(r#"{ "catalog": { "annual_min_days": 0 } }"#)]
    #[case(r#"{ "catalog": { "override_ratio": 0 } }"#)]
    #[case(r#"{ "resolver": { "taxonomy_prefix": " " } }"#)]
    #[case(r#"{ "concepts": [ { "canonical_tag": "A" }, { "canonical_tag": "A" } ] }"#)]
    fn test_invalid_configs(#[case] json: &str) {
        assert!(matches!(
            ExtractionConfig::from_json(json),
            Err(FilingError::Config(_))
        ));
    }

    #[test]
    fn test_segment_marker() {
        let mut catalog = CatalogConfig::default();
        assert!(catalog.is_segment("FY2019_us-gaap_SegmentAxis"));
        assert!(!catalog.is_segment("FY2019"));
        catalog.segment_marker.clear();
        assert!(!catalog.is_segment("FY2019_us-gaap_SegmentAxis"));
    }

    #[rstest]
    #[case(35, false)]
    #[case(36, true)]
    #[case(91, true)]
    #[case(99, true)]
    #[case(100, false)]
    fn test_quarter_window(#[case] days: i64, #[case] expected: bool) {
        assert_eq!(CatalogConfig::default().is_quarter(days), expected);
    }

    #[rstest]
    #[case(5, 30, true)]
    #[case(4, 30, false)]
    #[case(10, 20, false)]
    #[case(10, 21, true)]
    fn test_length_override(#[case] len: usize, #[case] current: usize, #[case] expected: bool) {
        assert_eq!(
            CatalogConfig::default().overrides_by_length(len, current),
            expected
        );
    }

    #[test]
    fn test_builders() {
        let config = ExtractionConfig::new()
            .with_concepts(vec![Concept::new("Revenues")])
            .with_concept(Concept::new("NetIncomeLoss"))
            .with_filing_metadata(true)
            .with_year_end_fallback(false);
        assert_eq!(config.concepts.len(), 2);
        assert!(config.use_filing_metadata);
        assert!(!config.resolver.allow_year_end_instant_fallback);
    }
}
