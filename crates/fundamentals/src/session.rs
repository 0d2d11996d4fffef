//! Extraction session accumulating facts across filings.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::{debug, instrument, warn};

use fundamentals_core::{
    ExtractionConfig, FactTable, FilingDocument, FilingMetadata, PeriodLabel, ResolutionMode,
    Result, Tier,
};
use fundamentals_xbrl::{Bucket, ConceptResolver, ContextCatalog, XbrlDocument};

/// Summary of one filing load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Mode the filing was read in.
    pub mode: ResolutionMode,
    /// Distinct periods catalogued for the mode's tiers.
    pub periods: BTreeSet<PeriodLabel>,
    /// Winning tier per concept; `None` for unresolved concepts.
    pub tiers: BTreeMap<String, Option<Tier>>,
    /// Cells written into the table, including overwrites.
    pub cells_written: usize,
    /// Contexts skipped from every index.
    pub rejected_descriptors: usize,
    /// Catalogued facts skipped for non-numeric text.
    pub rejected_facts: usize,
    /// Filing metadata, when metadata use is enabled.
    pub metadata: Option<FilingMetadata>,
    /// True if the share count was backfilled from filing metadata.
    pub shares_backfilled: bool,
}

impl LoadReport {
    /// Number of concepts resolved by any tier.
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.tiers.values().filter(|tier| tier.is_some()).count()
    }

    /// Names of the concepts no tier resolved.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.tiers
            .iter()
            .filter(|(_, tier)| tier.is_none())
            .map(|(concept, _)| concept.as_str())
    }
}

/// Loads filings one at a time into a single [`FactTable`].
///
/// Each load classifies the filing's contexts, resolves every configured
/// concept and merges the values into the table. A later load's value for a
/// `(period, concept)` cell replaces an earlier one, so filings should be
/// loaded oldest first.
///
/// # Example
///
/// ```rust,ignore
/// use fundamentals::{ExtractionConfig, PeriodLabel, Session};
///
/// let mut session = Session::new(ExtractionConfig::default())?;
/// let report = session.load_annual_file("msft-20200630.xml")?;
/// println!("{} of {} concepts resolved", report.resolved(), report.tiers.len());
///
/// let revenue = session.table().get(PeriodLabel::FiscalYear(2020), "Revenues");
/// ```
#[derive(Clone, Debug)]
pub struct Session {
    config: ExtractionConfig,
    table: FactTable,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            config: ExtractionConfig::default(),
            table: FactTable::new(),
        }
    }
}

impl Session {
    /// Creates a session with an empty table.
    ///
    /// Fails with [`FilingError::Config`](fundamentals_core::FilingError::Config)
    /// if the configuration does not validate.
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            table: FactTable::new(),
        })
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Returns the accumulated table.
    #[must_use]
    pub const fn table(&self) -> &FactTable {
        &self.table
    }

    /// Consumes the session, returning the accumulated table.
    #[must_use]
    pub fn into_table(self) -> FactTable {
        self.table
    }

    /// Loads an annual report, filing values under fiscal years.
    pub fn load_annual<D>(&mut self, doc: &D) -> LoadReport
    where
        D: FilingDocument + ?Sized,
    {
        self.load(doc, ResolutionMode::Annual)
    }

    /// Loads a quarterly report, filing values under its latest quarter end.
    ///
    /// Quarter labels never collide with fiscal-year labels, so quarterly and
    /// annual loads accumulate side by side.
    pub fn load_quarterly<D>(&mut self, doc: &D) -> LoadReport
    where
        D: FilingDocument + ?Sized,
    {
        self.load(doc, ResolutionMode::LatestQuarter)
    }

    /// Reads an annual report from disk and loads it.
    pub fn load_annual_file(&mut self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let doc = XbrlDocument::from_file(path)?;
        Ok(self.load_annual(&doc))
    }

    /// Reads a quarterly report from disk and loads it.
    pub fn load_quarterly_file(&mut self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let doc = XbrlDocument::from_file(path)?;
        Ok(self.load_quarterly(&doc))
    }

    /// Loads one filing in the given mode.
    #[instrument(skip_all, fields(%mode))]
    pub fn load<D>(&mut self, doc: &D, mode: ResolutionMode) -> LoadReport
    where
        D: FilingDocument + ?Sized,
    {
        let scan = doc.scan_descriptors();
        let metadata = self.config.use_filing_metadata.then(|| doc.metadata());
        let catalog =
            ContextCatalog::build(&scan.descriptors, metadata.as_ref(), &self.config.catalog);

        let tiers = mode.tiers(self.config.resolver.allow_year_end_instant_fallback);
        let buckets: BTreeSet<Bucket> = tiers
            .iter()
            .map(|&tier| Bucket::for_tier(mode, tier))
            .collect();
        let periods: BTreeSet<PeriodLabel> = buckets
            .into_iter()
            .flat_map(|bucket| catalog.labels(bucket))
            .collect();
        if periods.is_empty() {
            warn!(
                contexts = scan.descriptors.len(),
                rejected = scan.rejected.len(),
                "No catalogued period in filing"
            );
        }

        let mut report = LoadReport {
            mode,
            periods,
            rejected_descriptors: scan.rejected.len(),
            ..Default::default()
        };

        let resolver = ConceptResolver::new(&catalog, &self.config.resolver);
        for resolution in resolver.resolve_all(doc, &self.config.concepts, mode) {
            report.rejected_facts += resolution.rejected.len();
            report.cells_written += self
                .table
                .extend_concept(&resolution.concept, resolution.values);
            report.tiers.insert(resolution.concept, resolution.tier);
        }

        if mode == ResolutionMode::Annual {
            if let Some(metadata) = &metadata {
                report.shares_backfilled = self.backfill_shares(metadata);
                report.cells_written += usize::from(report.shares_backfilled);
            }
        }

        debug!(
            periods = report.periods.len(),
            resolved = report.resolved(),
            cells = report.cells_written,
            "Merged filing"
        );
        report.metadata = metadata;
        report
    }

    /// Writes the DEI share count under the fiscal-year focus, unless the
    /// table already holds a share count for that year.
    fn backfill_shares(&mut self, metadata: &FilingMetadata) -> bool {
        let (Some(year), Some(shares)) =
            (metadata.fiscal_year_focus, metadata.entity_shares_outstanding)
        else {
            return false;
        };
        let concept = self.config.shares_concept.as_str();
        if self.table.get(PeriodLabel::FiscalYear(year), concept).is_some() {
            return false;
        }
        match self
            .table
            .insert(PeriodLabel::FiscalYear(year), concept, shares as f64)
        {
            Ok(_) => {
                debug!(year, shares, concept, "Backfilled share count");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to backfill share count");
                false
            }
        }
    }
}
