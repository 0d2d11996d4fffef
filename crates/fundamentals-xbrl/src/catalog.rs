//! Context classification.
//!
//! A filing declares its contexts once, in a noisy catalog where the same
//! logical period is often declared several times: once company-wide and
//! once per dimensional breakdown, with ids of different lengths. The
//! [`ContextCatalog`] picks one context per period for three buckets:
//!
//! - **YTD**: durations spanning a fiscal year, labelled by fiscal year.
//! - **Year end**: instants at a fiscal year's close, labelled by fiscal year.
//! - **Latest quarter**: the newest instant and the newest quarter-long
//!   duration, both labelled with the later of their two dates.
//!
//! Company-wide contexts empirically carry the shortest ids, so every
//! tie-break prefers the shorter id.

use chrono::{Datelike, NaiveDate};
use fundamentals_core::{
    CatalogConfig, FilingMetadata, PeriodDescriptor, PeriodKind, PeriodLabel, PeriodSpan,
    ResolutionMode, Tier,
};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, instrument, trace};

/// Mapping from context id to the period it is filed under.
pub type PeriodIndex = BTreeMap<String, PeriodLabel>;

/// One of the catalog's indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    /// Annual (year-to-date) durations.
    Ytd,
    /// Fiscal-year-end instants.
    YearEnd,
    /// Latest quarter instant and duration.
    LatestQuarter,
}

impl Bucket {
    /// Index a resolution tier reads in the given mode.
    #[must_use]
    pub const fn for_tier(mode: ResolutionMode, tier: Tier) -> Self {
        match (mode, tier) {
            (ResolutionMode::LatestQuarter, _) => Self::LatestQuarter,
            (ResolutionMode::Annual, Tier::Canonical | Tier::Alternate) => Self::Ytd,
            (ResolutionMode::Annual, Tier::YearEndCanonical | Tier::YearEndAlternate) => {
                Self::YearEnd
            }
        }
    }
}

/// Period indices of one filing.
///
/// Built once per document and discarded with it. Classification is
/// deterministic: the same descriptors, metadata and configuration always
/// yield the same indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextCatalog {
    ytd: PeriodIndex,
    year_end: PeriodIndex,
    latest_quarter: PeriodIndex,
}

impl ContextCatalog {
    /// Classifies every descriptor of one filing.
    ///
    /// `metadata` aligns annual durations to the filer's fiscal calendar when
    /// it carries both a document end date and a fiscal-year focus.
    #[instrument(skip_all, fields(descriptors = descriptors.len()))]
    pub fn build(
        descriptors: &[PeriodDescriptor],
        metadata: Option<&FilingMetadata>,
        config: &CatalogConfig,
    ) -> Self {
        let descriptors = unique_by_id(descriptors);

        let annual = classify_annual(&descriptors, metadata, config);
        let year_end = classify_year_end(&descriptors, &annual.end_dates, config);

        let mut ytd_ids = into_ids(annual.winners);
        let mut year_end_ids = into_ids(year_end);

        // Ids added outside the heuristics must be declared with the bucket's kind.
        let durations = declared(&descriptors, PeriodKind::Duration);
        let instants = declared(&descriptors, PeriodKind::Instant);

        if let Some(metadata) = metadata {
            add_focus_context(&mut ytd_ids, metadata, &durations);
        }

        if config.legacy_context_ids {
            let last_year = descriptors.iter().map(|d| d.span.end().year()).max();
            if let Some(last_year) = last_year {
                let years = config.legacy_first_year..=last_year;
                fill_legacy(&mut ytd_ids, years.clone(), &durations, |y| {
                    format!("FD{y}Q4YTD")
                });
                fill_legacy(&mut year_end_ids, years, &instants, |y| format!("FI{y}Q4"));
            }
        }

        let catalog = Self {
            ytd: into_index(ytd_ids),
            year_end: into_index(year_end_ids),
            latest_quarter: classify_latest_quarter(&descriptors, config),
        };
        debug!(
            ytd = catalog.ytd.len(),
            year_end = catalog.year_end.len(),
            latest_quarter = catalog.latest_quarter.len(),
            "Classified contexts"
        );
        catalog
    }

    /// Returns one of the indices.
    #[must_use]
    pub const fn index(&self, bucket: Bucket) -> &PeriodIndex {
        match bucket {
            Bucket::Ytd => &self.ytd,
            Bucket::YearEnd => &self.year_end,
            Bucket::LatestQuarter => &self.latest_quarter,
        }
    }

    /// Annual durations by context id.
    #[must_use]
    pub const fn ytd(&self) -> &PeriodIndex {
        &self.ytd
    }

    /// Fiscal-year-end instants by context id.
    #[must_use]
    pub const fn year_end(&self) -> &PeriodIndex {
        &self.year_end
    }

    /// Latest quarter contexts by context id.
    #[must_use]
    pub const fn latest_quarter(&self) -> &PeriodIndex {
        &self.latest_quarter
    }

    /// Label a context is filed under in one index.
    #[must_use]
    pub fn label(&self, bucket: Bucket, id: &str) -> Option<PeriodLabel> {
        self.index(bucket).get(id).copied()
    }

    /// Distinct labels of one index.
    #[must_use]
    pub fn labels(&self, bucket: Bucket) -> BTreeSet<PeriodLabel> {
        self.index(bucket).values().copied().collect()
    }

    /// Returns true if no context was classified into any index.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ytd.is_empty() && self.year_end.is_empty() && self.latest_quarter.is_empty()
    }
}

/// Winners of the annual pass, plus every annual end date seen.
#[derive(Debug)]
struct AnnualPass<'a> {
    winners: BTreeMap<i32, &'a PeriodDescriptor>,
    end_dates: BTreeSet<NaiveDate>,
}

fn unique_by_id(descriptors: &[PeriodDescriptor]) -> Vec<&PeriodDescriptor> {
    let mut seen = HashSet::new();
    descriptors
        .iter()
        .filter(|d| {
            let fresh = seen.insert(d.id.as_str());
            if !fresh {
                debug!(id = %d.id, "Ignoring redeclared context");
            }
            fresh
        })
        .collect()
}

fn annual_year(
    start: NaiveDate,
    end: NaiveDate,
    metadata: Option<&FilingMetadata>,
    config: &CatalogConfig,
) -> Option<i32> {
    match metadata.filter(|m| m.fiscal_alignment().is_some()) {
        Some(metadata) => metadata.aligned_year(end),
        None if end.month() >= config.fiscal_year_end_month_cutoff => Some(end.year()),
        None => Some(start.year()),
    }
}

fn classify_annual<'a>(
    descriptors: &[&'a PeriodDescriptor],
    metadata: Option<&FilingMetadata>,
    config: &CatalogConfig,
) -> AnnualPass<'a> {
    let mut pass = AnnualPass {
        winners: BTreeMap::new(),
        end_dates: BTreeSet::new(),
    };

    for &descriptor in descriptors {
        let PeriodSpan::Duration { start, end } = descriptor.span else {
            continue;
        };
        if descriptor.span.days().unwrap_or_default() <= config.annual_min_days
            || config.is_segment(&descriptor.id)
        {
            continue;
        }
        let Some(year) = annual_year(start, end, metadata, config) else {
            trace!(id = %descriptor.id, %end, "Annual context off the fiscal calendar");
            continue;
        };

        pass.end_dates.insert(end);
        match pass.winners.entry(year) {
            Entry::Vacant(slot) => {
                slot.insert(descriptor);
            }
            Entry::Occupied(mut slot) => {
                if descriptor.id_len() < slot.get().id_len() {
                    trace!(year, id = %descriptor.id, "Shorter annual context");
                    slot.insert(descriptor);
                }
            }
        }
    }
    pass
}

fn classify_year_end<'a>(
    descriptors: &[&'a PeriodDescriptor],
    annual_end_dates: &BTreeSet<NaiveDate>,
    config: &CatalogConfig,
) -> BTreeMap<i32, &'a PeriodDescriptor> {
    let mut winners: BTreeMap<i32, &PeriodDescriptor> = BTreeMap::new();

    for &descriptor in descriptors {
        let PeriodSpan::Instant(date) = descriptor.span else {
            continue;
        };
        // Year-end instants are sometimes dated in the first days of the next year.
        let year = if date.month() < config.instant_rollback_month {
            date.year() - 1
        } else {
            date.year()
        };

        match winners.entry(year) {
            Entry::Vacant(slot) => {
                slot.insert(descriptor);
            }
            Entry::Occupied(mut slot) => {
                let current = *slot.get();
                let (len, current_len) = (descriptor.id_len(), current.id_len());
                let replaces = (annual_end_dates.contains(&date) && len <= current_len)
                    || (date > current.span.end() && len < current_len)
                    || config.overrides_by_length(len, current_len);
                if replaces {
                    trace!(year, id = %descriptor.id, replaced = %current.id, "Year-end context");
                    slot.insert(descriptor);
                }
            }
        }
    }
    winners
}

fn classify_latest_quarter(
    descriptors: &[&PeriodDescriptor],
    config: &CatalogConfig,
) -> PeriodIndex {
    let mut instant: Option<&PeriodDescriptor> = None;
    let mut quarter: Option<&PeriodDescriptor> = None;

    for &descriptor in descriptors {
        let date = descriptor.span.end();
        let len = descriptor.id_len();
        match descriptor.span {
            PeriodSpan::Instant(_) => {
                let replaces = instant.is_none_or(|current| {
                    let current_date = current.span.end();
                    date > current_date
                        || (date == current_date && len < current.id_len())
                        || (config.latest_instant_length_override
                            && config.overrides_by_length(len, current.id_len()))
                });
                if replaces {
                    instant = Some(descriptor);
                }
            }
            PeriodSpan::Duration { .. } => {
                if !descriptor.span.days().is_some_and(|days| config.is_quarter(days)) {
                    continue;
                }
                let replaces = quarter.is_none_or(|current| {
                    let current_date = current.span.end();
                    date > current_date || (date == current_date && len < current.id_len())
                });
                if replaces {
                    quarter = Some(descriptor);
                }
            }
        }
    }

    let Some(date) = instant.iter().chain(&quarter).map(|d| d.span.end()).max() else {
        return PeriodIndex::new();
    };
    let label = PeriodLabel::QuarterEnd(date);
    instant
        .into_iter()
        .chain(quarter)
        .map(|d| (d.id.clone(), label))
        .collect()
}

fn into_ids(winners: BTreeMap<i32, &PeriodDescriptor>) -> BTreeMap<i32, String> {
    winners
        .into_iter()
        .map(|(year, descriptor)| (year, descriptor.id.clone()))
        .collect()
}

fn into_index(ids: BTreeMap<i32, String>) -> PeriodIndex {
    ids.into_iter()
        .map(|(year, id)| (id, PeriodLabel::FiscalYear(year)))
        .collect()
}

fn declared<'a>(descriptors: &[&'a PeriodDescriptor], kind: PeriodKind) -> HashSet<&'a str> {
    descriptors
        .iter()
        .copied()
        .filter(|d| d.kind() == kind)
        .map(|d| d.id.as_str())
        .collect()
}

fn add_focus_context(
    ytd_ids: &mut BTreeMap<i32, String>,
    metadata: &FilingMetadata,
    durations: &HashSet<&str>,
) {
    let (Some(year), Some(context)) = (
        metadata.fiscal_year_focus,
        metadata.fiscal_year_focus_context.as_ref(),
    ) else {
        return;
    };
    if !durations.contains(context.as_str()) || ytd_ids.values().any(|id| id == context) {
        return;
    }
    if let Entry::Vacant(slot) = ytd_ids.entry(year) {
        debug!(year, id = %context, "Using fiscal-year-focus context");
        slot.insert(context.clone());
    }
}

fn fill_legacy(
    ids: &mut BTreeMap<i32, String>,
    years: std::ops::RangeInclusive<i32>,
    known: &HashSet<&str>,
    legacy_id: impl Fn(i32) -> String,
) {
    for year in years {
        if ids.contains_key(&year) {
            continue;
        }
        let id = legacy_id(year);
        if known.contains(id.as_str()) && !ids.values().any(|taken| *taken == id) {
            debug!(year, id = %id, "Using legacy context id");
            ids.insert(year, id);
        }
    }
}
