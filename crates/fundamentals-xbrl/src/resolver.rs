//! Concept resolution.
//!
//! [`ConceptResolver`] turns a [`Concept`] into one value per period by
//! walking a fallback ladder of [`Tier`]s. Each tier reads one set of tag
//! names against one of the catalog's indices; the first tier producing any
//! value wins outright. Tiers are never merged, so a concept's values always
//! share one precision level.

use fundamentals_core::{
    Concept, Fact, FilingDocument, PeriodLabel, QualifiedTag, ResolutionMode, ResolverConfig,
    Tier,
};
use std::collections::BTreeMap;
use tracing::{debug, instrument, trace};

use crate::catalog::{Bucket, ContextCatalog, PeriodIndex};

/// A fact in a catalogued context whose text is not a finite number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FactRejection {
    /// Qualified tag the fact was read under.
    pub tag: String,
    /// Context the fact refers to.
    pub context_ref: String,
    /// Raw text content.
    pub text: String,
}

/// Values of one concept resolved from one filing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resolution {
    /// Concept name.
    pub concept: String,
    /// Tier that produced the values; `None` if the concept is unresolved.
    pub tier: Option<Tier>,
    /// One value per period of the winning tier.
    pub values: BTreeMap<PeriodLabel, f64>,
    /// Facts skipped in every tier tried.
    pub rejected: Vec<FactRejection>,
}

impl Resolution {
    fn unresolved(concept: &str) -> Self {
        Self {
            concept: concept.to_string(),
            ..Default::default()
        }
    }

    /// Returns true if any tier produced a value.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.values.is_empty()
    }

    /// Converts the values into facts, ordered by period.
    pub fn into_facts(self) -> impl Iterator<Item = Fact> {
        let concept = self.concept;
        self.values
            .into_iter()
            .map(move |(period, value)| Fact::new(concept.as_str(), period, value))
    }
}

/// Resolves concepts against one filing's catalog.
#[derive(Clone, Copy, Debug)]
pub struct ConceptResolver<'a> {
    catalog: &'a ContextCatalog,
    config: &'a ResolverConfig,
}

impl<'a> ConceptResolver<'a> {
    /// Creates a resolver over a built catalog.
    #[must_use]
    pub const fn new(catalog: &'a ContextCatalog, config: &'a ResolverConfig) -> Self {
        Self { catalog, config }
    }

    /// Resolves one concept.
    ///
    /// `doc` must be the filing the catalog was built from. Non-numeric facts
    /// are skipped individually and reported in [`Resolution::rejected`].
    #[instrument(skip_all, fields(concept = concept.name(), %mode))]
    pub fn resolve<D>(&self, doc: &D, concept: &Concept, mode: ResolutionMode) -> Resolution
    where
        D: FilingDocument + ?Sized,
    {
        let mut resolution = Resolution::unresolved(concept.name());

        for &tier in mode.tiers(self.config.allow_year_end_instant_fallback) {
            let index = self.catalog.index(Bucket::for_tier(mode, tier));
            if index.is_empty() {
                continue;
            }

            let values = if tier.uses_alternates() {
                let mut values = BTreeMap::new();
                for alternate in &concept.alternates {
                    // Later alternates overwrite earlier ones per period.
                    values.extend(self.read_tag(doc, alternate, index, &mut resolution.rejected));
                }
                values
            } else {
                self.read_tag(doc, &concept.canonical_tag, index, &mut resolution.rejected)
            };

            if !values.is_empty() {
                if tier != Tier::Canonical {
                    debug!(?tier, periods = values.len(), "Resolved by fallback");
                }
                resolution.tier = Some(tier);
                resolution.values = values;
                return resolution;
            }
        }

        debug!("Concept unresolved");
        resolution
    }

    /// Resolves every concept, in order.
    pub fn resolve_all<D>(
        &self,
        doc: &D,
        concepts: &[Concept],
        mode: ResolutionMode,
    ) -> Vec<Resolution>
    where
        D: FilingDocument + ?Sized,
    {
        concepts
            .iter()
            .map(|concept| self.resolve(doc, concept, mode))
            .collect()
    }

    fn read_tag<D>(
        &self,
        doc: &D,
        name: &str,
        index: &PeriodIndex,
        rejected: &mut Vec<FactRejection>,
    ) -> BTreeMap<PeriodLabel, f64>
    where
        D: FilingDocument + ?Sized,
    {
        let tag = QualifiedTag::normalize(&self.config.taxonomy_prefix, name);
        let mut values = BTreeMap::new();

        for fact in doc.facts(&tag) {
            let Some(&period) = index.get(fact.context_ref) else {
                continue;
            };
            match parse_value(fact.text) {
                Some(value) => {
                    trace!(%tag, context = fact.context_ref, %period, value, "Matched fact");
                    values.insert(period, value);
                }
                None => {
                    debug!(%tag, context = fact.context_ref, text = fact.text, "Skipping non-numeric fact");
                    rejected.push(FactRejection {
                        tag: tag.to_string(),
                        context_ref: fact.context_ref.to_string(),
                        text: fact.text.to_string(),
                    });
                }
            }
        }
        values
    }
}

fn parse_value(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
