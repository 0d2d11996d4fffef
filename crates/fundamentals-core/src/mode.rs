//! Resolution mode and tier definitions.
//!
//! [`ResolutionMode`] selects which period buckets a concept is resolved
//! against, and [`Tier`] records which step of the fallback ladder produced
//! a concept's values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which periods a filing is read for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionMode {
    /// Fiscal-year figures from annual reports (10-K, 20-F).
    #[default]
    Annual,
    /// The most recent quarter described by a report (10-Q).
    LatestQuarter,
}

impl ResolutionMode {
    /// Tiers tried for this mode, in order.
    ///
    /// The year-end instant tiers only apply to [`ResolutionMode::Annual`].
    #[must_use]
    pub const fn tiers(self, allow_year_end_fallback: bool) -> &'static [Tier] {
        match (self, allow_year_end_fallback) {
            (Self::Annual, true) => &[
                Tier::Canonical,
                Tier::Alternate,
                Tier::YearEndCanonical,
                Tier::YearEndAlternate,
            ],
            (Self::Annual, false) | (Self::LatestQuarter, _) => &[Tier::Canonical, Tier::Alternate],
        }
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annual => write!(f, "annual"),
            Self::LatestQuarter => write!(f, "latest-quarter"),
        }
    }
}

/// A step of the fallback ladder used to resolve a concept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Canonical tag against the mode's primary index.
    Canonical,
    /// Alternate tags, in order, against the mode's primary index.
    Alternate,
    /// Canonical tag against the fiscal-year-end instant index.
    YearEndCanonical,
    /// Alternate tags, in order, against the fiscal-year-end instant index.
    YearEndAlternate,
}

impl Tier {
    /// Returns true if this tier reads alternate tag names.
    #[must_use]
    pub const fn uses_alternates(&self) -> bool {
        matches!(self, Self::Alternate | Self::YearEndAlternate)
    }

    /// Returns true if this tier reads the fiscal-year-end instant index.
    #[must_use]
    pub const fn is_year_end_fallback(&self) -> bool {
        matches!(self, Self::YearEndCanonical | Self::YearEndAlternate)
    }
}
