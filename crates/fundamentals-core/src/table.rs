//! Period by concept fact table.
//!
//! [`FactTable`] accumulates resolved values across every filing loaded into
//! a session. A cell is either absent or a finite value; absence means the
//! value is unknown and is never stored as zero.

use polars::prelude::{Column, DataFrame, PlSmallStr};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

use crate::error::{FilingError, Result};
use crate::types::{Fact, PeriodLabel};

/// Name of the period column in [`FactTable::to_dataframe`].
pub const PERIOD_COLUMN: &str = "period";

/// Resolved values keyed by period, then concept name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FactTable {
    cells: BTreeMap<PeriodLabel, BTreeMap<String, f64>>,
}

impl FactTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }

    /// Returns the value of a cell, if known.
    #[must_use]
    pub fn get(&self, period: PeriodLabel, concept: &str) -> Option<f64> {
        self.cells.get(&period)?.get(concept).copied()
    }

    /// Writes a cell, replacing any earlier value.
    ///
    /// Returns the replaced value. Non-finite values are rejected.
    pub fn insert(
        &mut self,
        period: PeriodLabel,
        concept: impl Into<String>,
        value: f64,
    ) -> Result<Option<f64>> {
        let concept = concept.into();
        if !value.is_finite() {
            return Err(FilingError::InvalidParameter(format!(
                "non-finite value {value} for {concept} in {period}"
            )));
        }
        trace!(%period, %concept, value, "Writing cell");
        Ok(self.cells.entry(period).or_default().insert(concept, value))
    }

    /// Writes every value of one concept, last write wins.
    ///
    /// Returns the number of cells written; non-finite values are skipped.
    pub fn extend_concept<I>(&mut self, concept: &str, values: I) -> usize
    where
        I: IntoIterator<Item = (PeriodLabel, f64)>,
    {
        let mut written = 0;
        for (period, value) in values {
            match self.insert(period, concept, value) {
                Ok(_) => written += 1,
                Err(e) => trace!(error = %e, "Skipped cell"),
            }
        }
        written
    }

    /// Merges another table into this one; its cells replace existing ones.
    pub fn merge(&mut self, other: Self) {
        for (period, row) in other.cells {
            self.cells.entry(period).or_default().extend(row);
        }
    }

    /// Iterates over the known periods, in order.
    pub fn periods(&self) -> impl Iterator<Item = PeriodLabel> + '_ {
        self.cells.keys().copied()
    }

    /// Returns the names of every concept with at least one value, sorted.
    #[must_use]
    pub fn concepts(&self) -> Vec<String> {
        let names: BTreeSet<&String> = self.cells.values().flat_map(BTreeMap::keys).collect();
        names.into_iter().cloned().collect()
    }

    /// Returns the known values of one concept, ordered by period.
    #[must_use]
    pub fn series(&self, concept: &str) -> BTreeMap<PeriodLabel, f64> {
        self.cells
            .iter()
            .filter_map(|(period, row)| row.get(concept).map(|value| (*period, *value)))
            .collect()
    }

    /// Returns the known values of one period, keyed by concept.
    #[must_use]
    pub fn row(&self, period: PeriodLabel) -> Option<&BTreeMap<String, f64>> {
        self.cells.get(&period)
    }

    /// Iterates over every known cell as a [`Fact`].
    pub fn facts(&self) -> impl Iterator<Item = Fact> + '_ {
        self.cells.iter().flat_map(|(period, row)| {
            row.iter()
                .map(|(concept, value)| Fact::new(concept.as_str(), *period, *value))
        })
    }

    /// Number of known cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    /// Returns true if no cell is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.values().all(BTreeMap::is_empty)
    }

    /// Converts the table into a DataFrame, one row per period.
    ///
    /// Columns are `period` (the label's display string) followed by one
    /// nullable `f64` column per concept. Unknown cells are nulls.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let concepts = self.concepts();
        let mut columns = Vec::with_capacity(concepts.len() + 1);

        let periods: Vec<String> = self.cells.keys().map(ToString::to_string).collect();
        columns.push(Column::new(PlSmallStr::from(PERIOD_COLUMN), periods));

        for concept in &concepts {
            let values: Vec<Option<f64>> = self
                .cells
                .values()
                .map(|row| row.get(concept).copied())
                .collect();
            columns.push(Column::new(PlSmallStr::from(concept.as_str()), values));
        }

        DataFrame::new(columns).map_err(|e| FilingError::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_insert_and_get() {
        let mut table = FactTable::new();
        assert!(table.is_empty());

        let year = PeriodLabel::FiscalYear(2019);
        assert_eq!(table.insert(year, "Revenues", 100.0).unwrap(), None);
        assert_eq!(table.insert(year, "Revenues", 120.0).unwrap(), Some(100.0));
        assert_eq!(table.get(year, "Revenues"), Some(120.0));
        assert_eq!(table.get(year, "NetIncomeLoss"), None);
        assert_eq!(table.get(PeriodLabel::FiscalYear(2018), "Revenues"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut table = FactTable::new();
        let year = PeriodLabel::FiscalYear(2019);
        assert!(table.insert(year, "Revenues", f64::NAN).is_err());
        assert!(table.insert(year, "Revenues", f64::INFINITY).is_err());
        assert!(table.is_empty());

        let written = table.extend_concept(
            "Revenues",
            [(year, 1.0), (PeriodLabel::FiscalYear(2020), f64::NAN)],
        );
        assert_eq!(written, 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_merge_last_write_wins() {
        let mut first = FactTable::new();
        first.insert(2019.into(), "Revenues", 100.0).unwrap();
        first.insert(2019.into(), "NetIncomeLoss", 10.0).unwrap();

        let mut second = FactTable::new();
        second.insert(2019.into(), "Revenues", 150.0).unwrap();
        second.insert(2020.into(), "Revenues", 200.0).unwrap();

        first.merge(second);
        assert_eq!(first.get(2019.into(), "Revenues"), Some(150.0));
        assert_eq!(first.get(2019.into(), "NetIncomeLoss"), Some(10.0));
        assert_eq!(first.get(2020.into(), "Revenues"), Some(200.0));
        assert_eq!(first.periods().count(), 2);
    }

    #[test]
    fn test_series_and_concepts() {
        let mut table = FactTable::new();
        table.insert(2020.into(), "Revenues", 2.0).unwrap();
        table.insert(2019.into(), "Revenues", 1.0).unwrap();
        table.insert(2019.into(), "GrossProfit", 0.5).unwrap();

        let series: Vec<(PeriodLabel, f64)> = table.series("Revenues").into_iter().collect();
        assert_eq!(series, vec![(2019.into(), 1.0), (2020.into(), 2.0)]);
        assert_eq!(table.concepts(), vec!["GrossProfit", "Revenues"]);
        assert_eq!(table.facts().count(), 3);
        assert_eq!(table.row(2019.into()).map(BTreeMap::len), Some(2));
    }

    #[test]
    fn test_to_dataframe_keeps_absent_cells_null() {
        let mut table = FactTable::new();
        table.insert(2019.into(), "Revenues", 1.0).unwrap();
        table.insert(2020.into(), "Revenues", 2.0).unwrap();
        table.insert(2020.into(), "GrossProfit", 0.5).unwrap();

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);

        let gross = df.column("GrossProfit").unwrap().as_materialized_series().f64().unwrap();
        assert_eq!(gross.get(0), None);
        assert_eq!(gross.get(1), Some(0.5));
        assert_eq!(gross.null_count(), 1);
    }

    #[test]
    fn test_serde_keys_by_label_string() {
        let mut table = FactTable::new();
        table.insert(2019.into(), "Revenues", 1.0).unwrap();
        let quarter = PeriodLabel::QuarterEnd(NaiveDate::from_ymd_opt(2020, 3, 28).unwrap());
        table.insert(quarter, "Revenues", 0.3).unwrap();

        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("\"2019\""));
        assert!(json.contains("\"28/03/2020\""));

        let back: FactTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
