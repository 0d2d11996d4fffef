//! Document and entity information (DEI) facts.
//!
//! Filings report their own period end date, fiscal-year focus and shares
//! outstanding under the `dei` taxonomy. Each field is read independently;
//! a missing or malformed fact leaves only that field unset, except that the
//! fiscal-year focus requires a parsed period end date.

use fundamentals_core::{FilingMetadata, QualifiedTag};
use tracing::debug;

use crate::markup::{XbrlDocument, parse_date};

/// Taxonomy prefix of DEI facts.
pub const DEI_PREFIX: &str = "dei";

const DOCUMENT_PERIOD_END_DATE: &str = "DocumentPeriodEndDate";
const DOCUMENT_FISCAL_YEAR_FOCUS: &str = "DocumentFiscalYearFocus";
const ENTITY_SHARES_OUTSTANDING: &str = "EntityCommonStockSharesOutstanding";

/// Reads the DEI facts of a filing.
#[must_use]
pub fn read_metadata(doc: &XbrlDocument) -> FilingMetadata {
    let mut metadata = FilingMetadata::default();

    let end_tag = QualifiedTag::normalize(DEI_PREFIX, DOCUMENT_PERIOD_END_DATE);
    if let Some(el) = doc.find_tagged(&end_tag).next() {
        metadata.document_period_end_date = parse_date(el.text());
        if metadata.document_period_end_date.is_none() {
            debug!(text = el.text(), "Unparsable document period end date");
        }
    }

    // A focus year is only meaningful against a known period end.
    let focus_tag = QualifiedTag::normalize(DEI_PREFIX, DOCUMENT_FISCAL_YEAR_FOCUS);
    let focus = doc
        .find_tagged(&focus_tag)
        .next()
        .filter(|_| metadata.document_period_end_date.is_some());
    if let Some(el) = focus {
        match el.text().parse::<i32>() {
            Ok(year) => {
                metadata.fiscal_year_focus = Some(year);
                metadata.fiscal_year_focus_context = el.attribute("contextref").map(str::to_string);
            }
            Err(e) => debug!(text = el.text(), error = %e, "Unparsable fiscal year focus"),
        }
    }

    // Filers with several share classes report one fact per class.
    let shares_tag = QualifiedTag::normalize(DEI_PREFIX, ENTITY_SHARES_OUTSTANDING);
    metadata.entity_shares_outstanding = doc
        .find_tagged(&shares_tag)
        .filter_map(|el| match el.text().replace(',', "").parse::<i64>() {
            Ok(count) => Some(count),
            Err(e) => {
                debug!(text = el.text(), error = %e, "Unparsable shares outstanding");
                None
            }
        })
        .reduce(i64::saturating_add);

    metadata
}
