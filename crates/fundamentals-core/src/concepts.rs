//! Default concept set.
//!
//! Different filers tag the same line item under different names; each
//! concept lists its canonical tag followed by the alternates tried when the
//! canonical tag yields nothing.

use crate::types::Concept;

/// Concept the share-count backfill writes to.
pub const NUMBER_OF_SHARES: &str = "NumberOfShares";

/// Diluted share count concept.
pub const NUMBER_OF_DILUTED_SHARES: &str = "NumberOfDilutedShares";

/// Returns the default concept set extracted from every filing.
#[must_use]
pub fn default_concepts() -> Vec<Concept> {
    vec![
        Concept::new("EarningsPerShareDiluted"),
        Concept::new("EarningsPerShareBasic"),
        Concept::new("GrossProfit"),
        Concept::new("NetIncomeLoss"),
        Concept::new("StockholdersEquity"),
        Concept::new("CapitalExpenditure")
            .with_alternate("PaymentsToAcquirePropertyPlantAndEquipment"),
        Concept::new("CashFlowFromOperations")
            .with_alternate("NetCashProvidedByUsedInOperatingActivities"),
        Concept::new("Revenues").with_alternates([
            "SalesRevenueNet",
            "RevenueFromContractWithCustomerExcludingAssessedTax",
        ]),
        Concept::new("CostOfGoodsAndServicesSold"),
        Concept::new("SellingGeneralAndAdministrativeExpense"),
        Concept::new("ResearchAndDevelopmentExpense"),
        Concept::new("DepreciationDepletionAndAmortization"),
        Concept::new("OperatingIncomeLoss"),
        Concept::new("LongTermDebtNoncurrent"),
        Concept::new("IncomeTaxExpenseBenefit"),
        Concept::new(NUMBER_OF_SHARES)
            .with_alternate("WeightedAverageNumberOfSharesOutstandingBasic"),
        Concept::new(NUMBER_OF_DILUTED_SHARES)
            .with_alternate("WeightedAverageNumberOfDilutedSharesOutstanding"),
    ]
}
