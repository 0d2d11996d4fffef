//! End-to-end extraction from filings on disk.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use fundamentals::{
    ExtractionConfig, FilingError, PeriodLabel, ResolutionMode, Session, Tier, XbrlDocument,
};
use rstest::rstest;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn quarter_end() -> PeriodLabel {
    PeriodLabel::QuarterEnd(NaiveDate::from_ymd_opt(2019, 12, 28).unwrap())
}

#[test]
fn test_annual_report() {
    let mut session = Session::new(ExtractionConfig::default().with_filing_metadata(true)).unwrap();
    let report = session.load_annual_file(fixture("annual.xml")).unwrap();

    // Off-calendar prior years are picked up through their legacy ids
    let years: Vec<PeriodLabel> = report.periods.iter().copied().collect();
    assert_eq!(years, vec![2017.into(), 2018.into(), 2019.into()]);
    assert_eq!(report.rejected_descriptors, 0);
    assert_eq!(report.rejected_facts, 1);

    assert_eq!(report.tiers["Revenues"], Some(Tier::Alternate));
    assert_eq!(report.tiers["StockholdersEquity"], Some(Tier::YearEndCanonical));
    assert_eq!(report.tiers["NetIncomeLoss"], Some(Tier::Canonical));
    assert_eq!(report.tiers["CapitalExpenditure"], None);

    let table = session.table();
    // Segment revenue is never picked
    assert_relative_eq!(table.get(2019.into(), "Revenues").unwrap(), 260_174_000_000.0);
    assert_relative_eq!(table.get(2017.into(), "Revenues").unwrap(), 229_234_000_000.0);
    assert_relative_eq!(table.get(2019.into(), "EarningsPerShareDiluted").unwrap(), 11.89);
    assert_relative_eq!(table.get(2018.into(), "StockholdersEquity").unwrap(), 107_147_000_000.0);
    assert_relative_eq!(table.get(2019.into(), "StockholdersEquity").unwrap(), 90_488_000_000.0);

    // Nil fact skipped without dropping the concept
    assert_eq!(table.get(2019.into(), "ResearchAndDevelopmentExpense"), None);
    assert_relative_eq!(
        table.get(2018.into(), "ResearchAndDevelopmentExpense").unwrap(),
        14_236_000_000.0
    );

    assert!(report.shares_backfilled);
    assert_relative_eq!(table.get(2019.into(), "NumberOfShares").unwrap(), 4_443_236_000.0);
    assert_eq!(table.get(2018.into(), "NumberOfShares"), None);
}

#[test]
fn test_quarterly_report_accumulates_beside_annual() {
    let mut session = Session::default();
    session.load_annual_file(fixture("annual.xml")).unwrap();
    let annual_cells = session.table().len();

    let report = session.load_quarterly_file(fixture("quarterly.xml")).unwrap();
    assert_eq!(report.periods.len(), 1);
    assert!(report.periods.contains(&quarter_end()));
    assert!(!report.shares_backfilled);

    let table = session.table();
    assert_eq!(table.len(), annual_cells + report.cells_written);
    assert_relative_eq!(table.get(quarter_end(), "Revenues").unwrap(), 91_819_000_000.0);
    assert_relative_eq!(table.get(quarter_end(), "NetIncomeLoss").unwrap(), 22_236_000_000.0);
    assert_relative_eq!(table.get(quarter_end(), "StockholdersEquity").unwrap(), 89_531_000_000.0);
    assert_relative_eq!(table.get(2019.into(), "NetIncomeLoss").unwrap(), 55_256_000_000.0);
}

#[rstest]
#[case::annual("annual.xml", ResolutionMode::Annual, PeriodLabel::FiscalYear(2019), 260_174_000_000.0)]
#[case::quarterly("quarterly.xml", ResolutionMode::LatestQuarter, quarter_end(), 91_819_000_000.0)]
fn test_revenue_by_mode(
    #[case] name: &str,
    #[case] mode: ResolutionMode,
    #[case] period: PeriodLabel,
    #[case] revenue: f64,
) {
    let doc = XbrlDocument::from_file(fixture(name)).unwrap();
    let mut session = Session::default();
    let report = session.load(&doc, mode);

    assert_eq!(report.mode, mode);
    assert!(report.periods.contains(&period));
    assert_relative_eq!(session.table().get(period, "Revenues").unwrap(), revenue);
}

#[test]
fn test_dataframe_export() {
    let mut session = Session::default();
    session.load_annual_file(fixture("annual.xml")).unwrap();
    session.load_quarterly_file(fixture("quarterly.xml")).unwrap();

    let df = session.table().to_dataframe().unwrap();
    assert_eq!(df.height(), 4);

    let periods = df.column("period").unwrap().as_materialized_series().str().unwrap();
    assert_eq!(periods.get(0), Some("2017"));
    assert_eq!(periods.get(3), Some("28/12/2019"));

    // Quarter filing carries no gross profit
    let gross = df.column("GrossProfit").unwrap().as_materialized_series().f64().unwrap();
    assert_eq!(gross.get(3), None);
    assert_eq!(gross.get(2), Some(98_392_000_000.0));
}

#[test]
fn test_config_from_json() {
    let config = ExtractionConfig::from_json(
        r#"{
            "concepts": [
                { "canonical_tag": "StockholdersEquity" },
                { "canonical_tag": "Revenues", "alternates": ["RevenueFromContractWithCustomerExcludingAssessedTax"] }
            ],
            "resolver": { "allow_year_end_instant_fallback": false }
        }"#,
    )
    .unwrap();
    let mut session = Session::new(config).unwrap();
    let report = session.load_annual_file(fixture("annual.xml")).unwrap();

    assert_eq!(report.tiers.len(), 2);
    assert_eq!(report.tiers["StockholdersEquity"], None);
    assert_eq!(session.table().concepts(), vec!["Revenues"]);
    assert_eq!(session.table().len(), 3);
}

#[test]
fn test_missing_filing() {
    let mut session = Session::default();
    let err = session.load_annual_file(fixture("missing.xml")).unwrap_err();
    assert!(matches!(err, FilingError::Io { .. }));
    assert!(session.table().is_empty());
}

#[test]
fn test_table_serializes_to_json() {
    let mut session = Session::default();
    session.load_quarterly_file(fixture("quarterly.xml")).unwrap();

    let json = serde_json::to_value(session.table()).unwrap();
    assert_eq!(
        json["cells"]["28/12/2019"]["Revenues"],
        serde_json::json!(91_819_000_000.0)
    );
}
