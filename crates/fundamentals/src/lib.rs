#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Financial fundamentals extraction from XBRL filings.
//!
//! This crate re-exports the core types and the XBRL engine, and provides a
//! [`Session`] that loads filings one at a time and accumulates their
//! resolved concepts into a single [`FactTable`].
//!
//! # Example
//!
//! ```
//! use fundamentals::{ExtractionConfig, PeriodLabel, Session, XbrlDocument};
//!
//! let doc = XbrlDocument::parse(r#"
//!     <xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
//!                 xmlns:us-gaap="http://fasb.org/us-gaap/2019-01-31">
//!       <xbrli:context id="c-1">
//!         <xbrli:period>
//!           <xbrli:startDate>2018-09-30</xbrli:startDate>
//!           <xbrli:endDate>2019-09-28</xbrli:endDate>
//!         </xbrli:period>
//!       </xbrli:context>
//!       <us-gaap:NetIncomeLoss contextRef="c-1">55256000000</us-gaap:NetIncomeLoss>
//!     </xbrli:xbrl>"#)?;
//!
//! let mut session = Session::new(ExtractionConfig::default())?;
//! let report = session.load_annual(&doc);
//! assert!(report.periods.contains(&PeriodLabel::FiscalYear(2019)));
//!
//! let table = session.into_table();
//! assert_eq!(table.get(PeriodLabel::FiscalYear(2019), "NetIncomeLoss"), Some(55_256_000_000.0));
//! # Ok::<(), fundamentals::FilingError>(())
//! ```

// Core types and traits
pub use fundamentals_core::concepts::{NUMBER_OF_DILUTED_SHARES, NUMBER_OF_SHARES, default_concepts};
pub use fundamentals_core::*;

// Engine
pub use fundamentals_xbrl::{
    Bucket, ConceptResolver, ContextCatalog, FactRejection, MarkupElement, PeriodIndex,
    Resolution, XbrlDocument, read_metadata,
};

// DataFrame export
pub use polars::prelude::DataFrame;

mod session;
pub use session::{LoadReport, Session};
