#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! XBRL period resolution and concept extraction.
//!
//! This crate provides:
//!
//! - Markup access over XBRL instance documents
//! - Document and entity information (DEI) reading
//! - Context classification into annual, year-end and latest-quarter indices
//! - Concept resolution with alternate tag and tier fallback
//!
//! # Example
//!
//! ```
//! use fundamentals_core::{CatalogConfig, Concept, FilingDocument, PeriodLabel, ResolutionMode, ResolverConfig};
//! use fundamentals_xbrl::{ConceptResolver, ContextCatalog, XbrlDocument};
//!
//! let doc = XbrlDocument::parse(r#"
//!     <xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
//!                 xmlns:us-gaap="http://fasb.org/us-gaap/2019-01-31">
//!       <xbrli:context id="FD2019Q4YTD">
//!         <xbrli:period>
//!           <xbrli:startDate>2019-01-01</xbrli:startDate>
//!           <xbrli:endDate>2019-12-31</xbrli:endDate>
//!         </xbrli:period>
//!       </xbrli:context>
//!       <us-gaap:SalesRevenueNet contextRef="FD2019Q4YTD">1000000</us-gaap:SalesRevenueNet>
//!     </xbrli:xbrl>"#).unwrap();
//!
//! let scan = doc.scan_descriptors();
//! let catalog = ContextCatalog::build(&scan.descriptors, None, &CatalogConfig::default());
//!
//! let config = ResolverConfig::default();
//! let revenues = Concept::new("Revenues").with_alternate("SalesRevenueNet");
//! let resolution = ConceptResolver::new(&catalog, &config)
//!     .resolve(&doc, &revenues, ResolutionMode::Annual);
//!
//! assert_eq!(resolution.values.get(&PeriodLabel::FiscalYear(2019)), Some(&1_000_000.0));
//! ```

/// Context classification into period indices.
pub mod catalog;
/// Document and entity information facts.
pub mod dei;
/// Markup access over instance documents.
pub mod markup;
/// Concept resolution.
pub mod resolver;

pub use catalog::{Bucket, ContextCatalog, PeriodIndex};
pub use dei::read_metadata;
pub use markup::{MarkupElement, XbrlDocument};
pub use resolver::{ConceptResolver, FactRejection, Resolution};
