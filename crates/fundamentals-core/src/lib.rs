#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for XBRL fundamentals extraction.
//!
//! - [`FilingDocument`](document::FilingDocument) - Access surface over one parsed filing
//! - [`PeriodDescriptor`](types::PeriodDescriptor) - A declared reporting period (context)
//! - [`Concept`](types::Concept) - A financial line item with alternate tag names
//! - [`FactTable`](table::FactTable) - Period by concept table of resolved values
//! - [`ExtractionConfig`](config::ExtractionConfig) - Heuristic thresholds and concept set

/// Extraction configuration.
pub mod config;
/// Default concept set.
pub mod concepts;
/// Filing document access trait.
pub mod document;
/// Error types for extraction.
pub mod error;
/// Resolution mode and tier definitions.
pub mod mode;
/// Period by concept fact table.
pub mod table;
/// Core data types (descriptors, labels, concepts, facts).
pub mod types;

// Re-export commonly used items at crate root
pub use config::{CatalogConfig, ExtractionConfig, ResolverConfig};
pub use document::{DescriptorRejection, DescriptorScan, FilingDocument, RawFact, RejectReason};
pub use error::{FilingError, Result};
pub use mode::{ResolutionMode, Tier};
pub use table::FactTable;
pub use types::{
    Concept, Fact, FilingMetadata, PeriodDescriptor, PeriodKind, PeriodLabel, PeriodSpan,
    QualifiedTag,
};
