//! Filing document access.
//!
//! This module defines the [`FilingDocument`] trait: the surface a parsed
//! filing exposes to the extraction engine. Implementations own the markup
//! details (namespace prefixes, case folding, date text formats); the engine
//! only sees period descriptors, raw fact text and filing metadata.

use std::fmt::Debug;
use thiserror::Error;

use crate::types::{FilingMetadata, PeriodDescriptor, QualifiedTag};

/// Why a context was left out of every period index.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The context has no `id` attribute.
    #[error("context has no id")]
    MissingId,
    /// The context declares neither a start/end pair nor an instant.
    #[error("context declares no dated period")]
    MissingPeriod,
    /// One of the required date elements is absent.
    #[error("context is missing its {0} element")]
    MissingDate(&'static str),
    /// A date element's text is not a calendar date.
    #[error("unparsable date {0:?}")]
    UnparsableDate(String),
}

/// A context that could not be turned into a [`PeriodDescriptor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptorRejection {
    /// Context id, when the context has one.
    pub id: Option<String>,
    /// Reason for the rejection.
    pub reason: RejectReason,
}

/// Result of scanning a filing for its contexts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DescriptorScan {
    /// Successfully parsed descriptors, in document order.
    pub descriptors: Vec<PeriodDescriptor>,
    /// Contexts skipped from all indices.
    pub rejected: Vec<DescriptorRejection>,
}

/// A fact element as it appears in the filing, before numeric coercion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawFact<'a> {
    /// Id of the context the fact refers to.
    pub context_ref: &'a str,
    /// Text content of the element.
    pub text: &'a str,
}

/// Access surface over one parsed filing.
///
/// The filing is passed explicitly to every classification and resolution
/// call; nothing about a document survives between calls.
pub trait FilingDocument: Debug {
    /// Scans every context the filing declares.
    fn scan_descriptors(&self) -> DescriptorScan;

    /// Returns every fact element tagged `tag`, in document order.
    ///
    /// Elements without a context reference are not facts and are omitted.
    fn facts(&self, tag: &QualifiedTag) -> Vec<RawFact<'_>>;

    /// Reads the filing's document and entity information.
    fn metadata(&self) -> FilingMetadata;
}
