//! Markup access over XBRL instance documents.
//!
//! [`XbrlDocument`] parses an instance once with `roxmltree` and keeps a flat,
//! owned element tree. Element names are stored without their namespace URI,
//! split into the prefix written in the document and the local name, both
//! lowercased; attribute names are lowercased too. Lookups are therefore
//! case-insensitive, the way filers' inconsistent casing requires.

use chrono::NaiveDate;
use fundamentals_core::{
    DescriptorRejection, DescriptorScan, FilingDocument, FilingError, FilingMetadata,
    PeriodDescriptor, QualifiedTag, RawFact, RejectReason, Result,
};
use std::path::Path;
use tracing::{debug, instrument};

use crate::dei;

/// Local name of context elements.
const CONTEXT: &str = "context";
/// Local name of a duration's first day.
const START_DATE: &str = "startdate";
/// Local name of a duration's last day.
const END_DATE: &str = "enddate";
/// Local name of an instant's date.
const INSTANT: &str = "instant";
/// Attribute linking a fact to its context.
const CONTEXT_REF: &str = "contextref";

/// One element of a parsed document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkupElement {
    prefix: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<usize>,
}

impl MarkupElement {
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let tag = node.tag_name();
        let prefix = tag
            .namespace()
            .and_then(|uri| node.lookup_prefix(uri))
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_lowercase);
        let attributes = node
            .attributes()
            .map(|attr| (attr.name().to_lowercase(), attr.value().to_string()))
            .collect();

        Self {
            prefix,
            name: tag.name().to_lowercase(),
            attributes,
            text: node.text().unwrap_or_default().trim().to_string(),
            children: Vec::new(),
        }
    }

    /// Namespace prefix as written in the document, lowercased.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Local name, lowercased.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up an attribute by local name, case-insensitively.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed text content.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true if this element is `tag`, ignoring case.
    #[must_use]
    pub fn is(&self, tag: &QualifiedTag) -> bool {
        self.name.eq_ignore_ascii_case(tag.local_name())
            && self
                .prefix
                .as_deref()
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(tag.prefix()))
    }
}

/// A parsed XBRL instance document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XbrlDocument {
    elements: Vec<MarkupElement>,
}

impl XbrlDocument {
    /// Parses an instance document.
    ///
    /// Fails with [`FilingError::Markup`] if the text is not well-formed XML.
    #[instrument(skip_all, fields(bytes = text.len()))]
    pub fn parse(text: &str) -> Result<Self> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let tree = roxmltree::Document::parse_with_options(text, options)
            .map_err(|e| FilingError::Markup(e.to_string()))?;

        let mut elements = Vec::new();
        collect(tree.root_element(), &mut elements);
        debug!(elements = elements.len(), "Parsed instance document");
        Ok(Self { elements })
    }

    /// Reads and parses an instance document from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FilingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Number of elements in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements with the given local name, any prefix, in document order.
    pub fn find_all<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a MarkupElement> {
        self.elements
            .iter()
            .filter(move |el| el.name.eq_ignore_ascii_case(local_name))
    }

    /// All elements named `tag`, in document order.
    pub fn find_tagged<'a, 't>(
        &'a self,
        tag: &'t QualifiedTag,
    ) -> impl Iterator<Item = &'a MarkupElement> + use<'a, 't> {
        self.elements.iter().filter(move |el| el.is(tag))
    }

    /// Direct child elements of `element`.
    pub fn children<'a>(
        &'a self,
        element: &'a MarkupElement,
    ) -> impl Iterator<Item = &'a MarkupElement> {
        element.children.iter().map(|&index| &self.elements[index])
    }

    /// First descendant of `element` with the given local name, depth first.
    #[must_use]
    pub fn find_descendant<'a>(
        &'a self,
        element: &'a MarkupElement,
        local_name: &str,
    ) -> Option<&'a MarkupElement> {
        self.children(element).find_map(|child| {
            if child.name.eq_ignore_ascii_case(local_name) {
                Some(child)
            } else {
                self.find_descendant(child, local_name)
            }
        })
    }

    fn descendant_date(
        &self,
        context: &MarkupElement,
        local_name: &'static str,
        label: &'static str,
    ) -> std::result::Result<Option<NaiveDate>, RejectReason> {
        match self.find_descendant(context, local_name) {
            None => Ok(None),
            Some(el) => parse_date(el.text())
                .map(Some)
                .ok_or_else(|| RejectReason::UnparsableDate(el.text().to_string()))
                .inspect_err(|_| debug!(element = label, "Unparsable context date")),
        }
    }

    fn parse_context(
        &self,
        context: &MarkupElement,
    ) -> std::result::Result<PeriodDescriptor, DescriptorRejection> {
        let id = context.attribute("id").filter(|id| !id.is_empty());
        let reject = |reason: RejectReason| DescriptorRejection {
            id: id.map(str::to_string),
            reason,
        };
        let id = id.ok_or_else(|| reject(RejectReason::MissingId))?;

        let start = self
            .descendant_date(context, START_DATE, "startDate")
            .map_err(reject)?;
        let end = self
            .descendant_date(context, END_DATE, "endDate")
            .map_err(reject)?;

        match (start, end) {
            (Some(start), Some(end)) => Ok(PeriodDescriptor::duration(id, start, end)),
            (Some(_), None) => Err(reject(RejectReason::MissingDate("endDate"))),
            (None, Some(_)) => Err(reject(RejectReason::MissingDate("startDate"))),
            (None, None) => match self
                .descendant_date(context, INSTANT, "instant")
                .map_err(reject)?
            {
                Some(date) => Ok(PeriodDescriptor::instant(id, date)),
                None => Err(reject(RejectReason::MissingPeriod)),
            },
        }
    }
}

impl FilingDocument for XbrlDocument {
    fn scan_descriptors(&self) -> DescriptorScan {
        let mut scan = DescriptorScan::default();
        for context in self.find_all(CONTEXT) {
            match self.parse_context(context) {
                Ok(descriptor) => scan.descriptors.push(descriptor),
                Err(rejection) => {
                    debug!(id = ?rejection.id, reason = %rejection.reason, "Skipping context");
                    scan.rejected.push(rejection);
                }
            }
        }
        scan
    }

    fn facts(&self, tag: &QualifiedTag) -> Vec<RawFact<'_>> {
        self.elements
            .iter()
            .filter(|el| el.is(tag))
            .filter_map(|el| {
                el.attribute(CONTEXT_REF).map(|context_ref| RawFact {
                    context_ref,
                    text: el.text(),
                })
            })
            .collect()
    }

    fn metadata(&self) -> FilingMetadata {
        dei::read_metadata(self)
    }
}

fn collect(node: roxmltree::Node<'_, '_>, out: &mut Vec<MarkupElement>) -> usize {
    let index = out.len();
    out.push(MarkupElement::from_node(node));
    let children: Vec<usize> = node
        .children()
        .filter(roxmltree::Node::is_element)
        .map(|child| collect(child, out))
        .collect();
    out[index].children = children;
    index
}

/// Parses a date from its digits, accepting `YYYYMMDD` and `YYYY-MM-DD`.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(&digits, "%Y%m%d").ok()
}
