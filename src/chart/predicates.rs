//! Header predicates
//!
//! A predicate decides whether a header (measure, attribute, or attribute
//! element) is matched by a drill or color-mapping rule. Predicates see the
//! whole data view so derived and arithmetic measures can be resolved.

use crate::execution::data_view::DataView;
use crate::execution::definition::Measure;
use crate::execution::result::{AttributeHeader, AttributeHeaderItem, MeasureHeader};
use serde::{Deserialize, Serialize};

/// Serializable header matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderPredicate {
    /// Attribute display form, element, or (master) measure uri
    Uri(String),
    /// Attribute display form or (master) measure identifier
    Identifier(String),
    LocalIdentifier(String),
    /// Arithmetic measure with an operand (at any depth) of this uri
    ComposedFromUri(String),
    /// Arithmetic measure with an operand (at any depth) of this identifier
    ComposedFromIdentifier(String),
    AttributeItemName(String),
}

/// A header a predicate can be evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingHeader<'a> {
    Measure(&'a MeasureHeader),
    Attribute(&'a AttributeHeader),
    AttributeItem(&'a AttributeHeaderItem),
}

impl HeaderPredicate {
    pub fn matches(&self, header: MappingHeader<'_>, dv: &DataView) -> bool {
        match (self, header) {
            (HeaderPredicate::Uri(uri), MappingHeader::Attribute(attr)) => &attr.uri == uri,
            (HeaderPredicate::Uri(uri), MappingHeader::AttributeItem(item)) => &item.uri == uri,
            (HeaderPredicate::Uri(uri), MappingHeader::Measure(measure)) => {
                measure_refs(measure, dv).uris.iter().any(|u| u == uri)
            }

            (HeaderPredicate::Identifier(id), MappingHeader::Attribute(attr)) => {
                &attr.identifier == id
            }
            (HeaderPredicate::Identifier(id), MappingHeader::Measure(measure)) => {
                measure_refs(measure, dv).identifiers.iter().any(|i| i == id)
            }
            (HeaderPredicate::Identifier(_), MappingHeader::AttributeItem(_)) => false,

            (HeaderPredicate::LocalIdentifier(id), MappingHeader::Measure(measure)) => {
                &measure.local_identifier == id
            }
            (HeaderPredicate::LocalIdentifier(id), MappingHeader::Attribute(attr)) => {
                &attr.local_identifier == id
            }
            (HeaderPredicate::LocalIdentifier(_), MappingHeader::AttributeItem(_)) => false,

            (HeaderPredicate::ComposedFromUri(uri), MappingHeader::Measure(measure)) => {
                composed_refs(measure, dv).uris.iter().any(|u| u == uri)
            }
            (HeaderPredicate::ComposedFromIdentifier(id), MappingHeader::Measure(measure)) => {
                composed_refs(measure, dv).identifiers.iter().any(|i| i == id)
            }
            (HeaderPredicate::ComposedFromUri(_) | HeaderPredicate::ComposedFromIdentifier(_), _) => {
                false
            }

            (HeaderPredicate::AttributeItemName(name), MappingHeader::AttributeItem(item)) => {
                &item.name == name
            }
            (HeaderPredicate::AttributeItemName(_), _) => false,
        }
    }
}

/// True if any predicate matches the header
pub fn is_some_predicate_matched(
    predicates: &[HeaderPredicate],
    header: MappingHeader<'_>,
    dv: &DataView,
) -> bool {
    predicates.iter().any(|predicate| predicate.matches(header, dv))
}

#[derive(Debug, Default)]
struct Refs {
    uris: Vec<String>,
    identifiers: Vec<String>,
}

impl Refs {
    fn push(&mut self, uri: Option<&str>, identifier: Option<&str>) {
        self.uris.extend(uri.map(str::to_string));
        self.identifiers.extend(identifier.map(str::to_string));
    }

    /// Definition qualifier of a simple measure plus its header's values
    fn push_simple(&mut self, measure: &Measure, dv: &DataView) {
        if let Some(qualifier) = measure.qualifier() {
            self.push(qualifier.uri(), qualifier.identifier());
        }
        if let Some(header) = dv
            .measure_header_index(&measure.local_identifier)
            .and_then(|index| dv.measure_header(index))
        {
            self.push(header.uri.as_deref(), header.identifier.as_deref());
        }
    }
}

/// Uris/identifiers a measure header answers to. Derived measures answer to
/// their master; arithmetic measures (and their derivations) to nothing.
fn measure_refs(header: &MeasureHeader, dv: &DataView) -> Refs {
    let mut refs = Refs::default();
    match dv.master_measure(&header.local_identifier) {
        None => refs.push(header.uri.as_deref(), header.identifier.as_deref()),
        Some(master) if master.is_arithmetic() => {}
        Some(master) => refs.push_simple(master, dv),
    }
    refs
}

/// Leaf operand uris/identifiers of an arithmetic measure (or a measure
/// derived from one). Empty for any other measure.
fn composed_refs(header: &MeasureHeader, dv: &DataView) -> Refs {
    let mut refs = Refs::default();
    if let Some(master) = dv.master_measure(&header.local_identifier) {
        if master.is_arithmetic() {
            collect_operands(master, dv, &mut refs);
        }
    }
    refs
}

fn collect_operands(arithmetic: &Measure, dv: &DataView, refs: &mut Refs) {
    for operand in arithmetic.operands() {
        // graph is acyclic, checked when the data view was built
        match dv.master_measure(operand) {
            Some(master) if master.is_arithmetic() => collect_operands(master, dv, refs),
            Some(master) => refs.push_simple(master, dv),
            None => {}
        }
    }
}
