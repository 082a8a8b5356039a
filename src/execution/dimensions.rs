//! Dimension and header locator
//!
//! Finds the measure group and attribute headers by position and zips attribute
//! descriptors with their header items, which live in a parallel structure.

use super::result::{
    AttributeHeader, AttributeHeaderItem, MeasureGroupHeader, ResultDimension, ResultHeaderItem,
};
use crate::error::{ChartError, Result};

/// Dimension holding the view-by attributes (and measures) in chart layouts
pub const VIEW_BY_DIMENSION_INDEX: usize = 1;
/// Dimension holding the stack-by attribute (and measures) in chart layouts
pub const STACK_BY_DIMENSION_INDEX: usize = 0;
/// Child attribute position when viewing by two attributes
pub const PRIMARY_ATTRIBUTE_INDEX: usize = 1;
/// Parent attribute position when viewing by two attributes
pub const PARENT_ATTRIBUTE_INDEX: usize = 0;

/// Attribute descriptor merged with its header items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedAttribute {
    pub header: AttributeHeader,
    pub items: Vec<AttributeHeaderItem>,
}

impl LocatedAttribute {
    pub fn item(&self, index: usize) -> Option<&AttributeHeaderItem> {
        self.items.get(index)
    }

    pub fn item_names(&self) -> Vec<String> {
        self.items.iter().map(|item| item.name.clone()).collect()
    }
}

/// Fail if a measure group header exists but is not the last header
pub fn validate_dimension(dimension: &ResultDimension, index: usize) -> Result<()> {
    let last = dimension.headers.len().saturating_sub(1);
    match dimension
        .headers
        .iter()
        .position(|header| header.as_measure_group().is_some())
    {
        Some(position) if position != last => Err(ChartError::MalformedDimension { dimension: index }),
        _ => Ok(()),
    }
}

/// First measure group header across dimensions, scanning in order.
pub fn find_measure_group(dimensions: &[ResultDimension]) -> Result<Option<&MeasureGroupHeader>> {
    for (index, dimension) in dimensions.iter().enumerate() {
        if let Some(group) = find_measure_group_in_dimension(dimension, index)? {
            return Ok(Some(group));
        }
    }
    Ok(None)
}

/// Measure group header of a single dimension, if present
pub fn find_measure_group_in_dimension(
    dimension: &ResultDimension,
    index: usize,
) -> Result<Option<&MeasureGroupHeader>> {
    validate_dimension(dimension, index)?;
    Ok(dimension
        .headers
        .iter()
        .find_map(|header| header.as_measure_group()))
}

/// Attribute header of a dimension merged with its items.
///
/// # Arguments
/// * `dimension` - Descriptor of the dimension
/// * `header_items` - Header items of the same dimension (`headerItems[d]`)
/// * `index_in_dimension` - Header position; `None` picks the first attribute
pub fn find_attribute_in_dimension(
    dimension: Option<&ResultDimension>,
    header_items: &[Vec<ResultHeaderItem>],
    index_in_dimension: Option<usize>,
) -> Option<LocatedAttribute> {
    let dimension = dimension?;
    dimension
        .headers
        .iter()
        .enumerate()
        .filter(|(index, _)| index_in_dimension.map_or(true, |wanted| wanted == *index))
        .find_map(|(index, header)| {
            let header = header.as_attribute()?;
            let items = header_items
                .get(index)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_attribute().cloned())
                        .collect()
                })
                .unwrap_or_default();
            Some(LocatedAttribute {
                header: header.clone(),
                items,
            })
        })
}
