//! Execution result wire model
//!
//! Two separate structures describe one computation:
//! - `ExecutionResponse`: per-dimension header descriptors (attribute headers
//!   and the measure group header)
//! - `ExecutionResult`: raw data, the per-position header items parallel to
//!   those descriptors, and the paging window the result covers
//!
//! Both are deserialized from the backend's camelCase JSON.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A single raw value; numeric strings or null
pub type DataValue = Option<String>;

/// Data array of a result: 2-D for two dimensions, flat for one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultData {
    TwoDim(Vec<Vec<DataValue>>),
    OneDim(Vec<DataValue>),
}

impl Default for ResultData {
    fn default() -> Self {
        ResultData::TwoDim(Vec::new())
    }
}

impl ResultData {
    /// Number of rows (outer entries)
    pub fn len(&self) -> usize {
        match self {
            ResultData::TwoDim(rows) => rows.len(),
            ResultData::OneDim(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View the data as rows; flat data becomes a single row
    pub fn two_dim(&self) -> Cow<'_, [Vec<DataValue>]> {
        match self {
            ResultData::TwoDim(rows) => Cow::Borrowed(rows.as_slice()),
            ResultData::OneDim(values) => Cow::Owned(vec![values.clone()]),
        }
    }
}

/// Paging window per dimension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub count: Vec<usize>,
    pub offset: Vec<usize>,
    pub total: Vec<usize>,
}

/// Attribute element label (`attributeHeaderItem`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeHeaderItem {
    pub uri: String,
    pub name: String,
}

impl AttributeHeaderItem {
    /// Element id encoded in the uri (`.../elements?id=123` -> `123`)
    pub fn element_id(&self) -> &str {
        self.uri
            .split_once("?id=")
            .map(|(_, id)| id)
            .unwrap_or(self.uri.as_str())
    }
}

/// Measure label within the measure group (`measureHeaderItem`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureHeaderItem {
    pub name: String,
    pub order: usize,
}

/// Total row label (`totalHeaderItem`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalHeaderItem {
    pub name: String,
    #[serde(rename = "type")]
    pub total_type: String,
}

/// One header item as stored in `headerItems[dimension][header][position]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultHeaderItem {
    AttributeHeaderItem(AttributeHeaderItem),
    MeasureHeaderItem(MeasureHeaderItem),
    TotalHeaderItem(TotalHeaderItem),
}

impl ResultHeaderItem {
    pub fn as_attribute(&self) -> Option<&AttributeHeaderItem> {
        match self {
            ResultHeaderItem::AttributeHeaderItem(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_measure(&self) -> Option<&MeasureHeaderItem> {
        match self {
            ResultHeaderItem::MeasureHeaderItem(item) => Some(item),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResultHeaderItem::AttributeHeaderItem(item) => &item.name,
            ResultHeaderItem::MeasureHeaderItem(item) => &item.name,
            ResultHeaderItem::TotalHeaderItem(item) => &item.name,
        }
    }
}

/// One (possibly partial) page of computed data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    #[serde(default)]
    pub data: ResultData,
    #[serde(default)]
    pub header_items: Vec<Vec<Vec<ResultHeaderItem>>>,
    #[serde(default)]
    pub paging: Paging,
}

impl ExecutionResult {
    /// Parse either `{executionResult: {...}}` or the bare result object
    pub fn from_json(json: &str) -> crate::Result<Self> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Wrapper {
            execution_result: ExecutionResult,
        }

        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("executionResult").is_some() {
            let wrapper: Wrapper = serde_json::from_value(value)?;
            Ok(wrapper.execution_result)
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }
}

/// Reference to the attribute a display form belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormOf {
    pub uri: String,
    pub identifier: String,
    pub name: String,
}

/// Attribute descriptor in a dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeHeader {
    pub uri: String,
    pub identifier: String,
    pub local_identifier: String,
    pub name: String,
    pub form_of: FormOf,
}

/// Measure descriptor inside the measure group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub local_identifier: String,
    pub name: String,
    #[serde(default = "default_measure_format")]
    pub format: String,
}

fn default_measure_format() -> String {
    crate::chart::number_format::DEFAULT_FORMAT.to_string()
}

/// The measure group; wire items are wrapped as `{measureHeaderItem: {...}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureGroupHeader {
    #[serde(with = "wrapped_measure_items")]
    pub items: Vec<MeasureHeader>,
}

mod wrapped_measure_items {
    use super::MeasureHeader;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Wrapped<T> {
        measure_header_item: T,
    }

    pub fn serialize<S: Serializer>(items: &[MeasureHeader], s: S) -> Result<S::Ok, S::Error> {
        items
            .iter()
            .map(|item| Wrapped {
                measure_header_item: item,
            })
            .collect::<Vec<_>>()
            .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<MeasureHeader>, D::Error> {
        let wrapped: Vec<Wrapped<MeasureHeader>> = Vec::deserialize(d)?;
        Ok(wrapped.into_iter().map(|w| w.measure_header_item).collect())
    }
}

/// Header descriptor of a dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Header {
    AttributeHeader(AttributeHeader),
    MeasureGroupHeader(MeasureGroupHeader),
}

impl Header {
    pub fn as_attribute(&self) -> Option<&AttributeHeader> {
        match self {
            Header::AttributeHeader(header) => Some(header),
            Header::MeasureGroupHeader(_) => None,
        }
    }

    pub fn as_measure_group(&self) -> Option<&MeasureGroupHeader> {
        match self {
            Header::MeasureGroupHeader(group) => Some(group),
            Header::AttributeHeader(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDimension {
    #[serde(default)]
    pub headers: Vec<Header>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLinks {
    pub execution_result: String,
}

/// Dimension descriptors returned when an execution is started
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    pub dimensions: Vec<ResultDimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ExecutionLinks>,
}

impl ExecutionResponse {
    /// Parse either `{executionResponse: {...}}` or the bare response object
    pub fn from_json(json: &str) -> crate::Result<Self> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Wrapper {
            execution_response: ExecutionResponse,
        }

        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("executionResponse").is_some() {
            let wrapper: Wrapper = serde_json::from_value(value)?;
            Ok(wrapper.execution_response)
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }
}
