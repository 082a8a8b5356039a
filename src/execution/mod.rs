//! Execution results: wire model, header lookup and paging
//!
//! Module organization:
//! - `result`: result/response wire types
//! - `definition`: measures, attributes and buckets of the execution
//! - `dimensions`: measure group and attribute header lookup
//! - `data_view`: validated read-only facade used by chart builders
//! - `pager`: offset/limit arithmetic, page merging, uri handling
//! - `client`: sequential page fetching

pub mod client;
pub mod data_view;
pub mod definition;
pub mod dimensions;
pub mod pager;
pub mod result;

pub use client::{InMemoryResultSource, PageFetcher, ResultPager};
pub use data_view::DataView;
pub use definition::{Bucket, ExecutionDefinition, Measure, MeasureDefinition, ObjQualifier};
pub use dimensions::LocatedAttribute;
pub use result::{
    AttributeHeader, AttributeHeaderItem, DataValue, ExecutionResponse, ExecutionResult,
    MeasureHeader, ResultData, ResultDimension, ResultHeaderItem,
};
