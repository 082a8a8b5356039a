//! Chart options derivation for paged execution results
//!
//! Module organization:
//! - `execution`: result wire model, data view facade and result paging
//! - `chart`: colors, series, categories, axes, drilling and tooltips
//! - `pipeline`: builds the complete options of one chart
//! - `config`: chart configuration
//! - `logging`: tracing subscriber setup

pub mod chart;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod pipeline;

pub use chart::ChartType;
pub use config::ChartConfig;
pub use error::{ChartError, Result};
pub use execution::DataView;
pub use pipeline::{get_chart_options, ChartOptions};
