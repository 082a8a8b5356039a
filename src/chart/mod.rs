//! Chart-options derivation
//!
//! Module organization:
//! - `palettes`, `colors`: palette registry and RGB helpers
//! - `color_strategy`: per chart family color assignment
//! - `predicates`: header matching for drilling and color mapping
//! - `series`, `categories`, `axes`, `combo`: series and axis building
//! - `drill`: drillability and drill intersections
//! - `tooltip`, `number_format`: tooltip markup
//! - `validation`: data size limits

pub mod axes;
pub mod categories;
pub mod color_strategy;
pub mod colors;
pub mod combo;
pub mod drill;
pub mod number_format;
pub mod palettes;
pub mod predicates;
pub mod series;
pub mod tooltip;
pub mod validation;

use crate::config::ChartConfig;
use crate::error::ChartError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported visualization types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Column,
    Bar,
    Line,
    Area,
    Pie,
    Donut,
    Funnel,
    Scatter,
    Bubble,
    Heatmap,
    Treemap,
    Combo,
}

impl ChartType {
    pub const ALL: [ChartType; 12] = [
        ChartType::Column,
        ChartType::Bar,
        ChartType::Line,
        ChartType::Area,
        ChartType::Pie,
        ChartType::Donut,
        ChartType::Funnel,
        ChartType::Scatter,
        ChartType::Bubble,
        ChartType::Heatmap,
        ChartType::Treemap,
        ChartType::Combo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Column => "column",
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Pie => "pie",
            ChartType::Donut => "donut",
            ChartType::Funnel => "funnel",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
            ChartType::Heatmap => "heatmap",
            ChartType::Treemap => "treemap",
            ChartType::Combo => "combo",
        }
    }

    /// Types where measures alternate along one series when there is no view attribute
    pub fn is_multi_measures_alternating(self) -> bool {
        matches!(
            self,
            ChartType::Pie | ChartType::Donut | ChartType::Funnel | ChartType::Treemap
        )
    }

    /// Types whose points are sorted by value, descending
    pub fn is_sorted_by_measure(self) -> bool {
        matches!(self, ChartType::Pie | ChartType::Donut | ChartType::Funnel)
    }

    /// Stack attribute turns on stacking for these types
    pub fn supports_stacking(self) -> bool {
        !matches!(
            self,
            ChartType::Line | ChartType::Area | ChartType::Scatter | ChartType::Bubble
        )
    }

    pub fn supports_dual_axes(self) -> bool {
        matches!(
            self,
            ChartType::Column | ChartType::Bar | ChartType::Line | ChartType::Area | ChartType::Combo
        )
    }

    pub fn cannot_show_negative_values(self) -> bool {
        matches!(
            self,
            ChartType::Pie | ChartType::Donut | ChartType::Funnel | ChartType::Treemap
        )
    }

    /// Scatter and bubble: one point per row, measures as coordinates
    pub fn is_xy(self) -> bool {
        matches!(self, ChartType::Scatter | ChartType::Bubble)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "combo2" {
            return Ok(ChartType::Combo);
        }
        ChartType::ALL
            .into_iter()
            .find(|chart_type| chart_type.as_str() == s)
            .ok_or_else(|| ChartError::UnsupportedChartType(s.to_string()))
    }
}

/// Stacking mode of the value axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stacking {
    Normal,
    Percent,
}

/// Stacking enabled by a stack attribute (where the type supports it), by
/// area stacking, or by the measure stacking flags
pub fn stacking_config(chart_type: ChartType, config: &ChartConfig, has_stack: bool) -> Option<Stacking> {
    let stack_by = has_stack && chart_type.supports_stacking();
    let area_stacking = chart_type == ChartType::Area && config.is_area_stacking_enabled();
    let stack_measures = config.stack_measures.unwrap_or(false);
    let to_percent = config.stack_measures_to_percent();

    if stack_by || area_stacking || stack_measures || to_percent {
        Some(if to_percent {
            Stacking::Percent
        } else {
            Stacking::Normal
        })
    } else {
        None
    }
}

/// Parse a raw data value; non-numeric values become `None`
pub fn parse_value(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
