//! Chart configuration
//!
//! Deserialized from the JSON object the UI layer passes along with a
//! visualization. Unknown keys are ignored; every key is optional.

use crate::chart::colors::{ColorItem, PaletteItem};
use crate::chart::predicates::HeaderPredicate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Axis section (`xaxis`, `yaxis`, `secondary_xaxis`, `secondary_yaxis`)
///
/// `measures` lists the local identifiers placed on the axis; all other keys
/// are rendering properties passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub measures: Vec<String>,
    #[serde(flatten)]
    pub props: serde_json::Map<String, serde_json::Value>,
}

/// Number separators used in tooltips
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separators {
    #[serde(default = "default_thousand")]
    pub thousand: String,
    #[serde(default = "default_decimal")]
    pub decimal: String,
}

fn default_thousand() -> String {
    ",".to_string()
}

fn default_decimal() -> String {
    ".".to_string()
}

impl Default for Separators {
    fn default() -> Self {
        Separators {
            thousand: default_thousand(),
            decimal: default_decimal(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Color override: the first rule whose predicate matches a header wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorMapping {
    pub predicate: HeaderPredicate,
    pub color: ColorItem,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(rename = "type", default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub stacking: Option<bool>,
    #[serde(default)]
    pub stack_measures: Option<bool>,
    #[serde(default)]
    pub stack_measures_to_percent: Option<bool>,

    #[serde(default)]
    pub xaxis: Option<AxisConfig>,
    #[serde(default)]
    pub yaxis: Option<AxisConfig>,
    #[serde(rename = "secondary_xaxis", default)]
    pub secondary_xaxis: Option<AxisConfig>,
    #[serde(rename = "secondary_yaxis", default)]
    pub secondary_yaxis: Option<AxisConfig>,
    #[serde(default)]
    pub dual_axis: Option<bool>,

    #[serde(default)]
    pub color_palette: Option<Vec<PaletteItem>>,
    #[serde(default)]
    pub color_mapping: Vec<ColorMapping>,

    #[serde(default)]
    pub legend_layout: Option<String>,
    #[serde(default)]
    pub separators: Separators,
    #[serde(default)]
    pub grid: Option<GridConfig>,

    #[serde(default)]
    pub primary_chart_type: Option<String>,
    #[serde(default)]
    pub secondary_chart_type: Option<String>,

    #[serde(default)]
    pub x_label: Option<String>,
    #[serde(default)]
    pub y_label: Option<String>,
    #[serde(default)]
    pub x_format: Option<String>,
    #[serde(default)]
    pub y_format: Option<String>,

    /// Min/max of the value axis, passed through to the renderer
    #[serde(default)]
    pub mvf: Option<serde_json::Value>,
}

impl ChartConfig {
    /// Minimal configuration for a chart type
    pub fn new(chart_type: impl Into<String>) -> Self {
        ChartConfig {
            chart_type: Some(chart_type.into()),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        Ok(Self::from_json(&json)?)
    }

    pub fn stack_measures_to_percent(&self) -> bool {
        self.stack_measures_to_percent.unwrap_or(false)
    }

    pub fn grid_enabled(&self) -> bool {
        self.grid.map_or(true, |grid| grid.enabled)
    }

    pub fn legend_layout(&self) -> &str {
        self.legend_layout.as_deref().unwrap_or("horizontal")
    }

    /// Local identifiers configured on the secondary value axis
    pub fn secondary_axis_measures(&self, is_bar: bool) -> &[String] {
        let axis = if is_bar {
            &self.secondary_xaxis
        } else {
            &self.secondary_yaxis
        };
        axis
            .as_ref()
            .map(|axis| axis.measures.as_slice())
            .unwrap_or(&[])
    }

    /// Area charts stack unless explicitly disabled
    pub fn is_area_stacking_enabled(&self) -> bool {
        match self.stack_measures {
            None => self.stacking.unwrap_or(true),
            Some(stack) => stack,
        }
    }
}
