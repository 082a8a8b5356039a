//! X and y axis descriptors and the series-to-axis assignment

use super::series::{Series, XyBuckets};
use super::ChartType;
use crate::config::ChartConfig;
use crate::execution::data_view::DataView;
use crate::execution::dimensions::LocatedAttribute;
use crate::execution::result::MeasureHeader;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opposite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_indices: Option<Vec<usize>>,
}

impl Axis {
    fn labeled(label: impl Into<String>) -> Axis {
        Axis {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    fn contains_series(&self, index: usize) -> bool {
        self.series_indices
            .as_ref()
            .map_or(false, |indices| indices.contains(&index))
    }
}

/// Axis label and format of each measure; the configured defaults replace
/// the first measure's own (when non-empty)
fn preprocess_measures(
    measures: &[MeasureHeader],
    default_label: Option<&str>,
    default_format: Option<&str>,
) -> Vec<Axis> {
    let non_empty = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);
    measures
        .iter()
        .enumerate()
        .map(|(index, measure)| {
            if index == 0 {
                Axis {
                    label: non_empty(default_label).or_else(|| Some(measure.name.clone())),
                    format: non_empty(default_format).or_else(|| Some(measure.format.clone())),
                    ..Default::default()
                }
            } else {
                Axis {
                    label: Some(measure.name.clone()),
                    format: Some(measure.format.clone()),
                    ..Default::default()
                }
            }
        })
        .collect()
}

/// First percentage format among the given formats
fn percentage_format<'a>(mut formats: impl Iterator<Item = &'a str>) -> Option<String> {
    formats.find(|f| f.contains('%')).map(str::to_string)
}

pub fn get_x_axes(
    chart_type: ChartType,
    dv: &DataView,
    config: &ChartConfig,
    view: Option<&LocatedAttribute>,
) -> Vec<Axis> {
    if chart_type.is_xy() {
        let items = preprocess_measures(
            dv.measure_headers(),
            config.x_label.as_deref(),
            config.x_format.as_deref(),
        );
        if XyBuckets::from_data_view(dv).primary_empty {
            return vec![Axis::labeled("")];
        }
        let first = items.into_iter().next().unwrap_or_default();
        return vec![Axis {
            label: Some(first.label.unwrap_or_default()),
            format: Some(first.format.unwrap_or_default()),
            ..Default::default()
        }];
    }

    let label = config
        .x_label
        .clone()
        .filter(|label| !label.is_empty())
        .or_else(|| view.map(|view| view.header.form_of.name.clone()))
        .unwrap_or_default();
    vec![Axis::labeled(label)]
}

/// Value axis of a dual-axis chart: label only for a single measure
fn dual_axis_item(measures: &[(usize, &MeasureHeader)], opposite: bool) -> Option<Axis> {
    let (_, first) = measures.first()?;
    let format = percentage_format(measures.iter().map(|(_, m)| m.format.as_str()))
        .unwrap_or_else(|| first.format.clone());
    Some(Axis {
        label: Some(if measures.len() == 1 {
            first.name.clone()
        } else {
            String::new()
        }),
        format: Some(format),
        opposite: Some(opposite),
        series_indices: Some(measures.iter().map(|(index, _)| *index).collect()),
    })
}

/// Y axes of a chart.
///
/// # Arguments
/// * `secondary_measures` - Local identifiers placed on the secondary axis
pub fn get_y_axes(
    chart_type: ChartType,
    dv: &DataView,
    config: &ChartConfig,
    stack: Option<&LocatedAttribute>,
    secondary_measures: &[String],
) -> Vec<Axis> {
    let measures = dv.measure_headers();
    let items = preprocess_measures(measures, config.y_label.as_deref(), config.y_format.as_deref());

    if chart_type.is_xy() {
        let buckets = XyBuckets::from_data_view(dv);
        if buckets.secondary_empty {
            return vec![Axis::labeled("")];
        }
        let position = if buckets.primary_empty { 0 } else { 1 };
        return vec![items.get(position).cloned().unwrap_or_default()];
    }

    if chart_type == ChartType::Heatmap {
        let label = stack
            .map(|stack| stack.header.form_of.name.clone())
            .unwrap_or_default();
        return vec![Axis::labeled(label)];
    }

    if chart_type.supports_dual_axes() && !measures.is_empty() && !secondary_measures.is_empty() {
        let (second, first): (Vec<_>, Vec<_>) = measures
            .iter()
            .enumerate()
            .partition(|(_, m)| secondary_measures.contains(&m.local_identifier));
        return [dual_axis_item(&first, false), dual_axis_item(&second, true)]
            .into_iter()
            .flatten()
            .collect();
    }

    let mut axis = items.first().cloned().unwrap_or_default();
    if items.len() > 1 {
        axis.label = Some(String::new());
    }
    axis.series_indices = Some((0..items.len()).collect());
    if let Some(format) = percentage_format(measures.iter().map(|m| m.format.as_str())) {
        axis.format = Some(format);
    }
    vec![axis]
}

/// Point each series at the axis listing its index, axis 0 otherwise
pub fn assign_y_axes(series: &mut [Series], axes: &[Axis]) {
    for (index, item) in series.iter_mut().enumerate() {
        let axis = axes
            .iter()
            .position(|axis| axis.contains_series(index))
            .unwrap_or(0);
        item.y_axis = Some(axis);
    }
}
