//! Combo chart: per-bucket series types and the percent stacking rule

use super::series::Series;
use super::{ChartType, Stacking};
use crate::config::ChartConfig;
use crate::execution::data_view::DataView;
use crate::execution::definition::{MEASURES, SECONDARY_MEASURES};

/// Series types a combo chart can mix
pub const COMBO_SUB_TYPES: [ChartType; 3] = [ChartType::Column, ChartType::Line, ChartType::Area];

/// Configured sub-type, or the bucket's default when unset or not mixable
fn sub_type(configured: Option<&str>, default: ChartType) -> ChartType {
    configured
        .and_then(|name| name.parse::<ChartType>().ok())
        .filter(|chart_type| COMBO_SUB_TYPES.contains(chart_type))
        .unwrap_or(default)
}

/// Local identifiers on the secondary axis of a combo chart: the secondary
/// measures bucket, unless dual axis is turned off
pub fn secondary_axis_measures(config: &ChartConfig, dv: &DataView) -> Vec<String> {
    if config.dual_axis == Some(false) {
        return Vec::new();
    }
    dv.bucket(SECONDARY_MEASURES)
        .map(|bucket| bucket.items.clone())
        .unwrap_or_default()
}

/// Type each series by the bucket of its measure: primary measures default
/// to column, secondary ones to line.
pub fn set_series_types(series: &mut [Series], config: &ChartConfig, dv: &DataView) {
    let types = [
        (MEASURES, sub_type(config.primary_chart_type.as_deref(), ChartType::Column)),
        (
            SECONDARY_MEASURES,
            sub_type(config.secondary_chart_type.as_deref(), ChartType::Line),
        ),
    ];
    for (bucket, chart_type) in types {
        let Some(bucket) = dv.bucket(bucket) else {
            continue;
        };
        for local_identifier in &bucket.items {
            let Some(index) = dv.measure_header_index(local_identifier) else {
                continue;
            };
            if let Some(item) = series.get_mut(index) {
                item.series_type = Some(chart_type);
            }
        }
    }
}

/// Percent stacking is off once a line shares the chart with a series on the
/// left axis
pub fn can_stack_in_percent(series: &[Series]) -> bool {
    let any_on_left_axis = series.iter().any(|s| s.y_axis.unwrap_or(0) == 0);
    let any_line = series.iter().any(|s| s.series_type == Some(ChartType::Line));
    !(any_on_left_axis && any_line)
}

/// Stacking of a combo chart given the stacking its flags would enable
pub fn stacking_config(
    config: &ChartConfig,
    series: &[Series],
    default: Option<Stacking>,
) -> Option<Stacking> {
    if can_stack_in_percent(series) {
        default
    } else if config.stack_measures.unwrap_or(false) {
        Some(Stacking::Normal)
    } else {
        None
    }
}
