//! Data size limits and heatmap data classes

use super::categories::Categories;
use super::color_strategy::ColorStrategy;
use super::series::Series;
use super::ChartType;
use serde::Serialize;

/// Number of heatmap color classes
pub const HEATMAP_CLASS_COUNT: usize = 7;
/// Palette index of the single class when all values are equal
pub const DEFAULT_HEATMAP_COLOR_INDEX: usize = 1;
/// Significant digits kept on heatmap class bounds
const PRECISION: usize = 15;

/// Upper bounds a chart can render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLimits {
    pub series: usize,
    pub categories: usize,
    /// Points per series; unlimited when `None`
    pub data_points: Option<usize>,
}

impl DataLimits {
    pub fn for_chart(chart_type: ChartType) -> DataLimits {
        match chart_type {
            ChartType::Scatter => DataLimits {
                series: 1000,
                categories: 1000,
                data_points: None,
            },
            ChartType::Pie | ChartType::Donut | ChartType::Funnel => DataLimits {
                series: 1,
                categories: 20,
                data_points: None,
            },
            ChartType::Treemap => DataLimits {
                series: 1000,
                categories: 2000,
                data_points: Some(2000),
            },
            ChartType::Heatmap => DataLimits {
                series: 1000,
                categories: 365,
                data_points: Some(10000),
            },
            _ => DataLimits {
                series: 1000,
                categories: 365,
                data_points: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub data_too_large: bool,
    pub has_negative_value: bool,
}

/// Check the built series and categories against the chart's limits
pub fn validate_data(chart_type: ChartType, series: &[Series], categories: &Categories) -> ValidationResult {
    let limits = DataLimits::for_chart(chart_type);

    let too_many_points = limits.data_points.map_or(false, |limit| {
        series.iter().any(|s| {
            let points = if chart_type == ChartType::Treemap {
                s.data.iter().filter(|p| !p.is_root()).count()
            } else {
                s.data.len()
            };
            points > limit
        })
    });
    let data_too_large = series.len() > limits.series
        || categories.count() > limits.categories
        || too_many_points;

    let has_negative_value = chart_type.cannot_show_negative_values()
        && series.iter().flat_map(|s| &s.data).any(|p| {
            p.y.map_or(false, |y| y < 0.0) || p.value.map_or(false, |v| v < 0.0)
        });

    if data_too_large {
        tracing::warn!(
            "Data too large for {} chart: {} series, {} categories",
            chart_type,
            series.len(),
            categories.count()
        );
    }
    if has_negative_value {
        tracing::warn!("{} chart cannot show negative values", chart_type);
    }

    ValidationResult {
        data_too_large,
        has_negative_value,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataClass {
    pub from: f64,
    pub to: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn with_precision(value: f64) -> f64 {
    format!("{:.*e}", PRECISION - 1, value)
        .parse()
        .unwrap_or(value)
}

/// Equal-width value classes over the first series of a heatmap
pub fn heatmap_data_classes(series: &[Series], strategy: &ColorStrategy) -> Vec<DataClass> {
    let values: Vec<f64> = series
        .first()
        .map(|s| s.data.iter().filter_map(|p| p.value).collect())
        .unwrap_or_default();
    if values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let color = |index: usize| strategy.color_by_index(index).map(str::to_string);
    // the highest class takes the base color, the last gradient entry
    let top_color_index = strategy.palette().len().saturating_sub(1).max(HEATMAP_CLASS_COUNT - 1);

    if min == max {
        return vec![DataClass {
            from: min,
            to: max,
            color: color(DEFAULT_HEATMAP_COLOR_INDEX),
        }];
    }

    let safe_min = with_precision(min);
    let safe_max = with_precision(max);
    let step = (safe_max - safe_min) / HEATMAP_CLASS_COUNT as f64;
    let mut from = safe_min;
    (0..HEATMAP_CLASS_COUNT)
        .map(|index| {
            let last = index == HEATMAP_CLASS_COUNT - 1;
            let to = if last { safe_max } else { from + step };
            let class = DataClass {
                from,
                to,
                color: color(if last { top_color_index } else { index }),
            };
            from += step;
            class
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::colors::{ColorItem, Rgb};
    use crate::chart::predicates::HeaderPredicate;
    use crate::chart::series::Point;
    use crate::config::ColorMapping;
    use crate::execution::data_view::fixtures::measures_by_view;
    use crate::execution::definition::ExecutionDefinition;
    use pretty_assertions::assert_eq;

    fn series_of(values: &[Option<f64>], field_y: bool) -> Series {
        Series {
            data: values
                .iter()
                .map(|v| Point {
                    y: if field_y { *v } else { None },
                    value: if field_y { None } else { *v },
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn names(count: usize) -> Categories {
        Categories::Flat((0..count).map(|i| i.to_string()).collect())
    }

    fn heatmap_strategy() -> ColorStrategy {
        let dv = measures_by_view(&["m1"], None, &[&[Some(1.0)]], ExecutionDefinition::default());
        ColorStrategy::new(ChartType::Heatmap, None, &[], None, None, &dv)
    }

    #[test]
    fn test_pie_category_limit() {
        let series = vec![series_of(&[Some(1.0)], true)];
        assert!(!validate_data(ChartType::Pie, &series, &names(20)).data_too_large);
        assert!(validate_data(ChartType::Pie, &series, &names(21)).data_too_large);
        assert!(!validate_data(ChartType::Column, &series, &names(21)).data_too_large);
    }

    #[test]
    fn test_heatmap_point_limit() {
        let series = vec![series_of(&vec![Some(1.0); 10001], false)];
        assert!(validate_data(ChartType::Heatmap, &series, &names(1)).data_too_large);
        assert!(!validate_data(ChartType::Column, &series, &names(1)).data_too_large);
    }

    #[test]
    fn test_treemap_roots_do_not_count_as_points() {
        let mut series = series_of(&vec![Some(1.0); 2000], false);
        series.data.push(Point {
            id: Some("0".into()),
            ..Default::default()
        });
        let validation = validate_data(ChartType::Treemap, &[series], &names(1));
        assert!(!validation.data_too_large);
    }

    #[test]
    fn test_negative_values() {
        let series = vec![series_of(&[Some(1.0), Some(-2.0)], true)];
        assert!(validate_data(ChartType::Pie, &series, &names(2)).has_negative_value);
        assert!(!validate_data(ChartType::Column, &series, &names(2)).has_negative_value);
        let treemap = vec![series_of(&[Some(-1.0)], false)];
        assert!(validate_data(ChartType::Treemap, &treemap, &names(1)).has_negative_value);
    }

    #[test]
    fn test_heatmap_classes() {
        let strategy = heatmap_strategy();
        assert!(heatmap_data_classes(&[], &strategy).is_empty());

        let flat = heatmap_data_classes(&[series_of(&[Some(3.0), Some(3.0)], false)], &strategy);
        assert_eq!(flat.len(), 1);
        assert_eq!((flat[0].from, flat[0].to), (3.0, 3.0));
        assert_eq!(flat[0].color.as_deref(), strategy.color_by_index(1));

        let classes =
            heatmap_data_classes(&[series_of(&[Some(0.0), None, Some(70.0)], false)], &strategy);
        assert_eq!(classes.len(), HEATMAP_CLASS_COUNT);
        assert_eq!(classes[0].from, 0.0);
        assert_eq!(classes[0].to, 10.0);
        assert_eq!(classes[6].to, 70.0);
        assert_eq!(classes[5].color.as_deref(), strategy.color_by_index(5));
        assert_eq!(classes[6].color.as_deref(), strategy.color_by_index(7));
    }

    #[test]
    fn test_top_heatmap_class_is_mapped_base_color() {
        let dv = measures_by_view(&["m1"], None, &[&[Some(1.0)]], ExecutionDefinition::default());
        let header = dv.measure_headers()[0].clone();
        let mapping = vec![ColorMapping {
            predicate: HeaderPredicate::LocalIdentifier(header.local_identifier.clone()),
            color: ColorItem::Rgb(Rgb::new(255, 0, 0)),
        }];
        let strategy = ColorStrategy::new(ChartType::Heatmap, None, &mapping, None, None, &dv);
        assert_eq!(strategy.palette().last().map(String::as_str), Some("rgb(255,0,0)"));

        let values: Vec<Option<f64>> = (0..15).map(|v| Some(f64::from(v))).collect();
        let classes = heatmap_data_classes(&[series_of(&values, false)], &strategy);

        assert_eq!(classes[0].color.as_deref(), Some("rgb(255,255,255)"));
        assert_eq!(classes[6].color.as_deref(), Some("rgb(255,0,0)"));
    }
}
