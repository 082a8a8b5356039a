//! Series building
//!
//! Turns the raw two-dimensional data plus a color strategy into series. Chart
//! types fall into families with their own point shape:
//! - general (column, bar, line, area, pie, donut, funnel, plain treemap)
//! - heatmap grid
//! - scatter and bubble
//! - treemap stacked by an attribute
//!
//! Rows of the data are the outer (stack-by or measure) dimension, columns the
//! view-by items.

use super::color_strategy::ColorStrategy;
use super::colors::lighter_css;
use super::drill::DrillIntersectionElement;
use super::palettes::PALETTE_REGISTRY;
use super::{parse_value, ChartType};
use crate::execution::data_view::DataView;
use crate::execution::definition::{MEASURES, SECONDARY_MEASURES, TERTIARY_MEASURES};
use crate::execution::dimensions::LocatedAttribute;
use crate::execution::result::{DataValue, MeasureHeader};
use serde::Serialize;

/// Maximum lightening of the last leaf in a treemap group
pub const MAX_COLOR_BRIGHTNESS: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub enabled: bool,
}

/// One data point. Only the fields relevant to the chart family are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_legend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_padding: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored_in_drill_event_context: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drilldown: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drill_intersection: Option<Vec<DrillIntersectionElement>>,
}

impl Point {
    /// Treemap root node
    pub fn is_root(&self) -> bool {
        self.id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLabels {
    #[serde(rename = "formatGD")]
    pub format_gd: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_index: Option<usize>,
    pub data: Vec<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turbo_threshold: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<usize>,
    /// Sub-type of a combo series
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub series_type: Option<ChartType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_labels: Option<DataLabels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_legend: Option<bool>,
    pub is_drillable: bool,
}

/// Inputs shared by every series builder
#[derive(Debug, Clone, Copy)]
pub struct SeriesContext<'a> {
    pub dv: &'a DataView,
    pub chart_type: ChartType,
    pub view: Option<&'a LocatedAttribute>,
    pub stack: Option<&'a LocatedAttribute>,
    pub strategy: &'a ColorStrategy,
}

impl<'a> SeriesContext<'a> {
    fn measures(&self) -> &'a [MeasureHeader] {
        self.dv.measure_headers()
    }

    fn measure_name(&self, index: usize) -> String {
        self.measures()
            .get(index)
            .map(|m| m.name.clone())
            .unwrap_or_default()
    }

    fn measure_format(&self, index: usize) -> Option<String> {
        self.measures().get(index).map(|m| m.format.clone())
    }

    fn joined_measure_names(&self) -> String {
        self.measures()
            .iter()
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn stack_item_name(&self, index: usize) -> Option<String> {
        self.stack
            .and_then(|stack| stack.item(index))
            .map(|item| item.name.clone())
    }

    fn color(&self, index: usize) -> Option<String> {
        self.strategy.color_by_index(index).map(str::to_string)
    }

    fn alternating_without_view(&self) -> bool {
        self.chart_type.is_multi_measures_alternating() && self.view.is_none()
    }
}

/// Which measure buckets of a scatter/bubble chart are filled.
///
/// Without bucket metadata, measures fill the buckets positionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XyBuckets {
    pub primary_empty: bool,
    pub secondary_empty: bool,
    pub tertiary_empty: bool,
}

impl XyBuckets {
    pub fn from_data_view(dv: &DataView) -> XyBuckets {
        if dv.has_buckets() {
            XyBuckets {
                primary_empty: dv.is_bucket_empty(MEASURES),
                secondary_empty: dv.is_bucket_empty(SECONDARY_MEASURES),
                tertiary_empty: dv.is_bucket_empty(TERTIARY_MEASURES),
            }
        } else {
            let count = dv.measure_headers().len();
            XyBuckets {
                primary_empty: count < 1,
                secondary_empty: count < 2,
                tertiary_empty: count < 3,
            }
        }
    }

    fn empty_count(&self) -> usize {
        usize::from(self.primary_empty) + usize::from(self.secondary_empty)
    }
}

/// Build the series for a chart, dispatching on its family
pub fn get_series(ctx: &SeriesContext<'_>) -> Vec<Series> {
    let data = ctx.dv.two_dim_data();
    match ctx.chart_type {
        ChartType::Heatmap => heatmap_series(ctx, &data),
        ChartType::Scatter => scatter_series(ctx, &data),
        ChartType::Bubble => bubble_series(ctx, &data),
        ChartType::Treemap if ctx.stack.is_some() => treemap_stacked_series(ctx, &data),
        _ => general_series(ctx, &data),
    }
}

fn series_item_data(
    ctx: &SeriesContext<'_>,
    row: &[DataValue],
    series_index: usize,
) -> Vec<Point> {
    let alternating = ctx.chart_type.is_multi_measures_alternating();
    row.iter()
        .enumerate()
        .map(|(point_index, raw)| {
            let measure_index = if ctx.stack.is_some() {
                0
            } else if ctx.alternating_without_view() {
                point_index
            } else {
                series_index
            };
            let parsed = parse_value(raw.as_deref());

            let name = if ctx.stack.is_some() {
                ctx.stack_item_name(series_index)
            } else if alternating && ctx.view.is_some() {
                ctx.view
                    .and_then(|view| view.item(point_index))
                    .map(|item| item.name.clone())
            } else {
                Some(ctx.measure_name(measure_index))
            };

            let mut point = Point {
                name,
                format: ctx.measure_format(measure_index),
                marker: Some(Marker {
                    enabled: raw.is_some(),
                }),
                ..Default::default()
            };
            if ctx.chart_type == ChartType::Treemap {
                point.value = parsed;
            } else {
                point.y = parsed;
            }
            if alternating {
                point.color = ctx.color(point_index);
                point.legend_index = Some(point_index);
            }
            point
        })
        .collect()
}

fn general_series(ctx: &SeriesContext<'_>, data: &[Vec<DataValue>]) -> Vec<Series> {
    data.iter()
        .enumerate()
        .map(|(series_index, row)| {
            let name = if ctx.stack.is_some() {
                ctx.stack_item_name(series_index).unwrap_or_default()
            } else if ctx.alternating_without_view() {
                ctx.joined_measure_names()
            } else {
                ctx.measure_name(series_index)
            };
            Series {
                name,
                color: ctx.color(series_index),
                legend_index: Some(series_index),
                data: series_item_data(ctx, row, series_index),
                turbo_threshold: (ctx.chart_type == ChartType::Treemap).then_some(0),
                ..Default::default()
            }
        })
        .collect()
}

fn heatmap_series(ctx: &SeriesContext<'_>, data: &[Vec<DataValue>]) -> Vec<Series> {
    let mut points = Vec::new();
    for (row_index, row) in data.iter().enumerate() {
        for (column_index, raw) in row.iter().enumerate() {
            let cell = Point {
                x: Some(column_index as f64),
                y: Some(row_index as f64),
                value: parse_value(raw.as_deref()),
                ..Default::default()
            };
            if cell.value.is_some() {
                points.push(cell);
                continue;
            }
            // empty cell: gray border plus the null pattern on top
            points.push(Point {
                border_width: Some(1),
                border_color: Some(PALETTE_REGISTRY.null_cell().to_css()),
                color: Some(PALETTE_REGISTRY.transparent().to_string()),
                ..cell.clone()
            });
            points.push(Point {
                border_width: Some(0),
                point_padding: Some(2),
                color: Some(PALETTE_REGISTRY.null_pattern().to_string()),
                ignored_in_drill_event_context: Some(true),
                ..cell
            });
        }
    }

    vec![Series {
        name: ctx.measure_name(0),
        data: points,
        turbo_threshold: Some(0),
        y_axis: Some(0),
        data_labels: ctx
            .measure_format(0)
            .map(|format_gd| DataLabels { format_gd }),
        legend_index: Some(0),
        ..Default::default()
    }]
}

fn scatter_series(ctx: &SeriesContext<'_>, data: &[Vec<DataValue>]) -> Vec<Series> {
    let buckets = XyBuckets::from_data_view(ctx.dv);
    let points = data
        .iter()
        .enumerate()
        .map(|(row_index, row)| {
            let values: Vec<Option<f64>> =
                row.iter().map(|raw| parse_value(raw.as_deref())).collect();
            let value_at = |i: usize| values.get(i).copied().flatten();
            let x = if buckets.primary_empty { Some(0.0) } else { value_at(0) };
            let y = if buckets.secondary_empty {
                Some(0.0)
            } else if buckets.primary_empty {
                value_at(0)
            } else {
                value_at(1)
            };
            Point {
                x,
                y,
                name: Some(ctx.stack_item_name(row_index).unwrap_or_default()),
                ..Default::default()
            }
        })
        .collect();

    vec![Series {
        name: String::new(),
        color: ctx.color(0),
        legend_index: Some(0),
        turbo_threshold: Some(0),
        data: points,
        ..Default::default()
    }]
}

fn bubble_series(ctx: &SeriesContext<'_>, data: &[Vec<DataValue>]) -> Vec<Series> {
    let buckets = XyBuckets::from_data_view(ctx.dv);
    let empty_count = buckets.empty_count();
    let last_format = ctx.measures().last().map(|m| m.format.clone());

    data.iter()
        .enumerate()
        .map(|(row_index, row)| {
            let value_at = |i: Option<usize>| {
                i.and_then(|i| row.get(i))
                    .and_then(|raw| parse_value(raw.as_deref()))
            };
            // missing entries are not explicit nulls
            let has_nulls = (0..3).any(|i| matches!(row.get(i), Some(None)));
            let points = if has_nulls {
                Vec::new()
            } else {
                vec![Point {
                    x: if buckets.primary_empty { Some(0.0) } else { value_at(Some(0)) },
                    y: if buckets.secondary_empty {
                        Some(0.0)
                    } else {
                        value_at(1usize.checked_sub(empty_count))
                    },
                    z: value_at(2usize.checked_sub(empty_count)),
                    format: last_format.clone(),
                    ..Default::default()
                }]
            };
            Series {
                name: ctx.stack_item_name(row_index).unwrap_or_default(),
                color: ctx.color(row_index),
                legend_index: Some(row_index),
                data: points,
                ..Default::default()
            }
        })
        .collect()
}

/// Lighten each leaf of a group progressively, starting from `color`
fn gradient_group(leaves: Vec<Point>, color: Option<&str>) -> Vec<Point> {
    let step = MAX_COLOR_BRIGHTNESS / leaves.len().max(1) as f64;
    leaves
        .into_iter()
        .enumerate()
        .map(|(index, leaf)| Point {
            color: color.map(|c| lighter_css(c, step * index as f64)),
            ..leaf
        })
        .collect()
}

fn root_point(ctx: &SeriesContext<'_>, index: usize, name: String, format: Option<String>) -> Point {
    Point {
        id: Some(index.to_string()),
        name: Some(name),
        color: ctx.color(index),
        show_in_legend: Some(true),
        legend_index: Some(index),
        format,
        ..Default::default()
    }
}

/// Roots are consecutive runs of equal view items; the grouping follows row
/// order and assumes the backend returns each group contiguously.
fn treemap_data_with_view(ctx: &SeriesContext<'_>, data: &[Vec<DataValue>]) -> Vec<Point> {
    let (Some(view), Some(stack)) = (ctx.view, ctx.stack) else {
        return Vec::new();
    };
    let format = ctx.measure_format(0);
    let mut roots = Vec::new();
    let mut leaves = Vec::new();
    let mut group: Vec<Point> = Vec::new();
    let mut last_root = None;

    for (series_index, row) in data.iter().enumerate() {
        let Some(current) = view.item(series_index) else {
            continue;
        };
        if last_root != Some(current) {
            if !group.is_empty() {
                let color = ctx.strategy.color_by_index(roots.len() - 1);
                leaves.extend(gradient_group(std::mem::take(&mut group), color));
            }
            roots.push(root_point(ctx, roots.len(), current.name.clone(), format.clone()));
            last_root = Some(current);
        }
        group.push(Point {
            name: stack.item(series_index).map(|item| item.name.clone()),
            parent: Some((roots.len() - 1).to_string()),
            value: row.first().and_then(|raw| parse_value(raw.as_deref())),
            x: Some(series_index as f64),
            y: Some(series_index as f64),
            show_in_legend: Some(false),
            format: format.clone(),
            ..Default::default()
        });
    }
    if !group.is_empty() {
        let color = ctx.strategy.color_by_index(roots.len().saturating_sub(1));
        leaves.extend(gradient_group(group, color));
    }

    roots.extend(leaves);
    roots
}

/// One root per measure; leaves of each measure sorted by value, descending
fn treemap_data_with_measures(ctx: &SeriesContext<'_>, data: &[Vec<DataValue>]) -> Vec<Point> {
    let mut points: Vec<Point> = ctx
        .measures()
        .iter()
        .enumerate()
        .map(|(index, measure)| root_point(ctx, index, measure.name.clone(), Some(measure.format.clone())))
        .collect();

    for (series_index, row) in data.iter().enumerate() {
        let mut leaves: Vec<Point> = row
            .iter()
            .enumerate()
            .map(|(item_index, raw)| Point {
                name: ctx.stack_item_name(item_index),
                parent: Some(series_index.to_string()),
                format: ctx.measure_format(series_index),
                value: parse_value(raw.as_deref()),
                x: Some(series_index as f64),
                y: Some(item_index as f64),
                show_in_legend: Some(false),
                ..Default::default()
            })
            .collect();
        leaves.sort_by(|a, b| {
            let a = a.value.unwrap_or(0.0);
            let b = b.value.unwrap_or(0.0);
            b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
        });
        points.extend(gradient_group(leaves, ctx.strategy.color_by_index(series_index)));
    }
    points
}

fn treemap_stacked_series(ctx: &SeriesContext<'_>, data: &[Vec<DataValue>]) -> Vec<Series> {
    let points = if ctx.view.is_some() {
        treemap_data_with_view(ctx, data)
    } else {
        treemap_data_with_measures(ctx, data)
    };
    vec![Series {
        name: ctx.joined_measure_names(),
        legend_type: Some("point".to_string()),
        show_in_legend: Some(true),
        data: points,
        turbo_threshold: Some(0),
        ..Default::default()
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::data_view::fixtures::{measures_by_view, measures_in_row, stacked};
    use crate::execution::definition::{ExecutionDefinition, Measure, ObjQualifier};
    use crate::execution::dimensions::{
        find_attribute_in_dimension, STACK_BY_DIMENSION_INDEX, VIEW_BY_DIMENSION_INDEX,
    };
    use pretty_assertions::assert_eq;

    fn definition(ids: &[&str]) -> ExecutionDefinition {
        ExecutionDefinition::new(
            ids.iter()
                .map(|id| Measure::simple(*id, ObjQualifier::Uri(format!("/obj/{}", id))))
                .collect(),
        )
    }

    fn attribute(dv: &DataView, dimension: usize, index: Option<usize>) -> Option<LocatedAttribute> {
        find_attribute_in_dimension(dv.dimensions().get(dimension), dv.header_items(dimension), index)
    }

    fn build(
        dv: &DataView,
        chart_type: ChartType,
        view: Option<&LocatedAttribute>,
        stack: Option<&LocatedAttribute>,
    ) -> Vec<Series> {
        let strategy = ColorStrategy::new(chart_type, None, &[], view, stack, dv);
        get_series(&SeriesContext {
            dv,
            chart_type,
            view,
            stack,
            strategy: &strategy,
        })
    }

    #[test]
    fn test_column_series_per_measure() {
        let dv = measures_by_view(
            &["m1", "m2"],
            Some(&["East", "West"]),
            &[&[Some(1.0), None], &[Some(3.0), Some(4.0)]],
            definition(&["m1", "m2"]),
        );
        let view = attribute(&dv, VIEW_BY_DIMENSION_INDEX, None);
        let series = build(&dv, ChartType::Column, view.as_ref(), None);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "Measure m1");
        assert_eq!(series[1].legend_index, Some(1));
        assert_eq!(series[0].data[0].y, Some(1.0));
        assert_eq!(series[0].data[1].y, None);
        assert_eq!(series[0].data[1].marker, Some(Marker { enabled: false }));
        assert_eq!(series[1].data[0].name.as_deref(), Some("Measure m2"));
        assert_eq!(series[0].data[0].color, None);
    }

    #[test]
    fn test_stacked_column_names_series_by_stack_item() {
        let dv = stacked(
            &["A", "B"],
            &["East", "West"],
            &["m1"],
            &[&[Some(1.0), Some(2.0)], &[Some(3.0), Some(4.0)]],
            definition(&["m1"]),
        );
        let view = attribute(&dv, VIEW_BY_DIMENSION_INDEX, None);
        let stack = attribute(&dv, STACK_BY_DIMENSION_INDEX, None);
        let series = build(&dv, ChartType::Column, view.as_ref(), stack.as_ref());

        assert_eq!(series[1].name, "B");
        assert_eq!(series[1].data[0].name.as_deref(), Some("B"));
        assert_eq!(series[1].data[1].format.as_deref(), Some("#,##0.00"));
    }

    #[test]
    fn test_pie_without_view_joins_measure_names() {
        let dv = measures_in_row(&["m1", "m2"], &[Some(10.0), Some(20.0)], definition(&["m1", "m2"]));
        let series = build(&dv, ChartType::Pie, None, None);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "Measure m1, Measure m2");
        assert_eq!(series[0].data[1].name.as_deref(), Some("Measure m2"));
        assert_eq!(series[0].data[1].legend_index, Some(1));
        assert!(series[0].data[1].color.is_some());
    }

    #[test]
    fn test_treemap_uses_value_field() {
        let dv = measures_in_row(&["m1", "m2"], &[Some(10.0), Some(20.0)], definition(&["m1", "m2"]));
        let series = build(&dv, ChartType::Treemap, None, None);

        assert_eq!(series[0].data[0].value, Some(10.0));
        assert_eq!(series[0].data[0].y, None);
        assert_eq!(series[0].turbo_threshold, Some(0));
    }

    #[test]
    fn test_heatmap_null_cell_produces_two_points() {
        let dv = stacked(
            &["A"],
            &["East", "West"],
            &["m1"],
            &[&[Some(1.0), None]],
            definition(&["m1"]),
        );
        let series = build(&dv, ChartType::Heatmap, None, None);

        let data = &series[0].data;
        assert_eq!(data.len(), 3);
        assert_eq!(data[0].value, Some(1.0));
        assert_eq!(data[1].border_width, Some(1));
        assert_eq!(data[1].color.as_deref(), Some("rgba(0,0,0,0)"));
        assert_eq!(data[2].ignored_in_drill_event_context, Some(true));
        assert_eq!((data[2].x, data[2].y), (Some(1.0), Some(0.0)));
        assert_eq!(
            series[0].data_labels,
            Some(DataLabels {
                format_gd: "#,##0.00".into()
            })
        );
    }

    #[test]
    fn test_scatter_points_from_measure_pair() {
        let dv = stacked(
            &["A", "B"],
            &[],
            &["m1", "m2"],
            &[&[Some(1.0), Some(2.0)], &[Some(3.0), None]],
            definition(&["m1", "m2"]),
        );
        let stack = attribute(&dv, STACK_BY_DIMENSION_INDEX, None);
        let series = build(&dv, ChartType::Scatter, None, stack.as_ref());

        assert_eq!(series.len(), 1);
        let data = &series[0].data;
        assert_eq!((data[0].x, data[0].y), (Some(1.0), Some(2.0)));
        assert_eq!(data[0].name.as_deref(), Some("A"));
        assert_eq!((data[1].x, data[1].y), (Some(3.0), None));
    }

    #[test]
    fn test_bubble_skips_rows_with_explicit_nulls() {
        let dv = stacked(
            &["A", "B"],
            &[],
            &["m1", "m2", "m3"],
            &[&[Some(1.0), Some(2.0), Some(3.0)], &[Some(1.0), None, Some(3.0)]],
            definition(&["m1", "m2", "m3"]),
        );
        let stack = attribute(&dv, STACK_BY_DIMENSION_INDEX, None);
        let series = build(&dv, ChartType::Bubble, None, stack.as_ref());

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "A");
        assert_eq!(
            (series[0].data[0].x, series[0].data[0].y, series[0].data[0].z),
            (Some(1.0), Some(2.0), Some(3.0))
        );
        assert!(series[1].data.is_empty());
    }

    #[test]
    fn test_treemap_with_view_groups_consecutive_roots() {
        // rows: (East, A), (East, B), (West, A)
        let dv = stacked(
            &["East", "East", "West"],
            &[],
            &["m1"],
            &[&[Some(1.0)], &[Some(2.0)], &[Some(3.0)]],
            definition(&["m1"]),
        );
        let mut view = attribute(&dv, STACK_BY_DIMENSION_INDEX, None).unwrap();
        view.items[1].uri = view.items[0].uri.clone();
        let mut stack = view.clone();
        stack.items[0].name = "A".into();
        stack.items[1].name = "B".into();
        stack.items[2].name = "A".into();

        let series = build(&dv, ChartType::Treemap, Some(&view), Some(&stack));
        let data = &series[0].data;

        assert_eq!(data.len(), 5);
        assert_eq!(data[0].id.as_deref(), Some("0"));
        assert_eq!(data[1].id.as_deref(), Some("1"));
        assert_eq!(data[1].name.as_deref(), Some("West"));
        assert_eq!(data[2].parent.as_deref(), Some("0"));
        assert_eq!(data[4].parent.as_deref(), Some("1"));
        assert_eq!(data[2].color, data[0].color);
        assert_eq!(
            data[3].color,
            data[0].color.as_deref().map(|c| lighter_css(c, 0.4))
        );
        assert_eq!(series[0].legend_type.as_deref(), Some("point"));
    }

    #[test]
    fn test_treemap_with_measures_sorts_leaves() {
        let dv = measures_by_view(
            &["m1"],
            Some(&["A", "B", "C"]),
            &[&[Some(1.0), Some(5.0), None]],
            definition(&["m1"]),
        );
        let stack = attribute(&dv, VIEW_BY_DIMENSION_INDEX, None);
        let series = build(&dv, ChartType::Treemap, None, stack.as_ref());
        let data = &series[0].data;

        assert_eq!(data[0].id.as_deref(), Some("0"));
        let leaf_values: Vec<_> = data[1..].iter().map(|p| p.value).collect();
        assert_eq!(leaf_values, vec![Some(5.0), Some(1.0), None]);
        assert_eq!(data[1].name.as_deref(), Some("B"));
        assert_eq!(data[1].y, Some(1.0));
    }
}
