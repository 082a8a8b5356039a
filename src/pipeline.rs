//! Chart options pipeline
//!
//! Derives the renderer-ready options of one chart from a merged data view,
//! the chart configuration and the drillable predicates:
//! 1. Locates the view-by, stack-by and parent attributes
//! 2. Builds the color strategy, axes and series
//! 3. Resolves drillability, axis assignment and categories
//! 4. Adds the chart-family specific parts (combo, scatter, bubble, heatmap)
//! 5. Validates the data size

use crate::chart::axes::{assign_y_axes, get_x_axes, get_y_axes, Axis};
use crate::chart::categories::{
    get_categories, get_categories_for_two_attributes, sort_by_measure, Categories,
};
use crate::chart::color_strategy::{ColorAssignment, ColorStrategy};
use crate::chart::colors::PaletteItem;
use crate::chart::drill::{get_drillable_series, DrillContext};
use crate::chart::palettes::palette_or_default;
use crate::chart::predicates::HeaderPredicate;
use crate::chart::series::{get_series, Series, SeriesContext, XyBuckets};
use crate::chart::tooltip::{TooltipAttribute, TooltipFactory, TooltipMeasure};
use crate::chart::validation::{heatmap_data_classes, validate_data, DataClass, ValidationResult};
use crate::chart::{combo, stacking_config, ChartType, Stacking};
use crate::config::{ChartConfig, Separators};
use crate::error::Result;
use crate::execution::data_view::DataView;
use crate::execution::definition::{SEGMENT, VIEW};
use crate::execution::dimensions::{
    find_attribute_in_dimension, LocatedAttribute, PARENT_ATTRIBUTE_INDEX,
    PRIMARY_ATTRIBUTE_INDEX, STACK_BY_DIMENSION_INDEX, VIEW_BY_DIMENSION_INDEX,
};
use crate::execution::result::MeasureHeader;
use serde::Serialize;

type AxisProps = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub series: Vec<Series>,
    pub categories: Categories,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actions {
    pub tooltip: TooltipFactory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub enabled: bool,
}

/// Heatmap axis titles and value format
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapTitle {
    pub x: String,
    pub y: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorAxis {
    pub data_classes: Vec<DataClass>,
}

/// Renderer-ready chart description
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub stacking: Option<Stacking>,
    pub has_stack_by_attribute: bool,
    pub has_view_by_attribute: bool,
    pub is_view_by_two_attributes: bool,
    pub legend_layout: String,
    pub x_axes: Vec<Axis>,
    pub y_axes: Vec<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_props: Option<AxisProps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_props: Option<AxisProps>,
    #[serde(rename = "secondary_xAxisProps", skip_serializing_if = "Option::is_none")]
    pub secondary_x_axis_props: Option<AxisProps>,
    #[serde(rename = "secondary_yAxisProps", skip_serializing_if = "Option::is_none")]
    pub secondary_y_axis_props: Option<AxisProps>,
    pub data: ChartData,
    pub actions: Actions,
    pub grid: Grid,
    pub separators: Separators,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dual_axis: Option<bool>,
    pub color_assignments: Vec<ColorAssignment>,
    pub color_palette: Vec<PaletteItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<HeatmapTitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_axis: Option<ColorAxis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mvf: Option<serde_json::Value>,
    pub validation: ValidationResult,
}

/// View-by, stack-by and parent attributes of a chart
#[derive(Debug, Clone, Default)]
pub struct LocatedAttributes {
    pub view: Option<LocatedAttribute>,
    pub stack: Option<LocatedAttribute>,
    pub view_parent: Option<LocatedAttribute>,
}

fn attribute_in(dv: &DataView, dimension: usize, index: Option<usize>) -> Option<LocatedAttribute> {
    find_attribute_in_dimension(
        dv.dimensions().get(dimension),
        dv.header_items(dimension),
        index,
    )
}

/// Treemaps place their attributes by bucket: segment alone stacks, view and
/// segment together share the outer dimension.
fn locate_treemap_attributes(dv: &DataView) -> (Option<LocatedAttribute>, Option<LocatedAttribute>) {
    if !dv.has_buckets() {
        let view = attribute_in(dv, STACK_BY_DIMENSION_INDEX, None)
            .or_else(|| attribute_in(dv, VIEW_BY_DIMENSION_INDEX, None));
        let stack = attribute_in(dv, STACK_BY_DIMENSION_INDEX, Some(1));
        return (view, stack);
    }

    let view_empty = dv.is_bucket_empty(VIEW);
    let segment_empty = dv.is_bucket_empty(SEGMENT);
    match (view_empty, segment_empty) {
        (true, true) => (None, None),
        (false, true) => (attribute_in(dv, VIEW_BY_DIMENSION_INDEX, None), None),
        (true, false) => (None, attribute_in(dv, VIEW_BY_DIMENSION_INDEX, None)),
        (false, false) => (
            attribute_in(dv, STACK_BY_DIMENSION_INDEX, None),
            attribute_in(dv, STACK_BY_DIMENSION_INDEX, Some(1)),
        ),
    }
}

pub fn locate_attributes(dv: &DataView, chart_type: ChartType) -> LocatedAttributes {
    let two_attributes = dv.attribute_count(VIEW_BY_DIMENSION_INDEX) == 2;
    let (view, stack) = if chart_type == ChartType::Treemap {
        locate_treemap_attributes(dv)
    } else {
        (
            attribute_in(
                dv,
                VIEW_BY_DIMENSION_INDEX,
                two_attributes.then_some(PRIMARY_ATTRIBUTE_INDEX),
            ),
            attribute_in(dv, STACK_BY_DIMENSION_INDEX, None),
        )
    };
    let view_parent = if two_attributes {
        attribute_in(dv, VIEW_BY_DIMENSION_INDEX, Some(PARENT_ATTRIBUTE_INDEX))
    } else {
        None
    };
    LocatedAttributes {
        view,
        stack,
        view_parent,
    }
}

fn form_of_name(attribute: Option<&LocatedAttribute>) -> Option<String> {
    attribute.map(|a| a.header.form_of.name.clone())
}

fn tooltip_measure(measure: Option<&MeasureHeader>) -> Option<TooltipMeasure> {
    measure.map(|m| TooltipMeasure {
        name: m.name.clone(),
        format: m.format.clone(),
    })
}

/// Scatter shows x and y; with an empty primary bucket the only measure is y
fn scatter_measures(dv: &DataView) -> [Option<TooltipMeasure>; 3] {
    let measures = dv.measure_headers();
    if XyBuckets::from_data_view(dv).primary_empty {
        [None, tooltip_measure(measures.first()), None]
    } else {
        [tooltip_measure(measures.first()), tooltip_measure(measures.get(1)), None]
    }
}

/// Bubble measures fill the x, y and size slots of non-empty buckets in order
fn bubble_measures(dv: &DataView) -> [Option<TooltipMeasure>; 3] {
    let buckets = XyBuckets::from_data_view(dv);
    let mut measures = dv.measure_headers().iter();
    [buckets.primary_empty, buckets.secondary_empty, buckets.tertiary_empty]
        .map(|empty| if empty { None } else { tooltip_measure(measures.next()) })
}

/// Derive the chart options of one chart.
///
/// # Arguments
/// * `dv` - Merged execution result and its definition
/// * `config` - Chart configuration; `type` selects the chart
/// * `drillable_items` - Predicates marking drillable headers
///
/// # Errors
/// `UnsupportedChartType` when the configured type is missing or unknown.
pub fn get_chart_options(
    dv: &DataView,
    config: &ChartConfig,
    drillable_items: &[HeaderPredicate],
) -> Result<ChartOptions> {
    let chart_type: ChartType = config.chart_type.as_deref().unwrap_or_default().parse()?;
    tracing::debug!("Building {} chart options", chart_type);

    let located = locate_attributes(dv, chart_type);
    let view = located.view.as_ref();
    let stack = located.stack.as_ref();
    let view_parent = located.view_parent.as_ref();
    let two_attributes = dv.attribute_count(VIEW_BY_DIMENSION_INDEX) == 2;

    let strategy = ColorStrategy::new(
        chart_type,
        config.color_palette.as_deref(),
        &config.color_mapping,
        view,
        stack,
        dv,
    );
    let grid_enabled = config.grid_enabled();
    let default_stacking = stacking_config(chart_type, config, stack.is_some());

    let secondary_measures = if chart_type == ChartType::Combo {
        combo::secondary_axis_measures(config, dv)
    } else {
        config.secondary_axis_measures(chart_type == ChartType::Bar).to_vec()
    };
    let x_axes = get_x_axes(chart_type, dv, config, view);
    let y_axes = get_y_axes(chart_type, dv, config, stack, &secondary_measures);

    let series = get_series(&SeriesContext {
        dv,
        chart_type,
        view,
        stack,
        strategy: &strategy,
    });
    let drill = DrillContext {
        dv,
        predicates: drillable_items,
        chart_type,
        view,
        view_parent,
        stack,
    };
    let mut series = get_drillable_series(&drill, series);
    assign_y_axes(&mut series, &y_axes);

    let mut categories = match (two_attributes, view, view_parent) {
        (true, Some(view), Some(parent)) => get_categories_for_two_attributes(view, parent),
        _ => get_categories(chart_type, dv, view, stack),
    };
    if chart_type.is_sorted_by_measure() {
        categories = sort_by_measure(&mut series, categories);
    }

    let dual_axis = y_axes.len() == 2;
    let separators = config.separators.clone();
    let stack_measures_to_percent = config.stack_measures_to_percent();

    let mut stacking = default_stacking;
    let mut title = None;
    let mut color_axis = None;
    let mut grid = grid_enabled;
    let mut legend_layout = config.legend_layout().to_string();
    let mut has_view_by_attribute = view.is_some();
    let tooltip = match chart_type {
        ChartType::Combo => {
            combo::set_series_types(&mut series, config, dv);
            let can_stack_in_percent = combo::can_stack_in_percent(&series);
            stacking = combo::stacking_config(config, &series, default_stacking);
            TooltipFactory::Default {
                view: form_of_name(view),
                multi_measures_alternating: false,
                stack_measures_to_percent: stack_measures_to_percent && can_stack_in_percent,
                dual_axis,
                separators: separators.clone(),
            }
        }
        ChartType::Scatter => {
            legend_layout = "horizontal".to_string();
            TooltipFactory::Xy {
                measures: scatter_measures(dv),
                stack: form_of_name(stack),
                separators: separators.clone(),
            }
        }
        ChartType::Bubble => {
            categories = Categories::Flat(vec![String::new()]);
            has_view_by_attribute = stack.is_some();
            TooltipFactory::Xy {
                measures: bubble_measures(dv),
                stack: form_of_name(stack),
                separators: separators.clone(),
            }
        }
        ChartType::Heatmap => {
            stacking = None;
            grid = false;
            title = Some(HeatmapTitle {
                x: view.map(|v| v.header.name.clone()).unwrap_or_default(),
                y: stack.map(|s| s.header.name.clone()).unwrap_or_default(),
                format: dv
                    .measure_header(0)
                    .map(|m| m.format.clone())
                    .unwrap_or_default(),
            });
            color_axis = Some(ColorAxis {
                data_classes: heatmap_data_classes(&series, &strategy),
            });
            TooltipFactory::Heatmap {
                view: view.map(TooltipAttribute::from_located),
                stack: stack.map(TooltipAttribute::from_located),
                separators: separators.clone(),
            }
        }
        ChartType::Treemap => TooltipFactory::Treemap {
            view: view.map(TooltipAttribute::from_located),
            stack: stack.map(TooltipAttribute::from_located),
            separators: separators.clone(),
        },
        _ if two_attributes => TooltipFactory::TwoAttributes {
            view: form_of_name(view),
            view_parent: form_of_name(view_parent),
            stack_measures_to_percent,
            dual_axis,
            separators: separators.clone(),
        },
        _ => TooltipFactory::Default {
            view: form_of_name(view),
            multi_measures_alternating: chart_type.is_multi_measures_alternating(),
            stack_measures_to_percent,
            dual_axis,
            separators: separators.clone(),
        },
    };

    let validation = validate_data(chart_type, &series, &categories);
    tracing::debug!(
        "Built {} series and {} categories for {} chart",
        series.len(),
        categories.count(),
        chart_type
    );

    let axis_props = |axis: &Option<crate::config::AxisConfig>| axis.as_ref().map(|a| a.props.clone());

    Ok(ChartOptions {
        chart_type,
        stacking,
        has_stack_by_attribute: stack.is_some(),
        has_view_by_attribute,
        is_view_by_two_attributes: two_attributes,
        legend_layout,
        x_axes,
        y_axes,
        x_axis_props: axis_props(&config.xaxis),
        y_axis_props: axis_props(&config.yaxis),
        secondary_x_axis_props: axis_props(&config.secondary_xaxis),
        secondary_y_axis_props: axis_props(&config.secondary_yaxis),
        data: ChartData { series, categories },
        actions: Actions { tooltip },
        grid: Grid { enabled: grid },
        separators,
        dual_axis: config.dual_axis,
        color_assignments: strategy.color_assignment(),
        color_palette: palette_or_default(config.color_palette.as_deref()).to_vec(),
        title,
        color_axis,
        mvf: config.mvf.clone(),
        validation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChartError;
    use crate::execution::data_view::fixtures::{measures_by_view, stacked};
    use crate::execution::definition::{Bucket, ExecutionDefinition, MEASURES, SECONDARY_MEASURES};
    use crate::logging::init_for_tests;
    use pretty_assertions::assert_eq;

    fn region_view() -> DataView {
        measures_by_view(
            &["m1", "m2"],
            Some(&["East", "West"][..]),
            &[&[Some(1.0), Some(2.0)], &[Some(3.0), Some(4.0)]],
            ExecutionDefinition::default(),
        )
    }

    #[test]
    fn test_unsupported_type_fails_before_building() {
        let err = get_chart_options(&region_view(), &ChartConfig::new("radar"), &[]).unwrap_err();
        assert!(matches!(err, ChartError::UnsupportedChartType(t) if t == "radar"));

        let err = get_chart_options(&region_view(), &ChartConfig::default(), &[]).unwrap_err();
        assert!(matches!(err, ChartError::UnsupportedChartType(_)));
    }

    #[test]
    fn test_column_chart_options() {
        init_for_tests();
        let options = get_chart_options(&region_view(), &ChartConfig::new("column"), &[]).unwrap();

        assert_eq!(options.chart_type, ChartType::Column);
        assert_eq!(options.stacking, None);
        assert!(options.has_view_by_attribute);
        assert!(!options.has_stack_by_attribute);
        assert_eq!(options.data.series.len(), 2);
        assert_eq!(
            options.data.categories,
            Categories::Flat(vec!["East".into(), "West".into()])
        );
        assert_eq!(options.x_axes[0].label.as_deref(), Some("Region Attribute"));
        assert_eq!(options.legend_layout, "horizontal");
        assert!(options.grid.enabled);
        assert_eq!(options.color_assignments.len(), 2);
        assert_eq!(options.color_palette.len(), 20);
        assert!(matches!(options.actions.tooltip, TooltipFactory::Default { .. }));
        assert!(options.data.series.iter().all(|s| s.y_axis == Some(0)));
    }

    #[test]
    fn test_stack_attribute_enables_stacking() {
        let dv = stacked(
            &["A", "B"],
            &["East"],
            &["m1"],
            &[&[Some(1.0)], &[Some(2.0)]],
            ExecutionDefinition::default(),
        );
        let options = get_chart_options(&dv, &ChartConfig::new("bar"), &[]).unwrap();
        assert_eq!(options.stacking, Some(Stacking::Normal));
        assert!(options.has_stack_by_attribute);

        let line = get_chart_options(&dv, &ChartConfig::new("line"), &[]).unwrap();
        assert_eq!(line.stacking, None);
    }

    #[test]
    fn test_heatmap_options() {
        let dv = stacked(
            &["A", "B"],
            &["East", "West"],
            &["m1"],
            &[&[Some(0.0), Some(7.0)], &[Some(14.0), None]],
            ExecutionDefinition::default(),
        );
        let mut config = ChartConfig::new("heatmap");
        config.stack_measures = Some(true);
        let options = get_chart_options(&dv, &config, &[]).unwrap();

        assert_eq!(options.stacking, None);
        assert!(!options.grid.enabled);
        assert_eq!(
            options.title,
            Some(HeatmapTitle {
                x: "Region".into(),
                y: "Segment".into(),
                format: "#,##0.00".into(),
            })
        );
        let classes = &options.color_axis.as_ref().unwrap().data_classes;
        assert_eq!(classes.len(), 7);
        assert_eq!(classes[6].to, 14.0);
        assert_eq!(options.y_axes[0].label.as_deref(), Some("Segment Attribute"));
    }

    #[test]
    fn test_scatter_options() {
        let definition = ExecutionDefinition::default().with_buckets(vec![
            Bucket::new(MEASURES, &["m1"]),
            Bucket::new(SECONDARY_MEASURES, &["m2"]),
        ]);
        let dv = stacked(
            &["A", "B"],
            &[],
            &["m1", "m2"],
            &[&[Some(1.0), Some(2.0)], &[Some(3.0), Some(4.0)]],
            definition,
        );
        let mut config = ChartConfig::new("scatter");
        config.legend_layout = Some("vertical".into());
        let options = get_chart_options(&dv, &config, &[]).unwrap();

        assert_eq!(options.legend_layout, "horizontal");
        assert_eq!(
            options.data.categories,
            Categories::Flat(vec!["A".into(), "B".into()])
        );
        match &options.actions.tooltip {
            TooltipFactory::Xy { measures, stack, .. } => {
                assert_eq!(measures[0].as_ref().unwrap().name, "Measure m1");
                assert_eq!(measures[1].as_ref().unwrap().name, "Measure m2");
                assert!(measures[2].is_none());
                assert_eq!(stack.as_deref(), Some("Segment Attribute"));
            }
            other => panic!("unexpected tooltip {:?}", other),
        }
    }

    #[test]
    fn test_pie_options_are_sorted_and_validated() {
        let dv = measures_by_view(
            &["m1"],
            Some(&["A", "B", "C"][..]),
            &[&[Some(10.0), Some(50.0), Some(-20.0)]],
            ExecutionDefinition::default(),
        );
        let options = get_chart_options(&dv, &ChartConfig::new("pie"), &[]).unwrap();
        assert_eq!(
            options.data.categories,
            Categories::Flat(vec!["B".into(), "A".into(), "C".into()])
        );
        assert!(options.validation.has_negative_value);
        assert!(!options.validation.data_too_large);
    }

    #[test]
    fn test_options_serialize_camel_case() {
        let mut config = ChartConfig::new("column");
        config.mvf = Some(serde_json::json!({"min": 0}));
        let options = get_chart_options(&region_view(), &config, &[]).unwrap();
        let json = serde_json::to_value(&options).unwrap();

        assert_eq!(json["type"], "column");
        assert_eq!(json["stacking"], serde_json::Value::Null);
        assert_eq!(json["hasViewByAttribute"], true);
        assert_eq!(json["actions"]["tooltip"]["kind"], "default");
        assert_eq!(json["data"]["categories"][1], "West");
        assert_eq!(json["mvf"]["min"], 0);
        assert!(json.get("colorAxis").is_none());
    }
}
