//! Tooltip factories
//!
//! A factory is chosen per chart shape when the options are built and is
//! invoked later for each hovered point. Every factory renders label/value
//! rows into the same markup, capped at the available width.

use super::number_format::{format_percent, format_value, DEFAULT_FORMAT};
use super::series::{Point, Series};
use crate::config::Separators;
use crate::execution::dimensions::LocatedAttribute;
use serde::Serialize;

/// Horizontal padding inside the tooltip box, per side
pub const TOOLTIP_PADDING: u32 = 10;

/// Attribute as shown in tooltips: its display title and item names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TooltipAttribute {
    pub title: String,
    pub items: Vec<String>,
}

impl TooltipAttribute {
    /// Tooltips use the attribute name, not the display form name
    pub fn from_located(attribute: &LocatedAttribute) -> Self {
        TooltipAttribute {
            title: attribute.header.form_of.name.clone(),
            items: attribute.item_names(),
        }
    }

    fn item(&self, index: Option<f64>) -> &str {
        index
            .and_then(|i| self.items.get(i as usize))
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TooltipMeasure {
    pub name: String,
    pub format: String,
}

/// Point being hovered, with the context the renderer knows about it
#[derive(Debug, Clone, Copy)]
pub struct TooltipPoint<'a> {
    pub point: &'a Point,
    pub series: &'a Series,
    pub category: Option<&'a str>,
    pub parent_category: Option<&'a str>,
    /// Point sits on the right-hand (opposite) y axis
    pub on_opposite_axis: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TooltipFactory {
    /// Single view-by attribute, or measures only
    #[serde(rename_all = "camelCase")]
    Default {
        view: Option<String>,
        multi_measures_alternating: bool,
        stack_measures_to_percent: bool,
        dual_axis: bool,
        separators: Separators,
    },
    /// View by a parent and a child attribute
    #[serde(rename_all = "camelCase")]
    TwoAttributes {
        view: Option<String>,
        view_parent: Option<String>,
        stack_measures_to_percent: bool,
        dual_axis: bool,
        separators: Separators,
    },
    /// Scatter and bubble: x, y and z measures (any may be absent)
    Xy {
        measures: [Option<TooltipMeasure>; 3],
        stack: Option<String>,
        separators: Separators,
    },
    Heatmap {
        view: Option<TooltipAttribute>,
        stack: Option<TooltipAttribute>,
        separators: Separators,
    },
    Treemap {
        view: Option<TooltipAttribute>,
        stack: Option<TooltipAttribute>,
        separators: Separators,
    },
}

/// Normalize entities, then escape: `&amp;` stays `&amp;`, `&` becomes `&amp;`
pub fn custom_escape(text: &str) -> String {
    let unescaped = html_escape::decode_html_entities(text);
    html_escape::encode_quoted_attribute(&unescaped).into_owned()
}

/// Rows of `[title, value]` as tooltip markup
pub fn render_tooltip_html(rows: &[[String; 2]], max_width: u32) -> String {
    let max_item_width = max_width.saturating_sub(TOOLTIP_PADDING * 2);
    let style = format!("style=\"max-width: {}px;\"", max_item_width);
    rows.iter()
        .map(|[title, value]| {
            format!(
                "<div class=\"gd-viz-tooltip-item multiline-supported\">\
<span class=\"gd-viz-tooltip-title\" {style}>{title}</span>\
<div class=\"gd-viz-tooltip-value-wraper\" {style}>\
<span class=\"gd-viz-tooltip-value clamp-two-line\" {style}>{value}</span>\
</div>\
<div class=\"gd-viz-tooltip-value-wraper\" {style}>\
<span class=\"gd-viz-tooltip-value-max-content\" {style}>{value}</span>\
</div>\
</div>"
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_for_tooltip(value: Option<f64>, format: Option<&str>, separators: &Separators) -> String {
    custom_escape(&format_value(
        value,
        format.unwrap_or(DEFAULT_FORMAT),
        separators,
    ))
}

/// Percentage when stacking to 100% (except on the opposite axis of a
/// dual-axis chart), the point's formatted `y` otherwise
fn value_for_tooltip(
    tp: &TooltipPoint<'_>,
    stack_measures_to_percent: bool,
    dual_axis: bool,
    percentage: Option<f64>,
    separators: &Separators,
) -> String {
    let on_right_axis = dual_axis && tp.on_opposite_axis;
    match percentage {
        Some(percentage) if stack_measures_to_percent && !on_right_axis => {
            format_percent(percentage, separators)
        }
        _ => format_for_tooltip(tp.point.y, tp.point.format.as_deref(), separators),
    }
}

fn row(title: &str, value: String) -> [String; 2] {
    [custom_escape(title), value]
}

impl TooltipFactory {
    /// Tooltip markup for a point.
    ///
    /// # Arguments
    /// * `tp` - Hovered point and its series/category context
    /// * `max_width` - Available tooltip width in pixels
    /// * `percentage` - Share of the stack, when the renderer computed one
    ///
    /// Returns `None` where no tooltip is shown (treemap root nodes).
    pub fn build(&self, tp: &TooltipPoint<'_>, max_width: u32, percentage: Option<f64>) -> Option<String> {
        let rows = match self {
            TooltipFactory::Default {
                view,
                multi_measures_alternating,
                stack_measures_to_percent,
                dual_axis,
                separators,
            } => {
                let value =
                    value_for_tooltip(tp, *stack_measures_to_percent, *dual_axis, percentage, separators);
                let point_name = tp.point.name.as_deref().unwrap_or_default();
                match view {
                    Some(view) => vec![
                        row(view, custom_escape(tp.category.unwrap_or(point_name))),
                        row(&tp.series.name, value),
                    ],
                    None if *multi_measures_alternating => vec![row(point_name, value)],
                    None => vec![row(&tp.series.name, value)],
                }
            }
            TooltipFactory::TwoAttributes {
                view,
                view_parent,
                stack_measures_to_percent,
                dual_axis,
                separators,
            } => {
                let value =
                    value_for_tooltip(tp, *stack_measures_to_percent, *dual_axis, percentage, separators);
                let mut rows = Vec::new();
                if let Some(category) = tp.category {
                    if let (Some(parent), Some(parent_category)) = (view_parent, tp.parent_category) {
                        rows.push(row(parent, custom_escape(parent_category)));
                    }
                    if let Some(view) = view {
                        rows.push(row(view, custom_escape(category)));
                    }
                }
                rows.push(row(&tp.series.name, value));
                rows
            }
            TooltipFactory::Xy {
                measures,
                stack,
                separators,
            } => {
                let mut rows = Vec::new();
                if let Some(stack) = stack {
                    let name = tp
                        .point
                        .name
                        .as_deref()
                        .filter(|name| !name.is_empty())
                        .unwrap_or(&tp.series.name);
                    rows.push(row(stack, custom_escape(name)));
                }
                let coordinates = [tp.point.x, tp.point.y, tp.point.z];
                for (measure, value) in measures.iter().zip(coordinates) {
                    if let Some(measure) = measure {
                        rows.push(row(
                            &measure.name,
                            format_for_tooltip(value, Some(&measure.format), separators),
                        ));
                    }
                }
                rows
            }
            TooltipFactory::Heatmap {
                view,
                stack,
                separators,
            } => {
                let format = tp.series.data_labels.as_ref().map(|labels| labels.format_gd.as_str());
                let mut rows = Vec::new();
                if let Some(stack) = stack {
                    rows.push(row(&stack.title, custom_escape(stack.item(tp.point.y))));
                }
                if let Some(view) = view {
                    rows.push(row(&view.title, custom_escape(view.item(tp.point.x))));
                }
                rows.push(row(&tp.series.name, format_for_tooltip(tp.point.value, format, separators)));
                rows
            }
            TooltipFactory::Treemap {
                view,
                stack,
                separators,
            } => {
                if tp.point.is_root() {
                    return None;
                }
                let value = format_for_tooltip(tp.point.value, tp.point.format.as_deref(), separators);
                let mut rows = Vec::new();
                if let Some(view) = view {
                    rows.push(row(&view.title, custom_escape(view.item(tp.point.x))));
                }
                if let Some(stack) = stack {
                    rows.push(row(&stack.title, custom_escape(stack.item(tp.point.y))));
                }
                match view {
                    Some(_) => rows.push(row(&tp.series.name, value)),
                    None => rows.push(row(tp.category.unwrap_or_default(), value)),
                }
                rows
            }
        };
        Some(render_tooltip_html(&rows, max_width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn titles_and_values(html: &str) -> Vec<(String, String)> {
        let titles = html
            .split("gd-viz-tooltip-title\" style=\"max-width: 180px;\">")
            .skip(1)
            .map(|s| s.split("</span>").next().unwrap_or_default().to_string());
        let values = html
            .split("clamp-two-line\" style=\"max-width: 180px;\">")
            .skip(1)
            .map(|s| s.split("</span>").next().unwrap_or_default().to_string());
        titles.zip(values).collect()
    }

    fn point(y: f64) -> Point {
        Point {
            y: Some(y),
            name: Some("East".into()),
            format: Some("#,##0.00".into()),
            ..Default::default()
        }
    }

    fn series(name: &str) -> Series {
        Series {
            name: name.into(),
            ..Default::default()
        }
    }

    fn default_factory(view: Option<&str>, percent: bool, dual_axis: bool) -> TooltipFactory {
        TooltipFactory::Default {
            view: view.map(str::to_string),
            multi_measures_alternating: false,
            stack_measures_to_percent: percent,
            dual_axis,
            separators: Separators::default(),
        }
    }

    #[test]
    fn test_custom_escape_does_not_double_escape() {
        assert_eq!(custom_escape("A & B <c>"), "A &amp; B &lt;c&gt;");
        assert_eq!(custom_escape("A &amp; B"), "A &amp; B");
    }

    #[test]
    fn test_render_markup() {
        let html = render_tooltip_html(&[["Region".into(), "East".into()]], 200);
        assert!(html.starts_with("<div class=\"gd-viz-tooltip-item multiline-supported\">"));
        assert!(html.contains("<span class=\"gd-viz-tooltip-title\" style=\"max-width: 180px;\">Region</span>"));
        assert!(html.contains("gd-viz-tooltip-value-max-content"));
        let two = render_tooltip_html(&[["a".into(), "1".into()], ["b".into(), "2".into()]], 200);
        assert_eq!(two.matches('\n').count(), 1);
    }

    #[test]
    fn test_default_factory_with_view() {
        let p = point(1234.5);
        let s = series("Revenue");
        let tp = TooltipPoint {
            point: &p,
            series: &s,
            category: Some("East & West"),
            parent_category: None,
            on_opposite_axis: false,
        };
        let html = default_factory(Some("Region"), false, false).build(&tp, 200, None).unwrap();
        assert_eq!(
            titles_and_values(&html),
            vec![
                ("Region".to_string(), "East &amp; West".to_string()),
                ("Revenue".to_string(), "1,234.50".to_string()),
            ]
        );
    }

    #[test]
    fn test_percent_only_off_the_opposite_axis() {
        let p = point(10.0);
        let s = series("Revenue");
        let mut tp = TooltipPoint {
            point: &p,
            series: &s,
            category: None,
            parent_category: None,
            on_opposite_axis: false,
        };
        let factory = default_factory(None, true, true);
        let html = factory.build(&tp, 200, Some(33.333)).unwrap();
        assert_eq!(titles_and_values(&html)[0].1, "33.33%");

        tp.on_opposite_axis = true;
        let html = factory.build(&tp, 200, Some(33.333)).unwrap();
        assert_eq!(titles_and_values(&html)[0].1, "10.00");

        let html = default_factory(None, false, false).build(&tp, 200, Some(33.333)).unwrap();
        assert_eq!(titles_and_values(&html)[0].1, "10.00");
    }

    #[test]
    fn test_alternating_measures_use_point_name() {
        let p = point(5.0);
        let s = series("m1, m2");
        let tp = TooltipPoint {
            point: &p,
            series: &s,
            category: None,
            parent_category: None,
            on_opposite_axis: false,
        };
        let factory = TooltipFactory::Default {
            view: None,
            multi_measures_alternating: true,
            stack_measures_to_percent: false,
            dual_axis: false,
            separators: Separators::default(),
        };
        let html = factory.build(&tp, 200, None).unwrap();
        assert_eq!(titles_and_values(&html)[0].0, "East");
    }

    #[test]
    fn test_two_attributes_parent_first() {
        let p = point(1.0);
        let s = series("Revenue");
        let tp = TooltipPoint {
            point: &p,
            series: &s,
            category: Some("Prague"),
            parent_category: Some("Czechia"),
            on_opposite_axis: false,
        };
        let factory = TooltipFactory::TwoAttributes {
            view: Some("City".into()),
            view_parent: Some("Country".into()),
            stack_measures_to_percent: false,
            dual_axis: false,
            separators: Separators::default(),
        };
        let rows = titles_and_values(&factory.build(&tp, 200, None).unwrap());
        let titles: Vec<&str> = rows.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(titles, vec!["Country", "City", "Revenue"]);
        assert_eq!(rows[0].1, "Czechia");
    }

    #[test]
    fn test_xy_factory_skips_missing_measures() {
        let p = Point {
            x: Some(1.0),
            y: Some(2.0),
            name: Some(String::new()),
            ..Default::default()
        };
        let s = series("");
        let tp = TooltipPoint {
            point: &p,
            series: &s,
            category: None,
            parent_category: None,
            on_opposite_axis: false,
        };
        let factory = TooltipFactory::Xy {
            measures: [
                None,
                Some(TooltipMeasure {
                    name: "Profit".into(),
                    format: "#,##0".into(),
                }),
                None,
            ],
            stack: None,
            separators: Separators::default(),
        };
        let rows = titles_and_values(&factory.build(&tp, 200, None).unwrap());
        assert_eq!(rows, vec![("Profit".to_string(), "2".to_string())]);
    }

    #[test]
    fn test_heatmap_rows_and_null_value() {
        let p = Point {
            x: Some(1.0),
            y: Some(0.0),
            ..Default::default()
        };
        let s = Series {
            name: "Revenue".into(),
            data_labels: Some(crate::chart::series::DataLabels {
                format_gd: "#,##0".into(),
            }),
            ..Default::default()
        };
        let tp = TooltipPoint {
            point: &p,
            series: &s,
            category: None,
            parent_category: None,
            on_opposite_axis: false,
        };
        let factory = TooltipFactory::Heatmap {
            view: Some(TooltipAttribute {
                title: "Region".into(),
                items: vec!["East".into(), "West".into()],
            }),
            stack: Some(TooltipAttribute {
                title: "Segment".into(),
                items: vec!["A".into()],
            }),
            separators: Separators::default(),
        };
        let rows = titles_and_values(&factory.build(&tp, 200, None).unwrap());
        assert_eq!(
            rows,
            vec![
                ("Segment".to_string(), "A".to_string()),
                ("Region".to_string(), "West".to_string()),
                ("Revenue".to_string(), "-".to_string()),
            ]
        );
    }

    #[test]
    fn test_treemap_root_has_no_tooltip() {
        let root = Point {
            id: Some("0".into()),
            ..Default::default()
        };
        let s = series("m1");
        let tp = TooltipPoint {
            point: &root,
            series: &s,
            category: None,
            parent_category: None,
            on_opposite_axis: false,
        };
        let factory = TooltipFactory::Treemap {
            view: None,
            stack: None,
            separators: Separators::default(),
        };
        assert_eq!(factory.build(&tp, 200, None), None);

        let leaf = Point {
            value: Some(3.0),
            parent: Some("0".into()),
            ..Default::default()
        };
        let tp = TooltipPoint {
            point: &leaf,
            category: Some("Measure m1"),
            ..tp
        };
        let rows = titles_and_values(&factory.build(&tp, 200, None).unwrap());
        assert_eq!(rows, vec![("Measure m1".to_string(), "3.00".to_string())]);
    }
}
