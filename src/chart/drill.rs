//! Drillability
//!
//! A point is drillable when any drill predicate matches any of its hooks:
//! its measure header(s), the view-by attributes and items, and the stack-by
//! attribute and item. Drillable points carry a drill intersection describing
//! where in the data model they live.

use super::predicates::{is_some_predicate_matched, HeaderPredicate, MappingHeader};
use super::series::{Point, Series};
use super::ChartType;
use crate::execution::data_view::DataView;
use crate::execution::definition::{Measure, ObjQualifier};
use crate::execution::dimensions::LocatedAttribute;
use crate::execution::result::{AttributeHeaderItem, MeasureHeader};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrillHeaderRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrillIntersectionElement {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<DrillHeaderRef>,
}

impl DrillIntersectionElement {
    fn new(id: String, title: String, uri: Option<String>, identifier: Option<String>) -> Self {
        let header = (uri.is_some() || identifier.is_some())
            .then_some(DrillHeaderRef { uri, identifier });
        DrillIntersectionElement { id, title, header }
    }

    /// Measure element; derived measures report their master's uri/identifier
    fn measure(header: &MeasureHeader, dv: &DataView) -> Self {
        let qualifier = dv
            .master_measure(&header.local_identifier)
            .and_then(Measure::qualifier);
        let uri = qualifier
            .and_then(ObjQualifier::uri)
            .map(str::to_string)
            .or_else(|| header.uri.clone());
        let identifier = qualifier
            .and_then(ObjQualifier::identifier)
            .map(str::to_string)
            .or_else(|| header.identifier.clone());
        Self::new(header.local_identifier.clone(), header.name.clone(), uri, identifier)
    }

    fn attribute_item(item: &AttributeHeaderItem, attribute: &LocatedAttribute) -> Self {
        Self::new(
            item.element_id().to_string(),
            item.name.clone(),
            Some(attribute.header.uri.clone()),
            Some(attribute.header.identifier.clone()),
        )
    }
}

/// Everything drillability depends on, besides the series
#[derive(Debug, Clone, Copy)]
pub struct DrillContext<'a> {
    pub dv: &'a DataView,
    pub predicates: &'a [HeaderPredicate],
    pub chart_type: ChartType,
    pub view: Option<&'a LocatedAttribute>,
    pub view_parent: Option<&'a LocatedAttribute>,
    pub stack: Option<&'a LocatedAttribute>,
}

impl<'a> DrillContext<'a> {
    fn is_stacked_treemap(&self) -> bool {
        self.chart_type == ChartType::Treemap && self.stack.is_some()
    }

    /// Measure headers a point stands for; `None` for treemap roots
    fn point_measures(
        &self,
        point: &Point,
        series_index: usize,
        point_index: usize,
    ) -> Option<Vec<&'a MeasureHeader>> {
        let measures = self.dv.measure_headers();
        let headers: Vec<&'a MeasureHeader> = match self.chart_type {
            ChartType::Scatter => measures.iter().take(2).collect(),
            ChartType::Bubble => measures.iter().take(3).collect(),
            _ if self.is_stacked_treemap() => {
                if point.is_root() {
                    return None;
                }
                let index = if self.view.is_some() {
                    0
                } else {
                    point
                        .parent
                        .as_deref()
                        .and_then(|parent| parent.parse::<usize>().ok())
                        .unwrap_or(0)
                };
                measures.get(index).into_iter().collect()
            }
            _ => {
                let measures_only = self.chart_type.is_multi_measures_alternating() && self.view.is_none();
                let index = if self.stack.is_none() && !measures_only {
                    Some(series_index)
                } else if measures.is_empty() {
                    None
                } else {
                    Some(point_index % measures.len())
                };
                index.and_then(|i| measures.get(i)).into_iter().collect()
            }
        };
        Some(headers)
    }

    fn resolve_point(&self, point: Point, series_index: usize, point_index: usize) -> Point {
        let Some(measures) = self.point_measures(&point, series_index, point_index) else {
            return point;
        };

        let grid_indexed = self.chart_type == ChartType::Heatmap || self.is_stacked_treemap();
        let coordinate = |value: Option<f64>| value.map_or(0, |v| v as usize);
        let view_index = if grid_indexed { coordinate(point.x) } else { point_index };
        let stack_index = match self.chart_type {
            ChartType::Scatter => view_index,
            _ if grid_indexed => coordinate(point.y),
            _ => series_index,
        };

        let view_item = self.view.and_then(|view| view.item(view_index));
        let parent_item = self.view_parent.and_then(|parent| parent.item(view_index));
        let stack_item = self.stack.and_then(|stack| stack.item(stack_index));

        let mut hooks: Vec<MappingHeader<'_>> =
            measures.iter().map(|m| MappingHeader::Measure(m)).collect();
        hooks.extend(self.view.map(|a| MappingHeader::Attribute(&a.header)));
        hooks.extend(view_item.map(MappingHeader::AttributeItem));
        hooks.extend(self.view_parent.map(|a| MappingHeader::Attribute(&a.header)));
        hooks.extend(parent_item.map(MappingHeader::AttributeItem));
        hooks.extend(self.stack.map(|a| MappingHeader::Attribute(&a.header)));
        hooks.extend(stack_item.map(MappingHeader::AttributeItem));

        let drilldown = hooks
            .iter()
            .any(|hook| is_some_predicate_matched(self.predicates, *hook, self.dv));

        let drill_intersection = drilldown.then(|| {
            let mut elements: Vec<DrillIntersectionElement> = measures
                .iter()
                .map(|m| DrillIntersectionElement::measure(m, self.dv))
                .collect();
            let items = [
                (view_item, self.view),
                (parent_item, self.view_parent),
                (stack_item, self.stack),
            ];
            for (item, attribute) in items {
                if let (Some(item), Some(attribute)) = (item, attribute) {
                    elements.push(DrillIntersectionElement::attribute_item(item, attribute));
                }
            }
            elements
        });

        Point {
            drilldown: Some(drilldown),
            drill_intersection,
            ..point
        }
    }
}

/// Attach drill metadata to every point and `isDrillable` to every series.
/// Scatter points missing either coordinate are dropped.
pub fn get_drillable_series(ctx: &DrillContext<'_>, series: Vec<Series>) -> Vec<Series> {
    series
        .into_iter()
        .enumerate()
        .map(|(series_index, series)| {
            let mut data: Vec<Point> = series
                .data
                .into_iter()
                .enumerate()
                .map(|(point_index, point)| ctx.resolve_point(point, series_index, point_index))
                .collect();
            if ctx.chart_type == ChartType::Scatter {
                data.retain(|point| point.x.is_some() && point.y.is_some());
            }
            let is_drillable = data.iter().any(|point| point.drilldown == Some(true));
            Series {
                data,
                is_drillable,
                ..series
            }
        })
        .collect()
}
