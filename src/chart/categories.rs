//! Axis categories and the value sort of pie-like charts

use super::series::Series;
use super::ChartType;
use crate::execution::data_view::DataView;
use crate::execution::dimensions::LocatedAttribute;
use serde::Serialize;
use std::collections::HashMap;

/// Parent category with its children, for charts viewed by two attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub name: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Categories {
    Flat(Vec<String>),
    /// Heatmap: x labels, then y labels
    Grid(Vec<Vec<String>>),
    Grouped(Vec<CategoryGroup>),
}

impl Categories {
    /// Number of categories; grouped categories count their children, a
    /// heatmap grid counts its longer axis
    pub fn count(&self) -> usize {
        match self {
            Categories::Flat(names) => names.len(),
            Categories::Grid(axes) => axes.iter().map(Vec::len).max().unwrap_or(0),
            Categories::Grouped(groups) => groups.iter().map(|g| g.categories.len()).sum(),
        }
    }

    /// Category name at `index` and its parent's name, if grouped
    pub fn lookup(&self, index: usize) -> (Option<&str>, Option<&str>) {
        match self {
            Categories::Flat(names) => (names.get(index).map(String::as_str), None),
            Categories::Grid(_) => (None, None),
            Categories::Grouped(groups) => {
                let mut remaining = index;
                for group in groups {
                    if remaining < group.categories.len() {
                        return (Some(&group.categories[remaining]), Some(&group.name));
                    }
                    remaining -= group.categories.len();
                }
                (None, None)
            }
        }
    }
}

fn names(attribute: Option<&LocatedAttribute>) -> Option<Vec<String>> {
    attribute.map(LocatedAttribute::item_names)
}

/// Categories for a chart viewed by at most one attribute
pub fn get_categories(
    chart_type: ChartType,
    dv: &DataView,
    view: Option<&LocatedAttribute>,
    stack: Option<&LocatedAttribute>,
) -> Categories {
    let blank = || vec![String::new()];
    match chart_type {
        ChartType::Heatmap => Categories::Grid(vec![
            names(view).unwrap_or_else(blank),
            names(stack).unwrap_or_else(blank),
        ]),
        ChartType::Scatter => Categories::Flat(names(stack).unwrap_or_else(blank)),
        ChartType::Bubble => Categories::Flat(blank()),
        _ => match names(view) {
            Some(names) => Categories::Flat(names),
            None if chart_type.is_multi_measures_alternating() => Categories::Flat(
                dv.measure_headers().iter().map(|m| m.name.clone()).collect(),
            ),
            None => Categories::Flat(Vec::new()),
        },
    }
}

/// Children grouped under their parent item, parents in first-seen order
pub fn get_categories_for_two_attributes(
    view: &LocatedAttribute,
    parent: &LocatedAttribute,
) -> Categories {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut by_uri: HashMap<&str, usize> = HashMap::new();
    for (index, parent_item) in parent.items.iter().enumerate() {
        let child = view.item(index).map(|c| c.name.clone()).unwrap_or_default();
        let slot = *by_uri.entry(parent_item.uri.as_str()).or_insert_with(|| {
            groups.push(CategoryGroup {
                name: parent_item.name.clone(),
                categories: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].categories.push(child);
    }
    Categories::Grouped(groups)
}

fn permute<T: Clone>(items: &[T], order: &[usize]) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            order
                .get(i)
                .and_then(|&from| items.get(from))
                .unwrap_or(item)
                .clone()
        })
        .collect()
}

/// Sort the points of the first series by value, descending, and reorder the
/// categories the same way. Points keep their color; their legend index is
/// reset to the new position.
pub fn sort_by_measure(series: &mut [Series], categories: Categories) -> Categories {
    let Some(first) = series.first_mut() else {
        return categories;
    };
    let mut points = std::mem::take(&mut first.data);
    points.sort_by(|a, b| {
        let a = a.y.unwrap_or(0.0);
        let b = b.y.unwrap_or(0.0);
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });

    let order: Vec<usize> = points
        .iter()
        .enumerate()
        .map(|(position, point)| point.legend_index.unwrap_or(position))
        .collect();
    for (position, point) in points.iter_mut().enumerate() {
        point.legend_index = Some(position);
    }
    first.data = points;

    match categories {
        Categories::Flat(names) => Categories::Flat(permute(&names, &order)),
        Categories::Grid(axes) => Categories::Grid(permute(&axes, &order)),
        Categories::Grouped(groups) => Categories::Grouped(permute(&groups, &order)),
    }
}
