//! Color strategies
//!
//! Each chart family assigns colors differently. A strategy is built once per
//! render from a [`StrategyKind`] tag: an assignment step produces one
//! [`ColorAssignment`] per header, and a palette step turns the assignments
//! into the CSS colors looked up by series/point index.

use super::colors::{color_by_guid, heatmap_gradient, resolve_css, ColorItem, PaletteItem, Rgb};
use super::palettes::{palette_or_default, PALETTE_REGISTRY};
use super::predicates::MappingHeader;
use super::ChartType;
use crate::config::ColorMapping;
use crate::execution::data_view::DataView;
use crate::execution::dimensions::LocatedAttribute;
use crate::execution::result::{AttributeHeaderItem, MeasureHeader};
use serde::Serialize;

/// Lightening applied to a master measure's color for its derived measures
pub const DERIVED_MEASURE_LIGHTENING: f64 = 0.6;

/// Guid placeholder held by derived measures until their master is colored
const PLACEHOLDER_GUID: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
    Measure,
    Attribute,
    Heatmap,
    Treemap,
    Scatter,
    Bubble,
}

impl StrategyKind {
    /// Strategy for a chart type, given the located attributes
    pub fn select(
        chart_type: ChartType,
        view: Option<&LocatedAttribute>,
        stack: Option<&LocatedAttribute>,
    ) -> StrategyKind {
        match chart_type {
            ChartType::Heatmap => StrategyKind::Heatmap,
            ChartType::Treemap => StrategyKind::Treemap,
            ChartType::Scatter => StrategyKind::Scatter,
            ChartType::Bubble => StrategyKind::Bubble,
            ChartType::Pie | ChartType::Donut | ChartType::Funnel if view.is_some() => {
                StrategyKind::Attribute
            }
            _ if stack.is_some() => StrategyKind::Attribute,
            _ => StrategyKind::Measure,
        }
    }
}

/// Header a color is assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AssignedHeader {
    MeasureHeaderItem(MeasureHeader),
    AttributeHeaderItem(AttributeHeaderItem),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorAssignment {
    #[serde(rename = "headerItem")]
    pub header: AssignedHeader,
    pub color: ColorItem,
}

#[derive(Debug, Clone)]
pub struct ColorStrategy {
    kind: StrategyKind,
    /// headers whose assignment is hidden from the output (derived measures)
    hidden: Vec<bool>,
    assignment: Vec<ColorAssignment>,
    palette: Vec<String>,
}

impl ColorStrategy {
    /// Build the strategy for a chart.
    ///
    /// # Arguments
    /// * `chart_type` - Chart being rendered
    /// * `custom_palette` - Configured palette; `None` or empty selects the default
    /// * `mapping` - Color overrides, first matching rule wins
    /// * `view` / `stack` - Located view-by and stack-by attributes
    /// * `dv` - Data view the headers come from
    pub fn new(
        chart_type: ChartType,
        custom_palette: Option<&[PaletteItem]>,
        mapping: &[ColorMapping],
        view: Option<&LocatedAttribute>,
        stack: Option<&LocatedAttribute>,
        dv: &DataView,
    ) -> ColorStrategy {
        let palette = palette_or_default(custom_palette);
        let is_custom_palette = custom_palette.map_or(false, |p| !p.is_empty());
        let kind = StrategyKind::select(chart_type, view, stack);
        tracing::debug!("Color strategy {:?} for {}", kind, chart_type);

        let assignment = match kind {
            StrategyKind::Measure => measure_assignment(palette, mapping, dv),
            StrategyKind::Attribute => attribute_assignment(palette, mapping, stack.or(view), dv),
            StrategyKind::Heatmap => heatmap_assignment(palette, mapping, is_custom_palette, dv),
            StrategyKind::Treemap => match view {
                Some(view) => attribute_assignment(palette, mapping, Some(view), dv),
                None => measure_assignment(palette, mapping, dv),
            },
            StrategyKind::Scatter => single_measure_assignment(palette, mapping, dv),
            StrategyKind::Bubble => match stack {
                Some(stack) => attribute_assignment(palette, mapping, Some(stack), dv),
                None => single_measure_assignment(palette, mapping, dv),
            },
        };

        let palette_css = match kind {
            StrategyKind::Heatmap => heatmap_palette(palette, &assignment),
            StrategyKind::Scatter => repeated_palette(palette, &assignment, stack),
            StrategyKind::Bubble if stack.is_none() => repeated_palette(palette, &assignment, None),
            _ => positional_palette(palette, &assignment),
        };

        let hidden = assignment
            .iter()
            .map(|a| match &a.header {
                AssignedHeader::MeasureHeaderItem(header) => dv.is_derived(&header.local_identifier),
                AssignedHeader::AttributeHeaderItem(_) => false,
            })
            .collect();

        ColorStrategy {
            kind,
            hidden,
            assignment,
            palette: palette_css,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// Color at `index`; only the heatmap gradient wraps around
    pub fn color_by_index(&self, index: usize) -> Option<&str> {
        if self.kind == StrategyKind::Heatmap && !self.palette.is_empty() {
            return Some(&self.palette[index % self.palette.len()]);
        }
        self.palette.get(index).map(String::as_str)
    }

    /// Output-facing assignment, derived measures excluded
    pub fn color_assignment(&self) -> Vec<ColorAssignment> {
        self.assignment
            .iter()
            .zip(&self.hidden)
            .filter(|(_, hidden)| !**hidden)
            .map(|(assignment, _)| assignment.clone())
            .collect()
    }

    /// Every assignment including derived measures
    pub fn full_color_assignment(&self) -> &[ColorAssignment] {
        &self.assignment
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }
}

/// A mapped color is used only if it is RGB or names a guid of the palette
fn is_valid_mapped_color(color: &ColorItem, palette: &[PaletteItem]) -> bool {
    match color {
        ColorItem::Rgb(_) => true,
        ColorItem::Guid(guid) => palette.iter().any(|item| &item.guid == guid),
    }
}

fn mapped_color(
    header: MappingHeader<'_>,
    mapping: &[ColorMapping],
    palette: &[PaletteItem],
    dv: &DataView,
) -> Option<ColorItem> {
    mapping
        .iter()
        .find(|rule| rule.predicate.matches(header, dv))
        .map(|rule| rule.color.clone())
        .filter(|color| is_valid_mapped_color(color, palette))
}

fn palette_guid(palette: &[PaletteItem], index: usize) -> ColorItem {
    if palette.is_empty() {
        return ColorItem::Rgb(Rgb::WHITE);
    }
    ColorItem::Guid(palette[index % palette.len()].guid.clone())
}

fn measure_assignment(
    palette: &[PaletteItem],
    mapping: &[ColorMapping],
    dv: &DataView,
) -> Vec<ColorAssignment> {
    let headers = dv.measure_headers();

    // first pass: masters take palette slots, derived measures wait
    let mut slot = 0;
    let first_pass: Vec<ColorAssignment> = headers
        .iter()
        .map(|header| {
            let color = if dv.is_derived(&header.local_identifier) {
                ColorItem::Guid(PLACEHOLDER_GUID.to_string())
            } else {
                let color = mapped_color(MappingHeader::Measure(header), mapping, palette, dv)
                    .unwrap_or_else(|| palette_guid(palette, slot));
                slot += 1;
                color
            };
            ColorAssignment {
                header: AssignedHeader::MeasureHeaderItem(header.clone()),
                color,
            }
        })
        .collect();

    // second pass: derived measures lighten their master's color
    first_pass
        .iter()
        .enumerate()
        .map(|(index, assignment)| {
            let header = &headers[index];
            if !dv.is_derived(&header.local_identifier) {
                return assignment.clone();
            }
            let master_index = dv
                .measure(&header.local_identifier)
                .and_then(|measure| measure.master_identifier())
                .and_then(|master| dv.measure_header_index(master));
            match master_index {
                Some(master_index) => {
                    let source = match &first_pass[master_index].color {
                        ColorItem::Guid(guid) => color_by_guid(palette, guid, index),
                        ColorItem::Rgb(rgb) => Some(*rgb),
                    };
                    ColorAssignment {
                        header: assignment.header.clone(),
                        color: source
                            .map(|rgb| ColorItem::Rgb(rgb.lighter(DERIVED_MEASURE_LIGHTENING)))
                            .unwrap_or_else(|| assignment.color.clone()),
                    }
                }
                None => assignment.clone(),
            }
        })
        .collect()
}

fn attribute_assignment(
    palette: &[PaletteItem],
    mapping: &[ColorMapping],
    attribute: Option<&LocatedAttribute>,
    dv: &DataView,
) -> Vec<ColorAssignment> {
    let Some(attribute) = attribute else {
        return Vec::new();
    };
    let mut seen = std::collections::HashSet::new();
    attribute
        .items
        .iter()
        .filter(|item| seen.insert(item.uri.as_str()))
        .enumerate()
        .map(|(slot, item)| ColorAssignment {
            header: AssignedHeader::AttributeHeaderItem(item.clone()),
            color: mapped_color(MappingHeader::AttributeItem(item), mapping, palette, dv)
                .unwrap_or_else(|| palette_guid(palette, slot)),
        })
        .collect()
}

fn heatmap_assignment(
    palette: &[PaletteItem],
    mapping: &[ColorMapping],
    is_custom_palette: bool,
    dv: &DataView,
) -> Vec<ColorAssignment> {
    let Some(header) = dv.measure_headers().first() else {
        return Vec::new();
    };
    let color = mapped_color(MappingHeader::Measure(header), mapping, palette, dv)
        .unwrap_or_else(|| {
            if is_custom_palette {
                palette_guid(palette, 0)
            } else {
                ColorItem::Rgb(PALETTE_REGISTRY.heatmap_base())
            }
        });
    vec![ColorAssignment {
        header: AssignedHeader::MeasureHeaderItem(header.clone()),
        color,
    }]
}

fn single_measure_assignment(
    palette: &[PaletteItem],
    mapping: &[ColorMapping],
    dv: &DataView,
) -> Vec<ColorAssignment> {
    let Some(header) = dv.measure_headers().first() else {
        return Vec::new();
    };
    let color = mapped_color(MappingHeader::Measure(header), mapping, palette, dv)
        .unwrap_or_else(|| palette_guid(palette, 0));
    vec![ColorAssignment {
        header: AssignedHeader::MeasureHeaderItem(header.clone()),
        color,
    }]
}

/// Color `i` belongs to assignment `i`
fn positional_palette(palette: &[PaletteItem], assignment: &[ColorAssignment]) -> Vec<String> {
    assignment
        .iter()
        .enumerate()
        .map(|(index, a)| resolve_css(palette, &a.color, index))
        .collect()
}

/// White-to-base gradient of the single heatmap assignment
fn heatmap_palette(palette: &[PaletteItem], assignment: &[ColorAssignment]) -> Vec<String> {
    let base = assignment
        .first()
        .and_then(|a| match &a.color {
            ColorItem::Guid(guid) => color_by_guid(palette, guid, 0),
            ColorItem::Rgb(rgb) => Some(*rgb),
        })
        .unwrap_or_else(|| PALETTE_REGISTRY.heatmap_base());
    heatmap_gradient(base)
}

/// One color repeated for every stack-by item
fn repeated_palette(
    palette: &[PaletteItem],
    assignment: &[ColorAssignment],
    stack: Option<&LocatedAttribute>,
) -> Vec<String> {
    let Some(first) = assignment.first() else {
        return Vec::new();
    };
    let color = resolve_css(palette, &first.color, 0);
    let count = stack.map_or(1, |attribute| attribute.items.len().max(1));
    vec![color; count]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::predicates::HeaderPredicate;
    use crate::execution::data_view::fixtures::{measures_by_view, stacked};
    use crate::execution::definition::{ExecutionDefinition, Measure, ObjQualifier};
    use crate::execution::dimensions::{find_attribute_in_dimension, STACK_BY_DIMENSION_INDEX};
    use pretty_assertions::assert_eq;

    fn uri(s: &str) -> ObjQualifier {
        ObjQualifier::Uri(s.to_string())
    }

    fn default_css(index: usize) -> String {
        PALETTE_REGISTRY.default_palette()[index].fill.to_css()
    }

    fn pop_view() -> DataView {
        let definition = ExecutionDefinition::new(vec![
            Measure::pop("m1_pop", "m1", uri("/obj/year")),
            Measure::simple("m1", uri("/obj/1")),
            Measure::simple("m2", uri("/obj/2")),
        ]);
        measures_by_view(
            &["m1_pop", "m1", "m2"],
            None,
            &[&[Some(1.0)], &[Some(2.0)], &[Some(3.0)]],
            definition,
        )
    }

    #[test]
    fn test_derived_measure_lightens_master_without_taking_a_slot() {
        let dv = pop_view();
        let strategy = ColorStrategy::new(ChartType::Column, None, &[], None, None, &dv);

        assert_eq!(strategy.kind(), StrategyKind::Measure);
        let master = PALETTE_REGISTRY.default_palette()[0].fill;
        assert_eq!(
            strategy.color_by_index(0),
            Some(master.lighter(DERIVED_MEASURE_LIGHTENING).to_css().as_str())
        );
        assert_eq!(strategy.color_by_index(1), Some(default_css(0).as_str()));
        assert_eq!(strategy.color_by_index(2), Some(default_css(1).as_str()));
        assert_eq!(strategy.color_by_index(3), None);
    }

    #[test]
    fn test_output_assignment_hides_derived_measures() {
        let dv = pop_view();
        let strategy = ColorStrategy::new(ChartType::Column, None, &[], None, None, &dv);

        assert_eq!(strategy.full_color_assignment().len(), 3);
        let output = strategy.color_assignment();
        assert_eq!(output.len(), 2);
        assert!(matches!(
            &output[0].header,
            AssignedHeader::MeasureHeaderItem(h) if h.local_identifier == "m1"
        ));
        assert_eq!(output[0].color, ColorItem::Guid("1".into()));
    }

    #[test]
    fn test_mapping_overrides_and_invalid_guid_is_ignored() {
        let dv = pop_view();
        let mapping = vec![
            ColorMapping {
                predicate: HeaderPredicate::LocalIdentifier("m2".into()),
                color: ColorItem::Rgb(Rgb::new(1, 2, 3)),
            },
            ColorMapping {
                predicate: HeaderPredicate::LocalIdentifier("m1".into()),
                color: ColorItem::Guid("not-in-palette".into()),
            },
        ];
        let strategy = ColorStrategy::new(ChartType::Column, None, &mapping, None, None, &dv);

        assert_eq!(strategy.color_by_index(1), Some(default_css(0).as_str()));
        assert_eq!(strategy.color_by_index(2), Some("rgb(1,2,3)"));
    }

    #[test]
    fn test_attribute_strategy_deduplicates_by_uri() {
        let dv = stacked(
            &["A", "B", "A"],
            &["East"],
            &["m1"],
            &[&[Some(1.0)], &[Some(2.0)], &[Some(3.0)]],
            ExecutionDefinition::new(vec![Measure::simple("m1", uri("/obj/1"))]),
        );
        let mut stack = find_attribute_in_dimension(
            dv.dimensions().get(STACK_BY_DIMENSION_INDEX),
            dv.header_items(STACK_BY_DIMENSION_INDEX),
            None,
        )
        .unwrap();
        // third item repeats the first element
        stack.items[2].uri = stack.items[0].uri.clone();

        let strategy = ColorStrategy::new(ChartType::Column, None, &[], None, Some(&stack), &dv);
        assert_eq!(strategy.kind(), StrategyKind::Attribute);
        assert_eq!(strategy.full_color_assignment().len(), 2);
        assert_eq!(strategy.palette(), &[default_css(0), default_css(1)]);
    }

    #[test]
    fn test_round_robin_wraps_palette() {
        let palette = vec![
            PaletteItem::new("a", Rgb::new(1, 1, 1)),
            PaletteItem::new("b", Rgb::new(2, 2, 2)),
        ];
        let definition = ExecutionDefinition::new(vec![
            Measure::simple("m1", uri("/obj/1")),
            Measure::simple("m2", uri("/obj/2")),
            Measure::simple("m3", uri("/obj/3")),
        ]);
        let dv = measures_by_view(
            &["m1", "m2", "m3"],
            None,
            &[&[Some(1.0)], &[Some(2.0)], &[Some(3.0)]],
            definition,
        );
        let strategy = ColorStrategy::new(ChartType::Column, Some(&palette), &[], None, None, &dv);
        assert_eq!(strategy.palette(), &["rgb(1,1,1)", "rgb(2,2,2)", "rgb(1,1,1)"]);
    }

    #[test]
    fn test_heatmap_gradient_wraps() {
        let definition = ExecutionDefinition::new(vec![Measure::simple("m1", uri("/obj/1"))]);
        let dv = measures_by_view(&["m1"], None, &[&[Some(1.0)]], definition);
        let strategy = ColorStrategy::new(ChartType::Heatmap, None, &[], None, None, &dv);

        assert_eq!(strategy.palette().len(), 8);
        assert_eq!(strategy.color_by_index(0), Some("rgb(255,255,255)"));
        assert_eq!(strategy.color_by_index(7), Some("rgb(0,110,145)"));
        assert_eq!(strategy.color_by_index(8), strategy.color_by_index(0));
    }

    #[test]
    fn test_heatmap_uses_first_custom_palette_color() {
        let palette = vec![PaletteItem::new("a", Rgb::new(100, 0, 0))];
        let definition = ExecutionDefinition::new(vec![Measure::simple("m1", uri("/obj/1"))]);
        let dv = measures_by_view(&["m1"], None, &[&[Some(1.0)]], definition);
        let strategy = ColorStrategy::new(ChartType::Heatmap, Some(&palette), &[], None, None, &dv);

        assert_eq!(strategy.color_by_index(7), Some("rgb(100,0,0)"));
    }

    #[test]
    fn test_scatter_repeats_single_color() {
        let definition = ExecutionDefinition::new(vec![
            Measure::simple("m1", uri("/obj/1")),
            Measure::simple("m2", uri("/obj/2")),
        ]);
        let dv = stacked(
            &["A", "B", "C"],
            &[],
            &["m1", "m2"],
            &[&[Some(1.0), Some(2.0)][..]; 3],
            definition,
        );
        let stack = find_attribute_in_dimension(
            dv.dimensions().get(STACK_BY_DIMENSION_INDEX),
            dv.header_items(STACK_BY_DIMENSION_INDEX),
            None,
        );
        let strategy =
            ColorStrategy::new(ChartType::Scatter, None, &[], None, stack.as_ref(), &dv);

        assert_eq!(strategy.kind(), StrategyKind::Scatter);
        assert_eq!(strategy.palette(), &vec![default_css(0); 3][..]);
        assert_eq!(strategy.color_assignment().len(), 1);
    }

    #[test]
    fn test_scatter_palette_is_sized_by_stack_not_view() {
        let definition = ExecutionDefinition::new(vec![Measure::simple("m1", uri("/obj/1"))]);
        let dv = stacked(
            &["A", "B"],
            &["East", "West", "North", "South"],
            &["m1"],
            &[&[Some(1.0); 4][..]; 2],
            definition,
        );
        let view = find_attribute_in_dimension(dv.dimensions().get(1), dv.header_items(1), None);
        let stack = find_attribute_in_dimension(
            dv.dimensions().get(STACK_BY_DIMENSION_INDEX),
            dv.header_items(STACK_BY_DIMENSION_INDEX),
            None,
        );
        assert_eq!(view.as_ref().map(|v| v.items.len()), Some(4));

        let scatter =
            ColorStrategy::new(ChartType::Scatter, None, &[], view.as_ref(), stack.as_ref(), &dv);
        assert_eq!(scatter.palette().len(), 2);
        let bubble = ColorStrategy::new(ChartType::Bubble, None, &[], view.as_ref(), None, &dv);
        assert_eq!(bubble.palette(), &[default_css(0)][..]);
    }

    #[test]
    fn test_treemap_delegates_on_view_attribute() {
        let definition = ExecutionDefinition::new(vec![Measure::simple("m1", uri("/obj/1"))]);
        let dv = measures_by_view(&["m1"], Some(&["East", "West"]), &[&[Some(1.0), Some(2.0)]], definition);
        let view = find_attribute_in_dimension(dv.dimensions().get(1), dv.header_items(1), None);

        let with_view = ColorStrategy::new(ChartType::Treemap, None, &[], view.as_ref(), None, &dv);
        assert_eq!(with_view.full_color_assignment().len(), 2);
        let without = ColorStrategy::new(ChartType::Treemap, None, &[], None, None, &dv);
        assert!(matches!(
            without.full_color_assignment()[0].header,
            AssignedHeader::MeasureHeaderItem(_)
        ));
    }
}
