//! Read-only facade over one fully merged execution
//!
//! Construction validates everything the chart builders rely on, so later
//! lookups are infallible:
//! - 1 or 2 dimensions
//! - measure group last in its dimension
//! - acyclic measure reference graph with no dangling references
//!
//! Local identifier lookups go through maps built once here.

use super::definition::{Bucket, ExecutionDefinition, Measure};
use super::dimensions::{find_measure_group, validate_dimension};
use super::result::{
    DataValue, ExecutionResponse, ExecutionResult, MeasureHeader, ResultDimension,
    ResultHeaderItem,
};
use crate::error::{ChartError, Result};
use std::borrow::Cow;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct DataView {
    response: ExecutionResponse,
    result: ExecutionResult,
    definition: ExecutionDefinition,
    /// local identifier -> index in `definition.measures`
    definition_index: HashMap<String, usize>,
    /// local identifier -> index in the measure group header
    header_index: HashMap<String, usize>,
}

impl DataView {
    pub fn new(
        response: ExecutionResponse,
        result: ExecutionResult,
        definition: ExecutionDefinition,
    ) -> Result<Self> {
        let dimension_count = response.dimensions.len();
        if dimension_count != 1 && dimension_count != 2 {
            return Err(ChartError::InvalidDimensionality(dimension_count));
        }
        for (index, dimension) in response.dimensions.iter().enumerate() {
            validate_dimension(dimension, index)?;
        }

        let definition_index: HashMap<String, usize> = definition
            .measures
            .iter()
            .enumerate()
            .map(|(index, measure)| (measure.local_identifier.clone(), index))
            .collect();
        validate_measure_graph(&definition.measures, &definition_index)?;

        let header_index = find_measure_group(&response.dimensions)?
            .map(|group| {
                group
                    .items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| (item.local_identifier.clone(), index))
                    .collect()
            })
            .unwrap_or_default();

        Ok(DataView {
            response,
            result,
            definition,
            definition_index,
            header_index,
        })
    }

    pub fn dimensions(&self) -> &[ResultDimension] {
        &self.response.dimensions
    }

    pub fn result(&self) -> &ExecutionResult {
        &self.result
    }

    pub fn definition(&self) -> &ExecutionDefinition {
        &self.definition
    }

    /// Header items of one dimension (`headerItems[dimension]`)
    pub fn header_items(&self, dimension: usize) -> &[Vec<ResultHeaderItem>] {
        self.result
            .header_items
            .get(dimension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of attribute headers in a dimension
    pub fn attribute_count(&self, dimension: usize) -> usize {
        self.response
            .dimensions
            .get(dimension)
            .map(|dim| {
                dim.headers
                    .iter()
                    .filter(|header| header.as_attribute().is_some())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Measures of the measure group, in header order
    pub fn measure_headers(&self) -> &[MeasureHeader] {
        self.response
            .dimensions
            .iter()
            .flat_map(|dim| dim.headers.iter())
            .find_map(|header| header.as_measure_group())
            .map(|group| group.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn measure_header(&self, index: usize) -> Option<&MeasureHeader> {
        self.measure_headers().get(index)
    }

    /// Position of a measure in the measure group
    pub fn measure_header_index(&self, local_identifier: &str) -> Option<usize> {
        self.header_index.get(local_identifier).copied()
    }

    pub fn measure(&self, local_identifier: &str) -> Option<&Measure> {
        self.definition_index
            .get(local_identifier)
            .map(|&index| &self.definition.measures[index])
    }

    pub fn is_derived(&self, local_identifier: &str) -> bool {
        self.measure(local_identifier)
            .map_or(false, Measure::is_derived)
    }

    /// Master of a derived measure, or the measure itself otherwise
    pub fn master_measure(&self, local_identifier: &str) -> Option<&Measure> {
        let measure = self.measure(local_identifier)?;
        match measure.master_identifier() {
            Some(master) => self.measure(master),
            None => Some(measure),
        }
    }

    /// Raw data as rows; 1-D results become one row
    pub fn two_dim_data(&self) -> Cow<'_, [Vec<DataValue>]> {
        self.result.data.two_dim()
    }

    pub fn has_buckets(&self) -> bool {
        !self.definition.buckets.is_empty()
    }

    pub fn bucket(&self, local_identifier: &str) -> Option<&Bucket> {
        self.definition.bucket(local_identifier)
    }

    /// A missing bucket counts as empty
    pub fn is_bucket_empty(&self, local_identifier: &str) -> bool {
        self.bucket(local_identifier)
            .map_or(true, |bucket| bucket.items.is_empty())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Reject dangling references and cycles among measures
fn validate_measure_graph(measures: &[Measure], index: &HashMap<String, usize>) -> Result<()> {
    for measure in measures {
        for reference in measure.references() {
            if !index.contains_key(reference) {
                return Err(ChartError::MissingMeasureDependency {
                    measure: measure.local_identifier.clone(),
                    reference: reference.to_string(),
                });
            }
        }
    }

    let mut state: HashMap<usize, Visit> = HashMap::new();
    for start in 0..measures.len() {
        if state.contains_key(&start) {
            continue;
        }
        // iterative DFS: (measure, next reference to visit)
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        state.insert(start, Visit::InProgress);

        while let Some((current, next)) = stack.pop() {
            let references = measures[current].references();
            match references.get(next) {
                Some(reference) => {
                    stack.push((current, next + 1));
                    let target = index[*reference];
                    match state.get(&target) {
                        Some(Visit::InProgress) => {
                            return Err(ChartError::CyclicMeasureDependency(
                                measures[target].local_identifier.clone(),
                            ));
                        }
                        Some(Visit::Done) => {}
                        None => {
                            state.insert(target, Visit::InProgress);
                            stack.push((target, 0));
                        }
                    }
                }
                None => {
                    state.insert(current, Visit::Done);
                }
            }
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::definition::ObjQualifier;
    use crate::execution::dimensions::fixtures::{attribute_header, measure_group};

    fn response(dimensions: usize) -> ExecutionResponse {
        ExecutionResponse {
            dimensions: (0..dimensions)
                .map(|_| ResultDimension {
                    headers: vec![measure_group(&["m1"])],
                })
                .collect(),
            links: None,
        }
    }

    fn uri(s: &str) -> ObjQualifier {
        ObjQualifier::Uri(s.to_string())
    }

    #[test]
    fn test_rejects_invalid_dimensionality() {
        for dims in [0, 3] {
            let err = DataView::new(
                response(dims),
                ExecutionResult::default(),
                ExecutionDefinition::default(),
            )
            .unwrap_err();
            assert!(matches!(err, ChartError::InvalidDimensionality(n) if n == dims));
        }
    }

    #[test]
    fn test_rejects_measure_group_before_attribute() {
        let response = ExecutionResponse {
            dimensions: vec![ResultDimension {
                headers: vec![measure_group(&["m1"]), attribute_header("a1", "Region")],
            }],
            links: None,
        };
        let err = DataView::new(
            response,
            ExecutionResult::default(),
            ExecutionDefinition::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::MalformedDimension { .. }));
    }

    #[test]
    fn test_rejects_missing_dependency() {
        let definition = ExecutionDefinition::new(vec![
            Measure::simple("m1", uri("/obj/1")),
            Measure::pop("m2", "nope", uri("/obj/year")),
        ]);
        let err = DataView::new(response(1), ExecutionResult::default(), definition).unwrap_err();
        match err {
            ChartError::MissingMeasureDependency { measure, reference } => {
                assert_eq!(measure, "m2");
                assert_eq!(reference, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_cycles() {
        let definition = ExecutionDefinition::new(vec![
            Measure::arithmetic("a", "sum", &["b", "m1"]),
            Measure::arithmetic("b", "sum", &["c"]),
            Measure::pop("c", "a", uri("/obj/year")),
            Measure::simple("m1", uri("/obj/1")),
        ]);
        let err = DataView::new(response(1), ExecutionResult::default(), definition).unwrap_err();
        assert!(matches!(err, ChartError::CyclicMeasureDependency(_)));

        let self_ref = ExecutionDefinition::new(vec![Measure::pop("p", "p", uri("/obj/year"))]);
        let err = DataView::new(response(1), ExecutionResult::default(), self_ref).unwrap_err();
        assert!(matches!(err, ChartError::CyclicMeasureDependency(id) if id == "p"));
    }

    #[test]
    fn test_accepts_shared_dependencies() {
        let definition = ExecutionDefinition::new(vec![
            Measure::simple("m1", uri("/obj/1")),
            Measure::arithmetic("a", "sum", &["m1", "m1"]),
            Measure::arithmetic("b", "difference", &["a", "m1"]),
            Measure::previous_period("pp", "b", uri("/obj/ds"), 1),
        ]);
        let dv = DataView::new(response(1), ExecutionResult::default(), definition).unwrap();

        assert!(dv.is_derived("pp"));
        assert_eq!(dv.master_measure("pp").unwrap().local_identifier, "b");
        assert_eq!(dv.master_measure("m1").unwrap().local_identifier, "m1");
        assert_eq!(dv.measure_header_index("m1"), Some(0));
        assert!(dv.is_bucket_empty("measures"));
    }
}
