//! Execution definition (AFM) and visualization buckets
//!
//! Measures reference each other by `localIdentifier`: arithmetic measures
//! through their operands, derived measures (period-over-period and previous
//! period) through their master.

use serde::{Deserialize, Serialize};

pub const MEASURES: &str = "measures";
pub const SECONDARY_MEASURES: &str = "secondary_measures";
pub const TERTIARY_MEASURES: &str = "tertiary_measures";
pub const VIEW: &str = "view";
pub const STACK: &str = "stack";
pub const TREND: &str = "trend";
pub const SEGMENT: &str = "segment";
pub const ATTRIBUTE: &str = "attribute";
pub const COLUMNS: &str = "columns";

/// Metadata object reference: `{"uri": ...}` or `{"identifier": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjQualifier {
    Uri(String),
    Identifier(String),
}

impl ObjQualifier {
    pub fn uri(&self) -> Option<&str> {
        match self {
            ObjQualifier::Uri(uri) => Some(uri),
            ObjQualifier::Identifier(_) => None,
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match self {
            ObjQualifier::Identifier(identifier) => Some(identifier),
            ObjQualifier::Uri(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMeasureDefinition {
    pub item: ObjQualifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_ratio: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArithmeticMeasureDefinition {
    pub operator: String,
    pub measure_identifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopMeasureDefinition {
    pub measure_identifier: String,
    pub pop_attribute: ObjQualifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateDataSet {
    pub data_set: ObjQualifier,
    pub periods_ago: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousPeriodMeasureDefinition {
    pub measure_identifier: String,
    pub date_data_sets: Vec<DateDataSet>,
}

/// The four measure shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasureDefinition {
    Measure(SimpleMeasureDefinition),
    ArithmeticMeasure(ArithmeticMeasureDefinition),
    PopMeasureDefinition(PopMeasureDefinition),
    PreviousPeriodMeasure(PreviousPeriodMeasureDefinition),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub local_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub definition: MeasureDefinition,
}

impl Measure {
    /// Simple measure over a metric uri
    pub fn simple(local_identifier: impl Into<String>, item: ObjQualifier) -> Self {
        Measure {
            local_identifier: local_identifier.into(),
            alias: None,
            format: None,
            definition: MeasureDefinition::Measure(SimpleMeasureDefinition {
                item,
                aggregation: None,
                compute_ratio: None,
                filters: Vec::new(),
            }),
        }
    }

    pub fn arithmetic(
        local_identifier: impl Into<String>,
        operator: impl Into<String>,
        operands: &[&str],
    ) -> Self {
        Measure {
            local_identifier: local_identifier.into(),
            alias: None,
            format: None,
            definition: MeasureDefinition::ArithmeticMeasure(ArithmeticMeasureDefinition {
                operator: operator.into(),
                measure_identifiers: operands.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    pub fn pop(
        local_identifier: impl Into<String>,
        master: impl Into<String>,
        pop_attribute: ObjQualifier,
    ) -> Self {
        Measure {
            local_identifier: local_identifier.into(),
            alias: None,
            format: None,
            definition: MeasureDefinition::PopMeasureDefinition(PopMeasureDefinition {
                measure_identifier: master.into(),
                pop_attribute,
            }),
        }
    }

    pub fn previous_period(
        local_identifier: impl Into<String>,
        master: impl Into<String>,
        data_set: ObjQualifier,
        periods_ago: i32,
    ) -> Self {
        Measure {
            local_identifier: local_identifier.into(),
            alias: None,
            format: None,
            definition: MeasureDefinition::PreviousPeriodMeasure(
                PreviousPeriodMeasureDefinition {
                    measure_identifier: master.into(),
                    date_data_sets: vec![DateDataSet {
                        data_set,
                        periods_ago,
                    }],
                },
            ),
        }
    }

    pub fn with_alias(self, alias: impl Into<String>) -> Self {
        Measure {
            alias: Some(alias.into()),
            ..self
        }
    }

    pub fn with_format(self, format: impl Into<String>) -> Self {
        Measure {
            format: Some(format.into()),
            ..self
        }
    }

    /// Master local identifier of a derived measure
    pub fn master_identifier(&self) -> Option<&str> {
        match &self.definition {
            MeasureDefinition::PopMeasureDefinition(def) => Some(&def.measure_identifier),
            MeasureDefinition::PreviousPeriodMeasure(def) => Some(&def.measure_identifier),
            _ => None,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.master_identifier().is_some()
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self.definition, MeasureDefinition::ArithmeticMeasure(_))
    }

    /// Operand local identifiers of an arithmetic measure
    pub fn operands(&self) -> &[String] {
        match &self.definition {
            MeasureDefinition::ArithmeticMeasure(def) => &def.measure_identifiers,
            _ => &[],
        }
    }

    /// Metric reference of a simple measure
    pub fn qualifier(&self) -> Option<&ObjQualifier> {
        match &self.definition {
            MeasureDefinition::Measure(def) => Some(&def.item),
            _ => None,
        }
    }

    /// Every local identifier this measure depends on
    pub fn references(&self) -> Vec<&str> {
        match self.master_identifier() {
            Some(master) => vec![master],
            None => self.operands().iter().map(String::as_str).collect(),
        }
    }
}

/// Attribute in the execution definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    pub local_identifier: String,
    pub display_form: ObjQualifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// Visualization slot grouping local identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub local_identifier: String,
    #[serde(default)]
    pub items: Vec<String>,
}

impl Bucket {
    pub fn new(local_identifier: impl Into<String>, items: &[&str]) -> Self {
        Bucket {
            local_identifier: local_identifier.into(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn contains(&self, local_identifier: &str) -> bool {
        self.items.iter().any(|item| item == local_identifier)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDefinition {
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,
    #[serde(default)]
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

impl ExecutionDefinition {
    pub fn new(measures: Vec<Measure>) -> Self {
        ExecutionDefinition {
            measures,
            ..Default::default()
        }
    }

    pub fn with_buckets(self, buckets: Vec<Bucket>) -> Self {
        ExecutionDefinition { buckets, ..self }
    }

    pub fn bucket(&self, local_identifier: &str) -> Option<&Bucket> {
        self.buckets
            .iter()
            .find(|bucket| bucket.local_identifier == local_identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_measure_variants() {
        let json = r#"{
            "measures": [
                {"localIdentifier": "m1", "definition": {"measure": {"item": {"uri": "/obj/1"}}}},
                {"localIdentifier": "m1_pop", "definition": {"popMeasureDefinition": {
                    "measureIdentifier": "m1", "popAttribute": {"identifier": "date.year"}}}},
                {"localIdentifier": "m1_pp", "definition": {"previousPeriodMeasure": {
                    "measureIdentifier": "m1",
                    "dateDataSets": [{"dataSet": {"uri": "/obj/ds"}, "periodsAgo": 1}]}}},
                {"localIdentifier": "sum", "definition": {"arithmeticMeasure": {
                    "operator": "sum", "measureIdentifiers": ["m1", "m1_pop"]}}}
            ],
            "buckets": [{"localIdentifier": "measures", "items": ["m1", "m1_pop"]}]
        }"#;
        let definition: ExecutionDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(definition.measures.len(), 4);
        assert_eq!(
            definition.measures[0].qualifier().and_then(ObjQualifier::uri),
            Some("/obj/1")
        );
        assert_eq!(definition.measures[1].master_identifier(), Some("m1"));
        assert_eq!(definition.measures[2].master_identifier(), Some("m1"));
        assert!(definition.measures[3].is_arithmetic());
        assert_eq!(definition.measures[3].references(), vec!["m1", "m1_pop"]);
        assert!(definition.bucket(MEASURES).unwrap().contains("m1_pop"));
        assert!(definition.bucket(VIEW).is_none());
    }

    #[test]
    fn test_builders_return_new_values() {
        let base = Measure::simple("m1", ObjQualifier::Uri("/obj/1".into()));
        let aliased = base.clone().with_alias("Revenue").with_format("#,##0");

        assert_eq!(base.alias, None);
        assert_eq!(aliased.alias.as_deref(), Some("Revenue"));
        assert_eq!(aliased.format.as_deref(), Some("#,##0"));
    }
}
