//! Semantic model → view translation.

use std::sync::LazyLock;

use inflector::Inflector;
use regex::Regex;
use serde::Serialize;

use crate::model::{DimensionKind, EntityKind, SemanticModel};
use crate::semantic::{FieldExposureSet, SynthesizedMetric, DIMENSIONS_ONLY_SET};

/// Pattern for `ref('model')` / `ref("model")` table references
static REF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^ref\(\s*['"]([^'"]+)['"]\s*\)$"#).unwrap());

/// A generated view, in the shape the renderer consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub name: String,
    pub sql_table_name: String,
    pub dimensions: Vec<ViewDimension>,
    pub dimension_groups: Vec<DimensionGroup>,
    pub measures: Vec<ViewMeasure>,
    pub sets: Vec<FieldSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewDimension {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub sql: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub primary_key: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionGroup {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub timeframes: Vec<String>,
    pub sql: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewMeasure {
    pub name: String,
    #[serde(rename = "type")]
    pub measure_type: String,
    pub sql: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSet {
    pub name: String,
    pub fields: Vec<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn label_for(label: Option<&String>, name: &str) -> String {
    label.cloned().unwrap_or_else(|| name.to_title_case())
}

/// Physical table for a model: `ref('x')` resolves into `schema`, any other
/// reference is taken as an already-qualified relation.
pub fn sql_table_name(table: &str, schema: &str) -> String {
    match REF_PATTERN.captures(table.trim()) {
        Some(caps) if schema.is_empty() => caps[1].to_string(),
        Some(caps) => format!("{}.{}", schema, &caps[1]),
        None => table.trim().to_string(),
    }
}

impl View {
    /// Translate a semantic model. Sets are filled in later by
    /// [`View::set_exposure`], once metric measures are attached.
    pub fn from_model(model: &SemanticModel, name: String, schema: &str) -> Self {
        let mut view = Self {
            sql_table_name: sql_table_name(&model.table, schema),
            name,
            dimensions: Vec::new(),
            dimension_groups: Vec::new(),
            measures: Vec::new(),
            sets: Vec::new(),
        };

        // Entities render hidden; joins still need to reference them
        for entity in &model.entities {
            view.push_dimension(ViewDimension {
                name: entity.name.clone(),
                field_type: "string".to_string(),
                sql: entity.sql(),
                label: entity.name.to_title_case(),
                description: None,
                primary_key: entity.kind == EntityKind::Primary,
                hidden: true,
            });
        }

        for dimension in &model.dimensions {
            match (dimension.kind, dimension.granularity()) {
                (DimensionKind::Time, Some(granularity)) => {
                    if view.reject_duplicate(&dimension.name, "dimension_group") {
                        continue;
                    }
                    view.dimension_groups.push(DimensionGroup {
                        name: dimension.name.clone(),
                        field_type: "time".to_string(),
                        timeframes: granularity
                            .timeframes()
                            .iter()
                            .map(|t| t.to_string())
                            .collect(),
                        sql: dimension.sql(),
                        label: label_for(dimension.label.as_ref(), &dimension.name),
                        description: dimension.description.clone(),
                        hidden: dimension.hidden,
                    });
                }
                _ => view.push_dimension(ViewDimension {
                    name: dimension.name.clone(),
                    field_type: "string".to_string(),
                    sql: dimension.sql(),
                    label: label_for(dimension.label.as_ref(), &dimension.name),
                    description: dimension.description.clone(),
                    primary_key: false,
                    hidden: dimension.hidden,
                }),
            }
        }

        for measure in &model.measures {
            view.push_measure(ViewMeasure {
                name: measure.view_field_name(),
                measure_type: measure.agg.as_str().to_string(),
                sql: measure.sql(),
                label: label_for(measure.label.as_ref(), &measure.name),
                description: measure.description.clone(),
                required_fields: Vec::new(),
                hidden: true,
            });
        }

        view
    }

    /// Append a synthesized metric as a visible measure.
    pub fn push_metric(&mut self, metric: SynthesizedMetric) {
        self.push_measure(ViewMeasure {
            label: label_for(metric.label.as_ref(), &metric.name),
            name: metric.name,
            measure_type: metric.measure_type.as_str().to_string(),
            sql: metric.sql,
            description: metric.description,
            required_fields: metric.required_fields,
            hidden: false,
        });
    }

    /// Whether any dimension, dimension group or measure is named `name`.
    pub fn has_field(&self, name: &str) -> bool {
        self.dimensions.iter().any(|d| d.name == name)
            || self.dimension_groups.iter().any(|g| g.name == name)
            || self.measures.iter().any(|m| m.name == name)
    }

    fn push_dimension(&mut self, dimension: ViewDimension) {
        if !self.reject_duplicate(&dimension.name, "dimension") {
            self.dimensions.push(dimension);
        }
    }

    fn push_measure(&mut self, measure: ViewMeasure) {
        if !self.reject_duplicate(&measure.name, "measure") {
            self.measures.push(measure);
        }
    }

    /// Field names are unique per view; the first definition wins.
    fn reject_duplicate(&self, name: &str, kind: &str) -> bool {
        if !self.has_field(name) {
            return false;
        }
        tracing::warn!(
            view = %self.name,
            field = %name,
            kind = %kind,
            "duplicate field name in view, later definition skipped"
        );
        true
    }

    /// Replace the view's sets with its `dimensions_only` exposure set.
    pub fn set_exposure(&mut self, exposure: FieldExposureSet) {
        self.sets = vec![FieldSet {
            name: DIMENSIONS_ONLY_SET.to_string(),
            fields: exposure.into_fields(),
        }];
    }

    pub fn measure(&self, name: &str) -> Option<&ViewMeasure> {
        self.measures.iter().find(|m| m.name == name)
    }
}
