// src/model/semantic_model.rs
use crate::model::types::{AggregationKind, DimensionKind, EntityKind, TimeGranularity};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// A bare column name, as opposed to a SQL expression
static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Placeholder the target DSL substitutes with the view's table
const TABLE_REF: &str = "${TABLE}";

/// SQL for a field: bare column names are qualified with the view's table,
/// anything else is passed through untouched.
fn column_sql(expr: Option<&str>, name: &str) -> String {
    let expr = expr.map(str::trim).unwrap_or(name);
    if IDENTIFIER_PATTERN.is_match(expr) {
        format!("{}.{}", TABLE_REF, expr)
    } else {
        expr.to_string()
    }
}

/// A semantic model: one warehouse table described by its entities,
/// dimensions and measures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticModel {
    pub name: String,
    /// Table reference, either `ref('name')` or a relation such as `schema.table`
    #[serde(rename = "model")]
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub measures: Vec<Measure>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, String>,
}

impl SemanticModel {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            description: None,
            entities: Vec::new(),
            dimensions: Vec::new(),
            measures: Vec::new(),
            defaults: BTreeMap::new(),
        }
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    /// The model's primary entity, if it declares one.
    pub fn primary_entity(&self) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.kind == EntityKind::Primary)
    }

    /// Foreign entities in declaration order.
    pub fn foreign_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(|e| e.kind == EntityKind::Foreign)
    }

    /// Look up a measure by name.
    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == name)
    }
}

/// An entity (join key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
}

impl Entity {
    pub fn primary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Primary,
            expr: None,
        }
    }

    pub fn foreign(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Foreign,
            expr: None,
        }
    }

    pub fn unique(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Unique,
            expr: None,
        }
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn sql(&self) -> String {
        column_sql(self.expr.as_deref(), &self.name)
    }
}

/// Extra parameters for time dimensions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DimensionTypeParams {
    #[serde(default)]
    pub time_granularity: Option<TimeGranularity>,
}

/// A dimension (attribute to group or filter by).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DimensionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_params: Option<DimensionTypeParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Hidden dimensions are rendered but never exposed through joins
    #[serde(default)]
    pub hidden: bool,
}

impl Dimension {
    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DimensionKind::Categorical,
            expr: None,
            type_params: None,
            label: None,
            description: None,
            hidden: false,
        }
    }

    pub fn time(name: impl Into<String>, granularity: TimeGranularity) -> Self {
        Self {
            name: name.into(),
            kind: DimensionKind::Time,
            expr: None,
            type_params: Some(DimensionTypeParams {
                time_granularity: Some(granularity),
            }),
            label: None,
            description: None,
            hidden: false,
        }
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn sql(&self) -> String {
        column_sql(self.expr.as_deref(), &self.name)
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Granularity of a time dimension, defaulting to day.
    ///
    /// Returns `None` for categorical dimensions.
    pub fn granularity(&self) -> Option<TimeGranularity> {
        match self.kind {
            DimensionKind::Categorical => None,
            DimensionKind::Time => Some(
                self.type_params
                    .as_ref()
                    .and_then(|p| p.time_granularity)
                    .unwrap_or_default(),
            ),
        }
    }
}

/// A measure (pre-defined aggregation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub name: String,
    pub agg: AggregationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Measure {
    pub fn new(name: impl Into<String>, agg: AggregationKind) -> Self {
        Self {
            name: name.into(),
            agg,
            expr: None,
            label: None,
            description: None,
        }
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn sql(&self) -> String {
        column_sql(self.expr.as_deref(), &self.name)
    }

    /// Name of the hidden measure this one is rendered as in its view.
    pub fn view_field_name(&self) -> String {
        format!("{}_measure", self.name)
    }
}
