// src/model/metric.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A metric: business logic layered on top of measures or other metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    #[serde(flatten)]
    pub kind: MetricKind,
    /// Explicit owning entity; overrides inference when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Metric kind together with its kind-specific parameters.
///
/// Serialized as `type: <kind>` with the parameters under `type_params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "type_params", rename_all = "snake_case")]
pub enum MetricKind {
    Simple(SimpleParams),
    Ratio(RatioParams),
    Derived(DerivedParams),
    /// Conversion metrics are carried through untouched and cannot be synthesized
    Conversion(BTreeMap<String, serde_json::Value>),
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Simple(_) => "simple",
            MetricKind::Ratio(_) => "ratio",
            MetricKind::Derived(_) => "derived",
            MetricKind::Conversion(_) => "conversion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleParams {
    pub measure: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioParams {
    pub numerator: String,
    pub denominator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedParams {
    /// Formula over the aliases of `metrics`
    pub expr: String,
    #[serde(default)]
    pub metrics: Vec<MetricReference>,
}

/// A reference from a derived metric's formula to another metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReference {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_window: Option<String>,
}

impl MetricReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            offset_window: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_offset_window(mut self, window: impl Into<String>) -> Self {
        self.offset_window = Some(window.into());
        self
    }

    /// The token this reference appears as in the formula.
    pub fn formula_token(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl Metric {
    fn with_kind(name: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            kind,
            primary_entity: None,
            label: None,
            description: None,
        }
    }

    pub fn simple(name: impl Into<String>, measure: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            MetricKind::Simple(SimpleParams {
                measure: measure.into(),
            }),
        )
    }

    pub fn ratio(
        name: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            MetricKind::Ratio(RatioParams {
                numerator: numerator.into(),
                denominator: denominator.into(),
            }),
        )
    }

    pub fn derived(
        name: impl Into<String>,
        expr: impl Into<String>,
        metrics: Vec<MetricReference>,
    ) -> Self {
        Self::with_kind(
            name,
            MetricKind::Derived(DerivedParams {
                expr: expr.into(),
                metrics,
            }),
        )
    }

    pub fn conversion(name: impl Into<String>) -> Self {
        Self::with_kind(name, MetricKind::Conversion(BTreeMap::new()))
    }

    pub fn with_primary_entity(mut self, entity: impl Into<String>) -> Self {
        self.primary_entity = Some(entity.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
