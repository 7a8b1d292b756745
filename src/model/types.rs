//! Enumerations shared across the model types.

use serde::{Deserialize, Serialize};

/// Role an entity plays in its semantic model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// The identity key the model exposes for others to join against.
    Primary,
    /// A key pointing at another model's primary entity.
    Foreign,
    /// A unique key that is not the model's identity.
    Unique,
}

/// Kind of dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    Categorical,
    Time,
}

/// Aggregation applied by a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    Count,
    CountDistinct,
    Sum,
    Average,
    Min,
    Max,
    Median,
}

impl AggregationKind {
    /// Measure type name in the target DSL.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationKind::Count => "count",
            AggregationKind::CountDistinct => "count_distinct",
            AggregationKind::Sum => "sum",
            AggregationKind::Average => "average",
            AggregationKind::Min => "min",
            AggregationKind::Max => "max",
            AggregationKind::Median => "median",
        }
    }
}

impl std::fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Smallest grain a time dimension is recorded at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGranularity {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeGranularity {
    /// Timeframes a dimension group exposes at this granularity.
    ///
    /// Coarser timeframes are always derivable from finer ones, so the list
    /// starts at the granularity and runs up to `year`.
    pub fn timeframes(&self) -> &'static [&'static str] {
        match self {
            TimeGranularity::Hour => &["time", "hour", "date", "week", "month", "quarter", "year"],
            TimeGranularity::Day => &["date", "week", "month", "quarter", "year"],
            TimeGranularity::Week => &["week", "month", "quarter", "year"],
            TimeGranularity::Month => &["month", "quarter", "year"],
            TimeGranularity::Quarter => &["quarter", "year"],
            TimeGranularity::Year => &["year"],
        }
    }
}

/// Cardinality of a join between two views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Cardinality {
    /// Returns true if joining in this direction can multiply rows.
    pub fn causes_fanout(&self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }

    /// Relationship keyword in the target DSL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "one_to_one",
            Cardinality::OneToMany => "one_to_many",
            Cardinality::ManyToOne => "many_to_one",
            Cardinality::ManyToMany => "many_to_many",
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
