//! Source-DSL model types: semantic models and metrics.
//!
//! These are the read-only inputs of a generation run. They are produced by
//! [`loader`] (or constructed directly by callers and tests) and never mutated
//! by the resolver.

pub mod loader;
pub mod metric;
pub mod semantic_model;
pub mod types;

pub use metric::{DerivedParams, Metric, MetricKind, MetricReference, RatioParams, SimpleParams};
pub use semantic_model::{Dimension, DimensionTypeParams, Entity, Measure, SemanticModel};
pub use types::{AggregationKind, Cardinality, DimensionKind, EntityKind, TimeGranularity};
