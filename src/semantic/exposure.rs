//! Field exposure through joins.
//!
//! A dimension view joined into a fact explore may only contribute its
//! entities and visible dimensions. Its measures stay out: aggregating a
//! joined view's measures across the fact's grain would fan out.

use std::collections::HashSet;

use crate::model::{DimensionKind, SemanticModel};

/// Name of the per-view set listing the exposable fields.
pub const DIMENSIONS_ONLY_SET: &str = "dimensions_only";

/// Ordered, de-duplicated field names a view exposes through a join.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldExposureSet {
    pub view: String,
    fields: Vec<String>,
}

impl FieldExposureSet {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

/// Computes exposure sets and the join `fields` constraint.
pub struct FieldExposureCalculator;

impl FieldExposureCalculator {
    /// Compute the exposure set of `model`'s view.
    ///
    /// Entities come first even though they render hidden, because join
    /// predicates must reference them. Time dimensions expand to one field
    /// per timeframe.
    pub fn exposure_for(model: &SemanticModel, view: &str) -> FieldExposureSet {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        let mut push = |name: String| {
            if seen.insert(name.clone()) {
                fields.push(name);
            }
        };

        for entity in &model.entities {
            push(entity.name.clone());
        }

        for dimension in model.dimensions.iter().filter(|d| !d.hidden) {
            match (dimension.kind, dimension.granularity()) {
                (DimensionKind::Time, Some(granularity)) => {
                    for timeframe in granularity.timeframes() {
                        push(format!("{}_{}", dimension.name, timeframe));
                    }
                }
                _ => push(dimension.name.clone()),
            }
        }

        FieldExposureSet {
            view: view.to_string(),
            fields,
        }
    }

    /// The `fields` constraint for a join onto `dimension_view`.
    pub fn join_fields(dimension_view: &str) -> Vec<String> {
        vec![format!("{}.{}*", dimension_view, DIMENSIONS_ONLY_SET)]
    }
}
