//! Metric resolution: owning entity and dependency eligibility.
//!
//! Every metric is rendered as a measure on exactly one view, the view of the
//! model keyed by the metric's primary entity. Resolution order:
//!
//! 1. an explicit `primary_entity` is used verbatim;
//! 2. a ratio metric inherits the primary entity of the model owning its
//!    denominator;
//! 3. any other metric without an override is a fatal error.
//!
//! Independently, [`MetricResolver::eligibility`] walks the dependency graph
//! and reports whether everything the metric aggregates over is keyed by the
//! same entity. That check is advisory and never fails.

pub mod dependencies;

use crate::model::{Metric, MetricKind};

use super::error::{Eligibility, IneligibleReason, ResolveError, ResolveResult};
use super::registry::ModelRegistry;

pub use dependencies::{DependencyGraph, DependencyNode};

/// A metric whose owning entity is known.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMetric<'a> {
    pub metric: &'a Metric,
    pub primary_entity: String,
    pub eligibility: Eligibility,
}

/// Resolves metric ownership against a registry.
pub struct MetricResolver<'a> {
    registry: &'a ModelRegistry,
    dependencies: DependencyGraph<'a>,
}

impl<'a> MetricResolver<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self {
            registry,
            dependencies: DependencyGraph::build(registry),
        }
    }

    pub fn registry(&self) -> &'a ModelRegistry {
        self.registry
    }

    pub fn dependencies(&self) -> &DependencyGraph<'a> {
        &self.dependencies
    }

    /// Resolve the primary entity of `metric`.
    pub fn primary_entity(&self, metric: &Metric) -> ResolveResult<String> {
        if let Some(entity) = &metric.primary_entity {
            return Ok(entity.clone());
        }

        match &metric.kind {
            MetricKind::Ratio(params) => {
                let (model, _) = self
                    .registry
                    .measure_owner(&params.denominator)
                    .ok_or_else(|| ResolveError::MeasureNotFound {
                        metric: metric.name.clone(),
                        measure: params.denominator.clone(),
                    })?;

                model
                    .primary_entity()
                    .map(|e| e.name.clone())
                    .ok_or_else(|| ResolveError::NoPrimaryEntityForModel {
                        metric: metric.name.clone(),
                        model: model.name.clone(),
                    })
            }
            MetricKind::Simple(_) | MetricKind::Derived(_) | MetricKind::Conversion(_) => {
                Err(ResolveError::MissingPrimaryEntity {
                    metric: metric.name.clone(),
                    kind: metric.kind.as_str().to_string(),
                })
            }
        }
    }

    /// Check whether every model `metric` depends on shares its primary
    /// entity. Cycles and dangling references make the metric ineligible.
    pub fn eligibility(&self, metric: &Metric) -> Eligibility {
        let leaves = match self.dependencies.leaf_models(&metric.name) {
            Ok(leaves) => leaves,
            Err(reason) => return Eligibility::Ineligible(reason),
        };

        let Ok(entity) = self.primary_entity(metric) else {
            return Eligibility::Ineligible(IneligibleReason::UnresolvedPrimaryEntity);
        };

        for model in leaves {
            let leaf_entity = model.primary_entity().map(|e| e.name.as_str());
            if leaf_entity != Some(entity.as_str()) {
                return Eligibility::Ineligible(IneligibleReason::MixedPrimaryEntity {
                    model: model.name.clone(),
                    entity: leaf_entity.map(str::to_string),
                });
            }
        }

        Eligibility::Eligible
    }

    /// Resolve one metric.
    pub fn resolve(&self, metric: &'a Metric) -> ResolveResult<ResolvedMetric<'a>> {
        let primary_entity = self.primary_entity(metric)?;
        let eligibility = self.eligibility(metric);

        if let Eligibility::Ineligible(reason) = &eligibility {
            tracing::warn!(
                metric = %metric.name,
                %reason,
                "metric is not eligible for cross-feature generation"
            );
        }

        Ok(ResolvedMetric {
            metric,
            primary_entity,
            eligibility,
        })
    }

    /// Resolve every registered metric, stopping at the first fatal error.
    pub fn resolve_all(&self) -> ResolveResult<Vec<ResolvedMetric<'a>>> {
        self.registry.metrics().map(|m| self.resolve(m)).collect()
    }
}
