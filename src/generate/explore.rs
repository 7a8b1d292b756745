//! Explore assembly.
//!
//! One explore per fact model: the fact's view plus one join per edge the
//! [`JoinGraphBuilder`] finds. Every join is restricted to the joined view's
//! `dimensions_only` set.

use serde::Serialize;

use crate::model::{Cardinality, SemanticModel};
use crate::semantic::{
    FieldExposureCalculator, JoinEdge, JoinGraphBuilder, ModelRegistry, Naming, SynthesizedMetric,
};

use super::view::View;
use super::{GenerateError, GenerateResult};

/// The cross-model explores file.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExploresFile {
    pub explores: Vec<Explore>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explore {
    pub name: String,
    /// Base view, when it differs from the explore name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_name: Option<String>,
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Join {
    pub name: String,
    pub relationship: Cardinality,
    pub sql_on: String,
    pub fields: Vec<String>,
}

impl From<JoinEdge> for Join {
    fn from(edge: JoinEdge) -> Self {
        Self {
            fields: FieldExposureCalculator::join_fields(&edge.dimension_view),
            name: edge.dimension_view,
            relationship: edge.relationship,
            sql_on: edge.sql_on,
        }
    }
}

/// Composes join edges and metric measures into explores and views.
pub struct ExploreAssembler<'a> {
    registry: &'a ModelRegistry,
    naming: &'a Naming,
    joins: JoinGraphBuilder<'a>,
}

impl<'a> ExploreAssembler<'a> {
    pub fn new(registry: &'a ModelRegistry, naming: &'a Naming) -> Self {
        Self {
            registry,
            naming,
            joins: JoinGraphBuilder::new(registry, naming),
        }
    }

    /// Resolve the fact models to build explores for.
    ///
    /// An empty request selects every model with at least one foreign
    /// entity, in registry order.
    pub fn fact_models(&self, requested: &[String]) -> GenerateResult<Vec<&'a SemanticModel>> {
        if requested.is_empty() {
            return Ok(self
                .registry
                .models()
                .filter(|m| m.foreign_entities().next().is_some())
                .collect());
        }

        requested
            .iter()
            .map(|name| {
                self.registry
                    .model(name)
                    .ok_or_else(|| GenerateError::UnknownFactModel(name.clone()))
            })
            .collect()
    }

    /// Build the explore for one fact model.
    pub fn explore_for(&self, fact: &SemanticModel) -> Explore {
        let name = self.naming.explore_name(&fact.name);
        let view_name = self.naming.view_name(&fact.name);
        let joins: Vec<Join> = self.joins.joins_for(fact).into_iter().map(Join::from).collect();

        tracing::debug!(explore = %name, joins = joins.len(), "assembled explore");

        Explore {
            view_name: (view_name != name).then_some(view_name),
            name,
            joins,
        }
    }

    /// Build explores for every fact model.
    pub fn explores(&self, facts: &[&SemanticModel]) -> ExploresFile {
        ExploresFile {
            explores: facts.iter().map(|f| self.explore_for(f)).collect(),
        }
    }

    /// Append each synthesized metric to the view it resolved to.
    ///
    /// Must run before exposure sets are computed so metric measures are
    /// never counted as exposable fields.
    pub fn attach_metrics(views: &mut [View], metrics: Vec<SynthesizedMetric>) {
        for metric in metrics {
            match views.iter_mut().find(|v| v.name == metric.view) {
                Some(view) => view.push_metric(metric),
                None => tracing::warn!(
                    metric = %metric.name,
                    view = %metric.view,
                    "metric resolved to a view that was not generated"
                ),
            }
        }
    }
}
