//! Join discovery between generated views.
//!
//! A fact model joins a dimension model when one of the fact's foreign
//! entities names the dimension's primary entity. Joins are one hop from the
//! fact: a fact with several matching foreign keys gets several sibling joins,
//! never a transitive chain.

use crate::model::{Cardinality, SemanticModel};

use super::naming::Naming;
use super::registry::ModelRegistry;

/// A join from a fact view to a dimension view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEdge {
    pub fact_view: String,
    pub dimension_view: String,
    /// Entity name shared by both sides
    pub key: String,
    pub relationship: Cardinality,
    /// `${fact.key} = ${dimension.key}`
    pub sql_on: String,
}

impl JoinEdge {
    /// Does this join multiply fact rows?
    pub fn causes_fanout(&self) -> bool {
        self.relationship.causes_fanout()
    }
}

/// Discovers the joins available from a fact model.
pub struct JoinGraphBuilder<'a> {
    registry: &'a ModelRegistry,
    naming: &'a Naming,
}

impl<'a> JoinGraphBuilder<'a> {
    pub fn new(registry: &'a ModelRegistry, naming: &'a Naming) -> Self {
        Self { registry, naming }
    }

    /// Build the join edges for one fact model, in foreign-entity order.
    ///
    /// Foreign keys with no matching primary entity are skipped. When several
    /// models share the matching primary entity the first in registry order
    /// is joined and the others are reported with a warning.
    pub fn joins_for(&self, fact: &SemanticModel) -> Vec<JoinEdge> {
        let fact_view = self.naming.view_name(&fact.name);
        let mut edges = Vec::new();

        for entity in fact.foreign_entities() {
            let candidates: Vec<&SemanticModel> = self
                .registry
                .models_with_primary_entity(&entity.name)
                .into_iter()
                .filter(|m| m.name != fact.name)
                .collect();

            let Some(target) = candidates.first() else {
                tracing::debug!(
                    fact = %fact.name,
                    key = %entity.name,
                    "no model with matching primary entity, foreign key not joined"
                );
                continue;
            };

            if candidates.len() > 1 {
                let ignored: Vec<&str> = candidates[1..].iter().map(|m| m.name.as_str()).collect();
                tracing::warn!(
                    fact = %fact.name,
                    key = %entity.name,
                    joined = %target.name,
                    ignored = %ignored.join(", "),
                    "several models share primary entity, joining the first"
                );
            }

            let dimension_view = self.naming.view_name(&target.name);
            edges.push(JoinEdge {
                sql_on: join_predicate(&fact_view, &dimension_view, &entity.name),
                fact_view: fact_view.clone(),
                dimension_view,
                key: entity.name.clone(),
                relationship: Cardinality::ManyToOne,
            });
        }

        edges
    }
}

fn join_predicate(fact_view: &str, dimension_view: &str, key: &str) -> String {
    format!(
        "${{{}.{}}} = ${{{}.{}}}",
        fact_view, key, dimension_view, key
    )
}
