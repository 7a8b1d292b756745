//! Formula synthesis for resolved metrics.
//!
//! Each metric becomes a measure on its primary-entity view. Fields that
//! live on the same view are referenced bare (`${gov_measure}`); fields on
//! another view are qualified (`${rentals.gov_measure}`) and collected in
//! `required_fields` so the renderer can make them selectable alongside the
//! metric.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;

use crate::model::{AggregationKind, Metric, MetricKind, MetricReference, SemanticModel};

use super::error::{ResolveError, ResolveResult};
use super::naming::Naming;
use super::resolver::{MetricResolver, ResolvedMetric};

/// How a synthesized measure aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureType {
    /// Direct passthrough of a same-view measure's aggregation
    Aggregate(AggregationKind),
    /// Arithmetic over other measures
    Number,
}

impl MeasureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureType::Aggregate(agg) => agg.as_str(),
            MeasureType::Number => "number",
        }
    }
}

/// A metric ready to be rendered as a measure.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedMetric {
    pub name: String,
    /// View the measure is attached to
    pub view: String,
    pub primary_entity: String,
    pub measure_type: MeasureType,
    pub sql: String,
    /// Qualified `view.field` names referenced from other views, de-duplicated
    pub required_fields: Vec<String>,
    pub label: Option<String>,
    pub description: Option<String>,
}

/// Synthesizes formula text for resolved metrics.
pub struct SqlSynthesizer<'a> {
    resolver: &'a MetricResolver<'a>,
    naming: &'a Naming,
}

impl<'a> SqlSynthesizer<'a> {
    pub fn new(resolver: &'a MetricResolver<'a>, naming: &'a Naming) -> Self {
        Self { resolver, naming }
    }

    /// Synthesize one resolved metric.
    pub fn synthesize(&self, resolved: &ResolvedMetric<'_>) -> ResolveResult<SynthesizedMetric> {
        let metric = resolved.metric;
        let entity = resolved.primary_entity.as_str();
        let view = self.view_for_entity(&metric.name, entity)?;

        let (measure_type, sql, required_fields) = match &metric.kind {
            MetricKind::Simple(params) => self.simple(metric, &params.measure, entity)?,
            MetricKind::Ratio(params) => {
                let mut required = BTreeSet::new();
                let numerator = self.measure_ref(metric, &params.numerator, entity, &mut required)?;
                let denominator =
                    self.measure_ref(metric, &params.denominator, entity, &mut required)?;
                (
                    MeasureType::Number,
                    format!("1.0 * {} / NULLIF({}, 0)", numerator, denominator),
                    required.into_iter().collect(),
                )
            }
            MetricKind::Derived(params) => {
                let (sql, required) = self.derived(metric, &params.expr, &params.metrics, entity)?;
                (MeasureType::Number, sql, required)
            }
            MetricKind::Conversion(_) => {
                return Err(ResolveError::UnsupportedMetricKind {
                    metric: metric.name.clone(),
                    kind: metric.kind.as_str().to_string(),
                });
            }
        };

        Ok(SynthesizedMetric {
            name: metric.name.clone(),
            view,
            primary_entity: entity.to_string(),
            measure_type,
            sql,
            required_fields,
            label: metric.label.clone(),
            description: metric.description.clone(),
        })
    }

    /// A simple metric on its measure's own view passes the aggregation
    /// straight through; anywhere else it wraps the measure's hidden field.
    fn simple(
        &self,
        metric: &Metric,
        measure: &str,
        entity: &str,
    ) -> ResolveResult<(MeasureType, String, Vec<String>)> {
        let (owner, measure) = self.owner_of(metric, measure)?;

        if is_same_entity(owner, entity) {
            self.warn_if_shadowed(metric, owner, entity);
            return Ok((MeasureType::Aggregate(measure.agg), measure.sql(), Vec::new()));
        }

        let field = format!(
            "{}.{}",
            self.naming.view_name(&owner.name),
            measure.view_field_name()
        );
        Ok((MeasureType::Number, format!("${{{}}}", field), vec![field]))
    }

    /// Reference to a measure's hidden field, bare or view-qualified.
    fn measure_ref(
        &self,
        metric: &Metric,
        measure: &str,
        entity: &str,
        required: &mut BTreeSet<String>,
    ) -> ResolveResult<String> {
        let (owner, measure) = self.owner_of(metric, measure)?;

        if is_same_entity(owner, entity) {
            self.warn_if_shadowed(metric, owner, entity);
            return Ok(format!("${{{}}}", measure.view_field_name()));
        }

        let field = format!(
            "{}.{}",
            self.naming.view_name(&owner.name),
            measure.view_field_name()
        );
        let reference = format!("${{{}}}", field);
        required.insert(field);
        Ok(reference)
    }

    /// Substitute every alias in a derived formula in a single pass, so a
    /// replacement is never rewritten by a later alias.
    fn derived(
        &self,
        metric: &Metric,
        expr: &str,
        references: &[MetricReference],
        entity: &str,
    ) -> ResolveResult<(String, Vec<String>)> {
        // token -> (replacement, foreign field if any)
        let mut substitutions: HashMap<&str, (String, Option<String>)> = HashMap::new();
        // token -> referenced metric name
        let mut targets: HashMap<&str, &str> = HashMap::new();

        for reference in references {
            let token = reference.formula_token();
            if token.trim().is_empty() {
                return Err(ResolveError::EmptyAlias {
                    metric: metric.name.clone(),
                    reference: reference.name.clone(),
                });
            }
            match targets.get(token) {
                Some(&existing) if existing == reference.name => continue,
                Some(_) => {
                    return Err(ResolveError::AmbiguousAlias {
                        metric: metric.name.clone(),
                        alias: token.to_string(),
                    });
                }
                None => {
                    targets.insert(token, reference.name.as_str());
                }
            }

            let target = self.resolver.registry().metric(&reference.name).ok_or_else(|| {
                ResolveError::MetricNotFound {
                    metric: metric.name.clone(),
                    reference: reference.name.clone(),
                }
            })?;
            let target_entity = self.resolver.primary_entity(target)?;

            let substitution = if target_entity == entity {
                (format!("${{{}}}", target.name), None)
            } else {
                let field = format!(
                    "{}.{}",
                    self.view_for_entity(&target.name, &target_entity)?,
                    target.name
                );
                (format!("${{{}}}", field), Some(field))
            };
            substitutions.insert(token, substitution);
        }

        if substitutions.is_empty() {
            return Ok((expr.to_string(), Vec::new()));
        }

        let mut tokens: Vec<&str> = substitutions.keys().copied().collect();
        // Longest first so `gov_lw` is not matched as `gov`
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let pattern = tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let token_pattern = Regex::new(&format!(r"\b(?:{})\b", pattern))
            .expect("escaped alternation is a valid pattern");

        let mut required = Vec::new();
        let sql = token_pattern.replace_all(expr, |caps: &regex::Captures<'_>| {
            let (replacement, field) = &substitutions[&caps[0]];
            if let Some(field) = field {
                if !required.contains(field) {
                    required.push(field.clone());
                }
            }
            replacement.clone()
        });

        Ok((sql.into_owned(), required))
    }

    fn owner_of(
        &self,
        metric: &Metric,
        measure: &str,
    ) -> ResolveResult<(&'a SemanticModel, &'a crate::model::Measure)> {
        self.resolver
            .registry()
            .measure_owner(measure)
            .ok_or_else(|| ResolveError::MeasureNotFound {
                metric: metric.name.clone(),
                measure: measure.to_string(),
            })
    }

    /// Warn when `owner` shares the metric's entity but is not the model the
    /// metric lands on; the reference then reads the landing view's table.
    /// Returns whether a warning was emitted.
    fn warn_if_shadowed(&self, metric: &Metric, owner: &SemanticModel, entity: &str) -> bool {
        let Some(landing) = self.resolver.registry().model_for_primary_entity(entity) else {
            return false;
        };
        if landing.name == owner.name {
            return false;
        }
        tracing::warn!(
            metric = %metric.name,
            measure_model = %owner.name,
            landing_model = %landing.name,
            entity = %entity,
            "measure's model shares the primary entity with another model; \
             the metric is attached to the first one"
        );
        true
    }

    /// View of the first model keyed by `entity`.
    fn view_for_entity(&self, metric: &str, entity: &str) -> ResolveResult<String> {
        self.resolver
            .registry()
            .model_for_primary_entity(entity)
            .map(|m| self.naming.view_name(&m.name))
            .ok_or_else(|| ResolveError::NoModelForPrimaryEntity {
                metric: metric.to_string(),
                entity: entity.to_string(),
            })
    }
}

fn is_same_entity(model: &SemanticModel, entity: &str) -> bool {
    model.primary_entity().map(|e| e.name.as_str()) == Some(entity)
}
