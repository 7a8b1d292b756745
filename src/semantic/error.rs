//! Error and advisory result types for the semantic layer.
//!
//! - [`ResolveError`] is fatal. A metric that cannot be owned by a view or
//!   cannot be synthesized aborts the whole generation run.
//! - [`Eligibility`] is advisory. Dependency cycles, dangling references and
//!   cross-entity dependencies only mark a metric as ineligible for optional
//!   downstream features; they never fail a run.

use std::fmt;

/// Result type for metric resolution and synthesis.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Fatal errors raised while resolving or synthesizing a metric.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// Non-ratio metric without an explicit `primary_entity`.
    #[error("Metric '{metric}' has no primary_entity and its kind ({kind}) cannot infer one")]
    MissingPrimaryEntity { metric: String, kind: String },

    /// A measure referenced by a metric exists in no semantic model.
    #[error("Metric '{metric}' references unknown measure '{measure}'")]
    MeasureNotFound { metric: String, measure: String },

    /// The model that owns a metric's measure declares no primary entity.
    #[error("Metric '{metric}': semantic model '{model}' has no primary entity")]
    NoPrimaryEntityForModel { metric: String, model: String },

    /// The metric kind cannot be synthesized.
    #[error("Metric '{metric}' has unsupported kind '{kind}'")]
    UnsupportedMetricKind { metric: String, kind: String },

    /// A derived metric references a metric that is not registered.
    #[error("Metric '{metric}' references unknown metric '{reference}'")]
    MetricNotFound { metric: String, reference: String },

    /// Two references of a derived metric share a formula token but name
    /// different metrics.
    #[error("Metric '{metric}': alias '{alias}' refers to more than one metric")]
    AmbiguousAlias { metric: String, alias: String },

    /// A derived metric reference has an empty alias.
    #[error("Metric '{metric}': reference to '{reference}' has an empty alias")]
    EmptyAlias { metric: String, reference: String },

    /// No semantic model declares the resolved primary entity, so the metric
    /// has no view to live in.
    #[error("Metric '{metric}': no semantic model has primary entity '{entity}'")]
    NoModelForPrimaryEntity { metric: String, entity: String },
}

/// Outcome of the advisory dependency check for a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Every reachable leaf model shares the metric's primary entity.
    Eligible,
    /// The metric must not be used by cross-feature generation.
    Ineligible(IneligibleReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Why a metric was found ineligible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IneligibleReason {
    /// Metric references form a cycle; the path ends where it started.
    Cycle(Vec<String>),
    /// A referenced metric is not registered.
    MissingMetric(String),
    /// A referenced measure exists in no model.
    MissingMeasure(String),
    /// A leaf model is keyed by a different primary entity.
    MixedPrimaryEntity { model: String, entity: Option<String> },
    /// The metric's own primary entity could not be resolved.
    UnresolvedPrimaryEntity,
    /// Conversion metrics have no resolvable dependencies.
    Unsupported,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IneligibleReason::Cycle(path) => {
                write!(f, "cyclic metric references: {}", path.join(" -> "))
            }
            IneligibleReason::MissingMetric(name) => {
                write!(f, "references unknown metric '{}'", name)
            }
            IneligibleReason::MissingMeasure(name) => {
                write!(f, "references unknown measure '{}'", name)
            }
            IneligibleReason::MixedPrimaryEntity { model, entity } => match entity {
                Some(entity) => write!(
                    f,
                    "depends on model '{}' keyed by a different entity '{}'",
                    model, entity
                ),
                None => write!(f, "depends on model '{}' which has no primary entity", model),
            },
            IneligibleReason::UnresolvedPrimaryEntity => {
                write!(f, "primary entity could not be resolved")
            }
            IneligibleReason::Unsupported => write!(f, "metric kind has no dependency graph"),
        }
    }
}
