//! Immutable index of all semantic models and metrics for one run.

use std::collections::HashMap;

use crate::model::{Measure, Metric, SemanticModel};

/// Name-indexed view over the models and metrics of a generation run.
///
/// Built once per run and passed by reference to every component. Registry
/// order (the order models were supplied in) is preserved and is what
/// "first match" means wherever a lookup can have several candidates.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Vec<SemanticModel>,
    metrics: Vec<Metric>,

    /// Index: model name → position in `models`
    model_index: HashMap<String, usize>,

    /// Index: metric name → position in `metrics`
    metric_index: HashMap<String, usize>,

    /// Index: measure name → position of the first model declaring it
    measure_owner: HashMap<String, usize>,

    /// Index: primary entity name → positions of models keyed by it
    primary_entity_index: HashMap<String, Vec<usize>>,
}

impl ModelRegistry {
    /// Build the registry. Duplicate model or metric names keep the first
    /// definition.
    pub fn new(models: Vec<SemanticModel>, metrics: Vec<Metric>) -> Self {
        let mut model_index = HashMap::new();
        let mut measure_owner = HashMap::new();
        let mut primary_entity_index: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, model) in models.iter().enumerate() {
            if model_index.contains_key(&model.name) {
                tracing::warn!(model = %model.name, "duplicate semantic model ignored");
                continue;
            }
            model_index.insert(model.name.clone(), idx);

            for measure in &model.measures {
                measure_owner.entry(measure.name.clone()).or_insert(idx);
            }

            if let Some(primary) = model.primary_entity() {
                primary_entity_index
                    .entry(primary.name.clone())
                    .or_default()
                    .push(idx);
            }
        }

        let mut metric_index = HashMap::new();
        for (idx, metric) in metrics.iter().enumerate() {
            if metric_index.contains_key(&metric.name) {
                tracing::warn!(metric = %metric.name, "duplicate metric ignored");
                continue;
            }
            metric_index.insert(metric.name.clone(), idx);
        }

        Self {
            models,
            metrics,
            model_index,
            metric_index,
            measure_owner,
            primary_entity_index,
        }
    }

    /// All models, in registry order (duplicates skipped).
    pub fn models(&self) -> impl Iterator<Item = &SemanticModel> {
        self.models
            .iter()
            .enumerate()
            .filter(|(idx, m)| self.model_index.get(&m.name) == Some(idx))
            .map(|(_, m)| m)
    }

    /// All metrics, in registry order (duplicates skipped).
    pub fn metrics(&self) -> impl Iterator<Item = &Metric> {
        self.metrics
            .iter()
            .enumerate()
            .filter(|(idx, m)| self.metric_index.get(&m.name) == Some(idx))
            .map(|(_, m)| m)
    }

    pub fn model(&self, name: &str) -> Option<&SemanticModel> {
        self.model_index.get(name).map(|&idx| &self.models[idx])
    }

    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metric_index.get(name).map(|&idx| &self.metrics[idx])
    }

    /// The model declaring `measure`, together with the measure itself.
    pub fn measure_owner(&self, measure: &str) -> Option<(&SemanticModel, &Measure)> {
        let model = &self.models[*self.measure_owner.get(measure)?];
        model.measure(measure).map(|m| (model, m))
    }

    /// Every model whose primary entity is `entity`, in registry order.
    pub fn models_with_primary_entity(&self, entity: &str) -> Vec<&SemanticModel> {
        self.primary_entity_index
            .get(entity)
            .map(|idxs| idxs.iter().map(|&idx| &self.models[idx]).collect())
            .unwrap_or_default()
    }

    /// The first model whose primary entity is `entity`.
    pub fn model_for_primary_entity(&self, entity: &str) -> Option<&SemanticModel> {
        self.primary_entity_index
            .get(entity)
            .and_then(|idxs| idxs.first())
            .map(|&idx| &self.models[idx])
    }

    pub fn model_count(&self) -> usize {
        self.model_index.len()
    }

    pub fn metric_count(&self) -> usize {
        self.metric_index.len()
    }
}
