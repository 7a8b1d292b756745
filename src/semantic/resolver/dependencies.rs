//! Metric dependency graph.
//!
//! Nodes are metrics and the semantic models their measures live in. Edges
//! point from a metric to what it is computed from:
//!
//! - derived → every referenced metric (by name, not alias)
//! - ratio → the models owning its numerator and denominator
//! - simple → the model owning its measure
//!
//! References that cannot be resolved become dedicated "missing" nodes so
//! the traversal can report them instead of failing.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::model::{Metric, MetricKind, SemanticModel};
use crate::semantic::error::IneligibleReason;
use crate::semantic::registry::ModelRegistry;

/// A node in the dependency graph.
#[derive(Debug, Clone, Copy)]
pub enum DependencyNode<'a> {
    Metric(&'a Metric),
    Model(&'a SemanticModel),
    MissingMetric(&'a str),
    MissingMeasure(&'a str),
}

impl DependencyNode<'_> {
    pub fn name(&self) -> &str {
        match self {
            DependencyNode::Metric(m) => &m.name,
            DependencyNode::Model(m) => &m.name,
            DependencyNode::MissingMetric(name) | DependencyNode::MissingMeasure(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Directed graph of metric → metric/model dependencies.
#[derive(Debug, Clone)]
pub struct DependencyGraph<'a> {
    graph: DiGraph<DependencyNode<'a>, ()>,

    /// Index: metric name → NodeIndex
    metric_index: HashMap<&'a str, NodeIndex>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the graph for every metric in the registry.
    pub fn build(registry: &'a ModelRegistry) -> Self {
        let mut graph = DiGraph::new();
        let mut metric_index = HashMap::new();
        let mut model_index = HashMap::new();

        for metric in registry.metrics() {
            let idx = graph.add_node(DependencyNode::Metric(metric));
            metric_index.insert(metric.name.as_str(), idx);
        }

        let mut builder = Self {
            graph,
            metric_index,
        };

        for metric in registry.metrics() {
            let from = builder.metric_index[metric.name.as_str()];
            match &metric.kind {
                MetricKind::Simple(params) => {
                    let to = builder.measure_node(registry, &params.measure, &mut model_index);
                    builder.graph.add_edge(from, to, ());
                }
                MetricKind::Ratio(params) => {
                    for measure in [&params.numerator, &params.denominator] {
                        let to = builder.measure_node(registry, measure, &mut model_index);
                        builder.graph.add_edge(from, to, ());
                    }
                }
                MetricKind::Derived(params) => {
                    for reference in &params.metrics {
                        let to = match builder.metric_index.get(reference.name.as_str()) {
                            Some(&idx) => idx,
                            None => builder
                                .graph
                                .add_node(DependencyNode::MissingMetric(&reference.name)),
                        };
                        builder.graph.add_edge(from, to, ());
                    }
                }
                MetricKind::Conversion(_) => {}
            }
        }

        builder
    }

    fn measure_node(
        &mut self,
        registry: &'a ModelRegistry,
        measure: &'a str,
        model_index: &mut HashMap<&'a str, NodeIndex>,
    ) -> NodeIndex {
        match registry.measure_owner(measure) {
            Some((model, _)) => *model_index
                .entry(model.name.as_str())
                .or_insert_with(|| self.graph.add_node(DependencyNode::Model(model))),
            None => self.graph.add_node(DependencyNode::MissingMeasure(measure)),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Models `metric` ultimately aggregates over, in first-visit order.
    ///
    /// Walks the graph depth-first with white/gray/black colouring. Reaching a
    /// gray node means a reference cycle; reaching a missing node means a
    /// dangling reference. Both are reported as an [`IneligibleReason`]
    /// rather than an error.
    pub fn leaf_models(&self, metric: &str) -> Result<Vec<&'a SemanticModel>, IneligibleReason> {
        let Some(&start) = self.metric_index.get(metric) else {
            return Err(IneligibleReason::MissingMetric(metric.to_string()));
        };

        let mut colors = vec![Color::White; self.graph.node_count()];
        let mut stack = Vec::new();
        let mut leaves = Vec::new();
        self.visit(start, &mut colors, &mut stack, &mut leaves)?;
        Ok(leaves)
    }

    /// The reference cycle through `metric`'s dependencies, if any.
    pub fn find_cycle(&self, metric: &str) -> Option<Vec<String>> {
        match self.leaf_models(metric) {
            Err(IneligibleReason::Cycle(path)) => Some(path),
            _ => None,
        }
    }

    fn visit(
        &self,
        idx: NodeIndex,
        colors: &mut [Color],
        stack: &mut Vec<NodeIndex>,
        leaves: &mut Vec<&'a SemanticModel>,
    ) -> Result<(), IneligibleReason> {
        match self.graph[idx] {
            DependencyNode::Model(model) => {
                leaves.push(model);
                colors[idx.index()] = Color::Black;
                return Ok(());
            }
            DependencyNode::MissingMetric(name) => {
                return Err(IneligibleReason::MissingMetric(name.to_string()));
            }
            DependencyNode::MissingMeasure(name) => {
                return Err(IneligibleReason::MissingMeasure(name.to_string()));
            }
            DependencyNode::Metric(metric) => {
                if matches!(metric.kind, MetricKind::Conversion(_)) {
                    return Err(IneligibleReason::Unsupported);
                }
            }
        }

        colors[idx.index()] = Color::Gray;
        stack.push(idx);

        for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
            match colors[next.index()] {
                Color::Gray => {
                    let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                    let mut path: Vec<String> = stack[start..]
                        .iter()
                        .map(|&n| self.graph[n].name().to_string())
                        .collect();
                    path.push(self.graph[next].name().to_string());
                    return Err(IneligibleReason::Cycle(path));
                }
                Color::White => self.visit(next, colors, stack, leaves)?,
                Color::Black => {}
            }
        }

        stack.pop();
        colors[idx.index()] = Color::Black;
        Ok(())
    }
}
