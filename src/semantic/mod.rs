//! Semantic graph resolution.
//!
//! This module holds the algorithmic core of generation:
//!
//! 1. **Registry** - Index models, measures and metrics by name
//! 2. **Join graph** - Discover fact → dimension joins via entity keys
//! 3. **Exposure** - Compute the fields a view may expose through a join
//! 4. **Resolve** - Find each metric's primary entity and check its
//!    dependencies
//! 5. **Synthesize** - Produce formula text and cross-view required fields
//!
//! Everything here is a pure function of the registry: no I/O and no shared
//! mutable state, so independent runs can execute in parallel.

pub mod error;
pub mod exposure;
pub mod join_graph;
pub mod naming;
pub mod registry;
pub mod resolver;
pub mod synth;

pub use error::{Eligibility, IneligibleReason, ResolveError, ResolveResult};
pub use exposure::{FieldExposureCalculator, FieldExposureSet, DIMENSIONS_ONLY_SET};
pub use join_graph::{JoinEdge, JoinGraphBuilder};
pub use naming::Naming;
pub use registry::ModelRegistry;
pub use resolver::{DependencyGraph, MetricResolver, ResolvedMetric};
pub use synth::{MeasureType, SqlSynthesizer, SynthesizedMetric};
