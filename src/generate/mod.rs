//! End-to-end generation from semantic models to views and explores.
//!
//! ```text
//! Models + Metrics → Registry → Resolve → Synthesize → Views + Explores
//! ```
//!
//! # Example
//!
//! ```ignore
//! use semlink::generate::{generate, GenerateOptions};
//! use semlink::semantic::ModelRegistry;
//!
//! let registry = ModelRegistry::new(models, metrics);
//! let options = GenerateOptions::default().with_schema("analytics");
//! let project = generate(&registry, &options)?;
//! for view in &project.views {
//!     println!("{}: {} measures", view.name, view.measures.len());
//! }
//! ```

pub mod explore;
pub mod view;

pub use explore::{Explore, ExploreAssembler, ExploresFile, Join};
pub use view::{DimensionGroup, FieldSet, View, ViewDimension, ViewMeasure};

use crate::semantic::{
    Eligibility, FieldExposureCalculator, MetricResolver, ModelRegistry, Naming, ResolveError,
    SqlSynthesizer,
};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that abort a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Metric resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Fact model not found: {0}")]
    UnknownFactModel(String),
}

pub type GenerateResult<T> = Result<T, GenerateError>;

// ============================================================================
// Options
// ============================================================================

/// Options for generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Schema `ref('...')` table references resolve into.
    pub schema: String,
    pub naming: Naming,
    /// Models to build explores for; empty selects every model with a
    /// foreign entity.
    pub fact_models: Vec<String>,
}

impl GenerateOptions {
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_fact_models(mut self, fact_models: Vec<String>) -> Self {
        self.fact_models = fact_models;
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Everything one run hands to the renderer.
#[derive(Debug, Clone)]
pub struct GeneratedProject {
    pub views: Vec<View>,
    pub explores: ExploresFile,
    /// Advisory dependency check per metric, in registry order
    pub eligibility: Vec<(String, Eligibility)>,
}

impl GeneratedProject {
    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name == name)
    }

    pub fn explore(&self, name: &str) -> Option<&Explore> {
        self.explores.explores.iter().find(|e| e.name == name)
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Generate views and explores for every model in the registry.
///
/// The first metric that cannot be resolved or synthesized aborts the run:
/// any view may reference any metric, so partial output is not useful.
pub fn generate(
    registry: &ModelRegistry,
    options: &GenerateOptions,
) -> GenerateResult<GeneratedProject> {
    let naming = &options.naming;

    // Step 1: Translate models to views
    let mut views: Vec<View> = registry
        .models()
        .map(|m| View::from_model(m, naming.view_name(&m.name), &options.schema))
        .collect();

    // Step 2: Resolve and synthesize metrics
    let resolver = MetricResolver::new(registry);
    let synthesizer = SqlSynthesizer::new(&resolver, naming);
    let resolved = resolver.resolve_all()?;

    let mut synthesized = Vec::with_capacity(resolved.len());
    for metric in &resolved {
        synthesized.push(synthesizer.synthesize(metric)?);
    }

    let eligibility = resolved
        .into_iter()
        .map(|r| (r.metric.name.clone(), r.eligibility))
        .collect();

    // Step 3: Attach metric measures, then compute exposure sets
    ExploreAssembler::attach_metrics(&mut views, synthesized);
    for (view, model) in views.iter_mut().zip(registry.models()) {
        let exposure = FieldExposureCalculator::exposure_for(model, &view.name);
        view.set_exposure(exposure);
    }

    // Step 4: Explores for fact models
    let assembler = ExploreAssembler::new(registry, naming);
    let facts = assembler.fact_models(&options.fact_models)?;
    let explores = assembler.explores(&facts);

    tracing::info!(
        views = views.len(),
        explores = explores.explores.len(),
        metrics = registry.metric_count(),
        "generation complete"
    );

    Ok(GeneratedProject {
        views,
        explores,
        eligibility,
    })
}
