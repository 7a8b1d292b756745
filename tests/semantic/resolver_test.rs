//! Integration tests for metric resolution and dependency eligibility.

use semlink::model::{AggregationKind, Entity, Measure, Metric, MetricReference, SemanticModel};
use semlink::semantic::{
    Eligibility, IneligibleReason, MetricResolver, ModelRegistry, Naming, ResolveError,
    SqlSynthesizer,
};

fn models() -> Vec<SemanticModel> {
    vec![
        SemanticModel::new("rentals", "ref('rentals')")
            .with_entity(Entity::primary("rental"))
            .with_measure(Measure::new("gov", AggregationKind::Sum))
            .with_measure(Measure::new("rental_count", AggregationKind::Count)),
        SemanticModel::new("searches", "ref('searches')")
            .with_entity(Entity::primary("search"))
            .with_measure(Measure::new("search_count", AggregationKind::Count)),
    ]
}

#[test]
fn test_explicit_primary_entity_overrides_inference() {
    let registry = ModelRegistry::new(
        models(),
        vec![Metric::ratio("aov", "gov", "search_count").with_primary_entity("rental")],
    );
    let resolver = MetricResolver::new(&registry);

    let resolved = resolver.resolve(registry.metric("aov").unwrap()).unwrap();
    assert_eq!(resolved.primary_entity, "rental");
}

#[test]
fn test_simple_and_derived_need_an_override() {
    let registry = ModelRegistry::new(
        models(),
        vec![
            Metric::simple("total_gov", "gov"),
            Metric::derived("gov_x2", "total_gov * 2", vec![MetricReference::new("total_gov")]),
        ],
    );
    let resolver = MetricResolver::new(&registry);

    let err = resolver.resolve_all().unwrap_err();
    assert_eq!(
        err,
        ResolveError::MissingPrimaryEntity {
            metric: "total_gov".to_string(),
            kind: "simple".to_string(),
        }
    );

    let err = resolver.resolve(registry.metric("gov_x2").unwrap()).unwrap_err();
    assert!(matches!(err, ResolveError::MissingPrimaryEntity { ref kind, .. } if kind == "derived"));
}

#[test]
fn test_ratio_with_unknown_denominator() {
    let registry = ModelRegistry::new(models(), vec![Metric::ratio("r", "gov", "refunds")]);
    let resolver = MetricResolver::new(&registry);

    let err = resolver.resolve(registry.metric("r").unwrap()).unwrap_err();
    assert_eq!(
        err,
        ResolveError::MeasureNotFound {
            metric: "r".to_string(),
            measure: "refunds".to_string(),
        }
    );
}

#[test]
fn test_cycle_is_ineligible_not_fatal() {
    let registry = ModelRegistry::new(
        models(),
        vec![
            Metric::derived("a", "b + 1", vec![MetricReference::new("b")]).with_primary_entity("rental"),
            Metric::derived("b", "c + 1", vec![MetricReference::new("c")]).with_primary_entity("rental"),
            Metric::derived("c", "a + 1", vec![MetricReference::new("a")]).with_primary_entity("rental"),
        ],
    );
    let resolver = MetricResolver::new(&registry);

    let resolved = resolver.resolve_all().unwrap();
    assert_eq!(resolved.len(), 3);
    for metric in &resolved {
        assert!(matches!(
            metric.eligibility,
            Eligibility::Ineligible(IneligibleReason::Cycle(_))
        ));
    }

    let cycle = resolver.dependencies().find_cycle("a").unwrap();
    assert_eq!(cycle, vec!["a", "b", "c", "a"]);
}

#[test]
fn test_mixed_entities_are_reported() {
    let registry = ModelRegistry::new(
        models(),
        vec![Metric::ratio("conversion_rate", "rental_count", "search_count")],
    );
    let resolver = MetricResolver::new(&registry);

    let metric = registry.metric("conversion_rate").unwrap();
    assert_eq!(
        resolver.eligibility(metric),
        Eligibility::Ineligible(IneligibleReason::MixedPrimaryEntity {
            model: "rentals".to_string(),
            entity: Some("rental".to_string()),
        })
    );
}

#[test]
fn test_conversion_metrics_are_unsupported() {
    let registry = ModelRegistry::new(
        models(),
        vec![Metric::conversion("trial_to_paid").with_primary_entity("rental")],
    );
    let naming = Naming::default();
    let resolver = MetricResolver::new(&registry);
    let synthesizer = SqlSynthesizer::new(&resolver, &naming);

    let resolved = resolver.resolve(registry.metric("trial_to_paid").unwrap()).unwrap();
    assert_eq!(
        resolved.eligibility,
        Eligibility::Ineligible(IneligibleReason::Unsupported)
    );
    assert!(matches!(
        synthesizer.synthesize(&resolved),
        Err(ResolveError::UnsupportedMetricKind { .. })
    ));
}

#[test]
fn test_derived_alias_substitution() {
    let registry = ModelRegistry::new(
        models(),
        vec![
            Metric::simple("total_gov", "gov").with_primary_entity("rental"),
            Metric::simple("total_searches", "search_count").with_primary_entity("search"),
            Metric::derived(
                "gov_growth",
                "(gov - gov_lw) / total_searches",
                vec![
                    MetricReference::new("total_gov").with_alias("gov"),
                    MetricReference::new("total_gov")
                        .with_alias("gov_lw")
                        .with_offset_window("1 week"),
                    MetricReference::new("total_searches"),
                ],
            )
            .with_primary_entity("rental"),
        ],
    );
    let naming = Naming::default();
    let resolver = MetricResolver::new(&registry);
    let synthesizer = SqlSynthesizer::new(&resolver, &naming);

    let resolved = resolver.resolve(registry.metric("gov_growth").unwrap()).unwrap();
    let out = synthesizer.synthesize(&resolved).unwrap();

    assert_eq!(
        out.sql,
        "(${total_gov} - ${total_gov}) / ${searches.total_searches}"
    );
    assert_eq!(out.required_fields, vec!["searches.total_searches"]);
}
