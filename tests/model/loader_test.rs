//! Integration tests for YAML project loading.

use std::fs;

use semlink::model::loader::{load_project, load_project_from_str};
use semlink::model::{DimensionKind, EntityKind, MetricKind};

const MODELS: &str = r#"
semantic_models:
  - name: rental_orders
    model: ref('rental_orders')
    entities:
      - name: rental_order
        type: primary
      - name: user_sk
        type: foreign
    dimensions:
      - name: created_at
        type: time
        type_params:
          time_granularity: hour
      - name: internal_flag
        type: categorical
        hidden: true
    measures:
      - name: gov
        agg: sum
        expr: gov_amount
        label: Gross Order Value
"#;

const METRICS: &str = r#"
metrics:
  - name: total_gov
    type: simple
    primary_entity: rental_order
    type_params:
      measure: gov
  - name: trial_to_paid
    type: conversion
    type_params:
      entity: user_sk
      window: 7 days
"#;

#[test]
fn test_models_and_metrics_from_separate_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a_models.yml"), MODELS).unwrap();
    fs::write(dir.path().join("b_metrics.yaml"), METRICS).unwrap();

    let project = load_project(dir.path()).unwrap();

    assert_eq!(project.models.len(), 1);
    let model = &project.models[0];
    assert_eq!(model.entities[0].kind, EntityKind::Primary);
    assert_eq!(model.dimensions[0].kind, DimensionKind::Time);
    assert!(model.dimensions[1].hidden);
    assert_eq!(model.measures[0].label.as_deref(), Some("Gross Order Value"));

    let names: Vec<_> = project.metrics.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["total_gov", "trial_to_paid"]);
}

#[test]
fn test_conversion_params_are_kept_opaque() {
    let project = load_project_from_str(METRICS, "metrics.yml").unwrap();

    match &project.metrics[1].kind {
        MetricKind::Conversion(params) => {
            assert_eq!(params["entity"], "user_sk");
            assert_eq!(params["window"], "7 days");
        }
        other => panic!("expected conversion metric, got {:?}", other),
    }
}

#[test]
fn test_unknown_metric_type_is_an_error() {
    let yaml = "metrics:\n  - name: x\n    type: cumulative\n    type_params: {}\n";
    let err = load_project_from_str(yaml, "bad.yml").unwrap_err();
    assert!(err.to_string().contains("bad.yml"));
}
