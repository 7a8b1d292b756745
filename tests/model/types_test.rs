//! Integration tests for model types.
//!
//! These tests verify the model types and their utility methods.

use semlink::model::types::{AggregationKind, Cardinality, TimeGranularity};
use semlink::model::{Dimension, Entity, Measure, SemanticModel};

#[test]
fn test_cardinality_keywords() {
    assert_eq!(Cardinality::ManyToOne.as_str(), "many_to_one");
    assert_eq!(Cardinality::OneToMany.to_string(), "one_to_many");
    assert_eq!(
        serde_json::to_value(Cardinality::ManyToMany).unwrap(),
        "many_to_many"
    );
}

#[test]
fn test_cardinality_fanout() {
    assert!(!Cardinality::ManyToOne.causes_fanout());
    assert!(!Cardinality::OneToOne.causes_fanout());
    assert!(Cardinality::OneToMany.causes_fanout());
    assert!(Cardinality::ManyToMany.causes_fanout());
}

#[test]
fn test_timeframes_start_at_granularity() {
    assert_eq!(
        TimeGranularity::Day.timeframes(),
        &["date", "week", "month", "quarter", "year"]
    );
    assert_eq!(TimeGranularity::Hour.timeframes()[0], "time");
    assert_eq!(TimeGranularity::Year.timeframes(), &["year"]);
    assert_eq!(TimeGranularity::default(), TimeGranularity::Day);
}

#[test]
fn test_aggregation_keywords() {
    assert_eq!(AggregationKind::CountDistinct.as_str(), "count_distinct");
    assert_eq!(AggregationKind::Sum.to_string(), "sum");
}

#[test]
fn test_column_sql_qualification() {
    assert_eq!(Entity::primary("rental").sql(), "${TABLE}.rental");
    assert_eq!(
        Entity::foreign("user").with_expr("user_sk").sql(),
        "${TABLE}.user_sk"
    );
    assert_eq!(
        Dimension::categorical("status")
            .with_expr("lower(status)")
            .sql(),
        "lower(status)"
    );
    assert_eq!(Measure::new("rental_count", AggregationKind::Count).with_expr("1").sql(), "1");
}

#[test]
fn test_model_entity_accessors() {
    let model = SemanticModel::new("rental_orders", "ref('rental_orders')")
        .with_entity(Entity::primary("rental_order"))
        .with_entity(Entity::foreign("user_sk"))
        .with_entity(Entity::foreign("search_sk"))
        .with_measure(Measure::new("gov", AggregationKind::Sum));

    assert_eq!(model.primary_entity().unwrap().name, "rental_order");
    let foreign: Vec<_> = model.foreign_entities().map(|e| e.name.as_str()).collect();
    assert_eq!(foreign, vec!["user_sk", "search_sk"]);
    assert_eq!(model.measure("gov").unwrap().view_field_name(), "gov_measure");
    assert!(model.measure("missing").is_none());
}
