//! End-to-end generation from YAML text to views and explores.

use insta::assert_snapshot;
use semlink::generate::{generate, GenerateError, GenerateOptions};
use semlink::model::loader::load_project_from_str;
use semlink::semantic::{ModelRegistry, Naming, DIMENSIONS_ONLY_SET};

const PROJECT: &str = r#"
semantic_models:
  - name: rental_orders
    model: ref('rental_orders')
    entities:
      - name: rental_order
        type: primary
      - name: user_sk
        type: foreign
      - name: search_sk
        type: foreign
    dimensions:
      - name: ordered_at
        type: time
        type_params:
          time_granularity: day
      - name: status
        type: categorical
    measures:
      - name: gov
        agg: sum
        expr: gov_amount
      - name: order_count
        agg: count
        expr: "1"

  - name: users
    model: ref('users')
    entities:
      - name: user_sk
        type: primary
    dimensions:
      - name: country
        type: categorical
      - name: email
        type: categorical
        hidden: true
    measures:
      - name: user_count
        agg: count_distinct
        expr: user_sk

  - name: searches
    model: ref('searches')
    entities:
      - name: search_sk
        type: primary
    measures:
      - name: search_count
        agg: count
        expr: "1"

metrics:
  - name: aov
    type: ratio
    label: Average Order Value
    type_params:
      numerator: gov
      denominator: order_count
  - name: orders_per_search
    type: ratio
    type_params:
      numerator: order_count
      denominator: search_count
  - name: total_gov
    type: simple
    primary_entity: rental_order
    type_params:
      measure: gov
"#;

fn registry(yaml: &str) -> ModelRegistry {
    let project = load_project_from_str(yaml, "project.yml").unwrap();
    ModelRegistry::new(project.models, project.metrics)
}

#[test]
fn test_generate_views_and_explores() {
    let registry = registry(PROJECT);
    let options = GenerateOptions::default().with_schema("analytics");

    let project = generate(&registry, &options).unwrap();

    assert_eq!(project.views.len(), 3);
    let orders = project.view("rental_orders").unwrap();
    assert_eq!(orders.sql_table_name, "analytics.rental_orders");
    assert_eq!(orders.dimension_groups[0].timeframes.len(), 5);

    let aov = orders.measure("aov").unwrap();
    assert_eq!(aov.label, "Average Order Value");
    assert_snapshot!(aov.sql, @"1.0 * ${gov_measure} / NULLIF(${order_count_measure}, 0)");

    let total_gov = orders.measure("total_gov").unwrap();
    assert_eq!(total_gov.measure_type, "sum");
    assert_eq!(total_gov.sql, "${TABLE}.gov_amount");

    let searches = project.view("searches").unwrap();
    let per_search = searches.measure("orders_per_search").unwrap();
    assert_eq!(
        per_search.required_fields,
        vec!["rental_orders.order_count_measure"]
    );

    assert_eq!(project.explores.explores.len(), 1);
    let explore = project.explore("rental_orders").unwrap();
    let joined: Vec<_> = explore.joins.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(joined, vec!["users", "searches"]);
}

#[test]
fn test_dimensions_only_sets_exclude_measures() {
    let registry = registry(PROJECT);
    let project = generate(&registry, &GenerateOptions::default().with_schema("analytics")).unwrap();

    for view in &project.views {
        assert_eq!(view.sets.len(), 1);
        let set = &view.sets[0];
        assert_eq!(set.name, DIMENSIONS_ONLY_SET);
        for measure in &view.measures {
            assert!(
                !set.fields.contains(&measure.name),
                "{} exposes measure {}",
                view.name,
                measure.name
            );
        }
    }

    let users = project.view("users").unwrap();
    assert_eq!(users.sets[0].fields, vec!["user_sk", "country"]);

    let orders = project.view("rental_orders").unwrap();
    assert!(orders.sets[0].fields.contains(&"ordered_at_month".to_string()));
}

#[test]
fn test_every_join_is_restricted_to_its_view() {
    let registry = registry(PROJECT);
    let options = GenerateOptions::default()
        .with_schema("analytics")
        .with_naming(Naming::new("v_", "x_"));

    let project = generate(&registry, &options).unwrap();

    for explore in &project.explores.explores {
        for join in &explore.joins {
            assert_eq!(join.fields, vec![format!("{}.dimensions_only*", join.name)]);
            assert!(project.view(&join.name).is_some());
        }
    }

    let explore = project.explore("x_rental_orders").unwrap();
    assert_eq!(explore.view_name.as_deref(), Some("v_rental_orders"));
    assert_snapshot!(
        explore.joins[0].sql_on,
        @"${v_rental_orders.user_sk} = ${v_users.user_sk}"
    );
}

#[test]
fn test_explores_json_shape() {
    let registry = registry(PROJECT);
    let project = generate(&registry, &GenerateOptions::default().with_schema("analytics")).unwrap();

    let json = serde_json::to_value(&project.explores).unwrap();
    let join = &json["explores"][0]["joins"][0];
    assert_eq!(join["name"], "users");
    assert_eq!(join["relationship"], "many_to_one");
    assert_eq!(join["fields"][0], "users.dimensions_only*");

    let view = serde_json::to_value(project.view("users").unwrap()).unwrap();
    assert_eq!(view["dimensions"][0]["primary_key"], true);
    assert_eq!(view["dimensions"][0]["hidden"], true);
    assert_eq!(view["measures"][0]["name"], "user_count_measure");
    assert_eq!(view["measures"][0]["type"], "count_distinct");
}

#[test]
fn test_cycles_are_reported_per_metric() {
    let yaml = format!(
        "{}{}",
        PROJECT,
        r#"
  - name: loop_a
    type: derived
    primary_entity: rental_order
    type_params:
      expr: loop_b + 1
      metrics:
        - name: loop_b
  - name: loop_b
    type: derived
    primary_entity: rental_order
    type_params:
      expr: loop_a + 1
      metrics:
        - name: loop_a
"#
    );
    let registry = registry(&yaml);

    let project = generate(&registry, &GenerateOptions::default().with_schema("analytics")).unwrap();

    let eligible: Vec<_> = project
        .eligibility
        .iter()
        .map(|(name, e)| (name.as_str(), e.is_eligible()))
        .collect();
    assert_eq!(
        eligible,
        vec![
            ("aov", true),
            ("orders_per_search", false),
            ("total_gov", true),
            ("loop_a", false),
            ("loop_b", false),
        ]
    );

    // cyclic metrics still render; eligibility is advisory
    let orders = project.view("rental_orders").unwrap();
    assert_eq!(orders.measure("loop_a").unwrap().sql, "${loop_b} + 1");
}

#[test]
fn test_unknown_fact_model() {
    let registry = registry(PROJECT);
    let options = GenerateOptions::default()
        .with_schema("analytics")
        .with_fact_models(vec!["bookings".to_string()]);

    let err = generate(&registry, &options).unwrap_err();
    assert!(matches!(err, GenerateError::UnknownFactModel(ref name) if name == "bookings"));
}
