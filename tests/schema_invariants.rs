//! Schema Invariant Tests
//!
//! Attribute and registry behavior through the public API:
//! - Nullable attributes accept null before any variant check runs
//! - Parsing an already parsed value is a no-op
//! - Truncation dominates hard limits; lower bounds always apply
//! - One shared schema per entity type; instance changes fork a copy
//! - Declaration bugs panic instead of producing data errors

use std::sync::Arc;

use schemata::schema::{AttributeKind, NumberBounds};
use schemata::{Entity, EngineConfig, Model, Schema, SchemaAttribute, SchemaRegistry, Value};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn attribute(schema: &Schema, name: &str) -> SchemaAttribute {
    schema
        .query(name)
        .cloned()
        .unwrap_or_else(|| panic!("attribute {} not declared", name))
}

struct Order;

impl Entity for Order {
    fn schema(schema: &mut Schema) {
        schema.int("quantity").min(1.0).max(99.0).nullable();
        schema.float("discount").min(0.0).max(1.0);
        schema.string("code").between(2, 6).truncate(4);
        schema.string("note").limit(3);
        schema.date("placed_at");
        schema.enumeration("priority", [1, 2, 3]);
        schema.array("labels", None);
        schema.any("meta");
    }
}

// =============================================================================
// Nullable and Idempotent Parse
// =============================================================================

#[test]
fn test_nullable_short_circuits_bounds() {
    let schema = Order::entity_type().build_schema();
    let quantity = attribute(&schema, "quantity");

    assert_eq!(quantity.parse(Value::Null).unwrap(), Value::Null);
    assert!(quantity.parse(Value::Int(0)).is_err());
    assert!(quantity.parse(Value::Int(100)).is_err());
    assert_eq!(quantity.parse(Value::Int(5)).unwrap(), Value::Int(5));
}

#[test]
fn test_non_nullable_rejects_null() {
    let schema = Order::entity_type().build_schema();
    let err = attribute(&schema, "discount").parse(Value::Null).unwrap_err();
    assert_eq!(err.attribute(), "Order.discount");
    assert_eq!(err.message(), "Provided value 'null' is not a float");
}

#[test]
fn test_parse_is_idempotent_for_dates() {
    let schema = Order::entity_type().build_schema();
    let placed_at = attribute(&schema, "placed_at");

    let parsed = placed_at
        .parse(Value::from("2025-10-20T08:30:00-03:00"))
        .unwrap();
    assert!(parsed.as_date().is_some());
    assert_eq!(placed_at.parse(parsed.clone()).unwrap(), parsed);
}

#[test]
fn test_int_rejects_non_integral_input() {
    let schema = Order::entity_type().build_schema();
    let quantity = attribute(&schema, "quantity");

    assert!(quantity.parse(Value::Float(2.5)).is_err());
    assert!(quantity.parse(Value::from("2")).is_err());
}

// =============================================================================
// Variant Rules
// =============================================================================

#[test]
fn test_truncate_dominates_and_minimum_still_applies() {
    let schema = Order::entity_type().build_schema();
    let code = attribute(&schema, "code");

    assert_eq!(code.parse(Value::from("ABCDEFGH")).unwrap(), Value::from("ABCD"));
    assert_eq!(code.parse(Value::from("AB")).unwrap(), Value::from("AB"));

    let err = code.parse(Value::from("A")).unwrap_err();
    assert!(err.message().contains("shorter than the minimum of 2 characters"));
}

#[test]
fn test_limit_rejects_overlong_input() {
    let schema = Order::entity_type().build_schema();
    let note = attribute(&schema, "note");

    assert!(note.parse(Value::from("abc")).is_ok());
    let err = note.parse(Value::from("abcd")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "'Order.note' Provided value 'abcd' is exceeding the limit of 3 character(s)"
    );
}

#[test]
fn test_enum_substitutes_canonical_value() {
    let schema = Order::entity_type().build_schema();
    let priority = attribute(&schema, "priority");

    assert_eq!(priority.parse(Value::from("2")).unwrap(), Value::Int(2));
    assert!(priority.parse(Value::Int(4)).is_err());
}

#[test]
fn test_untyped_array_passes_elements_through() {
    let schema = Order::entity_type().build_schema();
    let labels = attribute(&schema, "labels");

    assert_eq!(labels.type_name(), "array<*>");
    let mixed = Value::from(json!(["a", 1, null]));
    assert_eq!(labels.parse(mixed.clone()).unwrap(), mixed);

    let err = labels.parse(Value::from("a")).unwrap_err();
    assert_eq!(err.message(), "Provided value is not a valid array<*>");
}

#[test]
fn test_any_is_identity() {
    let schema = Order::entity_type().build_schema();
    let meta = attribute(&schema, "meta");
    let value = Value::from(json!({"k": [1, 2]}));
    assert_eq!(meta.parse(value.clone()).unwrap(), value);
    assert_eq!(meta.serialize(value.clone()).unwrap(), value);
}

#[test]
fn test_try_parse_on_attribute() {
    let schema = Order::entity_type().build_schema();
    assert!(attribute(&schema, "discount").try_parse(Value::Float(1.5)).is_none());
    assert_eq!(
        attribute(&schema, "discount").try_parse(Value::Int(1)),
        Some(Value::Float(1.0))
    );
}

#[test]
fn test_float_accepts_numeric_strings() {
    let schema = Order::entity_type().build_schema();
    let discount = attribute(&schema, "discount");

    assert_eq!(discount.parse(Value::from("0.25")).unwrap(), Value::Float(0.25));
    assert_eq!(discount.parse(Value::from(" 1 ")).unwrap(), Value::Float(1.0));
    assert!(discount.parse(Value::from("1.5")).is_err());

    let err = discount.parse(Value::from("abc")).unwrap_err();
    assert_eq!(err.message(), "Provided value 'abc' is not a float");
}

#[test]
fn test_float_rejects_non_finite_values() {
    let schema = Order::entity_type().build_schema();
    let discount = attribute(&schema, "discount");

    assert!(discount.parse(Value::Float(f64::NAN)).is_err());
    assert!(discount.parse(Value::Float(f64::INFINITY)).is_err());

    let mut unbounded = Schema::new("Reading");
    unbounded.float("celsius");
    let celsius = attribute(&unbounded, "celsius");
    assert!(celsius.parse(Value::Float(f64::NEG_INFINITY)).is_err());
    assert_eq!(celsius.parse(Value::from("1.5")).unwrap(), Value::Float(1.5));
}

#[test]
fn test_type_names() {
    let mut schema = Schema::new("Doc");
    schema.string("words").list();
    schema.int("grid").list().list();

    assert_eq!(attribute(&schema, "words").type_name(), "array<String>");
    assert_eq!(attribute(&schema, "grid").type_name(), "array<array<Int>>");
}

// =============================================================================
// Declaration Contract
// =============================================================================

#[test]
#[should_panic(expected = "constraint `between` does not apply")]
fn test_string_constraint_on_int_panics() {
    let mut schema = Schema::new("Broken");
    schema.int("age").between(1, 3);
}

#[test]
#[should_panic(expected = "constraint `positives` does not apply")]
fn test_bool_constraint_on_string_panics() {
    let mut schema = Schema::new("Broken");
    schema.string("flag").positives(["y"]);
}

#[test]
fn test_constraints_reach_through_list_elements() {
    let mut schema = Schema::new("Doc");
    schema.int("scores").list().min(0.0);

    let scores = attribute(&schema, "scores");
    assert!(scores.parse(Value::from(vec![1, 2])).is_ok());
    assert!(scores.parse(Value::from(vec![1, -2])).is_err());
}

#[test]
fn test_manual_attribute_declaration() {
    let mut schema = Schema::new("Doc");
    schema
        .declare(SchemaAttribute::new(
            "Elsewhere",
            "count",
            AttributeKind::Int(NumberBounds {
                min: Some(0.0),
                max: None,
            }),
        ))
        .required();

    let count = attribute(&schema, "count");
    assert_eq!(count.qualified_name(), "Doc.count");
    assert!(count.is_required());
}

// =============================================================================
// Registry and Copy-on-Write
// =============================================================================

struct Shared;

impl Entity for Shared {
    fn schema(schema: &mut Schema) {
        schema.string("title").nullable();
        schema.int("version").default(1);
    }
}

#[test]
fn test_instances_share_one_schema() {
    let registry = SchemaRegistry::new();
    let first = Model::make_in(&registry, Shared::entity_type());
    let second = Model::make_in(&registry, Shared::entity_type());

    assert!(std::ptr::eq(first.schema(), second.schema()));
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(Shared::entity_type()));
}

#[test]
fn test_schema_mutate_forks_private_copy() {
    let registry = SchemaRegistry::new();
    let mut forked = Model::make_in(&registry, Shared::entity_type());
    let untouched = Model::make_in(&registry, Shared::entity_type());

    forked.schema_mutate(|schema| {
        schema.string("title").limit(3);
    });

    assert!(forked.owns_schema());
    assert!(!untouched.owns_schema());
    assert!(forked.set("title", "long title").is_err());

    let mut other = untouched.clone();
    assert!(other.set("title", "long title").is_ok());

    let shared = registry.get(Shared::entity_type()).unwrap();
    assert!(std::ptr::eq(Arc::as_ptr(&shared), untouched.schema()));
    assert!(shared.query("title").unwrap().is_nullable());
}

#[test]
fn test_second_mutation_reuses_private_copy() {
    let registry = SchemaRegistry::new();
    let mut model = Model::make_in(&registry, Shared::entity_type());

    model.schema_mutate(|schema| {
        schema.remove("title");
    });
    let after_first: *const Schema = model.schema();
    model.schema_mutate(|schema| {
        schema.int("extra");
    });

    assert!(std::ptr::eq(after_first, model.schema()));
    assert_eq!(model.schema().len(), 2);
}

#[test]
fn test_defaults_applied_on_make() {
    let registry = SchemaRegistry::new();
    let model = Model::make_in(&registry, Shared::entity_type());
    assert_eq!(model.get("version"), Value::Int(1));
    assert_eq!(model.get("title"), Value::Null);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_from_json_defaults() {
    let config = EngineConfig::from_json(r#"{"date_format": "%d/%m/%Y"}"#).unwrap();
    assert_eq!(config.date_format, "%d/%m/%Y");
    assert_eq!(config.log_level, EngineConfig::default().log_level);
}
