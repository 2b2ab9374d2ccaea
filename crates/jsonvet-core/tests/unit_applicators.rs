//! Unit tests for applicator semantics
//!
//! These cover the cross-keyword behaviors that depend on the annotation
//! tree: discard-on-failure, sibling handoffs between the properties/items/
//! contains families, the conditional family and the unevaluated family.

use jsonvet_core::Validator;
use serde_json::json;

fn lenient() -> Validator {
    Validator::builder().without_schema_validation().build()
}

fn register(validator: &Validator, uri: &str, schema: serde_json::Value) -> String {
    validator
        .register_schema_value(Some(uri), schema)
        .unwrap()
        .as_str()
        .to_string()
}

#[test]
fn test_failed_branch_errors_are_discarded_when_anyof_passes() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/anyof-const",
        json!({"anyOf": [true, false], "const": "hello"}),
    );

    let outcome = validator.validate(&uri, "null").unwrap();
    assert!(!outcome.valid());
    // the false-branch failure vanishes once anyOf itself passes; only the
    // const failure remains
    assert_eq!(outcome.errors().len(), 1);
    assert_eq!(outcome.errors()[0].evaluation_path, "/const");
    assert_eq!(outcome.errors()[0].keyword.as_deref(), Some("const"));
}

#[test]
fn test_annotations_under_failed_branches_are_discarded() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/discard",
        json!({
            "anyOf": [true, {"allOf": [false, {"title": "x"}]}],
            "title": "y"
        }),
    );

    let outcome = validator.validate(&uri, "1").unwrap();
    assert!(outcome.valid());
    let annotations = outcome.annotations();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].keyword.as_deref(), Some("title"));
    assert_eq!(annotations[0].detail, json!("y"));
}

#[test]
fn test_prefix_items_reports_every_failing_index() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/prefix",
        json!({
            "prefixItems": [
                {"const": "a"}, {"const": "b"}, {"const": "c"}, {"const": "d"}
            ]
        }),
    );

    let outcome = validator.validate(&uri, r#"[0, 1, "c", 2]"#).unwrap();
    assert!(!outcome.valid());
    let locations: Vec<&str> = outcome
        .errors()
        .iter()
        .map(|e| e.instance_location.as_str())
        .collect();
    assert_eq!(locations, vec!["/0", "/1", "/3"]);
    assert_eq!(outcome.errors()[0].evaluation_path, "/prefixItems/0/const");
}

#[test]
fn test_min_contains_reads_the_sibling_annotation() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/contains",
        json!({"contains": {"type": "null"}, "minContains": 2}),
    );

    let outcome = validator.validate(&uri, "[0, 1, null]").unwrap();
    assert!(!outcome.valid());
    // the per-element type failures were discarded when contains passed;
    // the single remaining error is the count check
    assert_eq!(outcome.errors().len(), 1);
    assert_eq!(outcome.errors()[0].keyword.as_deref(), Some("minContains"));
    assert!(outcome.errors()[0]
        .message()
        .contains("less than 2 matching items"));
}

#[test]
fn test_max_contains() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/max-contains",
        json!({"contains": {"type": "null"}, "maxContains": 1}),
    );

    assert!(validator.validate(&uri, "[null, 1]").unwrap().valid());
    let outcome = validator.validate(&uri, "[null, null]").unwrap();
    assert!(!outcome.valid());
    assert!(outcome.errors()[0]
        .message()
        .contains("more than 1 matching items"));
}

#[test]
fn test_conditional_family_communicates_through_the_if_annotation() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/conditional",
        json!({
            "if": {"type": "string"},
            "then": {"minLength": 3},
            "else": {"minimum": 10}
        }),
    );

    assert!(validator.validate(&uri, r#""abc""#).unwrap().valid());
    assert!(validator.validate(&uri, "20").unwrap().valid());

    let outcome = validator.validate(&uri, r#""ab""#).unwrap();
    assert!(!outcome.valid());
    assert_eq!(outcome.errors().len(), 1);
    assert_eq!(outcome.errors()[0].keyword.as_deref(), Some("minLength"));
    assert_eq!(outcome.errors()[0].evaluation_path, "/then/minLength");

    let outcome = validator.validate(&uri, "5").unwrap();
    assert!(!outcome.valid());
    assert_eq!(outcome.errors()[0].keyword.as_deref(), Some("minimum"));
}

#[test]
fn test_additional_properties_sees_sibling_processed_keys() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/addprops",
        json!({
            "properties": {"a": {"type": "integer"}},
            "patternProperties": {"^p": true},
            "additionalProperties": false
        }),
    );

    assert!(validator
        .validate(&uri, r#"{"a": 1, "p1": "x"}"#)
        .unwrap()
        .valid());

    let outcome = validator.validate(&uri, r#"{"a": 1, "b": 2}"#).unwrap();
    assert!(!outcome.valid());
    assert_eq!(outcome.errors().len(), 1);
    assert_eq!(outcome.errors()[0].instance_location, "/b");
    assert_eq!(outcome.errors()[0].message(), "False schema always fails.");
    assert_eq!(outcome.errors()[0].evaluation_path, "/additionalProperties");
}

#[test]
fn test_legacy_items_additional_items_handoff() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/legacy-items",
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "items": [{"type": "integer"}],
            "additionalItems": {"type": "string"}
        }),
    );

    assert!(validator.validate(&uri, r#"[1, "x", "y"]"#).unwrap().valid());

    let outcome = validator.validate(&uri, "[1, 2]").unwrap();
    assert!(!outcome.valid());
    assert_eq!(outcome.errors().len(), 1);
    assert_eq!(outcome.errors()[0].instance_location, "/1");
    assert_eq!(
        outcome.errors()[0].evaluation_path,
        "/additionalItems/type"
    );
}

#[test]
fn test_schema_form_items_makes_additional_items_inert() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/items-schema-form",
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "items": {"type": "integer"},
            "additionalItems": false
        }),
    );

    assert!(validator.validate(&uri, "[1, 2, 3]").unwrap().valid());
}

#[test]
fn test_rest_items_apply_past_the_consumed_prefix() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/rest-items",
        json!({
            "prefixItems": [{"type": "integer"}],
            "items": {"type": "string"}
        }),
    );

    assert!(validator.validate(&uri, r#"[1, "a", "b"]"#).unwrap().valid());

    let outcome = validator.validate(&uri, "[1, 2]").unwrap();
    assert!(!outcome.valid());
    assert_eq!(outcome.errors().len(), 1);
    assert_eq!(outcome.errors()[0].instance_location, "/1");
    assert_eq!(outcome.errors()[0].evaluation_path, "/items/type");
}

#[test]
fn test_unevaluated_properties_sees_nested_in_place_applicators() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/uneval",
        json!({
            "allOf": [{"properties": {"a": true}}],
            "unevaluatedProperties": false
        }),
    );

    assert!(validator.validate(&uri, r#"{"a": 1}"#).unwrap().valid());

    let outcome = validator.validate(&uri, r#"{"a": 1, "b": 2}"#).unwrap();
    assert!(!outcome.valid());
    assert_eq!(outcome.errors().len(), 1);
    assert_eq!(outcome.errors()[0].instance_location, "/b");
}

#[test]
fn test_unevaluated_properties_ignores_failed_branches() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/uneval-discard",
        json!({
            "anyOf": [
                {"properties": {"a": true}, "required": ["missing"]},
                {"properties": {"b": true}}
            ],
            "unevaluatedProperties": false
        }),
    );

    // the first branch fails, so its claim on "a" is discarded; only "b"
    // counts as evaluated and "a" trips the unevaluated check
    let outcome = validator.validate(&uri, r#"{"a": 1, "b": 2}"#).unwrap();
    assert!(!outcome.valid());
    assert_eq!(outcome.errors().len(), 1);
    assert_eq!(outcome.errors()[0].instance_location, "/a");
}

#[test]
fn test_unevaluated_items_counts_contains_matches() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/uneval-items",
        json!({
            "prefixItems": [{"type": "integer"}],
            "contains": {"type": "string"},
            "unevaluatedItems": false
        }),
    );

    assert!(validator.validate(&uri, r#"[1, "x"]"#).unwrap().valid());

    let outcome = validator.validate(&uri, r#"[1, "x", null]"#).unwrap();
    assert!(!outcome.valid());
    assert_eq!(outcome.errors().len(), 1);
    assert_eq!(outcome.errors()[0].instance_location, "/2");
}

#[test]
fn test_one_of_requires_exactly_one_match() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/oneof",
        json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]}),
    );

    assert!(validator.validate(&uri, "-1").unwrap().valid());
    assert!(validator.validate(&uri, "0.5").unwrap().valid());

    let outcome = validator.validate(&uri, "1").unwrap();
    assert!(!outcome.valid());
    assert!(outcome.errors()[0]
        .message()
        .contains("matches 2 subschemas"));
}

#[test]
fn test_not_inverts_the_subschema() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/not",
        json!({"not": {"type": "string"}}),
    );

    assert!(validator.validate(&uri, "1").unwrap().valid());
    let outcome = validator.validate(&uri, r#""s""#).unwrap();
    assert!(!outcome.valid());
    assert!(outcome.errors()[0].message().contains("must not match"));
}

#[test]
fn test_property_names_and_dependent_keywords() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/object-keywords",
        json!({
            "propertyNames": {"maxLength": 3},
            "dependentRequired": {"a": ["b"]},
            "dependentSchemas": {"c": {"minProperties": 2}}
        }),
    );

    assert!(validator.validate(&uri, r#"{"a": 1, "b": 2}"#).unwrap().valid());
    assert!(validator.validate(&uri, r#"{"c": 1, "x": 2}"#).unwrap().valid());

    let outcome = validator.validate(&uri, r#"{"toolong": 1}"#).unwrap();
    assert!(!outcome.valid());

    let outcome = validator.validate(&uri, r#"{"a": 1}"#).unwrap();
    assert!(!outcome.valid());
    assert!(outcome.errors()[0].message().contains("'b' required by 'a'"));

    let outcome = validator.validate(&uri, r#"{"c": 1}"#).unwrap();
    assert!(!outcome.valid());
    assert_eq!(
        outcome.errors()[0].keyword.as_deref(),
        Some("minProperties")
    );
}

#[test]
fn test_legacy_dependencies_both_forms() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/legacy-deps",
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "dependencies": {
                "a": ["b"],
                "c": {"required": ["d"]}
            }
        }),
    );

    assert!(validator.validate(&uri, r#"{"x": 1}"#).unwrap().valid());
    assert!(validator
        .validate(&uri, r#"{"a": 1, "b": 2, "c": 3, "d": 4}"#)
        .unwrap()
        .valid());
    assert!(!validator.validate(&uri, r#"{"a": 1}"#).unwrap().valid());
    assert!(!validator.validate(&uri, r#"{"c": 1}"#).unwrap().valid());
}

#[test]
fn test_draft4_boolean_exclusive_bounds() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/draft4-bounds",
        json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "minimum": 5,
            "exclusiveMinimum": true
        }),
    );

    assert!(!validator.validate(&uri, "5").unwrap().valid());
    assert!(validator.validate(&uri, "6").unwrap().valid());
}

#[test]
fn test_evaluation_order_is_deterministic() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/order",
        json!({"type": "integer", "minimum": 10, "multipleOf": 3}),
    );

    let outcome = validator.validate(&uri, "4").unwrap();
    assert!(!outcome.valid());
    let keywords: Vec<&str> = outcome
        .errors()
        .iter()
        .map(|e| e.keyword.as_deref().unwrap())
        .collect();
    // declaration (alphabetical map) order, same on every run
    assert_eq!(keywords, vec!["minimum", "multipleOf"]);
}
