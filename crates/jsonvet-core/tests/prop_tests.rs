//! Property-based tests for the evaluation engine
//!
//! These verify invariants that must hold across arbitrary instance
//! documents: boolean schemas, type dispatch, and the all-or-nothing
//! relationship between validity, errors and annotations.

use jsonvet_core::Validator;
use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for generating random JSON values with controlled complexity
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9 ]{0,30}".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 12, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            proptest::collection::hash_map("[a-zA-Z_][a-zA-Z0-9_]{0,10}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn type_name_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

proptest! {
    #[test]
    fn prop_true_schema_accepts_everything(instance in json_value_strategy()) {
        let validator = Validator::builder().without_schema_validation().build();
        let uri = validator.register_schema(None, "true").unwrap();
        let outcome = validator.validate_value(uri.as_str(), &instance).unwrap();
        prop_assert!(outcome.valid());
        prop_assert!(outcome.errors().is_empty());
    }

    #[test]
    fn prop_false_schema_rejects_everything(instance in json_value_strategy()) {
        let validator = Validator::builder().without_schema_validation().build();
        let uri = validator.register_schema(None, "false").unwrap();
        let outcome = validator.validate_value(uri.as_str(), &instance).unwrap();
        prop_assert!(!outcome.valid());
        prop_assert_eq!(outcome.errors().len(), 1);
        prop_assert_eq!(outcome.errors()[0].message(), "False schema always fails.");
        // an invalid schema retains no annotations
        prop_assert!(outcome.annotations().is_empty());
    }

    #[test]
    fn prop_type_keyword_matches_the_value_kind(instance in json_value_strategy()) {
        let validator = Validator::builder().without_schema_validation().build();
        let expected = type_name_of(&instance);
        for candidate in ["null", "boolean", "integer", "string", "array", "object"] {
            let uri = validator
                .register_schema_value(None, json!({"type": candidate}))
                .unwrap();
            let outcome = validator.validate_value(uri.as_str(), &instance).unwrap();
            prop_assert_eq!(outcome.valid(), candidate == expected);
        }
    }

    #[test]
    fn prop_const_accepts_exactly_itself(instance in json_value_strategy()) {
        let validator = Validator::builder().without_schema_validation().build();
        let uri = validator
            .register_schema_value(None, json!({"const": instance.clone()}))
            .unwrap();
        prop_assert!(validator.validate_value(uri.as_str(), &instance).unwrap().valid());
        let sentinel_valid = validator
            .validate_value(uri.as_str(), &json!({"jsonvet-prop-test-sentinel": 0}))
            .unwrap()
            .valid();
        prop_assert!(!sentinel_valid);
    }

    #[test]
    fn prop_errors_and_validity_agree(instance in json_value_strategy()) {
        let validator = Validator::builder().without_schema_validation().build();
        let uri = validator
            .register_schema_value(
                None,
                json!({"type": ["object", "array"], "minProperties": 1, "minItems": 1}),
            )
            .unwrap();
        let outcome = validator.validate_value(uri.as_str(), &instance).unwrap();
        prop_assert_eq!(outcome.valid(), outcome.errors().is_empty());
    }
}
