//! Unit tests for the `$ref` family: static references, anchors, dynamic
//! and recursive references, external resolution and its memoization

use jsonvet_core::{ResolverOutput, SchemaResolver, Validator};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

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
fn test_static_ref_reports_paths_from_the_referencing_site() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/static-ref",
        json!({
            "$defs": {"positive": {"minimum": 1}},
            "$ref": "#/$defs/positive"
        }),
    );

    assert!(validator.validate(&uri, "5").unwrap().valid());

    let outcome = validator.validate(&uri, "0").unwrap();
    assert!(!outcome.valid());
    assert_eq!(outcome.errors().len(), 1);
    // the referenced schema reports relative to the referencing keyword,
    // not its own definition site
    assert_eq!(outcome.errors()[0].evaluation_path, "/$ref/minimum");
    assert_eq!(
        outcome.errors()[0].schema_location,
        "https://test/static-ref#/$defs/positive/minimum"
    );
}

#[test]
fn test_named_anchor_resolution() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/anchored",
        json!({
            "$defs": {"a": {"$anchor": "alpha", "type": "string"}},
            "$ref": "#alpha"
        }),
    );

    assert!(validator.validate(&uri, r#""s""#).unwrap().valid());
    assert!(!validator.validate(&uri, "1").unwrap().valid());
}

#[test]
fn test_unresolvable_ref_is_a_validation_failure_not_an_abort() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/dangling",
        json!({"$ref": "https://example.com/nowhere"}),
    );

    let outcome = validator.validate(&uri, "1").unwrap();
    assert!(!outcome.valid());
    assert!(outcome.errors()[0]
        .message()
        .contains("Cannot resolve schema reference"));
}

struct CountingResolver {
    calls: Arc<AtomicUsize>,
}

impl SchemaResolver for CountingResolver {
    fn resolve(&self, uri: &str) -> ResolverOutput {
        if uri == "https://test/external" {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ResolverOutput::Node(json!({"type": "integer"}))
        } else {
            ResolverOutput::Empty
        }
    }
}

#[test]
fn test_external_resolution_is_memoized_per_validator() {
    let calls = Arc::new(AtomicUsize::new(0));
    let validator = Validator::builder()
        .without_schema_validation()
        .with_schema_resolver(Box::new(CountingResolver {
            calls: calls.clone(),
        }))
        .build();
    let uri = register(
        &validator,
        "https://test/uses-external",
        json!({"$ref": "https://test/external"}),
    );

    assert!(validator.validate(&uri, "1").unwrap().valid());
    assert!(!validator.validate(&uri, r#""x""#).unwrap().valid());
    assert!(validator.validate(&uri, "2").unwrap().valid());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_nested_id_resolvable_both_ways() {
    let validator = lenient();
    register(
        &validator,
        "https://test/outer",
        json!({
            "$defs": {
                "inner": {"$id": "https://test/inner", "type": "integer"}
            }
        }),
    );

    for uri in ["https://test/inner#", "https://test/outer#/$defs/inner"] {
        assert!(validator.validate(uri, "3").unwrap().valid(), "via {}", uri);
        assert!(!validator.validate(uri, r#""x""#).unwrap().valid(), "via {}", uri);
    }
}

#[test]
fn test_relative_refs_resolve_against_the_innermost_id_scope() {
    let validator = lenient();
    register(
        &validator,
        "https://test/scopes/root.json",
        json!({
            "$defs": {
                "sub": {
                    "$id": "https://elsewhere.example/sub.json",
                    "$defs": {"local": {"const": 42}},
                    "$ref": "#/$defs/local"
                }
            }
        }),
    );

    // the inner $ref resolves inside the sub.json bucket, not the root one
    assert!(validator
        .validate("https://elsewhere.example/sub.json#", "42")
        .unwrap()
        .valid());
    assert!(!validator
        .validate("https://elsewhere.example/sub.json#", "41")
        .unwrap()
        .valid());
}

#[test]
fn test_dynamic_ref_prefers_the_outermost_dynamic_anchor() {
    let validator = lenient();
    register(
        &validator,
        "https://test/tree",
        json!({
            "$id": "https://test/tree",
            "$dynamicAnchor": "node",
            "type": "object",
            "properties": {
                "data": true,
                "children": {
                    "type": "array",
                    "items": {"$dynamicRef": "#node"}
                }
            }
        }),
    );
    register(
        &validator,
        "https://test/strict-tree",
        json!({
            "$id": "https://test/strict-tree",
            "$dynamicAnchor": "node",
            "$ref": "tree",
            "unevaluatedProperties": false
        }),
    );

    let instance = r#"{"children": [{"daat": 1}]}"#;

    // the plain tree tolerates the misspelled member
    assert!(validator
        .validate("https://test/tree", instance)
        .unwrap()
        .valid());

    // through strict-tree, the recursion extension point re-targets to the
    // outer document: the child is checked with unevaluatedProperties
    let outcome = validator
        .validate("https://test/strict-tree", instance)
        .unwrap();
    assert!(!outcome.valid());
    assert!(outcome
        .errors()
        .iter()
        .any(|e| e.instance_location == "/children/0/daat"));

    let ok = r#"{"children": [{"children": []}]}"#;
    assert!(validator
        .validate("https://test/strict-tree", ok)
        .unwrap()
        .valid());
}

#[test]
fn test_dynamic_ref_with_pointer_fragment_behaves_statically() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/dyn-static",
        json!({
            "$defs": {"t": {"type": "boolean"}},
            "$dynamicRef": "#/$defs/t"
        }),
    );

    assert!(validator.validate(&uri, "true").unwrap().valid());
    assert!(!validator.validate(&uri, "1").unwrap().valid());
}

#[test]
fn test_recursive_ref_retargets_to_the_outermost_recursive_anchor() {
    let validator = lenient();
    register(
        &validator,
        "https://test/rtree",
        json!({
            "$schema": "https://json-schema.org/draft/2019-09/schema",
            "$id": "https://test/rtree",
            "$recursiveAnchor": true,
            "type": "object",
            "properties": {
                "data": true,
                "children": {
                    "type": "array",
                    "items": {"$recursiveRef": "#"}
                }
            }
        }),
    );
    register(
        &validator,
        "https://test/rstrict",
        json!({
            "$schema": "https://json-schema.org/draft/2019-09/schema",
            "$id": "https://test/rstrict",
            "$recursiveAnchor": true,
            "$ref": "rtree",
            "unevaluatedProperties": false
        }),
    );

    let instance = r#"{"children": [{"daat": 1}]}"#;
    assert!(validator
        .validate("https://test/rtree", instance)
        .unwrap()
        .valid());
    assert!(!validator
        .validate("https://test/rstrict", instance)
        .unwrap()
        .valid());
}

#[test]
fn test_recursive_ref_without_anchor_is_a_plain_root_ref() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/no-anchor",
        json!({
            "$schema": "https://json-schema.org/draft/2019-09/schema",
            "type": "object",
            "properties": {"n": {"$recursiveRef": "#"}}
        }),
    );

    assert!(validator.validate(&uri, r#"{"n": {}}"#).unwrap().valid());
    assert!(!validator.validate(&uri, r#"{"n": 5}"#).unwrap().valid());
}

#[test]
fn test_self_referential_schema_hits_the_depth_guard() {
    let validator = lenient();
    let uri = register(
        &validator,
        "https://test/loop",
        json!({"allOf": [{"$ref": "#"}]}),
    );

    let err = validator.validate(&uri, "1").unwrap_err();
    assert!(matches!(
        err,
        jsonvet_core::Error::DepthExceeded { .. }
    ));
}

#[test]
fn test_validate_accepts_fragment_addresses() {
    let validator = lenient();
    register(
        &validator,
        "https://test/frag",
        json!({"$defs": {"s": {"type": "string"}}}),
    );

    assert!(validator
        .validate("https://test/frag#/$defs/s", r#""ok""#)
        .unwrap()
        .valid());
    assert!(!validator
        .validate("https://test/frag#/$defs/s", "3")
        .unwrap()
        .valid());
}
