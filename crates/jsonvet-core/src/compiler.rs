//! Schema compiler
//!
//! Walks a raw schema document depth-first, assigns absolute identifiers,
//! collects anchors and emits immutable [`CompiledSchema`] objects into the
//! registry as one atomic batch. Identifier errors are raised before
//! anything is registered. Meta-schema orchestration (bootstrap, vocabulary
//! activation) lives in the validator; this module only turns one document
//! into registry state.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::dialect::{
    keyword_traits, keywords as k, BuiltinFactory, EvaluatorFactory, ParsingContext, SpecVersion,
};
use crate::error::{Error, Result};
use crate::keywords::BooleanSchema;
use crate::pointer::JsonPointer;
use crate::registry::{CompiledSchema, SchemaRegistry, WrappedEvaluator};
use crate::uri::Uri;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Per-document compilation inputs
pub(crate) struct CompileOptions<'a> {
    pub version: SpecVersion,
    pub active_vocabularies: HashSet<String>,
    pub user_factory: Option<&'a dyn EvaluatorFactory>,
}

/// An identifier scope opened by the registration URI or a nested `$id`
struct Scope {
    base: Uri,
    /// Walk pointer at which this scope begins
    root: JsonPointer,
}

/// Pending registry insertions, committed atomically at the end
#[derive(Default)]
struct Batch {
    schemas: Vec<(Uri, JsonPointer, Arc<CompiledSchema>)>,
    named_anchors: Vec<(Uri, String, Arc<CompiledSchema>)>,
    dynamic_anchors: Vec<(Uri, String, Arc<CompiledSchema>)>,
}

/// Compile one raw document and publish it under `uri`
pub(crate) fn compile_document(
    registry: &SchemaRegistry,
    options: &CompileOptions<'_>,
    uri: &Uri,
    raw: &Value,
) -> Result<()> {
    let mut batch = Batch::default();
    let mut scopes = vec![Scope {
        base: uri.clone(),
        root: JsonPointer::root(),
    }];
    compile_node(options, raw, &JsonPointer::root(), &mut scopes, &mut batch)?;
    tracing::debug!(uri = %uri, schemas = batch.schemas.len(), "registering compiled document");
    registry.commit(move |state| {
        for (base, pointer, schema) in batch.schemas {
            state.insert_schema(&base, &pointer, schema);
        }
        for (base, name, schema) in batch.named_anchors {
            state.insert_named_anchor(&base, &name, schema);
        }
        for (base, name, schema) in batch.dynamic_anchors {
            state.insert_dynamic_anchor(&base, &name, schema);
        }
    });
    Ok(())
}

fn compile_node(
    options: &CompileOptions<'_>,
    value: &Value,
    walk_ptr: &JsonPointer,
    scopes: &mut Vec<Scope>,
    batch: &mut Batch,
) -> Result<()> {
    match value {
        Value::Bool(literal) => {
            let schema = boolean_schema(options, *literal, walk_ptr, scopes);
            register(walk_ptr, scopes, batch, schema);
            Ok(())
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                compile_node(options, item, &walk_ptr.push_index(index), scopes, batch)?;
            }
            Ok(())
        }
        Value::Object(object) => compile_object(options, object, walk_ptr, scopes, batch),
        _ => Ok(()),
    }
}

fn compile_object(
    options: &CompileOptions<'_>,
    object: &Map<String, Value>,
    walk_ptr: &JsonPointer,
    scopes: &mut Vec<Scope>,
    batch: &mut Batch,
) -> Result<()> {
    let version = options.version;
    let mut pushed_scope = false;
    let mut anchor_from_id = None;

    if let Some(id) = object.get(version.id_keyword()).and_then(Value::as_str) {
        let current_base = scopes.last().expect("scope stack underflow").base.clone();
        let location = current_base.resolve(id)?;
        if !location.fragment.is_empty() {
            if !version.allows_anchor_fragment_in_id() {
                return Err(Error::argument(format!(
                    "'{}' must not contain a non-empty fragment: '{}'",
                    version.id_keyword(),
                    id
                )));
            }
            if location.is_pointer() {
                return Err(Error::argument(format!(
                    "'{}' fragment must be a plain anchor name: '{}'",
                    version.id_keyword(),
                    id
                )));
            }
            anchor_from_id = Some(location.fragment.clone());
        }
        // a fragment-only identifier declares an anchor without opening a scope
        if !id.starts_with('#') && location.base != current_base {
            scopes.push(Scope {
                base: location.base,
                root: walk_ptr.clone(),
            });
            pushed_scope = true;
        }
    }

    // children first, inside the scope this object may have opened
    for (key, child) in object {
        compile_node(options, child, &walk_ptr.push(key), scopes, batch)?;
    }

    let canonical = scopes.last().expect("scope stack underflow");
    let canonical_base = canonical.base.clone();
    let rel = walk_ptr
        .strip_prefix(&canonical.root)
        .expect("walk pointer outside its scope");

    let parsing_ctx = ParsingContext {
        base: &canonical_base,
        pointer: &rel,
        object,
        version,
    };
    let builtin = BuiltinFactory::new(version);
    let suppress_siblings = version.ref_suppresses_siblings() && object.contains_key(k::REF);

    let mut evaluators = Vec::new();
    for (key, value) in object {
        if suppress_siblings && key != k::REF {
            continue;
        }
        let evaluator = options
            .user_factory
            .and_then(|factory| factory.create(&parsing_ctx, key, value))
            .or_else(|| builtin.create(&parsing_ctx, key, value));
        if let Some(evaluator) = evaluator {
            let (order, vocabularies) = keyword_traits(version, key);
            evaluators.push(WrappedEvaluator {
                keyword: Some(key.clone()),
                keyword_path: rel.push(key),
                evaluator,
                order,
                vocabularies,
            });
        }
    }
    if evaluators.is_empty() {
        // always present in the registry for pointer-based lookup
        evaluators.push(WrappedEvaluator {
            keyword: None,
            keyword_path: rel.clone(),
            evaluator: Box::new(BooleanSchema { value: true }),
            order: 0,
            vocabularies: &[],
        });
    }
    evaluators.sort_by_key(|e| e.order);

    let schema = Arc::new(CompiledSchema {
        parent_uri: canonical_base.clone(),
        location: rel.clone(),
        evaluators,
        active_vocabularies: options.active_vocabularies.clone(),
    });

    if let Some(name) = anchor_from_id {
        batch
            .named_anchors
            .push((canonical_base.clone(), name, schema.clone()));
    }
    if version.uses_vocabularies() {
        if let Some(name) = object.get(k::ANCHOR).and_then(Value::as_str) {
            batch
                .named_anchors
                .push((canonical_base.clone(), name.to_string(), schema.clone()));
        }
    }
    if version == SpecVersion::Draft2020_12 {
        if let Some(name) = object.get(k::DYNAMIC_ANCHOR).and_then(Value::as_str) {
            batch
                .dynamic_anchors
                .push((canonical_base.clone(), name.to_string(), schema.clone()));
        }
    }
    if version == SpecVersion::Draft2019_09
        && object.get(k::RECURSIVE_ANCHOR) == Some(&Value::Bool(true))
        && rel.is_root()
    {
        batch
            .dynamic_anchors
            .push((canonical_base.clone(), String::new(), schema.clone()));
    }

    register(walk_ptr, scopes, batch, schema);
    if pushed_scope {
        scopes.pop();
    }
    Ok(())
}

fn boolean_schema(
    options: &CompileOptions<'_>,
    literal: bool,
    walk_ptr: &JsonPointer,
    scopes: &[Scope],
) -> Arc<CompiledSchema> {
    let canonical = scopes.last().expect("scope stack underflow");
    let rel = walk_ptr
        .strip_prefix(&canonical.root)
        .expect("walk pointer outside its scope");
    Arc::new(CompiledSchema {
        parent_uri: canonical.base.clone(),
        location: rel.clone(),
        evaluators: vec![WrappedEvaluator {
            keyword: None,
            keyword_path: rel,
            evaluator: Box::new(BooleanSchema { value: literal }),
            order: 0,
            vocabularies: &[],
        }],
        active_vocabularies: options.active_vocabularies.clone(),
    })
}

/// Register a compiled schema under every enclosing scope, so that both the
/// enclosing document's pointer and the schema's own bucket stay valid
fn register(
    walk_ptr: &JsonPointer,
    scopes: &[Scope],
    batch: &mut Batch,
    schema: Arc<CompiledSchema>,
) {
    for scope in scopes {
        if let Some(rel) = walk_ptr.strip_prefix(&scope.root) {
            batch.schemas.push((scope.base.clone(), rel, schema.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uri::Location;
    use serde_json::json;

    fn compile(uri: &str, raw: Value) -> SchemaRegistry {
        let registry = SchemaRegistry::new();
        let options = CompileOptions {
            version: SpecVersion::Draft2020_12,
            active_vocabularies: HashSet::new(),
            user_factory: None,
        };
        compile_document(&registry, &options, &Uri::parse(uri).unwrap(), &raw).unwrap();
        registry
    }

    #[test]
    fn test_every_subschema_is_addressable() {
        let registry = compile(
            "https://example.com/root",
            json!({
                "properties": {"a": {"type": "string"}},
                "$defs": {"b": true}
            }),
        );
        for fragment in ["", "/properties/a", "/$defs/b", "/properties"] {
            let location = Location {
                base: Uri::parse("https://example.com/root").unwrap(),
                fragment: fragment.to_string(),
            };
            assert!(registry.get(&location).is_some(), "missing {}", fragment);
        }
    }

    #[test]
    fn test_nested_id_is_registered_twice() {
        let registry = compile(
            "https://example.com/root",
            json!({
                "$defs": {
                    "inner": {
                        "$id": "https://example.com/inner",
                        "properties": {"x": {"type": "integer"}}
                    }
                }
            }),
        );
        let by_own_uri = registry
            .get(&Location::parse("https://example.com/inner#").unwrap())
            .unwrap();
        let by_enclosing_pointer = registry
            .get(&Location::parse("https://example.com/root#/$defs/inner").unwrap())
            .unwrap();
        assert!(Arc::ptr_eq(&by_own_uri, &by_enclosing_pointer));
        assert_eq!(by_own_uri.parent_uri.as_str(), "https://example.com/inner");
        // descendants are re-homed into the inner bucket and stay reachable
        // through the enclosing document's pointer as well
        let rehomed = registry
            .get(&Location::parse("https://example.com/inner#/properties/x").unwrap())
            .unwrap();
        assert_eq!(rehomed.location.as_str(), "/properties/x");
        assert!(registry
            .get(&Location::parse("https://example.com/root#/$defs/inner/properties/x").unwrap())
            .is_some());
    }

    #[test]
    fn test_modern_id_rejects_fragments() {
        let registry = SchemaRegistry::new();
        let options = CompileOptions {
            version: SpecVersion::Draft2020_12,
            active_vocabularies: HashSet::new(),
            user_factory: None,
        };
        let err = compile_document(
            &registry,
            &options,
            &Uri::parse("https://example.com/root").unwrap(),
            &json!({"$id": "https://example.com/other#frag"}),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Argument { .. }));
        // nothing was registered
        assert!(registry
            .get(&Location::parse("https://example.com/root#").unwrap())
            .is_none());
    }

    #[test]
    fn test_anchors_land_in_parent_bucket() {
        let registry = compile(
            "https://example.com/root",
            json!({
                "$defs": {
                    "a": {"$anchor": "alpha"},
                    "d": {"$dynamicAnchor": "delta"}
                }
            }),
        );
        let base = Uri::parse("https://example.com/root").unwrap();
        assert!(registry
            .get(&Location {
                base: base.clone(),
                fragment: "alpha".into()
            })
            .is_some());
        assert!(registry
            .get_dynamic(&Location {
                base,
                fragment: "delta".into()
            })
            .is_some());
    }

    #[test]
    fn test_legacy_ref_suppresses_siblings() {
        let registry = SchemaRegistry::new();
        let options = CompileOptions {
            version: SpecVersion::Draft7,
            active_vocabularies: HashSet::new(),
            user_factory: None,
        };
        compile_document(
            &registry,
            &options,
            &Uri::parse("https://example.com/legacy").unwrap(),
            &json!({"$ref": "#/definitions/x", "type": "string", "definitions": {"x": true}}),
        )
        .unwrap();
        let root = registry
            .get(&Location::parse("https://example.com/legacy#").unwrap())
            .unwrap();
        assert_eq!(root.evaluators.len(), 1);
        assert_eq!(root.evaluators[0].keyword.as_deref(), Some("$ref"));
    }
}
