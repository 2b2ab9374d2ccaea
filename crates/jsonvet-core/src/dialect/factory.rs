//! Built-in keyword-to-evaluator tables, one per dialect
//!
//! Construction is lenient by design: malformed keyword input makes the
//! factory return `None`, so that single keyword stays inert instead of
//! failing the whole schema. Subschema values referenced here are compiled
//! and registered by the schema compiler before evaluation ever runs.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::dialect::keywords as k;
use crate::dialect::{EvaluatorFactory, ParsingContext, SpecVersion};
use crate::engine::Evaluator;
use crate::keywords::*;
use crate::uri::Location;
use regex::Regex;
use serde_json::Value;

/// The active dialect's built-in factory
#[derive(Debug, Clone, Copy)]
pub struct BuiltinFactory {
    pub version: SpecVersion,
}

impl BuiltinFactory {
    pub fn new(version: SpecVersion) -> Self {
        Self { version }
    }
}

fn is_schema(value: &Value) -> bool {
    value.is_object() || value.is_boolean()
}

fn schema_array(ctx: &ParsingContext<'_>, keyword: &str, value: &Value) -> Option<Vec<Location>> {
    let items = value.as_array()?;
    if items.is_empty() || !items.iter().all(is_schema) {
        return None;
    }
    Some(
        (0..items.len())
            .map(|i| ctx.child_index(keyword, i))
            .collect(),
    )
}

fn non_negative(value: &Value) -> Option<u64> {
    value.as_u64()
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

const TYPE_NAMES: &[&str] = &[
    "null", "boolean", "string", "integer", "number", "array", "object",
];

impl EvaluatorFactory for BuiltinFactory {
    fn create(
        &self,
        ctx: &ParsingContext<'_>,
        keyword: &str,
        value: &Value,
    ) -> Option<Box<dyn Evaluator>> {
        let version = self.version;
        let modern = version.uses_vocabularies();
        let draft6_up = version != SpecVersion::Draft4;
        let draft7_up = draft6_up && version != SpecVersion::Draft6;

        match keyword {
            // reference family
            k::REF => Some(Box::new(Ref {
                reference: value.as_str()?.to_string(),
            })),
            k::DYNAMIC_REF if version == SpecVersion::Draft2020_12 => Some(Box::new(DynamicRef {
                reference: value.as_str()?.to_string(),
            })),
            k::RECURSIVE_REF if version == SpecVersion::Draft2019_09 => {
                value.as_str()?;
                Some(Box::new(RecursiveRef))
            }

            // in-place applicators
            k::ALL_OF => Some(Box::new(AllOf {
                branches: schema_array(ctx, keyword, value)?,
            })),
            k::ANY_OF => Some(Box::new(AnyOf {
                branches: schema_array(ctx, keyword, value)?,
            })),
            k::ONE_OF => Some(Box::new(OneOf {
                branches: schema_array(ctx, keyword, value)?,
            })),
            k::NOT if is_schema(value) => Some(Box::new(Not {
                schema: ctx.child(keyword),
            })),
            k::IF if draft7_up && is_schema(value) => Some(Box::new(If {
                schema: ctx.child(keyword),
            })),
            k::THEN if draft7_up && is_schema(value) => Some(Box::new(Then {
                schema: ctx.child(keyword),
            })),
            k::ELSE if draft7_up && is_schema(value) => Some(Box::new(Else {
                schema: ctx.child(keyword),
            })),

            // object applicators
            k::PROPERTIES => {
                let object = value.as_object()?;
                if !object.values().all(is_schema) {
                    return None;
                }
                let children = object
                    .keys()
                    .map(|name| (name.clone(), ctx.child_member(keyword, name)))
                    .collect();
                Some(Box::new(Properties { children }))
            }
            k::PATTERN_PROPERTIES => {
                let object = value.as_object()?;
                let mut patterns = Vec::with_capacity(object.len());
                for (source, child) in object {
                    if !is_schema(child) {
                        return None;
                    }
                    let regex = Regex::new(source).ok()?;
                    patterns.push((source.clone(), regex, ctx.child_member(keyword, source)));
                }
                Some(Box::new(PatternProperties { patterns }))
            }
            k::ADDITIONAL_PROPERTIES if is_schema(value) => Some(Box::new(AdditionalProperties {
                schema: ctx.child(keyword),
            })),
            k::PROPERTY_NAMES if draft6_up && is_schema(value) => Some(Box::new(PropertyNames {
                schema: ctx.child(keyword),
            })),
            k::DEPENDENT_SCHEMAS if modern => {
                let object = value.as_object()?;
                if !object.values().all(is_schema) {
                    return None;
                }
                let children = object
                    .keys()
                    .map(|name| (name.clone(), ctx.child_member(keyword, name)))
                    .collect();
                Some(Box::new(DependentSchemas { children }))
            }
            k::DEPENDENCIES if !modern => {
                let object = value.as_object()?;
                let mut schema_deps = Vec::new();
                let mut required_deps = Vec::new();
                for (name, entry) in object {
                    if is_schema(entry) {
                        schema_deps.push((name.clone(), ctx.child_member(keyword, name)));
                    } else {
                        required_deps.push((name.clone(), string_list(entry)?));
                    }
                }
                Some(Box::new(Dependencies {
                    schema_deps,
                    required_deps,
                }))
            }

            // array applicators
            k::ITEMS if version == SpecVersion::Draft2020_12 => {
                if !is_schema(value) {
                    return None;
                }
                Some(Box::new(RestItems {
                    schema: ctx.child(keyword),
                }))
            }
            k::ITEMS => {
                if is_schema(value) {
                    Some(Box::new(LegacyItems::Single(ctx.child(keyword))))
                } else {
                    Some(Box::new(LegacyItems::Tuple(schema_array(
                        ctx, keyword, value,
                    )?)))
                }
            }
            k::PREFIX_ITEMS if version == SpecVersion::Draft2020_12 => {
                Some(Box::new(PrefixItems {
                    children: schema_array(ctx, keyword, value)?,
                }))
            }
            k::ADDITIONAL_ITEMS if version != SpecVersion::Draft2020_12 && is_schema(value) => {
                Some(Box::new(AdditionalItems {
                    schema: ctx.child(keyword),
                }))
            }
            k::CONTAINS if draft6_up && is_schema(value) => {
                let min_is_zero = modern
                    && ctx
                        .object
                        .get(k::MIN_CONTAINS)
                        .and_then(Value::as_u64)
                        .map(|min| min == 0)
                        .unwrap_or(false);
                Some(Box::new(Contains {
                    schema: ctx.child(keyword),
                    min_is_zero,
                }))
            }
            k::MIN_CONTAINS if modern => Some(Box::new(MinContains {
                min: non_negative(value)?,
            })),
            k::MAX_CONTAINS if modern => Some(Box::new(MaxContains {
                max: non_negative(value)?,
            })),

            // unevaluated family
            k::UNEVALUATED_PROPERTIES if modern && is_schema(value) => {
                Some(Box::new(UnevaluatedProperties {
                    schema: ctx.child(keyword),
                }))
            }
            k::UNEVALUATED_ITEMS if modern && is_schema(value) => {
                Some(Box::new(UnevaluatedItems {
                    schema: ctx.child(keyword),
                }))
            }

            // leaf predicates
            k::TYPE => {
                let allowed: Vec<String> = match value {
                    Value::String(s) => vec![s.clone()],
                    Value::Array(names) => names
                        .iter()
                        .map(|v| v.as_str().map(str::to_string))
                        .collect::<Option<_>>()?,
                    _ => return None,
                };
                if !allowed.iter().all(|t| TYPE_NAMES.contains(&t.as_str())) {
                    return None;
                }
                Some(Box::new(Type { allowed }))
            }
            k::CONST if draft6_up => Some(Box::new(Const {
                value: value.clone(),
            })),
            k::ENUM => Some(Box::new(Enum {
                values: value.as_array()?.clone(),
            })),
            k::MULTIPLE_OF => {
                let factor = value.as_f64()?;
                if factor <= 0.0 {
                    return None;
                }
                Some(Box::new(MultipleOf { factor }))
            }
            k::MAXIMUM => {
                let exclusive = version == SpecVersion::Draft4
                    && ctx.object.get(k::EXCLUSIVE_MAXIMUM) == Some(&Value::Bool(true));
                Some(Box::new(Maximum {
                    limit: value.as_f64()?,
                    exclusive,
                }))
            }
            k::MINIMUM => {
                let exclusive = version == SpecVersion::Draft4
                    && ctx.object.get(k::EXCLUSIVE_MINIMUM) == Some(&Value::Bool(true));
                Some(Box::new(Minimum {
                    limit: value.as_f64()?,
                    exclusive,
                }))
            }
            k::EXCLUSIVE_MAXIMUM if draft6_up => Some(Box::new(ExclusiveMaximum {
                limit: value.as_f64()?,
            })),
            k::EXCLUSIVE_MINIMUM if draft6_up => Some(Box::new(ExclusiveMinimum {
                limit: value.as_f64()?,
            })),
            k::MAX_LENGTH => Some(Box::new(MaxLength {
                limit: non_negative(value)?,
            })),
            k::MIN_LENGTH => Some(Box::new(MinLength {
                limit: non_negative(value)?,
            })),
            k::PATTERN => {
                let source = value.as_str()?;
                let regex = Regex::new(source).ok()?;
                Some(Box::new(Pattern {
                    source: source.to_string(),
                    regex,
                }))
            }
            k::MAX_ITEMS => Some(Box::new(MaxItems {
                limit: non_negative(value)?,
            })),
            k::MIN_ITEMS => Some(Box::new(MinItems {
                limit: non_negative(value)?,
            })),
            k::UNIQUE_ITEMS => match value {
                Value::Bool(true) => Some(Box::new(UniqueItems)),
                Value::Bool(false) => None,
                _ => None,
            },
            k::MAX_PROPERTIES => Some(Box::new(MaxProperties {
                limit: non_negative(value)?,
            })),
            k::MIN_PROPERTIES => Some(Box::new(MinProperties {
                limit: non_negative(value)?,
            })),
            k::REQUIRED => Some(Box::new(Required {
                names: string_list(value)?,
            })),
            k::DEPENDENT_REQUIRED if modern => {
                let object = value.as_object()?;
                let dependencies = object
                    .iter()
                    .map(|(name, names)| Some((name.clone(), string_list(names)?)))
                    .collect::<Option<_>>()?;
                Some(Box::new(DependentRequired { dependencies }))
            }

            // annotations
            k::TITLE | k::DESCRIPTION => {
                value.as_str()?;
                Some(Box::new(AnnotationKeyword {
                    value: value.clone(),
                }))
            }
            k::DEFAULT => Some(Box::new(AnnotationKeyword {
                value: value.clone(),
            })),
            k::EXAMPLES if draft6_up => {
                value.as_array()?;
                Some(Box::new(AnnotationKeyword {
                    value: value.clone(),
                }))
            }
            k::DEPRECATED if modern => {
                value.as_bool()?;
                Some(Box::new(AnnotationKeyword {
                    value: value.clone(),
                }))
            }
            k::READ_ONLY | k::WRITE_ONLY if draft7_up => {
                value.as_bool()?;
                Some(Box::new(AnnotationKeyword {
                    value: value.clone(),
                }))
            }
            k::FORMAT => Some(Box::new(Format {
                name: value.as_str()?.to_string(),
            })),
            k::CONTENT_ENCODING | k::CONTENT_MEDIA_TYPE if draft7_up => {
                value.as_str()?;
                Some(Box::new(AnnotationKeyword {
                    value: value.clone(),
                }))
            }

            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::JsonPointer;
    use crate::uri::Uri;
    use serde_json::json;

    fn create(
        version: SpecVersion,
        object: &Value,
        keyword: &str,
    ) -> Option<Box<dyn Evaluator>> {
        let base = Uri::parse("urn:test:factory").unwrap();
        let pointer = JsonPointer::root();
        let map = object.as_object().unwrap();
        let ctx = ParsingContext {
            base: &base,
            pointer: &pointer,
            object: map,
            version,
        };
        BuiltinFactory::new(version).create(&ctx, keyword, map.get(keyword).unwrap())
    }

    #[test]
    fn test_version_gating() {
        let schema = json!({"$dynamicRef": "#meta"});
        assert!(create(SpecVersion::Draft2020_12, &schema, "$dynamicRef").is_some());
        assert!(create(SpecVersion::Draft2019_09, &schema, "$dynamicRef").is_none());

        let schema = json!({"$recursiveRef": "#"});
        assert!(create(SpecVersion::Draft2019_09, &schema, "$recursiveRef").is_some());
        assert!(create(SpecVersion::Draft2020_12, &schema, "$recursiveRef").is_none());

        let schema = json!({"const": 1});
        assert!(create(SpecVersion::Draft6, &schema, "const").is_some());
        assert!(create(SpecVersion::Draft4, &schema, "const").is_none());
    }

    #[test]
    fn test_malformed_input_skips_the_evaluator() {
        assert!(create(SpecVersion::Draft2020_12, &json!({"type": 5}), "type").is_none());
        assert!(create(
            SpecVersion::Draft2020_12,
            &json!({"type": "frobnicate"}),
            "type"
        )
        .is_none());
        assert!(create(
            SpecVersion::Draft2020_12,
            &json!({"pattern": "(unclosed"}),
            "pattern"
        )
        .is_none());
        assert!(create(SpecVersion::Draft2020_12, &json!({"allOf": []}), "allOf").is_none());
        assert!(create(SpecVersion::Draft2020_12, &json!({"maxLength": -1}), "maxLength").is_none());
    }

    #[test]
    fn test_unknown_keyword_falls_through() {
        assert!(create(
            SpecVersion::Draft2020_12,
            &json!({"x-custom": true}),
            "x-custom"
        )
        .is_none());
    }
}
