//! Object applicators: the properties family, property names and
//! schema dependencies
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::engine::{EvalContext, Evaluator, Outcome};
use crate::error::Result;
use crate::node::InstanceNode;
use crate::pointer;
use crate::uri::Location;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;

fn names_value(names: impl IntoIterator<Item = String>) -> Value {
    Value::Array(names.into_iter().map(Value::String).collect())
}

fn names_from_annotation(detail: &Value, into: &mut BTreeSet<String>) {
    if let Value::Array(items) = detail {
        for item in items {
            if let Value::String(name) = item {
                into.insert(name.clone());
            }
        }
    }
}

/// `properties`: validates named members, annotates the processed key set
pub struct Properties {
    pub children: Vec<(String, Location)>,
}

impl Evaluator for Properties {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(object) = node.as_object() else {
            return Ok(Outcome::valid());
        };
        let path = ctx.current_path().to_string();
        let mut matched = Vec::new();
        let mut failed = Vec::new();
        for (name, child) in &self.children {
            let Some(value) = object.get(name) else {
                continue;
            };
            let member = node.member(name, value);
            let member_path = format!("{}/{}", path, pointer::escape(name));
            if ctx.apply(child, &member_path, &member)? {
                matched.push(name.clone());
            } else {
                failed.push(name.clone());
            }
        }
        if failed.is_empty() {
            Ok(Outcome::annotation(names_value(matched)))
        } else {
            Ok(Outcome::invalid())
        }
    }
}

/// `patternProperties`: validates members whose names match each pattern
pub struct PatternProperties {
    pub patterns: Vec<(String, Regex, Location)>,
}

impl Evaluator for PatternProperties {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(object) = node.as_object() else {
            return Ok(Outcome::valid());
        };
        let path = ctx.current_path().to_string();
        let mut matched = BTreeSet::new();
        let mut failed = BTreeSet::new();
        for (source, regex, child) in &self.patterns {
            for (name, value) in object {
                if !regex.is_match(name) {
                    continue;
                }
                let member = node.member(name, value);
                let member_path = format!("{}/{}", path, pointer::escape(source));
                if ctx.apply(child, &member_path, &member)? {
                    matched.insert(name.clone());
                } else {
                    failed.insert(name.clone());
                }
            }
        }
        if failed.is_empty() {
            Ok(Outcome::annotation(names_value(matched)))
        } else {
            Ok(Outcome::invalid())
        }
    }
}

/// `additionalProperties`: applies to members not claimed by the sibling
/// `properties`/`patternProperties` annotations
pub struct AdditionalProperties {
    pub schema: Location,
}

impl Evaluator for AdditionalProperties {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(object) = node.as_object() else {
            return Ok(Outcome::valid());
        };
        let mut claimed = BTreeSet::new();
        let instance_location = node.location.as_str().to_string();
        for keyword in ["properties", "patternProperties"] {
            if let Some(detail) = ctx.sibling_annotation(keyword, &instance_location) {
                names_from_annotation(&detail, &mut claimed);
            }
        }
        let path = ctx.current_path().to_string();
        let mut processed = Vec::new();
        let mut failed = Vec::new();
        for (name, value) in object {
            if claimed.contains(name) {
                continue;
            }
            let member = node.member(name, value);
            if ctx.apply(&self.schema, &path, &member)? {
                processed.push(name.clone());
            } else {
                failed.push(name.clone());
            }
        }
        if failed.is_empty() {
            Ok(Outcome::annotation(names_value(processed)))
        } else {
            Ok(Outcome::invalid())
        }
    }
}

/// `propertyNames`: validates every member name as a string instance
pub struct PropertyNames {
    pub schema: Location,
}

impl Evaluator for PropertyNames {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(object) = node.as_object() else {
            return Ok(Outcome::valid());
        };
        let path = ctx.current_path().to_string();
        let mut failed = Vec::new();
        for name in object.keys() {
            let name_value = Value::String(name.clone());
            let name_node = InstanceNode::at(&name_value, node.location.push(name));
            if !ctx.apply(&self.schema, &path, &name_node)? {
                failed.push(name.clone());
            }
        }
        if failed.is_empty() {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::invalid())
        }
    }
}

/// `dependentSchemas`: applies a subschema to the whole object when the
/// trigger member is present
pub struct DependentSchemas {
    pub children: Vec<(String, Location)>,
}

impl Evaluator for DependentSchemas {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(object) = node.as_object() else {
            return Ok(Outcome::valid());
        };
        let path = ctx.current_path().to_string();
        let mut failed = Vec::new();
        for (name, child) in &self.children {
            if !object.contains_key(name) {
                continue;
            }
            let child_path = format!("{}/{}", path, pointer::escape(name));
            if !ctx.apply(child, &child_path, node)? {
                failed.push(name.clone());
            }
        }
        if failed.is_empty() {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::invalid())
        }
    }
}

/// Legacy `dependencies`: each entry is either a schema dependency or a
/// required-names dependency, split at compile time
pub struct Dependencies {
    pub schema_deps: Vec<(String, Location)>,
    pub required_deps: Vec<(String, Vec<String>)>,
}

impl Evaluator for Dependencies {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(object) = node.as_object() else {
            return Ok(Outcome::valid());
        };
        let path = ctx.current_path().to_string();
        let mut schema_failed = false;
        for (name, child) in &self.schema_deps {
            if !object.contains_key(name) {
                continue;
            }
            let child_path = format!("{}/{}", path, pointer::escape(name));
            schema_failed |= !ctx.apply(child, &child_path, node)?;
        }
        let mut missing = Vec::new();
        for (name, required) in &self.required_deps {
            if !object.contains_key(name) {
                continue;
            }
            for needed in required {
                if !object.contains_key(needed) {
                    missing.push(format!("'{}' required by '{}'", needed, name));
                }
            }
        }
        if !missing.is_empty() {
            Ok(Outcome::fail(format!(
                "Object dependencies are not satisfied: {}",
                missing.join(", ")
            )))
        } else if schema_failed {
            Ok(Outcome::invalid())
        } else {
            Ok(Outcome::valid())
        }
    }
}
