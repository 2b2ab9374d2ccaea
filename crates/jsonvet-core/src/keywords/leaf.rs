//! Leaf predicates: single local checks with no cross-keyword interaction
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::engine::{EvalContext, Evaluator, Outcome};
use crate::error::Result;
use crate::node::{json_equal, json_type_name, InstanceNode};
use regex::Regex;
use serde_json::Value;

fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// `type`: one type name or a union of type names
pub struct Type {
    pub allowed: Vec<String>,
}

impl Type {
    pub fn matches(allowed: &str, value: &Value) -> bool {
        match allowed {
            "null" => value.is_null(),
            "boolean" => value.is_boolean(),
            "string" => value.is_string(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            "number" => value.is_number(),
            "integer" => json_type_name(value) == "integer",
            _ => false,
        }
    }
}

impl Evaluator for Type {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        if self.allowed.iter().any(|t| Self::matches(t, node.value)) {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::fail(format!(
                "Value is [{}] but should be [{}]",
                node.type_name(),
                self.allowed.join(", ")
            )))
        }
    }
}

/// `const`
pub struct Const {
    pub value: Value,
}

impl Evaluator for Const {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        if json_equal(&self.value, node.value) {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::fail(format!(
                "Expected {}",
                serde_json::to_string(&self.value).unwrap_or_default()
            )))
        }
    }
}

/// `enum`
pub struct Enum {
    pub values: Vec<Value>,
}

impl Evaluator for Enum {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        if self.values.iter().any(|v| json_equal(v, node.value)) {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::fail("Value is not one of the enumerated values"))
        }
    }
}

/// `multipleOf`
pub struct MultipleOf {
    pub factor: f64,
}

impl Evaluator for MultipleOf {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(number) = as_f64(node.value) else {
            return Ok(Outcome::valid());
        };
        let quotient = number / self.factor;
        if quotient.is_finite() && (quotient - quotient.round()).abs() < 1e-9 {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::fail(format!(
                "{} is not a multiple of {}",
                number, self.factor
            )))
        }
    }
}

/// `maximum`; `exclusive` covers the Draft 4 boolean modifier form
pub struct Maximum {
    pub limit: f64,
    pub exclusive: bool,
}

impl Evaluator for Maximum {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(number) = as_f64(node.value) else {
            return Ok(Outcome::valid());
        };
        let ok = if self.exclusive {
            number < self.limit
        } else {
            number <= self.limit
        };
        if ok {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::fail(format!(
                "{} is greater than the {}maximum {}",
                number,
                if self.exclusive { "exclusive " } else { "" },
                self.limit
            )))
        }
    }
}

/// `minimum`; `exclusive` covers the Draft 4 boolean modifier form
pub struct Minimum {
    pub limit: f64,
    pub exclusive: bool,
}

impl Evaluator for Minimum {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(number) = as_f64(node.value) else {
            return Ok(Outcome::valid());
        };
        let ok = if self.exclusive {
            number > self.limit
        } else {
            number >= self.limit
        };
        if ok {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::fail(format!(
                "{} is less than the {}minimum {}",
                number,
                if self.exclusive { "exclusive " } else { "" },
                self.limit
            )))
        }
    }
}

/// Numeric `exclusiveMaximum` (Draft 6 onwards)
pub struct ExclusiveMaximum {
    pub limit: f64,
}

impl Evaluator for ExclusiveMaximum {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        match as_f64(node.value) {
            Some(number) if number >= self.limit => Ok(Outcome::fail(format!(
                "{} is not less than the exclusive maximum {}",
                number, self.limit
            ))),
            _ => Ok(Outcome::valid()),
        }
    }
}

/// Numeric `exclusiveMinimum` (Draft 6 onwards)
pub struct ExclusiveMinimum {
    pub limit: f64,
}

impl Evaluator for ExclusiveMinimum {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        match as_f64(node.value) {
            Some(number) if number <= self.limit => Ok(Outcome::fail(format!(
                "{} is not greater than the exclusive minimum {}",
                number, self.limit
            ))),
            _ => Ok(Outcome::valid()),
        }
    }
}

/// `maxLength` in Unicode code points
pub struct MaxLength {
    pub limit: u64,
}

impl Evaluator for MaxLength {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        match node.value.as_str() {
            Some(s) if (s.chars().count() as u64) > self.limit => Ok(Outcome::fail(format!(
                "String is longer than {} characters",
                self.limit
            ))),
            _ => Ok(Outcome::valid()),
        }
    }
}

/// `minLength` in Unicode code points
pub struct MinLength {
    pub limit: u64,
}

impl Evaluator for MinLength {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        match node.value.as_str() {
            Some(s) if (s.chars().count() as u64) < self.limit => Ok(Outcome::fail(format!(
                "String is shorter than {} characters",
                self.limit
            ))),
            _ => Ok(Outcome::valid()),
        }
    }
}

/// `pattern`: unanchored regex match
pub struct Pattern {
    pub source: String,
    pub regex: Regex,
}

impl Evaluator for Pattern {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        match node.value.as_str() {
            Some(s) if !self.regex.is_match(s) => Ok(Outcome::fail(format!(
                "String does not match the pattern '{}'",
                self.source
            ))),
            _ => Ok(Outcome::valid()),
        }
    }
}

/// `maxItems`
pub struct MaxItems {
    pub limit: u64,
}

impl Evaluator for MaxItems {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        match node.as_array() {
            Some(items) if (items.len() as u64) > self.limit => Ok(Outcome::fail(format!(
                "Array has more than {} items",
                self.limit
            ))),
            _ => Ok(Outcome::valid()),
        }
    }
}

/// `minItems`
pub struct MinItems {
    pub limit: u64,
}

impl Evaluator for MinItems {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        match node.as_array() {
            Some(items) if (items.len() as u64) < self.limit => Ok(Outcome::fail(format!(
                "Array has less than {} items",
                self.limit
            ))),
            _ => Ok(Outcome::valid()),
        }
    }
}

/// `uniqueItems`
pub struct UniqueItems;

impl Evaluator for UniqueItems {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(items) = node.as_array() else {
            return Ok(Outcome::valid());
        };
        for (i, a) in items.iter().enumerate() {
            for b in items.iter().skip(i + 1) {
                if json_equal(a, b) {
                    return Ok(Outcome::fail("Array items are not unique"));
                }
            }
        }
        Ok(Outcome::valid())
    }
}

/// `maxProperties`
pub struct MaxProperties {
    pub limit: u64,
}

impl Evaluator for MaxProperties {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        match node.as_object() {
            Some(object) if (object.len() as u64) > self.limit => Ok(Outcome::fail(format!(
                "Object has more than {} properties",
                self.limit
            ))),
            _ => Ok(Outcome::valid()),
        }
    }
}

/// `minProperties`
pub struct MinProperties {
    pub limit: u64,
}

impl Evaluator for MinProperties {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        match node.as_object() {
            Some(object) if (object.len() as u64) < self.limit => Ok(Outcome::fail(format!(
                "Object has less than {} properties",
                self.limit
            ))),
            _ => Ok(Outcome::valid()),
        }
    }
}

/// `required`
pub struct Required {
    pub names: Vec<String>,
}

impl Evaluator for Required {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(object) = node.as_object() else {
            return Ok(Outcome::valid());
        };
        let missing: Vec<&str> = self
            .names
            .iter()
            .filter(|name| !object.contains_key(*name))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::fail(format!(
                "Object is missing required properties [{}]",
                missing.join(", ")
            )))
        }
    }
}

/// `dependentRequired`
pub struct DependentRequired {
    pub dependencies: Vec<(String, Vec<String>)>,
}

impl Evaluator for DependentRequired {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(object) = node.as_object() else {
            return Ok(Outcome::valid());
        };
        let mut missing = Vec::new();
        for (trigger, required) in &self.dependencies {
            if !object.contains_key(trigger) {
                continue;
            }
            for name in required {
                if !object.contains_key(name) {
                    missing.push(format!("'{}' required by '{}'", name, trigger));
                }
            }
        }
        if missing.is_empty() {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::fail(format!(
                "Object is missing dependent properties: {}",
                missing.join(", ")
            )))
        }
    }
}
