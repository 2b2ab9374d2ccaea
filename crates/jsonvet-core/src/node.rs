//! Instance-node access with automatic child pointers
//!
//! The engine addresses instance values through [`InstanceNode`], a borrowed
//! view that pairs a `serde_json::Value` with its JSON-Pointer position
//! relative to the document root. Child access derives child pointers
//! automatically, so evaluators never build instance locations by hand.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::error::Result;
use crate::pointer::JsonPointer;
use serde_json::{Map, Value};

/// Pluggable text-to-node parsing seam.
///
/// The default factory parses with `serde_json`; callers that need lenient
/// or streaming input can supply their own. Already-materialized
/// `serde_json::Value`s bypass the factory through the `*_value` entry
/// points on the validator.
pub trait JsonNodeFactory: Send + Sync {
    /// Parse a textual document into a JSON value
    fn create(&self, text: &str) -> Result<Value>;
}

/// Node factory backed by `serde_json`
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNodeFactory;

impl JsonNodeFactory for DefaultNodeFactory {
    fn create(&self, text: &str) -> Result<Value> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A borrowed instance value together with its position in the document
#[derive(Debug, Clone)]
pub struct InstanceNode<'a> {
    pub value: &'a Value,
    pub location: JsonPointer,
}

impl<'a> InstanceNode<'a> {
    /// The document root
    pub fn root(value: &'a Value) -> Self {
        Self {
            value,
            location: JsonPointer::root(),
        }
    }

    /// A node at an explicit location (used for derived values such as
    /// property names)
    pub fn at(value: &'a Value, location: JsonPointer) -> Self {
        Self { value, location }
    }

    /// Child node for an object member
    pub fn member(&self, key: &str, value: &'a Value) -> InstanceNode<'a> {
        InstanceNode {
            value,
            location: self.location.push(key),
        }
    }

    /// Child node for an array element
    pub fn element(&self, index: usize, value: &'a Value) -> InstanceNode<'a> {
        InstanceNode {
            value,
            location: self.location.push_index(index),
        }
    }

    pub fn as_object(&self) -> Option<&'a Map<String, Value>> {
        self.value.as_object()
    }

    pub fn as_array(&self) -> Option<&'a Vec<Value>> {
        self.value.as_array()
    }

    /// Short type name used in failure messages
    pub fn type_name(&self) -> &'static str {
        json_type_name(self.value)
    }
}

/// Short JSON type name for a value
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if is_integral(n) {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_integral(n: &serde_json::Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false)
}

/// JSON equality with cross-representation numeric comparison.
///
/// `1` and `1.0` are equal; everything else follows structural equality.
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(xi), Some(yi)) = (x.as_i64(), y.as_i64()) {
                return xi == yi;
            }
            if let (Some(xu), Some(yu)) = (x.as_u64(), y.as_u64()) {
                return xu == yu;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(xf), Some(yf)) => xf == yf,
                _ => x == y,
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map(|y| json_equal(x, y)).unwrap_or(false))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_factory_parses() {
        let factory = DefaultNodeFactory;
        let value = factory.create(r#"{"a": [1, 2]}"#).unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));
        assert!(factory.create("{not json").is_err());
    }

    #[test]
    fn test_child_pointers() {
        let value = json!({"a/b": [null, {"c": 1}]});
        let root = InstanceNode::root(&value);
        let arr = root.member("a/b", &value["a/b"]);
        assert_eq!(arr.location.as_str(), "/a~1b");
        let item = arr.element(1, &arr.value[1]);
        assert_eq!(item.location.as_str(), "/a~1b/1");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(json_type_name(&json!(1)), "integer");
        assert_eq!(json_type_name(&json!(1.0)), "integer");
        assert_eq!(json_type_name(&json!(1.5)), "number");
        assert_eq!(json_type_name(&json!("x")), "string");
        assert_eq!(json_type_name(&json!(null)), "null");
    }

    #[test]
    fn test_numeric_equality() {
        assert!(json_equal(&json!(1), &json!(1.0)));
        assert!(!json_equal(&json!(1), &json!(1.5)));
        assert!(json_equal(&json!([1, {"a": 2}]), &json!([1.0, {"a": 2.0}])));
        assert!(!json_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }
}
