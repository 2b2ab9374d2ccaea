//! Array applicators: the items family and the contains family
//!
//! The consumed-prefix handoff (`prefixItems` to `items`, legacy array-form
//! `items` to `additionalItems`) and the matched-index handoff (`contains`
//! to `minContains`/`maxContains`) go through sibling annotations, never
//! through direct evaluator calls.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::engine::{EvalContext, Evaluator, Outcome};
use crate::error::Result;
use crate::node::InstanceNode;
use crate::uri::Location;
use serde_json::{json, Value};

/// Consumed-prefix annotation: `true` when every element was covered,
/// otherwise the largest covered index
fn prefix_annotation(covered: usize, len: usize) -> Value {
    if covered >= len && len > 0 {
        Value::Bool(true)
    } else if covered == 0 {
        json!(-1)
    } else {
        json!(covered - 1)
    }
}

/// First index not yet covered according to a consumed-prefix annotation
fn start_after(annotation: Option<Value>) -> Option<usize> {
    match annotation {
        None => Some(0),
        Some(Value::Bool(true)) => None,
        Some(Value::Number(n)) => {
            let last = n.as_i64().unwrap_or(-1);
            Some((last + 1).max(0) as usize)
        }
        Some(_) => Some(0),
    }
}

/// Legacy `items` (Draft 4 through 2019-09): one schema for every element,
/// or a tuple of positional schemas
pub enum LegacyItems {
    Single(Location),
    Tuple(Vec<Location>),
}

impl Evaluator for LegacyItems {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(items) = node.as_array() else {
            return Ok(Outcome::valid());
        };
        let path = ctx.current_path().to_string();
        let mut failed = false;
        match self {
            LegacyItems::Single(child) => {
                for (index, value) in items.iter().enumerate() {
                    let element = node.element(index, value);
                    failed |= !ctx.apply(child, &path, &element)?;
                }
                if failed {
                    Ok(Outcome::invalid())
                } else {
                    Ok(Outcome::annotation(Value::Bool(true)))
                }
            }
            LegacyItems::Tuple(children) => {
                let covered = children.len().min(items.len());
                for (index, child) in children.iter().take(covered).enumerate() {
                    let element = node.element(index, &items[index]);
                    let element_path = format!("{}/{}", path, index);
                    failed |= !ctx.apply(child, &element_path, &element)?;
                }
                if failed {
                    Ok(Outcome::invalid())
                } else {
                    Ok(Outcome::annotation(prefix_annotation(covered, items.len())))
                }
            }
        }
    }
}

/// 2020-12 `prefixItems`: positional schemas, annotates the consumed prefix
pub struct PrefixItems {
    pub children: Vec<Location>,
}

impl Evaluator for PrefixItems {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(items) = node.as_array() else {
            return Ok(Outcome::valid());
        };
        let path = ctx.current_path().to_string();
        let covered = self.children.len().min(items.len());
        let mut failed = false;
        for (index, child) in self.children.iter().take(covered).enumerate() {
            let element = node.element(index, &items[index]);
            let element_path = format!("{}/{}", path, index);
            failed |= !ctx.apply(child, &element_path, &element)?;
        }
        if failed {
            Ok(Outcome::invalid())
        } else {
            Ok(Outcome::annotation(prefix_annotation(covered, items.len())))
        }
    }
}

/// 2020-12 `items`: applies past the prefix consumed by the sibling
/// `prefixItems` annotation
pub struct RestItems {
    pub schema: Location,
}

impl Evaluator for RestItems {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(items) = node.as_array() else {
            return Ok(Outcome::valid());
        };
        let Some(start) = start_after(ctx.sibling_annotation("prefixItems", node.location.as_str()))
        else {
            return Ok(Outcome::valid());
        };
        let path = ctx.current_path().to_string();
        let mut failed = false;
        let mut applied = false;
        for (index, value) in items.iter().enumerate().skip(start) {
            applied = true;
            let element = node.element(index, value);
            failed |= !ctx.apply(&self.schema, &path, &element)?;
        }
        if failed {
            Ok(Outcome::invalid())
        } else if applied {
            Ok(Outcome::annotation(Value::Bool(true)))
        } else {
            Ok(Outcome::valid())
        }
    }
}

/// Legacy `additionalItems`: applies past the prefix consumed by the
/// array-form sibling `items` annotation; inert otherwise
pub struct AdditionalItems {
    pub schema: Location,
}

impl Evaluator for AdditionalItems {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(items) = node.as_array() else {
            return Ok(Outcome::valid());
        };
        let annotation = ctx.sibling_annotation("items", node.location.as_str());
        if annotation.is_none() {
            return Ok(Outcome::valid());
        }
        let Some(start) = start_after(annotation) else {
            return Ok(Outcome::valid());
        };
        let path = ctx.current_path().to_string();
        let mut failed = false;
        let mut applied = false;
        for (index, value) in items.iter().enumerate().skip(start) {
            applied = true;
            let element = node.element(index, value);
            failed |= !ctx.apply(&self.schema, &path, &element)?;
        }
        if failed {
            Ok(Outcome::invalid())
        } else if applied {
            Ok(Outcome::annotation(Value::Bool(true)))
        } else {
            Ok(Outcome::valid())
        }
    }
}

/// `contains`: at least one element must match unless the sibling
/// `minContains` is zero; annotates the matched indexes
pub struct Contains {
    pub schema: Location,
    pub min_is_zero: bool,
}

impl Evaluator for Contains {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(items) = node.as_array() else {
            return Ok(Outcome::valid());
        };
        let path = ctx.current_path().to_string();
        let mut matched = Vec::new();
        for (index, value) in items.iter().enumerate() {
            let element = node.element(index, value);
            if ctx.apply(&self.schema, &path, &element)? {
                matched.push(index);
            }
        }
        if matched.is_empty() && !self.min_is_zero {
            if items.is_empty() {
                Ok(Outcome::fail("Array contains no matching items"))
            } else {
                Ok(Outcome::invalid())
            }
        } else {
            Ok(Outcome::annotation(json!(matched)))
        }
    }
}

/// `minContains`: reads the sibling `contains` match-index annotation
pub struct MinContains {
    pub min: u64,
}

impl Evaluator for MinContains {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        if node.as_array().is_none() {
            return Ok(Outcome::valid());
        }
        let Some(Value::Array(matched)) =
            ctx.sibling_annotation("contains", node.location.as_str())
        else {
            return Ok(Outcome::valid());
        };
        if (matched.len() as u64) < self.min {
            Ok(Outcome::fail(format!(
                "Array contains less than {} matching items",
                self.min
            )))
        } else {
            Ok(Outcome::valid())
        }
    }
}

/// `maxContains`: reads the sibling `contains` match-index annotation
pub struct MaxContains {
    pub max: u64,
}

impl Evaluator for MaxContains {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        if node.as_array().is_none() {
            return Ok(Outcome::valid());
        }
        let Some(Value::Array(matched)) =
            ctx.sibling_annotation("contains", node.location.as_str())
        else {
            return Ok(Outcome::valid());
        };
        if (matched.len() as u64) > self.max {
            Ok(Outcome::fail(format!(
                "Array contains more than {} matching items",
                self.max
            )))
        } else {
            Ok(Outcome::valid())
        }
    }
}
