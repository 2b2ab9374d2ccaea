//! The unevaluated family
//!
//! These run last (highest declared order) and read the union of everything
//! earlier sibling keywords and nested in-place applicators processed, by
//! scanning the retained annotation subtree for the current instance
//! location. Annotations produced under failed branches were already
//! discarded, so they do not count as evaluated.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::engine::{EvalContext, Evaluator, Outcome};
use crate::error::Result;
use crate::node::InstanceNode;
use crate::uri::Location;
use serde_json::Value;
use std::collections::BTreeSet;

/// `unevaluatedProperties`: applies to members no retained annotation claims
pub struct UnevaluatedProperties {
    pub schema: Location,
}

impl Evaluator for UnevaluatedProperties {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(object) = node.as_object() else {
            return Ok(Outcome::valid());
        };
        let mut claimed = BTreeSet::new();
        for detail in ctx.evaluated_annotations(
            &[
                "properties",
                "patternProperties",
                "additionalProperties",
                "unevaluatedProperties",
            ],
            node.location.as_str(),
        ) {
            if let Value::Array(names) = detail {
                for name in names {
                    if let Value::String(name) = name {
                        claimed.insert(name);
                    }
                }
            }
        }
        let path = ctx.current_path().to_string();
        let mut processed = Vec::new();
        let mut failed = false;
        for (name, value) in object {
            if claimed.contains(name) {
                continue;
            }
            let member = node.member(name, value);
            if ctx.apply(&self.schema, &path, &member)? {
                processed.push(name.clone());
            } else {
                failed = true;
            }
        }
        if failed {
            Ok(Outcome::invalid())
        } else {
            Ok(Outcome::annotation(Value::Array(
                processed.into_iter().map(Value::String).collect(),
            )))
        }
    }
}

/// `unevaluatedItems`: applies to elements no retained annotation covers
pub struct UnevaluatedItems {
    pub schema: Location,
}

impl Evaluator for UnevaluatedItems {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let Some(items) = node.as_array() else {
            return Ok(Outcome::valid());
        };
        let mut all_covered = false;
        let mut covered_prefix = 0usize;
        let mut covered_indexes = BTreeSet::new();
        for detail in ctx.evaluated_annotations(
            &[
                "prefixItems",
                "items",
                "additionalItems",
                "unevaluatedItems",
            ],
            node.location.as_str(),
        ) {
            match detail {
                Value::Bool(true) => all_covered = true,
                Value::Number(n) => {
                    let last = n.as_i64().unwrap_or(-1);
                    covered_prefix = covered_prefix.max((last + 1).max(0) as usize);
                }
                _ => {}
            }
        }
        // elements matched by `contains` count as evaluated too
        for detail in ctx.evaluated_annotations(&["contains"], node.location.as_str()) {
            if let Value::Array(indexes) = detail {
                for index in indexes {
                    if let Some(index) = index.as_u64() {
                        covered_indexes.insert(index as usize);
                    }
                }
            }
        }
        if all_covered {
            return Ok(Outcome::valid());
        }
        let path = ctx.current_path().to_string();
        let mut applied = false;
        let mut failed = false;
        for (index, value) in items.iter().enumerate().skip(covered_prefix) {
            if covered_indexes.contains(&index) {
                continue;
            }
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
