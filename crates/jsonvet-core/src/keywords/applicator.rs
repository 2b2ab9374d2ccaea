//! In-place applicators: boolean schemas, allOf/anyOf/oneOf/not and the
//! if/then/else conditional family
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::engine::{EvalContext, Evaluator, Outcome};
use crate::error::Result;
use crate::node::InstanceNode;
use crate::uri::Location;
use serde_json::Value;

/// Evaluator synthesized for `true`/`false` schema literals and for objects
/// that produced no evaluators
pub struct BooleanSchema {
    pub value: bool,
}

impl Evaluator for BooleanSchema {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, _node: &InstanceNode<'_>) -> Result<Outcome> {
        if self.value {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::fail("False schema always fails."))
        }
    }
}

/// `allOf`: every branch must match
pub struct AllOf {
    pub branches: Vec<Location>,
}

impl Evaluator for AllOf {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let path = ctx.current_path().to_string();
        let mut all = true;
        for (index, branch) in self.branches.iter().enumerate() {
            let branch_path = format!("{}/{}", path, index);
            all &= ctx.apply(branch, &branch_path, node)?;
        }
        if all {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::invalid())
        }
    }
}

/// `anyOf`: at least one branch must match; every branch still runs so that
/// annotations from all passing branches are collected
pub struct AnyOf {
    pub branches: Vec<Location>,
}

impl Evaluator for AnyOf {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let path = ctx.current_path().to_string();
        let mut any = false;
        for (index, branch) in self.branches.iter().enumerate() {
            let branch_path = format!("{}/{}", path, index);
            any |= ctx.apply(branch, &branch_path, node)?;
        }
        if any {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::invalid())
        }
    }
}

/// `oneOf`: exactly one branch must match
pub struct OneOf {
    pub branches: Vec<Location>,
}

impl Evaluator for OneOf {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let path = ctx.current_path().to_string();
        let mut matched = 0usize;
        for (index, branch) in self.branches.iter().enumerate() {
            let branch_path = format!("{}/{}", path, index);
            if ctx.apply(branch, &branch_path, node)? {
                matched += 1;
            }
        }
        if matched == 1 {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::fail(format!(
                "Value matches {} subschemas, exactly one expected",
                matched
            )))
        }
    }
}

/// `not`: the subschema must not match
pub struct Not {
    pub schema: Location,
}

impl Evaluator for Not {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let path = ctx.current_path().to_string();
        if ctx.apply(&self.schema, &path, node)? {
            Ok(Outcome::fail("Value must not match the subschema"))
        } else {
            Ok(Outcome::valid())
        }
    }
}

/// `if`: never fails on its own; records the branch verdict as an
/// annotation consumed by the sibling `then`/`else` evaluators
pub struct If {
    pub schema: Location,
}

impl Evaluator for If {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let path = ctx.current_path().to_string();
        let matched = ctx.apply(&self.schema, &path, node)?;
        Ok(Outcome::annotation(Value::Bool(matched)))
    }
}

/// `then`: applies only when the sibling `if` annotation reports a match
pub struct Then {
    pub schema: Location,
}

impl Evaluator for Then {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        match ctx.sibling_annotation("if", node.location.as_str()) {
            Some(Value::Bool(true)) => {}
            _ => return Ok(Outcome::valid()),
        }
        let path = ctx.current_path().to_string();
        if ctx.apply(&self.schema, &path, node)? {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::invalid())
        }
    }
}

/// `else`: applies only when the sibling `if` annotation reports a mismatch
pub struct Else {
    pub schema: Location,
}

impl Evaluator for Else {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        match ctx.sibling_annotation("if", node.location.as_str()) {
            Some(Value::Bool(false)) => {}
            _ => return Ok(Outcome::valid()),
        }
        let path = ctx.current_path().to_string();
        if ctx.apply(&self.schema, &path, node)? {
            Ok(Outcome::valid())
        } else {
            Ok(Outcome::invalid())
        }
    }
}
