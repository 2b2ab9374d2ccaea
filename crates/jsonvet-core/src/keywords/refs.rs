//! The `$ref` family: static, dynamic and recursive references
//!
//! Resolution itself lives in the engine context, which owns the dynamic
//! scope; these evaluators turn a recoverable not-found signal into an
//! ordinary validation failure instead of aborting the call.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::engine::{EvalContext, Evaluator, Outcome};
use crate::error::{Error, Result};
use crate::node::InstanceNode;
use crate::registry::CompiledSchema;
use std::sync::Arc;

fn apply_resolved(
    ctx: &mut EvalContext<'_>,
    resolved: std::result::Result<Arc<CompiledSchema>, Error>,
    reference: &str,
    node: &InstanceNode<'_>,
) -> Result<Outcome> {
    let schema = match resolved {
        Ok(schema) => schema,
        Err(err) if err.is_not_found() => {
            return Ok(Outcome::fail(format!(
                "Cannot resolve schema reference '{}'",
                reference
            )));
        }
        Err(err) => return Err(err),
    };
    let path = ctx.current_path().to_string();
    if ctx.apply_schema(&schema, &path, node)? {
        Ok(Outcome::valid())
    } else {
        Ok(Outcome::invalid())
    }
}

/// `$ref`: static reference against the current scope base
pub struct Ref {
    pub reference: String,
}

impl Evaluator for Ref {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let resolved = ctx.resolve_ref(&self.reference);
        apply_resolved(ctx, resolved, &self.reference, node)
    }
}

/// `$dynamicRef`: the broadest enclosing scope defining the dynamic anchor
/// takes precedence over the lexical definition site
pub struct DynamicRef {
    pub reference: String,
}

impl Evaluator for DynamicRef {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let resolved = ctx.resolve_dynamic_ref(&self.reference);
        apply_resolved(ctx, resolved, &self.reference, node)
    }
}

/// `$recursiveRef`: 2019-09 recursive extension point; ignores its
/// reference text
pub struct RecursiveRef;

impl Evaluator for RecursiveRef {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome> {
        let resolved = ctx.resolve_recursive_ref();
        apply_resolved(ctx, resolved, "#", node)
    }
}
