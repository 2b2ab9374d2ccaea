//! Annotation-only keywords: metadata, content and format
//!
//! `format` is annotation-by-default per the format-annotation vocabulary;
//! callers that need assertion behavior supply an evaluator factory that
//! shadows it.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::engine::{EvalContext, Evaluator, Outcome};
use crate::error::Result;
use crate::node::InstanceNode;
use serde_json::Value;

/// Produces the keyword's own value as an annotation (`title`,
/// `description`, `default`, `examples`, `deprecated`, `readOnly`,
/// `writeOnly`, `contentEncoding`, `contentMediaType`)
pub struct AnnotationKeyword {
    pub value: Value,
}

impl Evaluator for AnnotationKeyword {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, _node: &InstanceNode<'_>) -> Result<Outcome> {
        Ok(Outcome::annotation(self.value.clone()))
    }
}

/// `format`: annotates the format name without asserting it
pub struct Format {
    pub name: String,
}

impl Evaluator for Format {
    fn evaluate(&self, _ctx: &mut EvalContext<'_>, _node: &InstanceNode<'_>) -> Result<Outcome> {
        Ok(Outcome::annotation(Value::String(self.name.clone())))
    }
}
