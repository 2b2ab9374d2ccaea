//! Evaluation engine
//!
//! Executes a compiled schema against an instance value. The engine owns
//! the per-call state: the dynamic-scope stack, the evaluation-path stack,
//! the annotation tree and the accumulating error list. Reference
//! resolution for the `$ref` family lives here too, since all three
//! algorithms read the dynamic scope.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::annotations::{AnnotationTree, NodeId, OutputUnit};
use crate::error::{Error, Result};
use crate::node::InstanceNode;
use crate::pointer;
use crate::registry::{CompiledSchema, SchemaRegistry};
use crate::uri::{Location, Uri};
use serde_json::Value;
use std::sync::Arc;

/// Verdict of one keyword evaluation.
///
/// A valid outcome may carry an annotation value; pure predicates carry
/// none and leave the annotation tree untouched. An invalid outcome
/// carries its own message only when the failure is not already witnessed
/// by errors the evaluator's nested validations recorded, so a failing
/// applicator does not duplicate the element-level diagnostics.
#[derive(Debug, Clone)]
pub enum Outcome {
    Valid(Option<Value>),
    Invalid(Option<String>),
}

impl Outcome {
    pub fn valid() -> Self {
        Self::Valid(None)
    }

    pub fn annotation(value: Value) -> Self {
        Self::Valid(Some(value))
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Invalid(Some(message.into()))
    }

    /// Failure explained by already-recorded nested errors
    pub fn invalid() -> Self {
        Self::Invalid(None)
    }
}

/// A compiled keyword evaluator.
///
/// Evaluators are pure with respect to the schema: all per-call state goes
/// through the context. Fatal conditions (meta-schema failures surfaced by
/// lazy external compilation, depth exhaustion) propagate as `Err`; an
/// ordinary verdict is always `Ok`.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, ctx: &mut EvalContext<'_>, node: &InstanceNode<'_>) -> Result<Outcome>;
}

/// Localization seam applied when errors are recorded
pub trait MessageProvider: Send + Sync {
    fn message(&self, _keyword: &str, default_message: &str) -> String {
        default_message.to_string()
    }
}

/// Pass-through provider
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMessageProvider;

impl MessageProvider for DefaultMessageProvider {}

/// Loads and registers external documents on behalf of the `$ref` family
pub(crate) trait ExternalLoader {
    /// Fetch and register the document at `base`. `Ok(true)` when a
    /// document was registered, `Ok(false)` when no resolver knew the URI.
    fn load(&mut self, base: &Uri) -> Result<bool>;
}

/// Engine knobs shared by every call on one validator
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub schema_validation: bool,
    pub depth_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_validation: true,
            depth_limit: 512,
        }
    }
}

/// Raw result of one engine run, before the public wrapper
pub(crate) struct RawOutcome {
    pub valid: bool,
    pub errors: Vec<OutputUnit>,
    pub tree: AnnotationTree,
}

/// Per-`validate`-call evaluation state
pub struct EvalContext<'v> {
    registry: &'v SchemaRegistry,
    config: &'v EngineConfig,
    messages: &'v dyn MessageProvider,
    loader: &'v mut dyn ExternalLoader,
    dynamic_scope: Vec<Uri>,
    tree: AnnotationTree,
    node_stack: Vec<NodeId>,
    path_stack: Vec<String>,
    errors: Vec<OutputUnit>,
    depth: usize,
}

impl<'v> EvalContext<'v> {
    pub(crate) fn new(
        registry: &'v SchemaRegistry,
        config: &'v EngineConfig,
        messages: &'v dyn MessageProvider,
        loader: &'v mut dyn ExternalLoader,
    ) -> Self {
        let tree = AnnotationTree::new();
        let root = tree.root();
        Self {
            registry,
            config,
            messages,
            loader,
            dynamic_scope: Vec::new(),
            tree,
            node_stack: vec![root],
            path_stack: vec![String::new()],
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// Run a full evaluation from a root schema
    pub(crate) fn run(mut self, schema: &CompiledSchema, instance: &Value) -> Result<RawOutcome> {
        let root = InstanceNode::root(instance);
        let valid = self.validate_schema(schema, &root, "")?;
        Ok(RawOutcome {
            valid,
            errors: self.errors,
            tree: self.tree,
        })
    }

    /// The evaluation path of the keyword currently being evaluated
    pub fn current_path(&self) -> &str {
        self.path_stack.last().map(String::as_str).unwrap_or("")
    }

    /// The base URI on top of the dynamic scope
    pub fn scope_base(&self) -> Option<&Uri> {
        self.dynamic_scope.last()
    }

    /// Annotation value attached directly to the current schema's node for
    /// a sibling keyword at the given instance location
    pub fn sibling_annotation(&self, keyword: &str, instance_location: &str) -> Option<Value> {
        let node = *self.node_stack.last().expect("node stack underflow");
        self.tree
            .direct_annotation(node, keyword, instance_location)
            .map(|a| a.detail.clone())
    }

    /// Annotation values anywhere under the current schema's node for the
    /// given keywords and instance location (used by the unevaluated family)
    pub fn evaluated_annotations(&self, keywords: &[&str], instance_location: &str) -> Vec<Value> {
        let node = *self.node_stack.last().expect("node stack underflow");
        self.tree
            .subtree_annotations(node, keywords, instance_location)
            .into_iter()
            .map(|a| a.detail.clone())
            .collect()
    }

    /// Validate a subschema at a given evaluation path
    pub fn apply(
        &mut self,
        location: &Location,
        eval_path: &str,
        instance: &InstanceNode<'_>,
    ) -> Result<bool> {
        let schema = self
            .lookup(location)
            .ok_or_else(|| Error::not_found(location.to_string()))?;
        self.validate_schema(&schema, instance, eval_path)
    }

    /// Resolve and validate a reference target (used by the `$ref` family
    /// after resolution succeeded)
    pub fn apply_schema(
        &mut self,
        schema: &Arc<CompiledSchema>,
        eval_path: &str,
        instance: &InstanceNode<'_>,
    ) -> Result<bool> {
        self.validate_schema(schema, instance, eval_path)
    }

    fn lookup(&self, location: &Location) -> Option<Arc<CompiledSchema>> {
        self.registry.get(location)
    }

    /// Static `$ref` resolution: plain schemas, then anchors, then the
    /// external resolver followed by one retry
    pub fn resolve_ref(&mut self, reference: &str) -> Result<Arc<CompiledSchema>> {
        let base = self
            .scope_base()
            .cloned()
            .ok_or_else(|| Error::not_found(reference))?;
        let location = base
            .resolve(reference)
            .map_err(|_| Error::not_found(reference))?;
        if let Some(schema) = self.lookup(&location) {
            return Ok(schema);
        }
        if self.loader.load(&location.base)? {
            if let Some(schema) = self.lookup(&location) {
                return Ok(schema);
            }
        }
        Err(Error::not_found(location.to_string()))
    }

    /// `$dynamicRef` resolution: a statically addressable plain schema wins;
    /// otherwise the broadest enclosing scope defining the dynamic anchor
    /// takes precedence, walking the dynamic-scope stack outermost-first
    pub fn resolve_dynamic_ref(&mut self, reference: &str) -> Result<Arc<CompiledSchema>> {
        let base = self
            .scope_base()
            .cloned()
            .ok_or_else(|| Error::not_found(reference))?;
        let location = base
            .resolve(reference)
            .map_err(|_| Error::not_found(reference))?;
        if location.is_pointer() {
            // pointer-form targets carry no anchor to track dynamically
            return self.resolve_ref(reference);
        }
        let state = self.registry.state();
        for scope in &self.dynamic_scope {
            if let Some(schema) = state.dynamic_anchor(scope, &location.fragment) {
                return Ok(schema);
            }
        }
        // nothing dynamic anywhere: degrade to a plain anchor lookup
        if let Some(schema) = state.named_anchor(&location) {
            return Ok(schema);
        }
        drop(state);
        if self.loader.load(&location.base)? {
            if let Some(schema) = self.lookup(&location) {
                return Ok(schema);
            }
        }
        Err(Error::not_found(location.to_string()))
    }

    /// `$recursiveRef` resolution (ignores its reference text): the current
    /// document root unless it carries the recursive anchor, in which case
    /// the outermost scope defining the anchor wins
    pub fn resolve_recursive_ref(&mut self) -> Result<Arc<CompiledSchema>> {
        let base = self
            .scope_base()
            .cloned()
            .ok_or_else(|| Error::not_found("#"))?;
        let root_location = base.root_location();
        let root = self
            .lookup(&root_location)
            .ok_or_else(|| Error::not_found(root_location.to_string()))?;
        let state = self.registry.state();
        if state.dynamic_anchor(&base, "").is_none() {
            return Ok(root);
        }
        for scope in &self.dynamic_scope {
            if let Some(schema) = state.dynamic_anchor(scope, "") {
                return Ok(schema);
            }
        }
        Ok(root)
    }

    /// Core of the engine: run every evaluator of `schema` against
    /// `instance`, reporting under `eval_path`.
    pub(crate) fn validate_schema(
        &mut self,
        schema: &CompiledSchema,
        instance: &InstanceNode<'_>,
        eval_path: &str,
    ) -> Result<bool> {
        if self.depth >= self.config.depth_limit {
            return Err(Error::DepthExceeded {
                limit: self.config.depth_limit,
                evaluation_path: eval_path.to_string(),
            });
        }
        self.depth += 1;

        let pushed_scope = self.scope_base() != Some(&schema.parent_uri);
        if pushed_scope {
            self.dynamic_scope.push(schema.parent_uri.clone());
        }

        let parent_node = *self.node_stack.last().expect("node stack underflow");
        let node = self.tree.add_child(parent_node);
        self.node_stack.push(node);
        let marks = self.tree.marks(node);

        let mut valid = true;
        for wrapped in &schema.evaluators {
            if self.config.schema_validation
                && !wrapped.vocabularies.is_empty()
                && !wrapped
                    .vocabularies
                    .iter()
                    .any(|v| schema.active_vocabularies.contains(*v))
            {
                continue;
            }

            let keyword_eval_path = match &wrapped.keyword {
                Some(keyword) => format!("{}/{}", eval_path, pointer::escape(keyword)),
                None => eval_path.to_string(),
            };
            let error_mark = self.errors.len();
            self.path_stack.push(keyword_eval_path.clone());
            let outcome = wrapped.evaluator.evaluate(self, instance);
            self.path_stack.pop();

            match outcome? {
                Outcome::Valid(annotation) => {
                    // nested failures are irrelevant once this keyword passed
                    self.errors.truncate(error_mark);
                    if let Some(detail) = annotation {
                        self.tree.annotate(
                            node,
                            OutputUnit {
                                evaluation_path: keyword_eval_path,
                                schema_location: schema.keyword_location(wrapped),
                                instance_location: instance.location.as_str().to_string(),
                                keyword: wrapped.keyword.clone(),
                                detail,
                                valid: true,
                            },
                        );
                    }
                }
                Outcome::Invalid(message) => {
                    valid = false;
                    if let Some(message) = message {
                        let keyword = wrapped.keyword.as_deref().unwrap_or("");
                        let message = self.messages.message(keyword, &message);
                        self.errors.push(OutputUnit {
                            evaluation_path: keyword_eval_path,
                            schema_location: schema.keyword_location(wrapped),
                            instance_location: instance.location.as_str().to_string(),
                            keyword: wrapped.keyword.clone(),
                            detail: Value::String(message),
                            valid: false,
                        });
                    }
                }
            }
        }

        if !valid {
            // the annotations of a failing schema are discarded as a unit;
            // the error list stays, it explains the failure
            self.tree.truncate(node, marks);
        }

        self.node_stack.pop();
        if pushed_scope {
            self.dynamic_scope.pop();
        }
        self.depth -= 1;
        Ok(valid)
    }
}
