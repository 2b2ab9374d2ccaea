//! URI-addressed store of compiled schemas with snapshot/rollback
//!
//! The registry keeps one bucket per base URI, and each bucket addresses
//! compiled schemas three ways: by JSON Pointer, by named anchor and by
//! dynamic anchor. State is an immutable, structurally shared value behind
//! one swappable handle: reads clone the handle lock-free of any writer,
//! mutation is copy-on-write and publishes a complete new state atomically,
//! snapshot keeps a handle and restore swaps it back.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::engine::Evaluator;
use crate::pointer::JsonPointer;
use crate::uri::{Location, Uri};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// One keyword evaluator with its compile-time placement
pub struct WrappedEvaluator {
    /// `None` only for boolean-literal schemas
    pub keyword: Option<String>,
    /// Pointer of the keyword within the parent-URI bucket
    pub keyword_path: JsonPointer,
    pub evaluator: Box<dyn Evaluator>,
    /// Execution order; higher runs later, ties keep insertion order
    pub order: i32,
    /// Vocabulary URIs this evaluator belongs to; empty means "always runs"
    pub vocabularies: &'static [&'static str],
}

impl std::fmt::Debug for WrappedEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrappedEvaluator")
            .field("keyword", &self.keyword)
            .field("keyword_path", &self.keyword_path)
            .field("order", &self.order)
            .finish()
    }
}

/// An immutable compiled schema object
#[derive(Debug)]
pub struct CompiledSchema {
    /// Base URI of the innermost enclosing `$id` scope
    pub parent_uri: Uri,
    /// Pointer of this schema within the parent-URI bucket
    pub location: JsonPointer,
    /// Evaluators sorted stably by declared order
    pub evaluators: Vec<WrappedEvaluator>,
    /// Vocabularies active for this schema's evaluation
    pub active_vocabularies: HashSet<String>,
}

impl CompiledSchema {
    /// Absolute location string of this schema
    pub fn absolute_location(&self) -> String {
        format!("{}#{}", self.parent_uri, self.location)
    }

    /// Absolute location string of one of this schema's keywords
    pub fn keyword_location(&self, wrapped: &WrappedEvaluator) -> String {
        format!("{}#{}", self.parent_uri, wrapped.keyword_path)
    }
}

/// Per-base-URI addressing namespaces
#[derive(Debug, Default, Clone)]
pub struct Bucket {
    schemas: HashMap<String, Arc<CompiledSchema>>,
    named_anchors: HashMap<String, Arc<CompiledSchema>>,
    dynamic_anchors: HashMap<String, Arc<CompiledSchema>>,
}

/// The whole registry state; cloned on write, shared on read
#[derive(Debug, Default, Clone)]
pub struct RegistryState {
    buckets: HashMap<Uri, Bucket>,
}

impl RegistryState {
    pub fn insert_schema(&mut self, base: &Uri, pointer: &JsonPointer, schema: Arc<CompiledSchema>) {
        self.buckets
            .entry(base.clone())
            .or_default()
            .schemas
            .insert(pointer.as_str().to_string(), schema);
    }

    pub fn insert_named_anchor(&mut self, base: &Uri, name: &str, schema: Arc<CompiledSchema>) {
        self.buckets
            .entry(base.clone())
            .or_default()
            .named_anchors
            .insert(name.to_string(), schema);
    }

    pub fn insert_dynamic_anchor(&mut self, base: &Uri, name: &str, schema: Arc<CompiledSchema>) {
        self.buckets
            .entry(base.clone())
            .or_default()
            .dynamic_anchors
            .insert(name.to_string(), schema);
    }

    /// Pointer-addressed lookup only
    pub fn plain(&self, location: &Location) -> Option<Arc<CompiledSchema>> {
        if !location.is_pointer() {
            return None;
        }
        self.buckets
            .get(&location.base)?
            .schemas
            .get(&location.fragment)
            .cloned()
    }

    /// Named-anchor lookup in the location's own bucket
    pub fn named_anchor(&self, location: &Location) -> Option<Arc<CompiledSchema>> {
        self.buckets
            .get(&location.base)?
            .named_anchors
            .get(&location.fragment)
            .cloned()
    }

    /// Dynamic-anchor lookup in one bucket
    pub fn dynamic_anchor(&self, base: &Uri, name: &str) -> Option<Arc<CompiledSchema>> {
        self.buckets.get(base)?.dynamic_anchors.get(name).cloned()
    }

    /// Whether any schema is registered under this base URI
    pub fn has_bucket(&self, base: &Uri) -> bool {
        self.buckets.contains_key(base)
    }
}

/// Thread-safe registry handle
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    state: RwLock<Arc<RegistryState>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stable handle to the current state
    pub fn state(&self) -> Arc<RegistryState> {
        self.state.read().expect("registry lock poisoned").clone()
    }

    /// Resolve a location: plain schemas first, then the named-anchor and
    /// dynamic-anchor maps
    pub fn get(&self, location: &Location) -> Option<Arc<CompiledSchema>> {
        let state = self.state();
        if location.is_pointer() {
            state.plain(location)
        } else {
            state
                .named_anchor(location)
                .or_else(|| state.dynamic_anchor(&location.base, &location.fragment))
        }
    }

    /// Resolve a location against the dynamic-anchor namespace only
    pub fn get_dynamic(&self, location: &Location) -> Option<Arc<CompiledSchema>> {
        self.state().dynamic_anchor(&location.base, &location.fragment)
    }

    /// Apply a mutation as one atomic publish
    pub fn commit(&self, mutate: impl FnOnce(&mut RegistryState)) {
        let mut guard = self.state.write().expect("registry lock poisoned");
        let mut next = (**guard).clone();
        mutate(&mut next);
        *guard = Arc::new(next);
    }

    /// Keep a handle to the current state
    pub fn snapshot(&self) -> Arc<RegistryState> {
        self.state()
    }

    /// Swap a previously taken snapshot back in
    pub fn restore(&self, snapshot: Arc<RegistryState>) {
        let mut guard = self.state.write().expect("registry lock poisoned");
        *guard = snapshot;
    }
}
