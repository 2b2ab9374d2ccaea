//! Public validator API
//!
//! A [`Validator`] owns the schema registry, the resolver chain with its
//! per-URI memoization, and the registration workflow: dialect and
//! vocabulary determination, meta-schema validation with the
//! self-referential bootstrap, and lazy compilation of externally resolved
//! references. One validator instance may be driven by many threads;
//! registration is serialized, validation runs against stable registry
//! snapshots.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::annotations::{AnnotationTree, OutputUnit};
use crate::compiler::{compile_document, CompileOptions};
use crate::dialect::metaschema::MetaSchemaResolver;
use crate::dialect::{keywords as k, Dialect, EvaluatorFactory, SpecVersion};
use crate::engine::{
    DefaultMessageProvider, EngineConfig, EvalContext, ExternalLoader, MessageProvider, RawOutcome,
};
use crate::error::{Error, Result};
use crate::node::{DefaultNodeFactory, JsonNodeFactory};
use crate::registry::SchemaRegistry;
use crate::resolver::{CompositeResolver, ResolverOutput, SchemaResolver};
use crate::uri::{Location, Uri};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, OnceLock};

/// Default meta-schema policy when a schema omits `$schema`
enum DefaultMeta {
    /// The default dialect's official meta-schema
    Dialect,
    /// A caller-supplied URI
    Override(Uri),
    /// No meta-schema resolution at all
    Disabled,
}

/// Serialized registration-side state: the in-progress set that breaks
/// meta-schema cycles, the external-resolution memo and the raw
/// `$vocabulary` declarations of registered documents
struct Inner {
    in_progress: HashSet<Uri>,
    resolved: HashMap<Uri, Option<Value>>,
    vocab_declared: HashMap<Uri, Map<String, Value>>,
    anon_counter: u64,
}

/// Result of one `validate` call
#[derive(Debug)]
pub struct ValidationOutcome {
    valid: bool,
    errors: Vec<OutputUnit>,
    tree: AnnotationTree,
    annotations: OnceLock<Vec<OutputUnit>>,
}

impl ValidationOutcome {
    fn new(raw: RawOutcome) -> Self {
        Self {
            valid: raw.valid,
            errors: raw.errors,
            tree: raw.tree,
            annotations: OnceLock::new(),
        }
    }

    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Errors in deterministic evaluation order
    pub fn errors(&self) -> &[OutputUnit] {
        &self.errors
    }

    /// Retained annotations, flattened depth-first on first access
    pub fn annotations(&self) -> &[OutputUnit] {
        self.annotations.get_or_init(|| self.tree.flatten())
    }
}

/// Builder-style configuration surface for [`Validator`]
pub struct ValidatorBuilder {
    default_version: SpecVersion,
    default_meta: DefaultMeta,
    schema_validation: bool,
    depth_limit: usize,
    user_factory: Option<Box<dyn EvaluatorFactory>>,
    schema_nodes: Box<dyn JsonNodeFactory>,
    instance_nodes: Box<dyn JsonNodeFactory>,
    messages: Box<dyn MessageProvider>,
    resolvers: Vec<Box<dyn SchemaResolver>>,
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self {
            default_version: SpecVersion::Draft2020_12,
            default_meta: DefaultMeta::Dialect,
            schema_validation: true,
            depth_limit: EngineConfig::default().depth_limit,
            user_factory: None,
            schema_nodes: Box::new(DefaultNodeFactory),
            instance_nodes: Box::new(DefaultNodeFactory),
            messages: Box::new(DefaultMessageProvider),
            resolvers: Vec::new(),
        }
    }
}

impl ValidatorBuilder {
    /// Dialect assumed when a schema names no known meta-schema
    pub fn with_default_dialect(mut self, version: SpecVersion) -> Self {
        self.default_version = version;
        self
    }

    /// Additional evaluator factory, consulted before the built-in tables
    pub fn with_evaluator_factory(mut self, factory: Box<dyn EvaluatorFactory>) -> Self {
        self.user_factory = Some(factory);
        self
    }

    /// Append a schema resolver; resolvers run in registration order and
    /// always before the embedded meta-schema resolver
    pub fn with_schema_resolver(mut self, resolver: Box<dyn SchemaResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Node factory used for schema documents
    pub fn with_schema_node_factory(mut self, factory: Box<dyn JsonNodeFactory>) -> Self {
        self.schema_nodes = factory;
        self
    }

    /// Node factory used for instance documents
    pub fn with_instance_node_factory(mut self, factory: Box<dyn JsonNodeFactory>) -> Self {
        self.instance_nodes = factory;
        self
    }

    pub fn with_message_provider(mut self, provider: Box<dyn MessageProvider>) -> Self {
        self.messages = provider;
        self
    }

    /// Skip meta-schema validation of registered schemas; vocabulary
    /// activation falls back to everything-supported
    pub fn without_schema_validation(mut self) -> Self {
        self.schema_validation = false;
        self
    }

    /// Meta-schema applied to schemas that omit `$schema`
    pub fn with_default_meta_schema(mut self, uri: &str) -> Result<Self> {
        self.default_meta = DefaultMeta::Override(Uri::parse(uri)?);
        Ok(self)
    }

    /// Force no meta-schema resolution for schemas that omit `$schema`
    pub fn without_default_meta_schema(mut self) -> Self {
        self.default_meta = DefaultMeta::Disabled;
        self
    }

    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = limit;
        self
    }

    pub fn build(self) -> Validator {
        let mut resolvers = CompositeResolver::new();
        for resolver in self.resolvers {
            resolvers.push(resolver);
        }
        resolvers.push(Box::new(MetaSchemaResolver));
        Validator {
            registry: SchemaRegistry::new(),
            engine_config: EngineConfig {
                schema_validation: self.schema_validation,
                depth_limit: self.depth_limit,
            },
            default_version: self.default_version,
            default_meta: self.default_meta,
            user_factory: self.user_factory,
            schema_nodes: self.schema_nodes,
            instance_nodes: self.instance_nodes,
            messages: self.messages,
            resolvers,
            inner: Mutex::new(Inner {
                in_progress: HashSet::new(),
                resolved: HashMap::new(),
                vocab_declared: HashMap::new(),
                anon_counter: 0,
            }),
        }
    }
}

/// Multi-draft JSON Schema validator
pub struct Validator {
    registry: SchemaRegistry,
    engine_config: EngineConfig,
    default_version: SpecVersion,
    default_meta: DefaultMeta,
    user_factory: Option<Box<dyn EvaluatorFactory>>,
    schema_nodes: Box<dyn JsonNodeFactory>,
    instance_nodes: Box<dyn JsonNodeFactory>,
    messages: Box<dyn MessageProvider>,
    resolvers: CompositeResolver,
    inner: Mutex<Inner>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    /// Register a schema document given as text.
    ///
    /// The returned URI is the caller-supplied one when present, otherwise
    /// the URI derived from the document's identifier keyword, otherwise a
    /// synthetic `urn:jsonvet:anon:<n>`.
    pub fn register_schema(&self, uri: Option<&str>, schema: &str) -> Result<Uri> {
        let raw = self.schema_nodes.create(schema)?;
        self.register_schema_value(uri, raw)
    }

    /// Register an already-materialized schema document
    pub fn register_schema_value(&self, uri: Option<&str>, raw: Value) -> Result<Uri> {
        let mut inner = self.inner.lock().expect("registration lock poisoned");
        let (version, _) = self.document_version(&raw)?;
        let provided = uri.map(Uri::parse).transpose()?;
        let registration = match &provided {
            Some(uri) => uri.clone(),
            None => {
                inner.anon_counter += 1;
                Uri::parse(&format!("urn:jsonvet:anon:{}", inner.anon_counter))?
            }
        };
        let derived = raw
            .get(version.id_keyword())
            .and_then(Value::as_str)
            .map(|id| registration.resolve(id).map(|loc| loc.base))
            .transpose()?;
        self.register_document(&mut inner, registration.clone(), raw)?;
        Ok(match provided {
            Some(uri) => uri,
            None => derived.unwrap_or(registration),
        })
    }

    /// Validate an instance document given as text against a registered
    /// schema URI (an optional fragment addresses a subschema)
    pub fn validate(&self, uri: &str, instance: &str) -> Result<ValidationOutcome> {
        let raw = self.instance_nodes.create(instance)?;
        self.validate_value(uri, &raw)
    }

    /// Validate an already-materialized instance value
    pub fn validate_value(&self, uri: &str, instance: &Value) -> Result<ValidationOutcome> {
        let location = Location::parse(uri)?;
        let mut loader = DetachedLoader { validator: self };
        let schema = match self.registry.get(&location) {
            Some(schema) => schema,
            None => {
                // the first validate may lazily compile an external reference
                if loader.load(&location.base)? {
                    self.registry.get(&location)
                } else {
                    None
                }
                .ok_or_else(|| Error::not_found(location.to_string()))?
            }
        };
        let ctx = EvalContext::new(
            &self.registry,
            &self.engine_config,
            self.messages.as_ref(),
            &mut loader,
        );
        Ok(ValidationOutcome::new(ctx.run(&schema, instance)?))
    }

    /// Whether a schema is resolvable at the given URI
    pub fn is_registered(&self, uri: &str) -> bool {
        Location::parse(uri)
            .map(|location| self.registry.get(&location).is_some())
            .unwrap_or(false)
    }

    /// Dialect and effective meta-schema URI of a document
    fn document_version(&self, raw: &Value) -> Result<(SpecVersion, Option<Uri>)> {
        let declared = raw.get(k::SCHEMA).and_then(Value::as_str);
        let meta = match declared {
            Some(text) => Some(Uri::parse(text)?),
            None => match &self.default_meta {
                DefaultMeta::Dialect => {
                    Some(Uri::parse(self.default_version.meta_schema_uri())?)
                }
                DefaultMeta::Override(uri) => Some(uri.clone()),
                DefaultMeta::Disabled => None,
            },
        };
        let version = meta
            .as_ref()
            .and_then(SpecVersion::from_meta_uri)
            .unwrap_or(self.default_version);
        Ok((version, meta))
    }

    /// Remember the raw `$vocabulary` object a document declares for
    /// schemas that use it as their meta-schema
    fn record_vocabulary(&self, inner: &mut Inner, uri: &Uri, raw: &Value) {
        if let Some(declared) = raw.get(k::VOCABULARY).and_then(Value::as_object) {
            inner.vocab_declared.insert(uri.clone(), declared.clone());
        }
    }

    /// Active vocabularies for a schema, from its meta-schema's declared
    /// `$vocabulary` object. The declaration is checked against the dialect
    /// here, when the meta is used, and a violation is fatal for the
    /// registration that triggered it.
    fn active_for(
        &self,
        inner: &Inner,
        schema_uri: &Uri,
        meta_uri: &Uri,
        version: SpecVersion,
    ) -> Result<HashSet<String>> {
        let dialect = Dialect::of(version);
        if !self.engine_config.schema_validation || !version.uses_vocabularies() {
            return Ok(dialect.all_supported());
        }
        match inner.vocab_declared.get(meta_uri) {
            Some(declared) => dialect.validate_vocabulary_object(schema_uri.as_str(), declared),
            None => Ok(dialect.default_active()),
        }
    }

    fn register_document(&self, inner: &mut Inner, uri: Uri, raw: Value) -> Result<()> {
        if inner.in_progress.contains(&uri) {
            // meta-schema cycle: finish registering without meta validation,
            // the outer frame validates once everything is addressable
            tracing::debug!(uri = %uri, "re-entrant registration, deferring meta-schema validation");
            let (version, meta) = self.document_version(&raw)?;
            self.record_vocabulary(inner, &uri, &raw);
            let active = match &meta {
                Some(meta) => self.active_for(inner, &uri, meta, version)?,
                None => Dialect::of(version).all_supported(),
            };
            return self.compile(&uri, &raw, version, active);
        }
        inner.in_progress.insert(uri.clone());
        let result = self.register_document_inner(inner, &uri, &raw);
        inner.in_progress.remove(&uri);
        result
    }

    fn register_document_inner(&self, inner: &mut Inner, uri: &Uri, raw: &Value) -> Result<()> {
        let (version, meta) = self.document_version(raw)?;
        let dialect = Dialect::of(version);
        self.record_vocabulary(inner, uri, raw);

        if !self.engine_config.schema_validation {
            return self.compile(uri, raw, version, dialect.all_supported());
        }
        let Some(meta_uri) = meta else {
            return self.compile(uri, raw, version, dialect.all_supported());
        };

        let own_id = raw
            .get(version.id_keyword())
            .and_then(Value::as_str)
            .map(|id| uri.resolve(id).map(|loc| loc.base))
            .transpose()?;

        if meta_uri == *uri || own_id.as_ref() == Some(&meta_uri) {
            // a schema cannot be validated against itself before it exists:
            // register first, then validate, rolling back on failure
            tracing::debug!(uri = %uri, "self-referential meta-schema, running two-phase bootstrap");
            let snapshot = self.registry.snapshot();
            // the schema is its own meta: derive the active vocabularies
            // directly from its declared $vocabulary, or the dialect default
            let active = if version.uses_vocabularies() {
                match raw.get(k::VOCABULARY).and_then(Value::as_object) {
                    Some(declared) => {
                        dialect.validate_vocabulary_object(uri.as_str(), declared)?
                    }
                    None => dialect.default_active(),
                }
            } else {
                dialect.all_supported()
            };
            self.compile(uri, raw, version, active)?;
            match self.evaluate_with(inner, &uri.root_location(), raw) {
                Ok(outcome) if outcome.valid => Ok(()),
                Ok(outcome) => {
                    self.registry.restore(snapshot);
                    Err(Error::InvalidSchema {
                        uri: uri.to_string(),
                        errors: outcome.errors,
                    })
                }
                Err(err) => {
                    self.registry.restore(snapshot);
                    Err(err)
                }
            }
        } else {
            self.ensure_meta(inner, &meta_uri)?;
            let active = self.active_for(inner, uri, &meta_uri, version)?;
            let outcome = self.evaluate_with(inner, &meta_uri.root_location(), raw)?;
            if !outcome.valid {
                return Err(Error::InvalidSchema {
                    uri: uri.to_string(),
                    errors: outcome.errors,
                });
            }
            self.compile(uri, raw, version, active)
        }
    }

    /// Resolve and register a meta-schema that is not yet known
    fn ensure_meta(&self, inner: &mut Inner, meta: &Uri) -> Result<()> {
        if self.registry.get(&meta.root_location()).is_some() {
            return Ok(());
        }
        let fetched = self.fetch_external(inner, meta).map_err(|err| match err {
            Error::Parse { reason, .. } => Error::MetaSchemaParse {
                uri: meta.to_string(),
                reason,
            },
            other => other,
        })?;
        let Some(document) = fetched else {
            return Err(Error::MetaSchemaResolution {
                uri: meta.to_string(),
                source: None,
            });
        };
        self.register_document(inner, meta.clone(), document)
    }

    /// Memoized resolver-chain probe; a resolver is invoked at most once
    /// per absolute URI per validator instance
    fn fetch_external(&self, inner: &mut Inner, base: &Uri) -> Result<Option<Value>> {
        if let Some(cached) = inner.resolved.get(base) {
            return Ok(cached.clone());
        }
        let value = match self.resolvers.resolve(base.as_str()) {
            ResolverOutput::Empty => None,
            ResolverOutput::Node(value) => Some(value),
            ResolverOutput::Text(text) => match self.schema_nodes.create(&text) {
                Ok(value) => Some(value),
                Err(err) => {
                    inner.resolved.insert(base.clone(), None);
                    return Err(err);
                }
            },
        };
        if value.is_some() {
            tracing::debug!(uri = %base, "resolved external schema document");
        }
        inner.resolved.insert(base.clone(), value.clone());
        Ok(value)
    }

    /// Fetch and register the document at `base` on behalf of a reference
    fn load_external(&self, inner: &mut Inner, base: &Uri) -> Result<bool> {
        if self.registry.get(&base.root_location()).is_some() {
            // already registered: a missing fragment cannot be fixed by refetching
            return Ok(false);
        }
        let Some(document) = self.fetch_external(inner, base)? else {
            return Ok(false);
        };
        self.register_document(inner, base.clone(), document)?;
        Ok(true)
    }

    /// Run the engine while registration state is already held
    fn evaluate_with(
        &self,
        inner: &mut Inner,
        schema: &Location,
        instance: &Value,
    ) -> Result<RawOutcome> {
        let compiled = self
            .registry
            .get(schema)
            .ok_or_else(|| Error::not_found(schema.to_string()))?;
        let mut loader = InFlightLoader {
            validator: self,
            inner,
        };
        let ctx = EvalContext::new(
            &self.registry,
            &self.engine_config,
            self.messages.as_ref(),
            &mut loader,
        );
        ctx.run(&compiled, instance)
    }

    fn compile(
        &self,
        uri: &Uri,
        raw: &Value,
        version: SpecVersion,
        active_vocabularies: HashSet<String>,
    ) -> Result<()> {
        let options = CompileOptions {
            version,
            active_vocabularies,
            user_factory: self.user_factory.as_deref(),
        };
        compile_document(&self.registry, &options, uri, raw)
    }
}

/// Loader used by public `validate` calls: takes the registration lock
/// only when a lazy compilation is actually needed
struct DetachedLoader<'v> {
    validator: &'v Validator,
}

impl ExternalLoader for DetachedLoader<'_> {
    fn load(&mut self, base: &Uri) -> Result<bool> {
        let mut inner = self
            .validator
            .inner
            .lock()
            .expect("registration lock poisoned");
        self.validator.load_external(&mut inner, base)
    }
}

/// Loader used while the registration lock is already held
struct InFlightLoader<'v, 'i> {
    validator: &'v Validator,
    inner: &'i mut Inner,
}

impl ExternalLoader for InFlightLoader<'_, '_> {
    fn load(&mut self, base: &Uri) -> Result<bool> {
        self.validator.load_external(self.inner, base)
    }
}
