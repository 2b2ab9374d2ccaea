//! Schema resolution seam
//!
//! This module handles:
//! - The [`SchemaResolver`] extension point used when a reference points at
//!   a URI the registry has never seen
//! - Composition of several resolvers (first non-empty result wins)
//! - Built-in resolvers: an in-memory map, and a directory resolver that
//!   loads `.json`/`.yaml`/`.yml` documents by URI prefix
//!
//! Resolution results are memoized per absolute URI by the validator, so a
//! resolver is invoked at most once per URI per validator instance.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// Result of one resolver probe
#[derive(Debug, Clone)]
pub enum ResolverOutput {
    /// This resolver does not know the URI
    Empty,
    /// Raw document text, parsed by the schema node factory
    Text(String),
    /// An already-materialized document
    Node(Value),
}

impl ResolverOutput {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Supplies raw schema documents for unknown URIs.
///
/// Implementations may perform blocking I/O; the engine imposes no timeout.
/// A failed resolution is reported by returning [`ResolverOutput::Empty`].
pub trait SchemaResolver: Send + Sync {
    fn resolve(&self, uri: &str) -> ResolverOutput;
}

/// Chain of resolvers returning the first non-empty result
#[derive(Default)]
pub struct CompositeResolver {
    resolvers: Vec<Box<dyn SchemaResolver>>,
}

impl CompositeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, resolver: Box<dyn SchemaResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl SchemaResolver for CompositeResolver {
    fn resolve(&self, uri: &str) -> ResolverOutput {
        for resolver in &self.resolvers {
            let output = resolver.resolve(uri);
            if !output.is_empty() {
                return output;
            }
        }
        ResolverOutput::Empty
    }
}

/// In-memory URI-to-document map
#[derive(Debug, Default)]
pub struct MapResolver {
    entries: HashMap<String, Value>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, uri: impl Into<String>, document: Value) -> Self {
        self.entries.insert(uri.into(), document);
        self
    }
}

impl SchemaResolver for MapResolver {
    fn resolve(&self, uri: &str) -> ResolverOutput {
        match self.entries.get(uri) {
            Some(value) => ResolverOutput::Node(value.clone()),
            None => ResolverOutput::Empty,
        }
    }
}

/// Supported on-disk document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Detect the format from a path extension
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Loads schema documents from a directory for URIs under a fixed prefix.
///
/// A URI `<prefix><rest>` maps to `<base_dir>/<rest>`; the format is chosen
/// by file extension. Unparseable or missing files resolve to `Empty`.
pub struct DirectoryResolver {
    uri_prefix: String,
    base_dir: PathBuf,
}

impl DirectoryResolver {
    pub fn new(uri_prefix: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            uri_prefix: uri_prefix.into(),
            base_dir: base_dir.into(),
        }
    }

    fn parse(format: Format, text: &str) -> Option<Value> {
        match format {
            Format::Json => serde_json::from_str(text).ok(),
            Format::Yaml => serde_yaml::from_str(text).ok(),
        }
    }
}

impl SchemaResolver for DirectoryResolver {
    fn resolve(&self, uri: &str) -> ResolverOutput {
        let Some(rest) = uri.strip_prefix(&self.uri_prefix) else {
            return ResolverOutput::Empty;
        };
        let rest = rest.trim_start_matches('/');
        if rest.contains("..") {
            // no path traversal out of the base directory
            return ResolverOutput::Empty;
        }
        let path = self.base_dir.join(rest);
        let Some(format) = Format::from_path(&path) else {
            return ResolverOutput::Empty;
        };
        let Ok(text) = std::fs::read_to_string(&path) else {
            return ResolverOutput::Empty;
        };
        match Self::parse(format, &text) {
            Some(value) => {
                tracing::debug!(uri, path = %path.display(), "resolved schema from disk");
                ResolverOutput::Node(value)
            }
            None => ResolverOutput::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_map_resolver() {
        let resolver = MapResolver::new().with_document("urn:a", json!({"type": "string"}));
        assert!(matches!(resolver.resolve("urn:a"), ResolverOutput::Node(_)));
        assert!(resolver.resolve("urn:b").is_empty());
    }

    #[test]
    fn test_composite_first_non_empty_wins() {
        let mut composite = CompositeResolver::new();
        composite.push(Box::new(MapResolver::new().with_document("urn:a", json!(1))));
        composite.push(Box::new(
            MapResolver::new()
                .with_document("urn:a", json!(2))
                .with_document("urn:b", json!(3)),
        ));

        match composite.resolve("urn:a") {
            ResolverOutput::Node(v) => assert_eq!(v, json!(1)),
            other => panic!("unexpected output: {:?}", other),
        }
        match composite.resolve("urn:b") {
            ResolverOutput::Node(v) => assert_eq!(v, json!(3)),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_directory_resolver_formats() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"{"type": "object"}"#).unwrap();
        fs::write(dir.path().join("b.yaml"), "type: string\n").unwrap();

        let resolver = DirectoryResolver::new("https://example.com/schemas", dir.path());

        match resolver.resolve("https://example.com/schemas/a.json") {
            ResolverOutput::Node(v) => assert_eq!(v["type"], "object"),
            other => panic!("unexpected output: {:?}", other),
        }
        match resolver.resolve("https://example.com/schemas/b.yaml") {
            ResolverOutput::Node(v) => assert_eq!(v["type"], "string"),
            other => panic!("unexpected output: {:?}", other),
        }
        assert!(resolver.resolve("https://example.com/schemas/missing.json").is_empty());
        assert!(resolver.resolve("https://other.com/a.json").is_empty());
        assert!(resolver
            .resolve("https://example.com/schemas/../secret.json")
            .is_empty());
    }
}
