//! Embedded official meta-schemas
//!
//! The full meta-schema family of every supported draft ships inside the
//! crate and is served through a built-in resolver, so meta-schema
//! validation works without network I/O. User-supplied resolvers run
//! before this one and may shadow any of these URIs.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::resolver::{ResolverOutput, SchemaResolver};

/// (normalized URI, embedded document) table for every supported draft
pub const EMBEDDED: &[(&str, &str)] = &[
    (
        "http://json-schema.org/draft-04/schema",
        include_str!("metaschemas/draft4.json"),
    ),
    (
        "http://json-schema.org/draft-06/schema",
        include_str!("metaschemas/draft6.json"),
    ),
    (
        "http://json-schema.org/draft-07/schema",
        include_str!("metaschemas/draft7.json"),
    ),
    (
        "https://json-schema.org/draft/2019-09/schema",
        include_str!("metaschemas/draft2019-09/schema.json"),
    ),
    (
        "https://json-schema.org/draft/2019-09/meta/core",
        include_str!("metaschemas/draft2019-09/core.json"),
    ),
    (
        "https://json-schema.org/draft/2019-09/meta/applicator",
        include_str!("metaschemas/draft2019-09/applicator.json"),
    ),
    (
        "https://json-schema.org/draft/2019-09/meta/validation",
        include_str!("metaschemas/draft2019-09/validation.json"),
    ),
    (
        "https://json-schema.org/draft/2019-09/meta/meta-data",
        include_str!("metaschemas/draft2019-09/meta-data.json"),
    ),
    (
        "https://json-schema.org/draft/2019-09/meta/format",
        include_str!("metaschemas/draft2019-09/format.json"),
    ),
    (
        "https://json-schema.org/draft/2019-09/meta/content",
        include_str!("metaschemas/draft2019-09/content.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/schema",
        include_str!("metaschemas/draft2020-12/schema.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/core",
        include_str!("metaschemas/draft2020-12/core.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/applicator",
        include_str!("metaschemas/draft2020-12/applicator.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/unevaluated",
        include_str!("metaschemas/draft2020-12/unevaluated.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/validation",
        include_str!("metaschemas/draft2020-12/validation.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/meta-data",
        include_str!("metaschemas/draft2020-12/meta-data.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/format-annotation",
        include_str!("metaschemas/draft2020-12/format-annotation.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/content",
        include_str!("metaschemas/draft2020-12/content.json"),
    ),
];

/// Resolver serving the embedded meta-schema family
#[derive(Debug, Default, Clone, Copy)]
pub struct MetaSchemaResolver;

impl SchemaResolver for MetaSchemaResolver {
    fn resolve(&self, uri: &str) -> ResolverOutput {
        match EMBEDDED.iter().find(|(known, _)| *known == uri) {
            Some((_, text)) => ResolverOutput::Text(text.to_string()),
            None => ResolverOutput::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SpecVersion;

    #[test]
    fn test_every_embedded_document_parses() {
        for (uri, text) in EMBEDDED {
            let value: serde_json::Value =
                serde_json::from_str(text).unwrap_or_else(|e| panic!("{} is invalid: {}", uri, e));
            assert!(value.is_object(), "{} should be an object", uri);
        }
    }

    #[test]
    fn test_dialect_roots_are_embedded() {
        for version in [
            SpecVersion::Draft4,
            SpecVersion::Draft6,
            SpecVersion::Draft7,
            SpecVersion::Draft2019_09,
            SpecVersion::Draft2020_12,
        ] {
            let uri = version.meta_schema_uri();
            assert!(
                !MetaSchemaResolver.resolve(uri).is_empty(),
                "missing embedded meta-schema for {}",
                uri
            );
        }
    }
}
