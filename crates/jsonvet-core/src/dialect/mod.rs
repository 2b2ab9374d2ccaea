//! Dialect and vocabulary tables
//!
//! A dialect bundles a specification version with its supported and
//! required vocabularies, its default activation map and its built-in
//! evaluator factory. The keyword-to-constructor association is a closed
//! static table per dialect; nothing here is reflective.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

pub mod factory;
pub mod keywords;
pub mod metaschema;

pub use factory::BuiltinFactory;

use crate::engine::Evaluator;
use crate::error::{Error, Result};
use crate::pointer::JsonPointer;
use crate::uri::{Location, Uri};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Supported JSON Schema specification drafts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecVersion {
    Draft4,
    Draft6,
    Draft7,
    Draft2019_09,
    Draft2020_12,
}

impl SpecVersion {
    /// The official meta-schema URI of this draft (normalized form)
    pub fn meta_schema_uri(&self) -> &'static str {
        match self {
            Self::Draft4 => "http://json-schema.org/draft-04/schema",
            Self::Draft6 => "http://json-schema.org/draft-06/schema",
            Self::Draft7 => "http://json-schema.org/draft-07/schema",
            Self::Draft2019_09 => "https://json-schema.org/draft/2019-09/schema",
            Self::Draft2020_12 => "https://json-schema.org/draft/2020-12/schema",
        }
    }

    /// Match a meta-schema URI against the known drafts
    pub fn from_meta_uri(uri: &Uri) -> Option<Self> {
        [
            Self::Draft4,
            Self::Draft6,
            Self::Draft7,
            Self::Draft2019_09,
            Self::Draft2020_12,
        ]
        .into_iter()
        .find(|v| uri.as_str() == v.meta_schema_uri())
    }

    /// The identifier keyword of this draft
    pub fn id_keyword(&self) -> &'static str {
        match self {
            Self::Draft4 => keywords::LEGACY_ID,
            _ => keywords::ID,
        }
    }

    /// Legacy drafts tolerate an anchor-only fragment in their identifier
    pub fn allows_anchor_fragment_in_id(&self) -> bool {
        matches!(self, Self::Draft4 | Self::Draft6 | Self::Draft7)
    }

    /// Legacy drafts suppress keywords beside `$ref`
    pub fn ref_suppresses_siblings(&self) -> bool {
        matches!(self, Self::Draft4 | Self::Draft6 | Self::Draft7)
    }

    /// Whether this draft declares vocabularies at all
    pub fn uses_vocabularies(&self) -> bool {
        matches!(self, Self::Draft2019_09 | Self::Draft2020_12)
    }
}

/// Vocabulary URI constants per draft
pub mod vocab {
    pub const CORE_2020: &str = "https://json-schema.org/draft/2020-12/vocab/core";
    pub const APPLICATOR_2020: &str = "https://json-schema.org/draft/2020-12/vocab/applicator";
    pub const UNEVALUATED_2020: &str = "https://json-schema.org/draft/2020-12/vocab/unevaluated";
    pub const VALIDATION_2020: &str = "https://json-schema.org/draft/2020-12/vocab/validation";
    pub const META_DATA_2020: &str = "https://json-schema.org/draft/2020-12/vocab/meta-data";
    pub const FORMAT_ANNOTATION_2020: &str =
        "https://json-schema.org/draft/2020-12/vocab/format-annotation";
    pub const CONTENT_2020: &str = "https://json-schema.org/draft/2020-12/vocab/content";

    pub const CORE_2019: &str = "https://json-schema.org/draft/2019-09/vocab/core";
    pub const APPLICATOR_2019: &str = "https://json-schema.org/draft/2019-09/vocab/applicator";
    pub const VALIDATION_2019: &str = "https://json-schema.org/draft/2019-09/vocab/validation";
    pub const META_DATA_2019: &str = "https://json-schema.org/draft/2019-09/vocab/meta-data";
    pub const FORMAT_2019: &str = "https://json-schema.org/draft/2019-09/vocab/format";
    pub const CONTENT_2019: &str = "https://json-schema.org/draft/2019-09/vocab/content";
}

const SUPPORTED_2020: &[&str] = &[
    vocab::CORE_2020,
    vocab::APPLICATOR_2020,
    vocab::UNEVALUATED_2020,
    vocab::VALIDATION_2020,
    vocab::META_DATA_2020,
    vocab::FORMAT_ANNOTATION_2020,
    vocab::CONTENT_2020,
];

const SUPPORTED_2019: &[&str] = &[
    vocab::CORE_2019,
    vocab::APPLICATOR_2019,
    vocab::VALIDATION_2019,
    vocab::META_DATA_2019,
    vocab::FORMAT_2019,
    vocab::CONTENT_2019,
];

/// A specification-version-specific bundle of vocabulary knowledge
#[derive(Debug)]
pub struct Dialect {
    pub version: SpecVersion,
    pub supported_vocabularies: &'static [&'static str],
    pub required_vocabularies: &'static [&'static str],
    /// Active set when a meta-schema omits `$vocabulary` entirely
    pub default_vocabularies: &'static [&'static str],
}

static DIALECT_2020: Dialect = Dialect {
    version: SpecVersion::Draft2020_12,
    supported_vocabularies: SUPPORTED_2020,
    required_vocabularies: &[vocab::CORE_2020],
    default_vocabularies: SUPPORTED_2020,
};

static DIALECT_2019: Dialect = Dialect {
    version: SpecVersion::Draft2019_09,
    supported_vocabularies: SUPPORTED_2019,
    required_vocabularies: &[vocab::CORE_2019],
    default_vocabularies: SUPPORTED_2019,
};

static DIALECT_LEGACY_4: Dialect = Dialect {
    version: SpecVersion::Draft4,
    supported_vocabularies: &[],
    required_vocabularies: &[],
    default_vocabularies: &[],
};

static DIALECT_LEGACY_6: Dialect = Dialect {
    version: SpecVersion::Draft6,
    supported_vocabularies: &[],
    required_vocabularies: &[],
    default_vocabularies: &[],
};

static DIALECT_LEGACY_7: Dialect = Dialect {
    version: SpecVersion::Draft7,
    supported_vocabularies: &[],
    required_vocabularies: &[],
    default_vocabularies: &[],
};

impl Dialect {
    /// The dialect table entry for a version
    pub fn of(version: SpecVersion) -> &'static Dialect {
        match version {
            SpecVersion::Draft4 => &DIALECT_LEGACY_4,
            SpecVersion::Draft6 => &DIALECT_LEGACY_6,
            SpecVersion::Draft7 => &DIALECT_LEGACY_7,
            SpecVersion::Draft2019_09 => &DIALECT_2019,
            SpecVersion::Draft2020_12 => &DIALECT_2020,
        }
    }

    /// All supported vocabularies as the assume-everything-active fallback
    pub fn all_supported(&self) -> HashSet<String> {
        self.supported_vocabularies
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    /// The default activation set used when `$vocabulary` is absent
    pub fn default_active(&self) -> HashSet<String> {
        self.default_vocabularies
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    /// Validate a declared `$vocabulary` object.
    ///
    /// Every required vocabulary must be present and `true`; every
    /// vocabulary marked `true` must be supported; unknown vocabularies
    /// marked `false` are tolerated.
    pub fn validate_vocabulary_object(
        &self,
        schema_uri: &str,
        declared: &Map<String, Value>,
    ) -> Result<HashSet<String>> {
        let mut active = HashSet::new();
        for (uri, flag) in declared {
            match flag {
                Value::Bool(true) => {
                    if !self.supported_vocabularies.contains(&uri.as_str()) {
                        return Err(Error::vocabulary(
                            schema_uri,
                            format!("vocabulary '{}' is required but not supported", uri),
                        ));
                    }
                    active.insert(uri.clone());
                }
                Value::Bool(false) => {}
                _ => {
                    return Err(Error::vocabulary(
                        schema_uri,
                        format!("vocabulary '{}' must map to a boolean", uri),
                    ));
                }
            }
        }
        for required in self.required_vocabularies {
            if !active.contains(*required) {
                return Err(Error::vocabulary(
                    schema_uri,
                    format!("mandatory vocabulary '{}' is missing or disabled", required),
                ));
            }
        }
        Ok(active)
    }
}

/// Static per-keyword execution traits: declared order and vocabulary tags
pub fn keyword_traits(version: SpecVersion, keyword: &str) -> (i32, &'static [&'static str]) {
    use self::keywords as k;
    let order = match keyword {
        k::ADDITIONAL_PROPERTIES | k::ADDITIONAL_ITEMS => 5,
        k::ITEMS if version == SpecVersion::Draft2020_12 => 5,
        k::MIN_CONTAINS | k::MAX_CONTAINS | k::THEN | k::ELSE => 5,
        k::UNEVALUATED_PROPERTIES | k::UNEVALUATED_ITEMS => 10,
        _ => 0,
    };
    let vocabularies: &'static [&'static str] = match version {
        SpecVersion::Draft2020_12 => match keyword {
            k::REF | k::DYNAMIC_REF => &[vocab::CORE_2020],
            k::ALL_OF | k::ANY_OF | k::ONE_OF | k::NOT | k::IF | k::THEN | k::ELSE
            | k::PROPERTIES | k::PATTERN_PROPERTIES | k::ADDITIONAL_PROPERTIES
            | k::PROPERTY_NAMES | k::DEPENDENT_SCHEMAS | k::ITEMS | k::PREFIX_ITEMS
            | k::CONTAINS => &[vocab::APPLICATOR_2020],
            k::UNEVALUATED_PROPERTIES | k::UNEVALUATED_ITEMS => &[vocab::UNEVALUATED_2020],
            k::TYPE | k::CONST | k::ENUM | k::MULTIPLE_OF | k::MAXIMUM | k::EXCLUSIVE_MAXIMUM
            | k::MINIMUM | k::EXCLUSIVE_MINIMUM | k::MAX_LENGTH | k::MIN_LENGTH | k::PATTERN
            | k::MAX_ITEMS | k::MIN_ITEMS | k::UNIQUE_ITEMS | k::MAX_CONTAINS | k::MIN_CONTAINS
            | k::MAX_PROPERTIES | k::MIN_PROPERTIES | k::REQUIRED | k::DEPENDENT_REQUIRED => {
                &[vocab::VALIDATION_2020]
            }
            k::TITLE | k::DESCRIPTION | k::DEFAULT | k::DEPRECATED | k::READ_ONLY
            | k::WRITE_ONLY | k::EXAMPLES => &[vocab::META_DATA_2020],
            k::FORMAT => &[vocab::FORMAT_ANNOTATION_2020],
            k::CONTENT_ENCODING | k::CONTENT_MEDIA_TYPE => &[vocab::CONTENT_2020],
            _ => &[],
        },
        SpecVersion::Draft2019_09 => match keyword {
            k::REF | k::RECURSIVE_REF => &[vocab::CORE_2019],
            k::ALL_OF | k::ANY_OF | k::ONE_OF | k::NOT | k::IF | k::THEN | k::ELSE
            | k::PROPERTIES | k::PATTERN_PROPERTIES | k::ADDITIONAL_PROPERTIES
            | k::PROPERTY_NAMES | k::DEPENDENT_SCHEMAS | k::ITEMS | k::ADDITIONAL_ITEMS
            | k::CONTAINS | k::UNEVALUATED_PROPERTIES | k::UNEVALUATED_ITEMS => {
                &[vocab::APPLICATOR_2019]
            }
            k::TYPE | k::CONST | k::ENUM | k::MULTIPLE_OF | k::MAXIMUM | k::EXCLUSIVE_MAXIMUM
            | k::MINIMUM | k::EXCLUSIVE_MINIMUM | k::MAX_LENGTH | k::MIN_LENGTH | k::PATTERN
            | k::MAX_ITEMS | k::MIN_ITEMS | k::UNIQUE_ITEMS | k::MAX_CONTAINS | k::MIN_CONTAINS
            | k::MAX_PROPERTIES | k::MIN_PROPERTIES | k::REQUIRED | k::DEPENDENT_REQUIRED => {
                &[vocab::VALIDATION_2019]
            }
            k::TITLE | k::DESCRIPTION | k::DEFAULT | k::DEPRECATED | k::READ_ONLY
            | k::WRITE_ONLY | k::EXAMPLES => &[vocab::META_DATA_2019],
            k::FORMAT => &[vocab::FORMAT_2019],
            k::CONTENT_ENCODING | k::CONTENT_MEDIA_TYPE => &[vocab::CONTENT_2019],
            _ => &[],
        },
        _ => &[],
    };
    (order, vocabularies)
}

/// Compile-time context handed to evaluator factories
pub struct ParsingContext<'a> {
    /// Base URI of the innermost enclosing identifier scope
    pub base: &'a Uri,
    /// Pointer of the current schema object within that scope's bucket
    pub pointer: &'a JsonPointer,
    /// The current schema object, for sibling-keyword inspection
    pub object: &'a Map<String, Value>,
    pub version: SpecVersion,
}

impl ParsingContext<'_> {
    /// Location of the schema stored directly under `keyword`
    pub fn child(&self, keyword: &str) -> Location {
        self.base.at_pointer(&self.pointer.push(keyword))
    }

    /// Location of the `index`-th schema under an array-valued `keyword`
    pub fn child_index(&self, keyword: &str, index: usize) -> Location {
        self.base
            .at_pointer(&self.pointer.push(keyword).push_index(index))
    }

    /// Location of a named schema under an object-valued `keyword`
    pub fn child_member(&self, keyword: &str, name: &str) -> Location {
        self.base.at_pointer(&self.pointer.push(keyword).push(name))
    }
}

/// Pure evaluator-construction seam, composable first-match-wins.
///
/// Returning `None` leaves the keyword to the next factory in the chain; a
/// keyword no factory claims stays inert.
pub trait EvaluatorFactory: Send + Sync {
    fn create(
        &self,
        ctx: &ParsingContext<'_>,
        keyword: &str,
        value: &Value,
    ) -> Option<Box<dyn Evaluator>>;
}
