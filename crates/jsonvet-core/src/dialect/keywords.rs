//! Canonical table of keyword name constants
//!
//! Consumed by the dialect keyword-to-evaluator maps and by test
//! enumeration; nothing in the crate spells a keyword as a loose literal.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

// identifiers and structure
pub const ID: &str = "$id";
pub const LEGACY_ID: &str = "id";
pub const SCHEMA: &str = "$schema";
pub const VOCABULARY: &str = "$vocabulary";
pub const ANCHOR: &str = "$anchor";
pub const DYNAMIC_ANCHOR: &str = "$dynamicAnchor";
pub const RECURSIVE_ANCHOR: &str = "$recursiveAnchor";
pub const DEFS: &str = "$defs";
pub const DEFINITIONS: &str = "definitions";
pub const COMMENT: &str = "$comment";

// references
pub const REF: &str = "$ref";
pub const DYNAMIC_REF: &str = "$dynamicRef";
pub const RECURSIVE_REF: &str = "$recursiveRef";

// in-place applicators
pub const ALL_OF: &str = "allOf";
pub const ANY_OF: &str = "anyOf";
pub const ONE_OF: &str = "oneOf";
pub const NOT: &str = "not";
pub const IF: &str = "if";
pub const THEN: &str = "then";
pub const ELSE: &str = "else";

// object applicators
pub const PROPERTIES: &str = "properties";
pub const PATTERN_PROPERTIES: &str = "patternProperties";
pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";
pub const PROPERTY_NAMES: &str = "propertyNames";
pub const DEPENDENT_SCHEMAS: &str = "dependentSchemas";
pub const DEPENDENCIES: &str = "dependencies";

// array applicators
pub const ITEMS: &str = "items";
pub const PREFIX_ITEMS: &str = "prefixItems";
pub const ADDITIONAL_ITEMS: &str = "additionalItems";
pub const CONTAINS: &str = "contains";

// unevaluated family
pub const UNEVALUATED_ITEMS: &str = "unevaluatedItems";
pub const UNEVALUATED_PROPERTIES: &str = "unevaluatedProperties";

// validation keywords
pub const TYPE: &str = "type";
pub const CONST: &str = "const";
pub const ENUM: &str = "enum";
pub const MULTIPLE_OF: &str = "multipleOf";
pub const MAXIMUM: &str = "maximum";
pub const EXCLUSIVE_MAXIMUM: &str = "exclusiveMaximum";
pub const MINIMUM: &str = "minimum";
pub const EXCLUSIVE_MINIMUM: &str = "exclusiveMinimum";
pub const MAX_LENGTH: &str = "maxLength";
pub const MIN_LENGTH: &str = "minLength";
pub const PATTERN: &str = "pattern";
pub const MAX_ITEMS: &str = "maxItems";
pub const MIN_ITEMS: &str = "minItems";
pub const UNIQUE_ITEMS: &str = "uniqueItems";
pub const MAX_CONTAINS: &str = "maxContains";
pub const MIN_CONTAINS: &str = "minContains";
pub const MAX_PROPERTIES: &str = "maxProperties";
pub const MIN_PROPERTIES: &str = "minProperties";
pub const REQUIRED: &str = "required";
pub const DEPENDENT_REQUIRED: &str = "dependentRequired";

// annotations
pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const DEFAULT: &str = "default";
pub const DEPRECATED: &str = "deprecated";
pub const READ_ONLY: &str = "readOnly";
pub const WRITE_ONLY: &str = "writeOnly";
pub const EXAMPLES: &str = "examples";
pub const FORMAT: &str = "format";
pub const CONTENT_ENCODING: &str = "contentEncoding";
pub const CONTENT_MEDIA_TYPE: &str = "contentMediaType";
