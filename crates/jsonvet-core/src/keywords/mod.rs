//! Keyword evaluators
//!
//! Applicators recursively invoke the engine and communicate through the
//! annotation tree; leaf predicates perform one local check; metadata
//! keywords only produce annotations. Evaluators are constructed by the
//! dialect factories in [`crate::dialect`] and never call each other
//! directly.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

pub mod applicator;
pub mod arrays;
pub mod leaf;
pub mod meta;
pub mod objects;
pub mod refs;
pub mod unevaluated;

pub use applicator::{AllOf, AnyOf, BooleanSchema, Else, If, Not, OneOf, Then};
pub use arrays::{
    AdditionalItems, Contains, LegacyItems, MaxContains, MinContains, PrefixItems, RestItems,
};
pub use leaf::{
    Const, DependentRequired, Enum, ExclusiveMaximum, ExclusiveMinimum, MaxItems, MaxLength,
    MaxProperties, Maximum, MinItems, MinLength, MinProperties, Minimum, MultipleOf, Pattern,
    Required, Type, UniqueItems,
};
pub use meta::{AnnotationKeyword, Format};
pub use objects::{
    AdditionalProperties, Dependencies, DependentSchemas, PatternProperties, Properties,
    PropertyNames,
};
pub use refs::{DynamicRef, RecursiveRef, Ref};
pub use unevaluated::{UnevaluatedItems, UnevaluatedProperties};
