//! Jsonvet Core - Multi-draft JSON Schema validation engine
//!
//! This crate compiles JSON Schema documents into executable evaluation
//! graphs and runs them with the scoping, cross-reference and annotation
//! semantics the specification mandates, across five drafts: Draft 4,
//! Draft 6, Draft 7, 2019-09 and 2020-12.
//!
//! # Main Components
//!
//! - **Schema Compiler**: identifier and anchor assignment, meta-schema
//!   bootstrap, vocabulary activation
//! - **Schema Registry**: URI-and-pointer addressed store of compiled
//!   schemas with snapshot/rollback
//! - **Evaluation Engine**: dynamic-scope tracking, evaluation paths, an
//!   annotation tree with atomic discard semantics
//! - **Keyword Evaluators**: applicators, the `$ref` family, the
//!   unevaluated family, leaf predicates and metadata annotations
//!
//! # Example
//!
//! ```rust
//! use jsonvet_core::Validator;
//!
//! let validator = Validator::builder().without_schema_validation().build();
//! let uri = validator
//!     .register_schema(
//!         Some("https://example.com/person"),
//!         r#"{"type": "object", "required": ["name"]}"#,
//!     )
//!     .unwrap();
//!
//! let outcome = validator.validate(uri.as_str(), r#"{"name": "Ada"}"#).unwrap();
//! assert!(outcome.valid());
//!
//! let outcome = validator.validate(uri.as_str(), r#"{}"#).unwrap();
//! assert!(!outcome.valid());
//! ```
//!
//! Meta-schema validation is on by default and served by embedded copies of
//! the official meta-schemas; `without_schema_validation()` skips it and
//! assumes every supported vocabulary is active.

pub mod annotations;
pub mod compiler;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod keywords;
pub mod node;
pub mod pointer;
pub mod registry;
pub mod resolver;
pub mod uri;
pub mod validator;

// Re-export the types most callers need
pub use annotations::OutputUnit;
pub use dialect::{Dialect, EvaluatorFactory, ParsingContext, SpecVersion};
pub use engine::{EvalContext, Evaluator, MessageProvider, Outcome};
pub use error::{Error, Result};
pub use node::{DefaultNodeFactory, InstanceNode, JsonNodeFactory};
pub use pointer::JsonPointer;
pub use resolver::{
    CompositeResolver, DirectoryResolver, MapResolver, ResolverOutput, SchemaResolver,
};
pub use uri::{Location, Uri};
pub use validator::{ValidationOutcome, Validator, ValidatorBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
