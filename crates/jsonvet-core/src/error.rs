//! Error types for the jsonvet core library
//!
//! This module defines the error handling system for jsonvet, using
//! thiserror for ergonomic error definitions and anyhow as an opaque
//! source carrier where an underlying cause is worth keeping.

use crate::annotations::OutputUnit;
use thiserror::Error;

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for jsonvet operations
#[derive(Error, Debug)]
pub enum Error {
    /// A schema reference could not be resolved to a compiled schema.
    ///
    /// Recoverable during instance validation: the owning `$ref`-family
    /// evaluator converts it into an ordinary validation failure. The same
    /// condition on the meta-schema path is fatal.
    #[error("Schema '{uri}' not found")]
    SchemaNotFound { uri: String },

    /// A registered schema failed validation against its meta-schema
    #[error("Schema '{uri}' failed meta-schema validation")]
    InvalidSchema { uri: String, errors: Vec<OutputUnit> },

    /// A meta-schema could not be fetched through the resolver chain
    #[error("Cannot resolve meta-schema '{uri}'")]
    MetaSchemaResolution {
        uri: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A meta-schema was fetched but its content could not be parsed
    #[error("Cannot parse meta-schema '{uri}': {reason}")]
    MetaSchemaParse { uri: String, reason: String },

    /// A declared `$vocabulary` object is inconsistent with the dialect
    #[error("Vocabulary error for schema '{uri}': {reason}")]
    Vocabulary { uri: String, reason: String },

    /// Malformed caller input: invalid `$id`, invalid URI, invalid pointer
    #[error("Invalid argument: {reason}")]
    Argument { reason: String },

    /// A document could not be parsed by the node factory
    #[error("Cannot parse document: {reason}")]
    Parse {
        reason: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Evaluation recursed past the configured limit
    #[error("Evaluation depth limit of {limit} exceeded at '{evaluation_path}'")]
    DepthExceeded {
        limit: usize,
        evaluation_path: String,
    },
}

impl Error {
    /// Create a not-found error for a schema location
    pub fn not_found(uri: impl Into<String>) -> Self {
        Self::SchemaNotFound { uri: uri.into() }
    }

    /// Create an argument error
    pub fn argument(reason: impl Into<String>) -> Self {
        Self::Argument {
            reason: reason.into(),
        }
    }

    /// Create a parse error without an underlying source
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a vocabulary error
    pub fn vocabulary(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Vocabulary {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is the recoverable reference-resolution signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SchemaNotFound { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
            source: Some(err.into()),
        }
    }
}
