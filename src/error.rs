//! Error types for record construction and configuration
//!
//! Every validation failure in the schema layer surfaces as a single
//! [`SchemaValidationError`] that names the record kind, the offending field
//! and why it was rejected.

use thiserror::Error;

use crate::records::RecordKind;
use crate::schema::ExecutionStatus;

/// A record could not be constructed (or transitioned) because a field was invalid.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{entity}.{field}: {reason}")]
pub struct SchemaValidationError {
    pub entity: RecordKind,
    pub field: String,
    pub reason: ValidationReason,
}

impl SchemaValidationError {
    pub fn new(entity: RecordKind, field: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            entity,
            field: field.into(),
            reason,
        }
    }

    pub fn missing(entity: RecordKind, field: &str) -> Self {
        Self::new(entity, field, ValidationReason::Missing)
    }

    pub fn invariant(entity: RecordKind, field: &str, rule: impl Into<String>) -> Self {
        Self::new(entity, field, ValidationReason::InvariantViolated(rule.into()))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.reason, ValidationReason::Missing)
    }
}

/// Why a field was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationReason {
    #[error("missing required field")]
    Missing,

    #[error("expected {expected}, got {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown token {token:?} (expected one of: {})", .allowed.join(", "))]
    UnknownToken {
        token: String,
        allowed: &'static [&'static str],
    },

    #[error("unknown field")]
    UnknownField,

    #[error("invariant violated: {0}")]
    InvariantViolated(String),

    #[error("illegal transition {from} -> {to}")]
    IllegalTransition {
        from: ExecutionStatus,
        to: ExecutionStatus,
    },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors reading `{kind, fields}` envelopes before any record validation happens
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Envelope is not an object")]
    NotAnObject,

    #[error("Envelope is missing {0:?}")]
    MissingKey(&'static str),

    #[error("Unknown record kind {0:?}")]
    UnknownKind(String),

    #[error(transparent)]
    Schema(#[from] SchemaValidationError),
}
