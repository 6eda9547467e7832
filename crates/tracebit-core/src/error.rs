//! # Error Types
//!
//! Cross-cutting errors for Tracebit. Contract rejections live next to the
//! workflow that raises them (`tracebit-state`); this module holds the
//! errors every layer can hit: malformed identifiers and the umbrella type
//! that callers outside the contract boundary convert into.

use thiserror::Error;

/// A domain primitive failed validation at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The identity string was empty or whitespace-only.
    #[error("principal must not be empty")]
    EmptyPrincipal,

    /// The identity string carried leading or trailing whitespace.
    #[error("principal {0:?} has surrounding whitespace")]
    UntrimmedPrincipal(String),

    /// Case identifiers start at 1.
    #[error("case id must be positive, got {0}")]
    ZeroCaseId(u64),
}

/// Top-level error type for code that sits outside a single workflow,
/// such as rendering contract results for the wire.
#[derive(Error, Debug)]
pub enum TracebitError {
    /// Identifier validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
