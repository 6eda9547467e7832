//! # Contract Responses
//!
//! Deployed contracts report failures as codes, not exceptions. Callers
//! branch on the discriminant of the response and match on the code, so
//! codes are stable per failure condition.
//!
//! ```text
//! {"value": true}
//! {"error": 102}
//! {"error": "ERR-INVALID-STATE"}
//! ```
//!
//! The case workflow reports symbolic codes; the entity registry reports
//! numeric codes. [`ErrorCode`] carries either.

use serde::{Deserialize, Serialize};

/// A stable error identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    /// Numeric code, e.g. `100` for not-admin in the entity registry.
    Numeric(u32),
    /// Symbolic code, e.g. `ERR-NOT-REVIEWER` in the case workflow.
    Named(String),
}

impl ErrorCode {
    /// Symbolic code from a static name.
    pub fn named(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "u{n}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// An error that is part of a contract's observable interface.
pub trait ContractError: std::error::Error {
    /// The stable code reported to callers.
    fn code(&self) -> ErrorCode;
}

/// The success-or-error shape every contract call is reported in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractResponse<T> {
    /// The call succeeded.
    Value(T),
    /// The call was rejected with no state change.
    Error(ErrorCode),
}

impl<T> ContractResponse<T> {
    /// Whether the call succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Whether the call was rejected.
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The error code, if rejected.
    pub fn error_code(&self) -> Option<&ErrorCode> {
        match self {
            Self::Value(_) => None,
            Self::Error(code) => Some(code),
        }
    }

    /// Map the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ContractResponse<U> {
        match self {
            Self::Value(v) => ContractResponse::Value(f(v)),
            Self::Error(code) => ContractResponse::Error(code),
        }
    }
}

impl<T, E: ContractError> From<Result<T, E>> for ContractResponse<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(err) => Self::Error(err.code()),
        }
    }
}
