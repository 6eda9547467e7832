//! # Identity Newtypes
//!
//! Identifiers used across both contract workflows. A [`Principal`] names
//! anyone who can appear as a caller, admin, reporter, reviewer, or
//! registry key. A [`CaseId`] names a submitted case.
//!
//! ## Validation
//!
//! Principals are opaque strings; address-format checks belong to the
//! execution environment. Construction only rejects values that could
//! never match a real caller: empty strings and strings padded with
//! whitespace. Case ids are positive.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Routes deserialization of a string newtype through its validating
/// `new()` constructor so invalid values are rejected on load.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Principal
// ---------------------------------------------------------------------------

/// The reserved burn address of the ledger. No key controls it, so it is
/// never a meaningful admin or registry target.
pub const BURN_ADDRESS: &str = "SP000000000000000000002Q6VF78";

/// A caller identity or wallet address, e.g. `reporter.test` or
/// `ST2ABC123`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Create a principal, rejecting empty and whitespace-padded values.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyPrincipal);
        }
        if value.trim() != value {
            return Err(ValidationError::UntrimmedPrincipal(value));
        }
        Ok(Self(value))
    }

    /// The ledger burn address, [`BURN_ADDRESS`].
    pub fn burn_address() -> Self {
        Self(BURN_ADDRESS.to_string())
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl_validating_deserialize!(Principal);

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Principal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Principal {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Principal {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// CaseId
// ---------------------------------------------------------------------------

/// Sequential case identifier. The first case is `1`; ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct CaseId(u64);

impl CaseId {
    /// The id assigned to the first submitted case.
    pub const FIRST: CaseId = CaseId(1);

    /// Wrap a raw id, rejecting zero.
    pub fn new(value: u64) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::ZeroCaseId(value));
        }
        Ok(Self(value))
    }

    /// The raw numeric id.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// The id following this one, or `None` once ids are exhausted.
    pub fn checked_next(&self) -> Option<CaseId> {
        self.0.checked_add(1).map(CaseId)
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u64> for CaseId {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CaseId> for u64 {
    fn from(id: CaseId) -> Self {
        id.0
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "case:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_accepts_contract_style_names() {
        let p = Principal::new("reporter.test").unwrap();
        assert_eq!(p.as_str(), "reporter.test");
        assert_eq!(p, "reporter.test");
        assert_eq!(p.to_string(), "reporter.test");
    }

    #[test]
    fn burn_address_is_a_valid_principal() {
        assert_eq!(Principal::new(BURN_ADDRESS).unwrap(), Principal::burn_address());
    }

    #[test]
    fn principal_rejects_empty() {
        assert_eq!(Principal::new(""), Err(ValidationError::EmptyPrincipal));
        assert_eq!(Principal::new("   "), Err(ValidationError::EmptyPrincipal));
    }

    #[test]
    fn principal_rejects_padding() {
        assert!(matches!(
            Principal::new(" admin.test"),
            Err(ValidationError::UntrimmedPrincipal(_))
        ));
    }

    #[test]
    fn principal_deserialize_validates() {
        let ok: Principal = serde_json::from_str("\"ST1ADMIN\"").unwrap();
        assert_eq!(ok, "ST1ADMIN");
        assert!(serde_json::from_str::<Principal>("\"\"").is_err());
    }

    #[test]
    fn principal_serializes_as_plain_string() {
        let p = Principal::new("ST2ABC123").unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"ST2ABC123\"");
    }

    #[test]
    fn case_id_starts_at_one() {
        assert_eq!(CaseId::default().get(), 1);
        assert_eq!(CaseId::FIRST.checked_next().map(|id| id.get()), Some(2));
        assert_eq!(CaseId::new(0), Err(ValidationError::ZeroCaseId(0)));
    }

    #[test]
    fn case_id_never_wraps() {
        let last = CaseId::new(u64::MAX).unwrap();
        assert_eq!(last.checked_next(), None);
    }

    #[test]
    fn case_id_wire_form_is_number() {
        let id = CaseId::new(7).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let parsed: CaseId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<CaseId>("0").is_err());
        assert_eq!(id.to_string(), "case:7");
    }
}
