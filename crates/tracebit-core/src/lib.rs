//! # tracebit-core — Foundational Types for Tracebit
//!
//! The leaf of the workspace DAG. Defines the primitives both contract
//! workflows share: who is calling, which case is addressed, what block
//! height the ledger is at, and how an operation's outcome is reported to
//! callers that branch on stable error codes.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `Principal`, `CaseId` and
//!    `BlockHeight` are distinct types. A case number cannot be passed
//!    where a block height is expected.
//!
//! 2. **Errors are values with stable codes.** Every contract error
//!    implements [`ContractError`], exposing an [`ErrorCode`] that is part
//!    of the externally observable contract.
//!
//! 3. **One wire shape.** [`ContractResponse`] renders any operation result
//!    as `{"value": ...}` or `{"error": <code>}`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tracebit-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod response;
pub mod temporal;

pub use error::{TracebitError, ValidationError};
pub use identity::{CaseId, Principal, BURN_ADDRESS};
pub use response::{ContractError, ContractResponse, ErrorCode};
pub use temporal::BlockHeight;
