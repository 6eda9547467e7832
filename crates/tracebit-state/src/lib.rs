//! # tracebit-state — Contract State Machines
//!
//! The two Tracebit contracts, each a store acted on by guard-then-mutate
//! operations that return `Result` with a contract error carrying a stable
//! code.
//!
//! ## Contracts
//!
//! - **Case workflow** (`case.rs`): `Reported → UnderReview →
//!   Verified | Rejected`. Reporters submit, reviewers review and
//!   finalize, the admin manages membership.
//!
//! - **Entity registry** (`registry.rs`): admin-maintained directory of
//!   flagged wallets with risk metadata, stamped with block heights.
//!
//! - **Roster** (`auth.rs`): admin identity plus reporter and reviewer
//!   sets backing the case workflow's authorization predicates.
//!
//! ## Design
//!
//! Stores are plain values. Callers construct them explicitly and pass
//! them by `&mut` to apply an operation, so independent instances never
//! share state and the borrow checker serializes writers. Every operation
//! runs all of its guards before its first write; a rejected call leaves
//! the store unchanged.

pub mod auth;
pub mod case;
pub mod registry;

// ─── Case workflow re-exports ────────────────────────────────────────

pub use auth::{Role, Roster};
pub use case::{Case, CaseError, CaseStatus, CaseStore, SnapshotError};

// ─── Registry re-exports ─────────────────────────────────────────────

pub use registry::{Entity, EntityRegistry, RegistryConfig, RegistryError};
