//! # Case Reporting and Review Workflow
//!
//! Reporters submit cases; reviewers pick them up and finalize them.
//!
//! ## States
//!
//! ```text
//! Reported ──▶ UnderReview ──▶ Verified (terminal)
//!                   │
//!                   └────────▶ Rejected (terminal)
//! ```
//!
//! A case can only be edited by its reporter while it is still
//! `Reported`. `reviewed_by` is set by the review step and never changes
//! afterwards, so it is present exactly when the status is past
//! `Reported`.
//!
//! ## Atomicity
//!
//! Every operation runs all of its guards before the first write. A
//! rejected call leaves the store exactly as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tracebit_core::{CaseId, ContractError, ErrorCode, Principal};

use crate::auth::{Role, Roster};

// ─── Case Status ─────────────────────────────────────────────────────

/// The lifecycle status of a case. Discriminants are the wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum CaseStatus {
    /// Submitted, awaiting a reviewer.
    Reported = 1,
    /// Claimed by a reviewer.
    UnderReview = 2,
    /// Confirmed by the reviewer (terminal).
    Verified = 3,
    /// Dismissed by the reviewer (terminal).
    Rejected = 4,
}

impl CaseStatus {
    /// The numeric wire code (1-4).
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Decode a wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Reported),
            2 => Some(Self::UnderReview),
            3 => Some(Self::Verified),
            4 => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether no further transition is permitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Rejected)
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Reported => "REPORTED",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Rejections raised by the case workflow.
///
/// Each variant maps to one stable symbolic code; see [`CaseError::code`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaseError {
    /// Caller is not the admin.
    #[error("{sender} is not the admin")]
    NotAdmin {
        /// The rejected caller.
        sender: Principal,
    },

    /// Caller is not a registered reporter.
    #[error("{sender} is not a reporter")]
    NotReporter {
        /// The rejected caller.
        sender: Principal,
    },

    /// Caller is not a registered reviewer.
    #[error("{sender} is not a reviewer")]
    NotReviewer {
        /// The rejected caller.
        sender: Principal,
    },

    /// Case metadata must not be empty.
    #[error("case metadata must not be empty")]
    EmptyMetadata,

    /// No case with the given id.
    #[error("{case_id} not found")]
    CaseNotFound {
        /// The requested id.
        case_id: CaseId,
    },

    /// The case is not in the status the transition starts from.
    #[error("{case_id} is {actual}, expected {expected}")]
    InvalidState {
        /// The addressed case.
        case_id: CaseId,
        /// Its current status.
        actual: CaseStatus,
        /// The status the transition requires.
        expected: CaseStatus,
    },

    /// Finalization target is not a terminal status.
    #[error("status code {code} is not a final case status")]
    InvalidFinalStatus {
        /// The requested target, as a wire code.
        code: i64,
    },

    /// Only the original reporter may edit a case.
    #[error("{sender} did not report {case_id}")]
    NotOwner {
        /// The addressed case.
        case_id: CaseId,
        /// The rejected caller.
        sender: Principal,
    },

    /// Every case id has been allocated.
    #[error("case ids exhausted after {last}")]
    CaseIdsExhausted {
        /// The last id the store can hand out.
        last: CaseId,
    },

    /// The case has entered review and can no longer be edited.
    #[error("{case_id} is already {status}")]
    AlreadyReviewed {
        /// The addressed case.
        case_id: CaseId,
        /// Its current status.
        status: CaseStatus,
    },
}

impl CaseError {
    /// The stable symbolic code for this rejection.
    pub fn code_str(&self) -> &'static str {
        match self {
            Self::NotAdmin { .. } => "ERR-NOT-ADMIN",
            Self::NotReporter { .. } => "ERR-NOT-REPORTER",
            Self::NotReviewer { .. } => "ERR-NOT-REVIEWER",
            Self::EmptyMetadata => "ERR-EMPTY-METADATA",
            Self::CaseNotFound { .. } => "ERR-CASE-NOT-FOUND",
            Self::InvalidState { .. } => "ERR-INVALID-STATE",
            Self::InvalidFinalStatus { .. } => "ERR-INVALID-FINAL-STATUS",
            Self::NotOwner { .. } => "ERR-NOT-OWNER",
            Self::AlreadyReviewed { .. } => "ERR-ALREADY-REVIEWED",
            Self::CaseIdsExhausted { .. } => "ERR-CASE-IDS-EXHAUSTED",
        }
    }
}

impl ContractError for CaseError {
    fn code(&self) -> ErrorCode {
        ErrorCode::named(self.code_str())
    }
}

fn rejected(op: &'static str, err: CaseError) -> CaseError {
    tracing::debug!(op, code = err.code_str(), error = %err, "case operation rejected");
    err
}

// ─── Case ────────────────────────────────────────────────────────────

/// A submitted case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Sequential identifier.
    pub id: CaseId,
    /// Free-text payload supplied by the reporter.
    pub metadata: String,
    /// Current lifecycle status.
    pub status: CaseStatus,
    /// Submitting reporter. Never changes.
    pub reported_by: Principal,
    /// Reviewer who claimed the case. Set once by `mark_under_review`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<Principal>,
}

// ─── Case Store ──────────────────────────────────────────────────────

/// A serialized [`CaseStore`] that does not describe a reachable state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The id counter would hand out an id that is already taken.
    #[error("next case id {next} does not follow the highest stored id {highest}")]
    StaleCounter {
        /// The stored counter.
        next: CaseId,
        /// The highest stored case id.
        highest: CaseId,
    },

    /// A case is stored under a key other than its own id.
    #[error("{id} is stored under key {key}")]
    MisfiledCase {
        /// The map key.
        key: CaseId,
        /// The id recorded in the case.
        id: CaseId,
    },
}

/// Authoritative state of the case workflow.
///
/// Deserialization checks that every case sits under its own id and that
/// the id counter is past the highest stored id, so a loaded snapshot
/// can never reissue an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CaseStoreSnapshot")]
pub struct CaseStore {
    roster: Roster,
    cases: BTreeMap<CaseId, Case>,
    next_case_id: CaseId,
}

#[derive(Deserialize)]
struct CaseStoreSnapshot {
    roster: Roster,
    cases: BTreeMap<CaseId, Case>,
    next_case_id: CaseId,
}

impl TryFrom<CaseStoreSnapshot> for CaseStore {
    type Error = SnapshotError;

    fn try_from(raw: CaseStoreSnapshot) -> Result<Self, Self::Error> {
        if let Some((key, case)) = raw.cases.iter().find(|(key, case)| **key != case.id) {
            return Err(SnapshotError::MisfiledCase { key: *key, id: case.id });
        }
        if let Some(&highest) = raw.cases.keys().next_back() {
            if raw.next_case_id <= highest {
                return Err(SnapshotError::StaleCounter {
                    next: raw.next_case_id,
                    highest,
                });
            }
        }
        Ok(Self {
            roster: raw.roster,
            cases: raw.cases,
            next_case_id: raw.next_case_id,
        })
    }
}

impl CaseStore {
    /// An empty store governed by `roster`. The first case gets id 1.
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            cases: BTreeMap::new(),
            next_case_id: CaseId::FIRST,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The current admin.
    pub fn admin(&self) -> &Principal {
        self.roster.admin()
    }

    /// The admin and membership sets.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// `caller == admin`.
    pub fn is_admin(&self, caller: &Principal) -> bool {
        self.roster.is_admin(caller)
    }

    /// `caller ∈ reporters`.
    pub fn is_reporter(&self, caller: &Principal) -> bool {
        self.roster.is_reporter(caller)
    }

    /// `caller ∈ reviewers`.
    pub fn is_reviewer(&self, caller: &Principal) -> bool {
        self.roster.is_reviewer(caller)
    }

    /// The id the next successful submission will receive.
    pub fn next_case_id(&self) -> CaseId {
        self.next_case_id
    }

    /// Number of cases ever submitted.
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    /// Look up a case.
    pub fn get_case(&self, case_id: CaseId) -> Result<&Case, CaseError> {
        self.cases
            .get(&case_id)
            .ok_or(CaseError::CaseNotFound { case_id })
    }

    /// All cases in id order.
    pub fn cases(&self) -> impl Iterator<Item = &Case> {
        self.cases.values()
    }

    // ── Case lifecycle ───────────────────────────────────────────────

    /// Submit a new case as `sender`. Returns the allocated id.
    pub fn submit_case(&mut self, sender: &Principal, metadata: &str) -> Result<CaseId, CaseError> {
        const OP: &str = "submit_case";
        if !self.roster.is_reporter(sender) {
            return Err(rejected(OP, CaseError::NotReporter { sender: sender.clone() }));
        }
        if metadata.is_empty() {
            return Err(rejected(OP, CaseError::EmptyMetadata));
        }

        let id = self.next_case_id;
        let Some(next) = id.checked_next() else {
            return Err(rejected(OP, CaseError::CaseIdsExhausted { last: id }));
        };
        self.next_case_id = next;
        self.cases.insert(
            id,
            Case {
                id,
                metadata: metadata.to_string(),
                status: CaseStatus::Reported,
                reported_by: sender.clone(),
                reviewed_by: None,
            },
        );
        tracing::debug!(case_id = id.get(), %sender, "case submitted");
        Ok(id)
    }

    /// Claim a reported case for review (REPORTED → UNDER_REVIEW).
    pub fn mark_under_review(&mut self, sender: &Principal, case_id: CaseId) -> Result<(), CaseError> {
        const OP: &str = "mark_under_review";
        self.require_role(OP, Role::Reviewer, sender)?;
        let case = self.require_status(OP, case_id, CaseStatus::Reported)?;

        case.status = CaseStatus::UnderReview;
        case.reviewed_by = Some(sender.clone());
        tracing::debug!(case_id = case_id.get(), %sender, "case under review");
        Ok(())
    }

    /// Close a case under review as VERIFIED or REJECTED.
    pub fn finalize_case(
        &mut self,
        sender: &Principal,
        case_id: CaseId,
        final_status: CaseStatus,
    ) -> Result<(), CaseError> {
        const OP: &str = "finalize_case";
        self.require_role(OP, Role::Reviewer, sender)?;
        if !final_status.is_terminal() {
            return Err(rejected(
                OP,
                CaseError::InvalidFinalStatus {
                    code: i64::from(final_status.code()),
                },
            ));
        }
        let case = self.require_status(OP, case_id, CaseStatus::UnderReview)?;

        case.status = final_status;
        tracing::debug!(case_id = case_id.get(), %sender, status = %final_status, "case finalized");
        Ok(())
    }

    /// [`finalize_case`](Self::finalize_case) with the target given as a
    /// wire code. Any code outside 1-4, negative ones included, is
    /// rejected as an invalid final status after the reviewer check.
    pub fn finalize_case_by_code(
        &mut self,
        sender: &Principal,
        case_id: CaseId,
        code: i64,
    ) -> Result<(), CaseError> {
        self.require_role("finalize_case", Role::Reviewer, sender)?;
        match u8::try_from(code).ok().and_then(CaseStatus::from_code) {
            Some(status) => self.finalize_case(sender, case_id, status),
            None => Err(rejected("finalize_case", CaseError::InvalidFinalStatus { code })),
        }
    }

    /// Replace the metadata of a case that has not entered review.
    ///
    /// Only the original reporter may edit; role membership is not
    /// re-checked, so a reporter removed after submitting keeps edit
    /// rights over their own open cases.
    pub fn update_case(
        &mut self,
        sender: &Principal,
        case_id: CaseId,
        new_metadata: &str,
    ) -> Result<(), CaseError> {
        const OP: &str = "update_case";
        let case = self
            .cases
            .get_mut(&case_id)
            .ok_or_else(|| rejected(OP, CaseError::CaseNotFound { case_id }))?;
        if case.reported_by != *sender {
            return Err(rejected(OP, CaseError::NotOwner { case_id, sender: sender.clone() }));
        }
        if case.status != CaseStatus::Reported {
            return Err(rejected(OP, CaseError::AlreadyReviewed { case_id, status: case.status }));
        }

        case.metadata = new_metadata.to_string();
        tracing::debug!(case_id = case_id.get(), %sender, "case updated");
        Ok(())
    }

    // ── Administration ───────────────────────────────────────────────

    /// Hand the admin role to `new_admin`. No check is made on the target.
    pub fn transfer_admin(&mut self, sender: &Principal, new_admin: Principal) -> Result<(), CaseError> {
        self.require_admin("transfer_admin", sender)?;
        tracing::debug!(%sender, %new_admin, "case admin transferred");
        self.roster.set_admin(new_admin);
        Ok(())
    }

    /// Grant `role` to `who`. Returns whether membership changed.
    pub fn grant_role(&mut self, sender: &Principal, role: Role, who: Principal) -> Result<bool, CaseError> {
        self.require_admin("grant_role", sender)?;
        tracing::debug!(%sender, %role, %who, "role granted");
        Ok(self.roster.grant(role, who))
    }

    /// Revoke `role` from `who`. Returns whether membership changed.
    pub fn revoke_role(&mut self, sender: &Principal, role: Role, who: &Principal) -> Result<bool, CaseError> {
        self.require_admin("revoke_role", sender)?;
        tracing::debug!(%sender, %role, %who, "role revoked");
        Ok(self.roster.revoke(role, who))
    }

    /// Admit a reporter.
    pub fn add_reporter(&mut self, sender: &Principal, who: Principal) -> Result<bool, CaseError> {
        self.grant_role(sender, Role::Reporter, who)
    }

    /// Remove a reporter.
    pub fn remove_reporter(&mut self, sender: &Principal, who: &Principal) -> Result<bool, CaseError> {
        self.revoke_role(sender, Role::Reporter, who)
    }

    /// Admit a reviewer.
    pub fn add_reviewer(&mut self, sender: &Principal, who: Principal) -> Result<bool, CaseError> {
        self.grant_role(sender, Role::Reviewer, who)
    }

    /// Remove a reviewer.
    pub fn remove_reviewer(&mut self, sender: &Principal, who: &Principal) -> Result<bool, CaseError> {
        self.revoke_role(sender, Role::Reviewer, who)
    }

    // ── Guards ───────────────────────────────────────────────────────

    fn require_admin(&self, op: &'static str, sender: &Principal) -> Result<(), CaseError> {
        if !self.roster.is_admin(sender) {
            return Err(rejected(op, CaseError::NotAdmin { sender: sender.clone() }));
        }
        Ok(())
    }

    fn require_role(&self, op: &'static str, role: Role, sender: &Principal) -> Result<(), CaseError> {
        if self.roster.holds(role, sender) {
            return Ok(());
        }
        let err = match role {
            Role::Reporter => CaseError::NotReporter { sender: sender.clone() },
            Role::Reviewer => CaseError::NotReviewer { sender: sender.clone() },
        };
        Err(rejected(op, err))
    }

    /// Fetch a case for mutation, requiring it to be in `expected`.
    fn require_status(
        &mut self,
        op: &'static str,
        case_id: CaseId,
        expected: CaseStatus,
    ) -> Result<&mut Case, CaseError> {
        let case = self
            .cases
            .get_mut(&case_id)
            .ok_or_else(|| rejected(op, CaseError::CaseNotFound { case_id }))?;
        if case.status != expected {
            return Err(rejected(
                op,
                CaseError::InvalidState {
                    case_id,
                    actual: case.status,
                    expected,
                },
            ));
        }
        Ok(case)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
