//! # Authorization Roster
//!
//! Who may do what in the case workflow: one admin, a set of reporters, a
//! set of reviewers. Every gated operation consults the roster before it
//! touches any state.
//!
//! Membership sets are `BTreeSet`s so a serialized roster is byte-stable
//! across runs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use tracebit_core::Principal;

/// A role an identity can be granted by the admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May submit new cases.
    Reporter,
    /// May move cases through review and finalization.
    Reviewer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reporter => f.write_str("REPORTER"),
            Self::Reviewer => f.write_str("REVIEWER"),
        }
    }
}

/// The admin identity and the two membership sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    admin: Principal,
    #[serde(default)]
    reporters: BTreeSet<Principal>,
    #[serde(default)]
    reviewers: BTreeSet<Principal>,
}

impl Roster {
    /// A roster with only an admin.
    pub fn new(admin: Principal) -> Self {
        Self {
            admin,
            reporters: BTreeSet::new(),
            reviewers: BTreeSet::new(),
        }
    }

    /// Builder: add a reporter.
    pub fn with_reporter(mut self, who: Principal) -> Self {
        self.reporters.insert(who);
        self
    }

    /// Builder: add a reviewer.
    pub fn with_reviewer(mut self, who: Principal) -> Self {
        self.reviewers.insert(who);
        self
    }

    /// The current admin.
    pub fn admin(&self) -> &Principal {
        &self.admin
    }

    /// `caller == admin`.
    pub fn is_admin(&self, caller: &Principal) -> bool {
        self.admin == *caller
    }

    /// `caller ∈ reporters`.
    pub fn is_reporter(&self, caller: &Principal) -> bool {
        self.reporters.contains(caller)
    }

    /// `caller ∈ reviewers`.
    pub fn is_reviewer(&self, caller: &Principal) -> bool {
        self.reviewers.contains(caller)
    }

    /// Whether `caller` holds `role`.
    pub fn holds(&self, role: Role, caller: &Principal) -> bool {
        match role {
            Role::Reporter => self.is_reporter(caller),
            Role::Reviewer => self.is_reviewer(caller),
        }
    }

    /// Members of a role, in sorted order.
    pub fn members(&self, role: Role) -> impl Iterator<Item = &Principal> {
        self.set(role).iter()
    }

    /// Grant `role` to `who`. Returns `false` if already held.
    pub(crate) fn grant(&mut self, role: Role, who: Principal) -> bool {
        self.set_mut(role).insert(who)
    }

    /// Revoke `role` from `who`. Returns `false` if not held.
    pub(crate) fn revoke(&mut self, role: Role, who: &Principal) -> bool {
        self.set_mut(role).remove(who)
    }

    pub(crate) fn set_admin(&mut self, admin: Principal) {
        self.admin = admin;
    }

    fn set(&self, role: Role) -> &BTreeSet<Principal> {
        match role {
            Role::Reporter => &self.reporters,
            Role::Reviewer => &self.reviewers,
        }
    }

    fn set_mut(&mut self, role: Role) -> &mut BTreeSet<Principal> {
        match role {
            Role::Reporter => &mut self.reporters,
            Role::Reviewer => &mut self.reviewers,
        }
    }
}
