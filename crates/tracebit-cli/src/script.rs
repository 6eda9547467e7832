//! # Replay Scripts
//!
//! A script is a YAML list of contract calls, applied in order to the
//! stores built from a genesis document:
//!
//! ```yaml
//! - op: submit_case
//!   sender: reporter.test
//!   metadata: Case A
//! - op: mark_under_review
//!   sender: reviewer.test
//!   case_id: 1
//! - op: finalize_case
//!   sender: reviewer.test
//!   case_id: 1
//!   status: VERIFIED        # or the wire code, 3
//! - op: add_entity
//!   caller: ST1ADMIN
//!   wallet: ST2ABC123
//!   entity_type: scam
//!   risk_score: 85
//!   metadata: phish
//! - op: increment_block
//! - op: advance_to_block    # never moves the clock backwards
//!   height: 250
//! ```
//!
//! Contract rejections are results, not script failures. A script only
//! fails when it cannot be parsed, or addresses a contract the genesis
//! does not define.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tracebit_core::{BlockHeight, CaseId, ContractError, ContractResponse, Principal, TracebitError};
use tracebit_state::{CaseStatus, CaseStore, EntityRegistry};

use crate::genesis::Genesis;

/// Target status of `finalize_case`, by name or wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusArg {
    /// Wire code. Only 1-4 name a status; anything else is passed through
    /// so the contract can reject it.
    Code(i64),
    /// Status name, e.g. `VERIFIED`.
    Name(CaseStatus),
}

impl StatusArg {
    /// The wire code of the requested status.
    pub fn code(self) -> i64 {
        match self {
            Self::Name(status) => i64::from(status.code()),
            Self::Code(code) => code,
        }
    }
}

/// One scripted contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    // ── Case workflow ────────────────────────────────────────────────
    SubmitCase {
        sender: Principal,
        #[serde(default)]
        metadata: String,
    },
    MarkUnderReview {
        sender: Principal,
        case_id: CaseId,
    },
    FinalizeCase {
        sender: Principal,
        case_id: CaseId,
        status: StatusArg,
    },
    UpdateCase {
        sender: Principal,
        case_id: CaseId,
        #[serde(default)]
        metadata: String,
    },
    GetCase {
        case_id: CaseId,
    },
    TransferCaseAdmin {
        sender: Principal,
        new_admin: Principal,
    },
    AddReporter {
        sender: Principal,
        who: Principal,
    },
    RemoveReporter {
        sender: Principal,
        who: Principal,
    },
    AddReviewer {
        sender: Principal,
        who: Principal,
    },
    RemoveReviewer {
        sender: Principal,
        who: Principal,
    },

    // ── Entity registry ──────────────────────────────────────────────
    AddEntity {
        caller: Principal,
        wallet: Principal,
        entity_type: String,
        risk_score: u64,
        #[serde(default)]
        metadata: String,
    },
    UpdateEntity {
        caller: Principal,
        wallet: Principal,
        risk_score: u64,
        #[serde(default)]
        metadata: String,
    },
    RemoveEntity {
        caller: Principal,
        wallet: Principal,
    },
    GetEntity {
        wallet: Principal,
    },
    TransferRegistryAdmin {
        caller: Principal,
        new_admin: Principal,
    },
    IncrementBlock,
    AdvanceToBlock {
        height: BlockHeight,
    },
}

impl Operation {
    /// The `op` tag, for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitCase { .. } => "submit_case",
            Self::MarkUnderReview { .. } => "mark_under_review",
            Self::FinalizeCase { .. } => "finalize_case",
            Self::UpdateCase { .. } => "update_case",
            Self::GetCase { .. } => "get_case",
            Self::TransferCaseAdmin { .. } => "transfer_case_admin",
            Self::AddReporter { .. } => "add_reporter",
            Self::RemoveReporter { .. } => "remove_reporter",
            Self::AddReviewer { .. } => "add_reviewer",
            Self::RemoveReviewer { .. } => "remove_reviewer",
            Self::AddEntity { .. } => "add_entity",
            Self::UpdateEntity { .. } => "update_entity",
            Self::RemoveEntity { .. } => "remove_entity",
            Self::GetEntity { .. } => "get_entity",
            Self::TransferRegistryAdmin { .. } => "transfer_registry_admin",
            Self::IncrementBlock => "increment_block",
            Self::AdvanceToBlock { .. } => "advance_to_block",
        }
    }
}

/// Parse a script from YAML.
pub fn parse_script(yaml: &str) -> Result<Vec<Operation>> {
    serde_yaml::from_str(yaml).context("failed to parse replay script")
}

/// Read and parse a script file.
pub fn load_script(path: &Path) -> Result<Vec<Operation>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script file: {}", path.display()))?;
    parse_script(&content).with_context(|| format!("invalid script: {}", path.display()))
}

/// Render an operation result in the wire shape. Unit successes render
/// as `true`.
fn respond<T: Serialize, E: ContractError>(
    result: Result<T, E>,
) -> Result<ContractResponse<Value>, TracebitError> {
    match result {
        Ok(value) => Ok(ContractResponse::Value(serde_json::to_value(value)?)),
        Err(err) => Ok(ContractResponse::Error(err.code())),
    }
}

fn acknowledged<E>(result: Result<(), E>) -> Result<bool, E> {
    result.map(|()| true)
}

/// Live contract state for a replay.
#[derive(Debug, Clone)]
pub struct Session {
    cases: Option<CaseStore>,
    registry: Option<EntityRegistry>,
}

impl Session {
    /// Fresh stores for every section the genesis defines.
    pub fn from_genesis(genesis: &Genesis) -> Self {
        Self {
            cases: genesis.cases.as_ref().map(|g| g.build()),
            registry: genesis.registry.as_ref().map(|g| g.build()),
        }
    }

    /// The case store, if configured.
    pub fn cases(&self) -> Option<&CaseStore> {
        self.cases.as_ref()
    }

    /// The entity registry, if configured.
    pub fn registry(&self) -> Option<&EntityRegistry> {
        self.registry.as_ref()
    }

    fn cases_mut(&mut self) -> Result<&mut CaseStore> {
        self.cases
            .as_mut()
            .context("script uses the case workflow but genesis has no `cases` section")
    }

    fn registry_mut(&mut self) -> Result<&mut EntityRegistry> {
        self.registry
            .as_mut()
            .context("script uses the entity registry but genesis has no `registry` section")
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) -> Result<ContractResponse<Value>> {
        let response = match op {
            Operation::SubmitCase { sender, metadata } => {
                respond(self.cases_mut()?.submit_case(sender, metadata))
            }
            Operation::MarkUnderReview { sender, case_id } => {
                respond(acknowledged(self.cases_mut()?.mark_under_review(sender, *case_id)))
            }
            Operation::FinalizeCase { sender, case_id, status } => respond(acknowledged(
                self.cases_mut()?
                    .finalize_case_by_code(sender, *case_id, status.code()),
            )),
            Operation::UpdateCase { sender, case_id, metadata } => respond(acknowledged(
                self.cases_mut()?.update_case(sender, *case_id, metadata),
            )),
            Operation::GetCase { case_id } => respond(self.cases_mut()?.get_case(*case_id)),
            Operation::TransferCaseAdmin { sender, new_admin } => respond(acknowledged(
                self.cases_mut()?.transfer_admin(sender, new_admin.clone()),
            )),
            Operation::AddReporter { sender, who } => {
                respond(self.cases_mut()?.add_reporter(sender, who.clone()))
            }
            Operation::RemoveReporter { sender, who } => {
                respond(self.cases_mut()?.remove_reporter(sender, who))
            }
            Operation::AddReviewer { sender, who } => {
                respond(self.cases_mut()?.add_reviewer(sender, who.clone()))
            }
            Operation::RemoveReviewer { sender, who } => {
                respond(self.cases_mut()?.remove_reviewer(sender, who))
            }
            Operation::AddEntity {
                caller,
                wallet,
                entity_type,
                risk_score,
                metadata,
            } => respond(acknowledged(self.registry_mut()?.add_entity(
                caller,
                wallet.clone(),
                entity_type,
                *risk_score,
                metadata,
            ))),
            Operation::UpdateEntity {
                caller,
                wallet,
                risk_score,
                metadata,
            } => respond(acknowledged(
                self.registry_mut()?
                    .update_entity(caller, wallet, *risk_score, metadata),
            )),
            Operation::RemoveEntity { caller, wallet } => {
                respond(acknowledged(self.registry_mut()?.remove_entity(caller, wallet)))
            }
            Operation::GetEntity { wallet } => respond(self.registry_mut()?.get_entity(wallet)),
            Operation::TransferRegistryAdmin { caller, new_admin } => respond(acknowledged(
                self.registry_mut()?.transfer_admin(caller, new_admin.clone()),
            )),
            Operation::IncrementBlock => {
                let height = self.registry_mut()?.increment_block();
                serde_json::to_value(height)
                    .map(ContractResponse::Value)
                    .map_err(TracebitError::from)
            }
            Operation::AdvanceToBlock { height } => {
                let height = self.registry_mut()?.observe_block_height(*height);
                serde_json::to_value(height)
                    .map(ContractResponse::Value)
                    .map_err(TracebitError::from)
            }
        };
        Ok(response?)
    }

    /// Apply every operation in order, returning one response per step.
    pub fn run(&mut self, ops: &[Operation]) -> Result<Vec<ContractResponse<Value>>> {
        let mut responses = Vec::with_capacity(ops.len());
        for (index, op) in ops.iter().enumerate() {
            let step = index + 1;
            let response = self
                .apply(op)
                .with_context(|| format!("step {step} ({}) failed", op.name()))?;
            match response.error_code() {
                Some(code) => tracing::info!(step, op = op.name(), %code, "rejected"),
                None => tracing::info!(step, op = op.name(), "applied"),
            }
            responses.push(response);
        }
        Ok(responses)
    }
}

/// Guard against scripts that reference a contract absent from genesis
/// before any step runs.
pub fn check_coverage(genesis: &Genesis, ops: &[Operation]) -> Result<()> {
    for (index, op) in ops.iter().enumerate() {
        let needs_registry = matches!(
            op,
            Operation::AddEntity { .. }
                | Operation::UpdateEntity { .. }
                | Operation::RemoveEntity { .. }
                | Operation::GetEntity { .. }
                | Operation::TransferRegistryAdmin { .. }
                | Operation::IncrementBlock
                | Operation::AdvanceToBlock { .. }
        );
        if needs_registry && genesis.registry.is_none() {
            bail!("step {} ({}) needs a `registry` genesis section", index + 1, op.name());
        }
        if !needs_registry && genesis.cases.is_none() {
            bail!("step {} ({}) needs a `cases` genesis section", index + 1, op.name());
        }
    }
    Ok(())
}
