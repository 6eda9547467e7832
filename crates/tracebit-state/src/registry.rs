//! # Flagged-Entity Registry
//!
//! An admin-maintained directory of wallet addresses with a
//! classification, a risk score and free-text notes. Reads are public;
//! every write is admin-only.
//!
//! Entries are stamped with the block height at which they were added or
//! last updated. The registry owns its block counter and only advances it
//! through [`EntityRegistry::increment_block`] or
//! [`EntityRegistry::observe_block_height`].
//!
//! ## Error codes
//!
//! | code | condition                                   |
//! |------|---------------------------------------------|
//! | 100  | caller is not the admin                     |
//! | 101  | wallet already registered                   |
//! | 102  | wallet not registered                       |
//! | 104  | wallet or new admin is the sentinel address |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tracebit_core::{BlockHeight, ContractError, ErrorCode, Principal};

// ─── Configuration ───────────────────────────────────────────────────

/// Registry settings fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Address rejected as a registry key or admin target.
    pub sentinel_address: Principal,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sentinel_address: Principal::burn_address(),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Rejections raised by the entity registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Caller is not the admin.
    #[error("{caller} is not the registry admin")]
    NotAdmin {
        /// The rejected caller.
        caller: Principal,
    },

    /// Wallet is already registered.
    #[error("entity {wallet} already exists")]
    AlreadyExists {
        /// The duplicate key.
        wallet: Principal,
    },

    /// Wallet is not registered.
    #[error("entity {wallet} not found")]
    NotFound {
        /// The missing key.
        wallet: Principal,
    },

    /// The sentinel address was supplied as a target.
    #[error("{address} is the reserved sentinel address")]
    InvalidAddress {
        /// The rejected address.
        address: Principal,
    },
}

impl RegistryError {
    /// Numeric code for not-admin.
    pub const NOT_ADMIN: u32 = 100;
    /// Numeric code for already-exists.
    pub const ALREADY_EXISTS: u32 = 101;
    /// Numeric code for not-found.
    pub const NOT_FOUND: u32 = 102;
    /// Numeric code for invalid-address.
    pub const INVALID_ADDRESS: u32 = 104;

    /// The stable numeric code for this rejection.
    pub fn code_num(&self) -> u32 {
        match self {
            Self::NotAdmin { .. } => Self::NOT_ADMIN,
            Self::AlreadyExists { .. } => Self::ALREADY_EXISTS,
            Self::NotFound { .. } => Self::NOT_FOUND,
            Self::InvalidAddress { .. } => Self::INVALID_ADDRESS,
        }
    }
}

impl ContractError for RegistryError {
    fn code(&self) -> ErrorCode {
        ErrorCode::Numeric(self.code_num())
    }
}

fn rejected(op: &'static str, err: RegistryError) -> RegistryError {
    tracing::debug!(op, code = err.code_num(), error = %err, "registry operation rejected");
    err
}

// ─── Entity ──────────────────────────────────────────────────────────

/// A registry entry, keyed by wallet address in [`EntityRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Classification, e.g. `scam`, `mixer`, `exchange`.
    pub entity_type: String,
    /// Caller-supplied score. Range is not enforced here.
    pub risk_score: u64,
    /// Free-text annotation.
    pub metadata: String,
    /// Admin who created the entry. Survives updates.
    pub added_by: Principal,
    /// Block height of creation or last update.
    pub timestamp: BlockHeight,
}

// ─── Registry ────────────────────────────────────────────────────────

/// Authoritative state of the entity registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRegistry {
    admin: Principal,
    block_height: BlockHeight,
    entities: BTreeMap<Principal, Entity>,
    #[serde(default)]
    config: RegistryConfig,
}

impl EntityRegistry {
    /// An empty registry at block height zero.
    pub fn new(admin: Principal, config: RegistryConfig) -> Self {
        Self {
            admin,
            block_height: BlockHeight::GENESIS,
            entities: BTreeMap::new(),
            config,
        }
    }

    /// Builder: start the clock at `height`.
    pub fn with_block_height(mut self, height: BlockHeight) -> Self {
        self.block_height = height;
        self
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The current admin.
    pub fn admin(&self) -> &Principal {
        &self.admin
    }

    /// `caller == admin`.
    pub fn is_admin(&self, caller: &Principal) -> bool {
        self.admin == *caller
    }

    /// Current block height.
    pub fn block_height(&self) -> BlockHeight {
        self.block_height
    }

    /// The address rejected as key or admin target.
    pub fn sentinel_address(&self) -> &Principal {
        &self.config.sentinel_address
    }

    /// Number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Look up an entity. Public.
    pub fn get_entity(&self, wallet: &Principal) -> Result<&Entity, RegistryError> {
        self.entities.get(wallet).ok_or_else(|| RegistryError::NotFound {
            wallet: wallet.clone(),
        })
    }

    /// All entries in wallet order.
    pub fn entities(&self) -> impl Iterator<Item = (&Principal, &Entity)> {
        self.entities.iter()
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// Advance the block height by one.
    pub fn increment_block(&mut self) -> BlockHeight {
        self.block_height = self.block_height.next();
        self.block_height
    }

    /// Catch up with an external ledger clock. Heights below the current
    /// one are ignored; the counter never moves backwards.
    pub fn observe_block_height(&mut self, height: BlockHeight) -> BlockHeight {
        if height > self.block_height {
            self.block_height = height;
        }
        self.block_height
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Register `wallet`, stamped with the current block height.
    pub fn add_entity(
        &mut self,
        caller: &Principal,
        wallet: Principal,
        entity_type: &str,
        risk_score: u64,
        metadata: &str,
    ) -> Result<(), RegistryError> {
        const OP: &str = "add_entity";
        self.require_admin(OP, caller)?;
        self.require_not_sentinel(OP, &wallet)?;
        if self.entities.contains_key(&wallet) {
            return Err(rejected(OP, RegistryError::AlreadyExists { wallet }));
        }

        tracing::debug!(%caller, %wallet, block_height = self.block_height.get(), "entity added");
        self.entities.insert(
            wallet,
            Entity {
                entity_type: entity_type.to_string(),
                risk_score,
                metadata: metadata.to_string(),
                added_by: caller.clone(),
                timestamp: self.block_height,
            },
        );
        Ok(())
    }

    /// Replace risk score and metadata, refreshing the timestamp. Type and
    /// creator are kept.
    pub fn update_entity(
        &mut self,
        caller: &Principal,
        wallet: &Principal,
        risk_score: u64,
        metadata: &str,
    ) -> Result<(), RegistryError> {
        const OP: &str = "update_entity";
        self.require_admin(OP, caller)?;
        let height = self.block_height;
        let entity = self
            .entities
            .get_mut(wallet)
            .ok_or_else(|| rejected(OP, RegistryError::NotFound { wallet: wallet.clone() }))?;

        entity.risk_score = risk_score;
        entity.metadata = metadata.to_string();
        entity.timestamp = height;
        tracing::debug!(%caller, %wallet, block_height = height.get(), "entity updated");
        Ok(())
    }

    /// Delete `wallet` from the registry.
    pub fn remove_entity(&mut self, caller: &Principal, wallet: &Principal) -> Result<(), RegistryError> {
        const OP: &str = "remove_entity";
        self.require_admin(OP, caller)?;
        if self.entities.remove(wallet).is_none() {
            return Err(rejected(OP, RegistryError::NotFound { wallet: wallet.clone() }));
        }
        tracing::debug!(%caller, %wallet, "entity removed");
        Ok(())
    }

    /// Hand the admin role to `new_admin`, which must not be the sentinel.
    pub fn transfer_admin(&mut self, caller: &Principal, new_admin: Principal) -> Result<(), RegistryError> {
        const OP: &str = "transfer_admin";
        self.require_admin(OP, caller)?;
        self.require_not_sentinel(OP, &new_admin)?;
        tracing::debug!(%caller, %new_admin, "registry admin transferred");
        self.admin = new_admin;
        Ok(())
    }

    // ── Guards ───────────────────────────────────────────────────────

    fn require_admin(&self, op: &'static str, caller: &Principal) -> Result<(), RegistryError> {
        if !self.is_admin(caller) {
            return Err(rejected(op, RegistryError::NotAdmin { caller: caller.clone() }));
        }
        Ok(())
    }

    fn require_not_sentinel(&self, op: &'static str, address: &Principal) -> Result<(), RegistryError> {
        if *address == self.config.sentinel_address {
            return Err(rejected(op, RegistryError::InvalidAddress { address: address.clone() }));
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
