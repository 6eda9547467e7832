//! # Block Height
//!
//! The ledger clock. Registry entries are stamped with the block height at
//! which they were written; nothing here assumes an advancement rate.
//! Heights only move forward.

use serde::{Deserialize, Serialize};

/// A ledger block height.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockHeight(u64);

impl BlockHeight {
    /// Height zero.
    pub const GENESIS: BlockHeight = BlockHeight(0);

    /// Wrap a raw height.
    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    /// The raw height.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The following block. Saturates at `u64::MAX`.
    pub fn next(&self) -> BlockHeight {
        BlockHeight(self.0.saturating_add(1))
    }
}

impl From<u64> for BlockHeight {
    fn from(height: u64) -> Self {
        Self(height)
    }
}

impl std::fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
