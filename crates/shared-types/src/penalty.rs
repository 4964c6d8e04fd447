//! # Penalty
//!
//! The immutable result of evaluating a slashing policy.

use crate::entities::{BlockNumber, U256};
use serde::{Deserialize, Serialize};

/// Penalty computed by a policy module for one proposer.
///
/// All fields are unsigned, so a penalty is non-negative by construction.
/// A penalty is "empty" iff all three fields are zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalty {
    /// Wei permanently removed from backing registrants.
    pub wei_slashed: U256,
    /// Wei locked in backing registrants' frozen balance.
    pub wei_frozen: U256,
    /// How long the frozen amount stays locked. Tracked by collaborators.
    pub blocks_frozen: BlockNumber,
}

impl Penalty {
    /// Creates a penalty.
    #[must_use]
    pub const fn new(wei_slashed: U256, wei_frozen: U256, blocks_frozen: BlockNumber) -> Self {
        Self {
            wei_slashed,
            wei_frozen,
            blocks_frozen,
        }
    }

    /// The "check and do not act" penalty.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true if every field is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wei_slashed.is_zero() && self.wei_frozen.is_zero() && self.blocks_frozen == 0
    }

    /// Slashed plus frozen wei, or `None` on overflow.
    #[must_use]
    pub fn total_wei(&self) -> Option<U256> {
        self.wei_slashed.checked_add(self.wei_frozen)
    }
}
