//! # Registrant
//!
//! A stake-posting participant and its exit state.

use serde::{Deserialize, Serialize};
use shared_types::{Address, BlockNumber, U256};

/// An exit request awaiting its cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingExit {
    /// Block at which the exit was requested.
    pub initiated_at: BlockNumber,
    /// Wei requested for withdrawal.
    pub amount: U256,
}

/// Ledger record for one registrant.
///
/// Invariant: `frozen_balance <= balance`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrant {
    /// Total posted stake in wei.
    pub balance: U256,
    /// Part of `balance` locked by freeze penalties.
    pub frozen_balance: U256,
    /// First block at which this stake counts toward proposer collateral.
    pub entered_at: BlockNumber,
    /// Outstanding exit request, if any.
    pub pending_exit: Option<PendingExit>,
    /// Proposers this registrant backs, in delegation order. Duplicates are
    /// kept.
    pub delegated_proposers: Vec<Address>,
}

impl Registrant {
    /// Fresh record created by a registration.
    #[must_use]
    pub fn new(balance: U256, entered_at: BlockNumber) -> Self {
        Self {
            balance,
            frozen_balance: U256::zero(),
            entered_at,
            pending_exit: None,
            delegated_proposers: Vec::new(),
        }
    }

    /// Balance not locked by freezes.
    #[must_use]
    pub fn available(&self) -> U256 {
        self.balance.saturating_sub(self.frozen_balance)
    }

    /// Wei earmarked by a pending exit, zero if none.
    #[must_use]
    pub fn amount_exiting(&self) -> U256 {
        self.pending_exit.map_or_else(U256::zero, |exit| exit.amount)
    }

    /// Block the pending exit was requested at, zero if none.
    #[must_use]
    pub fn exit_initiated_at(&self) -> BlockNumber {
        self.pending_exit.map_or(0, |exit| exit.initiated_at)
    }

    /// Portion of this stake penalties may draw from:
    /// `(balance - frozen) - exiting`, floored at zero.
    #[must_use]
    pub fn slashable(&self) -> U256 {
        self.available().saturating_sub(self.amount_exiting())
    }

    /// True once the activation delay has passed at block `now`.
    #[must_use]
    pub fn is_active(&self, now: BlockNumber) -> bool {
        self.entered_at <= now
    }
}
