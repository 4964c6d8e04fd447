//! # Status Engine
//!
//! Pure recomputation of proposer eligibility from the delegation graph and
//! the balance ledger. Nothing is maintained incrementally, so running it
//! again with no intervening mutation changes nothing.
//!
//! ## Decision rule
//!
//! Over backers with `entered_at <= now`:
//! - `effective = Σ (balance - frozen)`
//! - `exiting = Σ amount_exiting`
//!
//! | Condition (in order) | Status |
//! |----------------------|--------|
//! | `effective - exiting >= minimum` | PRECONFER |
//! | `effective < minimum` | INCLUDER |
//! | otherwise | EXITING |
//!
//! `effective` is stored unadjusted; the exit-adjusted value exists only for
//! the comparison.

use super::ledger::LedgerState;
use super::proposer::ProposerStatus;
use serde::{Deserialize, Serialize};
use shared_types::{Address, BlockNumber, U256};

/// A status transition produced by recomputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Proposer whose status moved.
    pub proposer: Address,
    /// Previous status.
    pub from: ProposerStatus,
    /// New status.
    pub to: ProposerStatus,
    /// Effective collateral after recomputation.
    pub effective_collateral: U256,
}

/// Collateral sums for one proposer at one block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollateralTally {
    /// Σ (balance - frozen) over active backers.
    pub effective: U256,
    /// Σ amount exiting over active backers.
    pub exiting: U256,
}

impl CollateralTally {
    /// Apply the decision rule.
    #[must_use]
    pub fn status(&self, minimum: U256) -> ProposerStatus {
        if self.effective.saturating_sub(self.exiting) >= minimum {
            ProposerStatus::Preconfer
        } else if self.effective < minimum {
            ProposerStatus::Includer
        } else {
            ProposerStatus::Exiting
        }
    }
}

impl LedgerState {
    /// Sum the active backers of `proposer` at block `now`.
    ///
    /// Duplicate edges count once per edge. Sums saturate; they only feed a
    /// comparison against the minimum.
    #[must_use]
    pub fn tally(&self, proposer: &Address, now: BlockNumber) -> CollateralTally {
        self.backers_of(proposer)
            .iter()
            .filter_map(|who| self.registrants.get(who))
            .filter(|r| r.is_active(now))
            .fold(CollateralTally::default(), |acc, r| CollateralTally {
                effective: acc.effective.saturating_add(r.available()),
                exiting: acc.exiting.saturating_add(r.amount_exiting()),
            })
    }

    /// Recompute status and effective collateral for each listed proposer.
    ///
    /// Unknown proposers are skipped. Returns the transitions, in input
    /// order.
    pub fn update_status(
        &mut self,
        proposers: &[Address],
        now: BlockNumber,
        minimum: U256,
    ) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        for proposer in proposers {
            if !self.proposers.contains_key(proposer) {
                continue;
            }
            let tally = self.tally(proposer, now);
            let to = tally.status(minimum);

            if let Some(record) = self.proposers.get_mut(proposer) {
                let from = record.status;
                record.status = to;
                record.effective_collateral = tally.effective;
                if from != to {
                    changes.push(StatusChange {
                        proposer: *proposer,
                        from,
                        to,
                        effective_collateral: tally.effective,
                    });
                }
            }
        }
        changes
    }
}
