//! # Penalty Distributor
//!
//! Spreads a penalty over every registrant backing a proposer.
//!
//! Each backer's share of a penalty field is `field * balance / total_balance`
//! with the pool-wide running total as denominator, so exposure scales with a
//! registrant's share of all stake, not of the proposer's backers. Division
//! floors.
//!
//! Slashing runs before freezing on each backer:
//! 1. `balance -= min(slash_share, balance - frozen)`
//! 2. `frozen += min(freeze_share, balance - frozen)` on the post-slash record
//!
//! All changes are staged on working copies and committed in one step. The
//! set of proposers backed by any touched registrant is returned for status
//! recomputation after the commit.

use super::errors::{RegistryError, RegistryResult};
use super::ledger::LedgerState;
use super::registrant::Registrant;
use shared_types::{Address, Penalty, U256};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// What a distribution actually applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistributionOutcome {
    /// Distinct registrants whose records changed.
    pub registrants_affected: usize,
    /// Wei removed from balances.
    pub wei_slashed: U256,
    /// Wei moved into frozen balances.
    pub wei_frozen: U256,
    /// Every proposer backed by a changed registrant.
    pub affected_proposers: BTreeSet<Address>,
}

/// `field * balance / total`, floored.
fn proportional_share(field: U256, balance: U256, total: U256) -> RegistryResult<U256> {
    field
        .checked_mul(balance)
        .map(|product| product / total)
        .ok_or(RegistryError::ArithmeticOverflow("penalty share"))
}

impl LedgerState {
    /// Apply `penalty` across the backers of `proposer`.
    ///
    /// Duplicate edges are walked once per edge; the second pass sees the
    /// record as the first pass left it.
    ///
    /// # Errors
    ///
    /// `NoBackers`, `EmptyStakePool`, `ArithmeticOverflow`, or
    /// `InvariantViolation` for a dangling edge. Nothing is written on error.
    pub fn distribute_penalty(
        &mut self,
        proposer: Address,
        penalty: &Penalty,
    ) -> RegistryResult<DistributionOutcome> {
        let backers = self.backers_of(&proposer);
        if backers.is_empty() {
            return Err(RegistryError::NoBackers(proposer));
        }
        let total = self.total_balance;
        if total.is_zero() {
            return Err(RegistryError::EmptyStakePool);
        }

        let mut working: BTreeMap<Address, Registrant> = BTreeMap::new();
        let mut outcome = DistributionOutcome::default();
        let mut touched = BTreeSet::new();

        for who in backers {
            let record = match working.entry(*who) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let original = self.registrants.get(who).ok_or_else(|| {
                        RegistryError::InvariantViolation(format!(
                            "proposer {proposer} lists unknown backer {who}"
                        ))
                    })?;
                    entry.insert(original.clone())
                }
            };

            let slash_share = proportional_share(penalty.wei_slashed, record.balance, total)?;
            let freeze_share = proportional_share(penalty.wei_frozen, record.balance, total)?;

            let slashed = slash_share.min(record.available());
            record.balance -= slashed;

            let frozen = freeze_share.min(record.available());
            record.frozen_balance += frozen;

            if slashed.is_zero() && frozen.is_zero() {
                continue;
            }
            touched.insert(*who);
            outcome.wei_slashed = outcome
                .wei_slashed
                .checked_add(slashed)
                .ok_or(RegistryError::ArithmeticOverflow("slashed total"))?;
            outcome.wei_frozen = outcome
                .wei_frozen
                .checked_add(frozen)
                .ok_or(RegistryError::ArithmeticOverflow("frozen total"))?;
        }

        working.retain(|who, _| touched.contains(who));
        for record in working.values() {
            outcome
                .affected_proposers
                .extend(record.delegated_proposers.iter().copied());
        }
        outcome.registrants_affected = touched.len();

        self.commit_registrants(working)?;
        Ok(outcome)
    }
}
