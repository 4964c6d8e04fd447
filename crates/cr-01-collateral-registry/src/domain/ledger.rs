//! # Balance Ledger
//!
//! Registrant and proposer records plus the running `total_balance`.
//!
//! ## Slashable pool
//!
//! `total_balance` is the sum over registrants of
//! `(balance - frozen_balance) - amount_exiting`, floored at zero per
//! registrant. It is never recomputed by scan: every mutation goes through
//! [`LedgerState::commit_registrants`], which adjusts the total by the change
//! in slashable stake of exactly the records it replaces.
//!
//! | Operation | Change to `total_balance` |
//! |-----------|---------------------------|
//! | `register` | `+amount` |
//! | `initiate_exit` | `-min(amount, balance - frozen)` |
//! | `withdraw` | none (already left the pool) |
//! | penalty | `-(slashed + frozen)` actually applied to non-exiting stake |

use super::errors::{RegistryError, RegistryResult};
use super::proposer::Proposer;
use super::registrant::{PendingExit, Registrant};
use shared_types::{Address, BlockNumber, U256};
use std::collections::BTreeMap;

/// A validated withdrawal awaiting payout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Withdrawal {
    /// Registrant being paid out.
    pub registrant: Address,
    /// Wei leaving the ledger.
    pub amount: U256,
}

/// Complete ledger state. Guarded by the service's single-writer lock.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub(crate) registrants: BTreeMap<Address, Registrant>,
    pub(crate) proposers: BTreeMap<Address, Proposer>,
    pub(crate) total_balance: U256,
}

impl LedgerState {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === QUERIES ===

    /// Registrant record, if registered.
    #[must_use]
    pub fn registrant(&self, who: &Address) -> Option<&Registrant> {
        self.registrants.get(who)
    }

    /// Proposer record, if anyone ever delegated to it.
    #[must_use]
    pub fn proposer(&self, who: &Address) -> Option<&Proposer> {
        self.proposers.get(who)
    }

    /// All registrants in address order.
    pub fn registrants(&self) -> impl Iterator<Item = (&Address, &Registrant)> {
        self.registrants.iter()
    }

    /// All proposers in address order.
    pub fn proposers(&self) -> impl Iterator<Item = (&Address, &Proposer)> {
        self.proposers.iter()
    }

    /// Running slashable-pool total.
    #[must_use]
    pub fn total_balance(&self) -> U256 {
        self.total_balance
    }

    /// True if `who` has a registrant record.
    #[must_use]
    pub fn is_registered(&self, who: &Address) -> bool {
        self.registrants.contains_key(who)
    }

    pub(crate) fn require_registrant(&self, who: &Address) -> RegistryResult<&Registrant> {
        self.registrants
            .get(who)
            .ok_or(RegistryError::NotRegistered(*who))
    }

    // === MUTATIONS ===

    /// Post `amount` of stake for a new registrant.
    ///
    /// Returns the block at which the stake becomes active.
    ///
    /// # Errors
    ///
    /// `ZeroAmount`, `AlreadyRegistered`, or `ArithmeticOverflow`.
    pub fn register(
        &mut self,
        who: Address,
        amount: U256,
        now: BlockNumber,
        activation_delay: BlockNumber,
    ) -> RegistryResult<BlockNumber> {
        if amount.is_zero() {
            return Err(RegistryError::ZeroAmount);
        }
        if self.is_registered(&who) {
            return Err(RegistryError::AlreadyRegistered(who));
        }
        let entered_at = now
            .checked_add(activation_delay)
            .ok_or(RegistryError::ArithmeticOverflow("activation block"))?;

        self.commit_registrants(BTreeMap::from([(who, Registrant::new(amount, entered_at))]))?;
        Ok(entered_at)
    }

    /// Earmark `amount` for withdrawal after the cooldown.
    ///
    /// A new request replaces any pending exit and restarts its cooldown at
    /// `now`. Returns the proposers the registrant backs, for status
    /// recomputation.
    ///
    /// # Errors
    ///
    /// `ZeroAmount`, `NotRegistered`, or `InsufficientBalance`.
    pub fn initiate_exit(
        &mut self,
        who: Address,
        amount: U256,
        now: BlockNumber,
    ) -> RegistryResult<Vec<Address>> {
        if amount.is_zero() {
            return Err(RegistryError::ZeroAmount);
        }
        let current = self.require_registrant(&who)?;
        if amount > current.balance {
            return Err(RegistryError::InsufficientBalance {
                registrant: who,
                requested: amount,
                balance: current.balance,
            });
        }

        let mut updated = current.clone();
        updated.pending_exit = Some(PendingExit {
            initiated_at: now,
            amount,
        });
        let backed = updated.delegated_proposers.clone();

        self.commit_registrants(BTreeMap::from([(who, updated)]))?;
        Ok(backed)
    }

    /// Validate a withdrawal without changing anything.
    ///
    /// # Errors
    ///
    /// `NotRegistered`, `ExitNotInitiated`, `CooldownNotElapsed`,
    /// `ExitExceedsBalance`, `WithdrawWouldTouchFrozen`, or
    /// `ArithmeticOverflow`.
    pub fn prepare_withdraw(
        &self,
        who: Address,
        now: BlockNumber,
        exit_cooldown: BlockNumber,
    ) -> RegistryResult<Withdrawal> {
        let current = self.require_registrant(&who)?;
        let exit = current
            .pending_exit
            .ok_or(RegistryError::ExitNotInitiated(who))?;

        let available_at = exit
            .initiated_at
            .checked_add(exit_cooldown)
            .ok_or(RegistryError::ArithmeticOverflow("exit cooldown"))?;
        if now < available_at {
            return Err(RegistryError::CooldownNotElapsed {
                registrant: who,
                now,
                available_at,
            });
        }

        let remaining = current
            .balance
            .checked_sub(exit.amount)
            .ok_or(RegistryError::ExitExceedsBalance {
                registrant: who,
                exiting: exit.amount,
                balance: current.balance,
            })?;
        if remaining < current.frozen_balance {
            return Err(RegistryError::WithdrawWouldTouchFrozen {
                registrant: who,
                remaining,
                frozen: current.frozen_balance,
            });
        }

        Ok(Withdrawal {
            registrant: who,
            amount: exit.amount,
        })
    }

    /// Commit a withdrawal produced by [`LedgerState::prepare_withdraw`].
    ///
    /// Returns the proposers the registrant backs.
    ///
    /// # Errors
    ///
    /// `NotRegistered` or `ExitExceedsBalance` if the ledger changed since
    /// preparation.
    pub fn apply_withdraw(&mut self, withdrawal: &Withdrawal) -> RegistryResult<Vec<Address>> {
        let who = withdrawal.registrant;
        let current = self.require_registrant(&who)?;

        let mut updated = current.clone();
        updated.balance = current.balance.checked_sub(withdrawal.amount).ok_or(
            RegistryError::ExitExceedsBalance {
                registrant: who,
                exiting: withdrawal.amount,
                balance: current.balance,
            },
        )?;
        updated.pending_exit = None;
        let backed = updated.delegated_proposers.clone();

        self.commit_registrants(BTreeMap::from([(who, updated)]))?;
        Ok(backed)
    }

    /// Replace registrant records in one step, moving `total_balance` by the
    /// change in their slashable stake. Nothing is written unless the new
    /// total and every record are valid.
    pub(crate) fn commit_registrants(
        &mut self,
        updates: BTreeMap<Address, Registrant>,
    ) -> RegistryResult<()> {
        let mut added = U256::zero();
        let mut removed = U256::zero();

        for (who, updated) in &updates {
            if updated.frozen_balance > updated.balance {
                return Err(RegistryError::InvariantViolation(format!(
                    "frozen balance {} exceeds balance {} for {who}",
                    updated.frozen_balance, updated.balance
                )));
            }
            let before = self
                .registrants
                .get(who)
                .map_or_else(U256::zero, Registrant::slashable);
            let after = updated.slashable();
            if after >= before {
                added = added
                    .checked_add(after - before)
                    .ok_or(RegistryError::ArithmeticOverflow("total balance"))?;
            } else {
                removed = removed
                    .checked_add(before - after)
                    .ok_or(RegistryError::ArithmeticOverflow("total balance"))?;
            }
        }

        let total = self
            .total_balance
            .checked_add(added)
            .ok_or(RegistryError::ArithmeticOverflow("total balance"))?
            .checked_sub(removed)
            .ok_or_else(|| {
                RegistryError::InvariantViolation("total balance would underflow".into())
            })?;

        self.registrants.extend(updates);
        self.total_balance = total;
        Ok(())
    }
}
