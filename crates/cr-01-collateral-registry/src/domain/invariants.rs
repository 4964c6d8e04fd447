//! # Ledger Invariants
//!
//! Properties that hold at every quiescent point of the ledger. Mutations
//! keep them structurally; these full-scan checks back snapshot restoration
//! and tests, never the hot path.
//!
//! - Frozen funds never exceed the balance they lock.
//! - `total_balance` equals the sum of slashable stake.
//! - The delegation graph is symmetric, edge multiplicities included.

use super::ledger::LedgerState;
use shared_types::{Address, U256};
use std::collections::BTreeMap;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Every registrant has `frozen_balance <= balance`.
#[must_use]
pub fn check_frozen_within_balance(ledger: &LedgerState) -> Vec<InvariantViolation> {
    ledger
        .registrants()
        .filter(|(_, r)| r.frozen_balance > r.balance)
        .map(|(who, r)| InvariantViolation::FrozenExceedsBalance {
            registrant: *who,
            frozen: r.frozen_balance,
            balance: r.balance,
        })
        .collect()
}

/// The running total matches a full scan of slashable stake.
#[must_use]
pub fn check_total_balance(ledger: &LedgerState) -> Option<InvariantViolation> {
    let scanned = ledger
        .registrants()
        .try_fold(U256::zero(), |acc, (_, r)| acc.checked_add(r.slashable()));

    match scanned {
        Some(scanned) if scanned == ledger.total_balance() => None,
        Some(scanned) => Some(InvariantViolation::TotalBalanceDrift {
            tracked: ledger.total_balance(),
            scanned,
        }),
        None => Some(InvariantViolation::TotalBalanceOverflow),
    }
}

/// Each `registrant → proposer` edge appears the same number of times on
/// both sides and both endpoints exist.
#[must_use]
pub fn check_delegation_symmetry(ledger: &LedgerState) -> Vec<InvariantViolation> {
    let mut forward: BTreeMap<(Address, Address), usize> = BTreeMap::new();
    let mut backward: BTreeMap<(Address, Address), usize> = BTreeMap::new();
    let mut violations = Vec::new();

    for (who, r) in ledger.registrants() {
        for proposer in &r.delegated_proposers {
            *forward.entry((*who, *proposer)).or_default() += 1;
            if ledger.proposer(proposer).is_none() {
                violations.push(InvariantViolation::DanglingEdge {
                    registrant: *who,
                    proposer: *proposer,
                });
            }
        }
    }
    for (proposer, p) in ledger.proposers() {
        for who in &p.delegated_by {
            *backward.entry((*who, *proposer)).or_default() += 1;
            if !ledger.is_registered(who) {
                violations.push(InvariantViolation::DanglingEdge {
                    registrant: *who,
                    proposer: *proposer,
                });
            }
        }
    }

    for key in forward.keys().chain(backward.keys()) {
        let outgoing = forward.get(key).copied().unwrap_or(0);
        let incoming = backward.get(key).copied().unwrap_or(0);
        let violation = InvariantViolation::AsymmetricEdge {
            registrant: key.0,
            proposer: key.1,
            outgoing,
            incoming,
        };
        if outgoing != incoming && !violations.contains(&violation) {
            violations.push(violation);
        }
    }
    violations
}

/// Check all invariants at once.
#[must_use]
pub fn check_ledger_invariants(ledger: &LedgerState) -> InvariantCheckResult {
    let mut violations = check_frozen_within_balance(ledger);
    violations.extend(check_total_balance(ledger));
    violations.extend(check_delegation_symmetry(ledger));

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A registrant's frozen balance exceeds its balance.
    FrozenExceedsBalance {
        registrant: Address,
        frozen: U256,
        balance: U256,
    },
    /// Running total differs from the scanned slashable sum.
    TotalBalanceDrift { tracked: U256, scanned: U256 },
    /// Scanned slashable sum does not fit in 256 bits.
    TotalBalanceOverflow,
    /// Edge multiplicity differs between the two sides.
    AsymmetricEdge {
        registrant: Address,
        proposer: Address,
        outgoing: usize,
        incoming: usize,
    },
    /// Edge points at a record that does not exist.
    DanglingEdge {
        registrant: Address,
        proposer: Address,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FrozenExceedsBalance {
                registrant,
                frozen,
                balance,
            } => write!(f, "{registrant}: frozen {frozen} exceeds balance {balance}"),
            Self::TotalBalanceDrift { tracked, scanned } => {
                write!(f, "total balance {tracked} but slashable stake sums to {scanned}")
            }
            Self::TotalBalanceOverflow => write!(f, "slashable stake overflows 256 bits"),
            Self::AsymmetricEdge {
                registrant,
                proposer,
                outgoing,
                incoming,
            } => write!(
                f,
                "edge {registrant} -> {proposer} recorded {outgoing} times outgoing, {incoming} incoming"
            ),
            Self::DanglingEdge {
                registrant,
                proposer,
            } => write!(f, "edge {registrant} -> {proposer} has a missing endpoint"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
