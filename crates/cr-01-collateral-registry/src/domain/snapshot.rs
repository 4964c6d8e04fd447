//! # Ledger Snapshot
//!
//! Serializable image of the full ledger: every registrant and proposer
//! record plus the running total. Restoring re-validates all invariants.

use super::errors::{RegistryError, RegistryResult};
use super::invariants::{check_ledger_invariants, InvariantCheckResult};
use super::ledger::LedgerState;
use super::proposer::Proposer;
use super::registrant::Registrant;
use serde::{Deserialize, Serialize};
use shared_types::{Address, U256};
use std::collections::BTreeMap;

/// Persisted ledger layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Registrant records by identity.
    pub registrants: BTreeMap<Address, Registrant>,
    /// Proposer records by identity.
    pub proposers: BTreeMap<Address, Proposer>,
    /// Running slashable-pool total.
    pub total_balance: U256,
}

impl LedgerState {
    /// Copy the ledger into a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            registrants: self.registrants.clone(),
            proposers: self.proposers.clone(),
            total_balance: self.total_balance,
        }
    }

    /// Rebuild a ledger from a snapshot.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` listing every broken invariant.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> RegistryResult<Self> {
        let ledger = Self {
            registrants: snapshot.registrants,
            proposers: snapshot.proposers,
            total_balance: snapshot.total_balance,
        };
        match check_ledger_invariants(&ledger) {
            InvariantCheckResult::Valid => Ok(ledger),
            InvariantCheckResult::Invalid(violations) => {
                let detail = violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(RegistryError::InvariantViolation(detail))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::proposer::ProposerStatus;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn sample() -> LedgerState {
        let mut ledger = LedgerState::new();
        ledger.register(addr(1), U256::from(500), 0, 0).unwrap();
        ledger.register(addr(2), U256::from(700), 0, 3).unwrap();
        ledger.delegate(addr(1), &[addr(0xA)]).unwrap();
        ledger.delegate(addr(2), &[addr(0xA), addr(0xB)]).unwrap();
        ledger.initiate_exit(addr(2), U256::from(300), 5).unwrap();
        ledger.update_status(&[addr(0xA), addr(0xB)], 5, U256::from(1_000));
        ledger
    }

    #[test]
    fn test_snapshot_survives_json() {
        let ledger = sample();
        let json = serde_json::to_string(&ledger.snapshot()).unwrap();
        let restored = LedgerState::from_snapshot(serde_json::from_str(&json).unwrap()).unwrap();

        assert_eq!(restored, ledger);
        assert_eq!(
            restored.proposer(&addr(0xA)).unwrap().status,
            ProposerStatus::Exiting
        );
    }

    #[test]
    fn test_restore_rejects_tampered_total() {
        let mut snapshot = sample().snapshot();
        snapshot.total_balance = U256::from(1);

        let err = LedgerState::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, RegistryError::InvariantViolation(ref m) if m.contains("total balance")));
    }

    #[test]
    fn test_restore_rejects_one_sided_edge() {
        let mut snapshot = sample().snapshot();
        if let Some(r) = snapshot.registrants.get_mut(&addr(1)) {
            r.delegated_proposers.push(addr(0xB));
        }
        assert!(LedgerState::from_snapshot(snapshot).is_err());
    }
}
