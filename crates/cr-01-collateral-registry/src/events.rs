//! Published events
//!
//! Emitted through [`crate::ports::EventPublisher`] after the operation has
//! committed and the ledger lock is released.

use crate::domain::{ProposerStatus, StatusChange};
use serde::{Deserialize, Serialize};
use shared_types::{Address, BlockNumber, Penalty, U256};

/// Registry event stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// New registrant posted stake.
    RegistrantRegistered {
        registrant: Address,
        amount: U256,
        /// First block the stake counts toward collateral.
        entered_at: BlockNumber,
    },

    /// Registrant added delegation edges.
    ProposersDelegated {
        registrant: Address,
        proposers: Vec<Address>,
    },

    /// Registrant requested an exit.
    ExitInitiated {
        registrant: Address,
        amount: U256,
        initiated_at: BlockNumber,
    },

    /// Exit completed and paid out.
    FundsWithdrawn {
        registrant: Address,
        destination: Address,
        amount: U256,
    },

    /// A non-empty penalty was distributed.
    PenaltyApplied {
        proposer: Address,
        penalty: Penalty,
        /// Distinct registrants whose records changed.
        registrants_affected: usize,
        /// Gas the policy module consumed.
        gas_used: u64,
    },

    /// Recomputation moved a proposer to a new status.
    ProposerStatusChanged {
        proposer: Address,
        from: ProposerStatus,
        to: ProposerStatus,
        effective_collateral: U256,
    },
}

impl RegistryEvent {
    /// Short name for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RegistrantRegistered { .. } => "registrant_registered",
            Self::ProposersDelegated { .. } => "proposers_delegated",
            Self::ExitInitiated { .. } => "exit_initiated",
            Self::FundsWithdrawn { .. } => "funds_withdrawn",
            Self::PenaltyApplied { .. } => "penalty_applied",
            Self::ProposerStatusChanged { .. } => "proposer_status_changed",
        }
    }
}

impl From<StatusChange> for RegistryEvent {
    fn from(change: StatusChange) -> Self {
        Self::ProposerStatusChanged {
            proposer: change.proposer,
            from: change.from,
            to: change.to,
            effective_collateral: change.effective_collateral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_change_event() {
        let change = StatusChange {
            proposer: Address::repeat_byte(7),
            from: ProposerStatus::Preconfer,
            to: ProposerStatus::Exiting,
            effective_collateral: U256::from(5),
        };
        let event = RegistryEvent::from(change);
        assert_eq!(event.kind(), "proposer_status_changed");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "proposer_status_changed");
        assert_eq!(json["to"], "EXITING");
    }
}
