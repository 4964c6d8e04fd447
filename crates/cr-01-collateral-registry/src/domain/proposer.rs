//! # Proposer
//!
//! Eligibility status derived from the stake delegated to a proposer.

use serde::{Deserialize, Serialize};
use shared_types::{Address, U256};
use std::fmt;

/// Proposer eligibility.
///
/// There is no terminal state; proposers move freely between statuses as
/// collateral and exits change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposerStatus {
    /// Effective collateral below the minimum. Default for new proposers.
    #[default]
    Includer,
    /// Collateral sufficient now, insufficient once pending exits complete.
    Exiting,
    /// Collateral sufficient with no pending-exit shortfall.
    Preconfer,
}

impl fmt::Display for ProposerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Includer => "INCLUDER",
            Self::Exiting => "EXITING",
            Self::Preconfer => "PRECONFER",
        };
        f.write_str(s)
    }
}

/// Ledger record for one proposer, created on first delegation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposer {
    /// Status at the last recomputation.
    pub status: ProposerStatus,
    /// Raw (not exit-adjusted) collateral at the last recomputation.
    pub effective_collateral: U256,
    /// Registrants backing this proposer, in delegation order. Duplicates are
    /// kept.
    pub delegated_by: Vec<Address>,
}

impl Proposer {
    /// Cached eligibility gate used by penalty application.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.status != ProposerStatus::Includer
    }
}
