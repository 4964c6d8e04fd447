//! Driving ports (Inbound API)

use crate::config::RegistryConfig;
use crate::domain::{LedgerSnapshot, Proposer, ProposerStatus, Registrant, RegistryResult};
use shared_types::{Address, U256};

/// Primary Collateral Registry API
///
/// Every mutating call runs to completion under one exclusive lock and either
/// commits fully or fails with no state change.
pub trait RegistryApi: Send + Sync {
    /// Post `amount` wei of stake as `caller`.
    fn register(&self, caller: Address, amount: U256) -> RegistryResult<()>;

    /// Back each of `proposers` with `caller`'s stake. Duplicates are kept.
    fn delegate(&self, caller: Address, proposers: &[Address]) -> RegistryResult<()>;

    /// Recompute eligibility for `proposers`. Callable by anyone at any time.
    fn update_status(&self, proposers: &[Address]);

    /// Earmark `amount` of `caller`'s stake for withdrawal.
    fn initiate_exit(&self, caller: Address, amount: U256) -> RegistryResult<()>;

    /// Pay out `caller`'s pending exit to `destination` once the cooldown
    /// has elapsed. Returns the amount paid.
    fn withdraw(&self, caller: Address, destination: Address) -> RegistryResult<U256>;

    /// Evaluate a signed policy module against `context` and distribute the
    /// resulting penalty over `proposer`'s backers.
    ///
    /// An empty penalty is a successful no-op.
    fn apply_penalty(
        &self,
        proposer: Address,
        policy_module: &[u8],
        signature: &[u8],
        context: &[u8],
    ) -> RegistryResult<()>;

    /// Cached status; INCLUDER for unknown proposers.
    fn proposer_status(&self, proposer: Address) -> ProposerStatus;

    /// Cached effective collateral; zero for unknown proposers.
    fn effective_collateral(&self, proposer: Address) -> U256;

    /// Full registrant record.
    fn registrant(&self, registrant: Address) -> Option<Registrant>;

    /// Full proposer record.
    fn proposer(&self, proposer: Address) -> Option<Proposer>;

    /// Cached eligibility gate used by `apply_penalty`.
    fn is_registered_proposer(&self, proposer: Address) -> bool;

    /// Running slashable-pool total.
    fn total_balance(&self) -> U256;

    /// Parameters fixed at creation.
    fn config(&self) -> &RegistryConfig;

    /// Serializable copy of the whole ledger.
    fn snapshot(&self) -> LedgerSnapshot;
}
