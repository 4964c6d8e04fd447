//! Driven ports (Outbound dependencies)

use crate::events::RegistryEvent;
use cr_02_policy_vm::{Evaluation, PolicyError};
use cr_03_signature_verification::SignatureError;
use shared_types::{Address, BlockNumber, U256};

/// Logical clock: the current block height.
pub trait BlockClock: Send + Sync {
    /// Current block height.
    fn now(&self) -> BlockNumber;
}

/// Event sink for committed operations.
pub trait EventPublisher: Send + Sync {
    /// Publish one event. Failures are logged, never rolled back.
    fn publish(&self, event: RegistryEvent) -> Result<(), String>;
}

/// Moves withdrawn funds out of the registry's custody.
///
/// Called while the ledger lock is held, before the withdrawal commits. An
/// error aborts the withdrawal.
pub trait FundsTransfer: Send + Sync {
    /// Pay `amount` wei owed to `registrant` into `destination`.
    fn transfer(&self, registrant: Address, destination: Address, amount: U256)
        -> Result<(), String>;
}

/// Sandboxed policy execution.
///
/// Implementations receive only the module, the proposer identity and the
/// context bytes. They have no handle on the ledger.
pub trait PolicyEvaluation: Send + Sync {
    /// Run `module` and decode its penalty.
    fn evaluate(
        &self,
        module: &[u8],
        proposer: Address,
        context: &[u8],
    ) -> Result<Evaluation, PolicyError>;
}

/// Checks a proposer's signature over a policy module.
pub trait PolicyAuthorization: Send + Sync {
    /// Ok if `signature` is `proposer`'s signature over `module`.
    fn authorize(
        &self,
        proposer: Address,
        module: &[u8],
        signature: &[u8],
    ) -> Result<(), SignatureError>;
}
