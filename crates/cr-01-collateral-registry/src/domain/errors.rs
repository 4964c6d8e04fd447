//! Error types for the Collateral Registry
//!
//! Three families, all abort the operation with no state change:
//! - precondition violations (registration, exit, withdrawal, penalty gates)
//! - authorization failures (policy signature)
//! - untrusted-execution failures (policy module)

use crate::config::ConfigError;
use cr_02_policy_vm::PolicyError;
use cr_03_signature_verification::SignatureError;
use shared_types::{Address, BlockNumber, U256};

/// Collateral registry error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Registrant already registered: {0}")]
    AlreadyRegistered(Address),

    #[error("Registrant not registered: {0}")]
    NotRegistered(Address),

    #[error("Delegation requires at least one proposer")]
    EmptyProposerList,

    #[error("Insufficient balance for {registrant}: requested {requested}, balance {balance}")]
    InsufficientBalance {
        registrant: Address,
        requested: U256,
        balance: U256,
    },

    #[error("No exit initiated for {0}")]
    ExitNotInitiated(Address),

    #[error("Exit cooldown for {registrant} not elapsed: now {now}, withdrawable at {available_at}")]
    CooldownNotElapsed {
        registrant: Address,
        now: BlockNumber,
        available_at: BlockNumber,
    },

    #[error("Exit of {exiting} exceeds remaining balance {balance} for {registrant}")]
    ExitExceedsBalance {
        registrant: Address,
        exiting: U256,
        balance: U256,
    },

    #[error("Withdrawal would leave {remaining} below frozen {frozen} for {registrant}")]
    WithdrawWouldTouchFrozen {
        registrant: Address,
        remaining: U256,
        frozen: U256,
    },

    #[error("Proposer not registered: {0}")]
    NotRegisteredProposer(Address),

    #[error("Proposer has no backers: {0}")]
    NoBackers(Address),

    #[error("Slashable stake pool is empty")]
    EmptyStakePool,

    #[error("Policy authorization rejected: {0}")]
    Unauthorized(#[from] SignatureError),

    #[error("Policy evaluation failed: {0}")]
    PolicyFailed(#[from] PolicyError),

    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    #[error("Ledger invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Funds transfer failed: {0}")]
    TransferFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl RegistryError {
    /// Caller-correctable precondition failure.
    #[must_use]
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Self::ZeroAmount
                | Self::AlreadyRegistered(_)
                | Self::NotRegistered(_)
                | Self::EmptyProposerList
                | Self::InsufficientBalance { .. }
                | Self::ExitNotInitiated(_)
                | Self::CooldownNotElapsed { .. }
                | Self::ExitExceedsBalance { .. }
                | Self::WithdrawWouldTouchFrozen { .. }
                | Self::NotRegisteredProposer(_)
                | Self::NoBackers(_)
                | Self::EmptyStakePool
        )
    }

    /// Policy signature did not check out.
    #[must_use]
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// The untrusted policy module failed or misbehaved.
    #[must_use]
    pub fn is_execution_failure(&self) -> bool {
        matches!(self, Self::PolicyFailed(_))
    }

    /// Short label for metrics and logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "zero_amount",
            Self::AlreadyRegistered(_) => "already_registered",
            Self::NotRegistered(_) => "not_registered",
            Self::EmptyProposerList => "empty_proposer_list",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::ExitNotInitiated(_) => "exit_not_initiated",
            Self::CooldownNotElapsed { .. } => "cooldown_not_elapsed",
            Self::ExitExceedsBalance { .. } => "exit_exceeds_balance",
            Self::WithdrawWouldTouchFrozen { .. } => "withdraw_would_touch_frozen",
            Self::NotRegisteredProposer(_) => "not_registered_proposer",
            Self::NoBackers(_) => "no_backers",
            Self::EmptyStakePool => "empty_stake_pool",
            Self::Unauthorized(_) => "unauthorized",
            Self::PolicyFailed(_) => "policy_failed",
            Self::ArithmeticOverflow(_) => "arithmetic_overflow",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::TransferFailed(_) => "transfer_failed",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
