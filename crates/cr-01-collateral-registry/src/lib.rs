//! # Collateral Registry Subsystem (CR-01)
//!
//! Stake accounting and proposer eligibility for a slashable collateral pool.
//!
//! ## Purpose
//!
//! Registrants post stake and delegate its backing to proposers. Proposers are
//! eligible (PRECONFER) while enough active, unfrozen stake backs them, and
//! are penalized through signed, sandboxed policy modules when they break
//! their commitments.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): ledger, delegation graph, status engine,
//!   penalty distributor, invariants. No I/O.
//! - **Ports** (`ports/`): `RegistryApi` inbound; clock, events, payouts,
//!   policy evaluation and authorization outbound.
//! - **Adapters** (`adapters/`): manual clock, in-memory event log, recording
//!   treasury, bindings to the policy VM and signature verifier.
//! - **Service** (`service/`): single-writer orchestration.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Balance Ledger | `domain/ledger.rs` | register, exit, withdraw, running total |
//! | Delegation Graph | `domain/delegation.rs` | append-only symmetric edges |
//! | Status Engine | `domain/status.rs` | INCLUDER / EXITING / PRECONFER |
//! | Penalty Distributor | `domain/distribution.rs` | proportional slash then freeze |
//! | Penalty Evaluator | `service/mod.rs` | gate, authorize, evaluate, distribute |
//!
//! ## Penalty Flow
//!
//! 1. Cached status gate: the proposer must not be INCLUDER
//! 2. Signature over the module bytes must recover to the proposer
//! 3. Module runs in the policy VM with `(proposer, context)` as input
//! 4. Empty penalty: nothing happens
//! 5. Distribute, recompute every affected proposer, emit `PenaltyApplied`
//!
//! ## Usage Example
//!
//! ```ignore
//! use cr_01_collateral_registry::prelude::*;
//!
//! let service = CollateralRegistryService::new(RegistryDependencies::with_policy_vm(
//!     Arc::new(InMemoryEventLog::new()),
//!     Arc::new(RecordingTreasury::new()),
//!     Arc::new(ManualClock::new(0)),
//!     RegistryConfig::default(),
//! ))?;
//! service.register(registrant, units::ether(2))?;
//! service.delegate(registrant, &[proposer])?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use config::{ConfigError, RegistryConfig};
pub use domain::{
    check_ledger_invariants, InvariantCheckResult, InvariantViolation, LedgerSnapshot,
    LedgerState, PendingExit, Proposer, ProposerStatus, Registrant, RegistryError, RegistryResult,
    StatusChange,
};
pub use events::RegistryEvent;
pub use ports::{
    BlockClock, EventPublisher, FundsTransfer, PolicyAuthorization, PolicyEvaluation, RegistryApi,
};
pub use service::{CollateralRegistryService, RegistryDependencies};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::adapters::{InMemoryEventLog, ManualClock, RecordingTreasury};
    pub use crate::config::RegistryConfig;
    pub use crate::domain::{ProposerStatus, RegistryError, RegistryResult};
    pub use crate::events::RegistryEvent;
    pub use crate::ports::RegistryApi;
    pub use crate::service::{CollateralRegistryService, RegistryDependencies};
    pub use cr_02_policy_vm::PolicyEvaluator;
    pub use cr_03_signature_verification::PolicyAuthorizer;
    pub use shared_types::{units, Address, Penalty, U256};
    pub use std::sync::Arc;
}
