//! Domain layer for the Collateral Registry
//!
//! - ledger: registrant balances, exits, the running slashable total
//! - delegation: registrant/proposer edges
//! - status: proposer eligibility recomputation
//! - distribution: proportional slash-then-freeze
//! - invariants: full-scan consistency checks
//! - snapshot: persisted layout

mod delegation;
mod distribution;
mod errors;
mod invariants;
mod ledger;
mod proposer;
mod registrant;
mod snapshot;
mod status;

pub use distribution::*;
pub use errors::*;
pub use invariants::*;
pub use ledger::*;
pub use proposer::*;
pub use registrant::*;
pub use snapshot::*;
pub use status::*;
