//! # Shared Types Crate
//!
//! Primitive types shared across the collateral registry subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identities, amounts and the `Penalty` value
//!   are defined once here and used by the registry, the policy VM and the
//!   signature verifier.
//! - **Wei everywhere**: every amount is a 256-bit unsigned integer in wei.
//! - **Logical time**: the registry clock is a block height (`BlockNumber`).

pub mod entities;
pub mod errors;
pub mod penalty;

pub use entities::*;
pub use errors::*;
pub use penalty::Penalty;
