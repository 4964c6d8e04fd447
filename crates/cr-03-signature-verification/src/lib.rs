//! # Signature Verification Subsystem (CR-03)
//!
//! Verifies that a proposer authorized a specific slashing policy module.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure cryptographic logic, no I/O
//! - **Authorization** (`authorization.rs`): binds a signature to the exact
//!   bytes of a policy module and to the proposer identity
//!
//! ## Authorization Scheme
//!
//! A proposer signs `keccak256(policy_module)` once with its secp256k1 key.
//! The resulting 65-byte `r || s || v` signature can then be presented with
//! any number of penalty evaluations for that module.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: Signatures with high S values are rejected
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - **Signer Binding**: the recovered address must equal the proposer identity

pub mod authorization;
pub mod domain;

// Re-export public API
pub use authorization::{policy_digest, PolicyAuthorizer};
pub use domain::ecdsa::{address_from_pubkey, check_signer, recover_address, recover_signer};
pub use domain::entities::{EcdsaSignature, SIGNATURE_LENGTH};
pub use domain::errors::SignatureError;

// =============================================================================
// TEST UTILITIES (Requires `test-utils` feature)
// =============================================================================

#[cfg(feature = "test-utils")]
pub use domain::ecdsa::test_helpers;
