//! # Policy Authorization
//!
//! Binds a proposer to one exact policy module. The proposer signs the
//! Keccak-256 digest of the module bytes; the signature is reusable for every
//! evaluation of that module and useless for any other module.

use crate::domain::ecdsa::check_signer;
use crate::domain::entities::EcdsaSignature;
use crate::domain::errors::SignatureError;
use shared_types::{keccak256, Address, Hash};
use tracing::debug;

/// Digest a proposer signs to authorize `policy_module`.
#[must_use]
pub fn policy_digest(policy_module: &[u8]) -> Hash {
    keccak256(policy_module)
}

/// Verifies policy authorization signatures.
#[derive(Debug, Clone, Default)]
pub struct PolicyAuthorizer;

impl PolicyAuthorizer {
    /// Create a new authorizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Checks that `signature` is `proposer`'s signature over `policy_module`.
    ///
    /// # Errors
    ///
    /// Returns the first failing check: length, scalar range, malleability,
    /// recovery, or signer mismatch.
    pub fn verify(
        &self,
        proposer: Address,
        policy_module: &[u8],
        signature: &[u8],
    ) -> Result<(), SignatureError> {
        let signature = EcdsaSignature::from_bytes(signature)?;
        let digest = policy_digest(policy_module);

        let signer = check_signer(&digest, &signature, proposer)?;
        debug!(proposer = %signer, module_len = policy_module.len(), "Policy authorization verified");
        Ok(())
    }
}
