//! Policy adapters
//!
//! Bind the policy VM and the signature verifier to the outbound ports.

use crate::ports::{PolicyAuthorization, PolicyEvaluation};
use cr_02_policy_vm::{Evaluation, PolicyError, PolicyEvaluator};
use cr_03_signature_verification::{PolicyAuthorizer, SignatureError};
use shared_types::Address;

impl PolicyEvaluation for PolicyEvaluator {
    fn evaluate(
        &self,
        module: &[u8],
        proposer: Address,
        context: &[u8],
    ) -> Result<Evaluation, PolicyError> {
        PolicyEvaluator::evaluate(self, module, proposer, context)
    }
}

impl PolicyAuthorization for PolicyAuthorizer {
    fn authorize(
        &self,
        proposer: Address,
        module: &[u8],
        signature: &[u8],
    ) -> Result<(), SignatureError> {
        self.verify(proposer, module, signature)
    }
}
