//! # Policy Evaluator
//!
//! Turns `(module, proposer, context)` into a `Penalty`.
//!
//! ## Calldata layout
//!
//! ```text
//! [0..32)   proposer address, left-padded to a word
//! [32..)    context data, verbatim
//! ```
//!
//! ## Output layout
//!
//! ```text
//! [0..32)   wei slashed
//! [32..64)  wei frozen
//! [64..96)  blocks frozen (must fit in u64)
//! ```

use crate::domain::{Evaluation, VmConfig};
use crate::errors::{PolicyError, VmError};
use crate::vm::{Halt, Interpreter};
use primitive_types::U256;
use shared_types::{Address, Penalty};
use tracing::{debug, warn};

/// Exact length of a well-formed policy result.
pub const PENALTY_OUTPUT_LEN: usize = 96;

/// Executes policy modules inside the sandbox.
#[derive(Clone, Debug, Default)]
pub struct PolicyEvaluator {
    config: VmConfig,
}

impl PolicyEvaluator {
    /// Create an evaluator with the given sandbox limits.
    #[must_use]
    pub fn new(config: VmConfig) -> Self {
        Self { config }
    }

    /// Sandbox limits in force.
    #[must_use]
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Run `module` for `proposer` over `context`.
    ///
    /// # Errors
    ///
    /// - `Execution` if the module is empty or oversized, the calldata is
    ///   oversized, or the interpreter aborts
    /// - `Reverted` if the module executes `REVERT`
    /// - `MalformedOutput` if it halts without a 96-byte `RETURN`
    pub fn evaluate(
        &self,
        module: &[u8],
        proposer: Address,
        context: &[u8],
    ) -> Result<Evaluation, PolicyError> {
        if module.is_empty() {
            return Err(VmError::EmptyCode.into());
        }
        if module.len() > self.config.max_code_size {
            return Err(VmError::CodeSizeExceeded {
                size: module.len(),
                max: self.config.max_code_size,
            }
            .into());
        }

        let calldata = encode_calldata(proposer, context);
        if calldata.len() > self.config.max_calldata_size {
            return Err(VmError::CallDataTooLarge {
                size: calldata.len(),
                max: self.config.max_calldata_size,
            }
            .into());
        }

        let outcome = Interpreter::new(module, &calldata, &self.config)
            .run()
            .map_err(|err| {
                warn!(proposer = %proposer, error = %err, "Policy execution aborted");
                err
            })?;

        let penalty = match outcome.halt {
            Halt::Return(output) => decode_penalty(&output)?,
            Halt::Revert(reason) => return Err(PolicyError::Reverted { reason }),
            Halt::Stop => {
                return Err(PolicyError::MalformedOutput(
                    "halted without returning a penalty".into(),
                ))
            }
        };

        debug!(
            proposer = %proposer,
            gas_used = outcome.gas_used,
            steps = outcome.steps,
            empty = penalty.is_empty(),
            "Policy evaluated"
        );

        Ok(Evaluation {
            penalty,
            gas_used: outcome.gas_used,
        })
    }
}

/// Build the calldata a module sees.
#[must_use]
pub fn encode_calldata(proposer: Address, context: &[u8]) -> Vec<u8> {
    let mut calldata = Vec::with_capacity(32 + context.len());
    calldata.extend_from_slice(&proposer.to_word());
    calldata.extend_from_slice(context);
    calldata
}

/// Decode a 96-byte module result.
///
/// # Errors
///
/// Returns `MalformedOutput` on a wrong length or a `blocks_frozen` word
/// above `u64::MAX`.
pub fn decode_penalty(output: &[u8]) -> Result<Penalty, PolicyError> {
    if output.len() != PENALTY_OUTPUT_LEN {
        return Err(PolicyError::MalformedOutput(format!(
            "expected {PENALTY_OUTPUT_LEN} bytes, got {}",
            output.len()
        )));
    }

    let wei_slashed = U256::from_big_endian(&output[0..32]);
    let wei_frozen = U256::from_big_endian(&output[32..64]);
    let blocks = U256::from_big_endian(&output[64..96]);
    if blocks > U256::from(u64::MAX) {
        return Err(PolicyError::MalformedOutput(
            "blocks frozen does not fit in 64 bits".into(),
        ));
    }

    Ok(Penalty::new(wei_slashed, wei_frozen, blocks.low_u64()))
}

/// Encode a penalty the way a module returns it.
#[must_use]
pub fn encode_penalty(penalty: &Penalty) -> [u8; PENALTY_OUTPUT_LEN] {
    let mut out = [0u8; PENALTY_OUTPUT_LEN];
    penalty.wei_slashed.to_big_endian(&mut out[0..32]);
    penalty.wei_frozen.to_big_endian(&mut out[32..64]);
    U256::from(penalty.blocks_frozen).to_big_endian(&mut out[64..96]);
    out
}
