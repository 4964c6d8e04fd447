//! # Domain Entities
//!
//! Sandbox limits and the outcome of one policy evaluation.

use serde::{Deserialize, Serialize};
use shared_types::Penalty;

/// Hard limits every policy execution runs under.
pub mod limits {
    /// Default gas budget per evaluation.
    pub const DEFAULT_GAS_LIMIT: u64 = 10_000_000;
    /// Maximum module size (EIP-170 contract size).
    pub const DEFAULT_MAX_CODE_SIZE: usize = 24 * 1024;
    /// Maximum calldata (proposer word plus context data).
    pub const DEFAULT_MAX_CALLDATA_SIZE: usize = 128 * 1024;
    /// Maximum memory a module may expand to.
    pub const DEFAULT_MAX_MEMORY_SIZE: usize = 1024 * 1024;
    /// Maximum interpreter steps, independent of gas pricing.
    pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;
    /// Stack depth.
    pub const MAX_STACK_SIZE: usize = 1024;
}

/// Sandbox configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Gas available to one evaluation.
    pub gas_limit: u64,
    /// Maximum module size in bytes.
    pub max_code_size: usize,
    /// Maximum calldata size in bytes.
    pub max_calldata_size: usize,
    /// Maximum memory size in bytes.
    pub max_memory_size: usize,
    /// Maximum number of executed instructions.
    pub max_steps: u64,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            gas_limit: limits::DEFAULT_GAS_LIMIT,
            max_code_size: limits::DEFAULT_MAX_CODE_SIZE,
            max_calldata_size: limits::DEFAULT_MAX_CALLDATA_SIZE,
            max_memory_size: limits::DEFAULT_MAX_MEMORY_SIZE,
            max_steps: limits::DEFAULT_MAX_STEPS,
        }
    }
}

impl VmConfig {
    /// Returns the name of the first zero-valued limit, if any.
    #[must_use]
    pub fn first_zero_limit(&self) -> Option<&'static str> {
        if self.gas_limit == 0 {
            Some("gas_limit")
        } else if self.max_code_size == 0 {
            Some("max_code_size")
        } else if self.max_calldata_size == 0 {
            Some("max_calldata_size")
        } else if self.max_memory_size == 0 {
            Some("max_memory_size")
        } else if self.max_steps == 0 {
            Some("max_steps")
        } else {
            None
        }
    }
}

/// Successful evaluation of a policy module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    /// Penalty the module returned.
    pub penalty: Penalty,
    /// Gas consumed by the module.
    pub gas_used: u64,
}
