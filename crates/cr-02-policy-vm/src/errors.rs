//! # Error Types
//!
//! Errors raised while executing an untrusted policy module.

use thiserror::Error;

// =============================================================================
// VM ERRORS
// =============================================================================

/// Errors that can occur during policy bytecode execution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    /// Execution ran out of gas.
    #[error("out of gas")]
    OutOfGas,

    /// Stack overflow (>1024 items).
    #[error("stack overflow")]
    StackOverflow,

    /// Stack underflow (pop from empty stack).
    #[error("stack underflow")]
    StackUnderflow,

    /// Undefined opcode encountered.
    #[error("invalid opcode: 0x{0:02X}")]
    InvalidOpcode(u8),

    /// Opcode exists in the EVM but grants capabilities a policy may not use.
    #[error("forbidden opcode {name} (0x{opcode:02X}) in policy module")]
    ForbiddenOpcode { opcode: u8, name: &'static str },

    /// Invalid jump destination.
    #[error("invalid jump destination: {0}")]
    InvalidJump(usize),

    /// Module bytecode exceeds the size limit.
    #[error("code size exceeded: {size} > {max} bytes")]
    CodeSizeExceeded { size: usize, max: usize },

    /// Module bytecode is empty.
    #[error("policy module is empty")]
    EmptyCode,

    /// Input (proposer word plus context data) exceeds the size limit.
    #[error("calldata size exceeded: {size} > {max} bytes")]
    CallDataTooLarge { size: usize, max: usize },

    /// Memory expansion would exceed limit.
    #[error("memory limit exceeded: {requested} > {max} bytes")]
    MemoryLimitExceeded { requested: usize, max: usize },

    /// Step budget exhausted.
    #[error("step limit exceeded: {max} steps")]
    StepLimitExceeded { max: u64 },
}

// =============================================================================
// POLICY ERRORS
// =============================================================================

/// Errors from evaluating a policy module to a `Penalty`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Execution aborted inside the interpreter.
    #[error("policy execution failed: {0}")]
    Execution(#[from] VmError),

    /// The module explicitly reverted.
    #[error("policy reverted ({} bytes of reason data)", reason.len())]
    Reverted { reason: Vec<u8> },

    /// The module halted without returning a well-formed penalty.
    #[error("malformed policy output: {0}")]
    MalformedOutput(String),
}

impl PolicyError {
    /// Returns true if the failure was the module's own decision to revert.
    #[must_use]
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================
