//! # Policy VM Subsystem (CR-02)
//!
//! Sandboxed interpreter that evaluates untrusted slashing policy modules to a
//! `Penalty`.
//!
//! ## Purpose
//!
//! A proposer's policy module is EVM bytecode restricted to pure computation.
//! The evaluator feeds it the proposer identity and opaque context data and
//! reads back three words: wei slashed, wei frozen, blocks frozen.
//!
//! ## Sandbox Guarantees
//!
//! | Guarantee | Enforcement |
//! |-----------|-------------|
//! | No storage, logs, calls, or environment reads | `vm/opcodes.rs` - `Opcode::decode()` |
//! | Bounded execution | `vm/interpreter.rs` - gas and step limits |
//! | Bounded memory | `vm/memory.rs` - `Memory::size_after()` |
//! | No ledger access | `Interpreter` borrows only code and calldata |
//! | Deterministic | no clock, randomness, or host callbacks |
//!
//! ## Execution Limits
//!
//! | Limit | Default |
//! |-------|---------|
//! | `gas_limit` | 10,000,000 |
//! | `max_code_size` | 24 KiB |
//! | `max_calldata_size` | 128 KiB |
//! | `max_memory_size` | 1 MiB |
//! | `max_steps` | 1,000,000 |
//! | stack depth | 1024 |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Evaluator | `evaluator.rs` | Calldata/output encoding, error mapping |
//! | Interpreter | `vm/interpreter.rs` | Execution loop |
//! | Stack | `vm/stack.rs` | 1024-item stack |
//! | Memory | `vm/memory.rs` | Bounded scratch memory |
//! | Gas | `vm/gas.rs` | Cost tables |
//! | Fixtures | `fixtures.rs` | Assembler and canned modules (`test-utils`) |
//!
//! ## Usage Example
//!
//! ```ignore
//! use cr_02_policy_vm::prelude::*;
//!
//! let evaluator = PolicyEvaluator::new(VmConfig::default());
//! let evaluation = evaluator.evaluate(&module, proposer, &context)?;
//! println!("penalty: {:?}, gas: {}", evaluation.penalty, evaluation.gas_used);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

// =============================================================================
// MODULES
// =============================================================================

pub mod domain;
pub mod errors;
pub mod evaluator;
#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;
pub mod vm;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use domain::{limits, Evaluation, VmConfig};
pub use errors::{PolicyError, VmError};
pub use evaluator::{decode_penalty, encode_calldata, encode_penalty, PolicyEvaluator, PENALTY_OUTPUT_LEN};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::domain::{limits, Evaluation, VmConfig};
    pub use crate::errors::{PolicyError, VmError};
    pub use crate::evaluator::{PolicyEvaluator, PENALTY_OUTPUT_LEN};
    pub use shared_types::{Address, Penalty, U256};
}
