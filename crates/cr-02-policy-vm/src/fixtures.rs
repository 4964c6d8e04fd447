//! # Bytecode Fixtures
//!
//! A small assembler and a handful of canned policy modules for tests and
//! local experimentation.

use crate::evaluator::PENALTY_OUTPUT_LEN;
use crate::vm::Opcode;
use primitive_types::U256;
use shared_types::{Address, Penalty};

/// Appends instructions to a bytecode buffer.
#[derive(Clone, Debug, Default)]
pub struct Assembler {
    code: Vec<u8>,
}

impl Assembler {
    /// Empty program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length; the offset the next instruction lands at.
    #[must_use]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns true if nothing has been emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Emit a bare opcode.
    #[must_use]
    pub fn op(mut self, op: Opcode) -> Self {
        self.code.push(op.to_byte());
        self
    }

    /// Emit the shortest PUSH for `value` (PUSH0 for zero).
    #[must_use]
    pub fn push(mut self, value: U256) -> Self {
        let mut word = [0u8; 32];
        value.to_big_endian(&mut word);
        let skip = word.iter().take_while(|b| **b == 0).count();
        let bytes = &word[skip..];
        self.code.push(Opcode::Push(bytes.len() as u8).to_byte());
        self.code.extend_from_slice(bytes);
        self
    }

    /// Emit a PUSH for a small integer.
    #[must_use]
    pub fn push_u64(self, value: u64) -> Self {
        self.push(U256::from(value))
    }

    /// Emit a fixed-width PUSH2, for jump targets patched before the
    /// destination is known.
    #[must_use]
    pub fn push_label(mut self, target: u16) -> Self {
        self.code.push(Opcode::Push(2).to_byte());
        self.code.extend_from_slice(&target.to_be_bytes());
        self
    }

    /// Emit raw bytes, including ones the sandbox rejects.
    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.code.extend_from_slice(bytes);
        self
    }

    /// `MSTORE(offset, value)`.
    #[must_use]
    pub fn store_word(self, offset: u64, value: U256) -> Self {
        self.push(value).push_u64(offset).op(Opcode::MStore)
    }

    /// `RETURN(offset, size)`.
    #[must_use]
    pub fn return_memory(self, offset: u64, size: u64) -> Self {
        self.push_u64(size).push_u64(offset).op(Opcode::Return)
    }

    /// Store `penalty` at memory 0 and return it.
    #[must_use]
    pub fn return_penalty(self, penalty: &Penalty) -> Self {
        self.store_word(0, penalty.wei_slashed)
            .store_word(32, penalty.wei_frozen)
            .store_word(64, U256::from(penalty.blocks_frozen))
            .return_memory(0, PENALTY_OUTPUT_LEN as u64)
    }

    /// Finished bytecode.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.code
    }
}

/// Module that always returns `penalty`.
#[must_use]
pub fn constant_penalty(penalty: &Penalty) -> Vec<u8> {
    Assembler::new().return_penalty(penalty).build()
}

/// Module that always returns the empty penalty.
#[must_use]
pub fn no_penalty() -> Vec<u8> {
    constant_penalty(&Penalty::none())
}

/// Module that returns the first 96 bytes of its context data verbatim.
/// Pair with [`encode_context`].
#[must_use]
pub fn context_penalty() -> Vec<u8> {
    Assembler::new()
        .push_u64(PENALTY_OUTPUT_LEN as u64)
        .push_u64(32)
        .push_u64(0)
        .op(Opcode::CallDataCopy)
        .return_memory(0, PENALTY_OUTPUT_LEN as u64)
        .build()
}

/// Context bytes that make [`context_penalty`] return `penalty`.
#[must_use]
pub fn encode_context(penalty: &Penalty) -> Vec<u8> {
    crate::evaluator::encode_penalty(penalty).to_vec()
}

/// Module that returns `penalty` only when evaluated for `target`, and the
/// empty penalty otherwise.
#[must_use]
pub fn proposer_gated(target: Address, penalty: &Penalty) -> Vec<u8> {
    let miss = Assembler::new().return_penalty(&Penalty::none());
    let header = Assembler::new()
        .push(U256::from_big_endian(&target.to_word()))
        .push_u64(0)
        .op(Opcode::CallDataLoad)
        .op(Opcode::Eq);
    // PUSH2 label (3 bytes) and JUMPI (1 byte) sit between header and miss.
    let label = u16::try_from(header.len() + 4 + miss.len()).unwrap_or(u16::MAX);

    header
        .push_label(label)
        .op(Opcode::JumpI)
        .raw(&miss.build())
        .op(Opcode::JumpDest)
        .return_penalty(penalty)
        .build()
}

/// Module that reverts with empty reason data.
#[must_use]
pub fn reverting() -> Vec<u8> {
    Assembler::new().push_u64(0).push_u64(0).op(Opcode::Revert).build()
}

/// Module that halts with `STOP` and no output.
#[must_use]
pub fn stopping() -> Vec<u8> {
    Assembler::new().op(Opcode::Stop).build()
}

/// Module that returns 64 bytes instead of 96.
#[must_use]
pub fn short_output() -> Vec<u8> {
    Assembler::new().return_memory(0, 64).build()
}

/// Module that attempts `SSTORE(0, 1)`.
#[must_use]
pub fn storage_writer() -> Vec<u8> {
    Assembler::new().push_u64(1).push_u64(0).raw(&[0x55]).build()
}

/// Module that attempts a `CALL` after setting up its arguments.
#[must_use]
pub fn external_caller() -> Vec<u8> {
    let mut asm = Assembler::new();
    for _ in 0..7 {
        asm = asm.push_u64(0);
    }
    asm.raw(&[0xF1]).build()
}

/// Module that jumps back to its first instruction forever.
#[must_use]
pub fn infinite_loop() -> Vec<u8> {
    Assembler::new()
        .op(Opcode::JumpDest)
        .push_u64(0)
        .op(Opcode::Jump)
        .build()
}
