//! # Policy Interpreter
//!
//! Synchronous, capability-free execution engine for policy bytecode.
//!
//! The interpreter owns its stack and memory and borrows only the module code
//! and the calldata. It has no handle to any ledger, storage, or callback, so
//! a module cannot observe or mutate anything outside its own execution.
//!
//! Execution ends on:
//! - `STOP` or running off the end of the code
//! - `RETURN` / `REVERT` with a memory slice
//! - any `VmError` (gas, steps, stack, memory, jumps, forbidden opcodes)

use super::gas::{self, base_cost};
use super::memory::{Memory, WORD_SIZE};
use super::opcodes::{Decoded, Opcode};
use super::stack::Stack;
use crate::domain::VmConfig;
use crate::errors::VmError;
use primitive_types::{U256, U512};
use shared_types::keccak256;

/// How execution terminated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Halt {
    /// `STOP` or end of code. No output.
    Stop,
    /// `RETURN` with output bytes.
    Return(Vec<u8>),
    /// `REVERT` with reason bytes.
    Revert(Vec<u8>),
}

/// Result of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Terminating condition.
    pub halt: Halt,
    /// Gas consumed.
    pub gas_used: u64,
    /// Instructions executed.
    pub steps: u64,
}

/// Interpreter state for one execution.
pub struct Interpreter<'a> {
    code: &'a [u8],
    calldata: &'a [u8],
    pc: usize,
    stack: Stack,
    memory: Memory,
    gas_limit: u64,
    gas_remaining: u64,
    max_steps: u64,
    jump_dests: Vec<bool>,
}

impl<'a> Interpreter<'a> {
    /// Prepare an execution of `code` over `calldata` under `config` limits.
    #[must_use]
    pub fn new(code: &'a [u8], calldata: &'a [u8], config: &VmConfig) -> Self {
        Self {
            code,
            calldata,
            pc: 0,
            stack: Stack::new(),
            memory: Memory::new(config.max_memory_size),
            gas_limit: config.gas_limit,
            gas_remaining: config.gas_limit,
            max_steps: config.max_steps,
            jump_dests: analyze_jump_dests(code),
        }
    }

    /// Run to completion.
    ///
    /// # Errors
    ///
    /// Returns the `VmError` that aborted execution.
    pub fn run(mut self) -> Result<Outcome, VmError> {
        let mut steps = 0u64;

        while self.pc < self.code.len() {
            if steps >= self.max_steps {
                return Err(VmError::StepLimitExceeded {
                    max: self.max_steps,
                });
            }
            steps += 1;

            let byte = self.code[self.pc];
            let op = match Opcode::decode(byte) {
                Decoded::Allowed(op) => op,
                Decoded::Forbidden(name) => {
                    return Err(VmError::ForbiddenOpcode { opcode: byte, name })
                }
                Decoded::Undefined => return Err(VmError::InvalidOpcode(byte)),
            };

            self.consume_gas(base_cost(op))?;

            if let Some(halt) = self.step(op)? {
                return Ok(self.finish(halt, steps));
            }
        }

        Ok(self.finish(Halt::Stop, steps))
    }

    fn finish(&self, halt: Halt, steps: u64) -> Outcome {
        Outcome {
            halt,
            gas_used: self.gas_limit - self.gas_remaining,
            steps,
        }
    }

    fn consume_gas(&mut self, amount: u64) -> Result<(), VmError> {
        if amount > self.gas_remaining {
            self.gas_remaining = 0;
            return Err(VmError::OutOfGas);
        }
        self.gas_remaining -= amount;
        Ok(())
    }

    /// Charge for and perform expansion covering `[offset, offset + size)`.
    /// Returns the region as native offsets; a zero-size region never
    /// expands memory and ignores `offset`.
    fn memory_region(&mut self, offset: U256, size: U256) -> Result<(usize, usize), VmError> {
        if size.is_zero() {
            return Ok((0, 0));
        }
        let too_large = VmError::MemoryLimitExceeded {
            requested: usize::MAX,
            max: self.memory.limit(),
        };
        let offset = to_usize(offset).ok_or_else(|| too_large.clone())?;
        let size = to_usize(size).ok_or_else(|| too_large.clone())?;
        let end = offset.checked_add(size).ok_or(too_large)?;

        let new_len = self.memory.size_after(end)?;
        self.consume_gas(gas::memory_expansion_cost(self.memory.len(), new_len))?;
        self.memory.expand(end)?;
        Ok((offset, size))
    }

    fn jump(&mut self, dest: U256) -> Result<(), VmError> {
        let target = to_usize(dest).unwrap_or(usize::MAX);
        if self.jump_dests.get(target).copied().unwrap_or(false) {
            self.pc = target;
            Ok(())
        } else {
            Err(VmError::InvalidJump(target))
        }
    }

    fn push_bool(&mut self, value: bool) -> Result<(), VmError> {
        self.stack.push(if value { U256::one() } else { U256::zero() })
    }

    /// Execute one instruction. `self.pc` points at the opcode on entry.
    fn step(&mut self, op: Opcode) -> Result<Option<Halt>, VmError> {
        let pc = self.pc;
        self.pc += 1;

        match op {
            // =================================================================
            // STOP & ARITHMETIC
            // =================================================================
            Opcode::Stop => return Ok(Some(Halt::Stop)),

            Opcode::Add => {
                let [a, b] = self.stack.pop_n()?;
                self.stack.push(a.overflowing_add(b).0)?;
            }
            Opcode::Mul => {
                let [a, b] = self.stack.pop_n()?;
                self.stack.push(a.overflowing_mul(b).0)?;
            }
            Opcode::Sub => {
                let [a, b] = self.stack.pop_n()?;
                self.stack.push(a.overflowing_sub(b).0)?;
            }
            Opcode::Div => {
                let [a, b] = self.stack.pop_n()?;
                self.stack
                    .push(if b.is_zero() { U256::zero() } else { a / b })?;
            }
            Opcode::SDiv => {
                let [a, b] = self.stack.pop_n()?;
                self.stack.push(if b.is_zero() {
                    U256::zero()
                } else {
                    signed_div(a, b)
                })?;
            }
            Opcode::Mod => {
                let [a, b] = self.stack.pop_n()?;
                self.stack
                    .push(if b.is_zero() { U256::zero() } else { a % b })?;
            }
            Opcode::SMod => {
                let [a, b] = self.stack.pop_n()?;
                self.stack.push(if b.is_zero() {
                    U256::zero()
                } else {
                    signed_mod(a, b)
                })?;
            }
            Opcode::AddMod => {
                let [a, b, n] = self.stack.pop_n()?;
                let result = if n.is_zero() {
                    U256::zero()
                } else {
                    narrow((widen(a) + widen(b)) % widen(n))
                };
                self.stack.push(result)?;
            }
            Opcode::MulMod => {
                let [a, b, n] = self.stack.pop_n()?;
                let result = if n.is_zero() {
                    U256::zero()
                } else {
                    narrow((widen(a) * widen(b)) % widen(n))
                };
                self.stack.push(result)?;
            }
            Opcode::Exp => {
                let [base, exponent] = self.stack.pop_n()?;
                self.consume_gas(gas::exp_dynamic_cost(exponent))?;
                self.stack.push(exp_by_squaring(base, exponent))?;
            }
            Opcode::SignExtend => {
                let [k, x] = self.stack.pop_n()?;
                let result = match to_usize(k) {
                    Some(k) if k < 31 => {
                        let bit_index = 8 * k + 7;
                        let mask = (U256::one() << (bit_index + 1)) - U256::one();
                        if x.bit(bit_index) {
                            x | !mask
                        } else {
                            x & mask
                        }
                    }
                    _ => x,
                };
                self.stack.push(result)?;
            }

            // =================================================================
            // COMPARISON & BITWISE
            // =================================================================
            Opcode::Lt => {
                let [a, b] = self.stack.pop_n()?;
                self.push_bool(a < b)?;
            }
            Opcode::Gt => {
                let [a, b] = self.stack.pop_n()?;
                self.push_bool(a > b)?;
            }
            Opcode::SLt => {
                let [a, b] = self.stack.pop_n()?;
                self.push_bool(signed_lt(a, b))?;
            }
            Opcode::SGt => {
                let [a, b] = self.stack.pop_n()?;
                self.push_bool(signed_lt(b, a))?;
            }
            Opcode::Eq => {
                let [a, b] = self.stack.pop_n()?;
                self.push_bool(a == b)?;
            }
            Opcode::IsZero => {
                let a = self.stack.pop()?;
                self.push_bool(a.is_zero())?;
            }
            Opcode::And => {
                let [a, b] = self.stack.pop_n()?;
                self.stack.push(a & b)?;
            }
            Opcode::Or => {
                let [a, b] = self.stack.pop_n()?;
                self.stack.push(a | b)?;
            }
            Opcode::Xor => {
                let [a, b] = self.stack.pop_n()?;
                self.stack.push(a ^ b)?;
            }
            Opcode::Not => {
                let a = self.stack.pop()?;
                self.stack.push(!a)?;
            }
            Opcode::Byte => {
                let [i, x] = self.stack.pop_n()?;
                let result = match to_usize(i) {
                    Some(i) if i < 32 => U256::from(word_bytes(x)[i]),
                    _ => U256::zero(),
                };
                self.stack.push(result)?;
            }
            Opcode::Shl => {
                let [shift, value] = self.stack.pop_n()?;
                let result = match to_usize(shift) {
                    Some(s) if s < 256 => value << s,
                    _ => U256::zero(),
                };
                self.stack.push(result)?;
            }
            Opcode::Shr => {
                let [shift, value] = self.stack.pop_n()?;
                let result = match to_usize(shift) {
                    Some(s) if s < 256 => value >> s,
                    _ => U256::zero(),
                };
                self.stack.push(result)?;
            }
            Opcode::Sar => {
                let [shift, value] = self.stack.pop_n()?;
                self.stack.push(sar(value, shift))?;
            }

            // =================================================================
            // KECCAK256
            // =================================================================
            Opcode::Keccak256 => {
                let [offset, size] = self.stack.pop_n()?;
                let (offset, size) = self.memory_region(offset, size)?;
                self.consume_gas(gas::keccak256_dynamic_cost(size))?;
                let hash = keccak256(self.memory.read(offset, size));
                self.stack.push(U256::from_big_endian(&hash))?;
            }

            // =================================================================
            // INPUT ACCESS
            // =================================================================
            Opcode::CallDataLoad => {
                let offset = self.stack.pop()?;
                let word = padded_slice(self.calldata, offset, WORD_SIZE);
                self.stack.push(U256::from_big_endian(&word))?;
            }
            Opcode::CallDataSize => {
                self.stack.push(U256::from(self.calldata.len()))?;
            }
            Opcode::CallDataCopy => {
                let [dest, source, size] = self.stack.pop_n()?;
                self.copy_into_memory(dest, source, size, self.calldata)?;
            }
            Opcode::CodeSize => {
                self.stack.push(U256::from(self.code.len()))?;
            }
            Opcode::CodeCopy => {
                let [dest, source, size] = self.stack.pop_n()?;
                self.copy_into_memory(dest, source, size, self.code)?;
            }

            // =================================================================
            // STACK, MEMORY, FLOW
            // =================================================================
            Opcode::Pop => {
                self.stack.pop()?;
            }
            Opcode::MLoad => {
                let offset = self.stack.pop()?;
                let (offset, _) = self.memory_region(offset, U256::from(WORD_SIZE))?;
                let word = self.memory.read_word(offset);
                self.stack.push(U256::from_big_endian(&word))?;
            }
            Opcode::MStore => {
                let [offset, value] = self.stack.pop_n()?;
                let (offset, _) = self.memory_region(offset, U256::from(WORD_SIZE))?;
                self.memory.write(offset, &word_bytes(value));
            }
            Opcode::MStore8 => {
                let [offset, value] = self.stack.pop_n()?;
                let (offset, _) = self.memory_region(offset, U256::one())?;
                self.memory.write(offset, &[word_bytes(value)[31]]);
            }
            Opcode::Jump => {
                let dest = self.stack.pop()?;
                self.jump(dest)?;
            }
            Opcode::JumpI => {
                let [dest, condition] = self.stack.pop_n()?;
                if !condition.is_zero() {
                    self.jump(dest)?;
                }
            }
            Opcode::Pc => {
                self.stack.push(U256::from(pc))?;
            }
            Opcode::MSize => {
                self.stack.push(U256::from(self.memory.len()))?;
            }
            Opcode::Gas => {
                self.stack.push(U256::from(self.gas_remaining))?;
            }
            Opcode::JumpDest => {}
            Opcode::MCopy => {
                let [dest, source, size] = self.stack.pop_n()?;
                let (source, len) = self.memory_region(source, size)?;
                let (dest, _) = self.memory_region(dest, size)?;
                self.consume_gas(gas::copy_cost(len))?;
                self.memory.copy_within(dest, source, len);
            }

            Opcode::Push(n) => {
                let n = usize::from(n);
                let start = self.pc.min(self.code.len());
                let end = self.pc.saturating_add(n).min(self.code.len());
                let mut word = [0u8; 32];
                // Immediates truncated by the end of code are right-padded.
                word[32 - n..32 - n + (end - start)].copy_from_slice(&self.code[start..end]);
                self.stack.push(U256::from_big_endian(&word))?;
                self.pc += n;
            }
            Opcode::Dup(n) => self.stack.dup(usize::from(n))?,
            Opcode::Swap(n) => self.stack.swap(usize::from(n))?,

            // =================================================================
            // HALTING
            // =================================================================
            Opcode::Return | Opcode::Revert => {
                let [offset, size] = self.stack.pop_n()?;
                let (offset, size) = self.memory_region(offset, size)?;
                let data = self.memory.read(offset, size).to_vec();
                return Ok(Some(if op == Opcode::Return {
                    Halt::Return(data)
                } else {
                    Halt::Revert(data)
                }));
            }
            Opcode::Invalid => return Err(VmError::InvalidOpcode(op.to_byte())),
        }

        Ok(None)
    }

    fn copy_into_memory(
        &mut self,
        dest: U256,
        source_offset: U256,
        size: U256,
        source: &[u8],
    ) -> Result<(), VmError> {
        let (dest, size) = self.memory_region(dest, size)?;
        self.consume_gas(gas::copy_cost(size))?;
        let source_offset = to_usize(source_offset).unwrap_or(usize::MAX);
        self.memory.write_padded(dest, source, source_offset, size);
        Ok(())
    }
}

/// Valid `JUMPDEST` positions, skipping PUSH immediates.
fn analyze_jump_dests(code: &[u8]) -> Vec<bool> {
    let mut dests = vec![false; code.len()];
    let mut i = 0;

    while i < code.len() {
        let byte = code[i];
        if byte == Opcode::JumpDest.to_byte() {
            dests[i] = true;
        }
        if let Decoded::Allowed(op) = Opcode::decode(byte) {
            i += op.immediate_size();
        }
        i += 1;
    }

    dests
}

/// `value` as a native offset, if it fits.
fn to_usize(value: U256) -> Option<usize> {
    if value > U256::from(usize::MAX) {
        None
    } else {
        Some(value.low_u64() as usize)
    }
}

fn word_bytes(value: U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}

/// `len` bytes of `data` from `offset`, zero-padded past its end.
fn padded_slice(data: &[u8], offset: U256, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    if let Some(start) = to_usize(offset).filter(|start| *start < data.len()) {
        let available = (data.len() - start).min(len);
        out[..available].copy_from_slice(&data[start..start + available]);
    }
    out
}

fn negate(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

fn abs(value: U256) -> U256 {
    if value.bit(255) {
        negate(value)
    } else {
        value
    }
}

fn signed_lt(a: U256, b: U256) -> bool {
    match (a.bit(255), b.bit(255)) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

fn signed_div(a: U256, b: U256) -> U256 {
    let quotient = abs(a) / abs(b);
    if a.bit(255) == b.bit(255) {
        quotient
    } else {
        negate(quotient)
    }
}

fn signed_mod(a: U256, b: U256) -> U256 {
    let remainder = abs(a) % abs(b);
    if a.bit(255) {
        negate(remainder)
    } else {
        remainder
    }
}

fn sar(value: U256, shift: U256) -> U256 {
    let negative = value.bit(255);
    match to_usize(shift) {
        Some(0) => value,
        Some(s) if s < 256 => {
            let shifted = value >> s;
            if negative {
                shifted | (U256::MAX << (256 - s))
            } else {
                shifted
            }
        }
        _ => {
            if negative {
                U256::MAX
            } else {
                U256::zero()
            }
        }
    }
}

fn exp_by_squaring(mut base: U256, mut exponent: U256) -> U256 {
    let mut result = U256::one();
    while !exponent.is_zero() {
        if exponent.bit(0) {
            result = result.overflowing_mul(base).0;
        }
        exponent >>= 1;
        base = base.overflowing_mul(base).0;
    }
    result
}

fn widen(value: U256) -> U512 {
    let mut bytes = [0u8; 64];
    value.to_big_endian(&mut bytes[32..]);
    U512::from_big_endian(&bytes)
}

fn narrow(value: U512) -> U256 {
    let mut bytes = [0u8; 64];
    value.to_big_endian(&mut bytes);
    U256::from_big_endian(&bytes[32..])
}
