//! # Gas Metering
//!
//! Static and dynamic costs for the policy instruction set. Costs follow the
//! Shanghai schedule for the opcodes that survive the sandbox.
//!
//! Every dynamic cost saturates instead of overflowing; a saturated cost is
//! always larger than any configured gas limit, so it surfaces as `OutOfGas`.

use super::opcodes::Opcode;
use primitive_types::U256;

/// Gas cost tiers.
pub mod costs {
    /// Zero gas.
    pub const ZERO: u64 = 0;
    /// Base cost (e.g., for `PC`).
    pub const BASE: u64 = 2;
    /// Very low cost (e.g., for `ADD`).
    pub const VERY_LOW: u64 = 3;
    /// Low cost (e.g., for `MUL`).
    pub const LOW: u64 = 5;
    /// Mid cost.
    pub const MID: u64 = 8;
    /// High cost.
    pub const HIGH: u64 = 10;
    /// Jump destination cost.
    pub const JUMPDEST: u64 = 1;

    /// Gas per word for memory copy.
    pub const COPY: u64 = 3;
    /// Linear coefficient of memory expansion.
    pub const MEMORY_WORD: u64 = 3;
    /// Divisor of the quadratic memory term.
    pub const MEMORY_QUAD_DIVISOR: u64 = 512;

    /// KECCAK256 base cost.
    pub const KECCAK256: u64 = 30;
    /// KECCAK256 cost per word.
    pub const KECCAK256_WORD: u64 = 6;
    /// EXP base cost.
    pub const EXP: u64 = 10;
    /// EXP cost per byte of exponent.
    pub const EXP_BYTE: u64 = 50;
}

/// Static cost charged before an instruction executes.
#[must_use]
pub fn base_cost(op: Opcode) -> u64 {
    use Opcode::*;

    match op {
        Stop | Return | Revert | Invalid => costs::ZERO,
        JumpDest => costs::JUMPDEST,
        CallDataSize | CodeSize | Pop | Pc | MSize | Gas => costs::BASE,
        Push(0) => costs::BASE,
        Add | Sub | Lt | Gt | SLt | SGt | Eq | IsZero | And | Or | Xor | Not | Byte | Shl
        | Shr | Sar | CallDataLoad | CallDataCopy | CodeCopy | MLoad | MStore | MStore8
        | MCopy | Push(_) | Dup(_) | Swap(_) => costs::VERY_LOW,
        Mul | Div | SDiv | Mod | SMod | SignExtend => costs::LOW,
        AddMod | MulMod | Jump => costs::MID,
        JumpI => costs::HIGH,
        Exp => costs::EXP,
        Keccak256 => costs::KECCAK256,
    }
}

/// Number of 32-byte words covering `size` bytes.
#[must_use]
pub fn words(size: usize) -> u64 {
    u64::try_from(size.div_ceil(32)).unwrap_or(u64::MAX)
}

/// Dynamic part of EXP.
#[must_use]
pub fn exp_dynamic_cost(exponent: U256) -> u64 {
    let byte_size = (256 - u64::from(exponent.leading_zeros())).div_ceil(8);
    costs::EXP_BYTE.saturating_mul(byte_size)
}

/// Dynamic part of KECCAK256.
#[must_use]
pub fn keccak256_dynamic_cost(size: usize) -> u64 {
    costs::KECCAK256_WORD.saturating_mul(words(size))
}

/// Dynamic part of CALLDATACOPY, CODECOPY and MCOPY.
#[must_use]
pub fn copy_cost(size: usize) -> u64 {
    costs::COPY.saturating_mul(words(size))
}

/// Total cost of memory sized `size_words` words.
#[must_use]
pub fn memory_cost(size_words: u64) -> u64 {
    costs::MEMORY_WORD
        .saturating_mul(size_words)
        .saturating_add(size_words.saturating_mul(size_words) / costs::MEMORY_QUAD_DIVISOR)
}

/// Cost of growing memory from `current_bytes` to cover `new_bytes`.
#[must_use]
pub fn memory_expansion_cost(current_bytes: usize, new_bytes: usize) -> u64 {
    if new_bytes <= current_bytes {
        return 0;
    }
    memory_cost(words(new_bytes)).saturating_sub(memory_cost(words(current_bytes)))
}
