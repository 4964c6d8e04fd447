//! # Policy Opcodes
//!
//! Decoding of EVM bytes into the instruction subset a policy module may use.
//!
//! Every byte falls into exactly one class:
//! - **Allowed**: pure computation over the stack, memory, code and calldata
//! - **Forbidden**: defined EVM opcodes that would reach outside the sandbox
//!   (storage, logs, calls, account and block queries)
//! - **Undefined**: bytes with no EVM meaning

/// Instructions available to policy modules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    // 0x00 - Stop and Arithmetic
    Stop,
    Add,
    Mul,
    Sub,
    Div,
    SDiv,
    Mod,
    SMod,
    AddMod,
    MulMod,
    Exp,
    SignExtend,

    // 0x10 - Comparison & Bitwise
    Lt,
    Gt,
    SLt,
    SGt,
    Eq,
    IsZero,
    And,
    Or,
    Xor,
    Not,
    Byte,
    Shl,
    Shr,
    Sar,

    // 0x20 - Keccak256
    Keccak256,

    // 0x35-0x39 - Input access
    CallDataLoad,
    CallDataSize,
    CallDataCopy,
    CodeSize,
    CodeCopy,

    // 0x50 - Stack, Memory, Flow
    Pop,
    MLoad,
    MStore,
    MStore8,
    Jump,
    JumpI,
    Pc,
    MSize,
    Gas,
    JumpDest,
    MCopy,

    /// PUSH0..PUSH32, carrying the number of immediate bytes.
    Push(u8),
    /// DUP1..DUP16, carrying the 1-based depth.
    Dup(u8),
    /// SWAP1..SWAP16, carrying the 1-based depth.
    Swap(u8),

    // 0xF3/0xFD/0xFE - Halting
    Return,
    Revert,
    Invalid,
}

/// Classification of a single bytecode byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoded {
    /// Executable instruction.
    Allowed(Opcode),
    /// Known EVM opcode outside the sandbox.
    Forbidden(&'static str),
    /// No such opcode.
    Undefined,
}

impl Opcode {
    /// Decode a byte.
    #[must_use]
    pub fn decode(byte: u8) -> Decoded {
        use Decoded::{Allowed, Forbidden, Undefined};

        match byte {
            0x00 => Allowed(Self::Stop),
            0x01 => Allowed(Self::Add),
            0x02 => Allowed(Self::Mul),
            0x03 => Allowed(Self::Sub),
            0x04 => Allowed(Self::Div),
            0x05 => Allowed(Self::SDiv),
            0x06 => Allowed(Self::Mod),
            0x07 => Allowed(Self::SMod),
            0x08 => Allowed(Self::AddMod),
            0x09 => Allowed(Self::MulMod),
            0x0A => Allowed(Self::Exp),
            0x0B => Allowed(Self::SignExtend),

            0x10 => Allowed(Self::Lt),
            0x11 => Allowed(Self::Gt),
            0x12 => Allowed(Self::SLt),
            0x13 => Allowed(Self::SGt),
            0x14 => Allowed(Self::Eq),
            0x15 => Allowed(Self::IsZero),
            0x16 => Allowed(Self::And),
            0x17 => Allowed(Self::Or),
            0x18 => Allowed(Self::Xor),
            0x19 => Allowed(Self::Not),
            0x1A => Allowed(Self::Byte),
            0x1B => Allowed(Self::Shl),
            0x1C => Allowed(Self::Shr),
            0x1D => Allowed(Self::Sar),

            0x20 => Allowed(Self::Keccak256),

            0x30 => Forbidden("ADDRESS"),
            0x31 => Forbidden("BALANCE"),
            0x32 => Forbidden("ORIGIN"),
            0x33 => Forbidden("CALLER"),
            0x34 => Forbidden("CALLVALUE"),
            0x35 => Allowed(Self::CallDataLoad),
            0x36 => Allowed(Self::CallDataSize),
            0x37 => Allowed(Self::CallDataCopy),
            0x38 => Allowed(Self::CodeSize),
            0x39 => Allowed(Self::CodeCopy),
            0x3A => Forbidden("GASPRICE"),
            0x3B => Forbidden("EXTCODESIZE"),
            0x3C => Forbidden("EXTCODECOPY"),
            0x3D => Forbidden("RETURNDATASIZE"),
            0x3E => Forbidden("RETURNDATACOPY"),
            0x3F => Forbidden("EXTCODEHASH"),

            0x40 => Forbidden("BLOCKHASH"),
            0x41 => Forbidden("COINBASE"),
            0x42 => Forbidden("TIMESTAMP"),
            0x43 => Forbidden("NUMBER"),
            0x44 => Forbidden("PREVRANDAO"),
            0x45 => Forbidden("GASLIMIT"),
            0x46 => Forbidden("CHAINID"),
            0x47 => Forbidden("SELFBALANCE"),
            0x48 => Forbidden("BASEFEE"),
            0x49 => Forbidden("BLOBHASH"),
            0x4A => Forbidden("BLOBBASEFEE"),

            0x50 => Allowed(Self::Pop),
            0x51 => Allowed(Self::MLoad),
            0x52 => Allowed(Self::MStore),
            0x53 => Allowed(Self::MStore8),
            0x54 => Forbidden("SLOAD"),
            0x55 => Forbidden("SSTORE"),
            0x56 => Allowed(Self::Jump),
            0x57 => Allowed(Self::JumpI),
            0x58 => Allowed(Self::Pc),
            0x59 => Allowed(Self::MSize),
            0x5A => Allowed(Self::Gas),
            0x5B => Allowed(Self::JumpDest),
            0x5C => Forbidden("TLOAD"),
            0x5D => Forbidden("TSTORE"),
            0x5E => Allowed(Self::MCopy),
            0x5F..=0x7F => Allowed(Self::Push(byte - 0x5F)),
            0x80..=0x8F => Allowed(Self::Dup(byte - 0x7F)),
            0x90..=0x9F => Allowed(Self::Swap(byte - 0x8F)),

            0xA0..=0xA4 => Forbidden("LOG"),

            0xF0 => Forbidden("CREATE"),
            0xF1 => Forbidden("CALL"),
            0xF2 => Forbidden("CALLCODE"),
            0xF3 => Allowed(Self::Return),
            0xF4 => Forbidden("DELEGATECALL"),
            0xF5 => Forbidden("CREATE2"),
            0xFA => Forbidden("STATICCALL"),
            0xFD => Allowed(Self::Revert),
            0xFE => Allowed(Self::Invalid),
            0xFF => Forbidden("SELFDESTRUCT"),

            _ => Undefined,
        }
    }

    /// Encode back to the opcode byte.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Stop => 0x00,
            Self::Add => 0x01,
            Self::Mul => 0x02,
            Self::Sub => 0x03,
            Self::Div => 0x04,
            Self::SDiv => 0x05,
            Self::Mod => 0x06,
            Self::SMod => 0x07,
            Self::AddMod => 0x08,
            Self::MulMod => 0x09,
            Self::Exp => 0x0A,
            Self::SignExtend => 0x0B,
            Self::Lt => 0x10,
            Self::Gt => 0x11,
            Self::SLt => 0x12,
            Self::SGt => 0x13,
            Self::Eq => 0x14,
            Self::IsZero => 0x15,
            Self::And => 0x16,
            Self::Or => 0x17,
            Self::Xor => 0x18,
            Self::Not => 0x19,
            Self::Byte => 0x1A,
            Self::Shl => 0x1B,
            Self::Shr => 0x1C,
            Self::Sar => 0x1D,
            Self::Keccak256 => 0x20,
            Self::CallDataLoad => 0x35,
            Self::CallDataSize => 0x36,
            Self::CallDataCopy => 0x37,
            Self::CodeSize => 0x38,
            Self::CodeCopy => 0x39,
            Self::Pop => 0x50,
            Self::MLoad => 0x51,
            Self::MStore => 0x52,
            Self::MStore8 => 0x53,
            Self::Jump => 0x56,
            Self::JumpI => 0x57,
            Self::Pc => 0x58,
            Self::MSize => 0x59,
            Self::Gas => 0x5A,
            Self::JumpDest => 0x5B,
            Self::MCopy => 0x5E,
            Self::Push(n) => 0x5F + n,
            Self::Dup(n) => 0x7F + n,
            Self::Swap(n) => 0x8F + n,
            Self::Return => 0xF3,
            Self::Revert => 0xFD,
            Self::Invalid => 0xFE,
        }
    }

    /// Number of immediate bytes following this opcode.
    #[must_use]
    pub fn immediate_size(self) -> usize {
        match self {
            Self::Push(n) => usize::from(n),
            _ => 0,
        }
    }
}
