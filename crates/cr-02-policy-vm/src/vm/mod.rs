//! # Policy VM
//!
//! Restricted EVM interpreter: opcode decoding, stack, memory, gas, and the
//! execution loop.

pub mod gas;
pub mod interpreter;
pub mod memory;
pub mod opcodes;
pub mod stack;

pub use interpreter::{Halt, Interpreter, Outcome};
pub use memory::Memory;
pub use opcodes::{Decoded, Opcode};
pub use stack::Stack;
