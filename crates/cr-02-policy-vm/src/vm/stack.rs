//! # Operand Stack
//!
//! LIFO stack of 256-bit words, capped at 1024 entries.

use crate::domain::limits::MAX_STACK_SIZE;
use crate::errors::VmError;
use primitive_types::U256;

/// Operand stack.
#[derive(Clone, Debug, Default)]
pub struct Stack {
    data: Vec<U256>,
}

impl Stack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(32),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the stack holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Push a word.
    ///
    /// # Errors
    ///
    /// Returns `StackOverflow` at 1024 entries.
    pub fn push(&mut self, value: U256) -> Result<(), VmError> {
        if self.data.len() >= MAX_STACK_SIZE {
            return Err(VmError::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    /// Pop the top word.
    ///
    /// # Errors
    ///
    /// Returns `StackUnderflow` if empty.
    pub fn pop(&mut self) -> Result<U256, VmError> {
        self.data.pop().ok_or(VmError::StackUnderflow)
    }

    /// Pop `N` words, top first.
    ///
    /// # Errors
    ///
    /// Returns `StackUnderflow` without popping anything if fewer than `N`
    /// entries are present.
    pub fn pop_n<const N: usize>(&mut self) -> Result<[U256; N], VmError> {
        if self.data.len() < N {
            return Err(VmError::StackUnderflow);
        }
        let mut out = [U256::zero(); N];
        for slot in &mut out {
            *slot = self.pop()?;
        }
        Ok(out)
    }

    /// Peek at `depth` (0 = top).
    ///
    /// # Errors
    ///
    /// Returns `StackUnderflow` if `depth` is out of range.
    pub fn peek_at(&self, depth: usize) -> Result<U256, VmError> {
        self.data
            .len()
            .checked_sub(depth + 1)
            .map(|index| self.data[index])
            .ok_or(VmError::StackUnderflow)
    }

    /// SWAPn: exchange the top with the entry `n` below it.
    ///
    /// # Errors
    ///
    /// Returns `StackUnderflow` if fewer than `n + 1` entries.
    pub fn swap(&mut self, n: usize) -> Result<(), VmError> {
        let len = self.data.len();
        if n == 0 || n >= len {
            return Err(VmError::StackUnderflow);
        }
        self.data.swap(len - 1, len - 1 - n);
        Ok(())
    }

    /// DUPn: push a copy of the entry at 1-based depth `n`.
    ///
    /// # Errors
    ///
    /// Returns `StackUnderflow` or `StackOverflow`.
    pub fn dup(&mut self, n: usize) -> Result<(), VmError> {
        if n == 0 {
            return Err(VmError::StackUnderflow);
        }
        let value = self.peek_at(n - 1)?;
        self.push(value)
    }
}
