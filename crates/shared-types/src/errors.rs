//! # Error Types
//!
//! Parsing errors for the shared primitives.

use thiserror::Error;

/// Errors produced when parsing an identity from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// Input is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded input is not 20 bytes long.
    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}
