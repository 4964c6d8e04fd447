//! # Domain Layer
//!
//! Execution limits and evaluation results for policy modules.

pub mod entities;

pub use entities::{limits, Evaluation, VmConfig};
