//! # Collateral Registry Test Suite
//!
//! Cross-crate test crate.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── harness.rs        # Wired service, clock, keys, consistency checks
//! │   └── integration/      # End-to-end flows over the public API
//! │       ├── ledger_flows.rs
//! │       ├── status_flows.rs
//! │       └── penalty_flows.rs
//! └── benches/
//!     └── registry_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p cr-tests
//!
//! # By area
//! cargo test -p cr-tests integration::penalty_flows
//!
//! # With logs
//! CR_TEST_LOGS=1 CR_LOG_LEVEL=debug cargo test -p cr-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p cr-tests
//! ```

#![allow(clippy::missing_panics_doc)]

pub mod harness;
pub mod integration;
