//! # Registry Metrics
//!
//! Prometheus metrics for the collateral registry.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! cr-01-collateral-registry = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `registry_registrations_total` - Counter of accepted registrations
//! - `registry_exits_initiated_total` - Counter of exit requests
//! - `registry_withdrawals_total` - Counter of completed withdrawals
//! - `registry_penalties_applied_total` - Counter of distributed penalties
//! - `registry_operations_rejected_total` - Counter of rejected operations (by reason)
//! - `registry_policy_gas_used` - Histogram of policy module gas

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total accepted registrations
    pub static ref REGISTRATIONS: IntCounter = register_int_counter!(
        "registry_registrations_total",
        "Total number of accepted registrations"
    )
    .expect("Failed to create REGISTRATIONS metric");

    /// Total exit requests
    pub static ref EXITS_INITIATED: IntCounter = register_int_counter!(
        "registry_exits_initiated_total",
        "Total number of exit requests"
    )
    .expect("Failed to create EXITS_INITIATED metric");

    /// Total completed withdrawals
    pub static ref WITHDRAWALS: IntCounter = register_int_counter!(
        "registry_withdrawals_total",
        "Total number of completed withdrawals"
    )
    .expect("Failed to create WITHDRAWALS metric");

    /// Total non-empty penalties distributed
    pub static ref PENALTIES_APPLIED: IntCounter = register_int_counter!(
        "registry_penalties_applied_total",
        "Total number of penalties distributed to registrants"
    )
    .expect("Failed to create PENALTIES_APPLIED metric");

    /// Rejected operations, labeled by reason
    pub static ref OPERATIONS_REJECTED: CounterVec = register_counter_vec!(
        "registry_operations_rejected_total",
        "Total number of rejected registry operations",
        &["reason"]
    )
    .expect("Failed to create OPERATIONS_REJECTED metric");

    /// Gas consumed by policy module evaluations
    pub static ref POLICY_GAS_USED: Histogram = register_histogram!(
        "registry_policy_gas_used",
        "Gas consumed per policy module evaluation",
        vec![1e3, 1e4, 5e4, 1e5, 5e5, 1e6, 5e6, 1e7]
    )
    .expect("Failed to create POLICY_GAS_USED metric");
}

/// Record an accepted registration
#[cfg(feature = "metrics")]
pub fn record_registration() {
    REGISTRATIONS.inc();
}

/// Record an exit request
#[cfg(feature = "metrics")]
pub fn record_exit() {
    EXITS_INITIATED.inc();
}

/// Record a completed withdrawal
#[cfg(feature = "metrics")]
pub fn record_withdrawal() {
    WITHDRAWALS.inc();
}

/// Record a distributed penalty
#[cfg(feature = "metrics")]
pub fn record_penalty_applied() {
    PENALTIES_APPLIED.inc();
}

/// Record a rejected operation with reason
#[cfg(feature = "metrics")]
pub fn record_rejected(reason: &str) {
    OPERATIONS_REJECTED.with_label_values(&[reason]).inc();
}

/// Record policy gas
#[cfg(feature = "metrics")]
#[allow(clippy::cast_precision_loss)]
pub fn record_policy_gas(gas_used: u64) {
    POLICY_GAS_USED.observe(gas_used as f64);
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_registration() {}

#[cfg(not(feature = "metrics"))]
pub fn record_exit() {}

#[cfg(not(feature = "metrics"))]
pub fn record_withdrawal() {}

#[cfg(not(feature = "metrics"))]
pub fn record_penalty_applied() {}

#[cfg(not(feature = "metrics"))]
pub fn record_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_policy_gas(_gas_used: u64) {}
