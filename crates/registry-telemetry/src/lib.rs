//! # Registry Telemetry
//!
//! Structured logging for the collateral registry.
//!
//! Every registry crate logs through `tracing` macros; this crate installs
//! the subscriber that decides where those records go.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use registry_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Registry operations now log with the configured filter and format
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CR_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `CR_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `CR_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `CR_SERVICE_NAME` | `collateral-registry` | Service name |

#![warn(missing_docs)]

mod config;
mod subscriber;

pub use config::TelemetryConfig;
pub use subscriber::{build_filter, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// The log level directive did not parse.
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    /// A global subscriber could not be installed.
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Install logging for the process.
///
/// # Errors
///
/// See [`init_tracing`].
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_tracing(config)?;
    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Telemetry initialized"
    );
    Ok(())
}

/// Log a registry event with the subsystem field set.
///
/// # Example
///
/// ```rust,ignore
/// use registry_telemetry::log_event;
///
/// log_event!(info, "collateral-registry", "Ledger restored", registrants = 12);
/// ```
#[macro_export]
macro_rules! log_event {
    (info, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}
