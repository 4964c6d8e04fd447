//! Registry configuration.
//!
//! Fixed when the service is created and immutable afterwards.

use cr_02_policy_vm::VmConfig;
use serde::{Deserialize, Serialize};
use shared_types::{units, BlockNumber, U256};
use std::env;

/// Default minimum collateral: 1 ether.
pub const DEFAULT_MINIMUM_COLLATERAL_ETHER: u64 = 1;
/// Default activation delay in blocks.
pub const DEFAULT_ACTIVATION_DELAY: BlockNumber = 32;
/// Default exit cooldown in blocks.
pub const DEFAULT_EXIT_COOLDOWN: BlockNumber = 64;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Minimum collateral must be greater than zero")]
    ZeroMinimumCollateral,

    #[error("Policy VM limit {0} must be greater than zero")]
    ZeroVmLimit(&'static str),
}

/// Collateral registry parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Effective collateral a proposer needs to be eligible, in wei.
    pub minimum_collateral: U256,
    /// Blocks between registration and stake counting toward collateral.
    pub activation_delay: BlockNumber,
    /// Blocks between exit request and permitted withdrawal.
    pub exit_cooldown: BlockNumber,
    /// Sandbox limits for policy modules.
    pub policy_vm: VmConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            minimum_collateral: units::ether(DEFAULT_MINIMUM_COLLATERAL_ETHER),
            activation_delay: DEFAULT_ACTIVATION_DELAY,
            exit_cooldown: DEFAULT_EXIT_COOLDOWN,
            policy_vm: VmConfig::default(),
        }
    }
}

impl RegistryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CR_MINIMUM_COLLATERAL_WEI`: decimal wei (default: 1 ether)
    /// - `CR_ACTIVATION_DELAY_BLOCKS`: blocks (default: 32)
    /// - `CR_EXIT_COOLDOWN_BLOCKS`: blocks (default: 64)
    /// - `CR_POLICY_GAS_LIMIT`: gas per policy evaluation (default: 10,000,000)
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for a variable that is set but unparsable, or
    /// any error from [`RegistryConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`RegistryConfig::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`RegistryConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("CR_MINIMUM_COLLATERAL_WEI") {
            config.minimum_collateral = U256::from_dec_str(value.trim()).map_err(|_| {
                ConfigError::InvalidValue {
                    var: "CR_MINIMUM_COLLATERAL_WEI",
                    value,
                }
            })?;
        }
        if let Some(value) = lookup("CR_ACTIVATION_DELAY_BLOCKS") {
            config.activation_delay = parse_u64("CR_ACTIVATION_DELAY_BLOCKS", value)?;
        }
        if let Some(value) = lookup("CR_EXIT_COOLDOWN_BLOCKS") {
            config.exit_cooldown = parse_u64("CR_EXIT_COOLDOWN_BLOCKS", value)?;
        }
        if let Some(value) = lookup("CR_POLICY_GAS_LIMIT") {
            config.policy_vm.gas_limit = parse_u64("CR_POLICY_GAS_LIMIT", value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check parameter sanity.
    ///
    /// # Errors
    ///
    /// Returns `ZeroMinimumCollateral` or `ZeroVmLimit`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minimum_collateral.is_zero() {
            return Err(ConfigError::ZeroMinimumCollateral);
        }
        if let Some(limit) = self.policy_vm.first_zero_limit() {
            return Err(ConfigError::ZeroVmLimit(limit));
        }
        Ok(())
    }
}

fn parse_u64(var: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { var, value })
}
