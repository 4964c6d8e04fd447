//! Shared wiring for end-to-end flows.
//!
//! Builds a `CollateralRegistryService` over the in-memory adapters, the real
//! policy VM and the real signature verifier.

use cr_01_collateral_registry::prelude::*;
use cr_01_collateral_registry::LedgerSnapshot;
use cr_03_signature_verification::test_helpers::{generate_keypair, proposer_address, sign_policy};
use cr_03_signature_verification::SIGNATURE_LENGTH;
use k256::ecdsa::SigningKey;
use registry_telemetry::{init_telemetry, TelemetryConfig};
use std::sync::Once;

/// Service type every flow runs against.
pub type Registry =
    CollateralRegistryService<InMemoryEventLog, RecordingTreasury, PolicyEvaluator, PolicyAuthorizer>;

static LOGGING: Once = Once::new();

/// Install the subscriber once per test binary. Console output only with
/// `CR_TEST_LOGS` set.
pub fn init_logging() {
    LOGGING.call_once(|| {
        let mut config = TelemetryConfig::from_env();
        config.console_output = std::env::var_os("CR_TEST_LOGS").is_some();
        // Another subscriber may already be installed by the test runner.
        let _ = init_telemetry(&config);
    });
}

/// Deterministic registrant identity.
#[must_use]
pub fn registrant(n: u8) -> Address {
    Address::repeat_byte(n)
}

/// Service plus handles on its adapters.
pub struct RegistryHarness {
    /// The service under test.
    pub service: Registry,
    /// Clock shared with the service.
    pub clock: ManualClock,
    /// Events the service published.
    pub events: Arc<InMemoryEventLog>,
    /// Payouts the service made.
    pub treasury: Arc<RecordingTreasury>,
}

impl RegistryHarness {
    /// Harness with default parameters: 1 ether minimum, 32 block activation
    /// delay, 64 block exit cooldown.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Harness with `config`.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        init_logging();
        let clock = ManualClock::new(0);
        let events = Arc::new(InMemoryEventLog::new());
        let treasury = Arc::new(RecordingTreasury::new());
        let service = CollateralRegistryService::new(RegistryDependencies::with_policy_vm(
            Arc::clone(&events),
            Arc::clone(&treasury),
            Arc::new(clock.clone()),
            config,
        ))
        .expect("valid config");
        Self {
            service,
            clock,
            events,
            treasury,
        }
    }

    /// Register each `(who, amount)` and delegate it to `proposer`.
    pub fn back(&self, proposer: Address, backers: &[(Address, U256)]) {
        for (who, amount) in backers {
            self.service.register(*who, *amount).expect("register");
            self.service.delegate(*who, &[proposer]).expect("delegate");
        }
    }

    /// Move past the activation delay and recompute `proposers`.
    pub fn activate(&self, proposers: &[Address]) {
        self.clock.advance(self.service.config().activation_delay);
        self.service.update_status(proposers);
    }

    /// Balance of a registered identity.
    #[must_use]
    pub fn balance(&self, who: Address) -> U256 {
        self.service.registrant(who).expect("registered").balance
    }

    /// Frozen balance of a registered identity.
    #[must_use]
    pub fn frozen(&self, who: Address) -> U256 {
        self.service.registrant(who).expect("registered").frozen_balance
    }

    /// Assert every ledger invariant at a quiescent point.
    pub fn assert_consistent(&self) {
        assert!(self.service.check_invariants().is_valid());

        let snapshot: LedgerSnapshot = self.service.snapshot();
        let mut slashable = U256::zero();
        for (who, record) in &snapshot.registrants {
            assert!(
                record.frozen_balance <= record.balance,
                "frozen above balance for {who}"
            );
            slashable += record.slashable();
        }
        assert_eq!(snapshot.total_balance, slashable);
        assert_eq!(self.service.total_balance(), slashable);
    }
}

impl Default for RegistryHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Proposer with a signing key for policy authorization.
pub struct PolicyProposer {
    key: SigningKey,
    /// Identity derived from the key.
    pub address: Address,
}

impl PolicyProposer {
    /// Fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        let (key, _) = generate_keypair();
        let address = proposer_address(&key);
        Self { key, address }
    }

    /// Authorize `module` for penalty evaluation.
    #[must_use]
    pub fn sign(&self, module: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        sign_policy(module, &self.key)
    }
}
