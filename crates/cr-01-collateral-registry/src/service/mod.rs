//! Collateral Registry Service - Core business logic
//!
//! # Architecture
//! - Single writer: every operation takes the ledger lock once and runs to
//!   completion, committing fully or not at all
//! - Penalty evaluation runs under the same lock; the policy VM has no
//!   handle on the ledger, so it cannot reenter a mutator
//! - Status recomputation runs after the balance change it follows has
//!   committed
//! - Events are published after the lock is released

use crate::config::RegistryConfig;
use crate::domain::{
    check_ledger_invariants, InvariantCheckResult, LedgerSnapshot, LedgerState, Proposer,
    ProposerStatus, Registrant, RegistryError, RegistryResult, StatusChange,
};
use crate::events::RegistryEvent;
use crate::metrics;
use crate::ports::{
    BlockClock, EventPublisher, FundsTransfer, PolicyAuthorization, PolicyEvaluation, RegistryApi,
};
use cr_02_policy_vm::PolicyEvaluator;
use cr_03_signature_verification::PolicyAuthorizer;
use parking_lot::Mutex;
use shared_types::{Address, Penalty, U256};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Collateral Registry Service
pub struct CollateralRegistryService<E, F, V, A>
where
    E: EventPublisher,
    F: FundsTransfer,
    V: PolicyEvaluation,
    A: PolicyAuthorization,
{
    events: Arc<E>,
    treasury: Arc<F>,
    evaluator: Arc<V>,
    authorizer: Arc<A>,
    clock: Arc<dyn BlockClock>,
    config: RegistryConfig,
    ledger: Mutex<LedgerState>,
}

/// Dependencies for CollateralRegistryService
pub struct RegistryDependencies<E, F, V, A> {
    /// Sink for committed-operation events.
    pub events: Arc<E>,
    /// Payout path for withdrawals.
    pub treasury: Arc<F>,
    /// Sandboxed policy execution.
    pub evaluator: Arc<V>,
    /// Policy signature check.
    pub authorizer: Arc<A>,
    /// Logical clock.
    pub clock: Arc<dyn BlockClock>,
    /// Parameters, fixed for the service's lifetime.
    pub config: RegistryConfig,
}

impl<E, F> RegistryDependencies<E, F, PolicyEvaluator, PolicyAuthorizer> {
    /// Dependencies using the in-process policy VM, limited by
    /// `config.policy_vm`, and the secp256k1 authorizer.
    pub fn with_policy_vm(
        events: Arc<E>,
        treasury: Arc<F>,
        clock: Arc<dyn BlockClock>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            events,
            treasury,
            evaluator: Arc::new(PolicyEvaluator::new(config.policy_vm.clone())),
            authorizer: Arc::new(PolicyAuthorizer::new()),
            clock,
            config,
        }
    }
}

/// What a committed, non-empty penalty did.
struct PenaltyReceipt {
    penalty: Penalty,
    gas_used: u64,
    registrants_affected: usize,
    changes: Vec<StatusChange>,
}

impl<E, F, V, A> CollateralRegistryService<E, F, V, A>
where
    E: EventPublisher,
    F: FundsTransfer,
    V: PolicyEvaluation,
    A: PolicyAuthorization,
{
    /// Create a service over an empty ledger.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration fails validation.
    pub fn new(deps: RegistryDependencies<E, F, V, A>) -> RegistryResult<Self> {
        Self::with_ledger(deps, LedgerState::new())
    }

    /// Create a service over a restored snapshot.
    ///
    /// # Errors
    ///
    /// `InvalidConfig`, or `InvariantViolation` if the snapshot is
    /// inconsistent.
    pub fn from_snapshot(
        deps: RegistryDependencies<E, F, V, A>,
        snapshot: LedgerSnapshot,
    ) -> RegistryResult<Self> {
        Self::with_ledger(deps, LedgerState::from_snapshot(snapshot)?)
    }

    fn with_ledger(
        deps: RegistryDependencies<E, F, V, A>,
        ledger: LedgerState,
    ) -> RegistryResult<Self> {
        deps.config.validate()?;
        Ok(Self {
            events: deps.events,
            treasury: deps.treasury,
            evaluator: deps.evaluator,
            authorizer: deps.authorizer,
            clock: deps.clock,
            config: deps.config,
            ledger: Mutex::new(ledger),
        })
    }

    /// Full-scan consistency check of the current ledger.
    pub fn check_invariants(&self) -> InvariantCheckResult {
        check_ledger_invariants(&self.ledger.lock())
    }

    // === INTERNAL ===

    fn publish(&self, events: impl IntoIterator<Item = RegistryEvent>) {
        for event in events {
            let kind = event.kind();
            if let Err(e) = self.events.publish(event) {
                warn!(event = kind, error = %e, "Failed to publish registry event");
            }
        }
    }

    fn publish_changes(&self, changes: Vec<StatusChange>) {
        for change in &changes {
            debug!(
                proposer = %change.proposer,
                from = %change.from,
                to = %change.to,
                effective_collateral = %change.effective_collateral,
                "Proposer status changed"
            );
        }
        self.publish(changes.into_iter().map(RegistryEvent::from));
    }

    fn recompute(&self, ledger: &mut LedgerState, proposers: &[Address]) -> Vec<StatusChange> {
        ledger.update_status(
            proposers,
            self.clock.now(),
            self.config.minimum_collateral,
        )
    }

    fn withdraw_locked(
        &self,
        caller: Address,
        destination: Address,
    ) -> RegistryResult<(U256, Vec<StatusChange>)> {
        let mut ledger = self.ledger.lock();
        let withdrawal =
            ledger.prepare_withdraw(caller, self.clock.now(), self.config.exit_cooldown)?;

        self.treasury
            .transfer(caller, destination, withdrawal.amount)
            .map_err(RegistryError::TransferFailed)?;

        let backed = ledger.apply_withdraw(&withdrawal)?;
        let changes = self.recompute(&mut ledger, &backed);
        Ok((withdrawal.amount, changes))
    }

    fn apply_penalty_locked(
        &self,
        proposer: Address,
        policy_module: &[u8],
        signature: &[u8],
        context: &[u8],
    ) -> RegistryResult<Option<PenaltyReceipt>> {
        let mut ledger = self.ledger.lock();

        if !ledger.proposer(&proposer).is_some_and(Proposer::is_registered) {
            return Err(RegistryError::NotRegisteredProposer(proposer));
        }

        self.authorizer.authorize(proposer, policy_module, signature)?;

        let evaluation = self.evaluator.evaluate(policy_module, proposer, context)?;
        metrics::record_policy_gas(evaluation.gas_used);

        if evaluation.penalty.is_empty() {
            debug!(gas_used = evaluation.gas_used, "Policy returned empty penalty");
            return Ok(None);
        }

        let outcome = ledger.distribute_penalty(proposer, &evaluation.penalty)?;

        let mut targets: BTreeSet<Address> = outcome.affected_proposers;
        targets.insert(proposer);
        let targets: Vec<Address> = targets.into_iter().collect();
        let changes = self.recompute(&mut ledger, &targets);

        debug!(
            wei_slashed = %outcome.wei_slashed,
            wei_frozen = %outcome.wei_frozen,
            recomputed = targets.len(),
            "Penalty distributed"
        );

        Ok(Some(PenaltyReceipt {
            penalty: evaluation.penalty,
            gas_used: evaluation.gas_used,
            registrants_affected: outcome.registrants_affected,
            changes,
        }))
    }
}

/// Log and count a rejected operation.
fn rejected(operation: &'static str, err: RegistryError) -> RegistryError {
    warn!(operation, reason = err.label(), error = %err, "Registry operation rejected");
    metrics::record_rejected(err.label());
    err
}

impl<E, F, V, A> RegistryApi for CollateralRegistryService<E, F, V, A>
where
    E: EventPublisher,
    F: FundsTransfer,
    V: PolicyEvaluation,
    A: PolicyAuthorization,
{
    #[instrument(skip_all, fields(registrant = %caller, amount = %amount))]
    fn register(&self, caller: Address, amount: U256) -> RegistryResult<()> {
        let entered_at = self
            .ledger
            .lock()
            .register(
                caller,
                amount,
                self.clock.now(),
                self.config.activation_delay,
            )
            .map_err(|e| rejected("register", e))?;

        info!(entered_at, "Registrant registered");
        metrics::record_registration();
        self.publish([RegistryEvent::RegistrantRegistered {
            registrant: caller,
            amount,
            entered_at,
        }]);
        Ok(())
    }

    #[instrument(skip_all, fields(registrant = %caller, count = proposers.len()))]
    fn delegate(&self, caller: Address, proposers: &[Address]) -> RegistryResult<()> {
        self.ledger
            .lock()
            .delegate(caller, proposers)
            .map_err(|e| rejected("delegate", e))?;

        info!("Proposers delegated");
        self.publish([RegistryEvent::ProposersDelegated {
            registrant: caller,
            proposers: proposers.to_vec(),
        }]);
        Ok(())
    }

    #[instrument(skip_all, fields(count = proposers.len()))]
    fn update_status(&self, proposers: &[Address]) {
        let changes = {
            let mut ledger = self.ledger.lock();
            self.recompute(&mut ledger, proposers)
        };
        debug!(changed = changes.len(), "Status recomputed");
        self.publish_changes(changes);
    }

    #[instrument(skip_all, fields(registrant = %caller, amount = %amount))]
    fn initiate_exit(&self, caller: Address, amount: U256) -> RegistryResult<()> {
        let now = self.clock.now();
        let changes = {
            let mut ledger = self.ledger.lock();
            let backed = ledger
                .initiate_exit(caller, amount, now)
                .map_err(|e| rejected("initiate_exit", e))?;
            self.recompute(&mut ledger, &backed)
        };

        info!(initiated_at = now, "Exit initiated");
        metrics::record_exit();
        self.publish([RegistryEvent::ExitInitiated {
            registrant: caller,
            amount,
            initiated_at: now,
        }]);
        self.publish_changes(changes);
        Ok(())
    }

    #[instrument(skip_all, fields(registrant = %caller, destination = %destination))]
    fn withdraw(&self, caller: Address, destination: Address) -> RegistryResult<U256> {
        let (amount, changes) = self
            .withdraw_locked(caller, destination)
            .map_err(|e| rejected("withdraw", e))?;

        info!(%amount, "Funds withdrawn");
        metrics::record_withdrawal();
        self.publish([RegistryEvent::FundsWithdrawn {
            registrant: caller,
            destination,
            amount,
        }]);
        self.publish_changes(changes);
        Ok(amount)
    }

    #[instrument(
        skip_all,
        fields(proposer = %proposer, module_len = policy_module.len(), context_len = context.len())
    )]
    fn apply_penalty(
        &self,
        proposer: Address,
        policy_module: &[u8],
        signature: &[u8],
        context: &[u8],
    ) -> RegistryResult<()> {
        let Some(receipt) = self
            .apply_penalty_locked(proposer, policy_module, signature, context)
            .map_err(|e| rejected("apply_penalty", e))?
        else {
            return Ok(());
        };

        info!(
            wei_slashed = %receipt.penalty.wei_slashed,
            wei_frozen = %receipt.penalty.wei_frozen,
            blocks_frozen = receipt.penalty.blocks_frozen,
            registrants_affected = receipt.registrants_affected,
            gas_used = receipt.gas_used,
            "Penalty applied"
        );
        metrics::record_penalty_applied();
        self.publish_changes(receipt.changes);
        self.publish([RegistryEvent::PenaltyApplied {
            proposer,
            penalty: receipt.penalty,
            registrants_affected: receipt.registrants_affected,
            gas_used: receipt.gas_used,
        }]);
        Ok(())
    }

    fn proposer_status(&self, proposer: Address) -> ProposerStatus {
        self.ledger
            .lock()
            .proposer(&proposer)
            .map(|p| p.status)
            .unwrap_or_default()
    }

    fn effective_collateral(&self, proposer: Address) -> U256 {
        self.ledger
            .lock()
            .proposer(&proposer)
            .map(|p| p.effective_collateral)
            .unwrap_or_default()
    }

    fn registrant(&self, registrant: Address) -> Option<Registrant> {
        self.ledger.lock().registrant(&registrant).cloned()
    }

    fn proposer(&self, proposer: Address) -> Option<Proposer> {
        self.ledger.lock().proposer(&proposer).cloned()
    }

    fn is_registered_proposer(&self, proposer: Address) -> bool {
        self.ledger
            .lock()
            .proposer(&proposer)
            .is_some_and(Proposer::is_registered)
    }

    fn total_balance(&self) -> U256 {
        self.ledger.lock().total_balance()
    }

    fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.lock().snapshot()
    }
}
