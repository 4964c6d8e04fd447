//! # Ledger Flows
//!
//! Registration, exit and withdrawal through the service, with the ledger
//! invariants checked at every quiescent point.

#[cfg(test)]
mod tests {
    use crate::harness::{registrant, RegistryHarness};
    use cr_01_collateral_registry::prelude::*;
    use cr_01_collateral_registry::LedgerSnapshot;
    use std::thread;

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    #[test]
    fn test_register_twice_leaves_state_untouched() {
        let h = RegistryHarness::new();
        let who = registrant(1);
        h.service.register(who, units::ether(2)).unwrap();
        h.service.delegate(who, &[registrant(0xA0)]).unwrap();

        let before = h.service.snapshot();
        let events_before = h.events.event_count();

        let result = h.service.register(who, units::ether(5));

        assert_eq!(result, Err(RegistryError::AlreadyRegistered(who)));
        assert_eq!(h.service.snapshot(), before);
        assert_eq!(h.events.event_count(), events_before);
        assert_eq!(h.balance(who), units::ether(2));
    }

    #[test]
    fn test_registration_grows_pool() {
        let h = RegistryHarness::new();
        for n in 1..=5 {
            h.service.register(registrant(n), units::ether(u64::from(n))).unwrap();
        }

        assert_eq!(h.service.total_balance(), units::ether(15));
        assert_eq!(h.events.events_of("registrant_registered").len(), 5);
        h.assert_consistent();
    }

    #[test]
    fn test_concurrent_registrations_serialize() {
        let h = RegistryHarness::new();
        let proposer = registrant(0xF0);

        thread::scope(|scope| {
            for worker in 0..8u8 {
                let service = &h.service;
                scope.spawn(move || {
                    for i in 0..20u8 {
                        let who = Address::repeat_byte(worker * 20 + i + 1);
                        service.register(who, units::gwei(1_000)).unwrap();
                        service.delegate(who, &[proposer]).unwrap();
                    }
                });
            }
        });

        assert_eq!(h.service.total_balance(), units::gwei(160_000));
        let record = h.service.proposer(proposer).unwrap();
        assert_eq!(record.delegated_by.len(), 160);
        h.assert_consistent();
    }

    // =========================================================================
    // EXIT AND WITHDRAWAL
    // =========================================================================

    #[test]
    fn test_withdraw_waits_for_cooldown() {
        let h = RegistryHarness::new();
        let who = registrant(1);
        let destination = registrant(0xD0);
        h.service.register(who, units::ether(3)).unwrap();

        h.clock.set(5);
        h.service.initiate_exit(who, units::ether(1)).unwrap();

        h.clock.set(68);
        let early = h.service.withdraw(who, destination);
        assert!(matches!(
            early,
            Err(RegistryError::CooldownNotElapsed { available_at: 69, .. })
        ));
        assert_eq!(h.treasury.paid_to(destination), U256::zero());

        h.clock.set(69);
        let paid = h.service.withdraw(who, destination).unwrap();

        assert_eq!(paid, units::ether(1));
        assert_eq!(h.treasury.paid_to(destination), units::ether(1));
        assert_eq!(h.balance(who), units::ether(2));
        assert!(h.service.registrant(who).unwrap().pending_exit.is_none());
        h.assert_consistent();
    }

    #[test]
    fn test_exit_leaves_pool_before_withdrawal() {
        let h = RegistryHarness::new();
        let who = registrant(1);
        h.service.register(who, units::ether(4)).unwrap();
        h.service.register(registrant(2), units::ether(1)).unwrap();

        h.service.initiate_exit(who, units::ether(3)).unwrap();
        assert_eq!(h.service.total_balance(), units::ether(2));
        h.assert_consistent();

        h.clock.advance(64);
        h.service.withdraw(who, who).unwrap();
        assert_eq!(h.service.total_balance(), units::ether(2));
        h.assert_consistent();
    }

    #[test]
    fn test_failed_payout_keeps_exit_pending() {
        let h = RegistryHarness::new();
        let who = registrant(1);
        h.service.register(who, units::ether(2)).unwrap();
        h.service.initiate_exit(who, units::ether(2)).unwrap();
        h.clock.advance(64);

        h.treasury.set_failing(true);
        let before = h.service.snapshot();
        assert!(matches!(
            h.service.withdraw(who, who),
            Err(RegistryError::TransferFailed(_))
        ));
        assert_eq!(h.service.snapshot(), before);

        h.treasury.set_failing(false);
        assert_eq!(h.service.withdraw(who, who).unwrap(), units::ether(2));
        assert_eq!(h.balance(who), U256::zero());
    }

    #[test]
    fn test_full_exit_does_not_free_identity() {
        let h = RegistryHarness::new();
        let who = registrant(1);
        h.service.register(who, units::ether(1)).unwrap();
        h.service.initiate_exit(who, units::ether(1)).unwrap();
        h.clock.advance(64);
        h.service.withdraw(who, who).unwrap();

        assert_eq!(
            h.service.register(who, units::ether(1)),
            Err(RegistryError::AlreadyRegistered(who))
        );
    }

    #[test]
    fn test_rejections_are_precondition_violations() {
        let h = RegistryHarness::new();
        let who = registrant(1);

        let errors = [
            h.service.register(who, U256::zero()).unwrap_err(),
            h.service.delegate(who, &[registrant(0xA0)]).unwrap_err(),
            h.service.initiate_exit(who, units::ether(1)).unwrap_err(),
            h.service.withdraw(who, who).unwrap_err(),
        ];

        for err in &errors {
            assert!(err.is_precondition_violation(), "{err}");
        }
        assert_eq!(h.events.event_count(), 0);
        assert_eq!(h.service.snapshot(), LedgerSnapshot::default());
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    #[test]
    fn test_restored_ledger_continues() {
        let h = RegistryHarness::new();
        let proposer = registrant(0xA0);
        h.back(
            proposer,
            &[(registrant(1), units::ether(2)), (registrant(2), units::ether(3))],
        );
        h.service.initiate_exit(registrant(2), units::ether(1)).unwrap();
        let snapshot = h.service.snapshot();

        let restored = RegistryHarness::new();
        let service = CollateralRegistryService::from_snapshot(
            RegistryDependencies::with_policy_vm(
                Arc::clone(&restored.events),
                Arc::clone(&restored.treasury),
                Arc::new(restored.clock.clone()),
                RegistryConfig::default(),
            ),
            snapshot.clone(),
        )
        .unwrap();

        assert_eq!(service.snapshot(), snapshot);
        assert_eq!(service.total_balance(), units::ether(4));

        restored.clock.set(64);
        assert_eq!(service.withdraw(registrant(2), registrant(2)).unwrap(), units::ether(1));
        assert!(service.check_invariants().is_valid());
    }
}
