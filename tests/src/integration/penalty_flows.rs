//! # Penalty Flows
//!
//! Signed policy modules evaluated in the VM and distributed across backers.
//!
//! ## Flow
//!
//! 1. Cached status gate
//! 2. Signature over the module recovers to the proposer
//! 3. Module runs in the sandbox with `(proposer, context)`
//! 4. Empty penalty: nothing happens
//! 5. Proportional slash then freeze, status cascade, `PenaltyApplied`

#[cfg(test)]
mod tests {
    use crate::harness::{registrant, PolicyProposer, RegistryHarness};
    use cr_01_collateral_registry::prelude::*;
    use cr_02_policy_vm::fixtures;

    fn gwei(n: u64) -> U256 {
        units::gwei(n)
    }

    /// Proposer backed by `(registrant(i + 1), amount)` pairs and activated.
    fn backed(h: &RegistryHarness, amounts: &[U256]) -> PolicyProposer {
        let proposer = PolicyProposer::generate();
        let backers: Vec<(Address, U256)> = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| (registrant(i as u8 + 1), *amount))
            .collect();
        h.back(proposer.address, &backers);
        h.activate(&[proposer.address]);
        proposer
    }

    fn apply_constant(
        h: &RegistryHarness,
        proposer: &PolicyProposer,
        penalty: &Penalty,
    ) -> RegistryResult<()> {
        let module = fixtures::constant_penalty(penalty);
        let signature = proposer.sign(&module);
        h.service
            .apply_penalty(proposer.address, &module, &signature, &[])
    }

    // =========================================================================
    // DISTRIBUTION
    // =========================================================================

    #[test]
    fn test_slash_consumes_before_freeze() {
        let h = RegistryHarness::with_config(RegistryConfig {
            minimum_collateral: U256::one(),
            ..RegistryConfig::default()
        });
        let proposer = backed(&h, &[U256::from(10)]);
        let who = registrant(1);

        apply_constant(&h, &proposer, &Penalty::new(U256::from(6), U256::from(6), 100)).unwrap();

        assert_eq!(h.balance(who), U256::from(4));
        assert_eq!(h.frozen(who), U256::from(4));
        assert_eq!(h.service.total_balance(), U256::zero());
        assert_eq!(
            h.service.proposer_status(proposer.address),
            ProposerStatus::Includer
        );
        h.assert_consistent();
    }

    #[test]
    fn test_even_split_between_two_backers() {
        let h = RegistryHarness::new();
        let proposer = backed(&h, &[units::ether(150), units::ether(150)]);
        let penalty = Penalty::new(units::ether(2), units::ether(1), 50);

        apply_constant(&h, &proposer, &penalty).unwrap();

        for who in [registrant(1), registrant(2)] {
            assert_eq!(h.balance(who), units::ether(149));
            assert_eq!(h.frozen(who), gwei(500_000_000));
        }
        assert_eq!(h.service.total_balance(), gwei(297_000_000_000));

        let applied = h.events.events_of("penalty_applied");
        assert_eq!(applied.len(), 1);
        match &applied[0] {
            RegistryEvent::PenaltyApplied {
                proposer: p,
                penalty: evaluated,
                registrants_affected,
                gas_used,
            } => {
                assert_eq!(*p, proposer.address);
                assert_eq!(*evaluated, penalty);
                assert_eq!(*registrants_affected, 2);
                assert!(*gas_used > 0);
            }
            other => panic!("unexpected event {other:?}"),
        }
        h.assert_consistent();
    }

    #[test]
    fn test_one_signature_many_contexts() {
        let h = RegistryHarness::new();
        let proposer = backed(&h, &[units::ether(150), units::ether(150)]);
        let module = fixtures::context_penalty();
        let signature = proposer.sign(&module);

        let slash = fixtures::encode_context(&Penalty::new(units::ether(2), U256::zero(), 0));
        h.service
            .apply_penalty(proposer.address, &module, &signature, &slash)
            .unwrap();
        assert_eq!(h.service.total_balance(), units::ether(298));

        let freeze = fixtures::encode_context(&Penalty::new(U256::zero(), units::ether(2), 10));
        h.service
            .apply_penalty(proposer.address, &module, &signature, &freeze)
            .unwrap();

        for who in [registrant(1), registrant(2)] {
            assert_eq!(h.balance(who), units::ether(149));
            assert_eq!(h.frozen(who), units::ether(1));
        }
        assert_eq!(h.service.total_balance(), units::ether(296));
        assert_eq!(h.events.events_of("penalty_applied").len(), 2);
        h.assert_consistent();
    }

    #[test]
    fn test_slash_cascades_to_other_backed_proposers() {
        let h = RegistryHarness::new();
        let target = PolicyProposer::generate();
        let bystander = registrant(0xB0);
        let (shared, loyal) = (registrant(1), registrant(2));

        h.service.register(shared, units::ether(1)).unwrap();
        h.service.delegate(shared, &[target.address, bystander]).unwrap();
        h.service.register(loyal, units::ether(1)).unwrap();
        h.service.delegate(loyal, &[target.address]).unwrap();
        h.activate(&[target.address, bystander]);
        assert_eq!(h.service.proposer_status(bystander), ProposerStatus::Preconfer);

        apply_constant(&h, &target, &Penalty::new(gwei(500_000_000), U256::zero(), 0)).unwrap();

        assert_eq!(h.balance(shared), gwei(750_000_000));
        assert_eq!(h.balance(loyal), gwei(750_000_000));
        assert_eq!(h.service.proposer_status(bystander), ProposerStatus::Includer);
        assert_eq!(h.service.effective_collateral(bystander), gwei(750_000_000));
        assert_eq!(
            h.service.proposer_status(target.address),
            ProposerStatus::Preconfer
        );
        assert_eq!(
            h.service.effective_collateral(target.address),
            gwei(1_500_000_000)
        );

        let kinds: Vec<&str> = h
            .events
            .events()
            .iter()
            .rev()
            .take(2)
            .map(RegistryEvent::kind)
            .collect();
        assert_eq!(kinds, vec!["penalty_applied", "proposer_status_changed"]);
        h.assert_consistent();
    }

    #[test]
    fn test_duplicate_edge_is_penalized_per_edge() {
        let h = RegistryHarness::new();
        let proposer = PolicyProposer::generate();
        let who = registrant(1);
        h.service.register(who, units::ether(1)).unwrap();
        h.service
            .delegate(who, &[proposer.address, proposer.address])
            .unwrap();
        h.activate(&[proposer.address]);
        assert_eq!(h.service.effective_collateral(proposer.address), units::ether(2));

        apply_constant(&h, &proposer, &Penalty::new(gwei(500_000_000), U256::zero(), 0)).unwrap();

        assert_eq!(h.balance(who), gwei(250_000_000));
        assert_eq!(
            h.service.effective_collateral(proposer.address),
            gwei(500_000_000)
        );
        assert_eq!(
            h.service.proposer_status(proposer.address),
            ProposerStatus::Includer
        );
        h.assert_consistent();
    }

    #[test]
    fn test_oversized_penalty_is_capped_by_available() {
        let h = RegistryHarness::new();
        let proposer = backed(&h, &[units::ether(2)]);

        apply_constant(&h, &proposer, &Penalty::new(units::ether(5), units::ether(1), 0)).unwrap();

        assert_eq!(h.balance(registrant(1)), U256::zero());
        assert_eq!(h.frozen(registrant(1)), U256::zero());
        assert_eq!(h.service.total_balance(), U256::zero());
        assert_eq!(
            h.service.proposer_status(proposer.address),
            ProposerStatus::Includer
        );

        // Now INCLUDER: the cached gate refuses further penalties.
        assert_eq!(
            apply_constant(&h, &proposer, &Penalty::new(U256::one(), U256::zero(), 0)),
            Err(RegistryError::NotRegisteredProposer(proposer.address))
        );
        h.assert_consistent();
    }

    #[test]
    fn test_exit_shrunk_by_slash_is_reissued_and_withdrawn() {
        let h = RegistryHarness::new();
        let proposer = backed(&h, &[units::ether(2), units::ether(2)]);
        let who = registrant(1);

        h.service.initiate_exit(who, gwei(1_500_000_000)).unwrap();
        // Pool is 0.5 + 2 ether; each share is 2 * 2 / 2.5.
        apply_constant(&h, &proposer, &Penalty::new(units::ether(2), U256::zero(), 0)).unwrap();
        assert_eq!(h.balance(who), gwei(400_000_000));

        h.clock.advance(64);
        assert!(matches!(
            h.service.withdraw(who, who),
            Err(RegistryError::ExitExceedsBalance { .. })
        ));

        h.service.initiate_exit(who, gwei(400_000_000)).unwrap();
        h.clock.advance(63);
        assert!(matches!(
            h.service.withdraw(who, who),
            Err(RegistryError::CooldownNotElapsed { .. })
        ));

        h.clock.advance(1);
        assert_eq!(h.service.withdraw(who, who).unwrap(), gwei(400_000_000));
        assert_eq!(h.balance(who), U256::zero());
        assert_eq!(h.treasury.paid_to(who), gwei(400_000_000));
        h.assert_consistent();
    }

    #[test]
    fn test_policy_sees_proposer_identity() {
        let h = RegistryHarness::new();
        let first = PolicyProposer::generate();
        let second = PolicyProposer::generate();
        h.back(first.address, &[(registrant(1), units::ether(2))]);
        h.back(second.address, &[(registrant(2), units::ether(2))]);
        h.activate(&[first.address, second.address]);

        let penalty = Penalty::new(units::ether(1), U256::zero(), 0);
        let module = fixtures::proposer_gated(first.address, &penalty);

        h.service
            .apply_penalty(second.address, &module, &second.sign(&module), &[])
            .unwrap();
        assert_eq!(h.service.total_balance(), units::ether(4));

        h.service
            .apply_penalty(first.address, &module, &first.sign(&module), &[])
            .unwrap();
        // Pool-wide share: 1 ether * 2 / 4.
        assert_eq!(h.balance(registrant(1)), gwei(1_500_000_000));
        assert_eq!(h.balance(registrant(2)), units::ether(2));
    }

    // =========================================================================
    // REJECTION
    // =========================================================================

    #[test]
    fn test_failed_penalties_change_nothing() {
        let h = RegistryHarness::new();
        let proposer = backed(&h, &[units::ether(150), units::ether(150)]);
        let forger = PolicyProposer::generate();
        let penalty = Penalty::new(units::ether(1), U256::zero(), 0);
        let module = fixtures::constant_penalty(&penalty);

        let before = h.service.snapshot();
        let events = h.events.event_count();

        let unauthorized = [
            h.service
                .apply_penalty(proposer.address, &module, &forger.sign(&module), &[]),
            h.service.apply_penalty(
                proposer.address,
                &module,
                &proposer.sign(&fixtures::no_penalty()),
                &[],
            ),
            h.service
                .apply_penalty(proposer.address, &module, &[0u8; 12], &[]),
        ];
        for result in unauthorized {
            assert!(result.unwrap_err().is_authorization_failure());
        }

        for hostile in [
            fixtures::reverting(),
            fixtures::stopping(),
            fixtures::short_output(),
            fixtures::storage_writer(),
            fixtures::external_caller(),
            fixtures::infinite_loop(),
        ] {
            let err = h
                .service
                .apply_penalty(proposer.address, &hostile, &proposer.sign(&hostile), &[])
                .unwrap_err();
            assert!(err.is_execution_failure(), "{err}");
        }

        let stranger = PolicyProposer::generate();
        assert_eq!(
            h.service
                .apply_penalty(stranger.address, &module, &stranger.sign(&module), &[]),
            Err(RegistryError::NotRegisteredProposer(stranger.address))
        );

        assert_eq!(h.service.snapshot(), before);
        assert_eq!(h.events.event_count(), events);
    }

    #[test]
    fn test_empty_penalty_is_a_no_op() {
        let h = RegistryHarness::new();
        let proposer = backed(&h, &[units::ether(3)]);
        let before = h.service.snapshot();
        let events = h.events.event_count();

        apply_constant(&h, &proposer, &Penalty::none()).unwrap();

        assert_eq!(h.service.snapshot(), before);
        assert_eq!(h.events.event_count(), events);
    }

    #[test]
    fn test_inactive_backing_blocks_penalty() {
        let h = RegistryHarness::new();
        let proposer = PolicyProposer::generate();
        h.back(proposer.address, &[(registrant(1), units::ether(5))]);
        h.service.update_status(&[proposer.address]);

        assert_eq!(
            apply_constant(&h, &proposer, &Penalty::new(units::ether(1), U256::zero(), 0)),
            Err(RegistryError::NotRegisteredProposer(proposer.address))
        );
        assert_eq!(h.balance(registrant(1)), units::ether(5));
    }

    // =========================================================================
    // MIXED
    // =========================================================================

    #[test]
    fn test_invariants_hold_through_mixed_operations() {
        let h = RegistryHarness::new();
        let p1 = PolicyProposer::generate();
        let p2 = PolicyProposer::generate();

        for n in 1..=4 {
            h.service.register(registrant(n), units::ether(4)).unwrap();
        }
        h.service.delegate(registrant(1), &[p1.address]).unwrap();
        h.service.delegate(registrant(2), &[p1.address, p2.address]).unwrap();
        h.service.delegate(registrant(3), &[p2.address]).unwrap();
        h.service.delegate(registrant(4), &[p2.address, p2.address]).unwrap();
        h.activate(&[p1.address, p2.address]);
        h.assert_consistent();

        h.service.initiate_exit(registrant(3), units::ether(1)).unwrap();
        h.assert_consistent();

        apply_constant(&h, &p1, &Penalty::new(units::ether(1), units::ether(1), 20)).unwrap();
        h.assert_consistent();

        h.clock.advance(64);
        h.service.withdraw(registrant(3), registrant(0xD0)).unwrap();
        h.assert_consistent();

        let module = fixtures::context_penalty();
        let context = fixtures::encode_context(&Penalty::new(
            gwei(700_000_000),
            gwei(300_000_000),
            5,
        ));
        h.service
            .apply_penalty(p2.address, &module, &p2.sign(&module), &context)
            .unwrap();
        h.assert_consistent();

        h.service.initiate_exit(registrant(4), units::ether(1)).unwrap();
        h.service.update_status(&[p1.address, p2.address]);
        h.assert_consistent();

        assert_eq!(h.treasury.paid_to(registrant(0xD0)), units::ether(1));
    }

    #[test]
    fn test_slash_only_keeps_total_equal_to_balances() {
        let h = RegistryHarness::new();
        let proposer = backed(&h, &[units::ether(3), units::ether(5), units::ether(7)]);

        apply_constant(&h, &proposer, &Penalty::new(units::ether(3), U256::zero(), 0)).unwrap();

        let snapshot = h.service.snapshot();
        let balances = snapshot
            .registrants
            .values()
            .fold(U256::zero(), |acc, r| acc + r.balance);
        assert_eq!(snapshot.total_balance, balances);
        assert_eq!(balances, units::ether(12));
    }
}
