//! # Status Flows
//!
//! Proposer eligibility across activation, exit and withdrawal.

#[cfg(test)]
mod tests {
    use crate::harness::{registrant, RegistryHarness};
    use cr_01_collateral_registry::prelude::*;

    fn ether_and_half(ether: u64) -> U256 {
        units::ether(ether) + units::gwei(500_000_000)
    }

    #[test]
    fn test_activation_delay_boundary() {
        let h = RegistryHarness::new();
        let proposer = registrant(0xA0);
        h.clock.set(10);
        h.back(proposer, &[(registrant(1), units::ether(2))]);

        h.clock.set(41);
        h.service.update_status(&[proposer]);
        assert_eq!(h.service.effective_collateral(proposer), U256::zero());
        assert_eq!(h.service.proposer_status(proposer), ProposerStatus::Includer);

        h.clock.set(42);
        h.service.update_status(&[proposer]);
        assert_eq!(h.service.effective_collateral(proposer), units::ether(2));
        assert_eq!(h.service.proposer_status(proposer), ProposerStatus::Preconfer);
    }

    #[test]
    fn test_preconfer_exiting_includer_lifecycle() {
        let h = RegistryHarness::new();
        let proposer = registrant(0xA0);
        let who = registrant(1);
        h.back(proposer, &[(who, units::ether(2))]);
        h.activate(&[proposer]);

        assert_eq!(h.service.proposer_status(proposer), ProposerStatus::Preconfer);
        assert_eq!(h.service.effective_collateral(proposer), units::ether(2));

        h.service.initiate_exit(who, ether_and_half(1)).unwrap();
        h.service.update_status(&[proposer]);
        assert_eq!(h.service.proposer_status(proposer), ProposerStatus::Exiting);
        assert_eq!(h.service.effective_collateral(proposer), units::ether(2));

        h.clock.advance(64);
        h.service.withdraw(who, who).unwrap();
        h.service.update_status(&[proposer]);
        assert_eq!(h.service.proposer_status(proposer), ProposerStatus::Includer);
        assert_eq!(
            h.service.effective_collateral(proposer),
            units::gwei(500_000_000)
        );

        let transitions: Vec<(ProposerStatus, ProposerStatus)> = h
            .events
            .events_of("proposer_status_changed")
            .into_iter()
            .filter_map(|event| match event {
                RegistryEvent::ProposerStatusChanged { from, to, .. } => Some((from, to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            transitions,
            vec![
                (ProposerStatus::Includer, ProposerStatus::Preconfer),
                (ProposerStatus::Preconfer, ProposerStatus::Exiting),
                (ProposerStatus::Exiting, ProposerStatus::Includer),
            ]
        );
        h.assert_consistent();
    }

    #[test]
    fn test_update_status_is_idempotent() {
        let h = RegistryHarness::new();
        let (p1, p2) = (registrant(0xA0), registrant(0xA1));
        h.back(p1, &[(registrant(1), units::ether(1)), (registrant(2), units::ether(2))]);
        h.back(p2, &[(registrant(3), units::gwei(10))]);
        h.activate(&[p1, p2]);
        h.service.initiate_exit(registrant(2), units::ether(1)).unwrap();

        h.service.update_status(&[p1, p2]);
        let first = (h.service.proposer(p1), h.service.proposer(p2));
        let events = h.events.event_count();

        h.service.update_status(&[p1, p2]);
        assert_eq!((h.service.proposer(p1), h.service.proposer(p2)), first);
        assert_eq!(h.events.event_count(), events);
    }

    #[test]
    fn test_shared_backer_counts_toward_each_proposer() {
        let h = RegistryHarness::new();
        let (p1, p2) = (registrant(0xA0), registrant(0xA1));
        let who = registrant(1);
        h.service.register(who, units::ether(1)).unwrap();
        h.service.delegate(who, &[p1, p2]).unwrap();
        h.activate(&[p1, p2]);

        assert_eq!(h.service.effective_collateral(p1), units::ether(1));
        assert_eq!(h.service.effective_collateral(p2), units::ether(1));
        assert!(h.service.is_registered_proposer(p1));
        assert!(h.service.is_registered_proposer(p2));
    }

    #[test]
    fn test_duplicate_edge_counts_twice() {
        let h = RegistryHarness::new();
        let proposer = registrant(0xA0);
        let who = registrant(1);
        h.service.register(who, units::gwei(600_000_000)).unwrap();
        h.service.delegate(who, &[proposer, proposer]).unwrap();
        h.activate(&[proposer]);

        assert_eq!(
            h.service.effective_collateral(proposer),
            units::gwei(1_200_000_000)
        );
        assert_eq!(h.service.proposer_status(proposer), ProposerStatus::Preconfer);
    }

    #[test]
    fn test_unknown_proposer_is_includer() {
        let h = RegistryHarness::new();
        let stranger = registrant(0xEE);

        h.service.update_status(&[stranger]);

        assert_eq!(h.service.proposer_status(stranger), ProposerStatus::Includer);
        assert_eq!(h.service.effective_collateral(stranger), U256::zero());
        assert!(h.service.proposer(stranger).is_none());
        assert!(!h.service.is_registered_proposer(stranger));
    }
}
