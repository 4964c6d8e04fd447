//! # Delegation Graph
//!
//! Registrant → proposer edges, mirrored in both records.
//!
//! Edges are append-only and duplicates are kept: delegating twice to the same
//! proposer lists the registrant twice in `delegated_by`, and both the status
//! engine and the distributor walk the list as recorded.

use super::errors::{RegistryError, RegistryResult};
use super::ledger::LedgerState;
use shared_types::Address;

impl LedgerState {
    /// Append `registrant → proposer` edges for every entry in `proposers`.
    ///
    /// Proposer records are created on first delegation with status
    /// INCLUDER. Status is not recomputed here.
    ///
    /// # Errors
    ///
    /// `EmptyProposerList` or `NotRegistered`.
    pub fn delegate(&mut self, registrant: Address, proposers: &[Address]) -> RegistryResult<()> {
        if proposers.is_empty() {
            return Err(RegistryError::EmptyProposerList);
        }
        let record = self
            .registrants
            .get_mut(&registrant)
            .ok_or(RegistryError::NotRegistered(registrant))?;

        record.delegated_proposers.extend_from_slice(proposers);
        for proposer in proposers {
            self.proposers
                .entry(*proposer)
                .or_default()
                .delegated_by
                .push(registrant);
        }
        Ok(())
    }

    /// Registrants backing `proposer`, in delegation order. Empty if unknown.
    #[must_use]
    pub fn backers_of(&self, proposer: &Address) -> &[Address] {
        self.proposers
            .get(proposer)
            .map(|p| p.delegated_by.as_slice())
            .unwrap_or_default()
    }

    /// Proposers `registrant` backs, in delegation order. Empty if unknown.
    #[must_use]
    pub fn backed_by(&self, registrant: &Address) -> &[Address] {
        self.registrants
            .get(registrant)
            .map(|r| r.delegated_proposers.as_slice())
            .unwrap_or_default()
    }
}
