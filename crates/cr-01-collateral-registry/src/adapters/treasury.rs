//! Funds transfer adapter

use crate::ports::FundsTransfer;
use parking_lot::Mutex;
use shared_types::{Address, U256};
use std::sync::atomic::{AtomicBool, Ordering};

/// A payout recorded by [`RecordingTreasury`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payout {
    /// Registrant whose exit was paid.
    pub registrant: Address,
    /// Receiving address.
    pub destination: Address,
    /// Wei paid.
    pub amount: U256,
}

/// Records payouts instead of moving real funds. Can be switched to refuse
/// transfers.
#[derive(Debug, Default)]
pub struct RecordingTreasury {
    payouts: Mutex<Vec<Payout>>,
    failing: AtomicBool,
}

impl RecordingTreasury {
    /// Treasury that accepts every transfer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent transfers fail (`true`) or succeed (`false`).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Payouts so far, in order.
    pub fn payouts(&self) -> Vec<Payout> {
        self.payouts.lock().clone()
    }

    /// Total wei paid to `destination`.
    pub fn paid_to(&self, destination: Address) -> U256 {
        self.payouts
            .lock()
            .iter()
            .filter(|p| p.destination == destination)
            .fold(U256::zero(), |acc, p| acc.saturating_add(p.amount))
    }
}

impl FundsTransfer for RecordingTreasury {
    fn transfer(
        &self,
        registrant: Address,
        destination: Address,
        amount: U256,
    ) -> Result<(), String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(format!("transfer of {amount} to {destination} refused"));
        }
        self.payouts.lock().push(Payout {
            registrant,
            destination,
            amount,
        });
        Ok(())
    }
}
