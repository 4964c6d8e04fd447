//! Block clock adapter

use crate::ports::BlockClock;
use shared_types::BlockNumber;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Externally driven block height. Clones share the same height.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    height: Arc<AtomicU64>,
}

impl ManualClock {
    /// Clock starting at `height`.
    #[must_use]
    pub fn new(height: BlockNumber) -> Self {
        Self {
            height: Arc::new(AtomicU64::new(height)),
        }
    }

    /// Jump to `height`.
    pub fn set(&self, height: BlockNumber) {
        self.height.store(height, Ordering::SeqCst);
    }

    /// Move forward `blocks` and return the new height.
    pub fn advance(&self, blocks: BlockNumber) -> BlockNumber {
        self.height.fetch_add(blocks, Ordering::SeqCst) + blocks
    }
}

impl BlockClock for ManualClock {
    fn now(&self) -> BlockNumber {
        self.height.load(Ordering::SeqCst)
    }
}
