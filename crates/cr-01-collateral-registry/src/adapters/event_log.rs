//! Event log adapter
//!
//! Implements the EventPublisher port by recording events in memory.

use crate::events::RegistryEvent;
use crate::ports::EventPublisher;
use parking_lot::RwLock;

/// In-memory event log adapter for testing
pub struct InMemoryEventLog {
    events: RwLock<Vec<RegistryEvent>>,
}

impl InMemoryEventLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    /// Every event published so far, in order.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events.read().clone()
    }

    /// Number of events published so far.
    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    /// Events whose [`RegistryEvent::kind`] is `kind`.
    pub fn events_of(&self, kind: &str) -> Vec<RegistryEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| event.kind() == kind)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventLog {
    fn publish(&self, event: RegistryEvent) -> Result<(), String> {
        self.events.write().push(event);
        Ok(())
    }
}
