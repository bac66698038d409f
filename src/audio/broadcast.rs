//! Fire-and-forget status publication.
//!
//! Subscribers only see transitions published while they are registered;
//! there is no replay, so a new subscriber queries the current status itself.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::types::{PlaybackStatus, StatusEvent};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Sender<StatusEvent>)>,
}

/// Registry of status observers, shared by the engine and its clients.
#[derive(Debug, Clone, Default)]
pub struct StatusBroadcaster {
    registry: Arc<Mutex<Registry>>,
}

impl StatusBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> StatusSubscription {
        let (tx, rx) = mpsc::channel();
        let mut registry = self
            .registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.subscribers.push((id, tx));
        debug!(id = id.0, "status subscriber registered");
        StatusSubscription { id, rx }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.subscribers.retain(|(sid, _)| *sid != id);
            debug!(id = id.0, "status subscriber removed");
        }
    }

    /// Deliver `status` to every current subscriber and return how many got
    /// it. Subscribers whose receiving end was dropped are pruned.
    pub fn publish(&self, status: PlaybackStatus) -> usize {
        let event = StatusEvent { status };
        let Ok(mut registry) = self.registry.lock() else {
            return 0;
        };
        registry
            .subscribers
            .retain(|(_, tx)| tx.send(event).is_ok());
        debug!(%status, delivered = registry.subscribers.len(), "broadcast status");
        registry.subscribers.len()
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.registry
            .lock()
            .map(|r| r.subscribers.len())
            .unwrap_or(0)
    }
}

/// Receiving end of one registration.
#[derive(Debug)]
pub struct StatusSubscription {
    id: SubscriptionId,
    rx: Receiver<StatusEvent>,
}

impl StatusSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    #[cfg(test)]
    pub fn try_recv(&self) -> Option<StatusEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<StatusEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// All events received so far, in emission order.
    pub fn drain(&self) -> Vec<StatusEvent> {
        self.rx.try_iter().collect()
    }
}
