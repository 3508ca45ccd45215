// Application-wide authentication event broadcast
// Decouples emitters (e.g. an HTTP layer that saw an expired credential)
// from the session store: neither side holds a reference to the other.

use tokio::sync::broadcast;
use tracing::debug;

/// Named events carried on the bus. Payload-free: the emitter only signals
/// that something happened, the subscriber decides what to do about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// End the current session regardless of user action (e.g. the backend
    /// rejected the credentials as expired or invalid).
    ForceLogout,
}

/// Cloneable handle over a broadcast channel. Every clone publishes to the
/// same channel; `subscribe` hands out independent receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AuthEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn emit(&self, event: AuthEvent) {
        // send only fails when there are no live subscribers, which is fine
        // for a broadcast
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!("emitted {:?} to {} subscriber(s)", event, receivers);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_reaches_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.emit(AuthEvent::ForceLogout);

        assert_eq!(rx.recv().await.unwrap(), AuthEvent::ForceLogout);
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_harmless() {
        let bus = EventBus::new(4);
        bus.emit(AuthEvent::ForceLogout);
    }

    #[tokio::test]
    async fn test_clones_share_the_channel() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.clone().emit(AuthEvent::ForceLogout);

        assert_eq!(rx.recv().await.unwrap(), AuthEvent::ForceLogout);
    }
}
