//! Best-effort dispatch event notification.
//!
//! # Responsibilities
//! - Publish one event per dispatch attempt to any subscribed observer
//! - Never block, delay, or fail the dispatch outcome
//!
//! # Design Decisions
//! - Broadcast channel keeps the dispatch core decoupled from whatever
//!   transport eventually reaches observers
//! - Send errors (no subscribers, lagging subscribers) are swallowed

use serde::Serialize;
use tokio::sync::broadcast;

const EVENT_BUS_CAPACITY: usize = 64;

/// One dispatch attempt as observed from the outside.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchEvent {
    /// Resource being dispatched.
    pub resource: String,
    /// Full ranked candidate list for this dispatch.
    pub candidates: Vec<String>,
    /// Provider this attempt was forwarded to.
    pub selected: String,
}

/// Fire-and-forget publisher for dispatch events.
#[derive(Debug, Clone)]
pub struct DispatchNotifier {
    tx: broadcast::Sender<DispatchEvent>,
}

impl DispatchNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Delivery failures are swallowed.
    pub fn publish(&self, event: DispatchEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to dispatch events.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.tx.subscribe()
    }
}

impl Default for DispatchNotifier {
    fn default() -> Self {
        Self::new(EVENT_BUS_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(selected: &str) -> DispatchEvent {
        DispatchEvent {
            resource: "orders".into(),
            candidates: vec!["a".into(), "b".into()],
            selected: selected.into(),
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let notifier = DispatchNotifier::default();
        notifier.publish(event("a"));
    }

    #[tokio::test]
    async fn test_subscriber_observes_attempts() {
        let notifier = DispatchNotifier::default();
        let mut rx = notifier.subscribe();

        notifier.publish(event("a"));
        notifier.publish(event("b"));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.selected, "a");
        assert_eq!(first.candidates, vec!["a", "b"]);
        assert_eq!(rx.recv().await.unwrap().selected, "b");
    }
}
