//! Change events pushed to subscribers after every write.
//!
//! Replaces fixed-interval refetching: admin lists subscribe once and refetch
//! only when something in their collection changed.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Buffered events per subscriber before it is told it lagged.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub collection: String,
    pub id: String,
    pub action: ChangeAction,
    pub revision_id: i64,
}

/// Fan-out of change events.
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!("Change event delivered to {} subscribers", delivered);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str) -> ChangeEvent {
        ChangeEvent {
            collection: "caravans".to_string(),
            id: id.to_string(),
            action: ChangeAction::Created,
            revision_id: 1,
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let hub = EventHub::default();
        hub.publish(event("a"));
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let hub = EventHub::default();
        let mut rx = hub.subscribe();

        hub.publish(event("a"));
        hub.publish(event("b"));

        assert_eq!(rx.recv().await.unwrap().id, "a");
        assert_eq!(rx.recv().await.unwrap().id, "b");
    }

    #[tokio::test]
    async fn test_lagging_subscriber_is_told() {
        let hub = EventHub::new(2);
        let mut rx = hub.subscribe();

        for id in ["a", "b", "c", "d"] {
            hub.publish(event(id));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(2))
        ));
        assert_eq!(rx.recv().await.unwrap().id, "c");
    }

    #[test]
    fn test_event_wire_format() {
        let value = serde_json::to_value(event("x")).unwrap();
        assert_eq!(value["action"], "created");
        assert_eq!(value["revisionId"], 1);
    }
}
