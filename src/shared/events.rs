//! In-process domain events.
//!
//! Services publish after a successful write; subscribers (logging, search
//! indexing, cache warmers) receive events through a broadcast channel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CategoryEventKind {
    Created,
    Updated,
    Moved {
        from_parent_id: Option<Uuid>,
        to_parent_id: Uuid,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryEvent {
    pub channel_id: Uuid,
    pub category_id: Uuid,
    pub kind: CategoryEventKind,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum CatalogEvent {
    Category(CategoryEvent),
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CatalogEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish to current subscribers. Having none is not an error.
    pub fn publish(&self, event: CatalogEvent) {
        match self.sender.send(event) {
            Ok(receivers) => tracing::debug!("Event delivered to {} subscriber(s)", receivers),
            Err(_) => tracing::trace!("Event dropped: no subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.sender.subscribe()
    }

    pub fn category(&self, channel_id: Uuid, category_id: Uuid, kind: CategoryEventKind) {
        self.publish(CatalogEvent::Category(CategoryEvent {
            channel_id,
            category_id,
            kind,
            occurred_at: Utc::now(),
        }));
    }
}

/// Log every event until the bus is dropped
pub async fn log_events(mut receiver: broadcast::Receiver<CatalogEvent>) {
    loop {
        match receiver.recv().await {
            Ok(CatalogEvent::Category(event)) => {
                tracing::info!(
                    channel_id = %event.channel_id,
                    category_id = %event.category_id,
                    kind = ?event.kind,
                    "Category event"
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Event logger lagged, {} event(s) skipped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let bus = EventBus::new(8);
        let mut receiver = bus.subscribe();
        let (channel_id, category_id, parent_id) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        bus.category(
            channel_id,
            category_id,
            CategoryEventKind::Moved {
                from_parent_id: None,
                to_parent_id: parent_id,
            },
        );

        let CatalogEvent::Category(event) = receiver.recv().await.unwrap();
        assert_eq!(event.category_id, category_id);
        assert_eq!(
            event.kind,
            CategoryEventKind::Moved {
                from_parent_id: None,
                to_parent_id: parent_id
            }
        );
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = EventBus::new(1);
        bus.category(Uuid::new_v4(), Uuid::new_v4(), CategoryEventKind::Created);
    }
}
