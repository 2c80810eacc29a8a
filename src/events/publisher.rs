use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::clock::{SharedClock, SystemClock};

use super::DomainEvent;

/// High-throughput event publisher for coordination lifecycle events.
///
/// Services publish only after a successful conditional save, which is what
/// gives the at-most-one guarantee per logical transition: a retried
/// optimistic-lock failure never reaches the channel.
#[derive(Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
    clock: SharedClock,
}

/// Event that has been published.
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub event: DomainEvent,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity,
    /// stamping events from the system clock.
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    /// Create a publisher stamping events from an injected clock, so
    /// `published_at` is deterministic under a manual clock.
    pub fn with_clock(capacity: usize, clock: SharedClock) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, clock }
    }

    /// Publish a domain event. Infallible: a broadcast send only errors when
    /// there are no subscribers, and the core publishes regardless of
    /// whether anyone is listening.
    pub fn publish(&self, event: DomainEvent) {
        let published = PublishedEvent {
            event,
            published_at: self.clock.now(),
        };
        let _ = self.sender.send(published);
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPublisher")
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}
