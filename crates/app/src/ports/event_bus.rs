//! Event bus port: publish events to interested subscribers.

use homehub_domain::event::Event;
use tokio::sync::broadcast;

/// Publishes events to all current subscribers.
///
/// Firing never fails from the caller's point of view: an event nobody
/// listens to is simply dropped.
pub trait EventBus: Send + Sync {
    /// Publish an event to all current subscribers.
    fn fire(&self, event: Event);

    /// Receive every event fired from now on.
    fn subscribe(&self) -> broadcast::Receiver<Event>;
}

impl<T: EventBus + ?Sized> EventBus for std::sync::Arc<T> {
    fn fire(&self, event: Event) {
        (**self).fire(event);
    }

    fn subscribe(&self) -> broadcast::Receiver<Event> {
        (**self).subscribe()
    }
}
