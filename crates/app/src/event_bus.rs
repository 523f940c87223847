//! Default [`EventBus`]: a tokio broadcast channel shared by all clones.

use tokio::sync::broadcast;

use homehub_domain::event::Event;

use crate::ports::EventBus;

/// Broadcasts setup events (`component_loaded`, start, stop) in process.
///
/// Receivers only see events fired after they subscribed. A receiver that
/// falls more than `capacity` events behind gets `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct InProcessEventBus {
    tx: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }
}

impl EventBus for InProcessEventBus {
    fn fire(&self, event: Event) {
        match self.tx.send(event) {
            Ok(receivers) => tracing::trace!(receivers, "event fired"),
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(event_type = %event.event_type, "event dropped, nobody listening");
            }
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    use super::*;
    use homehub_domain::event::EventType;

    #[tokio::test]
    async fn should_carry_component_in_loaded_event() {
        let bus = InProcessEventBus::new(8);
        let mut rx = bus.subscribe();

        bus.fire(Event::component_loaded("recorder"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::ComponentLoaded);
        assert_eq!(event.component(), Some("recorder"));
    }

    #[tokio::test]
    async fn should_fan_out_to_every_subscriber_of_any_clone() {
        let bus = InProcessEventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();

        bus.fire(Event::new(EventType::HomehubStart, serde_json::json!({})));

        assert_eq!(first.recv().await.unwrap().event_type, EventType::HomehubStart);
        assert_eq!(second.recv().await.unwrap().event_type, EventType::HomehubStart);
    }

    #[test]
    fn should_drop_events_without_subscribers() {
        let bus = InProcessEventBus::new(8);
        bus.fire(Event::component_loaded("logger"));

        let mut late = bus.subscribe();
        assert_eq!(late.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[tokio::test]
    async fn should_report_lag_to_slow_subscriber() {
        let bus = InProcessEventBus::new(2);
        let mut rx = bus.subscribe();

        for domain in ["a", "b", "c"] {
            bus.fire(Event::component_loaded(domain));
        }

        assert_eq!(rx.recv().await.unwrap_err(), RecvError::Lagged(1));
        assert_eq!(rx.recv().await.unwrap().component(), Some("b"));
    }
}
