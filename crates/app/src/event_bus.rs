//! Telemetry fan-out for readings and gate transitions.
//!
//! The control loop announces every event here and never waits on a
//! listener. A listener that falls more than `capacity` events behind loses
//! the oldest ones and sees [`broadcast::error::RecvError::Lagged`].

use std::future::Future;

use tokio::sync::broadcast;

use fieldgate_domain::error::FieldGateError;
use fieldgate_domain::event::{Event, EventPayload};

use crate::ports::EventPublisher;

/// Broadcast bus shared by the dispatcher and its telemetry listeners.
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    /// Create a bus buffering up to `capacity` events per listener.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Listen for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Number of live listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

fn event_kind(payload: &EventPayload) -> &'static str {
    match payload {
        EventPayload::ReadingReceived { .. } => "reading_received",
        EventPayload::GateChanged { .. } => "gate_changed",
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), FieldGateError>> + Send {
        let event_id = event.id;
        let kind = event_kind(&event.payload);
        match self.sender.send(event) {
            Ok(listeners) => tracing::trace!(%event_id, kind, listeners, "event published"),
            Err(_) => tracing::trace!(%event_id, kind, "no listeners, event dropped"),
        }
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldgate_domain::event::EventPayload;
    use fieldgate_domain::gate::{GateAction, GateCommand};
    use fieldgate_domain::id::{SensorId, ZoneId};
    use fieldgate_domain::reading::{SensorKind, SensorReading};
    use fieldgate_domain::time::now;

    fn reading_event() -> Event {
        let reading =
            SensorReading::new(SensorId::new(9001), SensorKind::Moisture, 33.0, now()).unwrap();
        Event::reading_received(reading)
    }

    #[tokio::test]
    async fn should_deliver_event_to_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();

        let event = reading_event();
        let event_id = event.id;

        bus.publish(event).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, event_id);
    }

    #[tokio::test]
    async fn should_deliver_event_to_multiple_subscribers() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let cmd = GateCommand::new(ZoneId::new(1), GateAction::Open, "dry", now());
        let event = Event::gate_changed(cmd);
        let event_id = event.id;

        bus.publish(event).await.unwrap();

        let r1 = rx1.recv().await.unwrap();
        let r2 = rx2.recv().await.unwrap();
        assert_eq!(r1.id, event_id);
        assert_eq!(r2.id, event_id);
        assert!(matches!(r1.payload, EventPayload::GateChanged { .. }));
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        assert_eq!(bus.subscriber_count(), 0);
        let result = bus.publish(reading_event()).await;
        assert!(result.is_ok());
    }

    #[test]
    fn should_count_live_subscribers() {
        let bus = InProcessEventBus::new(16);
        let first = bus.subscribe();
        let _second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
        drop(first);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn should_accept_zero_capacity() {
        let bus = InProcessEventBus::new(0);
        let mut rx = bus.subscribe();

        let event = reading_event();
        let event_id = event.id;
        bus.publish(event).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().id, event_id);
    }

    #[tokio::test]
    async fn should_drop_oldest_events_for_lagging_subscriber() {
        let bus = InProcessEventBus::new(2);
        let mut rx = bus.subscribe();

        bus.publish(reading_event()).await.unwrap();
        let second = reading_event();
        let second_id = second.id;
        bus.publish(second).await.unwrap();
        bus.publish(reading_event()).await.unwrap();

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(rx.recv().await.unwrap().id, second_id);
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        bus.publish(reading_event()).await.unwrap();

        let mut rx = bus.subscribe();

        let later = reading_event();
        let later_id = later.id;
        bus.publish(later).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, later_id);
    }
}
