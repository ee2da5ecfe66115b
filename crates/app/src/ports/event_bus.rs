//! Event bus port: publish/subscribe for telemetry events.

use std::future::Future;

use fieldgate_domain::error::FieldGateError;
use fieldgate_domain::event::Event;

/// Publishes telemetry events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), FieldGateError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), FieldGateError>> + Send {
        (**self).publish(event)
    }
}
