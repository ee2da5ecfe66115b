//! Reading dispatcher: the single entry point for decoded telemetry.
//!
//! Every reading is announced on the event bus for telemetry collaborators.
//! Only moisture readings continue into the [`DecisionEngine`]; a command
//! it issues is announced as a gate transition and then handed to the
//! transport. Announcing happens before sending, so collaborators see the
//! transition the engine applied even if the transport then fails.

use fieldgate_domain::error::FieldGateError;
use fieldgate_domain::event::Event;
use fieldgate_domain::reading::SensorReading;
use fieldgate_domain::zone::Decision;

use crate::decision_engine::DecisionEngine;
use crate::ports::{Clock, CommandPublisher, EventPublisher, SystemClock};

/// Routes each decoded reading to the right consumers.
pub struct ReadingDispatcher<P, E, C = SystemClock> {
    engine: DecisionEngine<P, C>,
    events: E,
}

impl<P, E, C> ReadingDispatcher<P, E, C>
where
    P: CommandPublisher,
    E: EventPublisher,
    C: Clock,
{
    pub fn new(engine: DecisionEngine<P, C>, events: E) -> Self {
        Self { engine, events }
    }

    #[must_use]
    pub fn engine(&self) -> &DecisionEngine<P, C> {
        &self.engine
    }

    /// Process one reading.
    ///
    /// Returns `None` for readings that do not drive irrigation, otherwise
    /// the engine's decision.
    ///
    /// # Errors
    ///
    /// Returns [`FieldGateError::Transport`] when an issued command could not
    /// be published, and [`FieldGateError::NotFound`] on a routing/state
    /// inconsistency. Event bus failures are logged and swallowed.
    pub async fn dispatch(
        &self,
        reading: SensorReading,
    ) -> Result<Option<Decision>, FieldGateError> {
        let drives_irrigation = reading.kind().drives_irrigation();
        let decision = if drives_irrigation {
            Some(self.engine.decide(&reading)?)
        } else {
            None
        };

        self.announce(Event::reading_received(reading)).await;

        if let Some(command) = decision.as_ref().and_then(Decision::command) {
            self.announce(Event::gate_changed(command.clone())).await;
            self.engine.send(command).await?;
        }

        Ok(decision)
    }

    async fn announce(&self, event: Event) {
        let event_id = event.id;
        if let Err(err) = self.events.publish(event).await {
            tracing::debug!(%err, %event_id, "failed to publish telemetry event");
        }
    }
}
