//! Decision engine: turns moisture readings into gate commands.
//!
//! For each moisture reading the engine resolves the sensor's zone through
//! the routing table, then, under the zone store lock, applies the cooldown
//! and hysteresis rule ([`ZoneState::decide`]). The lock is released before
//! the resulting command is handed to the [`CommandPublisher`], so a slow
//! transport never delays decisions for other zones.
//!
//! State changes are optimistic: once a command is decided the zone is
//! considered moved, even if publishing it fails afterwards.
//!
//! [`ZoneState::decide`]: fieldgate_domain::zone::ZoneState::decide

use fieldgate_domain::error::FieldGateError;
use fieldgate_domain::gate::GateCommand;
use fieldgate_domain::policy::ControlPolicy;
use fieldgate_domain::reading::SensorReading;
use fieldgate_domain::routing::RoutingTable;
use fieldgate_domain::zone::Decision;

use crate::ports::{Clock, CommandPublisher, SystemClock};
use crate::zone_store::ZoneStore;

/// Stateful per-zone gate controller.
pub struct DecisionEngine<P, C = SystemClock> {
    routing: RoutingTable,
    zones: ZoneStore,
    policy: ControlPolicy,
    publisher: P,
    clock: C,
}

impl<P, C> DecisionEngine<P, C>
where
    P: CommandPublisher,
    C: Clock,
{
    /// Create a new engine.
    ///
    /// # Errors
    ///
    /// Returns [`FieldGateError::NotFound`] when `routing` references a zone
    /// that has no record in `zones`. The engine refuses to run with an
    /// inconsistent model.
    pub fn new(
        routing: RoutingTable,
        zones: ZoneStore,
        policy: ControlPolicy,
        publisher: P,
        clock: C,
    ) -> Result<Self, FieldGateError> {
        zones.ensure_covers(&routing)?;
        Ok(Self {
            routing,
            zones,
            policy,
            publisher,
            clock,
        })
    }

    #[must_use]
    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    #[must_use]
    pub fn zones(&self) -> &ZoneStore {
        &self.zones
    }

    #[must_use]
    pub fn policy(&self) -> &ControlPolicy {
        &self.policy
    }

    /// Decide what a reading means for its zone and update the zone state.
    ///
    /// Does not publish anything. Readings of a kind other than moisture
    /// are reported as [`Decision::Unchanged`].
    ///
    /// # Errors
    ///
    /// Returns [`FieldGateError::NotFound`] if the routed zone has no state
    /// record. That cannot happen for an engine built through [`Self::new`].
    pub fn decide(&self, reading: &SensorReading) -> Result<Decision, FieldGateError> {
        let sensor_id = reading.sensor_id();
        if !reading.kind().drives_irrigation() {
            tracing::trace!(%sensor_id, kind = %reading.kind(), "reading does not drive irrigation");
            return Ok(Decision::Unchanged);
        }

        let Some(zone_id) = self.routing.zone_for(sensor_id) else {
            tracing::debug!(%sensor_id, "sensor not routed to any zone");
            return Ok(Decision::Unrouted);
        };

        let value = reading.value();
        let decision = self
            .zones
            .with_zone(zone_id, |zone| {
                zone.decide(value, self.clock.now(), &self.policy)
            })
            .inspect_err(|err| {
                tracing::error!(%err, %sensor_id, %zone_id, "routed zone has no state record");
            })?;

        match &decision {
            Decision::Issued(command) => tracing::info!(
                %zone_id,
                %sensor_id,
                action = %command.action(),
                reason = command.reason(),
                "gate command decided"
            ),
            Decision::CoolingDown { remaining } => tracing::debug!(
                %zone_id,
                %sensor_id,
                value,
                remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
                "zone cooling down, reading absorbed"
            ),
            Decision::Unchanged => {
                tracing::debug!(%zone_id, %sensor_id, value, "no gate change needed");
            }
            Decision::Unrouted => {}
        }

        Ok(decision)
    }

    /// Hand a decided command to the transport.
    ///
    /// # Errors
    ///
    /// Propagates the publisher's error. The zone state is not rolled back.
    pub async fn send(&self, command: &GateCommand) -> Result<(), FieldGateError> {
        self.publisher
            .publish_command(command)
            .await
            .inspect_err(|err| {
                tracing::warn!(
                    %err,
                    zone_id = %command.zone_id(),
                    action = %command.action(),
                    "failed to publish gate command"
                );
            })
    }

    /// [`decide`](Self::decide), then [`send`](Self::send) the command if one
    /// was issued.
    ///
    /// # Errors
    ///
    /// Returns the errors of both steps.
    pub async fn evaluate(&self, reading: &SensorReading) -> Result<Decision, FieldGateError> {
        let decision = self.decide(reading)?;
        if let Some(command) = decision.command() {
            self.send(command).await?;
        }
        Ok(decision)
    }
}
