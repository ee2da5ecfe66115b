//! Event: an immutable record handed to telemetry collaborators.
//!
//! Every decoded reading and every issued gate command is announced as an
//! event. Whoever stores or serves them (a cloud uplink, a history store)
//! subscribes; the control loop does not depend on anyone listening.

use serde::{Deserialize, Serialize};

use crate::gate::GateCommand;
use crate::id::EventId;
use crate::reading::SensorReading;
use crate::time::{Timestamp, now};

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// A reading was decoded from the transport, whatever its kind.
    ReadingReceived { reading: SensorReading },
    /// A zone changed position and this command was sent.
    GateChanged { command: GateCommand },
}

/// A timestamped, uniquely identified [`EventPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    /// Stamp a payload with a fresh id and the current time.
    #[must_use]
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: EventId::new(),
            timestamp: now(),
            payload,
        }
    }

    #[must_use]
    pub fn reading_received(reading: SensorReading) -> Self {
        Self::new(EventPayload::ReadingReceived { reading })
    }

    #[must_use]
    pub fn gate_changed(command: GateCommand) -> Self {
        Self::new(EventPayload::GateChanged { command })
    }
}
