//! JSON wire format for sensor readings and gate commands.

use serde::{Deserialize, Serialize};

use fieldgate_domain::error::FieldGateError;
use fieldgate_domain::gate::{GateAction, GateCommand};
use fieldgate_domain::id::{SensorId, ZoneId};
use fieldgate_domain::reading::{GeoPoint, SensorReading};
use fieldgate_domain::time::from_unix_secs;

use crate::error::MqttError;
use crate::topic::{SensorTopic, TopicLayout};

/// Telemetry payload as published by the field sensors.
///
/// `type` repeats the topic's kind segment and is informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<SensorId>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Unix seconds.
    pub timestamp: i64,
}

/// Gate command payload consumed by the actuators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPayload {
    pub gate_id: ZoneId,
    #[serde(alias = "command")]
    pub action: GateAction,
    pub reason: String,
    /// Unix seconds.
    pub timestamp: i64,
}

impl From<&GateCommand> for CommandPayload {
    fn from(command: &GateCommand) -> Self {
        Self {
            gate_id: command.zone_id(),
            action: command.action(),
            reason: command.reason().to_string(),
            timestamp: command.issued_at().timestamp(),
        }
    }
}

/// Decode a raw MQTT message into a reading.
///
/// # Errors
///
/// See [`decode_reading`]; additionally fails with [`MqttError::Topic`] for
/// topics outside the sensor tree.
pub fn decode_message(
    topics: &TopicLayout,
    topic: &str,
    payload: &[u8],
) -> Result<SensorReading, MqttError> {
    let sensor_topic = topics.parse_sensor_topic(topic)?;
    decode_reading(sensor_topic, payload)
}

/// Decode a telemetry payload received on a sensor topic.
///
/// The sensor id and kind come from the topic. A payload `sensor_id` that
/// disagrees with the topic makes the message malformed.
///
/// # Errors
///
/// Returns [`MqttError::PayloadParse`] for invalid JSON and
/// [`MqttError::InvalidPayload`] for a mismatched id or an out-of-range
/// timestamp.
pub fn decode_reading(topic: SensorTopic, payload: &[u8]) -> Result<SensorReading, MqttError> {
    let payload: ReadingPayload =
        serde_json::from_slice(payload).map_err(MqttError::PayloadParse)?;

    match payload.sensor_id {
        Some(claimed) if claimed != topic.sensor_id => {
            return Err(MqttError::InvalidPayload(format!(
                "payload sensor_id {claimed} does not match topic sensor {}",
                topic.sensor_id
            )));
        }
        _ => {}
    }

    let observed_at = from_unix_secs(payload.timestamp).ok_or_else(|| {
        MqttError::InvalidPayload(format!("timestamp {} out of range", payload.timestamp))
    })?;

    let mut reading = SensorReading::new(topic.sensor_id, topic.kind, payload.value, observed_at)
        .map_err(|err| MqttError::Domain(FieldGateError::Validation(err)))?;
    if let Some(unit) = payload.unit {
        reading = reading.with_unit(unit);
    }
    if let (Some(lat), Some(lon)) = (payload.lat, payload.lon) {
        reading = reading.with_location(GeoPoint { lat, lon });
    }
    Ok(reading)
}

/// Serialize a gate command for the actuator topic.
///
/// # Errors
///
/// Returns [`MqttError::PayloadEncode`] if serialization fails.
pub fn encode_command(command: &GateCommand) -> Result<Vec<u8>, MqttError> {
    serde_json::to_vec(&CommandPayload::from(command)).map_err(MqttError::PayloadEncode)
}

/// Parse a gate command payload. Accepts `command` as an alias of `action`.
///
/// # Errors
///
/// Returns [`MqttError::PayloadParse`] for invalid JSON and
/// [`MqttError::InvalidPayload`] for an out-of-range timestamp.
pub fn decode_command(payload: &[u8]) -> Result<GateCommand, MqttError> {
    let payload: CommandPayload =
        serde_json::from_slice(payload).map_err(MqttError::PayloadParse)?;
    let issued_at = from_unix_secs(payload.timestamp).ok_or_else(|| {
        MqttError::InvalidPayload(format!("timestamp {} out of range", payload.timestamp))
    })?;
    Ok(GateCommand::new(
        payload.gate_id,
        payload.action,
        payload.reason,
        issued_at,
    ))
}
