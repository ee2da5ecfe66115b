//! Sensor readings: immutable telemetry samples received from the field.
//!
//! A reading is created when a message is decoded at the transport boundary
//! and discarded once it has been dispatched. Only [`SensorKind::Moisture`]
//! readings carry actuation semantics; the other kinds are passed through
//! to telemetry collaborators unchanged.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::SensorId;
use crate::time::Timestamp;

/// What physical quantity a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Volumetric soil moisture, in percent.
    Moisture,
    /// Water flow through a gate, in litres per minute.
    Flow,
    /// Soil temperature, in degrees Celsius.
    Temperature,
    /// Anything this controller does not know about.
    Other,
}

impl SensorKind {
    /// Whether readings of this kind feed the gate decision engine.
    #[must_use]
    pub fn drives_irrigation(self) -> bool {
        matches!(self, Self::Moisture)
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Moisture => f.write_str("moisture"),
            Self::Flow => f.write_str("flow"),
            Self::Temperature => f.write_str("temperature"),
            Self::Other => f.write_str("other"),
        }
    }
}

/// Where a sensor is planted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A single sample reported by a field sensor.
///
/// `observed_at` is supplied by the producer and is never used for ordering
/// or cooldown decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    sensor_id: SensorId,
    kind: SensorKind,
    value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<GeoPoint>,
    observed_at: Timestamp,
}

impl SensorReading {
    /// Create a reading.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFiniteValue`] when `value` is NaN or
    /// infinite.
    pub fn new(
        sensor_id: SensorId,
        kind: SensorKind,
        value: f64,
        observed_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue);
        }
        Ok(Self {
            sensor_id,
            kind,
            value,
            unit: None,
            location: None,
            observed_at,
        })
    }

    /// Attach the unit reported by the producer (e.g. `"%"`, `"L/min"`).
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Attach the sensor's position.
    #[must_use]
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn sensor_id(&self) -> SensorId {
        self.sensor_id
    }

    #[must_use]
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    #[must_use]
    pub fn observed_at(&self) -> Timestamp {
        self.observed_at
    }
}
