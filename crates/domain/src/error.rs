//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`FieldGateError`] at port boundaries.

use crate::id::{SensorId, ZoneId};

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum FieldGateError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The transport failed to deliver or receive a message.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations. All of them are fatal when raised at startup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The hysteresis band is empty or inverted.
    #[error("dry threshold {dry} must be below wet threshold {wet}")]
    ThresholdOrder { dry: f64, wet: f64 },

    /// A threshold is NaN or infinite.
    #[error("threshold must be a finite number")]
    NonFiniteThreshold,

    /// A reading carries a NaN or infinite value.
    #[error("reading value must be a finite number")]
    NonFiniteValue,

    /// The same sensor was routed to two different zones.
    #[error("sensor {sensor_id} is routed to both zone {first} and zone {second}")]
    ConflictingRoute {
        sensor_id: SensorId,
        first: ZoneId,
        second: ZoneId,
    },

    /// An inclusive sensor range whose start is after its end.
    #[error("sensor range {first}..={last} is empty")]
    EmptyRange { first: SensorId, last: SensorId },

    /// An inclusive sensor range covering more ids than one table may hold.
    #[error("sensor range {first}..={last} exceeds {max} sensors")]
    RangeTooLarge {
        first: SensorId,
        last: SensorId,
        max: u32,
    },
}

/// A record that should exist was not found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_threshold_order_error() {
        let err = ValidationError::ThresholdOrder {
            dry: 70.0,
            wet: 40.0,
        };
        assert_eq!(
            err.to_string(),
            "dry threshold 70 must be below wet threshold 40"
        );
    }

    #[test]
    fn should_display_conflicting_route_error() {
        let err = ValidationError::ConflictingRoute {
            sensor_id: SensorId::new(9001),
            first: ZoneId::new(1),
            second: ZoneId::new(2),
        };
        assert_eq!(
            err.to_string(),
            "sensor 9001 is routed to both zone 1 and zone 2"
        );
    }

    #[test]
    fn should_display_not_found_error() {
        let err = NotFoundError {
            entity: "Zone",
            id: "7".to_string(),
        };
        assert_eq!(err.to_string(), "Zone 7 not found");
    }

    #[test]
    fn should_convert_validation_error_into_top_level_error() {
        let err: FieldGateError = ValidationError::NonFiniteThreshold.into();
        assert!(matches!(
            err,
            FieldGateError::Validation(ValidationError::NonFiniteThreshold)
        ));
    }

    #[test]
    fn should_keep_transport_source() {
        let io = std::io::Error::other("broker gone");
        let err = FieldGateError::Transport(Box::new(io));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "broker gone");
    }
}
