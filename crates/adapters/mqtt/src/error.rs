//! MQTT adapter error types.

use std::time::Duration;

use fieldgate_domain::error::FieldGateError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client refused a request.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// Failed to parse an incoming MQTT payload as JSON.
    #[error("failed to parse MQTT payload")]
    PayloadParse(#[source] serde_json::Error),

    /// Failed to serialize an outgoing payload.
    #[error("failed to encode MQTT payload")]
    PayloadEncode(#[source] serde_json::Error),

    /// A topic does not match the configured layout.
    #[error("invalid topic: {0}")]
    Topic(String),

    /// A payload parsed but its content is unusable.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The client did not accept a publish in time.
    #[error("publish timed out after {0:?}")]
    Timeout(Duration),

    /// A domain-level error (validation, not-found, etc.).
    #[error("domain error")]
    Domain(#[source] FieldGateError),
}

impl MqttError {
    /// Convert into a [`FieldGateError::Transport`] for propagation across
    /// port boundaries.
    pub fn into_domain(self) -> FieldGateError {
        match self {
            Self::Domain(err) => err,
            other => FieldGateError::Transport(Box::new(other)),
        }
    }
}

impl From<MqttError> for FieldGateError {
    fn from(err: MqttError) -> Self {
        err.into_domain()
    }
}
