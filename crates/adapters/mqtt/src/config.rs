//! MQTT transport configuration.

use std::time::Duration;

use rumqttc::MqttOptions;
use serde::Deserialize;

use crate::error::MqttError;
use crate::topic::{FLOW_SEGMENT, GATE_CHANNEL, MOISTURE_SEGMENT, TEMPERATURE_SEGMENT, TopicLayout};

/// Configuration for the MQTT transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Prefix shared by every sensor and command topic.
    pub base_topic: String,
    /// Sensor kind segments to subscribe to (`<base>/sensors/<kind>/+`).
    pub sensor_kinds: Vec<String>,
    /// Channel segment of gate command topics (`<base>/commands/<channel>/<zone>`).
    pub command_channel: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Upper bound on handing one command to the client, in milliseconds.
    pub publish_timeout_ms: u64,
    /// Capacity of the client's request queue.
    pub channel_capacity: usize,
}

impl MqttConfig {
    #[must_use]
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    /// Build the topic layout described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Topic`] when a segment is empty or contains a
    /// wildcard or separator.
    pub fn topics(&self) -> Result<TopicLayout, MqttError> {
        TopicLayout::new(
            self.base_topic.clone(),
            self.sensor_kinds.clone(),
            self.command_channel.clone(),
        )
    }

    pub(crate) fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(
            self.client_id.clone(),
            self.broker_host.clone(),
            self.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(self.keep_alive_secs)));
        options
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "edge-processor".to_string(),
            base_topic: "farm".to_string(),
            sensor_kinds: vec![
                MOISTURE_SEGMENT.to_string(),
                FLOW_SEGMENT.to_string(),
                TEMPERATURE_SEGMENT.to_string(),
            ],
            command_channel: GATE_CHANNEL.to_string(),
            keep_alive_secs: 30,
            publish_timeout_ms: 2000,
            channel_capacity: 64,
        }
    }
}
