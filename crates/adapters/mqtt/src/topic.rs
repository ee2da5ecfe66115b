//! Topic layout shared by the field sensors and the gate actuators.
//!
//! ```text
//! <base>/sensors/<kind-segment>/<sensor_id>    inbound telemetry
//! <base>/commands/<channel>/<zone_id>          outbound gate commands
//! ```

use fieldgate_domain::id::{SensorId, ZoneId};
use fieldgate_domain::reading::SensorKind;

use crate::error::MqttError;

pub const MOISTURE_SEGMENT: &str = "soil-moisture-sensors";
pub const FLOW_SEGMENT: &str = "water-flow-sensors";
pub const TEMPERATURE_SEGMENT: &str = "soil-temperature-sensors";
pub const GATE_CHANNEL: &str = "water-gate-sensors";

/// Map a topic kind segment to a [`SensorKind`]. Unknown segments are
/// [`SensorKind::Other`].
#[must_use]
pub fn kind_for_segment(segment: &str) -> SensorKind {
    match segment {
        MOISTURE_SEGMENT => SensorKind::Moisture,
        FLOW_SEGMENT => SensorKind::Flow,
        TEMPERATURE_SEGMENT => SensorKind::Temperature,
        _ => SensorKind::Other,
    }
}

/// What a sensor topic says about its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorTopic {
    pub kind: SensorKind,
    pub sensor_id: SensorId,
}

/// Validated topic names for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicLayout {
    sensor_prefix: String,
    command_prefix: String,
    sensor_kinds: Vec<String>,
}

impl TopicLayout {
    /// Build a layout.
    ///
    /// `base` may span several levels (`site/farm`); kind and channel
    /// segments are single levels.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Topic`] for an empty kind list, empty segments,
    /// wildcards, or a kind/channel segment containing `/`.
    pub fn new(
        base: String,
        sensor_kinds: Vec<String>,
        command_channel: String,
    ) -> Result<Self, MqttError> {
        if base.is_empty() || base.contains(['+', '#']) || base.ends_with('/') {
            return Err(MqttError::Topic(format!("bad base topic {base:?}")));
        }
        if sensor_kinds.is_empty() {
            return Err(MqttError::Topic("no sensor kinds configured".to_string()));
        }
        for segment in sensor_kinds.iter().chain(std::iter::once(&command_channel)) {
            if segment.is_empty() || segment.contains(['+', '#', '/']) {
                return Err(MqttError::Topic(format!("bad topic segment {segment:?}")));
            }
        }
        Ok(Self {
            sensor_prefix: format!("{base}/sensors/"),
            command_prefix: format!("{base}/commands/{command_channel}/"),
            sensor_kinds,
        })
    }

    /// One subscription filter per configured sensor kind.
    #[must_use]
    pub fn subscribe_filters(&self) -> Vec<String> {
        self.sensor_kinds
            .iter()
            .map(|kind| format!("{}{kind}/+", self.sensor_prefix))
            .collect()
    }

    #[must_use]
    pub fn command_topic(&self, zone_id: ZoneId) -> String {
        format!("{}{zone_id}", self.command_prefix)
    }

    /// Parse `<base>/sensors/<kind>/<sensor_id>`.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Topic`] if the topic is outside the sensor tree
    /// or the last level is not a numeric sensor id.
    pub fn parse_sensor_topic(&self, topic: &str) -> Result<SensorTopic, MqttError> {
        let invalid = || MqttError::Topic(topic.to_string());
        let rest = topic.strip_prefix(&self.sensor_prefix).ok_or_else(invalid)?;
        let (segment, id) = rest.split_once('/').ok_or_else(invalid)?;
        let sensor_id = id.parse::<SensorId>().map_err(|_| invalid())?;
        Ok(SensorTopic {
            kind: kind_for_segment(segment),
            sensor_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TopicLayout {
        TopicLayout::new(
            "farm".to_string(),
            vec![MOISTURE_SEGMENT.to_string(), FLOW_SEGMENT.to_string()],
            GATE_CHANNEL.to_string(),
        )
        .unwrap()
    }

    #[test]
    fn should_build_one_filter_per_kind() {
        assert_eq!(
            layout().subscribe_filters(),
            vec![
                "farm/sensors/soil-moisture-sensors/+",
                "farm/sensors/water-flow-sensors/+",
            ]
        );
    }

    #[test]
    fn should_format_command_topic() {
        assert_eq!(
            layout().command_topic(ZoneId::new(2)),
            "farm/commands/water-gate-sensors/2"
        );
    }

    #[test]
    fn should_parse_moisture_topic() {
        let parsed = layout()
            .parse_sensor_topic("farm/sensors/soil-moisture-sensors/9001")
            .unwrap();
        assert_eq!(parsed.kind, SensorKind::Moisture);
        assert_eq!(parsed.sensor_id, SensorId::new(9001));
    }

    #[test]
    fn should_parse_unknown_kind_as_other() {
        let parsed = layout()
            .parse_sensor_topic("farm/sensors/leaf-wetness-sensors/12")
            .unwrap();
        assert_eq!(parsed.kind, SensorKind::Other);
    }

    #[test]
    fn should_reject_topic_outside_sensor_tree() {
        let err = layout()
            .parse_sensor_topic("farm/commands/water-gate-sensors/1")
            .unwrap_err();
        assert!(matches!(err, MqttError::Topic(_)));
    }

    #[test]
    fn should_reject_non_numeric_sensor_id() {
        assert!(
            layout()
                .parse_sensor_topic("farm/sensors/soil-moisture-sensors/abc")
                .is_err()
        );
        assert!(
            layout()
                .parse_sensor_topic("farm/sensors/soil-moisture-sensors/9001/extra")
                .is_err()
        );
    }

    #[test]
    fn should_support_multi_level_base() {
        let layout = TopicLayout::new(
            "site-a/farm".to_string(),
            vec![MOISTURE_SEGMENT.to_string()],
            GATE_CHANNEL.to_string(),
        )
        .unwrap();
        let parsed = layout
            .parse_sensor_topic("site-a/farm/sensors/soil-moisture-sensors/7")
            .unwrap();
        assert_eq!(parsed.sensor_id, SensorId::new(7));
        assert_eq!(
            layout.command_topic(ZoneId::new(1)),
            "site-a/farm/commands/water-gate-sensors/1"
        );
    }

    #[test]
    fn should_reject_wildcards_and_separators() {
        assert!(TopicLayout::new("farm".into(), vec!["a/b".into()], "c".into()).is_err());
        assert!(TopicLayout::new("farm".into(), vec!["+".into()], "c".into()).is_err());
        assert!(TopicLayout::new(String::new(), vec![], "c".into()).is_err());
        assert!(TopicLayout::new("farm".into(), vec!["a".into()], String::new()).is_err());
    }

    #[test]
    fn should_require_at_least_one_sensor_kind() {
        let err = TopicLayout::new("farm".into(), vec![], GATE_CHANNEL.into()).unwrap_err();
        assert!(matches!(err, MqttError::Topic(msg) if msg.contains("no sensor kinds")));
    }
}
