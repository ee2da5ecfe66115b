//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `fieldgated.toml` in the working directory, or the file named
//! by `FIELDGATE_CONFIG`. Every field has a default matching the original
//! two-zone deployment, so the file is optional. Environment variables take
//! precedence over file values.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use fieldgate_adapter_mqtt::{MqttConfig, MqttError};
use fieldgate_domain::error::ValidationError;
use fieldgate_domain::id::{SensorId, ZoneId};
use fieldgate_domain::policy::ControlPolicy;
use fieldgate_domain::routing::RoutingTable;

const DEFAULT_PATH: &str = "fieldgated.toml";

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hysteresis band and debounce window.
    pub control: ControlConfig,
    /// Sensor → zone assignments.
    pub routing: Vec<RouteConfig>,
    /// Broker connection and topic layout.
    pub mqtt: MqttConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Decision rule parameters.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Moisture below this opens the gate.
    pub dry_threshold: f64,
    /// Moisture above this closes the gate.
    pub wet_threshold: f64,
    /// Minimum seconds between two commands for one zone. `0` disables
    /// debouncing.
    pub cooldown_secs: u64,
}

/// One `[[routing]]` entry. `sensors` and `range` may be combined.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub zone: ZoneId,
    #[serde(default)]
    pub sensors: Vec<SensorId>,
    /// Inclusive `[first, last]` sensor id range.
    #[serde(default)]
    pub range: Option<[SensorId; 2]>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from the config file (if present), apply
    /// environment-variable overrides and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed, if `FIELDGATE_CONFIG`
    /// names a file that cannot be read, or if the resulting settings are
    /// invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("FIELDGATE_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path), true)?,
            Err(_) => Self::from_file(Path::new(DEFAULT_PATH), false)?,
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("FIELDGATE_MQTT_HOST") {
            self.mqtt.broker_host = val;
        }
        parse_override(&lookup, "FIELDGATE_MQTT_PORT", &mut self.mqtt.broker_port)?;
        parse_override(
            &lookup,
            "FIELDGATE_DRY_THRESHOLD",
            &mut self.control.dry_threshold,
        )?;
        parse_override(
            &lookup,
            "FIELDGATE_WET_THRESHOLD",
            &mut self.control.wet_threshold,
        )?;
        parse_override(
            &lookup,
            "FIELDGATE_COOLDOWN_SECS",
            &mut self.control.cooldown_secs,
        )?;
        if let Some(val) = lookup("FIELDGATE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker_port == 0 {
            return Err(ConfigError::Validation(
                "mqtt.broker_port must be non-zero".to_string(),
            ));
        }
        if self.mqtt.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "mqtt.channel_capacity must be non-zero".to_string(),
            ));
        }
        self.mqtt.topics()?;
        self.control_policy()?;
        self.routing_table()?;
        Ok(())
    }

    /// Build the decision rule parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Model`] for non-finite or inverted thresholds.
    pub fn control_policy(&self) -> Result<ControlPolicy, ConfigError> {
        Ok(ControlPolicy::new(
            self.control.dry_threshold,
            self.control.wet_threshold,
            Duration::from_secs(self.control.cooldown_secs),
        )?)
    }

    /// Build the routing table from the `[[routing]]` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an entry without sensors and
    /// [`ConfigError::Model`] for an empty or oversized range or a sensor
    /// routed to two zones.
    pub fn routing_table(&self) -> Result<RoutingTable, ConfigError> {
        let mut builder = RoutingTable::builder();
        for route in &self.routing {
            if route.sensors.is_empty() && route.range.is_none() {
                return Err(ConfigError::Validation(format!(
                    "routing entry for zone {} lists no sensors",
                    route.zone
                )));
            }
            for sensor in &route.sensors {
                builder = builder.route(*sensor, route.zone);
            }
            if let Some([first, last]) = route.range {
                builder = builder.route_range(first..=last, route.zone);
            }
        }
        Ok(builder.build()?)
    }
}

fn parse_override<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(val) = lookup(var) {
        *target = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::Validation(format!("{var} has invalid value {val:?}")))?;
    }
    Ok(())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            control: ControlConfig::default(),
            routing: vec![
                RouteConfig {
                    zone: ZoneId::new(1),
                    sensors: Vec::new(),
                    range: Some([SensorId::new(9001), SensorId::new(9019)]),
                },
                RouteConfig {
                    zone: ZoneId::new(2),
                    sensors: Vec::new(),
                    range: Some([SensorId::new(9020), SensorId::new(9038)]),
                },
            ],
            mqtt: MqttConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        let policy = ControlPolicy::default();
        Self {
            dry_threshold: policy.dry_threshold(),
            wet_threshold: policy.wet_threshold(),
            cooldown_secs: policy.cooldown().as_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "fieldgated=info,fieldgate=info".to_string(),
        }
    }
}

/// Configuration errors. All of them abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// The control or routing settings break a domain invariant.
    #[error("invalid control or routing settings")]
    Model(#[from] ValidationError),
    /// The MQTT topic settings are unusable.
    #[error("invalid MQTT settings")]
    Mqtt(#[from] MqttError),
}
