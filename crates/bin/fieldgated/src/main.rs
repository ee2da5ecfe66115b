//! # fieldgated: irrigation edge daemon
//!
//! Composition root that wires the MQTT transport to the control loop.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the tracing subscriber
//! - Build the routing table, zone store and decision engine
//! - Connect to the broker and dispatch every inbound reading
//! - Stop on SIGINT and report the final gate states
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use fieldgate_adapter_mqtt::MqttTransport;
use fieldgate_app::decision_engine::DecisionEngine;
use fieldgate_app::dispatcher::ReadingDispatcher;
use fieldgate_app::event_bus::InProcessEventBus;
use fieldgate_app::ports::SystemClock;
use fieldgate_app::zone_store::ZoneStore;
use fieldgate_domain::event::{Event, EventPayload};

use crate::config::Config;

const EVENT_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .compact()
        .init();

    // Control loop
    let policy = config.control_policy()?;
    let routing = config.routing_table()?;
    if policy.cooldown().is_zero() {
        tracing::warn!("cooldown is zero, gate commands are not debounced");
    }
    if routing.is_empty() {
        tracing::warn!("routing table is empty, no reading will move a gate");
    }
    tracing::info!(
        zones = routing.zone_count(),
        sensors = routing.len(),
        dry_threshold = policy.dry_threshold(),
        wet_threshold = policy.wet_threshold(),
        cooldown_secs = policy.cooldown().as_secs(),
        "control loop configured"
    );

    // Transport
    let transport = MqttTransport::new(&config.mqtt)?;
    let zones = ZoneStore::new(&routing);
    let engine = DecisionEngine::new(
        routing,
        zones,
        policy,
        transport.command_publisher(),
        SystemClock,
    )?;

    // Event bus
    let event_bus = InProcessEventBus::new(EVENT_BUS_CAPACITY);
    tokio::spawn(log_events(event_bus.subscribe()));
    tracing::debug!(
        listeners = event_bus.subscriber_count(),
        "telemetry event bus ready"
    );

    let dispatcher = Arc::new(ReadingDispatcher::new(engine, event_bus));

    tracing::info!(
        broker = %format!("{}:{}", config.mqtt.broker_host, config.mqtt.broker_port),
        client_id = %config.mqtt.client_id,
        "fieldgated starting"
    );
    transport
        .run(Arc::clone(&dispatcher), shutdown_signal())
        .await;

    for zone in dispatcher.engine().zones().snapshot() {
        tracing::info!(
            zone_id = %zone.zone_id(),
            open = zone.is_open(),
            last_command_at = ?zone.last_command_at(),
            "final gate state"
        );
    }

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => {
            tracing::error!(%err, "cannot listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

/// Trace every reading and gate transition announced on the bus.
async fn log_events(mut rx: broadcast::Receiver<Event>) {
    loop {
        match rx.recv().await {
            Ok(event) => match event.payload {
                EventPayload::ReadingReceived { reading } => tracing::trace!(
                    sensor_id = %reading.sensor_id(),
                    kind = %reading.kind(),
                    value = reading.value(),
                    "reading received"
                ),
                EventPayload::GateChanged { command } => tracing::debug!(
                    zone_id = %command.zone_id(),
                    action = %command.action(),
                    "gate changed"
                ),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "event log lagging");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
